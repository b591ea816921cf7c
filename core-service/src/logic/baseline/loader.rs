//! Baseline Loader - reads historical rows from a header-first CSV
//!
//! The raw dataset carries text columns (product names, categories) that may
//! contain quoted commas or line breaks, so records are split with quote
//! awareness. Only layout columns are read; everything else is ignored.

use std::fs;
use std::path::Path;

use crate::logic::features::{Feature, FeatureLayout, FeatureVector};
use super::types::BaselineDataset;
use super::validate::{column_index, BaselineError};

/// Load the baseline dataset used to fit the anomaly model
pub fn load_baseline(path: &Path, layout: &FeatureLayout) -> Result<BaselineDataset, BaselineError> {
    let rows = read_feature_rows(path, layout)?;

    if rows.is_empty() {
        return Err(BaselineError::Empty);
    }

    log::info!("Loaded baseline from {:?} ({} rows)", path, rows.len());
    Ok(BaselineDataset::new(layout.clone(), rows))
}

/// Read every data row of a CSV into feature vectors.
///
/// Layout columns must be present in the header. Other known feature columns
/// are read when present and default to 0 otherwise. Empty or unparseable
/// cells become 0.
pub fn read_feature_rows(path: &Path, layout: &FeatureLayout) -> Result<Vec<FeatureVector>, BaselineError> {
    if !path.exists() {
        return Err(BaselineError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    parse_feature_rows(&content, layout)
}

pub fn parse_feature_rows(content: &str, layout: &FeatureLayout) -> Result<Vec<FeatureVector>, BaselineError> {
    let mut records = parse_csv(content).into_iter();
    let header = records.next().ok_or(BaselineError::MissingHeader)?;

    for &feature in layout.features() {
        column_index(&header, feature.name())?;
    }

    let columns: Vec<(Feature, usize)> = Feature::ALL
        .iter()
        .filter_map(|&f| column_index(&header, f.name()).ok().map(|idx| (f, idx)))
        .collect();

    let rows = records
        .map(|record| {
            let mut vector = FeatureVector::default();
            for &(feature, idx) in &columns {
                vector.set(feature, parse_cell(record.get(idx).map(String::as_str)));
            }
            vector
        })
        .collect();

    Ok(rows)
}

fn parse_cell(cell: Option<&str>) -> f64 {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Split CSV content into records (RFC 4180 quoting, CRLF tolerant).
/// Blank lines are skipped.
pub fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}
