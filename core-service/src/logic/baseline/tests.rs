use std::fs;

use super::loader::{load_baseline, parse_csv, parse_feature_rows};
use super::validate::BaselineError;
use crate::logic::features::FeatureLayout;

const RAW: &str = "\
product_name,discount_percent,discounted_price,price,quantity_sold,rating,review_count,total_revenue
\"Cable, USB-C\",20,80,100,5,4.2,30,400
Headphones,10,90,100,,4.8,120,900

\"Lamp \"\"Deluxe\"\"\",0,50,50,3,n/a,7,150
";

#[test]
fn test_parse_csv_handles_quotes() {
    let records = parse_csv(RAW);
    assert_eq!(records.len(), 4); // header + 3 rows, blank line skipped
    assert_eq!(records[1][0], "Cable, USB-C");
    assert_eq!(records[3][0], "Lamp \"Deluxe\"");
    assert_eq!(records[1].len(), 8);
}

#[test]
fn test_parse_csv_quoted_newline() {
    let records = parse_csv("a,b\r\n\"multi\nline\",2\r\n");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1], vec!["multi\nline".to_string(), "2".to_string()]);
}

#[test]
fn test_missing_values_become_zero() {
    let rows = parse_feature_rows(RAW, &FeatureLayout::default()).unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].price, 100.0);
    assert_eq!(rows[0].quantity_sold, 5);
    assert_eq!(rows[1].quantity_sold, 0); // empty cell
    assert_eq!(rows[2].rating, 0.0); // unparseable cell
    assert_eq!(rows[2].review_count, 7);
}

#[test]
fn test_missing_layout_column_is_rejected() {
    let content = "price,rating\n100,4.5\n";
    let err = parse_feature_rows(content, &FeatureLayout::default()).unwrap_err();
    assert!(matches!(err, BaselineError::MissingColumn(ref c) if c == "discount_percent"));

    // A narrower layout accepts the same file
    let layout = FeatureLayout::parse("price,rating").unwrap();
    let rows = parse_feature_rows(content, &layout).unwrap();
    assert_eq!(rows[0].rating, 4.5);
}

#[test]
fn test_load_baseline_errors() {
    let dir = tempfile::tempdir().unwrap();
    let layout = FeatureLayout::default();

    let missing = dir.path().join("absent.csv");
    assert!(matches!(load_baseline(&missing, &layout), Err(BaselineError::NotFound(_))));

    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "").unwrap();
    assert!(matches!(load_baseline(&empty, &layout), Err(BaselineError::MissingHeader)));

    let header_only = dir.path().join("header.csv");
    fs::write(&header_only, format!("{}\n", layout.names().join(","))).unwrap();
    assert!(matches!(load_baseline(&header_only, &layout), Err(BaselineError::Empty)));
}

#[test]
fn test_load_baseline_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.csv");
    fs::write(&path, RAW).unwrap();

    let dataset = load_baseline(&path, &FeatureLayout::default()).unwrap();
    assert_eq!(dataset.len(), 3);

    let matrix = dataset.to_matrix();
    assert_eq!(matrix.shape(), &[3, 6]);
    assert_eq!(matrix[[0, 2]], 100.0);

    let summary = dataset.summary();
    let price = summary.get("price").unwrap();
    assert_eq!(summary.samples, 3);
    assert!((price.mean - 250.0 / 3.0).abs() < 1e-9);
    assert_eq!(price.min, 50.0);
    assert_eq!(price.max, 100.0);
}
