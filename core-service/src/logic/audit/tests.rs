//! Drift/audit log file behaviour

use std::fs;
use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};

use super::*;
use crate::logic::features::{FeatureLayout, FeatureVector};

fn flagged() -> FeatureVector {
    FeatureVector {
        discount_percent: 0.0,
        discounted_price: 10.0,
        price: -5.0,
        quantity_sold: 5,
        rating: 4.2,
        review_count: 30,
    }
}

fn data_lines(path: &std::path::Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_header_written_once_then_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("drift_log.csv");
    let layout = FeatureLayout::default();
    let logger = DriftLogger::new(&layout, Some(path.clone()), None);

    for _ in 0..3 {
        logger.append(&LogRecord::new(flagged()), LogDestination::Drift).unwrap();
    }

    let lines = data_lines(&path);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], layout.csv_header());
    assert_eq!(lines.iter().filter(|l| l.starts_with("timestamp")).count(), 1);
}

#[test]
fn test_row_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drift_log.csv");
    let layout = FeatureLayout::default();
    let writer = CsvLogWriter::new(path.clone(), layout);

    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    writer.append(&LogRecord::at(ts, flagged())).unwrap();

    let lines = data_lines(&path);
    assert_eq!(
        lines[0],
        "timestamp,discount_percent,discounted_price,price,quantity_sold,rating,review_count"
    );
    assert_eq!(lines[1], "2024-03-01T12:00:00.000000Z,0,10,-5,5,4.2,30");
    assert_eq!(writer.rows_written(), 1);
}

#[test]
fn test_existing_file_is_appended_not_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drift_log.csv");
    let layout = FeatureLayout::default();

    CsvLogWriter::new(path.clone(), layout.clone())
        .append(&LogRecord::new(flagged()))
        .unwrap();
    // Fresh writer, as after a restart
    CsvLogWriter::new(path.clone(), layout)
        .append(&LogRecord::new(flagged()))
        .unwrap();

    assert_eq!(data_lines(&path).len(), 3);
}

#[test]
fn test_truncated_row_does_not_swallow_next_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drift_log.csv");
    let layout = FeatureLayout::default();
    // Previous process died halfway through a row
    fs::write(&path, format!("{}\n2024-03-01T12:00:00.000000Z,0,10", layout.csv_header())).unwrap();

    let writer = CsvLogWriter::new(path.clone(), layout);
    writer.append(&LogRecord::new(flagged())).unwrap();
    writer.append(&LogRecord::new(flagged())).unwrap();

    let lines = data_lines(&path);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "2024-03-01T12:00:00.000000Z,0,10");
    assert!(lines[2].ends_with(",0,10,-5,5,4.2,30"));
    assert!(lines[3].ends_with(",0,10,-5,5,4.2,30"));
    assert!(fs::read_to_string(&path).unwrap().ends_with('\n'));
}

#[test]
fn test_header_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drift_log.csv");
    fs::write(&path, "timestamp,price,rating\n2024-01-01T00:00:00Z,1,4\n").unwrap();

    let writer = CsvLogWriter::new(path.clone(), FeatureLayout::default());
    let err = writer.append(&LogRecord::new(flagged())).unwrap_err();

    assert!(matches!(err, LogWriteError::HeaderMismatch { .. }));
    assert_eq!(data_lines(&path).len(), 2);
}

#[test]
fn test_concurrent_appends_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drift_log.csv");
    let layout = FeatureLayout::default();
    let logger = Arc::new(DriftLogger::new(&layout, Some(path.clone()), None));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for _ in 0..25 {
                    logger.append(&LogRecord::new(flagged()), LogDestination::Drift).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let lines = data_lines(&path);
    assert_eq!(lines.len(), 201);
    assert_eq!(lines[0], layout.csv_header());
    for line in &lines[1..] {
        assert_eq!(line.split(',').count(), 7, "corrupted line: {line}");
        assert!(line.ends_with(",0,10,-5,5,4.2,30"));
    }
}

#[test]
fn test_same_path_shares_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    let layout = FeatureLayout::default();

    let logger = DriftLogger::new(&layout, Some(path.clone()), Some(path.clone()));
    assert!(logger.shares_writer());

    logger.append(&LogRecord::new(flagged()), LogDestination::Drift).unwrap();
    logger.append(&LogRecord::new(flagged()), LogDestination::Audit).unwrap();
    assert_eq!(data_lines(&path).len(), 3);

    let other = DriftLogger::new(&layout, Some(path), Some(dir.path().join("audit.csv")));
    assert!(!other.shares_writer());
}

#[test]
fn test_unconfigured_destination_is_noop() {
    let logger = DriftLogger::in_memory();
    logger.append(&LogRecord::new(flagged()), LogDestination::Audit).unwrap();
    logger.append(&LogRecord::new(flagged()), LogDestination::Drift).unwrap();

    assert!(logger.path(LogDestination::Drift).is_none());
    // Only drift records are remembered
    assert_eq!(logger.recent(10).len(), 1);
}

#[test]
fn test_recent_is_bounded_newest_first() {
    let logger = DriftLogger::in_memory();
    for i in 0..(MAX_RECENT + 20) {
        let mut v = flagged();
        v.review_count = i as i64;
        logger.append(&LogRecord::new(v), LogDestination::Drift).unwrap();
    }

    let all = logger.recent(usize::MAX);
    assert_eq!(all.len(), MAX_RECENT);
    assert_eq!(all[0].features.review_count, (MAX_RECENT + 19) as i64);

    let few = logger.recent(3);
    assert_eq!(few.len(), 3);
    assert_eq!(few[2].features.review_count, (MAX_RECENT + 17) as i64);
}
