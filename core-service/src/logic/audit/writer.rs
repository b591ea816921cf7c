use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;

use crate::logic::features::FeatureLayout;
use super::record::LogRecord;

#[derive(Debug, Error)]
pub enum LogWriteError {
    #[error("log IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path:?} has header '{found}', expected '{expected}'")]
    HeaderMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Default)]
struct WriterState {
    header_verified: bool,
    // Last append from this process ended on a newline
    tail_clean: bool,
    rows_written: u64,
}

/// Append-only CSV writer for one destination file.
///
/// Every append runs under this writer's lock: existence check, header and row
/// are one critical section, so concurrent callers never duplicate the header
/// or interleave lines.
#[derive(Debug)]
pub struct CsvLogWriter {
    path: PathBuf,
    layout: FeatureLayout,
    header: String,
    state: Mutex<WriterState>,
}

impl CsvLogWriter {
    pub fn new(path: PathBuf, layout: FeatureLayout) -> Self {
        let header = layout.csv_header();
        Self {
            path,
            layout,
            header,
            state: Mutex::new(WriterState::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended by this process
    pub fn rows_written(&self) -> u64 {
        self.state.lock().rows_written
    }

    pub fn append(&self, record: &LogRecord) -> Result<(), LogWriteError> {
        let mut state = self.state.lock();

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let has_content = fs::metadata(&self.path).map(|m| m.len() > 0).unwrap_or(false);
        if has_content && !state.header_verified {
            self.verify_header()?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut buf = String::new();
        if !has_content {
            buf.push_str(&self.header);
            buf.push('\n');
        } else if !state.tail_clean && !self.ends_with_newline()? {
            // Terminate a row cut short by an earlier failed write
            log::warn!("Log {:?} ends mid-row, starting on a new line", self.path);
            buf.push('\n');
        }
        buf.push_str(&record.to_csv_row(&self.layout));
        buf.push('\n');

        // Single write per record
        state.tail_clean = false;
        file.write_all(buf.as_bytes())?;
        file.flush()?;

        state.header_verified = true;
        state.tail_clean = true;
        state.rows_written += 1;
        Ok(())
    }

    fn ends_with_newline(&self) -> Result<bool, LogWriteError> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }

    /// An existing file written under another layout would mix column orders
    fn verify_header(&self) -> Result<(), LogWriteError> {
        let file = File::open(&self.path)?;
        let mut first = String::new();
        BufReader::new(file).read_line(&mut first)?;

        let found = first.trim_end_matches(['\r', '\n']);
        if found != self.header {
            return Err(LogWriteError::HeaderMismatch {
                path: self.path.clone(),
                expected: self.header.clone(),
                found: found.to_string(),
            });
        }

        Ok(())
    }
}
