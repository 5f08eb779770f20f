//! Opt-in frame capture
//!
//! Persists JSON-lines frames as CSV for short study captures. Nothing is
//! written, and no file is created, until the confirmation callback says
//! yes.
//!
//! The CSV header comes from the keys of the first valid row, in the order
//! they appear. Later rows are written against that header: missing keys
//! become empty cells and extra keys are dropped. Lines that are not JSON
//! objects are skipped. Every row is flushed as it is written so an
//! interrupted capture keeps what it saw.

use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::ConnectorError;

/// Counters for one capture run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CaptureStats {
    /// Lines read from the input
    pub lines_read: usize,
    /// Rows written, excluding the header
    pub rows_written: usize,
    /// Blank or malformed lines skipped
    pub lines_skipped: usize,
}

/// Copy JSON-lines from `reader` to `writer` as CSV after confirmation
///
/// Returns `None` without touching `writer` when `confirm` declines.
pub fn capture_stream<R, W, F>(
    reader: R,
    writer: &mut W,
    confirm: F,
) -> Result<Option<CaptureStats>, ConnectorError>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> bool,
{
    if !confirm() {
        return Ok(None);
    }
    copy_rows(reader, writer).map(Some)
}

/// Capture into a CSV file, creating parent directories as needed
///
/// `confirm` sees the destination path. When it declines, nothing is
/// created on disk.
pub fn capture_to_file<R, F>(
    reader: R,
    path: impl AsRef<Path>,
    confirm: F,
) -> Result<Option<CaptureStats>, ConnectorError>
where
    R: BufRead,
    F: FnOnce(&Path) -> bool,
{
    let path = path.as_ref();
    if !confirm(path) {
        return Ok(None);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut out = BufWriter::new(File::create(path)?);
    let stats = copy_rows(reader, &mut out)?;
    out.flush()?;
    Ok(Some(stats))
}

fn copy_rows<R: BufRead, W: Write>(reader: R, writer: &mut W) -> Result<CaptureStats, ConnectorError> {
    let mut stats = CaptureStats::default();
    let mut header: Option<Vec<String>> = None;

    for line in reader.lines() {
        let line = line?;
        stats.lines_read += 1;

        let row = match parse_row(&line) {
            Some(row) => row,
            None => {
                stats.lines_skipped += 1;
                log_debug!("capture: skipping line {}", stats.lines_read);
                continue;
            }
        };

        if header.is_none() {
            let fields: Vec<String> = row.keys().cloned().collect();
            write_record(writer, fields.iter().map(String::as_str))?;
            header = Some(fields);
        }
        let fields = header.as_deref().unwrap_or_default();

        let cells: Vec<String> = fields
            .iter()
            .map(|key| row.get(key).map(cell_text).unwrap_or_default())
            .collect();
        write_record(writer, cells.iter().map(String::as_str))?;
        writer.flush()?;
        stats.rows_written += 1;
    }

    Ok(stats)
}

fn parse_row(line: &str) -> Option<Map<String, Value>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(row)) => Some(row),
        _ => None,
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_record<'a, W: Write>(
    writer: &mut W,
    cells: impl Iterator<Item = &'a str>,
) -> Result<(), ConnectorError> {
    let line: Vec<String> = cells.map(quote).collect();
    writer.write_all(line.join(",").as_bytes())?;
    writer.write_all(b"\r\n")?;
    Ok(())
}

// RFC 4180 quoting
fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
