//! Read/write deck records as JSON.
//!
//! The JSON form is an array of `DeckRecord` objects. A path of `-` means
//! stdin/stdout so the binary can sit in a shell pipeline.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::domain::DeckRecord;
use crate::error::AppError;

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read an array of deck records.
pub fn read_records(path: &Path) -> Result<Vec<DeckRecord>, AppError> {
    if is_stdio(path) {
        return parse_records(std::io::stdin().lock(), "stdin");
    }
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open records '{}': {e}", path.display()),
        )
    })?;
    parse_records(BufReader::new(file), &path.display().to_string())
}

fn parse_records(reader: impl Read, source: &str) -> Result<Vec<DeckRecord>, AppError> {
    serde_json::from_reader(reader)
        .map_err(|e| AppError::new(2, format!("Invalid deck records in {source}: {e}")))
}

/// Read a single deck record (the current storm fix).
pub fn read_record(path: &Path) -> Result<DeckRecord, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open record '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid deck record in '{}': {e}", path.display())))
}

/// Write deck records as pretty JSON.
pub fn write_records(path: &Path, records: &[DeckRecord]) -> Result<(), AppError> {
    if is_stdio(path) {
        let stdout = std::io::stdout();
        return emit(stdout.lock(), records);
    }
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output '{}': {e}", path.display()),
        )
    })?;
    emit(BufWriter::new(file), records)
}

fn emit(mut writer: impl Write, records: &[DeckRecord]) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| AppError::new(2, format!("Failed to write records JSON: {e}")))?;
    writeln!(writer).map_err(|e| AppError::new(2, format!("Failed to write records JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write records JSON: {e}")))
}
