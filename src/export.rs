use clap::ValueEnum;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::FilmRecord;

/// Layout of the output document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// A single JSON array holding every record
    #[default]
    Json,
    /// One JSON record per line
    Jsonl,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Write all records to `path`, creating the parent directory if needed
pub fn save_records<P: AsRef<Path>>(
    path: P,
    records: &[FilmRecord],
    format: OutputFormat,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Json => export_to_json(records, &mut writer)?,
        OutputFormat::Jsonl => export_to_jsonl(records, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

/// Export records as one JSON array
pub fn export_to_json<W: Write>(records: &[FilmRecord], writer: &mut W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut *writer, records)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Export records to JSONL format
/// Each record is written as a single line of JSON followed by a newline
pub fn export_to_jsonl<W: Write>(records: &[FilmRecord], writer: &mut W) -> Result<(), ExportError> {
    for record in records {
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
