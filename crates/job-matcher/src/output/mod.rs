//! JSON and CSV writers for ranked match results.

mod csv_file;
mod json_file;

pub use csv_file::{write_csv, CsvRow, CSV_HEADERS};
pub use json_file::{write_json, JsonRecord};

use crate::matching::MatchReport;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const JSON_FILE: &str = "results.json";
pub const CSV_FILE: &str = "results.csv";

#[derive(Debug)]
pub enum OutputError {
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Io { path, source } => {
                write!(f, "unable to write {}: {}", path.display(), source)
            }
            OutputError::Csv(err) => write!(f, "unable to write CSV results: {}", err),
            OutputError::Json(err) => write!(f, "unable to write JSON results: {}", err),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io { source, .. } => Some(source),
            OutputError::Csv(err) => Some(err),
            OutputError::Json(err) => Some(err),
        }
    }
}

impl From<csv::Error> for OutputError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Files produced by [`write_results`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenResults {
    pub json: PathBuf,
    pub csv: PathBuf,
}

/// Writes `results.json` and `results.csv` into `out_dir`, creating it if needed.
pub fn write_results(
    out_dir: &Path,
    report: &MatchReport,
    explain: bool,
) -> Result<WrittenResults, OutputError> {
    fs::create_dir_all(out_dir).map_err(|source| OutputError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let json = out_dir.join(JSON_FILE);
    let mut writer = create(&json)?;
    write_json(&mut writer, &report.records, explain)?;
    flush(writer, &json)?;

    let csv = out_dir.join(CSV_FILE);
    write_csv(create(&csv)?, &report.records)?;

    info!(
        records = report.records.len(),
        json = %json.display(),
        csv = %csv.display(),
        "results written"
    );
    Ok(WrittenResults { json, csv })
}

fn create(path: &Path) -> Result<BufWriter<File>, OutputError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn flush(mut writer: BufWriter<File>, path: &Path) -> Result<(), OutputError> {
    writer.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
