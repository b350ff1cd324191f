//! CSV loading

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde_json::Value;
use tracing::debug;

use crate::engine::Record;
use crate::DataError;

/// Read every row of a headed CSV file as a record of string cells
pub async fn read_csv_records(path: impl AsRef<Path>) -> Result<(Vec<String>, Vec<Record>), DataError> {
    let path: PathBuf = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || read_blocking(&path)).await?
}

fn read_blocking(path: &Path) -> Result<(Vec<String>, Vec<Record>), DataError> {
    let file = File::open(path)?;
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.clone(), Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }

    debug!(path = %path.display(), rows = records.len(), "Loaded CSV");
    Ok((headers, records))
}
