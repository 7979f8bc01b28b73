//! Data file writer for the market-data feeder scenario.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::client::SimError;

const HEADER: &str = "timestamp,symbol,price,volume\n";
const SYMBOLS: [&str; 5] = ["AAPL", "GOOGL", "MSFT", "TSLA", "AMZN"];

/// Create the data file (and its parent directory) with a CSV header if missing.
pub fn ensure_file(path: &Path) -> Result<(), SimError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
            info!(dir = %dir.display(), "created data directory");
        }
    }
    if !path.exists() {
        fs::write(path, HEADER)?;
        info!(path = %path.display(), "created data file");
    }
    Ok(())
}

/// Append one synthetic row; `seq` picks the symbol and varies the numbers.
pub fn append_row(path: &Path, seq: u64) -> Result<String, SimError> {
    let symbol = SYMBOLS[(seq % SYMBOLS.len() as u64) as usize];
    let price = 100.0 + (seq * 37 % 400) as f64 + 0.25;
    let volume = 1_000 + seq * 1_337 % 99_000;
    let row = format!("{},{},{:.2},{}\n", Utc::now().to_rfc3339(), symbol, price, volume);

    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(row.as_bytes())?;
    file.sync_all()?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn creates_file_with_header() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("nested/market_data.csv");
        ensure_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), HEADER);

        // Existing content is left alone.
        append_row(&path, 0).unwrap();
        ensure_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn appends_rows() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("market_data.csv");
        ensure_file(&path).unwrap();
        let row = append_row(&path, 1).unwrap();
        assert!(row.contains(",GOOGL,"));
        append_row(&path, 2).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.ends_with('\n'));
    }
}
