//! File I/O by extension

use crate::{CsvError, CsvReadOptions, CsvReader, CsvTable, CsvWriteOptions, CsvWriter};
use std::path::Path;
use thiserror::Error;

/// Errors from opening or saving a table file
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Field delimiter for a file extension
fn delimiter_for(path: &Path) -> Result<u8, FileError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("csv") => Ok(b','),
        Some("tsv") | Some("tab") => Ok(b'\t'),
        _ => Err(FileError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Extension trait for CsvTable to add file I/O
pub trait TableFileExt: Sized {
    /// Open a delimited file, picking the delimiter from the extension
    fn open<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> Result<Self, FileError>;

    /// Save to a delimited file, picking the delimiter from the extension
    fn save<P: AsRef<Path>>(&self, path: P, options: &CsvWriteOptions) -> Result<(), FileError>;
}

impl TableFileExt for CsvTable {
    fn open<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> Result<Self, FileError> {
        let path = path.as_ref();
        let options = CsvReadOptions {
            delimiter: delimiter_for(path)?,
            ..options.clone()
        };
        Ok(CsvReader::read_file(path, &options)?)
    }

    fn save<P: AsRef<Path>>(&self, path: P, options: &CsvWriteOptions) -> Result<(), FileError> {
        let path = path.as_ref();
        let options = CsvWriteOptions {
            delimiter: delimiter_for(path)?,
            ..options.clone()
        };
        Ok(CsvWriter::write_file(self, path, &options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_for_extension() {
        assert_eq!(delimiter_for(Path::new("a.CSV")).unwrap(), b',');
        assert_eq!(delimiter_for(Path::new("dir/a.tsv")).unwrap(), b'\t');
        assert!(matches!(
            delimiter_for(Path::new("a.xlsx")),
            Err(FileError::UnsupportedFormat(_))
        ));
    }
}
