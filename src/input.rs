use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::error::AppError;

/// Read `path` as one record per line, in file order.
pub fn read_records(path: &Path) -> Result<Vec<String>, AppError> {
    let input_error = |source| AppError::Input {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(input_error)?;
    let records = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(input_error)?;

    debug!("read {} records from {}", records.len(), path.display());
    Ok(records)
}
