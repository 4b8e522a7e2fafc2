//! Loading loan applications and decision profiles from exported files.

mod parser;

use crate::workflows::underwriting::{DecisionProfile, LoanApplication};
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read import file: {}", err),
            ImportError::Csv(err) => write!(f, "invalid application CSV data: {}", err),
            ImportError::Json(err) => write!(f, "invalid JSON data: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Supported on-disk record formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Csv,
    Json,
}

impl RecordFormat {
    /// `.csv` files are read as CSV; everything else as a JSON array.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

pub struct ApplicationImporter;

impl ApplicationImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LoanApplication>, ImportError> {
        let path = path.as_ref();
        let format = RecordFormat::from_path(path);
        let file = std::fs::File::open(path)?;
        let applications = Self::from_reader(file, format)?;
        debug!(path = %path.display(), ?format, count = applications.len(), "applications imported");
        Ok(applications)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        format: RecordFormat,
    ) -> Result<Vec<LoanApplication>, ImportError> {
        match format {
            RecordFormat::Csv => Self::from_csv_reader(reader),
            RecordFormat::Json => Self::from_json_reader(reader),
        }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<LoanApplication>, ImportError> {
        Ok(parser::parse_csv(reader)?)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<LoanApplication>, ImportError> {
        Ok(parser::parse_json(reader)?)
    }
}

/// Read a JSON array of decision profiles.
pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Vec<DecisionProfile>, ImportError> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}
