use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::validate::ValidationReport;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unable to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse yaml sheet: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to parse json sheet: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported sheet format '{}' (expected .yml, .yaml or .json)", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("sheet '{id}' failed validation with {} error(s)", report.error_count())]
    Invalid { id: String, report: ValidationReport },
}
