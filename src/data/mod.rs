pub mod error;
pub mod loader;
pub mod validate;

pub use error::SheetError;
pub use loader::{load_sheet, parse_sheet_json, parse_sheet_yaml, read_sheet_unchecked, SheetFormat};
pub use validate::{validate_sheet, ValidationDiagnostic, ValidationReport, ValidationSeverity};
