//! Load character sheets from YAML or JSON files. Every loaded sheet is validated; warnings are
//! logged, errors reject the sheet.

use std::fs;
use std::path::Path;

use crate::battle::sheet::CharacterSheet;
use crate::data::error::SheetError;
use crate::data::validate::{validate_sheet, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Yaml,
    Json,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn load_sheet(path: impl AsRef<Path>) -> Result<CharacterSheet, SheetError> {
    let path = path.as_ref();
    let format = SheetFormat::from_path(path).ok_or_else(|| SheetError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let raw = fs::read_to_string(path).map_err(|source| SheetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sheet = match format {
        SheetFormat::Yaml => parse_sheet_yaml(&raw)?,
        SheetFormat::Json => parse_sheet_json(&raw)?,
    };
    tracing::debug!(path = %path.display(), id = %sheet.id, "loaded sheet");
    Ok(sheet)
}

pub fn parse_sheet_yaml(raw: &str) -> Result<CharacterSheet, SheetError> {
    checked(serde_yaml::from_str(raw)?)
}

pub fn parse_sheet_json(raw: &str) -> Result<CharacterSheet, SheetError> {
    checked(serde_json::from_str(raw)?)
}

/// Parse without validating, for tooling that wants the full report.
pub fn read_sheet_unchecked(path: impl AsRef<Path>) -> Result<CharacterSheet, SheetError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SheetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match SheetFormat::from_path(path) {
        Some(SheetFormat::Yaml) => Ok(serde_yaml::from_str(&raw)?),
        Some(SheetFormat::Json) => Ok(serde_json::from_str(&raw)?),
        None => Err(SheetError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn checked(sheet: CharacterSheet) -> Result<CharacterSheet, SheetError> {
    let report = validate_sheet(&sheet);
    log_warnings(&report);
    if report.has_errors() {
        return Err(SheetError::Invalid {
            id: sheet.id,
            report,
        });
    }
    Ok(sheet)
}

fn log_warnings(report: &ValidationReport) {
    for diagnostic in report.warnings() {
        tracing::warn!("{diagnostic}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::element::Element;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            SheetFormat::from_path(Path::new("a/fire_heroine.yml")),
            Some(SheetFormat::Yaml)
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("boss.YAML")),
            Some(SheetFormat::Yaml)
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("boss.json")),
            Some(SheetFormat::Json)
        );
        assert_eq!(SheetFormat::from_path(Path::new("boss.toml")), None);
        assert_eq!(SheetFormat::from_path(Path::new("boss")), None);
    }

    #[test]
    fn json_sheet_parses() {
        let raw = r#"{
            "id": "trash",
            "name": "Trash",
            "element": "wind",
            "vitality": 450,
            "intelligence": 45,
            "spirit": 45,
            "awakening": {"startRatio": 0.5, "endRatio": 1.0, "turnToAwake": 5}
        }"#;
        let sheet = parse_sheet_json(raw).expect("sheet");
        assert_eq!(sheet.element, Element::Wind);
        assert!(sheet.skills.is_empty());
        assert_eq!(sheet.fatigue, 0);
    }

    #[test]
    fn invalid_sheet_is_rejected_with_report() {
        let raw = "id: tired\nname: Tired\nelement: fire\nvitality: 10\nintelligence: 1\nspirit: 1\nfatigue: 80\n";
        match parse_sheet_yaml(raw) {
            Err(SheetError::Invalid { id, report }) => {
                assert_eq!(id, "tired");
                assert_eq!(report.error_count(), 1);
            }
            other => panic!("expected invalid sheet, got {other:?}"),
        }
    }

    #[test]
    fn unknown_element_fails_to_parse() {
        let raw = "id: x\nname: X\nelement: earth\nvitality: 10\nintelligence: 1\nspirit: 1\n";
        assert!(matches!(parse_sheet_yaml(raw), Err(SheetError::Yaml(_))));
    }
}
