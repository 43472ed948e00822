use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::battle::awakening::Awakening;
use crate::battle::sheet::{CharacterSheet, MAX_FATIGUE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Check the numeric contracts the battle engine relies on but does not defend against.
pub fn validate_sheet(sheet: &CharacterSheet) -> ValidationReport {
    let mut report = ValidationReport::default();
    let context = if sheet.id.trim().is_empty() {
        report.push(ValidationSeverity::Error, "sheet", "id must not be empty");
        "sheet".to_string()
    } else {
        format!("sheet '{}'", sheet.id)
    };

    if sheet.fatigue > MAX_FATIGUE {
        report.push(
            ValidationSeverity::Error,
            &context,
            format!("fatigue {} exceeds {MAX_FATIGUE}", sheet.fatigue),
        );
    }

    match sheet.awakening {
        Awakening::Flat { ratio } => {
            if ratio < 1.0 {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.awakening"),
                    format!("flat ratio {ratio} must be at least 1"),
                );
            }
        }
        Awakening::Ramp {
            start_ratio,
            end_ratio,
            turns_to_awake,
        } => {
            if start_ratio < 0.0 || end_ratio < 0.0 {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.awakening"),
                    format!("ratios must not be negative (start {start_ratio}, end {end_ratio})"),
                );
            }
            if turns_to_awake < 1 {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.awakening"),
                    "turnToAwake must be at least 1",
                );
            }
        }
    }

    let mut seen_names = HashSet::new();
    for (index, skill) in sheet.skills.iter().enumerate() {
        let skill_context = format!("{context}.skills[{index}]");
        if skill.duration < 1 {
            report.push(
                ValidationSeverity::Error,
                &skill_context,
                "duration must be at least 1",
            );
        }
        if skill.cool_time < 1 {
            report.push(
                ValidationSeverity::Error,
                &skill_context,
                "coolTime must be at least 1",
            );
        }
        if !seen_names.insert(skill.name.as_str()) {
            report.push(
                ValidationSeverity::Warning,
                &skill_context,
                format!("duplicate skill name '{}'", skill.name),
            );
        }
    }

    for (index, effect) in sheet.active_effects.iter().enumerate() {
        if effect.duration < 1 {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.activeEffects[{index}]"),
                "duration must be at least 1",
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::effect::EffectId;
    use crate::battle::element::Element;
    use crate::battle::sheet::{AppliedEffect, Skill};

    fn sheet() -> CharacterSheet {
        CharacterSheet::new("fire_heroine", Element::Fire, 1000, 20, 60)
    }

    #[test]
    fn clean_sheet_has_no_diagnostics() {
        assert!(validate_sheet(&sheet()).is_clean());
    }

    #[test]
    fn reports_every_broken_field() {
        let mut broken = sheet()
            .with_fatigue(51)
            .with_awakening(Awakening::Flat { ratio: 0.9 })
            .with_skill(Skill::new("Recovery", EffectId::Heal, 0))
            .with_effect(AppliedEffect::new(EffectId::Poison, 0, false));
        broken.id = " ".to_string();
        broken.skills[0].duration = 0;

        let report = validate_sheet(&broken);
        assert!(report.has_errors());
        assert_eq!(report.error_count(), 6);
        assert_eq!(report.diagnostics[0].context, "sheet");
    }

    #[test]
    fn ramp_needs_positive_turns_and_ratios() {
        let report = validate_sheet(&sheet().with_awakening(Awakening::Ramp {
            start_ratio: -0.5,
            end_ratio: 1.0,
            turns_to_awake: 0,
        }));
        assert_eq!(report.error_count(), 2);
        assert!(report
            .diagnostics
            .iter()
            .all(|d| d.context == "sheet 'fire_heroine'.awakening"));
    }

    #[test]
    fn duplicate_skill_names_only_warn() {
        let report = validate_sheet(
            &sheet()
                .with_skill(Skill::new("Recovery", EffectId::Heal, 2))
                .with_skill(Skill::new("Recovery", EffectId::Focus, 2)),
        );
        assert!(!report.has_errors());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].severity, ValidationSeverity::Warning);
        assert_eq!(
            report.diagnostics[0].to_string(),
            "warning sheet 'fire_heroine'.skills[1]: duplicate skill name 'Recovery'"
        );
    }

    #[test]
    fn warnings_skip_errors() {
        let report = validate_sheet(
            &sheet()
                .with_fatigue(60)
                .with_skill(Skill::new("Recovery", EffectId::Heal, 2))
                .with_skill(Skill::new("Recovery", EffectId::Focus, 2)),
        );
        assert_eq!(report.error_count(), 1);
        let warnings: Vec<&ValidationDiagnostic> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("duplicate skill name"));
    }
}
