//! Definition checks
//!
//! Structural problems a builder can leave behind. Nothing here mutates the
//! definition; cleanup is the caller's call.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{FormDefinition, FormField};
use crate::{FormsError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionIssue {
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    pub message: String,
}

impl DefinitionIssue {
    fn error(field: Option<&FormField>, message: String) -> Self {
        Self {
            severity: Severity::Error,
            field_id: field.map(|f| f.id.clone()),
            message,
        }
    }

    fn warning(field: Option<&FormField>, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            field_id: field.map(|f| f.id.clone()),
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field_id {
            Some(id) => write!(f, "{id}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Every issue in `form`, errors and warnings, in form order.
pub fn check(form: &FormDefinition) -> Vec<DefinitionIssue> {
    let mut issues = Vec::new();

    let mut section_ids = HashSet::new();
    for section in &form.sections {
        if !section_ids.insert(section.id.as_str()) {
            issues.push(DefinitionIssue::error(None, format!("duplicate section id `{}`", section.id)));
        }
        if section.title.trim().is_empty() {
            issues.push(DefinitionIssue::warning(None, format!("section `{}` has no title", section.id)));
        }
    }

    let mut field_ids = HashSet::new();
    for field in form.fields() {
        if !field_ids.insert(field.id.as_str()) {
            issues.push(DefinitionIssue::error(Some(field), format!("duplicate field id `{}`", field.id)));
        }
    }

    for field in form.fields() {
        if let Some(watched) = field.watches() {
            if watched == field.id {
                issues.push(DefinitionIssue::error(Some(field), "rule watches its own field".into()));
            } else if !field_ids.contains(watched) {
                issues.push(DefinitionIssue::error(
                    Some(field),
                    format!("rule watches missing field `{watched}`"),
                ));
            }
        }
        if field.label.trim().is_empty() {
            issues.push(DefinitionIssue::warning(Some(field), "field has no label".into()));
        }
        if field.field_type.is_choice() && field.options().is_empty() {
            issues.push(DefinitionIssue::warning(
                Some(field),
                format!("{} field has no options", field.field_type),
            ));
        }
        if let Some(validation) = &field.validation {
            if let (Some(min), Some(max)) = (validation.min, validation.max) {
                if min > max {
                    issues.push(DefinitionIssue::warning(Some(field), format!("min {min} exceeds max {max}")));
                }
            }
            if let Some(pattern) = &validation.pattern {
                if let Err(e) = regex::Regex::new(pattern) {
                    issues.push(DefinitionIssue::warning(Some(field), format!("invalid pattern: {e}")));
                }
            }
        }
    }

    issues
}

/// Fail on errors; hand back the warnings otherwise.
pub fn ensure_valid(form: &FormDefinition) -> Result<Vec<DefinitionIssue>> {
    let (errors, warnings): (Vec<_>, Vec<_>) = check(form).into_iter().partition(DefinitionIssue::is_error);
    if errors.is_empty() {
        return Ok(warnings);
    }
    let summary = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
    Err(FormsError::InvalidDefinition(summary))
}
