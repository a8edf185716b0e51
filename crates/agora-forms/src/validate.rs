//! Response validation
//!
//! Checks a submitted answer map against a definition after its conditional
//! logic has been applied. Hidden fields and paragraphs are skipped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{FieldType, FormDefinition, FormField};
use crate::logic::{evaluate, is_blank, FormState, Responses};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_id: String,
    pub label: String,
    pub message: String,
}

/// Validate `responses`; on success return the evaluated form state.
pub fn validate(form: &FormDefinition, responses: &Responses) -> Result<FormState, Vec<FieldError>> {
    let state = evaluate(form, responses);
    let mut errors = Vec::new();

    for field in form.fields() {
        if !field.field_type.collects_input() || !state.is_visible(&field.id) {
            continue;
        }
        let answer = responses.get(&field.id);
        let problem = if is_blank(answer) {
            state.is_required(&field.id).then(|| format!("{} is required", field.label))
        } else {
            answer.and_then(|value| check_answer(field, value))
        };
        if let Some(message) = problem {
            let message = field
                .validation
                .as_ref()
                .and_then(|v| v.message.clone())
                .unwrap_or(message);
            errors.push(FieldError {
                field_id: field.id.clone(),
                label: field.label.clone(),
                message,
            });
        }
    }

    if errors.is_empty() {
        Ok(state)
    } else {
        tracing::debug!(errors = errors.len(), "response rejected");
        Err(errors)
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Type and bound checks for a non-blank answer.
fn check_answer(field: &FormField, value: &Value) -> Option<String> {
    let label = &field.label;

    if field.field_type == FieldType::Checkbox {
        let picked: Option<Vec<String>> = match value {
            Value::Array(items) => items.iter().map(text_of).collect(),
            other => text_of(other).map(|p| vec![p]),
        };
        let Some(picked) = picked else {
            return Some(format!("{label} must be a list of options"));
        };
        return picked
            .iter()
            .find(|p| !field.options().contains(p))
            .map(|p| format!("{label}: `{p}` is not one of the options"));
    }

    let Some(text) = text_of(value) else {
        return Some(format!("{label} must be a single value"));
    };
    let validation = field.validation.clone().unwrap_or_default();

    match field.field_type {
        FieldType::Email if !is_email(&text) => return Some(format!("{label} must be a valid email address")),
        FieldType::Url if !is_web_url(&text) => return Some(format!("{label} must be a valid http(s) URL")),
        FieldType::Phone if !is_phone(&text) => return Some(format!("{label} must be a valid phone number")),
        FieldType::Date if NaiveDate::parse_from_str(&text, "%Y-%m-%d").is_err() => {
            return Some(format!("{label} must be a date (YYYY-MM-DD)"))
        }
        FieldType::Select | FieldType::Radio if !field.options().contains(&text) => {
            return Some(format!("{label}: `{text}` is not one of the options"))
        }
        FieldType::Number => {
            let Some(number) = text.parse::<f64>().ok().filter(|n| n.is_finite()) else {
                return Some(format!("{label} must be a number"));
            };
            if let Some(min) = validation.min.filter(|min| number < *min) {
                return Some(format!("{label} must be at least {min}"));
            }
            if let Some(max) = validation.max.filter(|max| number > *max) {
                return Some(format!("{label} must be at most {max}"));
            }
        }
        _ => {}
    }

    if field.field_type.is_text_like() {
        let length = text.chars().count() as f64;
        if let Some(min) = validation.min.filter(|min| length < *min) {
            return Some(format!("{label} must be at least {min} characters"));
        }
        if let Some(max) = validation.max.filter(|max| length > *max) {
            return Some(format!("{label} must be at most {max} characters"));
        }
    }

    if let Some(pattern) = &validation.pattern {
        // Invalid patterns are reported by `check`, not here.
        if let Ok(re) = regex::Regex::new(&format!("^(?:{pattern})$")) {
            if !re.is_match(&text) {
                return Some(format!("{label} has an invalid format"));
            }
        }
    }

    None
}

fn is_email(text: &str) -> bool {
    let mut parts = text.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !text.contains(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
        }
        _ => false,
    }
}

fn is_web_url(text: &str) -> bool {
    url::Url::parse(text)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}

fn is_phone(text: &str) -> bool {
    let stripped = text.strip_prefix('+').unwrap_or(text);
    let digits: String = stripped
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
