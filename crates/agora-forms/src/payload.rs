//! Submission payloads
//!
//! Entity create/update requests travel as multipart bodies of named text
//! parts. Array and object values are JSON-stringified into a single part and
//! parsed back on the receiving side.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{FormDefinition, FormSection, FormSettings};

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("missing required fields: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("field `{field}` is not valid JSON: {source}")]
    InvalidJson {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("field `{field}` could not be encoded: {source}")]
    Encode {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered named text parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    parts: Vec<(String, String)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PayloadBuilder {
        PayloadBuilder::default()
    }

    /// Set a part; a repeated name replaces the earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.parts.push((name, value)),
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Non-blank text of a part.
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.text(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.text(name).is_some()
    }

    /// Parse a JSON-stringified part. Absent or blank parts are `None`.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, PayloadError> {
        let Some(raw) = self.non_blank(name) else {
            return Ok(None);
        };
        serde_json::from_str(raw).map(Some).map_err(|source| PayloadError::InvalidJson {
            field: name.to_string(),
            source,
        })
    }

    /// Every name in `names` must be present and non-blank.
    pub fn require(&self, names: &[&str]) -> Result<(), PayloadError> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| self.non_blank(n).is_none())
            .map(|n| n.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PayloadError::Missing(missing))
        }
    }

    /// Reassemble a form definition written by [`PayloadBuilder::form`].
    ///
    /// `None` when the `{prefix}Sections` part is absent.
    pub fn form(&self, prefix: &str) -> Result<Option<FormDefinition>, PayloadError> {
        let Some(sections) = self.json::<Vec<FormSection>>(&format!("{prefix}Sections"))? else {
            return Ok(None);
        };
        let settings = self
            .json::<FormSettings>(&format!("{prefix}Settings"))?
            .unwrap_or_default();
        Ok(Some(FormDefinition {
            title: self.text(&format!("{prefix}Title")).unwrap_or_default().to_string(),
            description: self.text(&format!("{prefix}Description")).unwrap_or_default().to_string(),
            sections,
            settings,
        }))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parts.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl IntoIterator for Payload {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

#[derive(Debug, Default)]
pub struct PayloadBuilder {
    payload: Payload,
}

impl PayloadBuilder {
    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.payload.insert(name, value);
        self
    }

    pub fn opt_text(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    /// JSON-stringify `value` into one part.
    pub fn json<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> Result<Self, PayloadError> {
        let encoded = serde_json::to_string(value).map_err(|source| PayloadError::Encode {
            field: name.to_string(),
            source,
        })?;
        self.payload.insert(name, encoded);
        Ok(self)
    }

    /// Write `form` as `{prefix}Title`, `{prefix}Description`,
    /// `{prefix}Sections` and `{prefix}Settings`.
    pub fn form(self, prefix: &str, form: &FormDefinition) -> Result<Self, PayloadError> {
        self.text(&format!("{prefix}Title"), form.title.as_str())
            .text(&format!("{prefix}Description"), form.description.as_str())
            .json(&format!("{prefix}Sections"), &form.sections)?
            .json(&format!("{prefix}Settings"), &form.settings)
    }

    pub fn build(self) -> Payload {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{FieldDraft, FormBuilder};
    use crate::domain::FieldType;

    #[test]
    fn test_arrays_are_stringified() {
        let payload = Payload::builder()
            .text("title", "Hack night")
            .json("tags", &["rust", "meetup"])
            .unwrap()
            .build();
        assert_eq!(payload.text("tags"), Some(r#"["rust","meetup"]"#));
        let tags: Vec<String> = payload.json("tags").unwrap().unwrap();
        assert_eq!(tags, vec!["rust", "meetup"]);
    }

    #[test]
    fn test_require_lists_every_missing_name() {
        let payload = Payload::builder().text("title", "x").text("category", "  ").build();
        let err = payload.require(&["title", "description", "category"]).unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: description, category");
    }

    #[test]
    fn test_invalid_json_part() {
        let mut payload = Payload::new();
        payload.insert("tags", "[not json");
        assert!(matches!(payload.json::<Vec<String>>("tags"), Err(PayloadError::InvalidJson { .. })));
    }

    #[test]
    fn test_insert_replaces() {
        let mut payload = Payload::new();
        payload.insert("title", "a");
        payload.insert("title", "b");
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.text("title"), Some("b"));
    }

    #[test]
    fn test_form_round_trip() {
        let mut builder = FormBuilder::new("Registration", "Sign up here");
        builder.add_section("Personal Information", None);
        builder.add_custom_field(0, FieldDraft::new("Full Name", FieldType::Text).required(true));
        let form = builder.build();

        let payload = Payload::builder().form("form", &form).unwrap().build();
        assert!(payload.contains("formSections"));
        assert_eq!(payload.form("form").unwrap(), Some(form));
        assert_eq!(payload.form("other").unwrap(), None);
    }
}
