//! Form definition aggregate
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{FormField, FormSection, FormSettings};
use crate::{FormsError, Result};

/// A user-built form: sections of fields, plus submission settings.
///
/// Loaded and saved as a whole document; there is no partial update or
/// versioning beyond replacing it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<FormSection>,
    #[serde(default)]
    pub settings: FormSettings,
}

impl FormDefinition {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            sections: vec![],
            settings: FormSettings::default(),
        }
    }

    /// All fields, in section order.
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields().find(|f| f.id == id)
    }

    /// Fields whose rule watches `id`.
    pub fn dependents_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a FormField> + 'a {
        self.fields().filter(move |f| f.watches() == Some(id))
    }

    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.settings.closes_at.is_some_and(|at| now >= at)
    }

    pub fn ensure_open(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_closed(now) {
            return Err(FormsError::FormClosed);
        }
        Ok(())
    }
}
