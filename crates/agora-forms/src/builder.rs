//! Form builder
//!
//! State transitions over an in-memory [`FormDefinition`]. Nothing here does
//! I/O. Requests that make no sense (blank titles, indices out of range,
//! option edits on non-choice fields) are ignored; the return value tells the
//! caller whether anything changed.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::domain::{
    field_name, ConditionalLogic, FieldType, FieldValidation, FormDefinition, FormField, FormSection,
};

fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// A caller-labelled field for [`FormBuilder::add_custom_field`].
#[derive(Clone, Debug)]
pub struct FieldDraft {
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub placeholder: Option<String>,
    pub options: Option<Vec<String>>,
}

impl FieldDraft {
    pub fn new(label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            field_type,
            required: false,
            placeholder: None,
            options: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }
}

/// Present-but-null deserializes to `Some(None)`, absent to `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update of a field.
///
/// Each member that is `Some` replaces the whole property. Nested objects
/// (`validation`, `conditionalLogic`) are not merged: pass the complete
/// object. Nullable members use `Some(None)` to clear.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub field_type: Option<FieldType>,
    #[serde(default, deserialize_with = "nullable")]
    pub placeholder: Option<Option<String>>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub options: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub validation: Option<Option<FieldValidation>>,
    #[serde(default, deserialize_with = "nullable")]
    pub conditional_logic: Option<Option<ConditionalLogic>>,
    #[serde(default)]
    pub order: Option<u32>,
}

impl FieldPatch {
    pub fn apply(self, field: &mut FormField) {
        if let Some(label) = self.label {
            field.label = label;
        }
        if let Some(name) = self.name {
            field.name = name;
        }
        if let Some(field_type) = self.field_type {
            field.field_type = field_type;
        }
        if let Some(placeholder) = self.placeholder {
            field.placeholder = placeholder;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(options) = self.options {
            field.options = options;
        }
        if let Some(validation) = self.validation {
            field.validation = validation;
        }
        if let Some(logic) = self.conditional_logic {
            field.conditional_logic = logic;
        }
        if let Some(order) = self.order {
            field.order = order;
        }
    }
}

/// Builder over one form definition.
#[derive(Clone, Debug, Default)]
pub struct FormBuilder {
    form: FormDefinition,
}

impl FormBuilder {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_definition(FormDefinition::new(title, description))
    }

    /// Resume editing a saved definition.
    pub fn from_definition(form: FormDefinition) -> Self {
        Self { form }
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.form
    }

    pub fn build(self) -> FormDefinition {
        self.form
    }

    // ---------------------------------------------------------------------
    // Sections
    // ---------------------------------------------------------------------

    /// Append an empty section. Blank titles are ignored.
    pub fn add_section(&mut self, title: &str, description: Option<&str>) -> Option<usize> {
        if title.trim().is_empty() {
            return None;
        }
        self.form.sections.push(FormSection {
            id: generate_id("section"),
            title: title.to_string(),
            description: description.map(str::to_string).filter(|d| !d.is_empty()),
            fields: vec![],
        });
        Some(self.form.sections.len() - 1)
    }

    pub fn update_section(&mut self, index: usize, title: &str, description: Option<&str>) -> bool {
        if title.trim().is_empty() {
            return false;
        }
        let Some(section) = self.form.sections.get_mut(index) else {
            return false;
        };
        section.title = title.to_string();
        section.description = description.map(str::to_string).filter(|d| !d.is_empty());
        true
    }

    /// Splice a section out. Rules elsewhere that watch its fields are left
    /// as they are; see [`FormBuilder::prune_dangling_logic`].
    pub fn remove_section(&mut self, index: usize) -> Option<FormSection> {
        if index >= self.form.sections.len() {
            return None;
        }
        let removed = self.form.sections.remove(index);
        for field in &removed.fields {
            self.note_dangling(&field.id);
        }
        Some(removed)
    }

    // ---------------------------------------------------------------------
    // Fields
    // ---------------------------------------------------------------------

    /// Append a field of `field_type` with its default label.
    pub fn add_field(&mut self, section: usize, field_type: FieldType) -> Option<&FormField> {
        let mut draft = FieldDraft::new(field_type.default_label(), field_type);
        if field_type.is_choice() {
            draft = draft.options(["Option 1"]);
        }
        self.add_custom_field(section, draft)
    }

    /// Append a caller-labelled field. Blank labels are ignored.
    pub fn add_custom_field(&mut self, section: usize, draft: FieldDraft) -> Option<&FormField> {
        if draft.label.trim().is_empty() {
            return None;
        }
        let fields = &mut self.form.sections.get_mut(section)?.fields;
        let order = fields.len() as u32;
        fields.push(FormField {
            id: generate_id("field"),
            name: field_name(&draft.label),
            label: draft.label,
            field_type: draft.field_type,
            placeholder: draft.placeholder,
            required: draft.required,
            options: draft.options,
            validation: None,
            conditional_logic: None,
            order,
        });
        fields.last()
    }

    pub fn update_field(&mut self, section: usize, field: usize, patch: FieldPatch) -> Option<&FormField> {
        let target = self.field_mut(section, field)?;
        patch.apply(target);
        Some(&*target)
    }

    pub fn remove_field(&mut self, section: usize, field: usize) -> Option<FormField> {
        let fields = &mut self.form.sections.get_mut(section)?.fields;
        if field >= fields.len() {
            return None;
        }
        let removed = fields.remove(field);
        self.note_dangling(&removed.id);
        Some(removed)
    }

    fn note_dangling(&self, removed_id: &str) {
        let watchers = self.form.dependents_of(removed_id).count();
        if watchers > 0 {
            tracing::debug!(field_id = removed_id, watchers, "removed field is still watched by conditional logic");
        }
    }

    /// Move a field within its section and renumber `order` to positions.
    pub fn move_field(&mut self, section: usize, from: usize, to: usize) -> bool {
        let Some(fields) = self.form.sections.get_mut(section).map(|s| &mut s.fields) else {
            return false;
        };
        if from >= fields.len() || to >= fields.len() {
            return false;
        }
        let moved = fields.remove(from);
        fields.insert(to, moved);
        for (position, field) in fields.iter_mut().enumerate() {
            field.order = position as u32;
        }
        true
    }

    // ---------------------------------------------------------------------
    // Options (select / radio / checkbox)
    // ---------------------------------------------------------------------

    pub fn add_option(&mut self, section: usize, field: usize, value: &str) -> bool {
        match self.choice_field_mut(section, field) {
            Some(target) => {
                target.options.get_or_insert_with(Vec::new).push(value.to_string());
                true
            }
            None => false,
        }
    }

    pub fn remove_option(&mut self, section: usize, field: usize, option: usize) -> bool {
        let Some(options) = self.options_mut(section, field) else {
            return false;
        };
        if option >= options.len() {
            return false;
        }
        options.remove(option);
        true
    }

    pub fn update_option(&mut self, section: usize, field: usize, option: usize, value: &str) -> bool {
        match self.options_mut(section, field).and_then(|o| o.get_mut(option)) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Logic hygiene
    // ---------------------------------------------------------------------

    /// Clear rules whose watched field no longer exists. Returns how many
    /// rules were cleared.
    pub fn prune_dangling_logic(&mut self) -> usize {
        let ids: std::collections::HashSet<String> = self.form.fields().map(|f| f.id.clone()).collect();
        let mut cleared = 0;
        for field in self.form.sections.iter_mut().flat_map(|s| s.fields.iter_mut()) {
            let dangling = field
                .conditional_logic
                .as_ref()
                .and_then(ConditionalLogic::watched)
                .is_some_and(|watched| !ids.contains(watched));
            if dangling {
                tracing::debug!(field = %field.id, "clearing rule with dangling watched field");
                field.conditional_logic = None;
                cleared += 1;
            }
        }
        cleared
    }

    fn field_mut(&mut self, section: usize, field: usize) -> Option<&mut FormField> {
        self.form.sections.get_mut(section)?.fields.get_mut(field)
    }

    fn choice_field_mut(&mut self, section: usize, field: usize) -> Option<&mut FormField> {
        self.field_mut(section, field).filter(|f| f.field_type.is_choice())
    }

    fn options_mut(&mut self, section: usize, field: usize) -> Option<&mut Vec<String>> {
        self.choice_field_mut(section, field)?.options.as_mut()
    }
}
