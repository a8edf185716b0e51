//! Forms value objects
//!
//! Field and section shapes exactly as they travel over the wire and sit in
//! the persisted JSON column. Optional members are omitted when absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Phone,
    Number,
    Select,
    Radio,
    Checkbox,
    Date,
    File,
    Url,
    Password,
    Hidden,
    Paragraph,
}

impl FieldType {
    /// Every field type, in palette order.
    pub const ALL: [FieldType; 14] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Number,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::File,
        FieldType::Url,
        FieldType::Password,
        FieldType::Hidden,
        FieldType::Paragraph,
    ];

    /// Select, radio and checkbox fields pick from `options`.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }

    /// Paragraphs are static text; every other type collects an answer.
    pub fn collects_input(self) -> bool {
        !matches!(self, Self::Paragraph)
    }

    /// Types whose `min`/`max` bound the character count.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Textarea | Self::Email | Self::Phone | Self::Url | Self::Password | Self::Hidden
        )
    }

    /// Label given to a freshly added field of this type.
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Text => "Text Field",
            Self::Textarea => "Long Answer",
            Self::Email => "Email Address",
            Self::Phone => "Phone Number",
            Self::Number => "Number",
            Self::Select => "Dropdown",
            Self::Radio => "Multiple Choice",
            Self::Checkbox => "Checkboxes",
            Self::Date => "Date",
            Self::File => "File Upload",
            Self::Url => "Website",
            Self::Password => "Password",
            Self::Hidden => "Hidden Field",
            Self::Paragraph => "Paragraph",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Number => "number",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::File => "file",
            Self::Url => "url",
            Self::Password => "password",
            Self::Hidden => "hidden",
            Self::Paragraph => "paragraph",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field validation flags.
///
/// `min`/`max` bound the value of `number` fields and the character count
/// of text-like fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalOperator {
    #[default]
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    LessThan,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalAction {
    #[default]
    Show,
    Hide,
    Require,
    JumpTo,
}

/// One rule per field: when the watched field compares to `value` via
/// `operator`, apply `action` to the owning field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    #[serde(default)]
    pub show_when: Option<String>,
    #[serde(default)]
    pub operator: ConditionalOperator,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub action: ConditionalAction,
}

impl ConditionalLogic {
    pub fn new(
        watched: impl Into<String>,
        operator: ConditionalOperator,
        value: impl Into<String>,
        action: ConditionalAction,
    ) -> Self {
        Self {
            show_when: Some(watched.into()),
            operator,
            value: value.into(),
            action,
        }
    }

    /// Watched field id, if the rule points anywhere.
    pub fn watched(&self) -> Option<&str> {
        self.show_when.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
    #[serde(default)]
    pub order: u32,
}

impl FormField {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            name: field_name(&label),
            label,
            field_type,
            placeholder: None,
            required: false,
            options: None,
            validation: None,
            conditional_logic: None,
            order: 0,
        }
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Watched field id of this field's rule.
    pub fn watches(&self) -> Option<&str> {
        self.conditional_logic.as_ref().and_then(ConditionalLogic::watched)
    }
}

/// Input name derived from a label: lowercase, non-alphanumerics become `_`.
pub fn field_name(label: &str) -> String {
    let mut name = String::with_capacity(label.len());
    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            name.extend(c.to_lowercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    name.trim_matches('_').to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSection {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSettings {
    pub submit_button_text: String,
    pub success_message: String,
    pub allow_multiple_submissions: bool,
    pub require_login: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<DateTime<Utc>>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            submit_button_text: "Submit".into(),
            success_message: "Thank you for your submission.".into(),
            allow_multiple_submissions: false,
            require_login: true,
            closes_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_wire_names() {
        for ty in FieldType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }

    #[test]
    fn test_choice_types() {
        assert!(FieldType::Select.is_choice());
        assert!(FieldType::Radio.is_choice());
        assert!(FieldType::Checkbox.is_choice());
        assert!(!FieldType::Text.is_choice());
        assert!(!FieldType::Paragraph.collects_input());
    }

    #[test]
    fn test_field_name() {
        assert_eq!(field_name("Full Name"), "full_name");
        assert_eq!(field_name("  T-Shirt Size? "), "t_shirt_size");
        assert_eq!(field_name(""), "");
    }

    #[test]
    fn test_conditional_logic_wire_shape() {
        let rule = ConditionalLogic::new("field_a", ConditionalOperator::IsNotEmpty, "", ConditionalAction::JumpTo);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["showWhen"], "field_a");
        assert_eq!(json["operator"], "is_not_empty");
        assert_eq!(json["action"], "jump_to");
    }

    #[test]
    fn test_blank_watched_is_none() {
        let mut rule = ConditionalLogic::default();
        assert_eq!(rule.watched(), None);
        rule.show_when = Some("  ".into());
        assert_eq!(rule.watched(), None);
    }

    #[test]
    fn test_field_omits_absent_members() {
        let field = FormField::new("f1", "Full Name", FieldType::Text);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["name"], "full_name");
        assert!(json.get("options").is_none());
        assert!(json.get("conditionalLogic").is_none());
    }
}
