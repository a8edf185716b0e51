//! Persisted shape of a form definition
//!
//! Definitions live as JSON text in a single column of the owning row.

use crate::domain::FormDefinition;
use crate::Result;

pub fn to_column(form: &FormDefinition) -> Result<String> {
    Ok(serde_json::to_string(form)?)
}

pub fn from_column(text: &str) -> Result<FormDefinition> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a nullable column.
pub fn from_optional_column(text: Option<&str>) -> Result<Option<FormDefinition>> {
    text.filter(|t| !t.trim().is_empty()).map(from_column).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{FieldDraft, FormBuilder};
    use crate::domain::FieldType;
    use crate::FormsError;

    #[test]
    fn test_personal_information_round_trip() {
        let mut builder = FormBuilder::new("Registration", "Tell us about yourself");
        builder.add_section("Personal Information", None);
        builder.add_custom_field(0, FieldDraft::new("Full Name", FieldType::Text).required(true));
        builder.add_custom_field(0, FieldDraft::new("T-Shirt Size", FieldType::Select).options(["S", "M", "L"]));
        let form = builder.build();

        let column = to_column(&form).unwrap();
        let reloaded = from_column(&column).unwrap();
        assert_eq!(reloaded, form);

        let json: serde_json::Value = serde_json::from_str(&column).unwrap();
        let fields = &json["sections"][0]["fields"];
        assert_eq!(json["sections"][0]["title"], "Personal Information");
        assert_eq!(fields[0]["required"], true);
        assert_eq!(fields[1]["options"], serde_json::json!(["S", "M", "L"]));
        assert_eq!(fields[1]["required"], false);
    }

    #[test]
    fn test_optional_column() {
        assert!(from_optional_column(None).unwrap().is_none());
        assert!(from_optional_column(Some("  ")).unwrap().is_none());
        assert!(matches!(from_optional_column(Some("{")), Err(FormsError::Json(_))));
    }
}
