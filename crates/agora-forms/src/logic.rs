//! Conditional logic evaluation
//!
//! Given a definition and the answers collected so far, work out which
//! fields are visible, which are required, and which rules asked for a jump.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ConditionalAction, ConditionalLogic, ConditionalOperator, FormDefinition, FormField};

/// Answers keyed by field id.
pub type Responses = serde_json::Map<String, Value>;

/// Effective state of one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub visible: bool,
    pub required: bool,
}

/// Effective state of the whole form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    fields: HashMap<String, FieldState>,
    jump_targets: Vec<String>,
}

impl FormState {
    pub fn field(&self, id: &str) -> Option<FieldState> {
        self.fields.get(id).copied()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.field(id).is_some_and(|s| s.visible)
    }

    pub fn is_required(&self, id: &str) -> bool {
        self.field(id).is_some_and(|s| s.visible && s.required)
    }

    /// Fields whose `jump_to` rule currently holds, in form order.
    pub fn jump_targets(&self) -> &[String] {
        &self.jump_targets
    }

    pub fn hidden_count(&self) -> usize {
        self.fields.values().filter(|s| !s.visible).count()
    }
}

/// Whether a field carries a rule at all (the "Conditional" badge).
pub fn has_conditional(field: &FormField) -> bool {
    field.watches().is_some()
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Missing, null, blank strings and empty arrays count as empty.
pub fn is_blank(answer: Option<&Value>) -> bool {
    match answer {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.iter().all(|v| is_blank(Some(v))),
        Some(_) => false,
    }
}

impl ConditionalOperator {
    /// Compare an answer with the rule's value.
    pub fn compare(self, answer: Option<&Value>, expected: &str) -> bool {
        let expected = expected.trim();
        match self {
            Self::Is => equals(answer, expected),
            Self::IsNot => !equals(answer, expected),
            Self::Contains => contains(answer, expected),
            Self::DoesNotContain => !contains(answer, expected),
            Self::IsEmpty => is_blank(answer),
            Self::IsNotEmpty => !is_blank(answer),
            Self::GreaterThan => numeric(answer, expected).is_some_and(|(a, b)| a > b),
            Self::LessThan => numeric(answer, expected).is_some_and(|(a, b)| a < b),
        }
    }
}

fn equals(answer: Option<&Value>, expected: &str) -> bool {
    match answer {
        Some(Value::Array(items)) => items.iter().any(|v| as_text(v) == expected),
        Some(value) => as_text(value) == expected,
        None => expected.is_empty(),
    }
}

fn contains(answer: Option<&Value>, expected: &str) -> bool {
    match answer {
        Some(Value::Array(items)) => items.iter().any(|v| as_text(v) == expected),
        Some(value) => as_text(value).contains(expected),
        None => false,
    }
}

fn numeric(answer: Option<&Value>, expected: &str) -> Option<(f64, f64)> {
    let actual = as_number(answer?)?;
    let expected = expected.parse::<f64>().ok()?;
    Some((actual, expected))
}

impl ConditionalLogic {
    /// Whether the rule's condition holds against `answer`.
    pub fn holds(&self, answer: Option<&Value>) -> bool {
        self.operator.compare(answer, &self.value)
    }
}

/// Rules that point at themselves or at nothing are inactive.
fn active_rule<'a>(form: &FormDefinition, field: &'a FormField) -> Option<(&'a ConditionalLogic, &'a str)> {
    let rule = field.conditional_logic.as_ref()?;
    let watched = rule.watched()?;
    if watched == field.id {
        return None;
    }
    if form.field(watched).is_none() {
        tracing::debug!(field = %field.id, watched, "ignoring rule with dangling watched field");
        return None;
    }
    Some((rule, watched))
}

fn visible_answer<'r>(responses: &'r Responses, visible: &HashMap<&str, bool>, id: &str) -> Option<&'r Value> {
    if visible.get(id).copied().unwrap_or(false) {
        responses.get(id)
    } else {
        None
    }
}

/// Evaluate every rule in `form` against `responses`.
///
/// A hidden field's answer is treated as empty by the rules that watch it.
/// Visibility is iterated to a fixed point, bounded by the number of fields,
/// so rule cycles terminate.
pub fn evaluate(form: &FormDefinition, responses: &Responses) -> FormState {
    let rules: Vec<(&FormField, Option<(&ConditionalLogic, &str)>)> =
        form.fields().map(|f| (f, active_rule(form, f))).collect();

    let mut visible: HashMap<&str, bool> = rules.iter().map(|(f, _)| (f.id.as_str(), true)).collect();

    for _ in 0..=rules.len() {
        let mut changed = false;
        for (field, rule) in &rules {
            let shown = match rule {
                Some((rule, watched)) => {
                    let holds = rule.holds(visible_answer(responses, &visible, watched));
                    match rule.action {
                        ConditionalAction::Show => holds,
                        ConditionalAction::Hide => !holds,
                        ConditionalAction::Require | ConditionalAction::JumpTo => true,
                    }
                }
                None => true,
            };
            if visible.insert(field.id.as_str(), shown) != Some(shown) {
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut state = FormState::default();
    for (field, rule) in &rules {
        let holds = rule.is_some_and(|(rule, watched)| rule.holds(visible_answer(responses, &visible, watched)));
        let action = rule.map(|(rule, _)| rule.action);
        let is_visible = visible.get(field.id.as_str()).copied().unwrap_or(true);
        let required = field.required || (holds && action == Some(ConditionalAction::Require));
        if holds && action == Some(ConditionalAction::JumpTo) && is_visible {
            state.jump_targets.push(field.id.clone());
        }
        state.fields.insert(field.id.clone(), FieldState { visible: is_visible, required });
    }
    tracing::debug!(fields = rules.len(), hidden = state.hidden_count(), "evaluated form logic");
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldType, FormSection};
    use serde_json::json;

    fn responses(value: Value) -> Responses {
        value.as_object().cloned().unwrap_or_default()
    }

    fn form_with(fields: Vec<FormField>) -> FormDefinition {
        let mut form = FormDefinition::new("Test", "");
        form.sections.push(FormSection {
            id: "s1".into(),
            title: "Main".into(),
            description: None,
            fields,
        });
        form
    }

    fn ruled(id: &str, watched: &str, op: ConditionalOperator, value: &str, action: ConditionalAction) -> FormField {
        let mut field = FormField::new(id, id, FieldType::Text);
        field.conditional_logic = Some(ConditionalLogic::new(watched, op, value, action));
        field
    }

    #[test]
    fn test_operators() {
        use ConditionalOperator::*;
        let yes = json!("yes");
        let list = json!(["a", "b"]);
        let ten = json!(10);
        let blank = json!("  ");

        assert!(Is.compare(Some(&yes), "yes"));
        assert!(IsNot.compare(Some(&yes), "no"));
        assert!(Is.compare(Some(&list), "b"));
        assert!(Contains.compare(Some(&json!("hello world")), "world"));
        assert!(DoesNotContain.compare(Some(&list), "c"));
        assert!(IsEmpty.compare(None, ""));
        assert!(IsEmpty.compare(Some(&blank), ""));
        assert!(IsEmpty.compare(Some(&json!([])), ""));
        assert!(IsNotEmpty.compare(Some(&ten), ""));
        assert!(GreaterThan.compare(Some(&ten), "5"));
        assert!(LessThan.compare(Some(&json!("3.5")), "4"));
        assert!(!GreaterThan.compare(Some(&yes), "5"));
        assert!(!LessThan.compare(Some(&ten), "abc"));
    }

    #[test]
    fn test_show_and_hide() {
        let form = form_with(vec![
            FormField::new("attending", "Attending", FieldType::Radio),
            ruled("diet", "attending", ConditionalOperator::Is, "yes", ConditionalAction::Show),
            ruled("reason", "attending", ConditionalOperator::Is, "yes", ConditionalAction::Hide),
        ]);

        let state = evaluate(&form, &responses(json!({"attending": "yes"})));
        assert!(state.is_visible("diet"));
        assert!(!state.is_visible("reason"));

        let state = evaluate(&form, &responses(json!({"attending": "no"})));
        assert!(!state.is_visible("diet"));
        assert!(state.is_visible("reason"));
    }

    #[test]
    fn test_require_and_jump() {
        let form = form_with(vec![
            FormField::new("age", "Age", FieldType::Number),
            ruled("guardian", "age", ConditionalOperator::LessThan, "18", ConditionalAction::Require),
            ruled("summary", "age", ConditionalOperator::GreaterThan, "64", ConditionalAction::JumpTo),
        ]);

        let state = evaluate(&form, &responses(json!({"age": 12})));
        assert!(state.is_required("guardian"));
        assert!(state.jump_targets().is_empty());

        let state = evaluate(&form, &responses(json!({"age": "70"})));
        assert!(!state.is_required("guardian"));
        assert_eq!(state.jump_targets(), ["summary".to_string()]);
    }

    #[test]
    fn test_hidden_answers_cascade() {
        let form = form_with(vec![
            FormField::new("a", "A", FieldType::Text),
            ruled("b", "a", ConditionalOperator::Is, "on", ConditionalAction::Show),
            ruled("c", "b", ConditionalOperator::IsNotEmpty, "", ConditionalAction::Show),
        ]);
        let state = evaluate(&form, &responses(json!({"a": "off", "b": "stale"})));
        assert!(!state.is_visible("b"));
        assert!(!state.is_visible("c"));
    }

    #[test]
    fn test_dangling_and_self_rules_are_inactive() {
        let form = form_with(vec![
            ruled("x", "ghost", ConditionalOperator::Is, "1", ConditionalAction::Show),
            ruled("y", "y", ConditionalOperator::Is, "1", ConditionalAction::Show),
        ]);
        let state = evaluate(&form, &Responses::new());
        assert!(state.is_visible("x"));
        assert!(state.is_visible("y"));
        assert!(has_conditional(form.field("x").unwrap()));
    }

    #[test]
    fn test_cycle_terminates() {
        let form = form_with(vec![
            ruled("p", "q", ConditionalOperator::IsEmpty, "", ConditionalAction::Show),
            ruled("q", "p", ConditionalOperator::IsEmpty, "", ConditionalAction::Show),
        ]);
        let state = evaluate(&form, &responses(json!({"p": "1", "q": "1"})));
        assert!(state.field("p").is_some());
        assert!(state.field("q").is_some());
    }
}
