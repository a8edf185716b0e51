use std::collections::HashSet;

use agora_forms::codec::{from_column, to_column};
use agora_forms::{FieldPatch, FieldType, FormBuilder};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn field_type() -> impl Strategy<Value = FieldType> {
    prop::sample::select(FieldType::ALL.to_vec())
}

fn populated(types: &[Vec<FieldType>]) -> FormBuilder {
    let mut builder = FormBuilder::new("Generated", "");
    for (index, section) in types.iter().enumerate() {
        builder.add_section(&format!("Section {index}"), None);
        for ty in section {
            builder.add_field(index, *ty);
        }
    }
    builder
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn add_field_order_matches_previous_count(types in prop::collection::vec(field_type(), 0..24)) {
        let mut builder = FormBuilder::new("Order", "");
        builder.add_section("Only", None);
        let mut seen = HashSet::new();
        for (previous, ty) in types.into_iter().enumerate() {
            let field = builder.add_field(0, ty).expect("section exists").clone();
            prop_assert_eq!(field.order as usize, previous);
            prop_assert!(seen.insert(field.id));
        }
    }

    #[test]
    fn remove_section_shrinks_by_one(
        sections in prop::collection::vec(prop::collection::vec(field_type(), 0..4), 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut builder = populated(&sections);
        let before = builder.definition().sections.len();
        let index = pick.index(before);
        prop_assert!(builder.remove_section(index).is_some());
        prop_assert_eq!(builder.definition().sections.len(), before - 1);
    }

    #[test]
    fn remove_section_out_of_range_is_noop(
        sections in prop::collection::vec(prop::collection::vec(field_type(), 0..3), 0..4),
        extra in 0usize..10,
    ) {
        let mut builder = populated(&sections);
        let before = builder.definition().clone();
        prop_assert!(builder.remove_section(before.sections.len() + extra).is_none());
        prop_assert_eq!(builder.definition(), &before);
    }

    #[test]
    fn patch_preserves_untouched_properties(
        ty in field_type(),
        label in "[A-Za-z ]{1,20}",
        required in any::<bool>(),
    ) {
        let mut builder = FormBuilder::new("Merge", "");
        builder.add_section("Only", None);
        let original = builder.add_field(0, ty).expect("section exists").clone();

        let patch = FieldPatch { label: Some(label.clone()), required: Some(required), ..Default::default() };
        let patched = builder.update_field(0, 0, patch).expect("field exists").clone();

        prop_assert_eq!(&patched.label, &label);
        prop_assert_eq!(patched.required, required);
        prop_assert_eq!(&patched.id, &original.id);
        prop_assert_eq!(&patched.name, &original.name);
        prop_assert_eq!(patched.field_type, original.field_type);
        prop_assert_eq!(&patched.options, &original.options);
        prop_assert_eq!(&patched.validation, &original.validation);
        prop_assert_eq!(&patched.conditional_logic, &original.conditional_logic);
        prop_assert_eq!(patched.order, original.order);
    }

    #[test]
    fn column_round_trip(sections in prop::collection::vec(prop::collection::vec(field_type(), 0..5), 0..4)) {
        let form = populated(&sections).build();
        let column = to_column(&form).expect("encode");
        prop_assert_eq!(from_column(&column).expect("decode"), form);
    }
}
