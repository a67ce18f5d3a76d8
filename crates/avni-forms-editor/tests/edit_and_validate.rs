//! Editing Session Scenarios
//!
//! Edits applied to a form received from the server, followed by validation:
//! - Disallowed changes to selection mode and repeatability
//! - Error state attached to the tree
//! - Structural edits never lose entities

use avni_forms_editor::{
    ElementField, FormEdit, GroupField, OriginalShapes, ValidFormatPart, Validator,
};
use avni_forms_model::{Concept, DataType, FormDefinition, REPEATABLE};
use avni_forms_rules::DeclarativeRuleCompiler;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn server_form() -> FormDefinition {
    serde_json::from_value(json!({
        "uuid": "f-1",
        "name": "ANC visit",
        "formType": "ProgramEncounter",
        "formElementGroups": [{
            "uuid": "g-1",
            "name": "Examination",
            "displayOrder": 1,
            "formElements": [
                {
                    "uuid": "e-symptoms",
                    "name": "Symptoms",
                    "type": "MultiSelect",
                    "displayOrder": 1,
                    "concept": {"uuid": "c-1", "name": "Symptoms", "dataType": "Coded", "answers": [
                        {"uuid": "a-1", "name": "Fever", "order": 0},
                        {"uuid": "a-2", "name": "Cough", "order": 1}
                    ]},
                    "keyValues": []
                },
                {
                    "uuid": "e-children",
                    "name": "Children",
                    "displayOrder": 2,
                    "concept": {"uuid": "c-2", "name": "Children", "dataType": "QuestionGroup"},
                    "keyValues": [{"key": "repeatable", "value": true}]
                },
                {
                    "uuid": "e-code",
                    "name": "Code",
                    "displayOrder": 3,
                    "concept": {"uuid": "c-3", "name": "Code", "dataType": "Text"},
                    "keyValues": []
                }
            ]
        }]
    }))
    .unwrap()
}

fn compiler() -> DeclarativeRuleCompiler {
    DeclarativeRuleCompiler::new()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_clearing_multi_select_is_a_disallowed_change() {
    let mut form = server_form();
    let originals = OriginalShapes::of(&form);

    FormEdit::SetElementField {
        group: 0,
        element: 0,
        field: ElementField::Type(Some(String::new())),
    }
    .apply(&mut form);

    let report = Validator::new(&compiler(), &originals).validate(&mut form);
    let errors = &report.element_errors["e-symptoms"];
    assert!(errors.disallowed_change_error);
    assert!(errors.element_type);
    assert!(form.form_element_groups[0].form_elements[0].error);
    assert!(form.form_element_groups[0].expanded);
}

#[test]
fn test_repeatability_flip_is_a_disallowed_change() {
    let mut form = server_form();
    let originals = OriginalShapes::of(&form);

    FormEdit::SetKeyValue {
        group: 0,
        element: 1,
        key: REPEATABLE.into(),
        value: json!(false),
    }
    .apply(&mut form);

    let report = Validator::new(&compiler(), &originals).validate(&mut form);
    assert_eq!(report.element_error_count, 1);
    assert!(report.element_errors["e-children"].disallowed_change_error);
}

#[test]
fn test_concept_swap_on_multi_select_is_a_disallowed_change() {
    let mut form = server_form();
    let originals = OriginalShapes::of(&form);

    FormEdit::SetConcept {
        group: 0,
        element: 0,
        concept: Arc::new(Concept::new("Notes", DataType::Text)),
    }
    .apply(&mut form);
    assert_eq!(form.form_element_groups[0].form_elements[0].element_type, None);

    let report = Validator::new(&compiler(), &originals).validate(&mut form);
    assert!(!report.is_valid());
    assert!(report.element_errors["e-symptoms"].disallowed_change_error);
}

#[test]
fn test_concept_swap_on_repeatable_group_is_a_disallowed_change() {
    let mut form = server_form();
    let originals = OriginalShapes::of(&form);

    FormEdit::SetConcept {
        group: 0,
        element: 1,
        concept: Arc::new(Concept::new("Child name", DataType::Text)),
    }
    .apply(&mut form);

    let report = Validator::new(&compiler(), &originals).validate(&mut form);
    assert!(!report.is_valid());
    assert!(report.element_errors["e-children"].disallowed_change_error);
}

#[test]
fn test_valid_format_both_or_neither() {
    let compiler = compiler();
    let mut form = server_form();
    let originals = OriginalShapes::of(&form);
    let set = |form: &mut FormDefinition, part, value: &str| {
        FormEdit::SetValidFormat {
            group: 0,
            element: 2,
            part,
            value: value.into(),
        }
        .apply(form)
    };

    set(&mut form, ValidFormatPart::Regex, "^[A-Z]{3}$");
    let report = Validator::new(&compiler, &originals).validate(&mut form);
    assert!(report.element_errors["e-code"].valid_format);

    set(&mut form, ValidFormatPart::DescriptionKey, "threeLetters");
    assert!(Validator::new(&compiler, &originals).validate(&mut form).is_valid());

    set(&mut form, ValidFormatPart::Regex, "");
    set(&mut form, ValidFormatPart::DescriptionKey, "");
    assert!(Validator::new(&compiler, &originals).validate(&mut form).is_valid());
}

#[test]
fn test_fixing_errors_clears_tree_state() {
    let mut form = server_form();
    let originals = OriginalShapes::of(&form);
    FormEdit::SetGroupField {
        group: 0,
        field: GroupField::Name(String::new()),
    }
    .apply(&mut form);

    let report = Validator::new(&compiler(), &originals).validate(&mut form);
    assert_eq!(report.message, "There is an error in 1 form group(s).");
    assert!(form.form_element_groups[0].error);

    FormEdit::SetGroupField {
        group: 0,
        field: GroupField::Name("Examination".into()),
    }
    .apply(&mut form);
    let report = Validator::new(&compiler(), &originals).validate(&mut form);
    assert!(report.is_valid());
    assert!(!form.form_element_groups[0].error);
    assert!(!form.form_element_groups[0].expanded);
}

// ============================================================================
// Properties
// ============================================================================

fn structural_edit() -> impl Strategy<Value = FormEdit> {
    prop_oneof![
        (0usize..6).prop_map(|after| FormEdit::AddGroup { after }),
        (0usize..6).prop_map(|group| FormEdit::DeleteGroup { group }),
        (0usize..6, 0usize..6).prop_map(|(source, destination)| FormEdit::MoveGroup {
            source,
            destination
        }),
        (0usize..6, 0usize..4).prop_map(|(group, after)| FormEdit::AddElement { group, after }),
        (0usize..6, 0usize..4, 0usize..6, 0usize..4).prop_map(|(sg, si, dg, di)| {
            FormEdit::MoveElement {
                source_group: sg,
                source_index: si,
                destination_group: dg,
                destination_index: di,
            }
        }),
    ]
}

fn element_count(form: &FormDefinition) -> usize {
    form.form_element_groups
        .iter()
        .map(|g| g.form_elements.len())
        .sum()
}

proptest! {
    #[test]
    fn prop_structural_edits_never_drop_entities(edits in prop::collection::vec(structural_edit(), 0..20)) {
        let mut form = server_form();
        for edit in edits {
            let groups_before = form.form_element_groups.len();
            let elements_before = element_count(&form);
            let adds_group = matches!(edit, FormEdit::AddGroup { .. });
            let adds_element = matches!(edit, FormEdit::AddElement { .. });

            edit.apply(&mut form);

            let groups_after = form.form_element_groups.len();
            let elements_after = element_count(&form);
            prop_assert!(groups_after == groups_before || (adds_group && groups_after == groups_before + 1));
            let grown = elements_after - elements_before;
            prop_assert!(
                grown == 0 || (adds_group && grown == 1) || (adds_element && grown == 1),
                "elements went from {} to {}", elements_before, elements_after
            );
        }
    }
}
