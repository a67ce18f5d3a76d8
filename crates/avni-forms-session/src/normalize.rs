//! Preparing a form received from the server for editing

use avni_forms_editor::OriginalShapes;
use avni_forms_editor::mutators::add_group;
use avni_forms_model::{
    DURATION_OPTIONS, DataType, FormDefinition, FormElement, FormElementGroup, sanitize_group_id,
};
use serde_json::json;

/// Bring a freshly fetched form into editable shape and record the shapes of
/// its elements in `originals`. Returns whether a first group had to be
/// created because the form had no live group.
///
/// Missing rule code strings already read as empty text when the form is
/// deserialized.
pub fn normalize(form: &mut FormDefinition, originals: &mut OriginalShapes) -> bool {
    for group in &mut form.form_element_groups {
        normalize_group(group);
    }
    originals.record(form);
    form.clear_errors();

    if form.has_live_groups() {
        return false;
    }
    add_group(form, 0);
    true
}

fn normalize_group(group: &mut FormElementGroup) {
    let raw = if group.group_id.is_empty() {
        &group.name
    } else {
        &group.group_id
    };
    group.group_id = sanitize_group_id(raw);

    for element in &mut group.form_elements {
        mark_excluded_answers(element);
        if element.data_type().has_duration_options()
            && !element.attributes.contains_key(DURATION_OPTIONS)
        {
            element.attributes.set(DURATION_OPTIONS, json!([]));
        }
    }
}

/// Flag the live answers named in the element's `ExcludedAnswers`
fn mark_excluded_answers(element: &mut FormElement) {
    if *element.data_type() != DataType::Coded {
        return;
    }
    let Some(excluded) = element.attributes.excluded_answers().map(<[String]>::to_vec) else {
        return;
    };
    for answer in &mut element.concept_mut().answers {
        answer.excluded = !answer.voided && excluded.contains(&answer.name);
    }
}
