//! Shaping an edited form for the server

use avni_forms_model::{
    DURATION_LIMIT_IN_SECS, DURATION_OPTIONS, DataType, EXCLUDED_ANSWERS, ElementAttributes,
    FormDefinition, FormElement, MAX_HEIGHT, MAX_WIDTH, is_blank,
};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

static SERVER_EXCEPTION_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^org\..*: ").ok());

/// The request body for saving `form` under the session's `name` and `timed`
pub fn to_wire(form: &FormDefinition, name: &str, timed: bool) -> serde_json::Result<Value> {
    let mut outgoing = form.clone();
    outgoing.name = name.to_string();
    outgoing.timed = timed;
    for group in &mut outgoing.form_element_groups {
        for element in &mut group.form_elements {
            prune_attributes(element);
        }
    }
    renumber(&mut outgoing);
    serde_json::to_value(&outgoing)
}

/// Write answer exclusions back to `ExcludedAnswers` and drop attributes
/// the designer left empty
fn prune_attributes(element: &mut FormElement) {
    let attributes = &mut element.attributes;
    match element.concept.data_type {
        DataType::Coded => {
            let excluded: Vec<&str> = element
                .concept
                .live_answers()
                .filter(|a| a.excluded)
                .map(|a| a.name.as_str())
                .collect();
            if excluded.is_empty() {
                attributes.remove(EXCLUDED_ANSWERS);
            } else {
                attributes.set(EXCLUDED_ANSWERS, json!(excluded));
            }
        }
        DataType::Video => remove_blank(attributes, DURATION_LIMIT_IN_SECS),
        DataType::Date | DataType::Duration => {
            if attributes.duration_options().is_some_and(<[String]>::is_empty) {
                attributes.remove(DURATION_OPTIONS);
            }
        }
        DataType::Image => {
            remove_blank(attributes, MAX_HEIGHT);
            remove_blank(attributes, MAX_WIDTH);
        }
        _ => {}
    }

    if element.valid_format.as_ref().is_some_and(|vf| vf.is_empty()) {
        element.valid_format = None;
    }
}

fn remove_blank(attributes: &mut ElementAttributes, key: &str) {
    if attributes.get(key).as_ref().is_some_and(is_blank) {
        attributes.remove(key);
    }
}

/// Number live groups, and the live elements of every group, densely from 1.
/// Voided members keep their last order.
pub fn renumber(form: &mut FormDefinition) {
    let live_groups = form.form_element_groups.iter_mut().filter(|g| !g.voided);
    for (index, group) in live_groups.enumerate() {
        group.display_order = (index + 1) as f64;
    }
    for group in &mut form.form_element_groups {
        let live_elements = group.form_elements.iter_mut().filter(|e| !e.voided);
        for (index, element) in live_elements.enumerate() {
            element.display_order = (index + 1) as f64;
        }
    }
}

/// The part of a server error body worth showing: a leading Java exception
/// class name is dropped and only the first line kept
pub fn server_error_message(body: &str) -> String {
    let stripped = match SERVER_EXCEPTION_PREFIX.as_ref() {
        Some(prefix) => prefix.replace(body, ""),
        None => body.into(),
    };
    stripped
        .split(['\n', '\r'])
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use avni_forms_model::{FormElementGroup, ValidFormat};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn element(value: Value) -> FormElement {
        serde_json::from_value(value).unwrap()
    }

    fn form_with(elements: Vec<FormElement>) -> FormDefinition {
        FormDefinition {
            form_element_groups: vec![FormElementGroup {
                uuid: "g-1".into(),
                form_elements: elements,
                ..FormElementGroup::default()
            }],
            ..FormDefinition::default()
        }
    }

    fn key_values(wire: &Value) -> Vec<(String, Value)> {
        wire["formElementGroups"][0]["formElements"][0]["keyValues"]
            .as_array()
            .unwrap()
            .iter()
            .map(|kv| (kv["key"].as_str().unwrap().to_string(), kv["value"].clone()))
            .collect()
    }

    #[rstest]
    #[case::prefixed(
        "org.hibernate.exception.ConstraintViolationException: duplicate key\n\tat Foo.bar",
        "duplicate key"
    )]
    #[case::plain("Form name already exists", "Form name already exists")]
    #[case::carriage_return("Something failed\r\nstack", "Something failed")]
    #[case::not_leading("Error in org.avni.Foo: bad", "Error in org.avni.Foo: bad")]
    #[case::empty("", "")]
    fn test_server_error_message(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(server_error_message(body), expected);
    }

    #[test]
    fn test_excluded_answers_written_back() {
        let mut coded = element(json!({
            "uuid": "e-1",
            "concept": {"dataType": "Coded", "answers": [
                {"name": "A"}, {"name": "B", "voided": true}, {"name": "C"}
            ]},
            "keyValues": [{"key": "ExcludedAnswers", "value": ["stale"]}]
        }));
        let answers = &mut coded.concept_mut().answers;
        answers[1].excluded = true;
        answers[2].excluded = true;

        let wire = to_wire(&form_with(vec![coded.clone()]), "F", false).unwrap();
        assert_eq!(
            key_values(&wire),
            vec![("ExcludedAnswers".to_string(), json!(["C"]))]
        );

        coded.concept_mut().answers[2].excluded = false;
        let wire = to_wire(&form_with(vec![coded]), "F", false).unwrap();
        assert!(key_values(&wire).is_empty());
    }

    #[rstest]
    #[case::video("Video", json!([{"key": "durationLimitInSecs", "value": ""}]))]
    #[case::image("Image", json!([{"key": "maxHeight", "value": ""}, {"key": "maxWidth", "value": null}]))]
    #[case::date("Date", json!([{"key": "durationOptions", "value": []}]))]
    #[case::duration("Duration", json!([{"key": "durationOptions", "value": []}]))]
    fn test_empty_attributes_are_dropped(#[case] data_type: &str, #[case] pairs: Value) {
        let element = element(json!({
            "uuid": "e-1",
            "concept": {"dataType": data_type},
            "keyValues": pairs
        }));
        let wire = to_wire(&form_with(vec![element]), "F", false).unwrap();
        assert!(key_values(&wire).is_empty());
    }

    #[test]
    fn test_filled_attributes_are_kept() {
        let element = element(json!({
            "uuid": "e-1",
            "concept": {"dataType": "Image"},
            "keyValues": [{"key": "maxHeight", "value": 400}, {"key": "maxWidth", "value": ""}]
        }));
        let wire = to_wire(&form_with(vec![element]), "F", false).unwrap();
        assert_eq!(
            key_values(&wire),
            vec![("maxHeight".to_string(), json!(400))]
        );
    }

    #[test]
    fn test_empty_valid_format_is_dropped() {
        let mut text = element(json!({"uuid": "e-1", "concept": {"dataType": "Text"}}));
        text.valid_format = Some(ValidFormat::default());
        let wire = to_wire(&form_with(vec![text]), "F", false).unwrap();
        let element = &wire["formElementGroups"][0]["formElements"][0];
        assert!(element.get("validFormat").is_none());
    }

    #[test]
    fn test_session_name_and_timed_are_copied_in() {
        let form = FormDefinition {
            name: "Old".into(),
            ..FormDefinition::default()
        };
        let wire = to_wire(&form, "New", true).unwrap();
        assert_eq!(wire["name"], json!("New"));
        assert_eq!(wire["timed"], json!(true));
    }

    #[test]
    fn test_renumber_skips_voided() {
        let mut form: FormDefinition = serde_json::from_value(json!({
            "formElementGroups": [
                {"uuid": "a", "displayOrder": 7, "formElements": [
                    {"uuid": "a1", "displayOrder": 4},
                    {"uuid": "a2", "displayOrder": 9, "voided": true},
                    {"uuid": "a3", "displayOrder": -1}
                ]},
                {"uuid": "b", "displayOrder": 2, "voided": true, "formElements": []},
                {"uuid": "c", "displayOrder": -1, "formElements": []}
            ]
        }))
        .unwrap();
        renumber(&mut form);

        let groups: Vec<f64> = form.form_element_groups.iter().map(|g| g.display_order).collect();
        assert_eq!(groups, vec![1.0, 2.0, 2.0]);
        let elements: Vec<f64> = form.form_element_groups[0]
            .form_elements
            .iter()
            .map(|e| e.display_order)
            .collect();
        assert_eq!(elements, vec![1.0, 9.0, 2.0]);
    }
}
