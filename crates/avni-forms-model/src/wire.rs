//! Wire shapes that differ from the in-memory model

use crate::{Concept, ElementAttributes, FormElement, KeyValue, ValidFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Form element as exchanged with the server: attributes as a pair list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FormElementWire {
    #[serde(default)]
    uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default)]
    concept: Arc<Concept>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    element_type: Option<String>,
    #[serde(default)]
    mandatory: bool,
    #[serde(default)]
    voided: bool,
    #[serde(default)]
    display_order: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_form_element_uuid: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    key_values: Vec<KeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_format: Option<ValidFormat>,
    #[serde(default, deserialize_with = "null_as_default")]
    rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    declarative_rule: Option<Value>,
    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl From<FormElementWire> for FormElement {
    fn from(wire: FormElementWire) -> Self {
        let attributes = ElementAttributes::from_pairs(&wire.concept.data_type, wire.key_values);
        Self {
            uuid: wire.uuid,
            name: wire.name,
            concept: wire.concept,
            element_type: wire.element_type,
            mandatory: wire.mandatory,
            voided: wire.voided,
            display_order: wire.display_order,
            parent_form_element_uuid: wire.parent_form_element_uuid,
            attributes,
            valid_format: wire.valid_format,
            rule: wire.rule,
            declarative_rule: wire.declarative_rule.filter(|v| !v.is_null()),
            extra: wire.extra,
            error: false,
            errors: Default::default(),
            expanded: false,
        }
    }
}

impl From<FormElement> for FormElementWire {
    fn from(element: FormElement) -> Self {
        Self {
            key_values: element.attributes.to_pairs(),
            uuid: element.uuid,
            name: element.name,
            concept: element.concept,
            element_type: element.element_type,
            mandatory: element.mandatory,
            voided: element.voided,
            display_order: element.display_order,
            parent_form_element_uuid: element.parent_form_element_uuid,
            valid_format: element.valid_format,
            rule: element.rule,
            declarative_rule: element.declarative_rule,
            extra: element.extra,
        }
    }
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
