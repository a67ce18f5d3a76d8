//! Field and attribute setters for groups and elements

use avni_forms_model::{
    Concept, DataType, FormDefinition, FormElement, FormElementGroup, ValidFormat,
};
use avni_forms_diagnostics::RuleSlot;
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// Editable fields of a group
#[derive(Debug, Clone, PartialEq)]
pub enum GroupField {
    Name(String),
    Rule(String),
    DeclarativeRule(Option<Value>),
}

/// Editable scalar fields of an element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementField {
    Name(String),
    Rule(String),
    DeclarativeRule(Option<Value>),
    Mandatory(bool),
    /// Widget hint, `None` clears it
    Type(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidFormatPart {
    Regex,
    DescriptionKey,
}

/// A bound or unit of a numeric inline concept; `None` clears it
#[derive(Debug, Clone, PartialEq)]
pub enum NumericBound {
    LowAbsolute(Option<f64>),
    HighAbsolute(Option<f64>),
    LowNormal(Option<f64>),
    HighNormal(Option<f64>),
    Unit(Option<String>),
}

/// Key-value set of an inline concept, per data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineAttributeGroup {
    Location,
    Subject,
    Encounter,
    PhoneNumber,
}

impl InlineAttributeGroup {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Location => DataType::Location,
            Self::Subject => DataType::Subject,
            Self::Encounter => DataType::Encounter,
            Self::PhoneNumber => DataType::PhoneNumber,
        }
    }
}

pub fn set_group_field(group: &mut FormElementGroup, field: GroupField) {
    match field {
        GroupField::Name(name) => group.name = name,
        GroupField::Rule(rule) => group.rule = rule,
        GroupField::DeclarativeRule(rule) => group.declarative_rule = rule,
    }
}

pub fn set_element_field(element: &mut FormElement, field: ElementField) {
    match field {
        ElementField::Name(name) => element.name = name,
        ElementField::Rule(rule) => element.rule = rule,
        ElementField::DeclarativeRule(rule) => element.declarative_rule = rule,
        ElementField::Mandatory(mandatory) => element.mandatory = mandatory,
        ElementField::Type(element_type) => element.element_type = element_type,
    }
}

/// Set one half of the regex constraint. Only Text and Numeric elements
/// accept one.
pub fn set_valid_format(element: &mut FormElement, part: ValidFormatPart, value: &str) {
    if !element.data_type().supports_valid_format() {
        debug!(
            "set_valid_format: {} elements take no valid format",
            element.data_type()
        );
        return;
    }
    let value = (!value.is_empty()).then(|| value.to_string());
    let format = element.valid_format.get_or_insert_with(ValidFormat::default);
    match part {
        ValidFormatPart::Regex => format.regex = value,
        ValidFormatPart::DescriptionKey => format.description_key = value,
    }
}

/// Offer or withdraw one duration unit on a Date/Duration element
pub fn set_date_duration_mode(element: &mut FormElement, unit: &str, enabled: bool) {
    let Some(options) = element.attributes.duration_options_mut() else {
        debug!(
            "set_date_duration_mode: {} elements take no duration options",
            element.concept.data_type
        );
        return;
    };
    let options = options.get_or_insert_with(Vec::new);
    let present = options.iter().any(|u| u == unit);
    if enabled && !present {
        options.push(unit.to_string());
    } else if !enabled {
        options.retain(|u| u != unit);
    }
}

pub fn set_numeric_bound(element: &mut FormElement, bound: NumericBound) {
    if *element.data_type() != DataType::Numeric {
        debug!("set_numeric_bound: element {} is not numeric", element.uuid);
        return;
    }
    let concept = element.concept_mut();
    match bound {
        NumericBound::LowAbsolute(v) => concept.low_absolute = v,
        NumericBound::HighAbsolute(v) => concept.high_absolute = v,
        NumericBound::LowNormal(v) => concept.low_normal = v,
        NumericBound::HighNormal(v) => concept.high_normal = v,
        NumericBound::Unit(unit) => concept.unit = unit,
    }
}

pub fn set_inline_concept_attribute(
    element: &mut FormElement,
    group: InlineAttributeGroup,
    key: &str,
    value: Value,
) {
    if *element.data_type() != group.data_type() {
        debug!(
            "set_inline_concept_attribute: {:?} attributes do not apply to {} elements",
            group,
            element.data_type()
        );
        return;
    }
    element.concept_mut().set_key_value(key, value);
}

/// Generic attribute change
pub fn set_key_value(element: &mut FormElement, key: &str, value: Value) {
    element.attributes.set(key, value);
}

/// Bind the element to another concept, re-homing its attributes under the
/// new data type
pub fn set_concept(element: &mut FormElement, concept: Arc<Concept>) {
    element.concept = concept;
    let data_type = element.concept.data_type.clone();
    element.attributes.retype(&data_type);

    if !data_type.is_multi_select_capable() {
        element.element_type = None;
    }
    let excluded: Vec<String> = element
        .attributes
        .excluded_answers()
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    if !excluded.is_empty() {
        for answer in &mut element.concept_mut().answers {
            answer.excluded = !answer.voided && excluded.contains(&answer.name);
        }
    }
}

pub fn set_form_rule(form: &mut FormDefinition, slot: RuleSlot, code: String) {
    *form.rule_code_mut(slot) = code;
}

pub fn set_form_declarative_rule(form: &mut FormDefinition, slot: RuleSlot, rule: Option<Value>) {
    *form.declarative_rule_mut(slot) = rule;
}
