//! Form definition tree
//!
//! A [`FormDefinition`] owns its [`FormElementGroup`]s, which own their
//! [`FormElement`]s. Deleted groups and elements stay in the tree with
//! `voided = true` and are skipped by numbering, editing and validation.

use crate::wire::{FormElementWire, null_as_default};
use crate::{Concept, DataType, ElementAttributes, FormType};
use avni_forms_diagnostics::RuleSlot;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Root of a data-collection form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default)]
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub timed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_type: Option<FormType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<SubjectTypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub visit_schedule_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_schedule_declarative_rule: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub decision_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_declarative_rule: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub validation_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_declarative_rule: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checklists_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklists_declarative_rule: Option<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub form_element_groups: Vec<FormElementGroup>,

    /// Parse errors of form-level declarative rules from the last validation
    #[serde(skip)]
    pub rule_errors: IndexMap<RuleSlot, String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl FormDefinition {
    pub fn rule_code(&self, slot: RuleSlot) -> &str {
        match slot {
            RuleSlot::Validation => &self.validation_rule,
            RuleSlot::Decision => &self.decision_rule,
            RuleSlot::VisitSchedule => &self.visit_schedule_rule,
            RuleSlot::Checklists => &self.checklists_rule,
        }
    }

    pub fn rule_code_mut(&mut self, slot: RuleSlot) -> &mut String {
        match slot {
            RuleSlot::Validation => &mut self.validation_rule,
            RuleSlot::Decision => &mut self.decision_rule,
            RuleSlot::VisitSchedule => &mut self.visit_schedule_rule,
            RuleSlot::Checklists => &mut self.checklists_rule,
        }
    }

    pub fn declarative_rule(&self, slot: RuleSlot) -> Option<&Value> {
        match slot {
            RuleSlot::Validation => self.validation_declarative_rule.as_ref(),
            RuleSlot::Decision => self.decision_declarative_rule.as_ref(),
            RuleSlot::VisitSchedule => self.visit_schedule_declarative_rule.as_ref(),
            RuleSlot::Checklists => self.checklists_declarative_rule.as_ref(),
        }
    }

    pub fn declarative_rule_mut(&mut self, slot: RuleSlot) -> &mut Option<Value> {
        match slot {
            RuleSlot::Validation => &mut self.validation_declarative_rule,
            RuleSlot::Decision => &mut self.decision_declarative_rule,
            RuleSlot::VisitSchedule => &mut self.visit_schedule_declarative_rule,
            RuleSlot::Checklists => &mut self.checklists_declarative_rule,
        }
    }

    /// Entity variable name rule code is generated against
    pub fn rule_entity_name(&self) -> &'static str {
        self.form_type
            .as_ref()
            .map(FormType::rule_entity_name)
            .unwrap_or("")
    }

    pub fn live_groups(&self) -> impl Iterator<Item = &FormElementGroup> {
        self.form_element_groups.iter().filter(|g| !g.voided)
    }

    pub fn has_live_groups(&self) -> bool {
        self.live_groups().next().is_some()
    }

    pub fn find_group(&self, uuid: &str) -> Option<usize> {
        self.form_element_groups.iter().position(|g| g.uuid == uuid)
    }

    /// Locate an element by uuid as `(group index, element index)`
    pub fn find_element(&self, uuid: &str) -> Option<(usize, usize)> {
        self.form_element_groups
            .iter()
            .enumerate()
            .find_map(|(gi, group)| group.find_element(uuid).map(|ei| (gi, ei)))
    }

    pub fn element(&self, group_index: usize, element_index: usize) -> Option<&FormElement> {
        self.form_element_groups
            .get(group_index)?
            .form_elements
            .get(element_index)
    }

    pub fn element_mut(
        &mut self,
        group_index: usize,
        element_index: usize,
    ) -> Option<&mut FormElement> {
        self.form_element_groups
            .get_mut(group_index)?
            .form_elements
            .get_mut(element_index)
    }

    /// Reset every error flag left by a previous validation
    pub fn clear_errors(&mut self) {
        self.rule_errors.clear();
        for group in &mut self.form_element_groups {
            group.error = false;
            group.errors = GroupErrors::default();
            group.expanded = false;
            for element in &mut group.form_elements {
                element.error = false;
                element.errors = ElementErrors::default();
                element.expanded = false;
            }
        }
    }
}

/// Reference to the subject type a form belongs to
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTypeRef {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// An ordered page of a form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElementGroup {
    #[serde(default)]
    pub uuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Identifier-safe token derived from the name
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_id: String,
    #[serde(default)]
    pub voided: bool,
    #[serde(default)]
    pub display_order: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declarative_rule: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub form_elements: Vec<FormElement>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,

    #[serde(skip)]
    pub error: bool,
    #[serde(skip)]
    pub errors: GroupErrors,
    #[serde(skip)]
    pub expanded: bool,
}

impl FormElementGroup {
    /// A fresh group holding one blank element
    pub fn new_default() -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            display_order: -1.0,
            form_elements: vec![FormElement::new_default()],
            ..Self::default()
        }
    }

    pub fn live_elements(&self) -> impl Iterator<Item = &FormElement> {
        self.form_elements.iter().filter(|e| !e.voided)
    }

    pub fn find_element(&self, uuid: &str) -> Option<usize> {
        self.form_elements.iter().position(|e| e.uuid == uuid)
    }
}

/// Replace every character outside `[a-zA-Z0-9]` with `_`
pub fn sanitize_group_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// One question of a form, bound to a concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FormElementWire", into = "FormElementWire")]
pub struct FormElement {
    pub uuid: String,
    pub name: String,
    pub concept: Arc<Concept>,
    /// Widget hint, e.g. `SingleSelect` / `MultiSelect`
    pub element_type: Option<String>,
    pub mandatory: bool,
    pub voided: bool,
    pub display_order: f64,
    /// Question group this element belongs to
    pub parent_form_element_uuid: Option<String>,
    pub attributes: ElementAttributes,
    pub valid_format: Option<ValidFormat>,
    pub rule: String,
    pub declarative_rule: Option<Value>,
    pub extra: IndexMap<String, Value>,

    pub error: bool,
    pub errors: ElementErrors,
    pub expanded: bool,
}

impl Default for FormElement {
    fn default() -> Self {
        Self {
            uuid: String::new(),
            name: String::new(),
            concept: Arc::new(Concept::default()),
            element_type: None,
            mandatory: false,
            voided: false,
            display_order: 0.0,
            parent_form_element_uuid: None,
            attributes: ElementAttributes::default(),
            valid_format: None,
            rule: String::new(),
            declarative_rule: None,
            extra: IndexMap::new(),
            error: false,
            errors: ElementErrors::default(),
            expanded: false,
        }
    }
}

impl FormElement {
    /// A blank element waiting for a name and a concept
    pub fn new_default() -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            display_order: -1.0,
            ..Self::default()
        }
    }

    pub fn data_type(&self) -> &DataType {
        &self.concept.data_type
    }

    /// Whether the widget hint is set, which is how selection capability is read
    pub fn has_type(&self) -> bool {
        self.element_type.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Mutable access to this element's own copy of its concept
    pub fn concept_mut(&mut self) -> &mut Concept {
        Arc::make_mut(&mut self.concept)
    }
}

/// Regex constraint on Text/Numeric answers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_key: Option<String>,
}

impl ValidFormat {
    pub fn has_regex(&self) -> bool {
        self.regex.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_description_key(&self) -> bool {
        self.description_key.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Both parts set or both parts empty
    pub fn is_consistent(&self) -> bool {
        self.has_regex() == self.has_description_key()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_regex() && !self.has_description_key()
    }
}

/// Field-level errors of a group
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupErrors {
    pub name: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_error: Option<String>,
}

impl GroupErrors {
    pub fn any(&self) -> bool {
        self.name || self.rule_error.is_some()
    }
}

/// Field-level errors of an element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementErrors {
    pub name: bool,
    pub concept: bool,
    #[serde(rename = "type")]
    pub element_type: bool,
    pub duration_limit_in_secs: bool,
    pub max_height: bool,
    pub max_width: bool,
    pub valid_format: bool,
    pub duration_options: bool,
    pub disallowed_change_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_error: Option<String>,
}

impl ElementErrors {
    pub fn any(&self) -> bool {
        self.name
            || self.concept
            || self.element_type
            || self.duration_limit_in_secs
            || self.max_height
            || self.max_width
            || self.valid_format
            || self.duration_options
            || self.disallowed_change_error
            || self.rule_error.is_some()
    }
}
