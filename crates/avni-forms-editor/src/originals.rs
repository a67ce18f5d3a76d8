//! Element shapes recorded at load time
//!
//! Observations already collected against an element were shaped by its
//! selection mode and, for question groups, its repeatability. Those are
//! recorded when a form is loaded so the validator can refuse edits that
//! change them.

use avni_forms_model::{DataType, FormDefinition, FormElement};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginalShapes {
    multi_select: HashMap<String, bool>,
    repeatable: HashMap<String, bool>,
}

impl OriginalShapes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shapes of every element of `form`
    pub fn of(form: &FormDefinition) -> Self {
        let mut shapes = Self::new();
        shapes.record(form);
        shapes
    }

    /// Forget what was recorded and record `form` instead
    pub fn record(&mut self, form: &FormDefinition) {
        self.multi_select.clear();
        self.repeatable.clear();
        let elements = form
            .form_element_groups
            .iter()
            .flat_map(|g| &g.form_elements);
        for element in elements {
            if element.data_type().is_multi_select_capable() {
                self.multi_select
                    .insert(element.uuid.clone(), element.has_type());
            }
            if *element.data_type() == DataType::QuestionGroup {
                self.repeatable
                    .insert(element.uuid.clone(), element.attributes.is_repeatable());
            }
        }
    }

    pub fn multi_select(&self, uuid: &str) -> Option<bool> {
        self.multi_select.get(uuid).copied()
    }

    pub fn repeatable(&self, uuid: &str) -> Option<bool> {
        self.repeatable.get(uuid).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.multi_select.is_empty() && self.repeatable.is_empty()
    }

    /// Whether the element's selection mode changed since it was recorded,
    /// including through a change of concept
    pub fn selection_changed(&self, element: &FormElement) -> bool {
        self.multi_select(&element.uuid)
            .is_some_and(|original| original != element.has_type())
    }

    /// Whether a question group's repeatability changed since it was
    /// recorded. An element that is no longer a question group repeats
    /// nothing.
    pub fn repeatability_changed(&self, element: &FormElement) -> bool {
        let current = *element.data_type() == DataType::QuestionGroup
            && element.attributes.is_repeatable();
        self.repeatable(&element.uuid)
            .is_some_and(|original| original != current)
    }

    pub fn is_disallowed_change(&self, element: &FormElement) -> bool {
        self.selection_changed(element) || self.repeatability_changed(element)
    }
}
