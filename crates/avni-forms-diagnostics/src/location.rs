//! Locations of entities inside a form definition tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which form-level rule slot a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleSlot {
    Validation,
    Decision,
    VisitSchedule,
    Checklists,
}

impl RuleSlot {
    /// Wire name of the generated-code field for this slot
    pub const fn code_field(&self) -> &'static str {
        match self {
            RuleSlot::Validation => "validationRule",
            RuleSlot::Decision => "decisionRule",
            RuleSlot::VisitSchedule => "visitScheduleRule",
            RuleSlot::Checklists => "checklistsRule",
        }
    }
}

impl fmt::Display for RuleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code_field())
    }
}

/// Position of an entity in the form tree.
///
/// Indices are positions in the stored sequences (voided members included),
/// the same indices the editing operations take.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityPath {
    /// The form itself
    Form,
    /// A form-level rule slot
    FormRule(RuleSlot),
    /// A form element group
    Group { index: usize, uuid: String },
    /// A form element inside a group
    Element {
        group_index: usize,
        element_index: usize,
        uuid: String,
    },
}

impl EntityPath {
    pub fn group(index: usize, uuid: impl Into<String>) -> Self {
        Self::Group {
            index,
            uuid: uuid.into(),
        }
    }

    pub fn element(group_index: usize, element_index: usize, uuid: impl Into<String>) -> Self {
        Self::Element {
            group_index,
            element_index,
            uuid: uuid.into(),
        }
    }

    /// The entity uuid, when the path names a group or element
    pub fn uuid(&self) -> Option<&str> {
        match self {
            Self::Group { uuid, .. } | Self::Element { uuid, .. } => Some(uuid),
            _ => None,
        }
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Form => write!(f, "form"),
            Self::FormRule(slot) => write!(f, "form.{}", slot),
            Self::Group { index, .. } => write!(f, "formElementGroups[{}]", index),
            Self::Element {
                group_index,
                element_index,
                ..
            } => write!(
                f,
                "formElementGroups[{}].formElements[{}]",
                group_index, element_index
            ),
        }
    }
}
