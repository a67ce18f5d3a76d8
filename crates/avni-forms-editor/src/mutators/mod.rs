//! Form element mutators
//!
//! Every editing operation is available both as a free function over the part
//! of the tree it touches and as a [`FormEdit`] command addressed by indices.
//! Operations never fail: an edit that does not fit the tree (an index out of
//! range, a setter for the wrong data type, a voided target) is logged at
//! debug level and leaves the tree untouched. Anything still wrong afterwards
//! is reported by the validator.

mod answers;
mod element;
mod structure;

pub use answers::*;
pub use element::*;
pub use structure::*;

use avni_forms_diagnostics::RuleSlot;
use avni_forms_model::{Concept, FormDefinition, FormElement, FormElementGroup};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// One editing operation on a form, addressed by stored indices
/// (voided members included)
#[derive(Debug, Clone, PartialEq)]
pub enum FormEdit {
    AddGroup {
        after: usize,
    },
    AddElement {
        group: usize,
        after: usize,
    },
    DeleteGroup {
        group: usize,
    },
    DeleteElement {
        group: usize,
        element: usize,
    },
    /// `destination` counts live groups only
    MoveGroup {
        source: usize,
        destination: usize,
    },
    MoveElement {
        source_group: usize,
        source_index: usize,
        destination_group: usize,
        destination_index: usize,
    },
    SetGroupField {
        group: usize,
        field: GroupField,
    },
    SetElementField {
        group: usize,
        element: usize,
        field: ElementField,
    },
    SetValidFormat {
        group: usize,
        element: usize,
        part: ValidFormatPart,
        value: String,
    },
    SetDateDurationMode {
        group: usize,
        element: usize,
        unit: String,
        enabled: bool,
    },
    SetNumericBound {
        group: usize,
        element: usize,
        bound: NumericBound,
    },
    SetInlineConceptAttribute {
        group: usize,
        element: usize,
        target: InlineAttributeGroup,
        key: String,
        value: Value,
    },
    AddAnswer {
        group: usize,
        element: usize,
    },
    RenameAnswer {
        group: usize,
        element: usize,
        answer: usize,
        name: String,
    },
    ToggleAnswerFlag {
        group: usize,
        element: usize,
        answer: usize,
        flag: AnswerFlag,
    },
    DeleteAnswer {
        group: usize,
        element: usize,
        answer: usize,
    },
    MoveAnswerUp {
        group: usize,
        element: usize,
        answer: usize,
    },
    MoveAnswerDown {
        group: usize,
        element: usize,
        answer: usize,
    },
    SortAnswers {
        group: usize,
        element: usize,
    },
    SetAnswerExcluded {
        group: usize,
        element: usize,
        answer_name: String,
        excluded: bool,
    },
    SetKeyValue {
        group: usize,
        element: usize,
        key: String,
        value: Value,
    },
    SetConcept {
        group: usize,
        element: usize,
        concept: Arc<Concept>,
    },
    SetFormRule {
        slot: RuleSlot,
        code: String,
    },
    SetFormDeclarativeRule {
        slot: RuleSlot,
        rule: Option<Value>,
    },
}

impl FormEdit {
    /// Apply this edit to `form` in place
    pub fn apply(self, form: &mut FormDefinition) {
        match self {
            FormEdit::AddGroup { after } => add_group(form, after),
            FormEdit::AddElement { group, after } => {
                if let Some(group) = live_group(form, group) {
                    add_element(group, after);
                }
            }
            FormEdit::DeleteGroup { group } => delete_group(form, group),
            FormEdit::DeleteElement { group, element } => {
                if let Some(group) = live_group(form, group) {
                    delete_element(group, element);
                }
            }
            FormEdit::MoveGroup {
                source,
                destination,
            } => move_group(form, source, destination),
            FormEdit::MoveElement {
                source_group,
                source_index,
                destination_group,
                destination_index,
            } => move_element(
                form,
                source_group,
                source_index,
                destination_group,
                destination_index,
            ),
            FormEdit::SetGroupField { group, field } => {
                if let Some(group) = live_group(form, group) {
                    set_group_field(group, field);
                }
            }
            FormEdit::SetElementField {
                group,
                element,
                field,
            } => with_element(form, group, element, |e| set_element_field(e, field)),
            FormEdit::SetValidFormat {
                group,
                element,
                part,
                value,
            } => with_element(form, group, element, |e| set_valid_format(e, part, &value)),
            FormEdit::SetDateDurationMode {
                group,
                element,
                unit,
                enabled,
            } => with_element(form, group, element, |e| {
                set_date_duration_mode(e, &unit, enabled)
            }),
            FormEdit::SetNumericBound {
                group,
                element,
                bound,
            } => with_element(form, group, element, |e| set_numeric_bound(e, bound)),
            FormEdit::SetInlineConceptAttribute {
                group,
                element,
                target,
                key,
                value,
            } => with_element(form, group, element, |e| {
                set_inline_concept_attribute(e, target, &key, value)
            }),
            FormEdit::AddAnswer { group, element } => {
                with_element(form, group, element, add_answer)
            }
            FormEdit::RenameAnswer {
                group,
                element,
                answer,
                name,
            } => with_element(form, group, element, |e| rename_answer(e, answer, &name)),
            FormEdit::ToggleAnswerFlag {
                group,
                element,
                answer,
                flag,
            } => with_element(form, group, element, |e| toggle_answer_flag(e, answer, flag)),
            FormEdit::DeleteAnswer {
                group,
                element,
                answer,
            } => with_element(form, group, element, |e| delete_answer(e, answer)),
            FormEdit::MoveAnswerUp {
                group,
                element,
                answer,
            } => with_element(form, group, element, |e| move_answer_up(e, answer)),
            FormEdit::MoveAnswerDown {
                group,
                element,
                answer,
            } => with_element(form, group, element, |e| move_answer_down(e, answer)),
            FormEdit::SortAnswers { group, element } => {
                with_element(form, group, element, sort_answers_alphabetically)
            }
            FormEdit::SetAnswerExcluded {
                group,
                element,
                answer_name,
                excluded,
            } => with_element(form, group, element, |e| {
                set_answer_excluded(e, &answer_name, excluded)
            }),
            FormEdit::SetKeyValue {
                group,
                element,
                key,
                value,
            } => with_element(form, group, element, |e| set_key_value(e, &key, value)),
            FormEdit::SetConcept {
                group,
                element,
                concept,
            } => with_element(form, group, element, |e| set_concept(e, concept)),
            FormEdit::SetFormRule { slot, code } => set_form_rule(form, slot, code),
            FormEdit::SetFormDeclarativeRule { slot, rule } => {
                set_form_declarative_rule(form, slot, rule)
            }
        }
    }
}

fn live_group(form: &mut FormDefinition, index: usize) -> Option<&mut FormElementGroup> {
    match form.form_element_groups.get_mut(index) {
        Some(group) if !group.voided => Some(group),
        Some(_) => {
            debug!("group {} is voided, edit ignored", index);
            None
        }
        None => {
            debug!("no group at index {}, edit ignored", index);
            None
        }
    }
}

fn with_element(
    form: &mut FormDefinition,
    group: usize,
    element: usize,
    edit: impl FnOnce(&mut FormElement),
) {
    let Some(target) = live_group(form, group).and_then(|g| g.form_elements.get_mut(element))
    else {
        debug!("no element at {}/{}, edit ignored", group, element);
        return;
    };
    if target.voided {
        debug!("element {} is voided, edit ignored", target.uuid);
        return;
    }
    edit(target);
}
