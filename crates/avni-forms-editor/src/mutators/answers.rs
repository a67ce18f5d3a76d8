//! Coded answer editing on an element's inline concept

use avni_forms_model::{Answer, DataType, FormElement};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerFlag {
    Unique,
    Abnormal,
}

fn is_coded(element: &FormElement, operation: &str) -> bool {
    let coded = *element.data_type() == DataType::Coded;
    if !coded {
        debug!("{}: element {} is not coded", operation, element.uuid);
    }
    coded
}

/// Coded element with an answer at `index`
fn has_answer(element: &FormElement, index: usize, operation: &str) -> bool {
    if !is_coded(element, operation) {
        return false;
    }
    let present = index < element.concept.answers.len();
    if !present {
        debug!("{}: no answer at index {} on element {}", operation, index, element.uuid);
    }
    present
}

/// Append a blank answer
pub fn add_answer(element: &mut FormElement) {
    if !is_coded(element, "add_answer") {
        return;
    }
    let concept = element.concept_mut();
    let order = concept.answers.len();
    concept.answers.push(Answer::new("", order));
}

pub fn rename_answer(element: &mut FormElement, index: usize, name: &str) {
    if !has_answer(element, index, "rename_answer") {
        return;
    }
    element.concept_mut().answers[index].name = name.to_string();
}

pub fn toggle_answer_flag(element: &mut FormElement, index: usize, flag: AnswerFlag) {
    if !has_answer(element, index, "toggle_answer_flag") {
        return;
    }
    let answer = &mut element.concept_mut().answers[index];
    match flag {
        AnswerFlag::Unique => answer.unique = !answer.unique,
        AnswerFlag::Abnormal => answer.abnormal = !answer.abnormal,
    }
}

pub fn delete_answer(element: &mut FormElement, index: usize) {
    if !has_answer(element, index, "delete_answer") {
        return;
    }
    element.concept_mut().answers[index].voided = true;
}

pub fn move_answer_up(element: &mut FormElement, index: usize) {
    if index == 0 || !has_answer(element, index, "move_answer_up") {
        return;
    }
    let concept = element.concept_mut();
    concept.answers.swap(index - 1, index);
    concept.renumber_answers();
}

pub fn move_answer_down(element: &mut FormElement, index: usize) {
    if !has_answer(element, index.saturating_add(1), "move_answer_down") {
        return;
    }
    let concept = element.concept_mut();
    concept.answers.swap(index, index + 1);
    concept.renumber_answers();
}

/// Sort answers by name, ignoring case, and renumber them
pub fn sort_answers_alphabetically(element: &mut FormElement) {
    if !is_coded(element, "sort_answers_alphabetically") {
        return;
    }
    let concept = element.concept_mut();
    concept
        .answers
        .sort_by_key(|answer| answer.name.to_lowercase());
    concept.renumber_answers();
}

/// Hide or show a live answer on this element only
pub fn set_answer_excluded(element: &mut FormElement, answer_name: &str, excluded: bool) {
    if !is_coded(element, "set_answer_excluded") {
        return;
    }
    let found = element
        .concept
        .live_answers()
        .any(|answer| answer.name == answer_name);
    if !found {
        debug!(
            "set_answer_excluded: no answer named {:?} on element {}",
            answer_name, element.uuid
        );
        return;
    }
    for answer in &mut element.concept_mut().answers {
        if !answer.voided && answer.name == answer_name {
            answer.excluded = excluded;
        }
    }
}
