//! Whole-form validation
//!
//! [`Validator::validate`] walks the form once, top-down, accumulating every
//! violation instead of stopping at the first. Error flags are written onto
//! the tree for display, and the code of every declarative rule that parsed
//! cleanly is regenerated in the same pass.

use crate::OriginalShapes;
use avni_forms_diagnostics::{
    AVF0100, AVF0101, AVF0102, AVF0103, AVF0104, AVF0105, AVF0106, AVF0107, AVF0108, AVF0109,
    AVF0200, AVF0201, Diagnostic, EntityPath, ErrorCode, RuleSlot,
};
use avni_forms_model::{
    DURATION_LIMIT_IN_SECS, DataType, ElementErrors, FormDefinition, FormElement, GroupErrors,
    MAX_HEIGHT, MAX_WIDTH, lenient_int,
};
use avni_forms_rules::{RuleCompiler, RuleError, RuleKind};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

/// Form-level rule slots that are checked, with the kind of code each holds
const FORM_RULES: [(RuleSlot, RuleKind); 3] = [
    (RuleSlot::Validation, RuleKind::FormValidation),
    (RuleSlot::Decision, RuleKind::Decision),
    (RuleSlot::VisitSchedule, RuleKind::VisitSchedule),
];

/// Outcome of one validation pass
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub has_errors: bool,
    pub name_error: bool,
    pub rule_errors: IndexMap<RuleSlot, String>,
    /// Keyed by group uuid
    pub group_errors: IndexMap<String, GroupErrors>,
    /// Keyed by element uuid
    pub element_errors: IndexMap<String, ElementErrors>,
    pub group_error_count: usize,
    pub element_error_count: usize,
    /// Summary for display, empty unless groups or elements are in error
    pub message: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self.has_errors
    }

    fn summarize(&mut self) {
        self.message = match (self.group_error_count, self.element_error_count) {
            (0, 0) => String::new(),
            (groups, 0) => format!("There is an error in {} form group(s).", groups),
            (0, elements) => format!("There is an error in {} form element(s).", elements),
            (groups, elements) => format!(
                "There is an error in {} form group(s) and {} form element(s).",
                groups, elements
            ),
        };
        self.has_errors = self.name_error
            || !self.rule_errors.is_empty()
            || self.group_error_count > 0
            || self.element_error_count > 0;
    }
}

/// Checks a form and regenerates its rule code
pub struct Validator<'a> {
    compiler: &'a dyn RuleCompiler,
    originals: &'a OriginalShapes,
}

impl<'a> Validator<'a> {
    pub fn new(compiler: &'a dyn RuleCompiler, originals: &'a OriginalShapes) -> Self {
        Self {
            compiler,
            originals,
        }
    }

    /// Validate `form` in place.
    ///
    /// Error state left by a previous run is cleared first, so validating an
    /// unchanged form twice yields equal reports.
    pub fn validate(&self, form: &mut FormDefinition) -> ValidationReport {
        form.clear_errors();
        let mut report = ValidationReport::default();
        let entity = form.rule_entity_name();

        if form.name.is_empty() {
            report.name_error = true;
            report
                .diagnostics
                .push(Diagnostic::error(AVF0100, "Form name is empty").at(EntityPath::Form));
        }

        for (slot, kind) in FORM_RULES {
            match self.compile(form.declarative_rule(slot), kind, entity) {
                Ok(Some(code)) => *form.rule_code_mut(slot) = code,
                Ok(None) => {}
                Err(err) => {
                    report
                        .diagnostics
                        .push(rule_diagnostic(&err, EntityPath::FormRule(slot)));
                    report.rule_errors.insert(slot, err.to_string());
                }
            }
        }
        form.rule_errors = report.rule_errors.clone();

        for (gi, group) in form.form_element_groups.iter_mut().enumerate() {
            if group.voided {
                continue;
            }
            let path = EntityPath::group(gi, &group.uuid);
            let mut errors = GroupErrors::default();

            if group.name.trim().is_empty() {
                errors.name = true;
                report
                    .diagnostics
                    .push(Diagnostic::error(AVF0101, "Group name is empty").at(path.clone()));
            }
            let source = group.declarative_rule.as_ref();
            match self.compile(source, RuleKind::FormElementGroup, entity) {
                Err(err) => {
                    report.diagnostics.push(rule_diagnostic(&err, path.clone()));
                    errors.rule_error = Some(err.to_string());
                }
                Ok(Some(code)) if !errors.any() => group.rule = code,
                Ok(_) => {}
            }

            if errors.any() {
                group.error = true;
                group.expanded = true;
                report.group_error_count += 1;
                report.group_errors.insert(group.uuid.clone(), errors.clone());
            }
            group.errors = errors;

            let mut element_failed = false;
            for (ei, element) in group.form_elements.iter_mut().enumerate() {
                if element.voided {
                    continue;
                }
                let path = EntityPath::element(gi, ei, &element.uuid);
                let errors = self.check_element(element, entity, &path, &mut report.diagnostics);
                if errors.any() {
                    element.error = true;
                    element.expanded = true;
                    element_failed = true;
                    report.element_error_count += 1;
                    report
                        .element_errors
                        .insert(element.uuid.clone(), errors.clone());
                }
                element.errors = errors;
            }
            if element_failed {
                group.expanded = true;
            }
        }

        report.summarize();
        debug!(
            "validated form {}: {} group(s), {} element(s) in error",
            form.uuid, report.group_error_count, report.element_error_count
        );
        report
    }

    fn compile(
        &self,
        source: Option<&serde_json::Value>,
        kind: RuleKind,
        entity: &str,
    ) -> Result<Option<String>, RuleError> {
        self.compiler.compile(source, kind, entity)
    }

    /// Field checks of one element, regenerating its rule code when it passes
    fn check_element(
        &self,
        element: &mut FormElement,
        entity: &str,
        path: &EntityPath,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ElementErrors {
        let mut errors = ElementErrors::default();
        let mut fail = |code: ErrorCode, message: &str| {
            diagnostics.push(Diagnostic::error(code, message).at(path.clone()));
        };
        let data_type = element.data_type().clone();

        if element.name.is_empty() {
            errors.name = true;
            fail(AVF0102, "Element name is empty");
        }
        if !data_type.is_set() {
            errors.concept = true;
            fail(AVF0103, "No concept chosen");
        }
        if data_type == DataType::Coded && !element.has_type() {
            errors.element_type = true;
            fail(AVF0104, "Coded element needs single or multi select");
        }
        if data_type == DataType::Video && is_negative(element, DURATION_LIMIT_IN_SECS) {
            errors.duration_limit_in_secs = true;
            fail(AVF0105, "Duration limit cannot be negative");
        }
        if data_type == DataType::Image {
            if is_negative(element, MAX_HEIGHT) {
                errors.max_height = true;
                fail(AVF0106, "Maximum height cannot be negative");
            }
            if is_negative(element, MAX_WIDTH) {
                errors.max_width = true;
                fail(AVF0107, "Maximum width cannot be negative");
            }
        }
        if data_type.supports_valid_format()
            && element
                .valid_format
                .as_ref()
                .is_some_and(|vf| !vf.is_consistent())
        {
            errors.valid_format = true;
            fail(AVF0108, "Valid format needs both a regex and a description key");
        }

        let source = element.declarative_rule.as_ref();
        let generated = match self.compile(source, RuleKind::ViewFilter, entity) {
            Ok(code) => code,
            Err(err) => {
                fail(err.code(), &err.to_string());
                errors.rule_error = Some(err.to_string());
                None
            }
        };

        if self.originals.selection_changed(element) {
            errors.disallowed_change_error = true;
            fail(AVF0200, "Selection type changed after data was collected");
        }
        if self.originals.repeatability_changed(element) {
            errors.disallowed_change_error = true;
            fail(AVF0201, "Repeatability changed after data was collected");
        }

        if errors.any() {
            return errors;
        }
        if data_type == DataType::Duration
            && element.attributes.duration_options().is_none_or(<[String]>::is_empty)
        {
            errors.duration_options = true;
            fail(AVF0109, "Choose at least one duration unit");
            return errors;
        }
        if let Some(code) = generated {
            element.rule = code;
        }
        errors
    }
}

fn rule_diagnostic(err: &RuleError, path: EntityPath) -> Diagnostic {
    Diagnostic::error(err.code(), err.to_string()).at(path)
}

/// An attribute holding an integer below zero. Values that do not read as
/// integers pass.
fn is_negative(element: &FormElement, key: &str) -> bool {
    element
        .attributes
        .get(key)
        .as_ref()
        .and_then(lenient_int)
        .is_some_and(|n| n < 0)
}
