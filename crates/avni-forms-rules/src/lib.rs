//! Declarative rules for Avni forms
//!
//! Forms, groups and elements may carry a *declarative rule*: a JSON document
//! describing conditions over the data being collected and the actions to
//! take when they hold. This crate reads and checks those documents and
//! generates the rule code the server stores next to them.
//!
//! # Example
//!
//! ```
//! use avni_forms_rules::{DeclarativeRuleCompiler, RuleCompiler, RuleKind};
//! use serde_json::json;
//!
//! let source = json!([{
//!     "conditions": [{"compoundRule": {"rules": [{
//!         "lhs": {"type": "gender"},
//!         "operator": "equals",
//!         "rhs": {"type": "value", "value": "Female"}
//!     }]}}],
//!     "actions": [{"actionType": "showFormElement"}]
//! }]);
//!
//! let compiler = DeclarativeRuleCompiler::new();
//! let holder = compiler.parse(Some(&source), RuleKind::ViewFilter).unwrap();
//! let code = compiler.generate(&holder, RuleKind::ViewFilter, "individual");
//! assert!(code.contains("when.gender.equals(\"Female\")"));
//! ```

mod codegen;
mod error;
pub mod model;
mod validate;

pub use error::RuleError;
pub use model::DeclarativeRule;

use model::ActionType;
use serde_json::Value;
use std::fmt;

/// What a rule is attached to, which decides its allowed actions and the
/// shape of the generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    FormValidation,
    Decision,
    VisitSchedule,
    FormElementGroup,
    ViewFilter,
}

impl RuleKind {
    pub fn allows(&self, action: ActionType) -> bool {
        use ActionType as A;
        match self {
            RuleKind::ViewFilter => matches!(
                action,
                A::ShowFormElement
                    | A::HideFormElement
                    | A::Value
                    | A::SkipAnswers
                    | A::ValidationError
            ),
            RuleKind::FormElementGroup => {
                matches!(action, A::ShowFormElementGroup | A::HideFormElementGroup)
            }
            RuleKind::FormValidation => action == A::FormValidationError,
            RuleKind::Decision => action == A::AddDecision,
            RuleKind::VisitSchedule => action == A::ScheduleVisit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::FormValidation => "form validation",
            RuleKind::Decision => "decision",
            RuleKind::VisitSchedule => "visit schedule",
            RuleKind::FormElementGroup => "form element group",
            RuleKind::ViewFilter => "view filter",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed and checked declarative rules. Empty means "no rule".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclarativeRuleHolder {
    rules: Vec<DeclarativeRule>,
}

impl DeclarativeRuleHolder {
    pub fn new(rules: Vec<DeclarativeRule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[DeclarativeRule] {
        &self.rules
    }
}

/// Turns declarative rule sources into rule code.
///
/// Implementations never panic on malformed input; every failure is a
/// [`RuleError`].
pub trait RuleCompiler: Send + Sync {
    /// Read and check a rule source. A missing source, `null` or an empty
    /// array yields the empty holder.
    fn parse(&self, source: Option<&Value>, kind: RuleKind)
    -> Result<DeclarativeRuleHolder, RuleError>;

    /// Generate rule code for a non-empty holder
    fn generate(&self, holder: &DeclarativeRuleHolder, kind: RuleKind, entity_name: &str)
    -> String;

    /// Parse then generate. `Ok(None)` when the source holds no rule.
    fn compile(
        &self,
        source: Option<&Value>,
        kind: RuleKind,
        entity_name: &str,
    ) -> Result<Option<String>, RuleError> {
        let holder = self.parse(source, kind)?;
        if holder.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.generate(&holder, kind, entity_name)))
    }
}

/// Compiler for the declarative rule JSON produced by the form designer
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarativeRuleCompiler;

impl DeclarativeRuleCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl RuleCompiler for DeclarativeRuleCompiler {
    fn parse(
        &self,
        source: Option<&Value>,
        kind: RuleKind,
    ) -> Result<DeclarativeRuleHolder, RuleError> {
        let rules = validate::read_source(source)?;
        validate::validate(&rules, kind)?;
        log::trace!("parsed {} {} rule(s)", rules.len(), kind);
        Ok(DeclarativeRuleHolder::new(rules))
    }

    fn generate(
        &self,
        holder: &DeclarativeRuleHolder,
        kind: RuleKind,
        entity_name: &str,
    ) -> String {
        codegen::generate(holder.rules(), kind, entity_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RuleKind::ViewFilter, ActionType::SkipAnswers, true)]
    #[case(RuleKind::ViewFilter, ActionType::ShowFormElementGroup, false)]
    #[case(RuleKind::FormElementGroup, ActionType::HideFormElementGroup, true)]
    #[case(RuleKind::FormValidation, ActionType::ValidationError, false)]
    #[case(RuleKind::FormValidation, ActionType::FormValidationError, true)]
    #[case(RuleKind::Decision, ActionType::AddDecision, true)]
    #[case(RuleKind::VisitSchedule, ActionType::AddDecision, false)]
    fn test_allowed_actions(#[case] kind: RuleKind, #[case] action: ActionType, #[case] ok: bool) {
        assert_eq!(kind.allows(action), ok);
    }

    #[test]
    fn test_compile_empty_source() {
        let compiler = DeclarativeRuleCompiler::new();
        assert_eq!(compiler.compile(None, RuleKind::Decision, "individual"), Ok(None));
        assert_eq!(
            compiler.compile(Some(&Value::Array(vec![])), RuleKind::Decision, "individual"),
            Ok(None)
        );
    }
}
