//! Rule errors

use crate::RuleKind;
use avni_forms_diagnostics::{
    AVF0001, AVF0002, AVF0003, AVF0004, AVF0005, AVF0006, ErrorCode, FormsError,
};
use thiserror::Error;

/// Why a declarative rule could not be parsed.
///
/// `at` is a human-readable position such as `Rule 1, condition 2, rule 1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Declarative rule is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("{at}: {message}")]
    InvalidStructure { at: String, message: String },

    #[error("{at}: {message}")]
    IncompleteCondition { at: String, message: String },

    #[error("{at}: unknown operator '{operator}'")]
    UnknownOperator { at: String, operator: String },

    #[error("{at}: {message}")]
    IncompleteAction { at: String, message: String },

    #[error("{at}: action '{action}' cannot be used in a {kind} rule")]
    ActionNotAllowed {
        at: String,
        action: String,
        kind: RuleKind,
    },
}

impl RuleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidJson(_) => AVF0001,
            Self::InvalidStructure { .. } => AVF0002,
            Self::IncompleteCondition { .. } => AVF0003,
            Self::UnknownOperator { .. } => AVF0004,
            Self::IncompleteAction { .. } => AVF0005,
            Self::ActionNotAllowed { .. } => AVF0006,
        }
    }

    pub(crate) fn structure(at: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            at: at.into(),
            message: message.into(),
        }
    }

    pub(crate) fn condition(at: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IncompleteCondition {
            at: at.into(),
            message: message.into(),
        }
    }

    pub(crate) fn action(at: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IncompleteAction {
            at: at.into(),
            message: message.into(),
        }
    }
}

impl From<RuleError> for FormsError {
    fn from(err: RuleError) -> Self {
        FormsError::rule(err.code(), err.to_string())
    }
}
