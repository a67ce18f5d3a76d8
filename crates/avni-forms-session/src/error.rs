//! Session error type

use crate::BackendError;
use avni_forms_diagnostics::{AVF0400, AVF0403, FormsError};
use avni_forms_editor::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("form could not be read: {0}")]
    Decode(#[from] serde_json::Error),

    /// Validation failed; the report is also attached to the session
    #[error("form has validation errors")]
    Invalid(Box<ValidationReport>),

    #[error("form belongs to another organisation and is read-only")]
    ReadOnly,

    #[error("no form is loaded")]
    NotLoaded,

    /// The session was torn down while a request was in flight
    #[error("session was closed")]
    Closed,
}

impl SessionError {
    pub fn to_forms_error(&self) -> FormsError {
        match self {
            Self::Backend(err) => err.to_forms_error(),
            Self::Decode(err) => FormsError::system(AVF0403, err.to_string()),
            Self::Invalid(report) => FormsError::Multiple(
                report
                    .diagnostics
                    .iter()
                    .map(|d| {
                        let err = FormsError::validation(d.code, d.message.clone());
                        match &d.path {
                            Some(path) => err.at(path.clone()),
                            None => err,
                        }
                    })
                    .collect(),
            ),
            Self::ReadOnly | Self::NotLoaded | Self::Closed => {
                FormsError::system(AVF0400, self.to_string())
            }
        }
    }
}
