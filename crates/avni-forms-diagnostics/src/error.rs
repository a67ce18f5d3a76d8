//! Form designer error types

use crate::{EntityPath, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - saving cannot proceed
    Error,
    /// Warning - potential issue but the form can be saved
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message attached to a place in the form tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Entity the message is about
    pub path: Option<EntityPath>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            path: None,
            help: code.info().help.map(str::to_string),
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    /// Set the entity path
    pub fn at(mut self, path: EntityPath) -> Self {
        self.path = Some(path);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render for a terminal, highlighting the severity
    #[cfg(feature = "colored")]
    pub fn render(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().blue().bold(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code, self.message);
        if let Some(path) = &self.path {
            out.push_str(&format!(" {} {}", "at".dimmed(), path.to_string().cyan()));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".green(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " at {}", path)?;
        }
        Ok(())
    }
}

/// Main form designer error type
#[derive(Debug, Clone, Error)]
pub enum FormsError {
    /// A declarative rule failed to parse
    #[error("{code}: {message}")]
    Rule {
        code: ErrorCode,
        message: String,
        path: Option<EntityPath>,
    },

    /// A field failed validation
    #[error("{code}: {message}")]
    Validation {
        code: ErrorCode,
        message: String,
        path: Option<EntityPath>,
    },

    /// An edit would break previously collected data
    #[error("{code}: {message}")]
    DisallowedChange {
        code: ErrorCode,
        message: String,
        path: Option<EntityPath>,
    },

    /// Network or server failure
    #[error("{code}: {message}")]
    Backend {
        code: ErrorCode,
        message: String,
        status: Option<u16>,
    },

    /// System error
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Multiple errors collected
    #[error("Multiple errors: {}", .0.len())]
    Multiple(Vec<FormsError>),
}

impl FormsError {
    pub fn rule(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Rule {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn disallowed_change(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::DisallowedChange {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn backend(code: ErrorCode, message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Backend {
            code,
            message: message.into(),
            status,
        }
    }

    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach the entity the error is about. Has no effect on backend,
    /// system and aggregate errors.
    pub fn at(mut self, new_path: EntityPath) -> Self {
        match &mut self {
            Self::Rule { path, .. }
            | Self::Validation { path, .. }
            | Self::DisallowedChange { path, .. } => *path = Some(new_path),
            _ => {}
        }
        self
    }

    /// Attach context to a system error
    pub fn with_context(mut self, new_context: impl Into<String>) -> Self {
        if let Self::System { context, .. } = &mut self {
            *context = Some(new_context.into());
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Rule { code, .. }
            | Self::Validation { code, .. }
            | Self::DisallowedChange { code, .. }
            | Self::Backend { code, .. }
            | Self::System { code, .. } => *code,
            Self::Multiple(errors) => errors
                .first()
                .map(|e| e.code())
                .unwrap_or(ErrorCode::new(0)),
        }
    }

    /// Get the entity path if available
    pub fn path(&self) -> Option<&EntityPath> {
        match self {
            Self::Rule { path, .. }
            | Self::Validation { path, .. }
            | Self::DisallowedChange { path, .. } => path.as_ref(),
            _ => None,
        }
    }

    /// Convert to one diagnostic per underlying error
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Rule { code, message, path }
            | Self::Validation { code, message, path }
            | Self::DisallowedChange { code, message, path } => {
                let diag = Diagnostic::error(*code, message.clone());
                vec![match path {
                    Some(p) => diag.at(p.clone()),
                    None => diag,
                }]
            }
            Self::Backend { code, message, status } => {
                let diag = Diagnostic::error(*code, message.clone());
                vec![match status {
                    Some(status) => diag.with_help(format!("HTTP status {}", status)),
                    None => diag,
                }]
            }
            Self::System { code, message, context } => {
                let diag = Diagnostic::error(*code, message.clone());
                vec![match context {
                    Some(ctx) => diag.with_help(ctx.clone()),
                    None => diag,
                }]
            }
            Self::Multiple(errors) => errors.iter().flat_map(|e| e.to_diagnostics()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AVF0004, AVF0102, AVF0301, AVF0402};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_with_path() {
        let err = FormsError::rule(AVF0004, "Unknown operator 'near'").at(EntityPath::element(0, 2, "fe-1"));

        assert!(matches!(err, FormsError::Rule { .. }));
        assert_eq!(err.code(), AVF0004);
        assert_eq!(err.path().and_then(|p| p.uuid()), Some("fe-1"));
    }

    #[test]
    fn test_path_ignored_for_backend_errors() {
        let err = FormsError::backend(AVF0301, "Bad request", Some(400)).at(EntityPath::Form);
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(AVF0102, "Form element name is empty").at(EntityPath::element(1, 0, "x"));

        let text = diag.to_string();
        assert!(text.contains("AVF0102"));
        assert!(text.contains("formElementGroups[1].formElements[0]"));
    }

    #[test]
    fn test_multiple_flattens_diagnostics() {
        let err = FormsError::Multiple(vec![
            FormsError::validation(AVF0102, "a"),
            FormsError::system(AVF0402, "b").with_context("config.toml"),
        ]);

        let diags = err.to_diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[1].help.as_deref(), Some("config.toml"));
        assert_eq!(err.code(), AVF0102);
    }
}
