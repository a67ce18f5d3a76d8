//! Form designer error codes following a structured numbering system
//!
//! Error code ranges:
//! - AVF0001-AVF0099: Rule errors (declarative rule parsing and generation)
//! - AVF0100-AVF0199: Field validation errors (names, data types, attributes)
//! - AVF0200-AVF0299: Disallowed changes (edits unsafe for collected data)
//! - AVF0300-AVF0399: Backend errors (network, server responses)
//! - AVF0400-AVF0499: System errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    pub const fn is_rule_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    pub const fn is_validation_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    pub const fn is_disallowed_change(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    pub const fn is_backend_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Whether the user can fix the problem by editing the form.
    ///
    /// Backend and system failures leave the edit session intact but are not
    /// caused by the form content.
    pub const fn is_recoverable_by_edit(&self) -> bool {
        self.0 >= 1 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AVF{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Rule errors (0001-0099)
    map.insert(1, ErrorInfo::new("Declarative rule is not valid JSON"));
    map.insert(2, ErrorInfo::new("Declarative rule has an invalid structure"));
    map.insert(3, ErrorInfo::new("Declarative rule condition is incomplete")
        .with_help("Every rule needs a left-hand side, an operator and, unless the operator is defined/notDefined, a right-hand side"));
    map.insert(4, ErrorInfo::new("Unknown operator"));
    map.insert(5, ErrorInfo::new("Declarative rule action is incomplete"));
    map.insert(6, ErrorInfo::new("Action not allowed for this rule kind"));

    // Field validation errors (0100-0199)
    map.insert(100, ErrorInfo::new("Form name is empty"));
    map.insert(101, ErrorInfo::new("Form element group name is empty"));
    map.insert(102, ErrorInfo::new("Form element name is empty"));
    map.insert(103, ErrorInfo::new("Concept data type is not set"));
    map.insert(104, ErrorInfo::new("Coded form element has no type")
        .with_help("Choose single select or multi select"));
    map.insert(105, ErrorInfo::new("Video duration limit is negative"));
    map.insert(106, ErrorInfo::new("Image maximum height is negative"));
    map.insert(107, ErrorInfo::new("Image maximum width is negative"));
    map.insert(108, ErrorInfo::new("Valid format needs both a regex and a description key"));
    map.insert(109, ErrorInfo::new("Duration form element has no duration options"));

    // Disallowed changes (0200-0299)
    map.insert(200, ErrorInfo::new("Selection type changed after data collection")
        .with_help("Existing observations were collected with the original selection type"));
    map.insert(201, ErrorInfo::new("Question group repeatability changed after data collection"));

    // Backend errors (0300-0399)
    map.insert(300, ErrorInfo::new("Network error"));
    map.insert(301, ErrorInfo::new("Server rejected the request"));
    map.insert(302, ErrorInfo::new("Unexpected response body"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Configuration error"));
    map.insert(403, ErrorInfo::new("Invalid format"));

    map
});

// Rule errors
pub const AVF0001: ErrorCode = ErrorCode::new(1);
pub const AVF0002: ErrorCode = ErrorCode::new(2);
pub const AVF0003: ErrorCode = ErrorCode::new(3);
pub const AVF0004: ErrorCode = ErrorCode::new(4);
pub const AVF0005: ErrorCode = ErrorCode::new(5);
pub const AVF0006: ErrorCode = ErrorCode::new(6);

// Field validation errors
pub const AVF0100: ErrorCode = ErrorCode::new(100);
pub const AVF0101: ErrorCode = ErrorCode::new(101);
pub const AVF0102: ErrorCode = ErrorCode::new(102);
pub const AVF0103: ErrorCode = ErrorCode::new(103);
pub const AVF0104: ErrorCode = ErrorCode::new(104);
pub const AVF0105: ErrorCode = ErrorCode::new(105);
pub const AVF0106: ErrorCode = ErrorCode::new(106);
pub const AVF0107: ErrorCode = ErrorCode::new(107);
pub const AVF0108: ErrorCode = ErrorCode::new(108);
pub const AVF0109: ErrorCode = ErrorCode::new(109);

// Disallowed changes
pub const AVF0200: ErrorCode = ErrorCode::new(200);
pub const AVF0201: ErrorCode = ErrorCode::new(201);

// Backend errors
pub const AVF0300: ErrorCode = ErrorCode::new(300);
pub const AVF0301: ErrorCode = ErrorCode::new(301);
pub const AVF0302: ErrorCode = ErrorCode::new(302);

// System errors
pub const AVF0400: ErrorCode = ErrorCode::new(400);
pub const AVF0401: ErrorCode = ErrorCode::new(401);
pub const AVF0402: ErrorCode = ErrorCode::new(402);
pub const AVF0403: ErrorCode = ErrorCode::new(403);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(AVF0001.to_string(), "AVF0001");
        assert_eq!(AVF0109.to_string(), "AVF0109");
    }

    #[test]
    fn test_error_categories() {
        assert!(AVF0001.is_rule_error());
        assert!(!AVF0001.is_validation_error());

        assert!(AVF0100.is_validation_error());
        assert!(AVF0200.is_disallowed_change());
        assert!(AVF0300.is_backend_error());
        assert!(AVF0400.is_system_error());
    }

    #[test]
    fn test_recoverable_by_edit() {
        assert!(AVF0004.is_recoverable_by_edit());
        assert!(AVF0201.is_recoverable_by_edit());
        assert!(!AVF0301.is_recoverable_by_edit());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(AVF0100.info().description, "Form name is empty");
        assert!(AVF0104.info().help.is_some());
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }
}
