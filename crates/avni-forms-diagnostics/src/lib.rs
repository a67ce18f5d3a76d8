//! Form designer diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the form
//! designer crates, including error codes, entity locations within a form
//! definition, and diagnostic reporting.

mod error;
mod error_code;
mod location;

pub use error::*;
pub use error_code::*;
pub use location::*;

/// Result type for form designer operations
pub type Result<T> = std::result::Result<T, FormsError>;
