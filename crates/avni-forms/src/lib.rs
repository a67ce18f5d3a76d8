//! Form designer core for the Avni data collection platform
//!
//! This crate re-exports the form designer crates:
//! - [`model`]: the form definition tree and its wire format
//! - [`rules`]: declarative rules, their validation and code generation
//! - [`editor`]: editing operations and whole-form validation
//! - [`session`]: loading, editing and saving a form against the server
//! - [`diagnostics`]: error codes and diagnostics
//!
//! # Example
//!
//! ```
//! use avni_forms::{DeclarativeRuleCompiler, FormDefinition, OriginalShapes, Validator};
//!
//! let mut form: FormDefinition = serde_json::from_str(r#"{
//!     "name": "Registration",
//!     "formElementGroups": [{"uuid": "g-1", "name": "", "formElements": []}]
//! }"#).unwrap();
//!
//! let compiler = DeclarativeRuleCompiler::new();
//! let originals = OriginalShapes::of(&form);
//! let report = Validator::new(&compiler, &originals).validate(&mut form);
//! assert_eq!(report.message, "There is an error in 1 form group(s).");
//! ```

pub use avni_forms_diagnostics as diagnostics;
pub use avni_forms_editor as editor;
pub use avni_forms_model as model;
pub use avni_forms_rules as rules;
pub use avni_forms_session as session;

// Convenience re-exports
pub use avni_forms_diagnostics::{Diagnostic, FormsError, Result};
pub use avni_forms_editor::{FormEdit, OriginalShapes, ValidationReport, Validator};
pub use avni_forms_model::FormDefinition;
pub use avni_forms_rules::{DeclarativeRuleCompiler, RuleCompiler};
pub use avni_forms_session::{ClientConfig, FormSession, FormsBackend, HttpFormsBackend};

#[cfg(feature = "cli")]
pub mod cli;
