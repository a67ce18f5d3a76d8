//! Editing and validating Avni form definitions
//!
//! This crate provides:
//! - [`mutators`]: in-place editing operations, as free functions and as
//!   [`FormEdit`] commands
//! - [`Validator`]: the whole-form check run before saving
//! - [`OriginalShapes`]: element shapes recorded at load time, used to refuse
//!   edits that would break already collected data
//!
//! # Example
//!
//! ```
//! use avni_forms_editor::{FormEdit, GroupField, OriginalShapes, Validator};
//! use avni_forms_model::FormDefinition;
//! use avni_forms_rules::DeclarativeRuleCompiler;
//!
//! let mut form = FormDefinition { name: "Registration".into(), ..Default::default() };
//! FormEdit::AddGroup { after: 0 }.apply(&mut form);
//! FormEdit::SetGroupField { group: 0, field: GroupField::Name("Basics".into()) }.apply(&mut form);
//!
//! let compiler = DeclarativeRuleCompiler::new();
//! let originals = OriginalShapes::of(&form);
//! let report = Validator::new(&compiler, &originals).validate(&mut form);
//!
//! // The new group's blank element has no name and no concept yet
//! assert_eq!(report.message, "There is an error in 1 form element(s).");
//! ```

pub mod mutators;
mod originals;
mod validator;

pub use mutators::{
    AnswerFlag, ElementField, FormEdit, GroupField, InlineAttributeGroup, NumericBound,
    ValidFormatPart,
};
pub use originals::OriginalShapes;
pub use validator::{ValidationReport, Validator};
