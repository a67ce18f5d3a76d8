//! Form definition model
//!
//! This crate provides:
//! - The form definition tree (form, groups, elements)
//! - Concepts and coded answers, shared between elements
//! - Concept data types and form types
//! - The per-data-type attribute bag and its wire representation

pub mod attributes;
pub mod concept;
pub mod data_type;
pub mod form;
mod wire;

pub use attributes::*;
pub use concept::*;
pub use data_type::*;
pub use form::*;
