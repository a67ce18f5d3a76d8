//! CLI functionality for the form designer tool
//!
//! This module contains all CLI-related functionality including:
//! - Offline validation of form files
//! - Fetching a form from the server
//! - Saving a local form file to the server
//! - Client configuration
//! - Output formatting

pub mod config;
pub mod fetch;
pub mod output;
pub mod save;
pub mod validate;

use anyhow::{Context, Result};
use avni_forms_model::FormDefinition;
use std::fs;
use std::path::Path;

/// Read a form definition from a JSON file
pub fn read_form(path: &Path) -> Result<FormDefinition> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse form file: {}", path.display()))
}
