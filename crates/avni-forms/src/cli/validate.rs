//! Validate command implementation
//!
//! Runs the whole-form validation on form files exported from the server,
//! without talking to it.

use super::{output, read_form};
use anyhow::Result;
use avni_forms_editor::{OriginalShapes, ValidationReport, Validator};
use avni_forms_rules::DeclarativeRuleCompiler;
use avni_forms_session::normalize;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Configuration for validate command
pub struct ValidateConfig {
    pub files: Vec<PathBuf>,
    /// Earlier version of the form; changes of selection mode or
    /// repeatability against it are reported
    pub against: Option<PathBuf>,
    /// Print reports as JSON
    pub json: bool,
    pub verbose: bool,
}

/// Validate form files. Returns whether every file is valid.
pub fn validate(config: ValidateConfig) -> Result<bool> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for validation");
    }

    let baseline = match &config.against {
        Some(path) => {
            let mut form = read_form(path)?;
            let mut shapes = OriginalShapes::new();
            normalize(&mut form, &mut shapes);
            Some(shapes)
        }
        None => None,
    };

    let mut failed = 0;
    for file in &config.files {
        if config.verbose {
            eprintln!("Validating: {}", file.display());
        }
        let report = validate_file(file, baseline.as_ref())?;
        if !report.is_valid() {
            failed += 1;
        }
        print_report(file, &report, config.json)?;
    }

    println!();
    if failed == 0 {
        println!(
            "{}",
            output::format_success(&format!(
                "All {} form(s) validated successfully",
                config.files.len()
            ))
        );
        Ok(true)
    } else {
        eprintln!(
            "{} {} of {} form(s) have errors",
            "Validation failed:".red().bold(),
            failed,
            config.files.len()
        );
        Ok(false)
    }
}

/// Validate one file the way a freshly loaded form is validated
pub fn validate_file(file: &Path, baseline: Option<&OriginalShapes>) -> Result<ValidationReport> {
    let mut form = read_form(file)?;
    let mut own_shapes = OriginalShapes::new();
    normalize(&mut form, &mut own_shapes);

    let compiler = DeclarativeRuleCompiler::new();
    let originals = baseline.unwrap_or(&own_shapes);
    Ok(Validator::new(&compiler, originals).validate(&mut form))
}

fn print_report(file: &Path, report: &ValidationReport, json: bool) -> Result<()> {
    if json {
        let value = serde_json::to_value(report)?;
        return output::write_output(&output::format_json(&value, true)?, None);
    }
    let status = if report.is_valid() {
        "ok".green().bold()
    } else {
        "failed".red().bold()
    };
    println!("{} {}", file.display().to_string().cyan(), status);
    if !report.is_valid() {
        println!("{}", output::format_report(report));
    }
    Ok(())
}
