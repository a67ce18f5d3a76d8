//! Fetch command implementation

use super::config::ConnectionOptions;
use super::output;
use anyhow::{Context, Result};
use avni_forms_session::FormSession;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for fetch command
pub struct FetchConfig {
    pub form_uuid: String,
    pub connection: ConnectionOptions,
    pub output_file: Option<PathBuf>,
    pub pretty: bool,
}

/// Load a form the way the designer does and print it
pub async fn fetch(config: FetchConfig) -> Result<()> {
    let backend = Arc::new(config.connection.backend()?);
    let mut session = FormSession::new(backend, config.form_uuid.clone());

    let loaded = session.load().await;
    if let Some(message) = session.message() {
        eprintln!("{}", output::format_warning(message));
    }
    loaded.with_context(|| format!("{} ({})", session.state(), config.form_uuid))?;

    let value = serde_json::to_value(session.form()).context("Failed to serialize form")?;
    let content = output::format_json(&value, config.pretty)?;
    output::write_output(&content, config.output_file.as_deref())
}
