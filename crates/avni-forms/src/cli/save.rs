//! Save command implementation
//!
//! Replaces a form on the server with a local file. The server's current
//! version is loaded first, so edits that would break collected data are
//! refused exactly as in the designer.

use super::config::ConnectionOptions;
use super::{output, read_form};
use anyhow::{Context, Result};
use avni_forms_editor::OriginalShapes;
use avni_forms_session::{FormSession, SessionError, normalize};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for save command
pub struct SaveConfig {
    pub file: PathBuf,
    /// Defaults to the uuid in the file
    pub form_uuid: Option<String>,
    pub connection: ConnectionOptions,
    pub verbose: bool,
}

pub async fn save(config: SaveConfig) -> Result<()> {
    let mut local = read_form(&config.file)?;
    normalize(&mut local, &mut OriginalShapes::new());

    let form_uuid = match config.form_uuid {
        Some(uuid) => uuid,
        None if !local.uuid.is_empty() => local.uuid.clone(),
        None => anyhow::bail!(
            "{} has no uuid; pass --form-uuid",
            config.file.display()
        ),
    };

    let backend = Arc::new(config.connection.backend()?);
    let mut session = FormSession::new(backend, form_uuid.clone());
    let loaded = session.load().await;
    loaded.with_context(|| format!("{} ({})", session.state(), form_uuid))?;
    if config.verbose {
        eprintln!("Loaded {} from the server", form_uuid);
    }

    let name = local.name.clone();
    let timed = local.timed;
    session.edit(move |form| *form = local)?;
    session.set_name(name)?;
    session.set_timed(timed)?;

    match session.save().await {
        Ok(()) => {
            eprintln!(
                "{}",
                output::format_success(&format!("Saved {}", form_uuid))
            );
            Ok(())
        }
        Err(SessionError::Invalid(report)) => {
            eprintln!("{}", output::format_report(&report));
            anyhow::bail!("{} was not saved", config.file.display())
        }
        Err(err) => Err(anyhow::Error::new(err).context(session.state().to_string())),
    }
}
