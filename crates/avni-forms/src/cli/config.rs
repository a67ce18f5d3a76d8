//! Config command and connection settings shared by the server commands

use super::output;
use anyhow::{Context, Result};
use avni_forms_session::{ClientConfig, HttpFormsBackend};
use std::path::PathBuf;

/// Where to find the server, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    /// Configuration profile under `~/.avni-forms`
    pub profile: Option<String>,
    /// Explicit configuration file, instead of the profile lookup
    pub config_file: Option<PathBuf>,
    pub server_url: Option<String>,
    pub auth_token: Option<String>,
}

impl ConnectionOptions {
    /// File configuration, then environment, then command-line flags
    pub fn resolve(&self) -> Result<ClientConfig> {
        let config = match &self.config_file {
            Some(path) => ClientConfig::load_from(path)?
                .with_overrides(|name| std::env::var(name).ok()),
            None => ClientConfig::load(self.profile.as_deref())?,
        };
        Ok(self.apply_flags(config))
    }

    fn apply_flags(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.server_url {
            config.server_url = url.clone();
        }
        if let Some(token) = &self.auth_token {
            config.auth_token = Some(token.clone());
        }
        config
    }

    pub fn backend(&self) -> Result<HttpFormsBackend> {
        let config = self.resolve()?;
        HttpFormsBackend::from_config(&config)
            .with_context(|| format!("Failed to set up client for {}", config.server_url))
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.config_file {
            Some(path) => Ok(path.clone()),
            None => Ok(ClientConfig::config_path(self.profile.as_deref())?),
        }
    }
}

/// Configuration for config command
pub struct ConfigCommand {
    pub connection: ConnectionOptions,
    /// Write a configuration file with the resolved settings if none exists
    pub init: bool,
}

/// Show the resolved configuration, optionally writing it first
pub fn config(command: ConfigCommand) -> Result<()> {
    let path = command.connection.config_path()?;
    let resolved = command.connection.resolve()?;

    if command.init {
        if path.exists() {
            eprintln!(
                "{}",
                output::format_warning(&format!("{} already exists", path.display()))
            );
        } else {
            resolved.save_to(&path)?;
            eprintln!(
                "{}",
                output::format_success(&format!("Wrote {}", path.display()))
            );
        }
    }

    println!("# {}", path.display());
    println!("{}", render(&resolved)?);
    Ok(())
}

/// TOML for display, with the token masked
fn render(config: &ClientConfig) -> Result<String> {
    let shown = ClientConfig {
        auth_token: config.auth_token.as_ref().map(|_| "********".to_string()),
        ..config.clone()
    };
    toml::to_string_pretty(&shown).context("Failed to render configuration")
}
