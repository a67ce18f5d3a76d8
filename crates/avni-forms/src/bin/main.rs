//! Avni form designer command-line interface

use anyhow::Result;
use avni_forms::cli::config::{ConfigCommand, ConnectionOptions};
use avni_forms::cli::{config, fetch, output, save, validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Avni form designer tool
#[derive(Parser)]
#[command(name = "avni-forms")]
#[command(author, version, about = "Avni form designer tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Connection {
    /// Configuration profile (reads ~/.avni-forms/config.<profile>.toml)
    #[arg(short, long)]
    profile: Option<String>,

    /// Configuration file to use instead of the profile
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server base URL
    #[arg(long, env = "AVNI_SERVER_URL")]
    server_url: Option<String>,

    /// Authentication token
    #[arg(long, env = "AVNI_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl From<Connection> for ConnectionOptions {
    fn from(c: Connection) -> Self {
        Self {
            profile: c.profile,
            config_file: c.config,
            server_url: c.server_url,
            auth_token: c.token,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate form definition files offline
    Validate {
        /// Form JSON files to validate
        files: Vec<PathBuf>,

        /// Earlier version of the form to check disallowed changes against
        #[arg(short, long)]
        against: Option<PathBuf>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a form from the server and print it
    Fetch {
        /// Form uuid
        form_uuid: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        connection: Connection,
    },

    /// Validate a local form file and save it to the server
    Save {
        /// Form JSON file
        file: PathBuf,

        /// Form uuid (default: the uuid in the file)
        #[arg(long)]
        form_uuid: Option<String>,

        #[command(flatten)]
        connection: Connection,
    },

    /// Show the resolved client configuration
    Config {
        /// Write the configuration file if it does not exist
        #[arg(long)]
        init: bool,

        #[command(flatten)]
        connection: Connection,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    let result: Result<bool> = match cli.command {
        Commands::Validate {
            files,
            against,
            json,
        } => validate::validate(validate::ValidateConfig {
            files,
            against,
            json,
            verbose: cli.verbose,
        }),

        Commands::Fetch {
            form_uuid,
            output,
            pretty,
            connection,
        } => fetch::fetch(fetch::FetchConfig {
            form_uuid,
            connection: connection.into(),
            output_file: output,
            pretty,
        })
        .await
        .map(|()| true),

        Commands::Save {
            file,
            form_uuid,
            connection,
        } => save::save(save::SaveConfig {
            file,
            form_uuid,
            connection: connection.into(),
            verbose: cli.verbose,
        })
        .await
        .map(|()| true),

        Commands::Config { init, connection } => config::config(ConfigCommand {
            connection: connection.into(),
            init,
        })
        .map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("{}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}
