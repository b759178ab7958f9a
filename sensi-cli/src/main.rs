#![warn(clippy::all)]
#![allow(clippy::pedantic)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sensi_common::logging::init_logging;
use sensi_common::{Config, Validate};

mod commands;
mod output;

use commands::CalcArgs;

/// `sensi` - touch sensitivity recommendations from the terminal.
#[derive(Parser, Debug)]
#[command(name = "sensi")]
#[command(version)]
#[command(about = "Recommend mobile shooter sensitivities for your device and playstyle.", long_about = None)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate sensitivities
    Calc {
        #[command(flatten)]
        args: CalcArgs,

        /// Print the reasoning behind each value
        #[arg(short, long)]
        explain: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Manage saved presets
    Presets {
        #[command(subcommand)]
        preset_command: PresetCommands,
    },

    /// Look up a device's screen, refresh rate and DPI
    Device {
        /// Device name, e.g. "Poco X3 Pro"
        name: String,

        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP API server
    Serve {
        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand, Debug)]
enum PresetCommands {
    /// List saved presets, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one preset
    Show {
        /// Preset id or unique id prefix
        id: String,

        #[arg(long)]
        json: bool,
    },
    /// Delete a preset
    Delete {
        /// Preset id or unique id prefix
        id: String,
    },
    /// Calculate and save a preset
    Save {
        /// Preset name
        name: String,

        #[command(flatten)]
        args: CalcArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_with_env().context("Failed to load configuration")?;

    // Keep stdout clean for command output unless asked otherwise
    let level = match (&cli.command, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Commands::Serve { .. }, false) => config.observability.log_level.clone(),
        _ => "warn".to_string(),
    };
    init_logging(&level, &config.observability.log_format);

    match cli.command {
        Commands::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.network.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

            tracing::info!("Sensi v{}", env!("CARGO_PKG_VERSION"));
            sensi_api::start_server(&config).await
        }

        Commands::Calc {
            args,
            explain,
            json,
        } => commands::calc(&config, &args, explain, json).await,

        Commands::Presets { preset_command } => match preset_command {
            PresetCommands::List { json } => commands::presets_list(&config, json).await,
            PresetCommands::Show { id, json } => commands::presets_show(&config, &id, json).await,
            PresetCommands::Delete { id } => commands::presets_delete(&config, &id).await,
            PresetCommands::Save { name, args } => {
                commands::presets_save(&config, &name, &args).await
            }
        },

        Commands::Device { name, json } => commands::device(&config, &name, json).await,
    }
}
