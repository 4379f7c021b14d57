use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use asset_sync::{JsonVersionStore, ResourceRequest, SyncConfig, SyncSession};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;

#[derive(Parser)]
#[command(name = "asset-sync")]
#[command(author, version, about = "Install packaged seed assets when a newer version ships", long_about = None)]
struct Cli {
    /// Directory holding asset_sync.config.json; relative paths resolve from here
    #[arg(short, long, default_value = ".")]
    config_dir: PathBuf,

    /// Override the package root from the configuration
    #[arg(long)]
    package_root: Option<String>,

    /// Override the version store file from the configuration
    #[arg(long)]
    store: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a packaged resource into local storage if it is newer
    Copy {
        /// Package folder containing the resource
        folder: String,
        /// Resource name, optionally with extension (e.g. `data` or `data.db`)
        name: String,
        /// Destination folder, relative to the config dir (defaults to the configured destination)
        #[arg(short, long)]
        dest: Option<PathBuf>,
        /// The resource is packaged without any extension
        #[arg(long)]
        bare: bool,
    },
    /// Show which packaged entry a resource name resolves to
    Locate {
        /// Package folder containing the resource
        folder: String,
        /// Resource name, optionally with extension
        name: String,
        /// The resource is packaged without any extension
        #[arg(long)]
        bare: bool,
    },
    /// Print installed versions from the version store
    Status {
        /// Only show this resource
        name: Option<String>,
    },
}

fn build_request(folder: &str, name: &str, bare: bool) -> Result<ResourceRequest> {
    let request = if bare {
        ResourceRequest::bare(folder, name)
    } else {
        ResourceRequest::from_name(folder, name)
    };
    request.with_context(|| format!("invalid resource {name:?}"))
}

/// Resolve a command-line destination the same way configured paths are resolved.
fn destination_path(config_dir: &Path, dest: &Path) -> PathBuf {
    config_dir.join(dest)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = SyncConfig::discover(&cli.config_dir);
    if let Some(package_root) = cli.package_root {
        config.package_root = package_root;
    }
    if let Some(store) = cli.store {
        config.version_store_file = store;
    }
    debug!(?config, "resolved configuration");

    match cli.command {
        Commands::Copy {
            folder,
            name,
            dest,
            bare,
        } => {
            config
                .validate(&cli.config_dir)
                .context("unusable configuration")?;
            let mut request = build_request(&folder, &name, bare)?;
            if let Some(dest) = dest {
                request = request.destination(destination_path(&cli.config_dir, &dest));
            }

            let mut session = SyncSession::from_config(&config, &cli.config_dir);
            let outcome = session
                .sync(&request)
                .with_context(|| format!("failed to sync {name:?} from {folder:?}"))?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Locate { folder, name, bare } => {
            let request = build_request(&folder, &name, bare)?;
            let mut session = SyncSession::from_config(&config, &cli.config_dir);
            let asset = session
                .locate(&request)
                .with_context(|| format!("failed to locate {name:?} in {folder:?}"))?;
            let report = json!({
                "asset": asset.full_asset_path,
                "version": asset.extracted_version,
                "extension": asset.extension,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Status { name } => {
            let store = JsonVersionStore::new(config.version_store_path(&cli.config_dir));
            let mut entries = store
                .entries()
                .with_context(|| format!("failed to read {}", store.path().display()))?;
            if let Some(name) = name {
                entries.retain(|key, _| *key == name);
            }
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}
