//! Command-line front end for the inventory core.
//!
//! Stands in for the HTTP handlers: every subcommand goes through the same
//! `InventoryService` composition the server would use.

use clap::{Parser, Subcommand};
use inventory_core::{
    init_logging, BackendKind, ImageStore, InitError, InventoryService, ItemBackend, LogTarget,
    StoreConfig,
};
use log::error;
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "inventory")]
#[command(version, about = "Manage inventory items and their photos")]
struct Cli {
    /// Item backend: normalized, denormalized or file
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// SQLite database for relational backends
    #[arg(long = "db", global = true)]
    db_path: Option<PathBuf>,

    /// JSON document for the file backend
    #[arg(long, global = true)]
    items_file: Option<PathBuf>,

    /// Directory holding item photos and default.jpg
    #[arg(long, global = true)]
    image_dir: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files (stderr when unset)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add an item with a photo
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        /// Path to the photo file
        #[arg(long)]
        image: PathBuf,
    },
    /// List all items
    List,
    /// Show one item by id
    Get { id: String },
    /// Print the on-disk path served for an image name
    Image { name: String },
}

impl Cli {
    fn store_config(&self) -> Result<StoreConfig, InitError> {
        Ok(self.apply_overrides(StoreConfig::from_env()?))
    }

    /// Command-line flags take precedence over environment settings.
    fn apply_overrides(&self, mut config: StoreConfig) -> StoreConfig {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(path) = &self.db_path {
            config.db_path = path.clone();
        }
        if let Some(path) = &self.items_file {
            config.items_file_path = path.clone();
        }
        if let Some(dir) = &self.image_dir {
            config.image_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.store_config()?;
    init_logging(
        &config.log_level,
        LogTarget::from_dir(config.log_dir.as_deref()),
    )
    .map_err(InitError::Logging)?;

    let backend = ItemBackend::open(&config)?;
    let images = ImageStore::open(&config.image_dir).map_err(InitError::from)?;
    let service = InventoryService::new(backend.repository()?, images);

    match &cli.command {
        Command::Add {
            name,
            category,
            image,
        } => {
            let bytes = std::fs::read(image)?;
            service.add_item(name, category, &bytes)?;
            let message = format!("item received: {name}");
            println!("{}", json!({ "message": message }));
        }
        Command::List => {
            let items = service.list_items()?;
            println!("{}", json!({ "items": items }));
        }
        Command::Get { id } => {
            let item = service.get_item(id)?;
            println!("{}", serde_json::to_string(&item)?);
        }
        Command::Image { name } => {
            let path = service.image_path(name)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
