mod catalog;
mod database;
mod error;
mod ingest;
mod media;
mod server;
mod utils;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::catalog::{Catalog, Submission};
use crate::database::store::Database;
use crate::ingest::images::{ImageStore, ImageUpload};
use crate::utils::config::{save_to_env, Config, ENV_FILE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Item listing backend", long_about = None)]
struct Args {
    /// SQLite database file (overrides CATALOG_DB_PATH)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Directory holding uploaded images (overrides CATALOG_IMAGE_DIR)
    #[arg(long, global = true)]
    image_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Create the database and image directory, and write the config to .env
    Init,
    /// Add an item
    Add {
        name: String,
        category: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List every item
    List,
    /// Items whose name equals the keyword
    Search { keyword: String },
    /// Show one item
    Show { id: i64 },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }
    if let Some(image_dir) = args.image_dir {
        config.image_dir = image_dir;
    }

    let db = Database::new(&config.db_path);
    db.initialize()?;
    let images = ImageStore::new(&config.image_dir);
    info!("DB: {:?}", db.path());
    info!("Images: {:?}", images.root());
    let catalog = Catalog::new(db, images);

    match args.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(server::serve(catalog, &bind, &config))?;
        }
        Command::Init => {
            fs::create_dir_all(&config.image_dir)
                .with_context(|| format!("Failed to create {:?}", config.image_dir))?;
            save_to_env(Path::new(ENV_FILE), &config)?;
            info!("Wrote configuration to {}", ENV_FILE);
        }
        Command::Add {
            name,
            category,
            image,
        } => {
            let image = image.as_deref().map(read_upload).transpose()?;
            let ack = catalog.submit(Submission {
                name,
                category,
                image,
            })?;
            print_json(&ack)?;
        }
        Command::List => print_json(&catalog.list()?)?,
        Command::Search { keyword } => print_json(&catalog.search(&keyword)?)?,
        Command::Show { id } => print_json(&catalog.detail(id)?)?,
    }

    Ok(())
}

fn read_upload(path: &Path) -> Result<ImageUpload> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("Not a file path: {:?}", path))?;
    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(ImageUpload { file_name, bytes })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
