//! `imgstore` CLI - thin front-end over `imgstore-core`
//!
//! Usage:
//!   `imgstore create photos.bin --max-files 1000 --thumb-res 128x128 --small-res 512x512`
//!   `imgstore insert photos.bin vacation.jpg vacation-01`
//!   `imgstore read photos.bin vacation-01 thumb`
//!   `imgstore delete photos.bin vacation-01`
//!   `imgstore list photos.bin --json`
//!   `imgstore gc photos.bin scratch.bin`

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use imgstore_core::{compact, Error, ListMode, OpenMode, Result, Store, Variant};

#[derive(Parser)]
#[command(name = "imgstore")]
#[command(author, version, about = "Single-file content-addressed JPEG image store")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty store file
    Create {
        /// Path to the store file
        path: PathBuf,

        /// Capacity of the metadata array (1..=100000)
        #[arg(long)]
        max_files: u32,

        /// Thumbnail bounding box, as `WxH` (each axis <= 128)
        #[arg(long, default_value = "64x64")]
        thumb_res: String,

        /// Small bounding box, as `WxH` (each axis <= 512)
        #[arg(long, default_value = "256x256")]
        small_res: String,
    },

    /// Insert a JPEG file under an image id
    Insert {
        /// Path to the store file
        path: PathBuf,

        /// Path to the JPEG file to insert
        image: PathBuf,

        /// Image id to insert under (1-127 bytes, unique)
        img_id: String,
    },

    /// Read an image variant out to `<img_id><suffix>.jpg` in the current directory
    Read {
        /// Path to the store file
        path: PathBuf,

        /// Image id to read
        img_id: String,

        /// Resolution token: original/orig, thumbnail/thumb, small
        resolution: String,
    },

    /// Logically delete an image by id
    Delete {
        /// Path to the store file
        path: PathBuf,

        /// Image id to delete
        img_id: String,
    },

    /// List valid images
    List {
        /// Path to the store file
        path: PathBuf,

        /// Emit `{"Images": [...]}` instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Compact the store, reclaiming unreferenced payload bytes
    Gc {
        /// Path to the store file
        path: PathBuf,

        /// Scratch path used while rebuilding the store
        scratch_path: PathBuf,
    },
}

fn parse_resolution(token: &str) -> Result<(u16, u16)> {
    let (w, h) = token
        .split_once('x')
        .ok_or_else(|| Error::InvalidArgument(format!("expected WxH, got '{token}'")))?;
    let w: u16 = w
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid width '{w}'")))?;
    let h: u16 = h
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid height '{h}'")))?;
    Ok((w, h))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Create {
            path,
            max_files,
            thumb_res,
            small_res,
        } => {
            let thumb = parse_resolution(&thumb_res)?;
            let small = parse_resolution(&small_res)?;
            Store::create(&path, max_files, thumb, small)?;
            println!("created {} (max_files={max_files})", path.display());
        }
        Commands::Insert { path, image, img_id } => {
            let bytes = fs::read(&image)?;
            let mut store = Store::open(&path, OpenMode::ReadWrite)?;
            store.insert(&bytes, &img_id)?;
            println!("inserted '{img_id}' ({} bytes)", bytes.len());
        }
        Commands::Read {
            path,
            img_id,
            resolution,
        } => {
            let variant = Variant::from_token(&resolution)?;
            let mut store = Store::open(&path, OpenMode::ReadWrite)?;
            let bytes = store.read(&img_id, variant)?;
            let out_path = PathBuf::from(format!("{img_id}{}.jpg", variant.suffix()));
            fs::write(&out_path, &bytes)?;
            println!("wrote {} ({} bytes)", out_path.display(), bytes.len());
        }
        Commands::Delete { path, img_id } => {
            let mut store = Store::open(&path, OpenMode::ReadWrite)?;
            store.delete(&img_id)?;
            println!("deleted '{img_id}'");
        }
        Commands::List { path, json } => {
            let store = Store::open(&path, OpenMode::ReadOnly)?;
            let mode = if json { ListMode::Json } else { ListMode::Human };
            print!("{}", store.list(mode)?);
        }
        Commands::Gc { path, scratch_path } => {
            compact(&path, &scratch_path)?;
            println!("compacted {}", path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: [{}] {e}", e.code());
            ExitCode::FAILURE
        }
    }
}
