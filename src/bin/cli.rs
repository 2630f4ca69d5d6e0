//! flashts CLI
//!
//! Host-side tool for formatting and inspecting flash image files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flashts::{Config, Database, FileBlockDevice, Result, TsdbError};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// flashts CLI
#[derive(Parser, Debug)]
#[command(name = "flashts-cli")]
#[command(about = "Format and inspect flashts flash images")]
#[command(version)]
struct Args {
    /// Flash image file
    #[arg(short, long)]
    image: PathBuf,

    /// Erase block size in bytes
    #[arg(short, long, default_value = "4096")]
    block_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an erased image and format it
    Make {
        /// Number of blocks in the image
        #[arg(long, default_value = "64")]
        blocks: usize,

        /// Directory capacity (number of series)
        #[arg(long, default_value = "64")]
        capacity: usize,

        /// Extra header metadata as key=value (value parsed as JSON if possible)
        #[arg(long = "meta")]
        meta: Vec<String>,
    },

    /// Print a summary of the database
    Info,

    /// List live series
    Keys,

    /// Create a series
    Create {
        /// Series key
        key: String,

        /// Minimum number of items the series must hold
        capacity: usize,
    },

    /// Append a sample
    Append {
        /// Series key
        key: String,

        /// Timestamp (seconds)
        timestamp: u32,

        /// Sample value
        value: f32,
    },

    /// Print the history of a series
    Values {
        /// Series key
        key: String,

        /// Fall back to deleted series with this key
        #[arg(long)]
        include_deleted: bool,
    },

    /// Delete a series
    Delete {
        /// Series key
        key: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,flashts=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    tracing::debug!("flashts CLI v{}", flashts::VERSION);
    tracing::debug!("Image: {}", args.image.display());

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if let Commands::Make {
        blocks,
        capacity,
        meta,
    } = &args.command
    {
        let mut builder = Config::builder().directory_capacity(*capacity);
        for pair in meta {
            let (key, value) = parse_meta(pair)?;
            builder = builder.metadata(key, value);
        }

        let device = FileBlockDevice::create(&args.image, args.block_size, *blocks)?;
        Database::make(&device, &builder.build())?;
        println!("{}", Database::open(device)?);
        return Ok(());
    }

    let device = FileBlockDevice::open(&args.image, args.block_size)?;
    let mut db = Database::open(device)?;

    match args.command {
        Commands::Make { .. } => {}
        Commands::Info => print!("{}", db),
        Commands::Keys => {
            for key in db.keys() {
                println!("{}", key);
            }
        }
        Commands::Create { key, capacity } => {
            db.create_record(&key, capacity)?;
            println!(
                "{}: capacity {} items",
                key,
                db.record_capacity(&key)?
            );
        }
        Commands::Append {
            key,
            timestamp,
            value,
        } => db.append(&key, timestamp, value)?,
        Commands::Values {
            key,
            include_deleted,
        } => {
            for (timestamp, value) in db.values(&key, include_deleted)?.iter() {
                println!("{}\t{}", timestamp, value);
            }
        }
        Commands::Delete { key } => db.delete_record(&key)?,
    }

    db.close()?;
    Ok(())
}

/// Split `key=value`; the value is JSON if it parses, a plain string otherwise
fn parse_meta(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair.split_once('=').ok_or_else(|| {
        TsdbError::Serialization(format!("metadata '{}' is not key=value", pair))
    })?;

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
