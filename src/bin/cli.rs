//! hashdbm CLI
//!
//! Command-line interface for inspecting and editing a hashdbm store.

use std::process;

use clap::{Parser, Subcommand};
use hashdbm::{Config, Dbm, LockBehavior, OpenMode, StoreMode, StoreStatus};
use tracing_subscriber::{fmt, EnvFilter};

/// hashdbm CLI
#[derive(Parser, Debug)]
#[command(name = "hashdbm-cli")]
#[command(about = "CLI for hashdbm key-value stores")]
#[command(version)]
struct Args {
    /// Store base name (files are <DB>.dir and <DB>.pag)
    #[arg(short, long, default_value = "./hashdbm")]
    db: String,

    /// Fail instead of waiting when another process holds the store
    #[arg(long)]
    no_wait: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Store a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Overwrite an existing value
        #[arg(short, long)]
        replace: bool,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List every key
    Keys,

    /// Print every pair as key<TAB>value
    Dump,

    /// Show store statistics
    Stat,
}

impl Commands {
    fn mode(&self) -> OpenMode {
        match self {
            Commands::Put { .. } | Commands::Del { .. } => OpenMode::Create,
            _ => OpenMode::ReadOnly,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,hashdbm=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let lock = if args.no_wait {
        LockBehavior::Fail
    } else {
        LockBehavior::Block
    };
    let config = Config::builder()
        .path(&args.db)
        .mode(args.command.mode())
        .lock(lock)
        .build();

    let mut db = match Dbm::open(config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open store {}: {}", args.db, e);
            process::exit(1);
        }
    };

    let code = match run(&mut db, args.command) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            1
        }
    };

    if let Err(e) = db.close() {
        tracing::error!("Failed to close store: {}", e);
        process::exit(1);
    }

    process::exit(code);
}

/// Exit status when a key is absent or an insert finds it present
const EXIT_MISS: i32 = 2;

/// Run one command, returning the process exit status
fn run(db: &mut Dbm, command: Commands) -> hashdbm::Result<i32> {
    match command {
        Commands::Get { key } => match db.fetch(key.as_bytes())? {
            Some(value) => println!("{}", String::from_utf8_lossy(value)),
            None => {
                eprintln!("(not found)");
                return Ok(EXIT_MISS);
            }
        },
        Commands::Put {
            key,
            value,
            replace,
        } => {
            let mode = if replace {
                StoreMode::Replace
            } else {
                StoreMode::Insert
            };
            if db.store(key.as_bytes(), value.as_bytes(), mode)? == StoreStatus::Exists {
                eprintln!("key exists (use --replace to overwrite)");
                return Ok(EXIT_MISS);
            }
        }
        Commands::Del { key } => {
            if !db.delete(key.as_bytes())? {
                eprintln!("(not found)");
                return Ok(EXIT_MISS);
            }
        }
        Commands::Keys => {
            for key in db.keys() {
                println!("{}", String::from_utf8_lossy(&key?));
            }
        }
        Commands::Dump => {
            let keys = db.keys().collect::<hashdbm::Result<Vec<_>>>()?;
            for key in keys {
                if let Some(value) = db.fetch(&key)? {
                    println!(
                        "{}\t{}",
                        String::from_utf8_lossy(&key),
                        String::from_utf8_lossy(value)
                    );
                }
            }
        }
        Commands::Stat => {
            let pairs = db.keys().try_fold(0u64, |n, key| key.map(|_| n + 1))?;
            println!("pairs:          {}", pairs);
            println!("pages:          {}", db.page_count()?);
            println!("directory bits: {}", db.directory_bits_set()?);
            println!("open mode:      {:?}", db.config().mode);
            println!("lock:           {:?}", db.config().lock);
            println!("version:        {}", hashdbm::VERSION);
        }
    }

    Ok(0)
}
