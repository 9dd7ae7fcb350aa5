use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doctrans_server::cache::{
    export_entries_to_json, import_corrections_from_json, CacheLifecycleManager,
};
use doctrans_server::cache_store::{SqliteTranslationStore, TranslationStore};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Maintenance tool for the translation cache databases.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the cache database files. Defaults to the
    /// per-user cache directory.
    #[clap(long)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a fresh cache database and prints its path.
    New {
        /// Remove all existing cache databases first.
        #[clap(long)]
        purge: bool,
    },

    /// Removes every cache database (and WAL side files) in the cache
    /// directory. Foreign files are left untouched.
    Purge,

    /// Exports all entries of a cache database to a JSON file for review.
    Export {
        /// Path of the cache database to export.
        db: PathBuf,
        /// Path of the JSON file to write.
        output: PathBuf,
    },

    /// Imports corrected translations from a JSON file back into a cache
    /// database. Records with unknown ids are skipped and counted.
    Import {
        /// Path of the cache database to update.
        db: PathBuf,
        /// Path of the JSON file to read.
        input: PathBuf,
    },

    /// Shows summary information about a cache database.
    Show {
        /// Path of the cache database to inspect.
        db: PathBuf,
    },
}

fn lifecycle_manager(cache_dir: Option<PathBuf>) -> Result<CacheLifecycleManager> {
    match cache_dir {
        Some(dir) => Ok(CacheLifecycleManager::new(dir)),
        None => {
            let dir = CacheLifecycleManager::default_cache_dir()
                .context("Could not determine the default cache directory")?;
            Ok(CacheLifecycleManager::new(dir))
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    match cli_args.command {
        Command::New { purge } => {
            let manager = lifecycle_manager(cli_args.cache_dir)?;
            let (path, _store) = manager.create_new(purge)?;
            manager.close_active();
            println!("{}", path.display());
        }
        Command::Purge => {
            let manager = lifecycle_manager(cli_args.cache_dir)?;
            let removed = manager.purge_all()?;
            println!("Removed {} cache database(s)", removed);
        }
        Command::Export { db, output } => {
            let store = SqliteTranslationStore::open(&db)?;
            let exported = export_entries_to_json(&store, &output)?;
            println!("Exported {} entries to {}", exported, output.display());
        }
        Command::Import { db, input } => {
            let store = SqliteTranslationStore::open(&db)?;
            let stats = import_corrections_from_json(&store, &input)?;
            println!(
                "Applied {} correction(s), skipped {} unknown id(s)",
                stats.applied, stats.skipped
            );
        }
        Command::Show { db } => {
            let store = SqliteTranslationStore::open(&db)?;
            println!("Database: {}", db.display());
            println!("Entries:  {}", store.entry_count()?);
            for entry in store.dump_entries()?.iter().take(10) {
                println!(
                    "  [{}] {} ({}): {:?} -> {:?}",
                    entry.id, entry.engine, entry.engine_params, entry.source_text, entry.translation
                );
            }
        }
    }

    Ok(())
}
