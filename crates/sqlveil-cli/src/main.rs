//! sqlveil command line: anonymize and de-anonymize SQL against a persistent
//! mapping store.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sqlveil::{compact_qualified, Anonymizer, ANONYMIZABLE};

mod sqlfile;
mod store;

use store::MappingStore;

#[derive(Parser, Debug)]
#[command(name = "sqlveil", version, about = "Anonymize SQL queries with a reversible mapping store")]
struct Cli {
    /// Mapping file path (default: ~/.sqlveil/mappings.json)
    #[arg(short = 'm', long, global = true)]
    mapping_file: Option<PathBuf>,

    /// Do not write the mapping file back after commands that change it
    #[arg(long, global = true)]
    no_auto_save: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Anonymize a query given inline or read from a SQL file
    Anonymize {
        /// The query text; omit when using --file
        query: Option<String>,

        /// Read the query from this file instead (`--` comment lines are
        /// stripped)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore the original text of a previously anonymized query
    Deanonymize { query: String },

    /// Print the mapping store contents
    ShowMappings,

    /// Reset the mapping store
    ClearMappings,

    /// Write the mapping store to a JSON file
    ExportMappings { path: PathBuf },

    /// Replace the mapping store with the contents of a JSON file
    ImportMappings { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut store = MappingStore::open(cli.mapping_file.clone())?;

    match cli.cmd {
        Command::Anonymize { query, file, output } => {
            let sql = match (query, file) {
                (Some(q), None) => q,
                (None, Some(path)) => sqlfile::read_sql_file(&path)?,
                (Some(_), Some(_)) => bail!("pass a query or --file, not both"),
                (None, None) => bail!("nothing to anonymize: pass a query or --file"),
            };

            let mut anonymizer = Anonymizer::with_state(store.take());
            let canonical = anonymizer.canonicalize(&sql);
            let outcome = anonymizer.anonymize(&canonical)?;
            let rendered = compact_qualified(&outcome.text);
            store.put(anonymizer.into_state());

            match output {
                Some(path) => fs::write(&path, rendered.as_bytes())
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{rendered}"),
            }

            if outcome.new_mappings > 0 && !cli.no_auto_save {
                store.save()?;
            }
        }

        Command::Deanonymize { query } => {
            let anonymizer = Anonymizer::with_state(store.take());
            println!("{}", anonymizer.de_anonymize(&query));
        }

        Command::ShowMappings => show_mappings(&store)?,

        Command::ClearMappings => {
            store.state_mut().clear();
            if !cli.no_auto_save {
                store.save()?;
            }
            println!("mapping store cleared");
        }

        Command::ExportMappings { path } => {
            let bytes = sqlveil::save_mappings(store.state())?;
            fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
            println!("exported mappings to {}", path.display());
        }

        Command::ImportMappings { path } => {
            let bytes =
                fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let state = sqlveil::load_mappings(&bytes)
                .with_context(|| format!("importing {}", path.display()))?;
            store.put(state);
            if !cli.no_auto_save {
                store.save()?;
            }
            println!("imported mappings from {}", path.display());
        }
    }

    Ok(())
}

fn show_mappings(store: &MappingStore) -> Result<()> {
    let state = store.state();
    if state.is_empty() {
        println!("mapping store is empty");
        return Ok(());
    }
    for category in ANONYMIZABLE {
        let entries = state.entries(category)?;
        println!("{:?}: {} entries", category, entries.len());
        for (placeholder, original) in entries {
            println!("  {placeholder} -> {original}");
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
