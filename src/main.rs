// src/main.rs

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};
use versionlock::catalog::{Catalog, CatalogSnapshot, MemoryCatalog, SqliteCatalog};
use versionlock::commands::{self, Command};
use versionlock::config::Config;
use versionlock::exclusion;

const DEFAULT_CATALOG: &str = "/var/lib/versionlock/catalog.db";

#[derive(Parser)]
#[command(name = "versionlock")]
#[command(author, version, about = "Control package version locks", long_about = None)]
struct Cli {
    /// Configuration file (default: /etc/versionlock/versionlock.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Lock list path or URL, overrides the configuration
    #[arg(short, long, global = true)]
    locklist: Option<String>,

    /// Catalog database path
    #[arg(long, global = true, default_value = DEFAULT_CATALOG)]
    catalog: String,

    /// Also hold back packages obsoleting a locked one
    #[arg(long, global = true)]
    follow_obsoletes: bool,

    /// Do not log how many updates are held back
    #[arg(long, global = true)]
    no_hint: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lock packages to their installed (or else available) version
    Add {
        /// Package wildcards
        patterns: Vec<String>,
    },
    /// Exclude the newest available version of packages
    #[command(aliases = ["add-!", "add!", "blacklist"])]
    Exclude {
        /// Package wildcards
        patterns: Vec<String>,
    },
    /// List the lock list entries
    List,
    /// Show updates held back by the locks
    Status,
    /// Delete matching entries
    #[command(alias = "del")]
    Delete {
        /// Package wildcards
        patterns: Vec<String>,
    },
    /// Remove every entry
    Clear,
    /// Print the exclusion sets as JSON
    Excludes,
    /// Load a JSON catalog snapshot into the catalog database
    ImportCatalog {
        /// Snapshot file
        snapshot: PathBuf,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Any other word is a package wildcard to lock
    #[command(external_subcommand)]
    External(Vec<String>),
}

impl Cli {
    /// Configuration file merged with command line overrides
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(locklist) = &self.locklist {
            config.locklist = locklist.clone();
        }
        if self.follow_obsoletes {
            config.follow_obsoletes = true;
        }
        if self.no_hint {
            config.show_hint = false;
        }
        debug!("Using configuration: {:?}", config);
        Ok(config)
    }
}

/// Open the catalog database, or an empty catalog when the command never
/// looks at packages
fn open_catalog(path: &str, needed: bool) -> Result<Box<dyn Catalog>> {
    if !needed {
        return Ok(Box::new(MemoryCatalog::new()));
    }
    let catalog = SqliteCatalog::open(path)
        .with_context(|| format!("Failed to open catalog database {}", path))?;
    Ok(Box::new(catalog))
}

fn run_command(cli: &Cli, command: Command) -> Result<()> {
    let config = cli.load_config()?;
    let needs_catalog = matches!(
        command,
        Command::Add(_) | Command::Exclude(_) | Command::Status
    );
    let catalog = open_catalog(&cli.catalog, needs_catalog)?;

    let outcome = commands::run(&command, &config, catalog.as_ref())?;
    for line in &outcome.details {
        println!("{}", line);
    }
    println!("{}", outcome.summary);
    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        None | Some(Commands::List) => run_command(&cli, Command::List),
        Some(Commands::Add { patterns }) => run_command(&cli, Command::Add(patterns.clone())),
        Some(Commands::External(words)) => run_command(&cli, Command::Add(words.clone())),
        Some(Commands::Exclude { patterns }) => {
            run_command(&cli, Command::Exclude(patterns.clone()))
        }
        Some(Commands::Status) => run_command(&cli, Command::Status),
        Some(Commands::Delete { patterns }) => {
            run_command(&cli, Command::Delete(patterns.clone()))
        }
        Some(Commands::Clear) => run_command(&cli, Command::Clear),
        Some(Commands::Excludes) => {
            let config = cli.load_config()?;
            let catalog = open_catalog(&cli.catalog, config.follow_obsoletes || config.show_hint)?;
            let projection = exclusion::prepare_exclusions(&config, catalog.as_ref())?;
            println!("{}", projection.to_json()?);
            Ok(())
        }
        Some(Commands::ImportCatalog { snapshot }) => {
            info!("Importing catalog snapshot {}", snapshot.display());
            let json = std::fs::read_to_string(snapshot)
                .with_context(|| format!("Failed to read {}", snapshot.display()))?;
            let snapshot = CatalogSnapshot::from_json(&json)?;
            let mut catalog = SqliteCatalog::create(&cli.catalog)?;
            let stats = catalog.import(&snapshot)?;
            println!(
                "Catalog imported: {} installed, {} available, {} obsoletes",
                stats.installed, stats.available, stats.obsoletes
            );
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(*shell, &mut Cli::command(), "versionlock", &mut io::stdout());
            Ok(())
        }
    }
}
