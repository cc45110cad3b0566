mod commands;
mod config;
mod notice;
mod prompt;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use commands::ConnectionsApp;
use config::Settings;
use nocdc_core::{DefinitionCatalog, TemplateStore};

type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "nocdc", version, about = "Manage database connection profiles")]
struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Connections file (defaults to connections.ini in the user config directory)
    #[arg(long, global = true, env = "NOCDC_CONNECTIONS")]
    pub connections: Option<PathBuf>,
    /// Directory holding definitions.json and templates/ to use instead of the bundled catalog
    #[arg(long, global = true, env = "NOCDC_CATALOG_DIR")]
    pub catalog_dir: Option<PathBuf>,
    /// Seconds to wait for a test connection
    #[arg(long, global = true, env = "NOCDC_CONNECT_TIMEOUT")]
    pub timeout: Option<u64>,
    /// Command used to install missing drivers; the package name is appended
    #[arg(long, global = true, env = "NOCDC_INSTALLER")]
    pub installer: Option<String>,
    /// Log filter, e.g. `debug` or `nocdc_db=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Connection fields; anything left out keeps its stored value (or stays empty for new profiles).
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Database type, by display name or key (e.g. "Microsoft SQL Server", "postgresql")
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub database: Option<String>,
    /// Only kept for types that support a schema
    #[arg(long)]
    pub schema: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported database types
    Types,
    /// Show the example values for a database type
    Template {
        #[arg(value_name = "TYPE")]
        kind: String,
    },
    /// List saved connections
    List {
        /// Only show connections whose id, type, host or database contain this text
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show one connection
    Show {
        id: String,
        /// Print the password instead of masking it
        #[arg(long)]
        reveal: bool,
    },
    /// Create a connection
    Add {
        /// Id to use instead of the next connection_N
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change a saved connection
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a saved connection
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Test a saved connection, or the fields given on the command line
    Test {
        id: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
        /// Install missing drivers without asking
        #[arg(long, short)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.globals.log_level.as_deref());
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("nocdc failed: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::resolve(&cli.globals)?;
    let (catalog, templates) = load_catalog(&settings)?;
    let app = ConnectionsApp::new(settings, catalog, templates);

    let outcome = match cli.command {
        Command::Types => app.types(),
        Command::Template { kind } => app.template(&kind),
        Command::List { search } => app.list(search.as_deref()),
        Command::Show { id, reveal } => app.show(&id, reveal),
        Command::Add { id, fields } => app.add(id, &fields),
        Command::Edit { id, fields } => app.edit(&id, &fields),
        Command::Delete { id, yes } => app.delete(&id, yes),
        Command::Test { id, fields, yes } => app.test(id.as_deref(), &fields, yes),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            notice::show(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_catalog(settings: &Settings) -> Result<(DefinitionCatalog, TemplateStore)> {
    match &settings.catalog_dir {
        Some(dir) => {
            let catalog = DefinitionCatalog::load(dir)
                .with_context(|| format!("Failed to load type definitions from {}", dir.display()))?;
            let templates = TemplateStore::load(dir)
                .with_context(|| format!("Failed to load field templates from {}", dir.display()))?;
            Ok((catalog, templates))
        }
        None => {
            let catalog =
                DefinitionCatalog::bundled().context("Bundled type definitions are invalid")?;
            let templates =
                TemplateStore::bundled().context("Bundled field templates are invalid")?;
            Ok((catalog, templates))
        }
    }
}

fn init_tracing(level: Option<&str>) {
    use std::sync::OnceLock;
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let filter = level
            .and_then(|level| tracing_subscriber::EnvFilter::try_new(level).ok())
            .or_else(|| tracing_subscriber::EnvFilter::try_from_default_env().ok())
            .unwrap_or_else(|| tracing_subscriber::EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
