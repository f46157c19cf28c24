//! Point d'entrée CLI pour pvdesign

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

use pvdesign::config::Config;
use pvdesign::store::JsonStore;

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Calepinage de segments photovoltaïques
#[derive(Parser)]
#[command(name = "pvdesign")]
#[command(author, version)]
#[command(about = "Lay out PV modules on field segments and export the results")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Data directory (default: env PVDESIGN_DATA_DIR / ./data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config preset (residential/utility) or path to a JSON config (default: env PVDESIGN_CONFIG)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = Config::resolve(cli.config.as_deref())?;
    let store = JsonStore::from_env(cli.data_dir);
    debug!(data_dir = %store.root().display(), "Using data directory");

    match cli.command {
        Commands::Layout {
            project,
            report,
            force,
        } => cli::cmd_layout(&store, &config, &project, report.as_deref(), force)?,
        Commands::Export {
            project,
            output,
            precision,
        } => cli::cmd_export(&store, &config, &project, &output, precision)?,
        Commands::ImportPan { files } => cli::cmd_import_pan(&store, &files)?,
        Commands::NewSegment(args) => {
            let id = cli::cmd_new_segment(&store, &config, &args)?;
            println!("Created segment {}", id);
        }
        Commands::EditSegment(args) => cli::cmd_edit_segment(&store, &config, &args)?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
