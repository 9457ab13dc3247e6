use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tasktally_core::storage::LoggingConfig;
use tasktally_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "tasktally", version, about = "Tasktally: categorized to-dos with daily streaks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Streaks, today's progress and the weekly heatmap
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Log to stderr so stdout stays parseable. `RUST_LOG` wins over the
/// configured filter. Never creates the config file.
fn init_tracing() {
    let (configured, load_error) = match Config::read() {
        Ok(cfg) => (cfg.unwrap_or_default().logging.filter, None),
        Err(e) => (LoggingConfig::default().filter, Some(e)),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&configured).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    if let Some(e) = load_error {
        tracing::warn!(error = %e, "falling back to default log filter");
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tasktally", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error[{}]: {e}", e.code());
        std::process::exit(1);
    }
}
