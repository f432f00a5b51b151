use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "habitgrid-cli", version, about = "Habitgrid CLI")]
struct Cli {
    /// Acting user id (defaults to the HABITGRID_USER environment variable)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calendar management
    Calendar {
        #[command(subcommand)]
        action: commands::calendar::CalendarAction,
    },
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Completion tracking
    Completion {
        #[command(subcommand)]
        action: commands::completion::CompletionAction,
    },
    /// Export the full calendar graph as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import a previously exported JSON snapshot
    Import {
        /// Snapshot file to merge into the store
        file: PathBuf,
    },
    /// Completion statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Client view preferences
    Pref {
        #[command(subcommand)]
        action: commands::pref::PrefAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() {
    logging::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Calendar { action } => commands::calendar::run(action, cli.user),
        Commands::Habit { action } => commands::habit::run(action, cli.user),
        Commands::Completion { action } => commands::completion::run(action, cli.user),
        Commands::Export { out } => commands::snapshot::run_export(out, cli.user),
        Commands::Import { file } => commands::snapshot::run_import(&file, cli.user),
        Commands::Stats { action } => commands::stats::run(action, cli.user),
        Commands::Config { action } => commands::config::run(action),
        Commands::Pref { action } => commands::pref::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "habitgrid-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
