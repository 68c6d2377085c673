use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "emotionary", version, about = "E-Motionary diary CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Google Calendar authentication
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Song diary entries
    Song {
        #[command(subcommand)]
        action: commands::song::SongAction,
    },
    /// Photo diary entries
    Photo {
        #[command(subcommand)]
        action: commands::photo::PhotoAction,
    },
    /// Show the merged local + calendar timeline
    Timeline,
    /// History management
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Network calls in the core block on the ambient tokio runtime.
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let _guard = runtime.enter();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Song { action } => commands::song::run(action),
        Commands::Photo { action } => commands::photo::run(action),
        Commands::Timeline => commands::timeline::run(),
        Commands::History { action } => commands::history::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
