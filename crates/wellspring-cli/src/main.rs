use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wellspring-cli", version, about = "Wellspring CLI")]
struct Cli {
    /// User the command operates on.
    #[arg(long, global = true, default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Guided-session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Mood logging
    Mood {
        #[command(subcommand)]
        action: commands::mood::MoodAction,
    },
    /// Habit logging
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Journal entries
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Streak and weekly-goal statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Composite wellbeing insights
    Insights,
    /// List built-in exercise presets
    Exercises,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Watch collections for out-of-band changes
    Watch {
        /// Poll interval in seconds (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
        /// Poll a single time and exit
        #[arg(long)]
        once: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate for
        shell: clap_complete::Shell,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action, &cli.user),
        Commands::Mood { action } => commands::mood::run(action, &cli.user),
        Commands::Habit { action } => commands::habit::run(action, &cli.user),
        Commands::Journal { action } => commands::journal::run(action, &cli.user),
        Commands::Stats { action } => commands::stats::run(action, &cli.user),
        Commands::Insights => commands::insights::run(&cli.user),
        Commands::Exercises => commands::exercises::run(),
        Commands::Config { action } => commands::config::run(action, &cli.user),
        Commands::Watch { interval, once } => commands::watch::run(&cli.user, interval, once),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
