use clap::{Parser, Subcommand};

mod commands;
mod common;
mod log_sink;

#[derive(Parser)]
#[command(name = "brewflow-cli", version, about = "Brewflow CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scale a recipe to user-edited dose or yield
    Scale(commands::scale::ScaleArgs),
    /// Build and print the scaled step plan
    Plan(commands::plan::PlanArgs),
    /// Run a guided brewing session
    Brew(commands::brew::BrewArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Scale(args) => commands::scale::run(args),
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Brew(args) => commands::brew::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
