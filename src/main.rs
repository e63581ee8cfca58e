use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod db;
mod models;
mod planner;
mod session;
mod store;

use commands::{ConfigCommand, PlanCommand, RecipeCommand, ShoppingCommand};
use config::Config;
use db::{init_db, RecipeRepository};
use session::{Session, User};

#[derive(Parser)]
#[command(name = "plateful")]
#[command(version)]
#[command(about = "Recipe box and weekly meal planner", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage recipes
    Recipe(RecipeCommand),

    /// Manage the weekly meal plan
    Plan(PlanCommand),

    /// Manage the shopping cart
    Shopping(ShoppingCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Recipe(cmd)) => {
            let pool = init_db(&config.database_path).await?;
            let repo = RecipeRepository::new(pool);
            cmd.run(&repo, &config).await?;
        }
        Some(Commands::Plan(cmd)) => {
            let pool = init_db(&config.database_path).await?;
            let session = local_session(&config);
            cmd.run(&pool, &session).await?;
        }
        Some(Commands::Shopping(cmd)) => {
            let pool = init_db(&config.database_path).await?;
            let session = local_session(&config);
            cmd.run(&pool, &session).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// The CLI runs signed in as the profile from config.
fn local_session(config: &Config) -> Session {
    Session::with_user(User::with_id(config.user_id, config.user_name.clone()))
}
