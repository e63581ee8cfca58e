use clap::{Args, Subcommand};

use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Print the default config file path
    Path,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show => {
                println!("database_path: {}", config.database_path.display());
                println!("user_name: {}", config.user_name);
                println!("user_id: {}", config.user_id);
                Ok(())
            }
            ConfigSubcommand::Path => {
                println!("{}", Config::default_config_path().display());
                Ok(())
            }
        }
    }
}
