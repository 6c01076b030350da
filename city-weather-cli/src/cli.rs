use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use city_weather_core::{Config, WeatherError, WeatherSession, provider_from_config};
use inquire::{Password, PasswordDisplayMode};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather by city")]
pub struct Cli {
    /// Print request and response diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store an OpenWeather API key.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Paris, FR".
        city: String,

        /// API key to use instead of the configured one.
        #[arg(long)]
        api_key: Option<String>,

        /// Print the raw record as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, api_key, json } => show(&city, api_key, json).await,
        }
    }
}

fn configure() -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Create one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_owned());
    let path = config.save()?;

    println!("Saved API key to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

async fn show(city: &str, api_key: Option<String>, json: bool) -> anyhow::Result<ExitCode> {
    let mut config = Config::load_with_env()?;
    if let Some(key) = api_key {
        config.set_api_key(key);
    }

    let provider = provider_from_config(&config)?;
    let session = WeatherSession::new(Arc::new(provider));

    match session.fetch(city).await {
        Ok(record) if json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&record).context("Failed to serialize record")?
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(record) => {
            print!("{}", render::record(&record));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", render::error(&err));
            Ok(exit_code(&err))
        }
    }
}

/// Input rejected before any request is a usage error (2); anything the
/// network or the API reported is a plain failure (1).
fn exit_code(err: &WeatherError) -> ExitCode {
    if err.is_client_side() { ExitCode::from(2) } else { ExitCode::FAILURE }
}
