use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use est::config::Config;
use est::handler::HandlerRegistry;
use est::logging;
use est::{ApplyOutcome, Processor};

#[derive(Parser)]
#[command(name = "est")]
#[command(about = "Apply environment specific settings from a CSV settings table")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (defaults to ./est.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Target {
    /// Environment column to apply (falls back to EST_ENVIRONMENT)
    #[arg(long = "env")]
    environment: Option<String>,

    /// Settings CSV file (falls back to EST_SETTINGS_FILE)
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all settings of an environment and print the results
    Apply {
        #[command(flatten)]
        target: Target,
    },
    /// Print the value configured for one handler and parameter combination
    Value {
        handler: String,
        param1: String,
        #[arg(default_value = "")]
        param2: String,
        #[arg(default_value = "")]
        param3: String,
        #[command(flatten)]
        target: Target,
    },
    /// List the available handler types
    Handlers,
}

fn processor_for(config: &Config, target: Target) -> anyhow::Result<Processor> {
    let run = config.resolve(target.environment, target.settings);
    Processor::new(&run.environment, &run.settings_file).with_context(|| {
        format!(
            "Cannot set up environment \"{}\" from '{}'",
            run.environment,
            run.settings_file.display()
        )
    })
}

fn run(cli: Cli, config: &Config) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Apply { target } => {
            let mut processor = processor_for(config, target)?;
            let outcome = processor.apply().context("Applying settings failed")?;
            processor.print_results(&mut io::stdout().lock())?;

            match outcome {
                ApplyOutcome::Completed { applied } => {
                    info!("Applied {} handlers", applied);
                    Ok(ExitCode::SUCCESS)
                }
                ApplyOutcome::Aborted { applied, failed } => {
                    error!("Stopped after {} handlers, \"{}\" failed", applied, failed);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Value {
            handler,
            param1,
            param2,
            param3,
            target,
        } => {
            let mut processor = processor_for(config, target)?;
            let found = processor.handler(&handler, &param1, &param2, &param3)?;
            println!("{}", found.value());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Handlers => {
            for type_name in HandlerRegistry::with_builtin().list_types() {
                println!("{}", type_name);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Loading configuration failed")?;
    let _guard = logging::init_logging(&config.logging);

    run(cli, &config)
}
