//! verity-sim: replay claim scenarios through the consensus engine.

mod scenario;

use anyhow::Context;
use clap::Parser;
use scenario::Scenario;
use std::path::PathBuf;
use verity_consensus::{ConsensusEngine, EngineConfig};
use verity_utils::LogFormat;

#[derive(Parser)]
#[command(name = "verity-sim", about = "Verity claim consensus simulator")]
struct Cli {
    /// Path to a TOML engine configuration. Flags and env vars override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VERITY_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, env = "VERITY_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario and print resolution records and participant
    /// summaries as JSON.
    Run {
        /// Scenario file.
        scenario: PathBuf,
    },
    /// Print the effective protocol parameters as TOML.
    Params,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    verity_utils::init_tracing(&config.logging)?;

    match cli.command {
        Command::Run { scenario } => {
            let scenario = Scenario::from_file(&scenario)?;
            let engine = ConsensusEngine::from_config(&config)?;
            tracing::info!(
                participants = scenario.participants.len(),
                claims = scenario.claims.len(),
                steps = scenario.steps.len(),
                "replaying scenario"
            );
            let report = scenario.run(&engine)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Params => {
            print!("{}", toml::to_string_pretty(&config.params)?);
        }
    }
    Ok(())
}
