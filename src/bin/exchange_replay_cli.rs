// ABOUTME: Command-line entry point for driving a replay or clearing the cache from a shell
// ABOUTME: Thin wiring over the library surface — no logic lives here beyond argument plumbing
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use clap::{Parser, Subcommand};
use exchange_replay::{clear_cache, replay, Filter, ReplayConfig};
use exchange_replay::logging::{self, LogFormat, LoggingConfig};
use exchange_replay::validation::ReplayOptions;
use futures_util::StreamExt;

#[derive(Parser)]
#[command(name = "exchange-replay-cli", about = "Drive the market-data replay engine from a shell")]
struct Cli {
    /// Base endpoint for the replay service; defaults to `EXCHANGE_REPLAY_ENDPOINT` or the built-in default.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: CliLogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, clap::ValueEnum)]
enum CliLogFormat {
    Pretty,
    Compact,
    Json,
}

impl From<CliLogFormat> for LogFormat {
    fn from(value: CliLogFormat) -> Self {
        match value {
            CliLogFormat::Pretty => Self::Pretty,
            CliLogFormat::Compact => Self::Compact,
            CliLogFormat::Json => Self::Json,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Replay a historical range and print each record as it arrives.
    Replay {
        #[arg(long)]
        exchange: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Channel to replay, may be repeated.
        #[arg(long = "channel")]
        channels: Vec<String>,
        #[arg(long)]
        skip_decoding: bool,
        #[arg(long)]
        return_disconnects: bool,
    },
    /// Recursively delete the on-disk slice cache.
    ClearCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&LoggingConfig {
        format: cli.log_format.into(),
        ..LoggingConfig::default()
    });

    let mut config = ReplayConfig::from_env();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    match cli.command {
        Command::ClearCache => {
            clear_cache(&config).await;
            println!("cache cleared: {}", config.cache_dir.display());
        }
        Command::Replay {
            exchange,
            from,
            to,
            channels,
            skip_decoding,
            return_disconnects,
        } => {
            let filters = channels.into_iter().map(|channel| Filter::new(channel, None)).collect();
            let options = ReplayOptions {
                exchange,
                from,
                to,
                filters,
                skip_decoding,
                return_disconnects_as_undefined: return_disconnects,
            };

            let stream = replay(config, options)?;
            tokio::pin!(stream);
            while let Some(message) = stream.next().await {
                match message {
                    Ok(record) => println!("{record:?}"),
                    Err(err) => {
                        eprintln!("replay failed: {err}");
                        std::process::exit(1);
                    }
                }
            }
        }
    }

    Ok(())
}
