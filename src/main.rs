//! `sealed-session` - Encrypted session tokens from the command line.
//!
//! Copyright (C) 2026 Maverick
//! SPDX-License-Identifier: AGPL-3.0-only
//!
//! Loads configuration, sets up logging, and generates keys or encodes and
//! decodes tokens by hand (for API clients configured with a fixed token).

use std::io::Read;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sealed_session::{SessionConfig, decode, encode, generate_secret};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sealed-session")]
#[command(about = "Generate keys and encode or decode encrypted session tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print random secrets suitable for SESSION_KEYS
    Keygen {
        /// Number of secrets to generate
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },
    /// Encode a JSON value into a token (reads stdin when --json is absent)
    Encode {
        #[arg(long)]
        json: Option<String>,
    },
    /// Decode a token and print its JSON payload
    Decode { token: String },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking);

    if log_format.eq_ignore_ascii_case("pretty") {
        subscriber.init();
    } else {
        subscriber.json().init();
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Keygen { count } => {
            for _ in 0..count {
                println!("{}", generate_secret());
            }
        }
        Command::Encode { json } => {
            let config = load_config()?;
            let input = match json {
                Some(json) => json,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read stdin")?;
                    buf
                }
            };
            let value: Value = serde_json::from_str(&input).context("input is not valid JSON")?;
            println!("{}", encode(&value, &config)?);
        }
        Command::Decode { token } => {
            let config = load_config()?;
            let value: Value = decode(token.trim(), &config)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn load_config() -> anyhow::Result<std::sync::Arc<SessionConfig>> {
    let config = SessionConfig::from_env().context("failed to load session configuration")?;
    info!(
        keys = config.keys.len(),
        cookie = %config.cookie.name,
        ttl_secs = config.ttl_secs(),
        "Session configuration loaded"
    );
    Ok(config)
}
