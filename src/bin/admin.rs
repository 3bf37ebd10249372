//! CLI administration tool for linkmint.
//!
//! Talks to the Redis store directly, so it works while the server is down
//! and sees exactly what every server process sees.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL that expires in one hour
//! cargo run --bin admin -- shorten https://example.com/a --ttl 3600
//!
//! # Resolve a code (counts a hit)
//! cargo run --bin admin -- resolve b7K9pL
//!
//! # Show a record without counting a hit
//! cargo run --bin admin -- inspect b7K9pL
//!
//! # Reclaim expired records now
//! cargo run --bin admin -- sweep
//!
//! # Check the Redis connection
//! cargo run --bin admin -- check
//! ```
//!
//! # Environment Variables
//!
//! - `REDIS_URL` or `REDIS_HOST` (required): Redis connection
//! - Engine settings as for the server (see `linkmint::config`)

use linkmint::application::Engine;
use linkmint::config::{self, Config, mask_connection_string};
use linkmint::domain::clock::SystemClock;
use linkmint::domain::entities::{Record, Ttl};
use linkmint::infrastructure::persistence::RedisStore;
use linkmint::utils::url_normalizer::normalize_url;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing linkmint.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a short code for a URL
    Shorten {
        /// The long URL
        url: String,

        /// Lifetime in seconds, or "never" (default: server default TTL)
        #[arg(long)]
        ttl: Option<String>,
    },
    /// Resolve a code to its URL (counts a hit)
    Resolve {
        /// The short code
        code: String,
    },
    /// Show a record without counting a hit
    Inspect {
        /// The short code
        code: String,
    },
    /// Run one expiration sweep now
    Sweep {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Check the Redis connection
    Check,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let redis_url = config
        .redis_url
        .clone()
        .context("REDIS_URL or REDIS_HOST must be set")?;

    let store = Arc::new(
        RedisStore::connect(
            &redis_url,
            config.redis_key_prefix.clone(),
            config.engine.expired_grace,
        )
        .with_context(|| format!("Failed to connect to {}", mask_connection_string(&redis_url)))?,
    );

    if let Commands::Check = cli.command {
        return handle_check(&config, &redis_url);
    }

    let engine = Engine::new(
        &config.engine,
        store.clone(),
        store,
        Arc::new(SystemClock),
    )
    .context("Failed to build engine")?;

    match cli.command {
        Commands::Shorten { url, ttl } => handle_shorten(&engine, &config, &url, ttl)?,
        Commands::Resolve { code } => handle_resolve(&engine, &code)?,
        Commands::Inspect { code } => handle_inspect(&engine, &config, &code)?,
        Commands::Sweep { yes } => handle_sweep(&engine, yes)?,
        Commands::Check => {}
    }

    Ok(())
}

/// Creates a short link through the engine.
fn handle_shorten(engine: &Engine, config: &Config, url: &str, ttl: Option<String>) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let long_url = normalize_url(url).context("Invalid URL")?;

    let ttl = match ttl.as_deref() {
        None => None,
        Some(raw) if raw.eq_ignore_ascii_case("never") => Some(Ttl::Never),
        Some(raw) => Some(Ttl::from_secs(
            raw.parse()
                .with_context(|| format!("--ttl expects seconds or 'never', got '{raw}'"))?,
        )),
    };

    let record = engine
        .shortener
        .create(&long_url, ttl)
        .map_err(|e| anyhow::anyhow!("Failed to shorten: {}", e))?;

    println!("{}", "✅ Short link ready".green().bold());
    println!();
    print_record(&record, config);

    Ok(())
}

/// Resolves a code the same way a redirect does.
fn handle_resolve(engine: &Engine, code: &str) -> Result<()> {
    match engine.shortener.resolve(code) {
        Ok(long_url) => {
            println!("  {} → {}", code.cyan(), long_url.bright_white());
            Ok(())
        }
        Err(linkmint::ShortenerError::CodeNotFound(_)) => {
            println!("{}", format!("❌ {code} not found").red());
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to resolve: {}", e)),
    }
}

/// Shows an active record.
fn handle_inspect(engine: &Engine, config: &Config, code: &str) -> Result<()> {
    match engine.shortener.inspect(code) {
        Ok(record) => {
            print_record(&record, config);
            Ok(())
        }
        Err(linkmint::ShortenerError::CodeNotFound(_)) => {
            println!("{}", format!("❌ {code} not found").red());
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to inspect: {}", e)),
    }
}

/// Runs one sweep pass after confirmation.
///
/// # Safety
///
/// - Requires confirmation (default: No) unless `--yes`
/// - Reclaimed codes may be issued again
fn handle_sweep(engine: &Engine, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Expiration Sweep".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Permanently delete expired records?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let report = engine
        .expiration
        .sweep()
        .map_err(|e| anyhow::anyhow!("Sweep failed: {}", e))?;

    println!(
        "  Examined:  {}",
        report.examined.to_string().bright_white().bold()
    );
    println!(
        "  Expired:   {}",
        report.expired.to_string().bright_white().bold()
    );
    println!(
        "  Reclaimed: {}",
        report.reclaimed.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Checks Redis connectivity.
fn handle_check(config: &Config, redis_url: &str) -> Result<()> {
    println!("{}", "🔍 Checking Redis connection...".bright_blue());
    println!("  URL:    {}", mask_connection_string(redis_url).bright_black());
    println!("  Prefix: {}", config.redis_key_prefix.bright_black());
    println!("{}", "✅ Redis connection OK".green().bold());

    Ok(())
}

fn print_record(record: &Record, config: &Config) {
    let short_url = format!(
        "{}/{}",
        config.base_url.trim_end_matches('/'),
        record.code
    );
    let expires = record
        .expiry
        .timestamp()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!("  Code:      {}", record.code.as_str().bright_yellow().bold());
    println!("  Short URL: {}", short_url.cyan());
    println!("  Long URL:  {}", record.long_url.bright_white());
    println!(
        "  Created:   {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );
    println!("  Expires:   {}", expires.bright_black());
    println!("  Status:    {}", record.status.as_str().green());
    println!("  Hits:      {}", record.hits.to_string().bright_white());
    println!();
}
