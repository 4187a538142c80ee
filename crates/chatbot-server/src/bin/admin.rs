//! Crypto Chatbot Admin CLI
//!
//! Scheduled and maintenance jobs: the weekly newsletter and refreshing the
//! coin/NFT reference lists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_chat::{ChatbotConfig, ReferenceData, Services};

#[derive(Parser)]
#[command(name = "chatbot-admin", version, about = "Crypto chatbot maintenance jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Weekly newsletter
    Newsletter {
        #[command(subcommand)]
        action: NewsletterAction,
    },
    /// Download the CoinGecko coin and NFT lists
    FetchReference {
        /// Directory receiving coins.json and nft.json
        #[arg(long, default_value = "data")]
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum NewsletterAction {
    /// Send the digest to every subscriber
    Send,
    /// Render a sample newsletter to a file without sending
    Preview {
        #[arg(long, default_value = "newsletter_preview.html")]
        out: PathBuf,
        #[arg(long, value_delimiter = ',', default_value = "bitcoin,ethereum,nft-art")]
        topics: Vec<String>,
        #[arg(long, default_value = "Test User")]
        name: String,
    },
}

fn load_reference(config: &ChatbotConfig) -> anyhow::Result<Arc<ReferenceData>> {
    Ok(Arc::new(ReferenceData::load(&config.coins_file, &config.nfts_file)?))
}

async fn send_newsletter(config: &ChatbotConfig) -> anyhow::Result<()> {
    let mut missing = Vec::new();
    if config.newsletter.brevo.api_key.is_none() {
        missing.push("BREVO_API_KEY");
    }
    if config.cryptopanic.api_key.is_none() {
        missing.push("CRYPTOPANIC_API_KEY");
    }
    if !missing.is_empty() && !config.offline {
        bail!("Missing environment variables: {}", missing.join(", "));
    }

    let services = Services::from_config(config, load_reference(config)?)?;
    let report = services.newsletter_job()?.run().await?;
    tracing::info!(
        sent = report.sent,
        failed = report.failed,
        total = report.total,
        "✅ Newsletter job completed"
    );
    Ok(())
}

async fn preview_newsletter(config: &ChatbotConfig, out: &Path, topics: &[String], name: &str) -> anyhow::Result<()> {
    let services = Services::from_config(config, load_reference(config)?)?;
    let html = services.newsletter_job()?.preview(name, topics).await?;
    std::fs::write(out, html).with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(topics = topics.len(), "📁 Preview saved to {}", out.display());
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

async fn fetch_reference(config: &ChatbotConfig, dir: &Path) -> anyhow::Result<()> {
    // The lists being fetched are the reference data, so start without any
    let services = Services::from_config(config, Arc::new(ReferenceData::default()))?;
    let coins = services.market.coins_list().await?;
    let nfts = services.market.nfts_list().await?;

    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    write_json(&dir.join("coins.json"), &coins)?;
    write_json(&dir.join("nft.json"), &nfts)?;
    tracing::info!(coins = coins.len(), nfts = nfts.len(), "Reference lists written to {}", dir.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = ChatbotConfig::from_env();

    match Cli::parse().command {
        Command::Newsletter {
            action: NewsletterAction::Send,
        } => send_newsletter(&config).await,
        Command::Newsletter {
            action: NewsletterAction::Preview { out, topics, name },
        } => preview_newsletter(&config, &out, &topics, &name).await,
        Command::FetchReference { dir } => fetch_reference(&config, &dir).await,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_preview_topics_split() {
        let cli = Cli::parse_from(["chatbot-admin", "newsletter", "preview", "--topics", "defi,mining"]);
        let Command::Newsletter {
            action: NewsletterAction::Preview { topics, out, .. },
        } = cli.command
        else {
            panic!("expected preview");
        };
        assert_eq!(topics, vec!["defi", "mining"]);
        assert_eq!(out, PathBuf::from("newsletter_preview.html"));
    }
}
