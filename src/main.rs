use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use external_contributions::{Config, ExportError, Exporter, GitHubClient};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "external-contributions")]
#[command(about = "Export pull requests opened by non-members of a GitHub organization")]
struct Cli {
    /// Path to config file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GitHub access token with read access to org membership and search
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Organization to report on (override config)
    #[arg(long)]
    org: Option<String>,

    /// First day of the creation window, inclusive (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the creation window, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Output file (override config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the export to stdout instead of writing the file
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("external_contributions=info".parse()?);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json)?;

    let mut config = Config::load(cli.config)?;

    if let Some(org) = cli.org {
        config.query.organization = org;
    }
    if let Some(from) = cli.from {
        config.query.created_from = from;
    }
    if let Some(to) = cli.to {
        config.query.created_to = to;
    }
    if let Some(output) = cli.output {
        config.output.path = output;
    }

    let token = cli
        .token
        .or(config.github.token.clone())
        .context("No GitHub token: pass --token, set GITHUB_TOKEN or github.token in config")?;

    info!(
        "Exporting external pull requests for {} created {}..{}",
        config.query.organization, config.query.created_from, config.query.created_to
    );

    let client = GitHubClient::new(&config.github, &token)?;
    let exporter = Exporter::new(client, config.query, config.output)?;

    if cli.dry_run {
        let collection = exporter.collect().await?;
        let bytes = exporter.render(&collection.records)?;
        std::io::stdout()
            .write_all(&bytes)
            .context("Failed to write export to stdout")?;
        info!("Dry run - {} records not written", collection.records.len());
        return Ok(());
    }

    match exporter.generate().await {
        Ok(summary) => {
            info!(
                "Done: {} members, {} pull requests, {} external -> {}",
                summary.members,
                summary.pull_requests,
                summary.external,
                summary.output_path.display()
            );
            Ok(())
        }
        Err(e @ ExportError::Write { .. }) => {
            error!("Data was fetched but the export could not be saved: {}", e);
            Err(e.into())
        }
        Err(e) if e.is_upstream() => {
            error!("GitHub request failed, nothing written: {}", e);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
