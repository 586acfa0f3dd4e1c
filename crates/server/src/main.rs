//! ContractGuard server binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contractguard_core::config::AppConfig;
use contractguard_server::bootstrap::{build_state, load_playbook};
use contractguard_server::create_router;
use contractguard_server::orchestrator::review_text;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_PREFIX: &str = "CONTRACTGUARD_";
const CONFIG_ENV: &str = "CONTRACTGUARD_CONFIG";

/// ContractGuard - contract review against a company playbook
#[derive(Parser, Debug)]
#[command(name = "contractguard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "CONTRACTGUARD_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Review a local text file and print the findings
    Review {
        /// Contract document (UTF-8 text)
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("ContractGuard v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Review { file } => review(config, &file).await,
    }
}

/// Load configuration from an optional TOML file merged with
/// `CONTRACTGUARD_` environment variables.
fn load_config(path: &str) -> Result<AppConfig> {
    let config_path = Path::new(path);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(config_path));
    } else {
        tracing::debug!("No config file found at {}", path);
    }

    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX) && key != CONFIG_ENV);

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: contractguard --config /path/to/config.toml\n  \
             2. Environment variables: CONTRACTGUARD_INFERENCE__TYPE=messages \
             CONTRACTGUARD_INFERENCE__ENDPOINT=https://... contractguard\n\n\
             See config/server.example.toml for example configuration.\n\
             Set CONTRACTGUARD_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
        .extract()
        .context("failed to load configuration")
}

async fn serve(config: AppConfig) -> Result<()> {
    contractguard_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    let state = build_state(config).await?;
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run the review pipeline on a local file, without storage or records.
async fn review(config: AppConfig, file: &Path) -> Result<()> {
    config
        .inference
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid inference configuration")?;

    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let inference = contractguard_inference::from_config(&config.inference)
        .context("failed to initialize inference client")?;
    let playbook = load_playbook(&config.playbook)?;

    tracing::info!(
        file = %file.display(),
        chars = text.chars().count(),
        model = inference.model(),
        "Reviewing document"
    );

    let analysis = review_text(inference.as_ref(), &playbook, &config.analysis, &text)
        .await
        .context("review failed")?;

    println!(
        "Risk score: {}/100 ({} risk)",
        analysis.risk_score,
        analysis.risk_band().as_str()
    );

    println!("\nCritical issues ({}):", analysis.critical_issues.len());
    for issue in &analysis.critical_issues {
        println!("  - {}: {}", issue.clause, issue.issue);
        println!("    suggestion: {}", issue.suggestion);
    }

    println!("\nMedium issues ({}):", analysis.medium_issues.len());
    for issue in &analysis.medium_issues {
        println!("  - {}: {}", issue.clause, issue.issue);
    }

    println!("\nCompliant sections ({}):", analysis.compliant_sections.len());
    for section in &analysis.compliant_sections {
        println!("  - {section}");
    }

    Ok(())
}
