//! Startup wiring: build every collaborator once and hand them to [`AppState`].

use crate::state::AppState;
use anyhow::{Context, Result};
use contractguard_core::Playbook;
use contractguard_core::config::{AppConfig, PlaybookConfig};

/// Load the configured playbook, or the built-in one when no path is set.
pub fn load_playbook(config: &PlaybookConfig) -> Result<Playbook> {
    let playbook = match &config.path {
        Some(path) => Playbook::load(path)
            .with_context(|| format!("failed to load playbook from {}", path.display()))?,
        None => Playbook::builtin().context("built-in playbook is invalid")?,
    };

    tracing::info!(
        rules = playbook.len(),
        source = config
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "Playbook loaded"
    );
    Ok(playbook)
}

/// Validate the configuration and construct the application state.
///
/// Storage and the record store are checked for connectivity before the
/// state is returned, so a misconfigured server fails at startup instead of
/// on the first request.
pub async fn build_state(config: AppConfig) -> Result<AppState> {
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    let storage = contractguard_storage::from_config(&config.storage, &config.server.public_base_url)
        .await
        .context("failed to initialize storage")?;
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = storage.backend_name(), "Storage backend connectivity verified");

    let upload_signer = contractguard_storage::upload_signer(&config.storage)
        .context("failed to initialize upload signer")?;

    let records = contractguard_records::from_config(&config.records)
        .await
        .context("failed to initialize record store")?;
    records
        .health_check()
        .await
        .context("record store health check failed")?;
    tracing::info!("Record store initialized");

    let inference = contractguard_inference::from_config(&config.inference)
        .context("failed to initialize inference client")?;
    tracing::info!(
        backend = inference.backend_name(),
        model = inference.model(),
        "Inference client initialized"
    );

    let playbook = load_playbook(&config.playbook)?;

    Ok(AppState::new(
        config,
        storage,
        records,
        inference,
        playbook,
        upload_signer,
    ))
}
