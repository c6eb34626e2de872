mod backend_bridge;
mod config;
mod controller;
mod render;
mod shell;

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{Collaborators, ConnectivityProbe, DataUrlEncoder, GeminiDescriptionService};
use crossbeam_channel::bounded;
use storage::Storage;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::config::Settings;
use crate::controller::{events::UiEvent, reducer::AppState};
use crate::shell::Shell;

/// Construction-site issue and delivery tracker.
#[derive(Parser, Debug)]
struct Args {
    /// TOML settings file; defaults to ./field_app.toml or the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read shell commands from a file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Tracing filter used when RUST_LOG is unset.
    #[arg(long)]
    log_filter: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(args.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(args.log_filter.as_deref().unwrap_or(&settings.log_filter))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let collaborators = build_collaborators(&settings)?;
    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let worker = runtime::launch(
        cmd_rx,
        ui_tx,
        collaborators,
        Duration::from_secs(settings.connectivity_interval_secs),
    );

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path).with_context(|| {
            format!("failed to open script '{}'", path.display())
        })?)),
        None => Box::new(io::stdin().lock()),
    };

    let mut shell = Shell::new(AppState::new(Storage::seeded()), &cmd_tx, &ui_rx);
    let outcome = shell.run(input, io::stdout().lock());

    drop(shell);
    drop(cmd_tx);
    if worker.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    outcome
}

fn build_collaborators(settings: &Settings) -> Result<Collaborators> {
    let endpoint = Url::parse(&settings.description_endpoint).with_context(|| {
        format!(
            "invalid description endpoint '{}'",
            settings.description_endpoint
        )
    })?;
    if settings.api_key.is_none() {
        tracing::info!("no API key configured; automatic descriptions disabled");
    }

    let connectivity = match &settings.connectivity_probe_url {
        Some(raw) => {
            let url = Url::parse(raw)
                .with_context(|| format!("invalid connectivity probe url '{raw}'"))?;
            Some(ConnectivityProbe::new(
                url,
                Duration::from_secs(settings.connectivity_timeout_secs),
            )?)
        }
        None => None,
    };

    Ok(Collaborators {
        descriptions: Arc::new(GeminiDescriptionService::new(
            endpoint,
            settings.description_model.clone(),
            settings.api_key.clone(),
        )),
        images: Arc::new(DataUrlEncoder::default()),
        connectivity,
    })
}
