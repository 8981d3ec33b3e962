// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-tikzdraw-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tikzdraw and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! tikzdraw entrypoint.
//!
//! Serves the diagram form on `http://<host>:<port>/` (default `0.0.0.0:5000`). See
//! `tikzdraw --help` for the flags and their environment variables.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tikzdraw::completion::OpenAiClient;
use tikzdraw::config::{load_env_file, ServerConfig, DEFAULT_ENV_FILE};
use tikzdraw::generate::DiagramGenerator;
use tikzdraw::render::{spawn_sweeper, RenderPipeline};
use tikzdraw::server::{router, AppState};

const DEFAULT_LOG_FILTER: &str = "tikzdraw=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn Error>> {
    let openai = config.openai_settings();
    if openai.api_key.is_none() {
        tracing::warn!("API_KEY is not set; submissions will fail until it is configured");
    }
    let client = OpenAiClient::new(openai)?;
    tracing::info!(
        model = %client.settings().model,
        api_base = %client.settings().api_base,
        "completion client ready"
    );

    let pipeline = RenderPipeline::new(config.render_settings());
    tokio::fs::create_dir_all(pipeline.upload_dir()).await?;
    let sweeper = spawn_sweeper(pipeline.upload_dir().to_path_buf(), config.retention());

    let generator = DiagramGenerator::new(Arc::new(client), pipeline, config.max_tokens);
    let app = router(AppState::new(generator)?);

    let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, upload_dir = ?config.upload_dir, "listening");

    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    served?;
    Ok(())
}

fn main() {
    if let Err(err) = load_env_file(Path::new(DEFAULT_ENV_FILE)) {
        eprintln!("tikzdraw: ignoring {DEFAULT_ENV_FILE}: {err}");
    }
    let config = ServerConfig::parse();
    init_tracing();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        runtime.block_on(serve(config))
    })();

    if let Err(err) = result {
        eprintln!("tikzdraw: {err}");
        std::process::exit(1);
    }
}
