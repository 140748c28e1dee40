use anyhow::Context;
use pdfeditor::{EngineConfig, LopdfEngine, PdfEditor, Workspace};
use pdfeditor_api::{app, Config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pdfeditor=info,pdfeditor_api=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Invalid server configuration")?;

    let engine = LopdfEngine::initialize(&EngineConfig {
        native_lib_path: config.pdfium_lib_path.clone(),
    })
    .context("Failed to initialize the PDF engine")?;
    let workspace = Workspace::new(&config.upload_dir, &config.output_dir)
        .context("Failed to prepare upload and output directories")?;
    info!(
        "Staging uploads in {} and writing outputs to {}",
        workspace.staging_dir().display(),
        workspace.output_dir().display()
    );

    let editor = PdfEditor::new(Arc::new(engine), workspace);
    let app = app(editor, &config);

    let address = config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!("pdfeditor API listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("pdfeditor API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
