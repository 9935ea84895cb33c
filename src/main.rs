//! Text Annotator
//!
//! Loads a plain-text document, fetches its labels and annotations from the
//! annotation store and prints the highlighted rendering as HTML.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use text_annotator::config::Config;
use text_annotator::error::ConfigError;
use text_annotator::render::MarkupConfig;
use text_annotator::{AnnotationSession, Document, HttpStore, SessionSettings, Viewer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "text_annotator=debug".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    tracing::info!("Starting Text Annotator v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Annotation store: {}", config.store.base_url);

    let path = config
        .document
        .path
        .clone()
        .ok_or(ConfigError::Missing("ANNOTATOR_DOCUMENT_PATH"))?;
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read document {}", path))?;
    let document = Document::new(config.document.id, content);

    let store = Arc::new(HttpStore::new(&config.store));
    let session = AnnotationSession::load(
        document,
        store,
        Viewer::from(&config),
        SessionSettings::from(&config),
    )
    .await
    .context("Failed to load annotations")?;

    let stats = session.stats();
    tracing::info!(
        "{} annotations, {} labels in use, {:.1}% coverage",
        stats.annotation_count,
        stats.label_count,
        stats.coverage_percent
    );

    println!("{}", session.markup(&MarkupConfig::default()));
    Ok(())
}
