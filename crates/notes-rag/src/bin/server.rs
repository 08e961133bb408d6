//! RAG Server binary
//!
//! Run with: cargo run -p notes-rag --bin notes-rag-server [config.toml]

use notes_rag::{
    config::{RagConfig, CONFIG_PATH_ENV},
    server::RagServer,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be set
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notes_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                      Notes RAG System                     ║
║        Answers grounded in your PDFs and text notes       ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    if let Some(path) = &config_path {
        tracing::info!("  - Config file: {}", path.display());
    }
    tracing::info!(
        "  - Embeddings: {:?} {}",
        config.embeddings.provider,
        config.embeddings.model
    );
    tracing::info!("  - LLM: {:?} {}", config.llm.provider, config.llm.model);
    tracing::info!(
        "  - Vector store: {:?} {} (collection '{}')",
        config.vector_db.backend,
        config.vector_db.url,
        config.vector_db.collection
    );
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    // Create and start server
    let server = RagServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /documents - Upload a PDF or text file");
    println!("  POST /query     - Ask a question");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
