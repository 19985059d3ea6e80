use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use qabot_cli::server::{serve, AppState};
use qabot_cli::{init_tracing, load_knowledge, Loaded};
use qabot_core::session::InMemorySessionStore;
use qabot_hybrid::{Index, QueryEngine, SharedIndex};
use qabot_text::Analyzer;

/// Serve the chat API over the persisted index.
#[derive(Parser, Debug)]
#[command(name = "qabot-serve", version)]
struct Args {
    #[arg(long)]
    port: Option<u16>,
    /// Build from the knowledge directory when the persisted index is missing or rejected.
    #[arg(long)]
    rebuild_on_failure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let loaded = Loaded::from_cwd()?;
    let mut server_settings = loaded.settings.server.clone();
    if let Some(port) = args.port {
        server_settings.port = port;
    }

    let shared = Arc::new(SharedIndex::new(QueryEngine::new(loaded.settings.retrieval.weights()?)));
    let index_path = loaded.index_path();
    match Index::load(&index_path) {
        Ok(index) => {
            shared.publish(index);
        }
        Err(e) if args.rebuild_on_failure => {
            warn!(error = %e, "building index from knowledge files");
            let kb = load_knowledge(&loaded.knowledge_dir(), loaded.report_path().as_deref())?;
            let index = Index::from_knowledge(&kb, Analyzer::from_settings(&loaded.settings.vectorizer)?)?;
            shared.publish(index);
        }
        // Keep serving; requests get 503 until an index is published.
        Err(e) => warn!(path = %index_path.display(), error = %e, "no index loaded"),
    }
    info!(ready = shared.is_ready(), "starting server");

    let state = AppState::new(shared, Arc::new(InMemorySessionStore::new()))
        .with_stream_delay(Duration::from_millis(server_settings.stream_delay_ms));
    serve(&server_settings, state).await
}
