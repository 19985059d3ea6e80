use clap::Parser;
use qabot_cli::{init_tracing, Loaded};
use qabot_core::config::expand_path;
use qabot_hybrid::{Index, QueryEngine};

/// Ask one question against a persisted index.
#[derive(Parser, Debug)]
#[command(name = "qabot-ask", version)]
struct Args {
    question: String,
    #[arg(long)]
    top_k: Option<usize>,
    #[arg(long)]
    threshold: Option<f64>,
    /// Index file (defaults to `data.index_path`).
    #[arg(long)]
    index: Option<String>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let loaded = Loaded::from_cwd()?;
    let retrieval = &loaded.settings.retrieval;

    let index_path = args.index.map(expand_path).unwrap_or_else(|| loaded.index_path());
    let index = Index::load(&index_path)
        .map_err(|e| anyhow::anyhow!("failed to load index {}: {} (run qabot-build first)", index_path.display(), e))?;
    let engine = QueryEngine::new(retrieval.weights()?);

    let top_k = args.top_k.unwrap_or(retrieval.top_k);
    let threshold = args.threshold.unwrap_or(retrieval.threshold);
    let hits = engine.retrieve(&index, &args.question, top_k, threshold)?;

    println!("🔍 {}", args.question);
    if hits.is_empty() {
        println!("No confident match (threshold {threshold:.2}).");
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "\n{}. [{:.3}] vector={:.3} fuzzy={:.3}\n   matched: {}\n   canonical: {}\n   answer: {}",
            rank + 1,
            hit.hybrid_score,
            hit.vector_score,
            hit.fuzzy_score,
            hit.variant_text,
            hit.canonical_text,
            hit.answer_text
        );
    }
    Ok(())
}
