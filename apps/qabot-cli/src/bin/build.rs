use std::path::PathBuf;

use clap::Parser;
use qabot_cli::{init_tracing, load_knowledge, Loaded};
use qabot_core::config::expand_path;
use qabot_hybrid::Index;
use qabot_text::Analyzer;

/// Build the retrieval index from knowledge files and write it to disk.
#[derive(Parser, Debug)]
#[command(name = "qabot-build", version)]
struct Args {
    /// Directory of knowledge `*.json` files (defaults to `data.knowledge_dir`).
    knowledge_dir: Option<String>,
    /// Output path (defaults to `data.index_path`).
    #[arg(long, short)]
    out: Option<String>,
    /// Report data module to harvest (defaults to `data.report_path`).
    #[arg(long)]
    report: Option<String>,
    /// Skip report harvesting even when one is configured.
    #[arg(long, conflicts_with = "report")]
    no_report: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let loaded = Loaded::from_cwd()?;

    let knowledge_dir: PathBuf = args.knowledge_dir.map(expand_path).unwrap_or_else(|| loaded.knowledge_dir());
    let out: PathBuf = args.out.map(expand_path).unwrap_or_else(|| loaded.index_path());
    let report: Option<PathBuf> = match (args.no_report, args.report) {
        (true, _) => None,
        (false, Some(path)) => Some(expand_path(path)),
        (false, None) => loaded.report_path(),
    };

    println!("qabot index builder\n===================");
    println!("Knowledge directory: {}", knowledge_dir.display());
    if let Some(report) = &report {
        println!("Report data: {}", report.display());
    }

    let kb = load_knowledge(&knowledge_dir, report.as_deref())?;
    let analyzer = Analyzer::from_settings(&loaded.settings.vectorizer)?;
    let index = Index::from_knowledge(&kb, analyzer)?;
    index.save(&out)?;

    println!("\n✅ Index written to {}", out.display());
    println!("📊 {} raw pairs, {} synonym rules", kb.pairs.len(), kb.synonyms.len());
    println!("📊 {} corpus entries, {} vocabulary terms", index.len(), index.model().vocabulary().len());
    println!("\n💡 To query it, use: cargo run --bin qabot-ask '<question>'");
    Ok(())
}
