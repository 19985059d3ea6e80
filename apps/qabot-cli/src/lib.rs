//! qabot-cli
//!
//! Shared plumbing for the `qabot-build`, `qabot-ask` and `qabot-serve`
//! binaries: tracing setup, settings discovery and the HTTP router.
pub mod server;

use std::env;
use std::path::{Path, PathBuf};

use qabot_core::config::{resolve_with_base, Config, Settings};
use qabot_core::{KnowledgeBase, ReportImporter};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Settings loaded from the working directory, plus that directory as the
/// base for relative data paths.
pub struct Loaded {
    pub settings: Settings,
    pub base_dir: PathBuf,
}

impl Loaded {
    pub fn from_cwd() -> anyhow::Result<Self> {
        let base_dir = env::current_dir()?;
        Self::from_dir(&base_dir)
    }

    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load_from(dir).map_err(|e| anyhow::anyhow!("Error loading config: {}", e))?;
        Ok(Self { settings: config.settings()?, base_dir: dir.to_path_buf() })
    }

    pub fn knowledge_dir(&self) -> PathBuf {
        resolve_with_base(&self.base_dir, &self.settings.data.knowledge_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        resolve_with_base(&self.base_dir, &self.settings.data.index_path)
    }

    pub fn report_path(&self) -> Option<PathBuf> {
        self.settings.data.report_path.as_ref().map(|p| resolve_with_base(&self.base_dir, p))
    }
}

/// Knowledge files from `dir`, followed by the pairs harvested from `report`
/// when one is given.
pub fn load_knowledge(dir: &Path, report: Option<&Path>) -> anyhow::Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::load_dir(dir)?;
    if let Some(report) = report {
        kb.extend(ReportImporter::new()?.import_file(report)?);
    }
    Ok(kb)
}
