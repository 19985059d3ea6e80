use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::types::{QaPair, SynonymRule};

/// Raw pairs plus synonym rules, the input of an index build.
///
/// On disk this is a JSON document:
/// `{ "pairs": [{"question": .., "answer": ..}], "synonyms": [{"pattern": .., "aliases": [..]}] }`.
/// Both keys are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub pairs: Vec<QaPair>,
    #[serde(default)]
    pub synonyms: Vec<SynonymRule>,
}

impl KnowledgeBase {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    /// Load and concatenate every `*.json` file under `dir`, in sorted path
    /// order so repeated builds see the same input sequence.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("knowledge directory {}", dir.display())));
        }
        let files = list_json_files(dir);
        let mut kb = Self::default();
        for file in &files {
            let part = Self::load_file(file)?;
            info!(
                file = %file.display(),
                pairs = part.pairs.len(),
                synonyms = part.synonyms.len(),
                "loaded knowledge file"
            );
            kb.extend(part);
        }
        Ok(kb)
    }

    pub fn extend(&mut self, other: KnowledgeBase) {
        self.pairs.extend(other.pairs);
        self.synonyms.extend(other.synonyms);
    }
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut json_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    json_files.sort();
    json_files
}
