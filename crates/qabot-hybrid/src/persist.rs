//! On-disk form of an [`Index`].
//!
//! The file is a JSON envelope carrying a format tag, the normalizer and
//! weighting versions the index was built with, a BLAKE3 checksum, and the
//! payload: analyzer parameters, sorted vocabulary, idf, sparse rows and the
//! corpus. The checksum covers the exact payload bytes as written. Loading
//! checks everything before handing out an index and fails closed.
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use qabot_core::normalize::NORMALIZER_VERSION;
use qabot_core::{normalize, Corpus, Entry, Error, Result};
use qabot_text::Analyzer;
use qabot_vector::{SparseRow, VectorSpaceModel, WEIGHTING_VERSION};

use crate::index::Index;

pub const FORMAT_TAG: &str = "qabot-index";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<P> {
    format: String,
    format_version: u32,
    normalizer_version: u32,
    weighting_version: u32,
    checksum: String,
    payload: P,
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    variant_text: String,
    canonical_text: String,
    answer_text: String,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    analyzer: Analyzer,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    rows: Vec<SparseRow>,
    corpus: Vec<StoredEntry>,
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedPersistedIndex(msg.into())
}

fn checksum(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

impl Index {
    /// Serialize to the envelope format. Identical indexes produce identical bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = Payload {
            analyzer: self.model().analyzer().clone(),
            vocabulary: self.model().vocabulary().to_vec(),
            idf: self.model().idf().to_vec(),
            rows: self.model().rows().to_vec(),
            corpus: self
                .corpus()
                .iter()
                .map(|e| StoredEntry {
                    variant_text: e.variant_text.clone(),
                    canonical_text: e.canonical_text.clone(),
                    answer_text: e.answer_text.clone(),
                })
                .collect(),
        };
        let payload_json = serde_json::to_string(&payload)?;
        let envelope = Envelope {
            format: FORMAT_TAG.to_string(),
            format_version: FORMAT_VERSION,
            normalizer_version: NORMALIZER_VERSION,
            weighting_version: WEIGHTING_VERSION,
            checksum: checksum(payload_json.as_bytes()),
            payload: RawValue::from_string(payload_json)?,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: Envelope<Box<RawValue>> =
            serde_json::from_slice(bytes).map_err(|e| malformed(format!("unreadable envelope: {e}")))?;
        if envelope.format != FORMAT_TAG {
            return Err(malformed(format!("unexpected format tag '{}'", envelope.format)));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(malformed(format!(
                "format version {} (expected {})",
                envelope.format_version, FORMAT_VERSION
            )));
        }
        if envelope.normalizer_version != NORMALIZER_VERSION {
            return Err(malformed(format!(
                "normalizer version {} (expected {})",
                envelope.normalizer_version, NORMALIZER_VERSION
            )));
        }
        if envelope.weighting_version != WEIGHTING_VERSION {
            return Err(malformed(format!(
                "weighting version {} (expected {})",
                envelope.weighting_version, WEIGHTING_VERSION
            )));
        }
        let raw = envelope.payload.get();
        if checksum(raw.as_bytes()) != envelope.checksum {
            return Err(malformed("checksum mismatch"));
        }

        let payload: Payload = serde_json::from_str(raw).map_err(|e| malformed(format!("unreadable payload: {e}")))?;
        let model = VectorSpaceModel::from_parts(payload.analyzer, payload.vocabulary, payload.idf, payload.rows)?;
        let corpus = Corpus::from_entries(
            payload
                .corpus
                .into_iter()
                .map(|e| Entry {
                    normalized_text: normalize(&e.variant_text),
                    variant_text: e.variant_text,
                    canonical_text: e.canonical_text,
                    answer_text: e.answer_text,
                })
                .collect(),
        );
        Index::from_parts(corpus, model)
    }

    /// Write atomically: a sibling temp file is renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = self.to_bytes()?;
        let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, path)?;
        info!(path = %path.display(), bytes = bytes.len(), entries = self.len(), "index saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        match Self::from_bytes(&bytes) {
            Ok(index) => {
                info!(
                    path = %path.display(),
                    entries = index.len(),
                    vocabulary = index.model().vocabulary().len(),
                    "index loaded"
                );
                Ok(index)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "rejected persisted index");
                Err(e)
            }
        }
    }
}
