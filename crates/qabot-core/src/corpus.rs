//! Corpus construction: deduplication and synonym augmentation of raw pairs.
//!
//! Every raw question is normalized and keyed by `(normalized question,
//! trimmed answer)`. Entries keep the answer exactly as authored.
//! The first occurrence of a key becomes the canonical entry of its group;
//! each matching synonym rule then contributes one variant per alias, all
//! pointing back at that canonical phrasing. A single seen-set covers both
//! steps, so augmentation never re-emits a pair that already exists.
use regex::{NoExpand, Regex};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::types::{Corpus, Entry, QaPair, SynonymRule};

#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Regex,
    aliases: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CorpusBuilder {
    rules: Vec<CompiledRule>,
}

impl CorpusBuilder {
    /// Compile synonym rules. Alias phrases are normalized up front so that
    /// substituted variants stay in normalized form.
    pub fn new(rules: &[SynonymRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let pattern = Regex::new(&rule.pattern).map_err(|e| {
                    Error::InvalidConfig(format!("synonym pattern '{}': {}", rule.pattern, e))
                })?;
                let aliases = rule.aliases.iter().map(|a| normalize(a)).collect();
                Ok(CompiledRule { pattern, aliases })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn build(&self, pairs: &[QaPair]) -> Corpus {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for pair in pairs {
            let base_text = normalize(&pair.question);
            // answers are stored as given; only the key ignores padding
            let answer_key = pair.answer.trim().to_string();
            if !seen.insert((base_text.clone(), answer_key.clone())) {
                skipped += 1;
                continue;
            }
            entries.push(Entry {
                variant_text: base_text.clone(),
                canonical_text: base_text.clone(),
                answer_text: pair.answer.clone(),
                normalized_text: base_text.clone(),
            });

            for rule in &self.rules {
                if !rule.pattern.is_match(&base_text) {
                    continue;
                }
                let mut added = 0usize;
                for alias in &rule.aliases {
                    let replaced = rule.pattern.replace_all(&base_text, NoExpand(alias.as_str()));
                    let aug_text = normalize(&replaced);
                    if !seen.insert((aug_text.clone(), answer_key.clone())) {
                        continue;
                    }
                    entries.push(Entry {
                        variant_text: aug_text.clone(),
                        canonical_text: base_text.clone(),
                        answer_text: pair.answer.clone(),
                        normalized_text: aug_text,
                    });
                    added += 1;
                }
                debug!(pattern = %rule.pattern, base = %base_text, added, "synonym rule applied");
            }
        }

        info!(
            pairs = pairs.len(),
            duplicates = skipped,
            entries = entries.len(),
            "corpus built"
        );
        Corpus::from_entries(entries)
    }
}
