//! Harvest question/answer pairs from the internship report data module.
//!
//! The report is a JavaScript source file, not JSON, so it is scanned with
//! regular expressions instead of parsed. Each assignment object becomes
//! `"assignment {id} {title} logic" -> logic` and each design pattern
//! becomes `"pattern {name}" -> description`. Objects may be written on one
//! line or spread over several.
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};
use crate::knowledge::KnowledgeBase;
use crate::types::QaPair;

/// A single-quoted JS string literal, allowing backslash escapes.
const JS_STRING: &str = r"'((?:[^'\\]|\\.)*)'";

#[derive(Debug, Clone)]
pub struct ReportImporter {
    assignment: Regex,
    pattern: Regex,
}

impl ReportImporter {
    pub fn new() -> Result<Self> {
        let assignment = format!(r"(?s)\bid:\s*(\d+),\s*title:\s*{JS_STRING}.*?\blogic:\s*{JS_STRING}");
        let pattern = format!(r"(?s)\bname:\s*{JS_STRING}.*?\bdescription:\s*{JS_STRING}");
        Ok(Self { assignment: compile(&assignment)?, pattern: compile(&pattern)? })
    }

    pub fn assignments(&self, source: &str) -> Vec<QaPair> {
        self.assignment
            .captures_iter(source)
            .map(|caps| QaPair::new(assignment_question(&caps[1], &unescape(&caps[2])), unescape(&caps[3])))
            .collect()
    }

    pub fn patterns(&self, source: &str) -> Vec<QaPair> {
        self.pattern
            .captures_iter(source)
            .map(|caps| {
                let name = unescape(&caps[1]).to_lowercase();
                QaPair::new(format!("pattern {}", name.trim()), unescape(&caps[2]))
            })
            .collect()
    }

    /// Assignments first, then patterns, in source order.
    pub fn import(&self, source: &str) -> KnowledgeBase {
        let mut pairs = self.assignments(source);
        let assignments = pairs.len();
        pairs.extend(self.patterns(source));
        info!(assignments, patterns = pairs.len() - assignments, "report pairs harvested");
        KnowledgeBase { pairs, synonyms: Vec::new() }
    }

    pub fn import_file(&self, path: &Path) -> Result<KnowledgeBase> {
        if !path.is_file() {
            return Err(Error::NotFound(format!("report file {}", path.display())));
        }
        let source = fs::read_to_string(path)?;
        Ok(self.import(&source))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidConfig(format!("report pattern: {e}")))
}

/// Titles that already mention "logic" as a word are not suffixed again.
fn assignment_question(id: &str, title: &str) -> String {
    let title = title.trim().to_lowercase();
    let has_logic = title.ends_with(" logic") || title.contains(" logic ") || title.starts_with("logic ");
    if has_logic {
        format!("assignment {id} {title}")
    } else {
        format!("assignment {id} {title} logic")
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
export const assignments = [
  {
    id: 1,
    title: 'Toggle Multi-Section Visibility',
    file: 'ASG_1.jsx',
    logic: 'Maintain keyed boolean flags.',
    code: 'setVisible(prev => ({ ...prev }));'
  },
  { id: 9, title: 'Pagination Logic', file: 'ASG_9.jsx', logic: 'Slice by page.', code: '' },
  { id: 12, title: 'Quotes', file: 'ASG_12.jsx', logic: 'Show the author\'s quote.', code: 'if(t===\'x\') return;' }
];

export const patterns = [
  {
    name: 'Fisher–Yates Shuffle',
    description: 'Uniform random permutation.',
    snippet: 'swap()'
  }
];
"#;

    #[test]
    fn assignments_in_both_layouts_get_logic_questions() {
        let importer = ReportImporter::new().unwrap();
        assert_eq!(
            importer.assignments(SAMPLE),
            vec![
                QaPair::new("assignment 1 toggle multi-section visibility logic", "Maintain keyed boolean flags."),
                QaPair::new("assignment 9 pagination logic", "Slice by page."),
                QaPair::new("assignment 12 quotes logic", "Show the author's quote."),
            ]
        );
    }

    #[test]
    fn patterns_are_keyed_by_lowercased_name() {
        let importer = ReportImporter::new().unwrap();
        assert_eq!(
            importer.patterns(SAMPLE),
            vec![QaPair::new("pattern fisher–yates shuffle", "Uniform random permutation.")]
        );
    }

    #[test]
    fn logic_suffix_is_not_doubled() {
        assert_eq!(assignment_question("4", "Logic Gates"), "assignment 4 logic gates");
        assert_eq!(assignment_question("5", "Game Logic Core"), "assignment 5 game logic core");
        assert_eq!(assignment_question("6", "Logical Steps"), "assignment 6 logical steps logic");
    }

    #[test]
    fn missing_report_is_not_found() {
        let err = ReportImporter::new().unwrap().import_file(Path::new("/nonexistent/report.js")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
