//! Token-set fuzzy similarity.
//!
//! `ratio` is the indel-normalized similarity `2 * LCS / (len_a + len_b)`
//! scaled to 0..=100. `token_set_ratio` builds, for each side, the sorted
//! token intersection followed by that side's remaining tokens. It compares
//! the bare intersection with each of those two strings, then the two
//! strings with each other, and keeps the best score. A side whose tokens
//! are a subset of the other's therefore scores 100.
use std::collections::BTreeSet;

/// Length of the longest common subsequence of two char sequences.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(curr[j]) };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Edit-distance based similarity of two strings in `0..=100`.
/// Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = 200.0 * lcs_len(&a, &b) as f64 / total as f64;
    score
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

/// Token-set similarity in `0..=100`. Zero when either side has no tokens.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let sect = tokens_a.intersection(&tokens_b).copied().collect::<Vec<_>>().join(" ");
    let only_a = tokens_a.difference(&tokens_b).copied().collect::<Vec<_>>().join(" ");
    let only_b = tokens_b.difference(&tokens_a).copied().collect::<Vec<_>>().join(" ");
    let combined_a = join_nonempty(&sect, &only_a);
    let combined_b = join_nonempty(&sect, &only_b);

    let mut best = ratio(&combined_a, &combined_b);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &combined_a)).max(ratio(&sect, &combined_b));
    }
    best
}

/// `token_set_ratio` scaled to `[0, 1]`.
pub fn token_set_similarity(a: &str, b: &str) -> f64 {
    (token_set_ratio(a, b) / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ratio_of_identical_and_disjoint_strings() {
        assert!(close(ratio("socket", "socket"), 100.0));
        assert!(close(ratio("abc", "xyz"), 0.0));
        assert!(close(ratio("", ""), 100.0));
        assert!(close(ratio("abc", ""), 0.0));
    }

    #[test]
    fn ratio_counts_common_subsequence() {
        // lcs("kitten", "sitting") = "ittn" (4), 2*4/13
        assert!(close(ratio("kitten", "sitting"), 800.0 / 13.0));
    }

    #[test]
    fn token_order_does_not_matter() {
        assert!(close(token_set_ratio("name company", "company name"), 100.0));
    }

    #[test]
    fn subset_scores_full_marks() {
        assert!(close(token_set_ratio("company", "what is the company name"), 100.0));
    }

    #[test]
    fn partial_overlap_uses_best_comparison() {
        // sect = "organization" (12), combined_b = "organization name" (17)
        let score = token_set_ratio("what organization did you intern at", "organization name");
        assert!(close(score, 2400.0 / 29.0), "score={score}");
    }

    #[test]
    fn shared_tokens_prefix_both_sides_in_the_whole_comparison() {
        // "x ab" vs "x ac" scores 75, the remainders "ab" vs "ac" only 50
        let score = token_set_ratio("ab x", "x ac");
        assert!(close(score, 75.0), "score={score}");
        assert!(score > ratio("ab", "ac"));
    }

    #[test]
    fn disjoint_token_sets_fall_back_to_remainders() {
        let score = token_set_ratio("abc", "abd");
        assert!(close(score, ratio("abc", "abd")));
    }

    #[test]
    fn empty_side_scores_zero() {
        assert!(close(token_set_ratio("", "company"), 0.0));
        assert!(close(token_set_similarity("company", "   "), 0.0));
    }

    #[test]
    fn similarity_is_in_unit_interval() {
        let s = token_set_similarity("face detection", "facial detection challenge");
        assert!((0.0..=1.0).contains(&s));
    }
}
