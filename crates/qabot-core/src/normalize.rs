//! Text normalization applied to stored questions and incoming queries alike.

/// Bumped whenever `normalize` changes output for any input. Persisted
/// indexes record it and refuse to load under a different value.
pub const NORMALIZER_VERSION: u32 = 1;

/// Lower-case, drop everything except ASCII letters, digits and whitespace,
/// then collapse whitespace runs to single spaces and trim.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
