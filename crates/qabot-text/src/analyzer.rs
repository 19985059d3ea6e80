use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use qabot_core::config::VectorizerSettings;
use qabot_core::{Error, Result};

/// Default English stop words, dropped before n-grams are formed.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "amoungst",
    "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere",
    "are", "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "bill", "both", "bottom", "but", "by", "call", "can", "cannot", "cant", "co", "con",
    "could", "couldnt", "cry", "de", "describe", "detail", "do", "done", "down", "due", "during",
    "each", "eg", "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
    "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen", "fifty",
    "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty", "found", "four",
    "from", "front", "full", "further", "get", "give", "go", "had", "has", "hasnt", "have", "he",
    "hence", "her", "here", "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him",
    "himself", "his", "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed",
    "interest", "into", "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least",
    "less", "ltd", "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more",
    "moreover", "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely",
    "neither", "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor",
    "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed", "seeming",
    "seems", "serious", "several", "she", "should", "show", "side", "since", "sincere", "six",
    "sixty", "so", "some", "somehow", "someone", "something", "sometime", "sometimes", "somewhere",
    "still", "such", "system", "take", "ten", "than", "that", "the", "their", "them", "themselves",
    "then", "thence", "there", "thereafter", "thereby", "therefore", "therein", "thereupon", "these",
    "they", "thick", "thin", "third", "this", "those", "though", "three", "through", "throughout",
    "thru", "thus", "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two",
    "un", "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein",
    "whereupon", "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Turns normalized text into vector-space terms: whitespace tokens, short
/// tokens and stop words removed, then contiguous n-grams `1..=max_ngram`
/// joined with a single space.
///
/// Serializable because a persisted model must project queries with the
/// exact analyzer it was fit with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    stop_words: BTreeSet<String>,
    min_token_len: usize,
    max_ngram: usize,
}

impl Analyzer {
    pub fn new<I, S>(stop_words: I, min_token_len: usize, max_ngram: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let analyzer = Self {
            stop_words: stop_words.into_iter().map(|s| s.into().to_lowercase()).collect(),
            min_token_len,
            max_ngram,
        };
        analyzer.validate()?;
        Ok(analyzer)
    }

    pub fn english() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().map(|s| (*s).to_string()).collect(),
            min_token_len: 2,
            max_ngram: 2,
        }
    }

    pub fn from_settings(settings: &VectorizerSettings) -> Result<Self> {
        match &settings.stop_words {
            Some(words) => Self::new(words.iter().cloned(), settings.min_token_len, settings.max_ngram),
            None => Self::new(ENGLISH_STOP_WORDS.iter().copied(), settings.min_token_len, settings.max_ngram),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_token_len == 0 {
            return Err(Error::InvalidConfig("min_token_len must be at least 1".to_string()));
        }
        if self.max_ngram == 0 {
            return Err(Error::InvalidConfig("max_ngram must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn min_token_len(&self) -> usize {
        self.min_token_len
    }

    pub fn max_ngram(&self) -> usize {
        self.max_ngram
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Tokens that survive length and stop-word filtering, in text order.
    pub fn tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_whitespace()
            .filter(|t| t.chars().count() >= self.min_token_len)
            .filter(|t| !self.is_stop_word(t))
            .collect()
    }

    /// All n-gram terms of `text`, with repeats (term frequency is the count).
    pub fn terms(&self, text: &str) -> Vec<String> {
        let tokens = self.tokens(text);
        let mut terms = Vec::new();
        for n in 1..=self.max_ngram.min(tokens.len()) {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::english()
    }
}
