use std::collections::BTreeSet;

/// Lowercase `text` and split it into runs of word characters (letters, digits,
/// `_`). Tokens of a single character are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Distinct tokens of `text`, in sorted order.
pub fn term_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
