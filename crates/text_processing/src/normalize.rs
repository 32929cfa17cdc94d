//! Utterance normalization shared by matching and duplicate suppression

/// Lowercase, drop punctuation other than apostrophes and hyphens, collapse whitespace
pub fn normalize_utterance(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Every ASCII digit in `text`, in order
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}
