//! Caption parsing for social posts.

use std::sync::OnceLock;

use regex::Regex;

fn hashtag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#\w+").expect("static hashtag pattern"))
}

fn mention_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@\w+").expect("static mention pattern"))
}

/// Hashtags in `text`, lower-cased and without the leading `#`.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    strip_prefixed(hashtag_pattern(), text)
}

/// Mentions in `text`, lower-cased and without the leading `@`.
#[must_use]
pub fn extract_mentions(text: &str) -> Vec<String> {
    strip_prefixed(mention_pattern(), text)
}

fn strip_prefixed(pattern: &Regex, text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    pattern
        .find_iter(&lowered)
        .map(|m| m.as_str()[1..].to_string())
        .collect()
}
