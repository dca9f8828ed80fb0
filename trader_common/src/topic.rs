//! Routing key validation and topic pattern matching.
//!
//! Routing keys are dot-delimited words (`app.stock.quotes.nasdaq.MSFT`). Binding
//! patterns on a topic exchange may use two wildcards:
//! - `*` matches exactly one word;
//! - `#` matches zero or more words.

use crate::error::TraderError;
use crate::result::Result;

/// Checks that `key` is a non-empty sequence of non-empty dot-separated words.
pub fn validate(key: &str) -> Result<()> {
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(TraderError::InvalidRoutingKey(key.to_string()));
    }
    Ok(())
}

/// Returns `true` if the topic `pattern` matches the routing `key`.
pub fn matches(pattern: &str, key: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = key.split('.').collect();
    match_words(&pattern, &key)
}

fn match_words(pattern: &[&str], key: &[&str]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some((&"#", rest)) => (0..=key.len()).any(|skip| match_words(rest, &key[skip..])),
        Some((&"*", rest)) => !key.is_empty() && match_words(rest, &key[1..]),
        Some((word, rest)) => key.first() == Some(word) && match_words(rest, &key[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_exactly_one_word() {
        assert!(matches("app.stock.quotes.nasdaq.*", "app.stock.quotes.nasdaq.MSFT"));
        assert!(!matches("app.stock.quotes.nasdaq.*", "app.stock.quotes.nasdaq"));
        assert!(!matches("app.stock.quotes.nasdaq.*", "app.stock.quotes.nasdaq.MSFT.x"));
        assert!(!matches("app.stock.quotes.nasdaq.*", "app.stock.quotes.nyse.IBM"));
    }

    #[test]
    fn hash_matches_zero_or_more_words() {
        assert!(matches("app.stock.#", "app.stock"));
        assert!(matches("app.stock.#", "app.stock.quotes.nyse.IBM"));
        assert!(matches("#", "anything.at.all"));
        assert!(matches("app.#.IBM", "app.stock.quotes.nyse.IBM"));
        assert!(!matches("app.#.IBM", "app.stock.quotes.nyse.GE"));
    }

    #[test]
    fn literal_words_must_match_exactly() {
        assert!(matches("a.b.c", "a.b.c"));
        assert!(!matches("a.b.c", "a.b"));
        assert!(!matches("a.b", "a.b.c"));
    }

    #[test]
    fn rejects_empty_words() {
        assert!(validate("app.stock.quotes.*").is_ok());
        assert!(validate("").is_err());
        assert!(validate("app..quotes").is_err());
        assert!(validate("app.stock.").is_err());
    }
}
