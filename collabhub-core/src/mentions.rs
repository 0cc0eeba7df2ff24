/// Mention parsing for comment bodies
///
/// A mention is `@` followed by one or more word characters. Candidates are
/// extracted purely from the text; whether a candidate is a real, mentionable
/// user is decided later by the fanout engine against the directory and the
/// project membership.
///
/// Duplicate mentions collapse to one candidate, so `@bob ... @bob` produces
/// a single notification.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)").expect("valid mention regex"));

/// Extracts the set of mention candidates from a comment body
///
/// Candidates are returned in sorted order so downstream processing is
/// deterministic. The token right after `@` is taken verbatim; punctuation
/// ends a mention, and an email address like `user@example.com` yields its
/// domain word, which simply won't resolve to a user.
pub fn extract_mentions(content: &str) -> BTreeSet<String> {
    MENTION_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentions(content: &str) -> Vec<String> {
        extract_mentions(content).into_iter().collect()
    }

    #[test]
    fn test_extracts_single_mention() {
        assert_eq!(mentions("hey @alice, look at this"), vec!["alice"]);
    }

    #[test]
    fn test_collapses_duplicates() {
        assert_eq!(mentions("@bob @bob @bob"), vec!["bob"]);
    }

    #[test]
    fn test_multiple_mentions_sorted() {
        assert_eq!(
            mentions("@carol and @alice and @bob"),
            vec!["alice", "bob", "carol"]
        );
    }

    #[test]
    fn test_punctuation_ends_mention() {
        assert_eq!(mentions("thanks @dave."), vec!["dave"]);
        assert_eq!(mentions("(@eve)"), vec!["eve"]);
    }

    #[test]
    fn test_underscores_and_digits_allowed() {
        assert_eq!(mentions("ping @user_42"), vec!["user_42"]);
    }

    #[test]
    fn test_email_yields_domain_word() {
        // Not a real mention; the candidate just won't resolve to a user.
        assert_eq!(mentions("mail me at alice@example.com"), vec!["example"]);
    }

    #[test]
    fn test_double_at_sign() {
        assert_eq!(mentions("@@frank"), vec!["frank"]);
    }

    #[test]
    fn test_no_mentions() {
        assert!(mentions("nothing to see here").is_empty());
        assert!(mentions("").is_empty());
        assert!(mentions("@ alone").is_empty());
    }
}
