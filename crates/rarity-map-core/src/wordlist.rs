//! Wordlist parsing.
//!
//! A wordlist is UTF-8 text with one word per line. Lines are trimmed and
//! lower-cased; blank lines are dropped. Order and duplicates are preserved
//! so diagnostics can report the raw line count.

/// Normalize a single token the way wordlist lines are normalized.
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Parse wordlist text into normalized words.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn parse_wordlist(text: &str) -> Vec<String> {
    let words: Vec<String> = text
        .lines()
        .map(normalize)
        .filter(|w| !w.is_empty())
        .collect();
    tracing::debug!(words = words.len(), "parsed wordlist");
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        let words = parse_wordlist("  The\nAPPLE  \nZythum\n");
        assert_eq!(words, vec!["the", "apple", "zythum"]);
    }

    #[test]
    fn skips_blank_lines() {
        let words = parse_wordlist("\n\nalpha\n   \n\tbeta\n\n");
        assert_eq!(words, vec!["alpha", "beta"]);
    }

    #[test]
    fn keeps_duplicates_in_order() {
        let words = parse_wordlist("Cat\ndog\ncat\n");
        assert_eq!(words, vec!["cat", "dog", "cat"]);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let words = parse_wordlist("one\r\ntwo\r\n");
        assert_eq!(words, vec!["one", "two"]);
    }

    #[test]
    fn empty_text_yields_no_words() {
        assert!(parse_wordlist("").is_empty());
        assert!(parse_wordlist("   \n \n").is_empty());
    }

    #[test]
    fn lowercases_non_ascii() {
        assert_eq!(parse_wordlist("ÉCOLE\n"), vec!["école"]);
    }
}
