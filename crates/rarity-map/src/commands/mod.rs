//! Command implementations.

use anyhow::Context;
use camino::Utf8Path;
use rarity_map_core::wordlist;

pub mod build;
pub mod info;
pub mod inspect;
pub mod schema;

/// Read a wordlist file and return its normalized words.
///
/// The file size is checked against `max_bytes` before anything is read.
pub fn read_wordlist(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<Vec<String>> {
    let size = std::fs::metadata(path.as_std_path())
        .with_context(|| format!("failed to open wordlist {path}"))?
        .len();
    if let Some(limit) = max_bytes
        && size > limit as u64
    {
        anyhow::bail!(
            "wordlist {path} is {size} bytes, over the {limit}-byte input limit \
             (raise `max_input_bytes` or set `disable_input_limit`)"
        );
    }

    let text = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read wordlist {path}"))?;
    Ok(wordlist::parse_wordlist(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn reads_and_normalizes_within_limit() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("words.txt")).unwrap();
        std::fs::write(&path, " The\n\napple\n").unwrap();
        assert_eq!(read_wordlist(&path, Some(1024)).unwrap(), ["the", "apple"]);
        assert_eq!(read_wordlist(&path, None).unwrap(), ["the", "apple"]);
    }

    #[test]
    fn rejects_file_over_limit() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("words.txt")).unwrap();
        std::fs::write(&path, "a".repeat(64)).unwrap();
        let err = read_wordlist(&path, Some(10)).unwrap_err();
        assert!(err.to_string().contains("over the 10-byte input limit"));
    }

    #[test]
    fn missing_file_mentions_path() {
        let err = read_wordlist(Utf8Path::new("/nonexistent/words.txt"), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/words.txt"));
    }
}
