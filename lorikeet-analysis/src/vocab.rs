//! SentencePiece-style vocabulary for CTC decoding.

use crate::error::{ModelError, Result};
use std::path::Path;

/// Marker SentencePiece uses for a word-initial piece.
const WORD_BOUNDARY: char = '\u{2581}';

/// Token vocabulary loaded from a `vocab.txt` file, one token per line.
///
/// The token id is the zero-based line index. The blank id used by CTC is
/// one past the last token.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    tokens: Vec<String>,
}

impl Vocabulary {
    /// Load a vocabulary from a newline-delimited token file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut tokens = Vec::new();

        for (i, line) in content.lines().enumerate() {
            let token = line.trim_end();
            if token.is_empty() {
                return Err(ModelError::InvalidVocabulary {
                    line: i + 1,
                    reason: "empty token".to_string(),
                }
                .into());
            }
            tokens.push(token.to_string());
        }

        if tokens.is_empty() {
            return Err(ModelError::InvalidVocabulary {
                line: 0,
                reason: "vocabulary file contains no tokens".to_string(),
            }
            .into());
        }

        Ok(Self { tokens })
    }

    /// Number of tokens, excluding the CTC blank.
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// Decode a sequence of token ids into text.
    ///
    /// Unknown ids are skipped. SentencePiece word-boundary markers become
    /// spaces; leading/trailing whitespace is trimmed.
    pub fn decode(&self, token_ids: &[usize]) -> String {
        let mut text = String::new();

        for &id in token_ids {
            if let Some(token) = self.tokens.get(id) {
                for c in token.chars() {
                    if c == WORD_BOUNDARY {
                        text.push(' ');
                    } else {
                        text.push(c);
                    }
                }
            }
        }

        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_vocab(name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn decodes_word_boundaries() {
        let path = write_vocab(
            "lorikeet_vocab_basic.txt",
            &["\u{2581}he", "llo", "\u{2581}world"],
        );
        let vocab = Vocabulary::from_file(&path).unwrap();

        assert_eq!(vocab.size(), 3);
        assert_eq!(vocab.decode(&[0, 1, 2]), "hello world");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn skips_unknown_ids() {
        let path = write_vocab("lorikeet_vocab_unknown.txt", &["\u{2581}hi"]);
        let vocab = Vocabulary::from_file(&path).unwrap();

        assert_eq!(vocab.decode(&[0, 99]), "hi");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_empty_file() {
        let path = std::env::temp_dir().join("lorikeet_vocab_empty.txt");
        std::fs::write(&path, "").unwrap();

        assert!(Vocabulary::from_file(&path).is_err());

        std::fs::remove_file(path).ok();
    }
}
