//! Line tokenization for the intra-line diff.
//!
//! A word is a maximal run of bytes sharing one class. Classification is
//! ASCII only so results do not depend on the host locale.

use serde::{Deserialize, Serialize};

use crate::config::CompareConfig;
use crate::hashing::{HASH_SEED, mix_byte};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CharClass {
    Space,
    AlphaNum,
    Other,
}

pub(crate) fn classify(byte: u8) -> CharClass {
    match byte {
        b' ' | b'\t' => CharClass::Space,
        b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' | b'_' => CharClass::AlphaNum,
        _ => CharClass::Other,
    }
}

/// One word within a line. `pos` and `len` are byte coordinates into the
/// line; two words are equal iff their hashes are equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct Word {
    pub class: CharClass,
    pub line: usize,
    pub pos: usize,
    pub len: usize,
    pub hash: u64,
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Word {}

/// Split a line into words. Whitespace words are dropped when the settings
/// ignore spaces; a line without remaining words yields an empty vector.
pub(crate) fn split_words(line: &[u8], line_index: usize, config: &CompareConfig) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;

    for (pos, &raw) in line.iter().enumerate() {
        let byte = if config.ignore_case {
            raw.to_ascii_lowercase()
        } else {
            raw
        };
        let class = classify(byte);

        match &mut current {
            Some(word) if word.class == class => {
                word.len += 1;
                word.hash = mix_byte(word.hash, byte);
            }
            slot => {
                if let Some(word) = slot.take() {
                    keep_word(&mut words, word, config);
                }
                *slot = Some(Word {
                    class,
                    line: line_index,
                    pos,
                    len: 1,
                    hash: mix_byte(HASH_SEED, byte),
                });
            }
        }
    }

    if let Some(word) = current {
        keep_word(&mut words, word, config);
    }

    words
}

fn keep_word(words: &mut Vec<Word>, word: Word, config: &CompareConfig) {
    if config.ignore_spaces && word.class == CharClass::Space {
        return;
    }
    words.push(word);
}
