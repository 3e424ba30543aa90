//! KCPSM3 `.hex` format: one five-digit word per line for every address of
//! program memory, unused addresses reading `00000`.

use std::fmt::Write as _;

use crate::image::ProgramImage;
use crate::WORD_MASK;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("line {line}: `{text}` is not a hex word")]
    BadWord { line: usize, text: String },
    #[error("line {line}: {word:#X} does not fit in 18 bits")]
    TooWide { line: usize, word: u32 },
}

pub fn to_hex(image: &ProgramImage, program_words: usize) -> String {
    let mut out = String::with_capacity(program_words * 6);
    for addr in 0..program_words.max(image.len()) {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{:05X}", image.word_or_zero(addr));
    }
    out
}

/// Read a hex dump back into words. Blank lines are skipped.
pub fn parse_hex(text: &str) -> Result<Vec<u32>, HexError> {
    let mut words = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let t = raw.trim();
        if t.is_empty() {
            continue;
        }
        let word = u32::from_str_radix(t, 16).map_err(|_| HexError::BadWord {
            line: idx + 1,
            text: t.to_string(),
        })?;
        if word & !WORD_MASK != 0 {
            return Err(HexError::TooWide { line: idx + 1, word });
        }
        words.push(word);
    }
    Ok(words)
}
