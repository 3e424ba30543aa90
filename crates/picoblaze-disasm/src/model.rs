use anyhow::{Context, Result};
use std::path::Path;

use picoasm::export::hex::parse_hex;
use picoasm::MAX_PROGRAM_WORDS;

#[derive(Debug, Clone)]
pub struct Image {
    pub words: Vec<u32>,
}

impl Image {
    /// Number of words up to and including the last non-zero one.
    pub fn used(&self) -> usize {
        self.words.iter().rposition(|&w| w != 0).map_or(0, |p| p + 1)
    }
}

pub fn load_hex(path: &Path) -> Result<Image> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let words = parse_hex(&text)?;
    anyhow::ensure!(
        words.len() <= MAX_PROGRAM_WORDS,
        "{} words exceed the {MAX_PROGRAM_WORDS}-word program memory",
        words.len()
    );
    Ok(Image { words })
}

pub fn read_word(img: &Image, addr: usize) -> Option<u32> {
    img.words.get(addr).copied()
}
