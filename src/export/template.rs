//! Fills a KCPSM3 `ROM_form` VHDL or Verilog template with the program.
//!
//! Recognised placeholders:
//! * `{begin template}`: everything up to and including it is dropped
//! * `{name}`: entity/module name
//! * `{INIT_00}`..`{INIT_3F}`: low 16 bits of 16 words each, highest address first
//! * `{INITP_00}`..`{INITP_07}`: top 2 bits of 128 words each, highest address first

use std::fmt::Write as _;

use crate::image::ProgramImage;

const BEGIN_MARKER: &str = "{begin template}";
const WORDS_PER_INIT: usize = 16;
const WORDS_PER_INITP: usize = 128;
const INIT_LINES: usize = 64;
const INITP_LINES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdlFlavor {
    Vhdl,
    Verilog,
}

impl HdlFlavor {
    pub fn default_template(self) -> &'static str {
        match self {
            HdlFlavor::Vhdl => "ROM_form.vhd",
            HdlFlavor::Verilog => "ROM_form.v",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template has no `{{begin template}}` marker")]
    MissingBegin,
    #[error("program has {words} words, the ROM template holds {capacity}")]
    TooLarge { words: usize, capacity: usize },
    #[error("entity name `{0}` is not a valid HDL identifier")]
    BadName(String),
}

/// Hex string for `{INIT_nn}`.
pub fn init_line(image: &ProgramImage, n: usize) -> String {
    let base = n * WORDS_PER_INIT;
    let mut s = String::with_capacity(WORDS_PER_INIT * 4);
    for addr in (base..base + WORDS_PER_INIT).rev() {
        let _ = write!(s, "{:04X}", image.word_or_zero(addr) & 0xFFFF);
    }
    s
}

/// Hex string for `{INITP_nn}`. Each hex digit covers two words.
pub fn initp_line(image: &ProgramImage, n: usize) -> String {
    let base = n * WORDS_PER_INITP;
    let parity = |addr: usize| (image.word_or_zero(addr) >> 16) & 0x3;
    let mut s = String::with_capacity(WORDS_PER_INITP / 2);
    for pair in (0..WORDS_PER_INITP / 2).rev() {
        let addr = base + pair * 2;
        let digit = parity(addr) | (parity(addr + 1) << 2);
        let _ = write!(s, "{digit:X}");
    }
    s
}

fn valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn fill_template(template: &str, name: &str, image: &ProgramImage) -> Result<String, TemplateError> {
    let capacity = INIT_LINES * WORDS_PER_INIT;
    if image.len() > capacity {
        return Err(TemplateError::TooLarge { words: image.len(), capacity });
    }
    if !valid_identifier(name) {
        return Err(TemplateError::BadName(name.to_string()));
    }
    let start = template.find(BEGIN_MARKER).ok_or(TemplateError::MissingBegin)?;
    let body = template[start + BEGIN_MARKER.len()..].trim_start_matches(['\r', '\n']);

    let mut out = body.replace("{name}", name);
    for n in 0..INIT_LINES {
        out = out.replace(&format!("{{INIT_{n:02X}}}"), &init_line(image, n));
    }
    for n in 0..INITP_LINES {
        out = out.replace(&format!("{{INITP_{n:02X}}}"), &initp_line(image, n));
    }
    Ok(out)
}
