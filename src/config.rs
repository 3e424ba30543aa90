use serde::{Deserialize, Serialize};

use crate::{MAX_PROGRAM_WORDS, MAX_SCRATCHPAD_BYTES};

/// Memory sizes of the target core. The defaults describe a stock KCPSM3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub program_words: usize, // 10-bit address field caps this at 1024
    pub scratchpad_bytes: u16, // 6-bit ss field caps this at 64
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            program_words: MAX_PROGRAM_WORDS,
            scratchpad_bytes: MAX_SCRATCHPAD_BYTES,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("program_words must be in 1..={max}, got {got}")]
    ProgramWords { got: usize, max: usize },
    #[error("scratchpad_bytes must be in 1..={max}, got {got}")]
    ScratchpadBytes { got: u16, max: u16 },
}

impl TargetConfig {
    /// Reject sizes the instruction encoding has no room for.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program_words == 0 || self.program_words > MAX_PROGRAM_WORDS {
            return Err(ConfigError::ProgramWords {
                got: self.program_words,
                max: MAX_PROGRAM_WORDS,
            });
        }
        if self.scratchpad_bytes == 0 || self.scratchpad_bytes > MAX_SCRATCHPAD_BYTES {
            return Err(ConfigError::ScratchpadBytes {
                got: self.scratchpad_bytes,
                max: MAX_SCRATCHPAD_BYTES,
            });
        }
        Ok(())
    }
}
