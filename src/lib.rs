pub mod assembler;
pub mod config;
pub mod decoder;
pub mod disasm;
pub mod error;
pub mod image;
pub mod instructions;
pub mod operand;
pub mod scanner;
pub mod symbols;

pub mod isa {
    pub mod kcpsm3; // PicoBlaze-3 encoding
}

pub mod export {
    pub mod hex;
    pub mod listing;
    pub mod template;
}

pub use assembler::{assemble, AsmState, Assembler};
pub use config::TargetConfig;
pub use error::{AsmError, Diagnostic, DiagnosticKind, Diagnostics};
pub use image::{Instruction, ProgramImage};
pub use isa::kcpsm3::{Cond, Op, Shift};

/// Width of one program-memory word in bits.
pub const WORD_BITS: u32 = 18;
/// Mask covering one program-memory word.
pub const WORD_MASK: u32 = (1 << WORD_BITS) - 1;
/// Number of registers `s0`..`sF`.
pub const REGISTER_COUNT: u8 = 16;
/// Largest program memory the 10-bit address field can reach.
pub const MAX_PROGRAM_WORDS: usize = 1024;
/// Largest scratchpad the 6-bit `ss` field can reach.
pub const MAX_SCRATCHPAD_BYTES: u16 = 64;
