use crate::isa::kcpsm3::Op;

/// Turns one program-memory word back into an instruction.
pub trait Decoder {
    fn decode(&self, word: u32) -> Option<Op>;
}
