use serde::Serialize;

use crate::isa::kcpsm3::Op;

/// A fully resolved and encoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub op: Op,
    pub address: u16,
    pub source_line: usize, // 1-based
    pub hexcode: u32,       // 18-bit word
}

impl Instruction {
    pub fn new(op: Op, address: u16, source_line: usize) -> Self {
        Self {
            op,
            address,
            source_line,
            hexcode: op.encode(),
        }
    }
}

/// Program memory contents: slot `n` holds the instruction at address `n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgramImage {
    slots: Vec<Instruction>,
}

impl ProgramImage {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, instr: Instruction) {
        debug_assert_eq!(usize::from(instr.address), self.slots.len());
        self.slots.push(instr);
    }

    pub fn get(&self, address: u16) -> Option<&Instruction> {
        self.slots.get(usize::from(address))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.slots.iter()
    }

    /// `(address, hexcode)` pairs in ascending address order.
    pub fn words(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        self.slots.iter().map(|i| (i.address, i.hexcode))
    }

    /// Word at `address`, with unused program memory reading as zero.
    pub fn word_or_zero(&self, address: usize) -> u32 {
        self.slots.get(address).map_or(0, |i| i.hexcode)
    }
}

impl<'a> IntoIterator for &'a ProgramImage {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
