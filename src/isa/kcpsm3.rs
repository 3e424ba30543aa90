use serde::{Deserialize, Serialize};

use crate::decoder::Decoder;
use crate::WORD_MASK;

/// KCPSM3 opcode selectors, already shifted into bits 17..12 of the word.
/// Conditional forms add their condition in bits 11..10 (see [`Cond::bits`]).
pub mod opcode {
    pub const LOAD_SX_KK: u32 = 0x00000;
    pub const LOAD_SX_SY: u32 = 0x01000;
    pub const INPUT_SX_PP: u32 = 0x04000;
    pub const INPUT_SX_SY: u32 = 0x05000;
    pub const FETCH_SX_SS: u32 = 0x06000;
    pub const FETCH_SX_SY: u32 = 0x07000;
    pub const AND_SX_KK: u32 = 0x0A000;
    pub const AND_SX_SY: u32 = 0x0B000;
    pub const OR_SX_KK: u32 = 0x0C000;
    pub const OR_SX_SY: u32 = 0x0D000;
    pub const XOR_SX_KK: u32 = 0x0E000;
    pub const XOR_SX_SY: u32 = 0x0F000;
    pub const TEST_SX_KK: u32 = 0x12000;
    pub const TEST_SX_SY: u32 = 0x13000;
    pub const COMPARE_SX_KK: u32 = 0x14000;
    pub const COMPARE_SX_SY: u32 = 0x15000;
    pub const ADD_SX_KK: u32 = 0x18000;
    pub const ADD_SX_SY: u32 = 0x19000;
    pub const ADDCY_SX_KK: u32 = 0x1A000;
    pub const ADDCY_SX_SY: u32 = 0x1B000;
    pub const SUB_SX_KK: u32 = 0x1C000;
    pub const SUB_SX_SY: u32 = 0x1D000;
    pub const SUBCY_SX_KK: u32 = 0x1E000;
    pub const SUBCY_SX_SY: u32 = 0x1F000;
    pub const SHIFT_SX: u32 = 0x20000;
    pub const RETURN: u32 = 0x2A000;
    pub const RETURN_COND: u32 = 0x2B000;
    pub const OUTPUT_SX_PP: u32 = 0x2C000;
    pub const OUTPUT_SX_SY: u32 = 0x2D000;
    pub const STORE_SX_SS: u32 = 0x2E000;
    pub const STORE_SX_SY: u32 = 0x2F000;
    pub const CALL: u32 = 0x30000;
    pub const CALL_COND: u32 = 0x31000;
    pub const JUMP: u32 = 0x34000;
    pub const JUMP_COND: u32 = 0x35000;
    pub const RETURNI: u32 = 0x38000;
    pub const INTERRUPT: u32 = 0x3C000;
    /// Unused by the core; reserved for the simulator event markers.
    pub const EVENT: u32 = 0x3F000;
}

/// Flag condition of JUMP/CALL/RETURN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cond {
    Z,
    NZ,
    C,
    NC,
}

impl Cond {
    pub fn parse(token: &str) -> Option<Cond> {
        match token.to_ascii_uppercase().as_str() {
            "Z" => Some(Cond::Z),
            "NZ" => Some(Cond::NZ),
            "C" => Some(Cond::C),
            "NC" => Some(Cond::NC),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Cond::Z => 0x000,
            Cond::NZ => 0x400,
            Cond::C => 0x800,
            Cond::NC => 0xC00,
        }
    }

    fn from_bits(word: u32) -> Cond {
        match (word >> 10) & 0x3 {
            0 => Cond::Z,
            1 => Cond::NZ,
            2 => Cond::C,
            _ => Cond::NC,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cond::Z => "Z",
            Cond::NZ => "NZ",
            Cond::C => "C",
            Cond::NC => "NC",
        }
    }
}

/// Register/constant arithmetic and logic group (`sX,kk` and `sX,sY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alu {
    Load,
    And,
    Or,
    Xor,
    Test,
    Compare,
    Add,
    Addcy,
    Sub,
    Subcy,
}

/// Shift and rotate group (`sX` only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    Sr0,
    Sr1,
    Srx,
    Sra,
    Rr,
    Sl0,
    Sl1,
    Slx,
    Sla,
    Rl,
}

impl Shift {
    fn code(self) -> u32 {
        match self {
            Shift::Sla => 0x00,
            Shift::Rl => 0x02,
            Shift::Slx => 0x04,
            Shift::Sl0 => 0x06,
            Shift::Sl1 => 0x07,
            Shift::Sra => 0x08,
            Shift::Srx => 0x0A,
            Shift::Rr => 0x0C,
            Shift::Sr0 => 0x0E,
            Shift::Sr1 => 0x0F,
        }
    }

    fn from_code(code: u32) -> Option<Shift> {
        Some(match code {
            0x00 => Shift::Sla,
            0x02 => Shift::Rl,
            0x04 => Shift::Slx,
            0x06 => Shift::Sl0,
            0x07 => Shift::Sl1,
            0x08 => Shift::Sra,
            0x0A => Shift::Srx,
            0x0C => Shift::Rr,
            0x0E => Shift::Sr0,
            0x0F => Shift::Sr1,
            _ => return None,
        })
    }
}

/// One KCPSM3 instruction. Each variant is a single (mnemonic, operand shape)
/// pair and holds only the fields that shape declares.
///
/// Register fields are 0..=15, `ss` is 0..=63 and `addr` is 0..=0x3FF; the
/// operand parser guarantees these before a variant is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    LoadKk { x: u8, kk: u8 },
    LoadSy { x: u8, y: u8 },
    AndKk { x: u8, kk: u8 },
    AndSy { x: u8, y: u8 },
    OrKk { x: u8, kk: u8 },
    OrSy { x: u8, y: u8 },
    XorKk { x: u8, kk: u8 },
    XorSy { x: u8, y: u8 },
    TestKk { x: u8, kk: u8 },
    TestSy { x: u8, y: u8 },
    CompareKk { x: u8, kk: u8 },
    CompareSy { x: u8, y: u8 },
    AddKk { x: u8, kk: u8 },
    AddSy { x: u8, y: u8 },
    AddcyKk { x: u8, kk: u8 },
    AddcySy { x: u8, y: u8 },
    SubKk { x: u8, kk: u8 },
    SubSy { x: u8, y: u8 },
    SubcyKk { x: u8, kk: u8 },
    SubcySy { x: u8, y: u8 },

    Sr0 { x: u8 },
    Sr1 { x: u8 },
    Srx { x: u8 },
    Sra { x: u8 },
    Rr { x: u8 },
    Sl0 { x: u8 },
    Sl1 { x: u8 },
    Slx { x: u8 },
    Sla { x: u8 },
    Rl { x: u8 },

    InputPp { x: u8, pp: u8 },
    InputSy { x: u8, y: u8 },
    OutputPp { x: u8, pp: u8 },
    OutputSy { x: u8, y: u8 },
    StoreSs { x: u8, ss: u8 },
    StoreSy { x: u8, y: u8 },
    FetchSs { x: u8, ss: u8 },
    FetchSy { x: u8, y: u8 },

    Jump { addr: u16 },
    JumpZ { addr: u16 },
    JumpNz { addr: u16 },
    JumpC { addr: u16 },
    JumpNc { addr: u16 },
    Call { addr: u16 },
    CallZ { addr: u16 },
    CallNz { addr: u16 },
    CallC { addr: u16 },
    CallNc { addr: u16 },
    Return,
    ReturnZ,
    ReturnNz,
    ReturnC,
    ReturnNc,

    ReturniEnable,
    ReturniDisable,
    EnableInterrupt,
    DisableInterrupt,

    ResetEvent,
    InterruptEvent,
}

impl Op {
    pub fn alu_imm(alu: Alu, x: u8, kk: u8) -> Op {
        match alu {
            Alu::Load => Op::LoadKk { x, kk },
            Alu::And => Op::AndKk { x, kk },
            Alu::Or => Op::OrKk { x, kk },
            Alu::Xor => Op::XorKk { x, kk },
            Alu::Test => Op::TestKk { x, kk },
            Alu::Compare => Op::CompareKk { x, kk },
            Alu::Add => Op::AddKk { x, kk },
            Alu::Addcy => Op::AddcyKk { x, kk },
            Alu::Sub => Op::SubKk { x, kk },
            Alu::Subcy => Op::SubcyKk { x, kk },
        }
    }

    pub fn alu_reg(alu: Alu, x: u8, y: u8) -> Op {
        match alu {
            Alu::Load => Op::LoadSy { x, y },
            Alu::And => Op::AndSy { x, y },
            Alu::Or => Op::OrSy { x, y },
            Alu::Xor => Op::XorSy { x, y },
            Alu::Test => Op::TestSy { x, y },
            Alu::Compare => Op::CompareSy { x, y },
            Alu::Add => Op::AddSy { x, y },
            Alu::Addcy => Op::AddcySy { x, y },
            Alu::Sub => Op::SubSy { x, y },
            Alu::Subcy => Op::SubcySy { x, y },
        }
    }

    pub fn shift(shift: Shift, x: u8) -> Op {
        match shift {
            Shift::Sr0 => Op::Sr0 { x },
            Shift::Sr1 => Op::Sr1 { x },
            Shift::Srx => Op::Srx { x },
            Shift::Sra => Op::Sra { x },
            Shift::Rr => Op::Rr { x },
            Shift::Sl0 => Op::Sl0 { x },
            Shift::Sl1 => Op::Sl1 { x },
            Shift::Slx => Op::Slx { x },
            Shift::Sla => Op::Sla { x },
            Shift::Rl => Op::Rl { x },
        }
    }

    pub fn jump(cond: Option<Cond>, addr: u16) -> Op {
        match cond {
            None => Op::Jump { addr },
            Some(Cond::Z) => Op::JumpZ { addr },
            Some(Cond::NZ) => Op::JumpNz { addr },
            Some(Cond::C) => Op::JumpC { addr },
            Some(Cond::NC) => Op::JumpNc { addr },
        }
    }

    pub fn call(cond: Option<Cond>, addr: u16) -> Op {
        match cond {
            None => Op::Call { addr },
            Some(Cond::Z) => Op::CallZ { addr },
            Some(Cond::NZ) => Op::CallNz { addr },
            Some(Cond::C) => Op::CallC { addr },
            Some(Cond::NC) => Op::CallNc { addr },
        }
    }

    pub fn ret(cond: Option<Cond>) -> Op {
        match cond {
            None => Op::Return,
            Some(Cond::Z) => Op::ReturnZ,
            Some(Cond::NZ) => Op::ReturnNz,
            Some(Cond::C) => Op::ReturnC,
            Some(Cond::NC) => Op::ReturnNc,
        }
    }

    /// Encode into an 18-bit KCPSM3 word.
    pub fn encode(&self) -> u32 {
        use opcode::*;
        match *self {
            Op::LoadKk { x, kk } => reg_imm(LOAD_SX_KK, x, kk),
            Op::LoadSy { x, y } => reg_reg(LOAD_SX_SY, x, y),
            Op::AndKk { x, kk } => reg_imm(AND_SX_KK, x, kk),
            Op::AndSy { x, y } => reg_reg(AND_SX_SY, x, y),
            Op::OrKk { x, kk } => reg_imm(OR_SX_KK, x, kk),
            Op::OrSy { x, y } => reg_reg(OR_SX_SY, x, y),
            Op::XorKk { x, kk } => reg_imm(XOR_SX_KK, x, kk),
            Op::XorSy { x, y } => reg_reg(XOR_SX_SY, x, y),
            Op::TestKk { x, kk } => reg_imm(TEST_SX_KK, x, kk),
            Op::TestSy { x, y } => reg_reg(TEST_SX_SY, x, y),
            Op::CompareKk { x, kk } => reg_imm(COMPARE_SX_KK, x, kk),
            Op::CompareSy { x, y } => reg_reg(COMPARE_SX_SY, x, y),
            Op::AddKk { x, kk } => reg_imm(ADD_SX_KK, x, kk),
            Op::AddSy { x, y } => reg_reg(ADD_SX_SY, x, y),
            Op::AddcyKk { x, kk } => reg_imm(ADDCY_SX_KK, x, kk),
            Op::AddcySy { x, y } => reg_reg(ADDCY_SX_SY, x, y),
            Op::SubKk { x, kk } => reg_imm(SUB_SX_KK, x, kk),
            Op::SubSy { x, y } => reg_reg(SUB_SX_SY, x, y),
            Op::SubcyKk { x, kk } => reg_imm(SUBCY_SX_KK, x, kk),
            Op::SubcySy { x, y } => reg_reg(SUBCY_SX_SY, x, y),

            Op::Sr0 { x } => shift_word(Shift::Sr0, x),
            Op::Sr1 { x } => shift_word(Shift::Sr1, x),
            Op::Srx { x } => shift_word(Shift::Srx, x),
            Op::Sra { x } => shift_word(Shift::Sra, x),
            Op::Rr { x } => shift_word(Shift::Rr, x),
            Op::Sl0 { x } => shift_word(Shift::Sl0, x),
            Op::Sl1 { x } => shift_word(Shift::Sl1, x),
            Op::Slx { x } => shift_word(Shift::Slx, x),
            Op::Sla { x } => shift_word(Shift::Sla, x),
            Op::Rl { x } => shift_word(Shift::Rl, x),

            Op::InputPp { x, pp } => reg_imm(INPUT_SX_PP, x, pp),
            Op::InputSy { x, y } => reg_reg(INPUT_SX_SY, x, y),
            Op::OutputPp { x, pp } => reg_imm(OUTPUT_SX_PP, x, pp),
            Op::OutputSy { x, y } => reg_reg(OUTPUT_SX_SY, x, y),
            Op::StoreSs { x, ss } => reg_imm(STORE_SX_SS, x, ss & 0x3F),
            Op::StoreSy { x, y } => reg_reg(STORE_SX_SY, x, y),
            Op::FetchSs { x, ss } => reg_imm(FETCH_SX_SS, x, ss & 0x3F),
            Op::FetchSy { x, y } => reg_reg(FETCH_SX_SY, x, y),

            Op::Jump { addr } => JUMP | address(addr),
            Op::JumpZ { addr } => JUMP_COND | Cond::Z.bits() | address(addr),
            Op::JumpNz { addr } => JUMP_COND | Cond::NZ.bits() | address(addr),
            Op::JumpC { addr } => JUMP_COND | Cond::C.bits() | address(addr),
            Op::JumpNc { addr } => JUMP_COND | Cond::NC.bits() | address(addr),
            Op::Call { addr } => CALL | address(addr),
            Op::CallZ { addr } => CALL_COND | Cond::Z.bits() | address(addr),
            Op::CallNz { addr } => CALL_COND | Cond::NZ.bits() | address(addr),
            Op::CallC { addr } => CALL_COND | Cond::C.bits() | address(addr),
            Op::CallNc { addr } => CALL_COND | Cond::NC.bits() | address(addr),
            Op::Return => RETURN,
            Op::ReturnZ => RETURN_COND | Cond::Z.bits(),
            Op::ReturnNz => RETURN_COND | Cond::NZ.bits(),
            Op::ReturnC => RETURN_COND | Cond::C.bits(),
            Op::ReturnNc => RETURN_COND | Cond::NC.bits(),

            Op::ReturniEnable => RETURNI | 1,
            Op::ReturniDisable => RETURNI,
            Op::EnableInterrupt => INTERRUPT | 1,
            Op::DisableInterrupt => INTERRUPT,

            Op::ResetEvent => EVENT,
            Op::InterruptEvent => EVENT | 1,
        }
    }

    /// Upper-case mnemonic as written in source (conditions and keywords are
    /// operands, so `JUMPZ` renders as `JUMP`).
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::LoadKk { .. } | Op::LoadSy { .. } => "LOAD",
            Op::AndKk { .. } | Op::AndSy { .. } => "AND",
            Op::OrKk { .. } | Op::OrSy { .. } => "OR",
            Op::XorKk { .. } | Op::XorSy { .. } => "XOR",
            Op::TestKk { .. } | Op::TestSy { .. } => "TEST",
            Op::CompareKk { .. } | Op::CompareSy { .. } => "COMPARE",
            Op::AddKk { .. } | Op::AddSy { .. } => "ADD",
            Op::AddcyKk { .. } | Op::AddcySy { .. } => "ADDCY",
            Op::SubKk { .. } | Op::SubSy { .. } => "SUB",
            Op::SubcyKk { .. } | Op::SubcySy { .. } => "SUBCY",
            Op::Sr0 { .. } => "SR0",
            Op::Sr1 { .. } => "SR1",
            Op::Srx { .. } => "SRX",
            Op::Sra { .. } => "SRA",
            Op::Rr { .. } => "RR",
            Op::Sl0 { .. } => "SL0",
            Op::Sl1 { .. } => "SL1",
            Op::Slx { .. } => "SLX",
            Op::Sla { .. } => "SLA",
            Op::Rl { .. } => "RL",
            Op::InputPp { .. } | Op::InputSy { .. } => "INPUT",
            Op::OutputPp { .. } | Op::OutputSy { .. } => "OUTPUT",
            Op::StoreSs { .. } | Op::StoreSy { .. } => "STORE",
            Op::FetchSs { .. } | Op::FetchSy { .. } => "FETCH",
            Op::Jump { .. }
            | Op::JumpZ { .. }
            | Op::JumpNz { .. }
            | Op::JumpC { .. }
            | Op::JumpNc { .. } => "JUMP",
            Op::Call { .. }
            | Op::CallZ { .. }
            | Op::CallNz { .. }
            | Op::CallC { .. }
            | Op::CallNc { .. } => "CALL",
            Op::Return | Op::ReturnZ | Op::ReturnNz | Op::ReturnC | Op::ReturnNc => "RETURN",
            Op::ReturniEnable | Op::ReturniDisable => "RETURNI",
            Op::EnableInterrupt => "ENABLE",
            Op::DisableInterrupt => "DISABLE",
            Op::ResetEvent => "RESET_EVENT",
            Op::InterruptEvent => "INTERRUPT_EVENT",
        }
    }
}

fn reg_imm(base: u32, x: u8, kk: u8) -> u32 {
    debug_assert!(x < 16, "register s{x:X} out of range");
    base | (u32::from(x & 0xF) << 8) | u32::from(kk)
}

fn reg_reg(base: u32, x: u8, y: u8) -> u32 {
    debug_assert!(x < 16 && y < 16, "register out of range");
    base | (u32::from(x & 0xF) << 8) | (u32::from(y & 0xF) << 4)
}

fn shift_word(shift: Shift, x: u8) -> u32 {
    debug_assert!(x < 16, "register s{x:X} out of range");
    opcode::SHIFT_SX | (u32::from(x & 0xF) << 8) | shift.code()
}

fn address(addr: u16) -> u32 {
    debug_assert!(addr < 0x400, "address {addr:#x} out of range");
    u32::from(addr) & 0x3FF
}

/// Decoder for KCPSM3 words. Only canonical encodings are accepted, so every
/// decoded instruction re-encodes to the exact word it came from.
#[derive(Debug, Default, Clone, Copy)]
pub struct Kcpsm3Decoder;

impl Kcpsm3Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Kcpsm3Decoder {
    fn decode(&self, word: u32) -> Option<Op> {
        use opcode::*;
        if word & !WORD_MASK != 0 {
            return None;
        }

        let x = ((word >> 8) & 0xF) as u8;
        let y = ((word >> 4) & 0xF) as u8;
        let kk = (word & 0xFF) as u8;
        let addr = (word & 0x3FF) as u16;

        let op = match word & 0x3F000 {
            LOAD_SX_KK => Op::LoadKk { x, kk },
            LOAD_SX_SY => Op::LoadSy { x, y },
            INPUT_SX_PP => Op::InputPp { x, pp: kk },
            INPUT_SX_SY => Op::InputSy { x, y },
            FETCH_SX_SS => Op::FetchSs { x, ss: kk },
            FETCH_SX_SY => Op::FetchSy { x, y },
            AND_SX_KK => Op::AndKk { x, kk },
            AND_SX_SY => Op::AndSy { x, y },
            OR_SX_KK => Op::OrKk { x, kk },
            OR_SX_SY => Op::OrSy { x, y },
            XOR_SX_KK => Op::XorKk { x, kk },
            XOR_SX_SY => Op::XorSy { x, y },
            TEST_SX_KK => Op::TestKk { x, kk },
            TEST_SX_SY => Op::TestSy { x, y },
            COMPARE_SX_KK => Op::CompareKk { x, kk },
            COMPARE_SX_SY => Op::CompareSy { x, y },
            ADD_SX_KK => Op::AddKk { x, kk },
            ADD_SX_SY => Op::AddSy { x, y },
            ADDCY_SX_KK => Op::AddcyKk { x, kk },
            ADDCY_SX_SY => Op::AddcySy { x, y },
            SUB_SX_KK => Op::SubKk { x, kk },
            SUB_SX_SY => Op::SubSy { x, y },
            SUBCY_SX_KK => Op::SubcyKk { x, kk },
            SUBCY_SX_SY => Op::SubcySy { x, y },
            SHIFT_SX => Op::shift(Shift::from_code(word & 0xFF)?, x),
            RETURN => Op::Return,
            RETURN_COND => Op::ret(Some(Cond::from_bits(word))),
            OUTPUT_SX_PP => Op::OutputPp { x, pp: kk },
            OUTPUT_SX_SY => Op::OutputSy { x, y },
            STORE_SX_SS => Op::StoreSs { x, ss: kk },
            STORE_SX_SY => Op::StoreSy { x, y },
            CALL => Op::Call { addr },
            CALL_COND => Op::call(Some(Cond::from_bits(word)), addr),
            JUMP => Op::Jump { addr },
            JUMP_COND => Op::jump(Some(Cond::from_bits(word)), addr),
            RETURNI => match word & 0xFFF {
                0 => Op::ReturniDisable,
                _ => Op::ReturniEnable,
            },
            INTERRUPT => match word & 0xFFF {
                0 => Op::DisableInterrupt,
                _ => Op::EnableInterrupt,
            },
            EVENT => match word & 0xFFF {
                0 => Op::ResetEvent,
                _ => Op::InterruptEvent,
            },
            _ => return None,
        };

        // Reserved bits set (e.g. a nonzero low nibble on an sX,sY form).
        (op.encode() == word).then_some(op)
    }
}
