use crate::error::AsmError;
use crate::isa::kcpsm3::{Alu, Shift};

/// Operand shape of one overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    None,
    Reg,
    RegImm,
    RegReg,
    RegPort,
    RegScratch,
    RegIndirect,
    Addr,
    CondAddr,
    Cond,
    Interrupt,
    EnableFlag,
}

impl Shape {
    pub fn arity(self) -> usize {
        match self {
            Shape::None => 0,
            Shape::Reg | Shape::Addr | Shape::Cond | Shape::Interrupt | Shape::EnableFlag => 1,
            Shape::RegImm
            | Shape::RegReg
            | Shape::RegPort
            | Shape::RegScratch
            | Shape::RegIndirect
            | Shape::CondAddr => 2,
        }
    }

    pub fn syntax(self) -> &'static str {
        match self {
            Shape::None => "no operands",
            Shape::Reg => "sX",
            Shape::RegImm => "sX, kk",
            Shape::RegReg => "sX, sY",
            Shape::RegPort => "sX, pp",
            Shape::RegScratch => "sX, ss",
            Shape::RegIndirect => "sX, (sY)",
            Shape::Addr => "aaa",
            Shape::CondAddr => "cc, aaa",
            Shape::Cond => "cc",
            Shape::Interrupt => "INTERRUPT",
            Shape::EnableFlag => "ENABLE or DISABLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Alu(Alu),
    Shift(Shift),
    Input,
    Output,
    Store,
    Fetch,
    Jump,
    Call,
    Return,
    Returni,
    Enable,
    Disable,
    ResetEvent,
    InterruptEvent,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub kind: Kind,
    pub mnemonic: &'static str,
    pub shapes: &'static [Shape],
}

const ALU_SHAPES: &[Shape] = &[Shape::RegImm, Shape::RegReg];
const PORT_SHAPES: &[Shape] = &[Shape::RegPort, Shape::RegIndirect];
const SCRATCH_SHAPES: &[Shape] = &[Shape::RegScratch, Shape::RegIndirect];
const BRANCH_SHAPES: &[Shape] = &[Shape::Addr, Shape::CondAddr];
const REG_SHAPES: &[Shape] = &[Shape::Reg];

const fn alu(mnemonic: &'static str, op: Alu) -> InstrDesc {
    InstrDesc { kind: Kind::Alu(op), mnemonic, shapes: ALU_SHAPES }
}

const fn shift(mnemonic: &'static str, op: Shift) -> InstrDesc {
    InstrDesc { kind: Kind::Shift(op), mnemonic, shapes: REG_SHAPES }
}

pub const TABLE: &[InstrDesc] = &[
    alu("LOAD", Alu::Load),
    alu("AND", Alu::And),
    alu("OR", Alu::Or),
    alu("XOR", Alu::Xor),
    alu("TEST", Alu::Test),
    alu("COMPARE", Alu::Compare),
    alu("ADD", Alu::Add),
    alu("ADDCY", Alu::Addcy),
    alu("SUB", Alu::Sub),
    alu("SUBCY", Alu::Subcy),
    shift("SR0", Shift::Sr0),
    shift("SR1", Shift::Sr1),
    shift("SRX", Shift::Srx),
    shift("SRA", Shift::Sra),
    shift("RR", Shift::Rr),
    shift("SL0", Shift::Sl0),
    shift("SL1", Shift::Sl1),
    shift("SLX", Shift::Slx),
    shift("SLA", Shift::Sla),
    shift("RL", Shift::Rl),
    InstrDesc { kind: Kind::Input, mnemonic: "INPUT", shapes: PORT_SHAPES },
    InstrDesc { kind: Kind::Output, mnemonic: "OUTPUT", shapes: PORT_SHAPES },
    InstrDesc { kind: Kind::Store, mnemonic: "STORE", shapes: SCRATCH_SHAPES },
    InstrDesc { kind: Kind::Fetch, mnemonic: "FETCH", shapes: SCRATCH_SHAPES },
    InstrDesc { kind: Kind::Jump, mnemonic: "JUMP", shapes: BRANCH_SHAPES },
    InstrDesc { kind: Kind::Call, mnemonic: "CALL", shapes: BRANCH_SHAPES },
    InstrDesc { kind: Kind::Return, mnemonic: "RETURN", shapes: &[Shape::None, Shape::Cond] },
    InstrDesc { kind: Kind::Returni, mnemonic: "RETURNI", shapes: &[Shape::EnableFlag] },
    InstrDesc { kind: Kind::Enable, mnemonic: "ENABLE", shapes: &[Shape::Interrupt] },
    InstrDesc { kind: Kind::Disable, mnemonic: "DISABLE", shapes: &[Shape::Interrupt] },
    InstrDesc { kind: Kind::ResetEvent, mnemonic: "RESET_EVENT", shapes: &[Shape::None] },
    InstrDesc { kind: Kind::InterruptEvent, mnemonic: "INTERRUPT_EVENT", shapes: &[Shape::None] },
];

/// Case-insensitive mnemonic lookup.
pub fn lookup(mnemonic: &str) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.mnemonic.eq_ignore_ascii_case(mnemonic))
}

/// Assembler directives. They define symbols and occupy no program memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Constant,
    Namereg,
}

pub fn directive(token: &str) -> Option<Directive> {
    if token.eq_ignore_ascii_case("CONSTANT") {
        Some(Directive::Constant)
    } else if token.eq_ignore_ascii_case("NAMEREG") {
        Some(Directive::Namereg)
    } else {
        None
    }
}

pub fn is_mnemonic_or_directive(token: &str) -> bool {
    lookup(token).is_some() || directive(token).is_some()
}

/// Words that can never be user symbols.
pub fn is_reserved(word: &str) -> bool {
    const KEYWORDS: &[&str] = &["Z", "NZ", "C", "NC", "INTERRUPT"];
    is_mnemonic_or_directive(word) || KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

impl InstrDesc {
    /// Pick the overload matching the operand tokens. Arity narrows the
    /// candidates; when two remain, the last token decides: `(sY)` selects the
    /// indirect form, a register selects `sX, sY`, anything else the value form.
    pub fn select(
        &self,
        operands: &[String],
        is_register: impl Fn(&str) -> bool,
    ) -> Result<Shape, AsmError> {
        let mut candidates = self.shapes.iter().copied().filter(|s| s.arity() == operands.len());
        let first = candidates.next().ok_or_else(|| self.shape_error(operands))?;
        let Some(second) = candidates.next() else {
            return Ok(first);
        };

        let last = operands.last().map(String::as_str).unwrap_or_default();
        let wanted = if last.starts_with('(') {
            Some(Shape::RegIndirect)
        } else if is_register(last) {
            Some(Shape::RegReg)
        } else {
            None
        };
        let shape = match wanted {
            Some(w) if first == w || second == w => w,
            // Value form, or the only fit; field parsing reports the mismatch.
            _ if matches!(second, Shape::RegReg | Shape::RegIndirect) => first,
            _ => second,
        };
        Ok(shape)
    }

    fn shape_error(&self, operands: &[String]) -> AsmError {
        let expected = self
            .shapes
            .iter()
            .map(|s| s.syntax())
            .collect::<Vec<_>>()
            .join(" or ");
        let got = if operands.is_empty() {
            "no operands".to_string()
        } else {
            format!("`{}`", operands.join(", "))
        };
        AsmError::AmbiguousOperandShape {
            mnemonic: self.mnemonic.to_string(),
            expected,
            got,
        }
    }
}
