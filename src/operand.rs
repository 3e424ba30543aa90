use crate::config::TargetConfig;
use crate::error::AsmError;
use crate::instructions::{InstrDesc, Kind, Shape};
use crate::isa::kcpsm3::{Cond, Op};
use crate::symbols::{SymbolTable, SymbolValue};
use crate::REGISTER_COUNT;

/// Largest value a `CONSTANT` may hold: the widest operand field.
pub const MAX_CONSTANT: u32 = 0x3FF;

pub fn is_hex_literal(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_hexdigit())
}

/// Hex digits of a register-shaped token (`s0`, `SF`, `s99`), if it is one.
pub fn register_shape(token: &str) -> Option<&str> {
    let digits = token.strip_prefix(|c: char| c == 's' || c == 'S')?;
    is_hex_literal(digits).then_some(digits)
}

fn hex_value(token: &str, digits: &str, field: &'static str, max: u32) -> Result<u32, AsmError> {
    let range = || AsmError::OperandRange {
        field,
        got: token.to_string(),
        max,
    };
    let v = u32::from_str_radix(digits, 16).map_err(|_| range())?;
    if v > max {
        return Err(range());
    }
    Ok(v)
}

/// Parse a literal register name (`s0`..`sF`) without alias lookup.
pub fn register_index(token: &str) -> Result<u8, AsmError> {
    let digits = register_shape(token).ok_or_else(|| AsmError::Operand {
        expected: "register s0..sF".into(),
        got: token.to_string(),
    })?;
    let max = u32::from(REGISTER_COUNT - 1);
    Ok(hex_value(token, digits, "register", max)? as u8)
}

/// Turns raw operand tokens of one line into typed, range-checked fields.
/// Symbols are looked up in a table that is complete (pass 1 has finished).
pub struct OperandParser<'a> {
    symbols: &'a SymbolTable,
    target: &'a TargetConfig,
    line: usize,
}

impl<'a> OperandParser<'a> {
    pub fn new(symbols: &'a SymbolTable, target: &'a TargetConfig, line: usize) -> Self {
        Self { symbols, target, line }
    }

    pub fn is_register(&self, token: &str) -> bool {
        self.symbols.register_alias(token).is_some() || register_shape(token).is_some()
    }

    pub fn register(&self, token: &str) -> Result<u8, AsmError> {
        match self.symbols.register_alias(token) {
            Some(r) => Ok(r),
            None => register_index(token),
        }
    }

    /// `(sY)`
    pub fn indirect(&self, token: &str) -> Result<u8, AsmError> {
        let inner = token
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .ok_or_else(|| AsmError::Operand {
                expected: "indirect register (sY)".into(),
                got: token.to_string(),
            })?;
        self.register(inner)
    }

    fn value(&self, token: &str, field: &'static str, max: u32) -> Result<u32, AsmError> {
        let mismatch = || AsmError::Operand {
            expected: field.to_string(),
            got: token.to_string(),
        };
        // `C` would otherwise read as hex 0x0C.
        if Cond::parse(token).is_some() {
            return Err(mismatch());
        }
        if is_hex_literal(token) {
            return hex_value(token, token, field, max);
        }
        if self.is_register(token) || token.starts_with('(') {
            return Err(mismatch());
        }
        if !token.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            return Err(mismatch());
        }
        let v = match self.symbols.resolve(token, self.line)? {
            SymbolValue::Address(a) => u32::from(a),
            SymbolValue::Constant(c) => u32::from(c),
            SymbolValue::Register(_) => return Err(mismatch()),
        };
        if v > max {
            return Err(AsmError::OperandRange {
                field,
                got: format!("{token} ({v:X})"),
                max,
            });
        }
        Ok(v)
    }

    pub fn immediate(&self, token: &str) -> Result<u8, AsmError> {
        Ok(self.value(token, "constant", 0xFF)? as u8)
    }

    pub fn port(&self, token: &str) -> Result<u8, AsmError> {
        Ok(self.value(token, "port", 0xFF)? as u8)
    }

    pub fn scratchpad(&self, token: &str) -> Result<u8, AsmError> {
        let max = u32::from(self.target.scratchpad_bytes.saturating_sub(1));
        Ok(self.value(token, "scratchpad address", max)? as u8)
    }

    pub fn address(&self, token: &str) -> Result<u16, AsmError> {
        let max = self.target.program_words.saturating_sub(1) as u32;
        Ok(self.value(token, "address", max)? as u16)
    }

    pub fn condition(&self, token: &str) -> Result<Cond, AsmError> {
        Cond::parse(token).ok_or_else(|| AsmError::Operand {
            expected: "condition Z, NZ, C or NC".into(),
            got: token.to_string(),
        })
    }

    fn keyword(&self, token: &str, expected: &'static str) -> Result<(), AsmError> {
        if token.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(AsmError::Operand {
                expected: expected.to_string(),
                got: token.to_string(),
            })
        }
    }

    /// Build the instruction for an overload already chosen by
    /// [`InstrDesc::select`], so `ops` has exactly `shape.arity()` entries.
    pub fn build(&self, desc: &InstrDesc, shape: Shape, ops: &[String]) -> Result<Op, AsmError> {
        let op = match (desc.kind, shape) {
            (Kind::Alu(alu), Shape::RegImm) => {
                Op::alu_imm(alu, self.register(&ops[0])?, self.immediate(&ops[1])?)
            }
            (Kind::Alu(alu), Shape::RegReg) => {
                Op::alu_reg(alu, self.register(&ops[0])?, self.register(&ops[1])?)
            }
            (Kind::Shift(shift), Shape::Reg) => Op::shift(shift, self.register(&ops[0])?),

            (Kind::Input, Shape::RegPort) => Op::InputPp {
                x: self.register(&ops[0])?,
                pp: self.port(&ops[1])?,
            },
            (Kind::Input, Shape::RegIndirect) => Op::InputSy {
                x: self.register(&ops[0])?,
                y: self.indirect(&ops[1])?,
            },
            (Kind::Output, Shape::RegPort) => Op::OutputPp {
                x: self.register(&ops[0])?,
                pp: self.port(&ops[1])?,
            },
            (Kind::Output, Shape::RegIndirect) => Op::OutputSy {
                x: self.register(&ops[0])?,
                y: self.indirect(&ops[1])?,
            },
            (Kind::Store, Shape::RegScratch) => Op::StoreSs {
                x: self.register(&ops[0])?,
                ss: self.scratchpad(&ops[1])?,
            },
            (Kind::Store, Shape::RegIndirect) => Op::StoreSy {
                x: self.register(&ops[0])?,
                y: self.indirect(&ops[1])?,
            },
            (Kind::Fetch, Shape::RegScratch) => Op::FetchSs {
                x: self.register(&ops[0])?,
                ss: self.scratchpad(&ops[1])?,
            },
            (Kind::Fetch, Shape::RegIndirect) => Op::FetchSy {
                x: self.register(&ops[0])?,
                y: self.indirect(&ops[1])?,
            },

            (Kind::Jump, Shape::Addr) => Op::jump(None, self.address(&ops[0])?),
            (Kind::Jump, Shape::CondAddr) => {
                Op::jump(Some(self.condition(&ops[0])?), self.address(&ops[1])?)
            }
            (Kind::Call, Shape::Addr) => Op::call(None, self.address(&ops[0])?),
            (Kind::Call, Shape::CondAddr) => {
                Op::call(Some(self.condition(&ops[0])?), self.address(&ops[1])?)
            }
            (Kind::Return, Shape::None) => Op::ret(None),
            (Kind::Return, Shape::Cond) => Op::ret(Some(self.condition(&ops[0])?)),

            (Kind::Returni, Shape::EnableFlag) => {
                if ops[0].eq_ignore_ascii_case("ENABLE") {
                    Op::ReturniEnable
                } else if ops[0].eq_ignore_ascii_case("DISABLE") {
                    Op::ReturniDisable
                } else {
                    return Err(AsmError::Operand {
                        expected: "ENABLE or DISABLE".into(),
                        got: ops[0].clone(),
                    });
                }
            }
            (Kind::Enable, Shape::Interrupt) => {
                self.keyword(&ops[0], "INTERRUPT")?;
                Op::EnableInterrupt
            }
            (Kind::Disable, Shape::Interrupt) => {
                self.keyword(&ops[0], "INTERRUPT")?;
                Op::DisableInterrupt
            }
            (Kind::ResetEvent, Shape::None) => Op::ResetEvent,
            (Kind::InterruptEvent, Shape::None) => Op::InterruptEvent,

            (_, shape) => {
                return Err(AsmError::AmbiguousOperandShape {
                    mnemonic: desc.mnemonic.to_string(),
                    expected: desc
                        .shapes
                        .iter()
                        .map(|s| s.syntax())
                        .collect::<Vec<_>>()
                        .join(" or "),
                    got: shape.syntax().to_string(),
                })
            }
        };
        Ok(op)
    }
}
