//! Two-pass assembly: pass 1 assigns addresses and collects symbols, pass 2
//! resolves operands against the finished symbol table and encodes.

use tracing::{debug, trace, warn};

use crate::config::TargetConfig;
use crate::disasm::fmt_op;
use crate::error::{AsmError, Diagnostic, Diagnostics};
use crate::image::{Instruction, ProgramImage};
use crate::instructions::{self, Directive, InstrDesc};
use crate::operand::{is_hex_literal, register_index, OperandParser, MAX_CONSTANT};
use crate::scanner::{ScannedLine, Scanner};
use crate::symbols::{validate_name, SymbolTable, SymbolValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmState {
    Idle,
    Scanning,
    Pass1,
    Pass2,
    Assembled,
    Failed,
}

/// An instruction line after pass 1: its slot is fixed, its operands are
/// still raw tokens.
#[derive(Debug, Clone)]
struct Statement {
    desc: &'static InstrDesc,
    operands: Vec<String>,
    address: usize,
    line: usize,
}

#[derive(Debug)]
pub struct Assembler {
    target: TargetConfig,
    source: String,
    state: AsmState,
    symbols: SymbolTable,
    image: Option<ProgramImage>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(TargetConfig::default())
    }
}

impl Assembler {
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target,
            source: String::new(),
            state: AsmState::Idle,
            symbols: SymbolTable::new(),
            image: None,
            diagnostics: Vec::new(),
        }
    }

    /// Replace the source text and discard any previous result.
    pub fn set_source(&mut self, text: impl Into<String>) {
        self.source = text.into();
        self.state = AsmState::Idle;
        self.symbols = SymbolTable::new();
        self.image = None;
        self.diagnostics.clear();
    }

    pub fn state(&self) -> AsmState {
        self.state
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Symbols collected by the last run (also available after a failure).
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The finished image; `None` unless the last run succeeded.
    pub fn image(&self) -> Option<&ProgramImage> {
        match self.state {
            AsmState::Assembled => self.image.as_ref(),
            _ => None,
        }
    }

    pub fn into_image(self) -> Option<ProgramImage> {
        match self.state {
            AsmState::Assembled => self.image,
            _ => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Run both passes. Every line is visited even after errors, so the
    /// returned diagnostics cover the whole file.
    pub fn assemble(&mut self) -> Result<(), Diagnostics> {
        self.symbols = SymbolTable::new();
        self.image = None;
        let mut diags = Vec::new();

        self.state = AsmState::Scanning;
        let mut lines = Vec::new();
        for item in Scanner::new(&self.source).lines() {
            match item {
                Ok(line) => lines.push(line),
                Err(e) => {
                    diags.push(e.diagnostic);
                    lines.extend(e.partial);
                }
            }
        }
        debug!(lines = lines.len(), syntax_errors = diags.len(), "scanned source");

        self.state = AsmState::Pass1;
        let statements = pass1(&lines, &self.target, &mut self.symbols, &mut diags);
        debug!(
            instructions = statements.len(),
            symbols = self.symbols.len(),
            "pass 1 complete"
        );

        self.state = AsmState::Pass2;
        let image = pass2(&statements, &self.symbols, &self.target, &mut diags);
        debug!(words = image.len(), "pass 2 complete");

        diags.sort_by_key(|d| d.line);
        self.diagnostics = diags;
        if self.diagnostics.is_empty() {
            self.image = Some(image);
            self.state = AsmState::Assembled;
            Ok(())
        } else {
            warn!(count = self.diagnostics.len(), "assembly failed");
            self.state = AsmState::Failed;
            Err(Diagnostics(self.diagnostics.clone()))
        }
    }
}

/// Assemble `source` for a stock KCPSM3.
pub fn assemble(source: &str) -> Result<ProgramImage, Diagnostics> {
    let mut asm = Assembler::default();
    asm.set_source(source);
    asm.assemble()?;
    Ok(asm.into_image().unwrap_or_default())
}

fn pass1(
    lines: &[ScannedLine<'_>],
    target: &TargetConfig,
    symbols: &mut SymbolTable,
    diags: &mut Vec<Diagnostic>,
) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut address = 0usize;
    let mut overflow_reported = false;

    for line in lines {
        if let Some(label) = &line.label {
            let value = SymbolValue::Address(u16::try_from(address).unwrap_or(u16::MAX));
            if let Err(e) = symbols.define(label, value, line.number) {
                diags.push(Diagnostic::new(line.number, e));
            }
        }

        let Some(mnemonic) = line.mnemonic.as_deref() else {
            continue;
        };
        if let Some(dir) = instructions::directive(mnemonic) {
            if let Err(e) = directive(dir, mnemonic, line, symbols) {
                diags.push(Diagnostic::new(line.number, e));
            }
            continue;
        }
        let Some(desc) = instructions::lookup(mnemonic) else {
            diags.push(Diagnostic::new(
                line.number,
                AsmError::UnknownMnemonic { token: mnemonic.to_string() },
            ));
            continue;
        };

        if address >= target.program_words && !overflow_reported {
            diags.push(Diagnostic::new(
                line.number,
                AsmError::ProgramTooLarge { address, capacity: target.program_words },
            ));
            overflow_reported = true;
        }
        statements.push(Statement {
            desc,
            operands: line.operands.clone(),
            address,
            line: line.number,
        });
        address += 1;
    }
    statements
}

fn directive(
    dir: Directive,
    mnemonic: &str,
    line: &ScannedLine<'_>,
    symbols: &mut SymbolTable,
) -> Result<(), AsmError> {
    let [first, second] = line.operands.as_slice() else {
        let expected = match dir {
            Directive::Constant => "name, value",
            Directive::Namereg => "sX, name",
        };
        return Err(AsmError::AmbiguousOperandShape {
            mnemonic: mnemonic.to_ascii_uppercase(),
            expected: expected.to_string(),
            got: format!("`{}`", line.operands.join(", ")),
        });
    };
    let bad_name = |reason: String| AsmError::syntax(format!("bad symbol name: {reason}"));

    match dir {
        Directive::Constant => {
            validate_name(first).map_err(bad_name)?;
            if !is_hex_literal(second) {
                return Err(AsmError::Operand {
                    expected: "hex constant".into(),
                    got: second.clone(),
                });
            }
            let value = u32::from_str_radix(second, 16)
                .ok()
                .filter(|v| *v <= MAX_CONSTANT)
                .ok_or_else(|| AsmError::OperandRange {
                    field: "constant",
                    got: second.clone(),
                    max: MAX_CONSTANT,
                })?;
            symbols.define(first, SymbolValue::Constant(value as u16), line.number)
        }
        Directive::Namereg => {
            let reg = register_index(first)?;
            validate_name(second).map_err(bad_name)?;
            symbols.define(second, SymbolValue::Register(reg), line.number)
        }
    }
}

fn pass2(
    statements: &[Statement],
    symbols: &SymbolTable,
    target: &TargetConfig,
    diags: &mut Vec<Diagnostic>,
) -> ProgramImage {
    let mut image = ProgramImage::new();
    for st in statements {
        let parser = OperandParser::new(symbols, target, st.line);
        let built = st
            .desc
            .select(&st.operands, |t| parser.is_register(t))
            .and_then(|shape| parser.build(st.desc, shape, &st.operands));
        match built {
            // Slots after a failed one are not stored; the image is dropped anyway.
            Ok(op) if st.address == image.len() && st.address < target.program_words => {
                let instr = Instruction::new(op, st.address as u16, st.line);
                trace!("{:03X}: {:05X}  {}", instr.address, instr.hexcode, fmt_op(&op));
                image.push(instr);
            }
            Ok(_) => {}
            Err(e) => diags.push(Diagnostic::new(st.line, e)),
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_result() {
        let mut asm = Assembler::default();
        assert_eq!(asm.state(), AsmState::Idle);
        asm.set_source("LOAD s0, 01\n");
        asm.assemble().unwrap();
        assert_eq!(asm.state(), AsmState::Assembled);
        assert_eq!(asm.image().map(|i| i.len()), Some(1));

        asm.set_source("LOAD s0, 100\n");
        assert!(asm.assemble().is_err());
        assert_eq!(asm.state(), AsmState::Failed);
        assert!(asm.image().is_none());
        assert_eq!(asm.diagnostics().len(), 1);
    }

    #[test]
    fn directives_define_symbols() {
        let mut asm = Assembler::default();
        asm.set_source("CONSTANT led_port, 80\nNAMEREG s5, counter\nOUTPUT counter, led_port\n");
        asm.assemble().unwrap();
        assert_eq!(asm.symbols().register_alias("counter"), Some(5));
        let word = asm.image().unwrap().get(0).unwrap().hexcode;
        assert_eq!(word, 0x2C580);
    }
}
