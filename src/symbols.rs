use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AsmError;
use crate::instructions::is_reserved;
use crate::operand::{is_hex_literal, register_shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SymbolValue {
    /// Label: program address of the next instruction.
    Address(u16),
    /// `CONSTANT name, value`
    Constant(u16),
    /// `NAMEREG sX, name`
    Register(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub value: SymbolValue,
    pub line: usize,
}

/// Labels, constants and register aliases share one case-sensitive namespace.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    entries: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, value: SymbolValue, line: usize) -> Result<(), AsmError> {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(prev) => Err(AsmError::DuplicateLabel {
                name: name.to_string(),
                first_line: prev.get().line,
                second_line: line,
            }),
            Entry::Vacant(slot) => {
                slot.insert(Symbol { value, line });
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name)
    }

    pub fn resolve(&self, name: &str, referencing_line: usize) -> Result<SymbolValue, AsmError> {
        self.entries
            .get(name)
            .map(|s| s.value)
            .ok_or_else(|| AsmError::UndefinedLabel {
                name: name.to_string(),
                referencing_line,
            })
    }

    pub fn register_alias(&self, name: &str) -> Option<u8> {
        match self.entries.get(name)?.value {
            SymbolValue::Register(r) => Some(r),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Check that `name` can be a user symbol. Returns the reason when it cannot.
pub fn validate_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return Err(format!("`{name}` must start with a letter or `_`")),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("`{name}` may only contain letters, digits and `_`"));
    }
    if register_shape(name).is_some() {
        return Err(format!("`{name}` reads as a register"));
    }
    if is_hex_literal(name) {
        return Err(format!("`{name}` reads as a hex number"));
    }
    if is_reserved(name) {
        return Err(format!("`{name}` is a reserved word"));
    }
    Ok(())
}
