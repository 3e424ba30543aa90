use std::fmt;

use serde::Serialize;

/// Everything that can go wrong with one source line.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("syntax error: {reason}")]
    Syntax { reason: String },
    #[error("`{name}` already defined on line {first_line}")]
    DuplicateLabel {
        name: String,
        first_line: usize,
        second_line: usize,
    },
    #[error("undefined label `{name}`")]
    UndefinedLabel { name: String, referencing_line: usize },
    #[error("unknown mnemonic `{token}`")]
    UnknownMnemonic { token: String },
    #[error("`{mnemonic}` takes {expected}, got {got}")]
    AmbiguousOperandShape {
        mnemonic: String,
        expected: String,
        got: String,
    },
    #[error("expected {expected}, got `{got}`")]
    Operand { expected: String, got: String },
    #[error("{field} `{got}` out of range (max {max:#X})")]
    OperandRange {
        field: &'static str,
        got: String,
        max: u32,
    },
    #[error("program does not fit: address {address:#05X} beyond {capacity} words")]
    ProgramTooLarge { address: usize, capacity: usize },
}

impl AsmError {
    pub fn syntax(reason: impl Into<String>) -> Self {
        AsmError::Syntax { reason: reason.into() }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            AsmError::Syntax { .. } => DiagnosticKind::Syntax,
            AsmError::DuplicateLabel { .. } => DiagnosticKind::DuplicateLabel,
            AsmError::UndefinedLabel { .. } => DiagnosticKind::UndefinedLabel,
            AsmError::UnknownMnemonic { .. } => DiagnosticKind::UnknownMnemonic,
            AsmError::AmbiguousOperandShape { .. } => DiagnosticKind::AmbiguousOperandShape,
            AsmError::Operand { .. } => DiagnosticKind::Operand,
            AsmError::OperandRange { .. } => DiagnosticKind::OperandRange,
            AsmError::ProgramTooLarge { .. } => DiagnosticKind::ProgramTooLarge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    Syntax,
    DuplicateLabel,
    UndefinedLabel,
    UnknownMnemonic,
    AmbiguousOperandShape,
    Operand,
    OperandRange,
    ProgramTooLarge,
}

/// An [`AsmError`] pinned to the 1-based source line that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: AsmError,
}

impl Diagnostic {
    pub fn new(line: usize, error: AsmError) -> Self {
        Self { line, error }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.error.kind()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Diagnostic", 3)?;
        s.serialize_field("line", &self.line)?;
        s.serialize_field("kind", &self.kind())?;
        s.serialize_field("message", &self.message())?;
        s.end()
    }
}

/// Every diagnostic of a failed assembly, in line order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(move |d| d.kind() == kind)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
