use crate::error::{AsmError, Diagnostic};
use crate::instructions::is_mnemonic_or_directive;
use crate::symbols::validate_name;

/// One source line split into its parts. Comment-only and blank lines have
/// neither label nor mnemonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine<'a> {
    pub number: usize, // 1-based
    pub raw: &'a str,
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub operands: Vec<String>,
}

/// Line-oriented scanner over KCPSM3 source text.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    src: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src }
    }

    /// Lazily scan every line. Each call starts again from the first line.
    pub fn lines(&self) -> Lines<'a> {
        Lines {
            inner: self.src.lines().enumerate(),
        }
    }
}

/// A line that failed to scan. When a valid label came before the error the
/// label survives in `partial`, so references to it still resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError<'a> {
    pub diagnostic: Diagnostic,
    pub partial: Option<ScannedLine<'a>>,
}

pub struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Result<ScannedLine<'a>, ScanError<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (idx, raw) = self.inner.next()?;
        Some(scan_line(idx + 1, raw))
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '(' | ')' | ',' | ':') || c.is_whitespace()
}

fn split_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(p) => (&s[..p], s[p..].trim_start()),
        None => (s, ""),
    }
}

pub fn scan_line(number: usize, raw: &str) -> Result<ScannedLine<'_>, ScanError<'_>> {
    let mut line = ScannedLine {
        number,
        raw,
        label: None,
        mnemonic: None,
        operands: Vec::new(),
    };
    match fill(&mut line) {
        Ok(()) => Ok(line),
        Err(error) => {
            let partial = line
                .label
                .take()
                .filter(|name| validate_name(name).is_ok())
                .map(|name| ScannedLine {
                    number,
                    raw,
                    label: Some(name),
                    mnemonic: None,
                    operands: Vec::new(),
                });
            Err(ScanError {
                diagnostic: Diagnostic::new(number, error),
                partial,
            })
        }
    }
}

fn fill(line: &mut ScannedLine<'_>) -> Result<(), AsmError> {
    let raw = line.raw;
    let code = match raw.find(';') {
        Some(p) => &raw[..p],
        None => raw,
    };

    let mut rest = code.trim();
    if let Some(p) = rest.find(':') {
        let name = rest[..p].trim();
        if name.is_empty() {
            return Err(AsmError::syntax("missing label name before `:`"));
        }
        if name.contains(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')')) {
            return Err(AsmError::syntax(format!("`:` must follow a label name, found `{name}:`")));
        }
        line.label = Some(name.to_string());
        rest = rest[p + 1..].trim();
        if rest.contains(':') {
            return Err(AsmError::syntax("unexpected second `:`"));
        }
    }
    if rest.is_empty() {
        return check_label(line);
    }

    let (mut mnemonic, mut tail) = split_word(rest);
    if line.label.is_none() && !is_mnemonic_or_directive(mnemonic) && !tail.is_empty() {
        // Colon-less label: `LOOP ADD s0, 01`
        let (second, after) = split_word(tail);
        if is_mnemonic_or_directive(second) {
            line.label = Some(mnemonic.to_string());
            mnemonic = second;
            tail = after;
        }
    }
    if let Some(bad) = mnemonic.chars().chain(tail.chars()).find(|&c| !is_token_char(c)) {
        return Err(AsmError::syntax(format!("unexpected character `{bad}`")));
    }
    line.mnemonic = Some(mnemonic.to_string());

    if !tail.is_empty() {
        line.operands = tail.split(',').map(operand).collect::<Result<_, _>>()?;
    }
    check_label(line)
}

fn check_label(line: &ScannedLine<'_>) -> Result<(), AsmError> {
    if let Some(name) = &line.label {
        validate_name(name).map_err(|reason| AsmError::syntax(format!("bad label: {reason}")))?;
    }
    Ok(())
}

fn operand(piece: &str) -> Result<String, AsmError> {
    let t = piece.trim();
    if t.is_empty() {
        return Err(AsmError::syntax("empty operand"));
    }
    if let Some(body) = t.strip_prefix('(') {
        let inner = body
            .strip_suffix(')')
            .ok_or_else(|| AsmError::syntax(format!("unbalanced parenthesis in `{t}`")))?;
        let inner: String = inner.split_whitespace().collect();
        if inner.is_empty() || inner.contains(|c: char| c == '(' || c == ')') {
            return Err(AsmError::syntax(format!("malformed indirect operand `{t}`")));
        }
        return Ok(format!("({inner})"));
    }
    if t.contains(|c: char| c == '(' || c == ')') {
        return Err(AsmError::syntax(format!("unbalanced parenthesis in `{t}`")));
    }
    if t.contains(char::is_whitespace) {
        return Err(AsmError::syntax(format!("missing `,` in `{t}`")));
    }
    Ok(t.to_string())
}
