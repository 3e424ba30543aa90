use picoasm::symbols::SymbolValue;
use picoasm::{assemble, AsmError, Assembler, DiagnosticKind};

#[test]
fn forward_reference_resolves() {
    let img = assemble("JUMP done\nLOAD s0, 00\ndone: RETURN\n").unwrap();
    assert_eq!(img.get(0).unwrap().hexcode, 0x34002);
}

#[test]
fn undefined_label_reported_once_with_referencing_line() {
    let diags = assemble("LOAD s0, 00\nJUMP missing\nRETURN\n").unwrap_err();
    assert_eq!(diags.len(), 1);
    let d = diags.iter().next().unwrap();
    assert_eq!(d.line, 2);
    assert_eq!(
        d.error,
        AsmError::UndefinedLabel { name: "missing".into(), referencing_line: 2 }
    );
}

#[test]
fn duplicate_label_names_both_lines_and_passes_finish() {
    let src = "start: LOAD s0, 00\nstart: ADD s0, 01\nJUMP start\nCALL nowhere\n";
    let mut asm = Assembler::default();
    asm.set_source(src);
    let diags = asm.assemble().unwrap_err();

    let dup: Vec<_> = diags.of_kind(DiagnosticKind::DuplicateLabel).collect();
    assert_eq!(dup.len(), 1);
    assert_eq!(dup[0].line, 2);
    assert_eq!(
        dup[0].error,
        AsmError::DuplicateLabel { name: "start".into(), first_line: 1, second_line: 2 }
    );
    // Pass 2 still ran and found the later problem.
    assert_eq!(diags.of_kind(DiagnosticKind::UndefinedLabel).count(), 1);
    // The first definition wins.
    assert_eq!(asm.symbols().get("start").unwrap().value, SymbolValue::Address(0));
}

#[test]
fn colon_less_labels() {
    let img = assemble("top LOAD s0, 00\n    JUMP top\n").unwrap();
    assert_eq!(img.get(1).unwrap().hexcode, 0x34000);
}

#[test]
fn label_on_its_own_line_marks_next_instruction() {
    let mut asm = Assembler::default();
    asm.set_source("LOAD s0, 00\nnext:\n; comment\nRETURN\nJUMP next\n");
    asm.assemble().unwrap();
    assert_eq!(asm.symbols().get("next").unwrap().value, SymbolValue::Address(1));
    assert_eq!(asm.image().unwrap().get(2).unwrap().hexcode, 0x34001);
}

#[test]
fn labels_are_case_sensitive() {
    let diags = assemble("Loop: RETURN\nJUMP loop\n").unwrap_err();
    assert_eq!(diags.of_kind(DiagnosticKind::UndefinedLabel).count(), 1);
}

#[test]
fn reserved_and_register_shaped_labels_rejected() {
    for src in ["s1: RETURN\n", "add: RETURN\n", "NZ: RETURN\n", "CAFE: RETURN\n"] {
        let diags = assemble(src).unwrap_err();
        assert_eq!(diags.of_kind(DiagnosticKind::Syntax).count(), 1, "{src}");
    }
}

#[test]
fn constants_and_register_aliases() {
    let src = "\
CONSTANT uart_data, 0E
CONSTANT delay, 2A
NAMEREG sB, count
        LOAD count, delay
        OUTPUT count, uart_data
        INPUT s0, (count)
        ADD count, s1
        ADD s1, count
";
    let mut asm = Assembler::default();
    asm.set_source(src);
    asm.assemble().unwrap();
    let words: Vec<u32> = asm.image().unwrap().words().map(|(_, w)| w).collect();
    assert_eq!(words, vec![0x00B2A, 0x2CB0E, 0x050B0, 0x19B10, 0x191B0]);
    assert_eq!(asm.symbols().get("delay").unwrap().value, SymbolValue::Constant(0x2A));
}

#[test]
fn constant_range_is_checked_where_used() {
    let diags = assemble("CONSTANT big, 3FF\nLOAD s0, big\nJUMP big\n").unwrap_err();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.iter().next().unwrap().line, 2);
    assert_eq!(diags.iter().next().unwrap().kind(), DiagnosticKind::OperandRange);
}

#[test]
fn bad_directives() {
    let diags = assemble("CONSTANT x1, 400\nCONSTANT y\nNAMEREG q, name\nNAMEREG s1, s2\n").unwrap_err();
    let kinds: Vec<_> = diags.iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::OperandRange,
            DiagnosticKind::AmbiguousOperandShape,
            DiagnosticKind::Operand,
            DiagnosticKind::Syntax,
        ]
    );
}

#[test]
fn label_on_malformed_line_is_still_defined() {
    let diags = assemble("loop: LOAD s0,, 05\nJUMP loop\n").unwrap_err();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.of_kind(DiagnosticKind::Syntax).count(), 1);
    assert_eq!(diags.iter().next().unwrap().line, 1);

    let diags = assemble("again LOAD s0 05\nCALL again\n").unwrap_err();
    assert_eq!(diags.len(), 1);
}
