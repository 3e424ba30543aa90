use picoasm::{assemble, AsmState, Assembler, DiagnosticKind, Op, TargetConfig};

#[test]
fn loop_example() {
    let img = assemble("LOOP: ADD s0, 05\nJUMP LOOP\n").unwrap();
    assert_eq!(img.len(), 2);

    let first = img.get(0).unwrap();
    assert_eq!(first.op, Op::AddKk { x: 0, kk: 5 });
    assert_eq!(first.hexcode, 0x18005);
    assert_eq!(first.source_line, 1);

    let second = img.get(1).unwrap();
    assert_eq!(second.op, Op::Jump { addr: 0 });
    assert_eq!(second.hexcode, 0x34000);
    assert_eq!(second.source_line, 2);
}

#[test]
fn bad_register_gives_one_range_error_and_no_image() {
    let mut asm = Assembler::default();
    asm.set_source("ADD s0, s99\n");
    let diags = asm.assemble().unwrap_err();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags.of_kind(DiagnosticKind::OperandRange).count(), 1);
    assert_eq!(diags.iter().next().unwrap().line, 1);
    assert!(asm.image().is_none());
}

#[test]
fn empty_source_is_empty_success() {
    let img = assemble("").unwrap();
    assert!(img.is_empty());
    let img = assemble("; nothing but comments\n\n   \n").unwrap();
    assert!(img.is_empty());
}

#[test]
fn instructions_fill_contiguous_slots_in_order() {
    let src = "\
; setup
start:  LOAD s0, 00
        LOAD s1, 01

loop:   ADD s0, s1     ; accumulate
        COMPARE s0, 40
        JUMP NZ, loop
        RETURN
";
    let img = assemble(src).unwrap();
    assert_eq!(img.len(), 6);
    let addrs: Vec<u16> = img.iter().map(|i| i.address).collect();
    assert_eq!(addrs, vec![0, 1, 2, 3, 4, 5]);
    let lines: Vec<usize> = img.iter().map(|i| i.source_line).collect();
    assert_eq!(lines, vec![2, 3, 5, 6, 7, 8]);
    assert_eq!(img.get(4).unwrap().hexcode, 0x35402);
}

#[test]
fn every_error_is_reported_in_line_order() {
    let src = "LOAD s0, 100\nMOV s0, s1\nADD s0\nLOAD s0, 01 $\nJUMP nowhere\n";
    let mut asm = Assembler::default();
    asm.set_source(src);
    let diags = asm.assemble().unwrap_err();
    let kinds: Vec<(usize, DiagnosticKind)> = diags.iter().map(|d| (d.line, d.kind())).collect();
    assert_eq!(
        kinds,
        vec![
            (1, DiagnosticKind::OperandRange),
            (2, DiagnosticKind::UnknownMnemonic),
            (3, DiagnosticKind::AmbiguousOperandShape),
            (4, DiagnosticKind::Syntax),
            (5, DiagnosticKind::UndefinedLabel),
        ]
    );
    assert_eq!(asm.state(), AsmState::Failed);
}

#[test]
fn unknown_mnemonic_takes_no_slot() {
    let mut asm = Assembler::default();
    asm.set_source("MOV s0, s1\nhere: JUMP here\n");
    assert!(asm.assemble().is_err());
    let here = asm.symbols().get("here").map(|s| s.value);
    assert_eq!(here, Some(picoasm::symbols::SymbolValue::Address(0)));
}

#[test]
fn program_too_large_reported_once() {
    let target = TargetConfig { program_words: 4, scratchpad_bytes: 64 };
    let mut asm = Assembler::new(target);
    asm.set_source("LOAD s0, 00\n".repeat(7));
    let diags = asm.assemble().unwrap_err();
    assert_eq!(diags.len(), 1);
    let d = diags.iter().next().unwrap();
    assert_eq!(d.kind(), DiagnosticKind::ProgramTooLarge);
    assert_eq!(d.line, 5);
}

#[test]
fn smaller_target_narrows_address_range() {
    let target = TargetConfig { program_words: 256, scratchpad_bytes: 64 };
    let mut asm = Assembler::new(target);
    asm.set_source("JUMP 100\n");
    let diags = asm.assemble().unwrap_err();
    assert_eq!(diags.of_kind(DiagnosticKind::OperandRange).count(), 1);
}

#[test]
fn reassembling_after_set_source_starts_fresh() {
    let mut asm = Assembler::default();
    asm.set_source("one: LOAD s0, 00\ntwo: LOAD s0, 00\n");
    asm.assemble().unwrap();
    assert_eq!(asm.symbols().len(), 2);

    asm.set_source("one: RETURN\n");
    assert_eq!(asm.state(), AsmState::Idle);
    asm.assemble().unwrap();
    assert_eq!(asm.symbols().len(), 1);
    assert_eq!(asm.image().unwrap().len(), 1);
}

#[test]
fn diagnostics_serialize_with_kind_and_line() {
    let diags = assemble("JUMP missing\n").unwrap_err();
    let json = serde_json::to_value(&diags).unwrap();
    assert_eq!(json[0]["line"], 1);
    assert_eq!(json[0]["kind"], "UndefinedLabel");
    assert_eq!(json[0]["message"], "undefined label `missing`");
}
