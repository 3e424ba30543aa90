use picoasm::{assemble, AsmError, DiagnosticKind};

fn first_error(src: &str) -> AsmError {
    let diags = assemble(src).unwrap_err();
    assert_eq!(diags.len(), 1, "{src}: {diags}");
    diags.iter().next().unwrap().error.clone()
}

#[test]
fn every_register_name_parses() {
    for r in 0..16u32 {
        let lower = assemble(&format!("LOAD s{r:x}, 00")).unwrap();
        let upper = assemble(&format!("LOAD S{r:X}, 00")).unwrap();
        assert_eq!(lower.get(0).unwrap().hexcode, r << 8);
        assert_eq!(upper.get(0).unwrap().hexcode, r << 8);
    }
}

#[test]
fn out_of_range_register_tokens() {
    for src in ["ADD s0, s99", "ADD s10, 01", "SR0 s1F", "INPUT s0, (s10)"] {
        assert!(
            matches!(first_error(src), AsmError::OperandRange { field: "register", .. }),
            "{src}"
        );
    }
}

#[test]
fn value_in_register_slot() {
    assert!(matches!(first_error("LOAD 05, 05"), AsmError::Operand { .. }));
    assert!(matches!(first_error("SL0 12"), AsmError::Operand { .. }));
}

#[test]
fn register_in_value_slot() {
    assert!(matches!(first_error("JUMP s3"), AsmError::Operand { .. }));
    assert!(matches!(first_error("CALL NZ, (s1)"), AsmError::Operand { .. }));
}

#[test]
fn field_widths() {
    assert!(assemble("LOAD s0, FF").is_ok());
    assert!(matches!(first_error("LOAD s0, 100"), AsmError::OperandRange { max: 0xFF, .. }));
    assert!(matches!(first_error("OUTPUT s0, 1FF"), AsmError::OperandRange { field: "port", .. }));
    assert!(assemble("STORE s0, 3F").is_ok());
    assert!(matches!(
        first_error("FETCH s0, 40"),
        AsmError::OperandRange { field: "scratchpad address", max: 0x3F, .. }
    ));
    assert!(matches!(first_error("CALL 400"), AsmError::OperandRange { field: "address", .. }));
}

#[test]
fn conditions_and_keywords() {
    assert!(matches!(first_error("JUMP ZZ, 000"), AsmError::Operand { .. }));
    assert!(matches!(first_error("RETURN P"), AsmError::Operand { .. }));
    assert!(matches!(first_error("RETURNI MAYBE"), AsmError::Operand { .. }));
    assert!(matches!(first_error("ENABLE INTERRUPTS"), AsmError::Operand { .. }));
}

#[test]
fn operand_count_mismatch() {
    for src in ["RETURN Z, 000", "ADD s0", "JUMP", "SRA", "DISABLE"] {
        let diags = assemble(src).unwrap_err();
        assert_eq!(
            diags.of_kind(DiagnosticKind::AmbiguousOperandShape).count(),
            1,
            "{src}"
        );
    }
}

#[test]
fn indirect_operand_tolerates_spaces() {
    let img = assemble("OUTPUT s1, ( s2 )").unwrap();
    assert_eq!(img.get(0).unwrap().hexcode, 0x2D120);
}

#[test]
fn malformed_lines_are_syntax_errors() {
    for src in ["LOAD s0,, 05", "LOAD s0 05", "INPUT s0, (s1", "JUMP #10", ": RETURN"] {
        assert!(matches!(first_error(src), AsmError::Syntax { .. }), "{src}");
    }
}

#[test]
fn condition_without_target_is_not_an_address() {
    for src in ["JUMP C", "CALL C", "JUMP nz", "CALL Z"] {
        assert!(matches!(first_error(src), AsmError::Operand { .. }), "{src}");
    }
    assert!(matches!(first_error("LOAD s0, C"), AsmError::Operand { .. }));
    assert_eq!(assemble("JUMP C, 00C").unwrap().get(0).unwrap().hexcode, 0x3580C);
    assert_eq!(assemble("LOAD s0, 0C").unwrap().get(0).unwrap().hexcode, 0x0000C);
}
