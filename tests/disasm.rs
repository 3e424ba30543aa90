use picoasm::decoder::Decoder;
use picoasm::disasm::fmt_op;
use picoasm::isa::kcpsm3::Kcpsm3Decoder;
use picoasm::{assemble, Op, WORD_MASK};

fn decodable() -> Vec<(u32, Op)> {
    let dec = Kcpsm3Decoder::new();
    (0..=WORD_MASK).filter_map(|w| dec.decode(w).map(|op| (w, op))).collect()
}

#[test]
fn decode_then_encode_is_identity() {
    let all = decodable();
    for &(w, op) in &all {
        assert_eq!(op.encode(), w, "{w:05X} decoded as {op:?}");
    }
    // 12 sX,kk/pp forms, 2 sX,ss, 14 sX,sY, 10 shifts, JUMP/CALL with and
    // without conditions, 5 RETURNs, RETURNI, interrupt control and events.
    let expected = 12 * 16 * 256 + 2 * 16 * 64 + 14 * 256 + 10 * 16 + 10 * 1024 + 5 + 6;
    assert_eq!(all.len(), expected);
}

#[test]
fn non_canonical_words_rejected() {
    let dec = Kcpsm3Decoder::new();
    assert!(dec.decode(0x01001).is_none()); // LOAD sX,sY with low nibble set
    assert!(dec.decode(0x06040).is_none()); // FETCH beyond the 64-byte scratchpad
    assert!(dec.decode(0x20001).is_none()); // unused shift code
    assert!(dec.decode(0x2A001).is_none()); // RETURN with stray bits
    assert!(dec.decode(0x02000).is_none()); // unused selector
    assert!(dec.decode(0x40000).is_none()); // wider than 18 bits
}

#[test]
fn rendered_text_reassembles_to_same_word() {
    let all = decodable();
    for chunk in all.chunks(1024) {
        let src: String = chunk.iter().map(|(_, op)| fmt_op(op) + "\n").collect();
        let img = assemble(&src).unwrap_or_else(|d| panic!("{d}"));
        let words: Vec<u32> = img.words().map(|(_, w)| w).collect();
        let expected: Vec<u32> = chunk.iter().map(|&(w, _)| w).collect();
        assert_eq!(words, expected);
    }
}

#[test]
fn rendering() {
    let dec = Kcpsm3Decoder::new();
    let text = |w| fmt_op(&dec.decode(w).unwrap());
    assert_eq!(text(0x18005), "ADD s0, 05");
    assert_eq!(text(0x01010), "LOAD s0, s1");
    assert_eq!(text(0x05340), "INPUT s3, (s4)");
    assert_eq!(text(0x357FF), "JUMP NZ, 3FF");
    assert_eq!(text(0x34000), "JUMP 000");
    assert_eq!(text(0x2B000), "RETURN Z");
    assert_eq!(text(0x38001), "RETURNI ENABLE");
    assert_eq!(text(0x3C001), "ENABLE INTERRUPT");
    assert_eq!(text(0x2010E), "SR0 s1");
}
