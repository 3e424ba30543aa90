use std::fmt::Write as _;

use crate::image::ProgramImage;

/// Interleave the source with the address and word of each instruction.
pub fn merge_listing(source: &str, source_name: &str, image: &ProgramImage) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "PicoBlaze assembler  Version {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(out, "Source File: {source_name}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Line  Addr Instr  Source Code");

    let mut next = image.iter().peekable();
    for (idx, text) in source.lines().enumerate() {
        let number = idx + 1;
        match next.next_if(|i| i.source_line == number) {
            Some(instr) => {
                let _ = writeln!(
                    out,
                    "{number:4}  {:03x}  {:05x}  {text}",
                    instr.address, instr.hexcode
                );
            }
            None => {
                let _ = writeln!(out, "{number:4}              {text}");
            }
        }
    }
    out
}
