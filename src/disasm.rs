use crate::isa::kcpsm3::{Cond, Op};

/// Render an instruction in KCPSM3 source syntax, e.g. `ADD s0, 05`,
/// `JUMP NZ, 3FF`, `INPUT s3, (s4)`. Feeding the text back through the
/// assembler reproduces the same word.
pub fn fmt_op(op: &Op) -> String {
    let mn = op.mnemonic();
    match *op {
        Op::LoadKk { x, kk }
        | Op::AndKk { x, kk }
        | Op::OrKk { x, kk }
        | Op::XorKk { x, kk }
        | Op::TestKk { x, kk }
        | Op::CompareKk { x, kk }
        | Op::AddKk { x, kk }
        | Op::AddcyKk { x, kk }
        | Op::SubKk { x, kk }
        | Op::SubcyKk { x, kk } => format!("{mn} s{x:X}, {kk:02X}"),
        Op::LoadSy { x, y }
        | Op::AndSy { x, y }
        | Op::OrSy { x, y }
        | Op::XorSy { x, y }
        | Op::TestSy { x, y }
        | Op::CompareSy { x, y }
        | Op::AddSy { x, y }
        | Op::AddcySy { x, y }
        | Op::SubSy { x, y }
        | Op::SubcySy { x, y } => format!("{mn} s{x:X}, s{y:X}"),

        Op::Sr0 { x }
        | Op::Sr1 { x }
        | Op::Srx { x }
        | Op::Sra { x }
        | Op::Rr { x }
        | Op::Sl0 { x }
        | Op::Sl1 { x }
        | Op::Slx { x }
        | Op::Sla { x }
        | Op::Rl { x } => format!("{mn} s{x:X}"),

        Op::InputPp { x, pp } | Op::OutputPp { x, pp } => format!("{mn} s{x:X}, {pp:02X}"),
        Op::StoreSs { x, ss } | Op::FetchSs { x, ss } => format!("{mn} s{x:X}, {ss:02X}"),
        Op::InputSy { x, y }
        | Op::OutputSy { x, y }
        | Op::StoreSy { x, y }
        | Op::FetchSy { x, y } => format!("{mn} s{x:X}, (s{y:X})"),

        Op::Jump { addr } | Op::Call { addr } => format!("{mn} {addr:03X}"),
        Op::JumpZ { addr } | Op::CallZ { addr } => branch(mn, Cond::Z, addr),
        Op::JumpNz { addr } | Op::CallNz { addr } => branch(mn, Cond::NZ, addr),
        Op::JumpC { addr } | Op::CallC { addr } => branch(mn, Cond::C, addr),
        Op::JumpNc { addr } | Op::CallNc { addr } => branch(mn, Cond::NC, addr),

        Op::Return => mn.to_string(),
        Op::ReturnZ => format!("{mn} {}", Cond::Z.as_str()),
        Op::ReturnNz => format!("{mn} {}", Cond::NZ.as_str()),
        Op::ReturnC => format!("{mn} {}", Cond::C.as_str()),
        Op::ReturnNc => format!("{mn} {}", Cond::NC.as_str()),

        Op::ReturniEnable => format!("{mn} ENABLE"),
        Op::ReturniDisable => format!("{mn} DISABLE"),
        Op::EnableInterrupt | Op::DisableInterrupt => format!("{mn} INTERRUPT"),

        Op::ResetEvent | Op::InterruptEvent => mn.to_string(),
    }
}

fn branch(mn: &str, cond: Cond, addr: u16) -> String {
    format!("{} {}, {:03X}", mn, cond.as_str(), addr)
}
