use lazy_static::lazy_static;

use super::target::Target;

/// Branch condition attached to a control-flow instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Cond {
    Always,
    Z,
    Nz,
    C,
    Nc,
}

/// Operation performed by a primary-table instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    Nop,
    Stop,
    Halt,
    Ld8,
    Ld16,
    LdHlSpR8,
    Push,
    Pop,
    Jp,
    Jr,
    Call,
    Ret,
    Reti,
    Rst,
    Di,
    Ei,
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
    AddHl,
    AddSp,
    Inc,
    Dec,
    Inc16,
    Dec16,
    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Prefix,
}

/// One statically-defined instruction table entry, keyed by opcode byte.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Instruction {
    pub kind: Kind,
    pub dst: Target,
    pub src: Target,
    pub cond: Cond,
}

/// Operation performed by an extended (CB-prefixed) instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CbOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Bit,
    Res,
    Set,
}

/// Extended-table entry: operation, operand, and bit index (Bit/Res/Set).
#[derive(Clone, Copy, Debug)]
pub(crate) struct CbInstruction {
    pub op: CbOp,
    pub target: Target,
    pub bit: u8,
}

/// Register operand order used by the regular opcode blocks:
/// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=(HL), 7=A.
const REG8: [Target; 8] = [
    Target::B,
    Target::C,
    Target::D,
    Target::E,
    Target::H,
    Target::L,
    Target::HLInd,
    Target::A,
];

lazy_static! {
    /// Primary opcode table. Holes (the documented invalid opcodes) stay
    /// `None` and surface as fatal decode errors.
    pub(crate) static ref OPCODES: [Option<Instruction>; 256] = build_opcode_table();

    /// Extended opcode table behind the 0xCB prefix. Every byte decodes.
    pub(crate) static ref CB_OPCODES: [CbInstruction; 256] = build_cb_table();
}

fn build_opcode_table() -> [Option<Instruction>; 256] {
    use self::Cond::{Always, Nc, Nz};
    use self::Kind::*;
    type T = Target;

    let def = |kind: Kind, dst: Target, src: Target, cond: Cond| {
        Some(Instruction {
            kind,
            dst,
            src,
            cond,
        })
    };

    let mut t: [Option<Instruction>; 256] = [None; 256];

    // 0x00-0x3F: mixed loads, 16-bit arithmetic, rotates on A, relative jumps.
    t[0x00] = def(Nop, T::None, T::None, Always);
    t[0x01] = def(Ld16, T::BC, T::D16, Always);
    t[0x02] = def(Ld8, T::BCInd, T::A, Always);
    t[0x03] = def(Inc16, T::BC, T::None, Always);
    t[0x04] = def(Inc, T::B, T::None, Always);
    t[0x05] = def(Dec, T::B, T::None, Always);
    t[0x06] = def(Ld8, T::B, T::D8, Always);
    t[0x07] = def(Rlca, T::None, T::None, Always);
    t[0x08] = def(Ld16, T::D16Ind, T::SP, Always);
    t[0x09] = def(AddHl, T::HL, T::BC, Always);
    t[0x0A] = def(Ld8, T::A, T::BCInd, Always);
    t[0x0B] = def(Dec16, T::BC, T::None, Always);
    t[0x0C] = def(Inc, T::C, T::None, Always);
    t[0x0D] = def(Dec, T::C, T::None, Always);
    t[0x0E] = def(Ld8, T::C, T::D8, Always);
    t[0x0F] = def(Rrca, T::None, T::None, Always);

    // STOP carries a padding byte in its encoding.
    t[0x10] = def(Stop, T::None, T::D8, Always);
    t[0x11] = def(Ld16, T::DE, T::D16, Always);
    t[0x12] = def(Ld8, T::DEInd, T::A, Always);
    t[0x13] = def(Inc16, T::DE, T::None, Always);
    t[0x14] = def(Inc, T::D, T::None, Always);
    t[0x15] = def(Dec, T::D, T::None, Always);
    t[0x16] = def(Ld8, T::D, T::D8, Always);
    t[0x17] = def(Rla, T::None, T::None, Always);
    t[0x18] = def(Jr, T::None, T::R8, Always);
    t[0x19] = def(AddHl, T::HL, T::DE, Always);
    t[0x1A] = def(Ld8, T::A, T::DEInd, Always);
    t[0x1B] = def(Dec16, T::DE, T::None, Always);
    t[0x1C] = def(Inc, T::E, T::None, Always);
    t[0x1D] = def(Dec, T::E, T::None, Always);
    t[0x1E] = def(Ld8, T::E, T::D8, Always);
    t[0x1F] = def(Rra, T::None, T::None, Always);

    t[0x20] = def(Jr, T::None, T::R8, Nz);
    t[0x21] = def(Ld16, T::HL, T::D16, Always);
    t[0x22] = def(Ld8, T::HLIncInd, T::A, Always);
    t[0x23] = def(Inc16, T::HL, T::None, Always);
    t[0x24] = def(Inc, T::H, T::None, Always);
    t[0x25] = def(Dec, T::H, T::None, Always);
    t[0x26] = def(Ld8, T::H, T::D8, Always);
    t[0x27] = def(Daa, T::None, T::None, Always);
    t[0x28] = def(Jr, T::None, T::R8, Cond::Z);
    t[0x29] = def(AddHl, T::HL, T::HL, Always);
    t[0x2A] = def(Ld8, T::A, T::HLIncInd, Always);
    t[0x2B] = def(Dec16, T::HL, T::None, Always);
    t[0x2C] = def(Inc, T::L, T::None, Always);
    t[0x2D] = def(Dec, T::L, T::None, Always);
    t[0x2E] = def(Ld8, T::L, T::D8, Always);
    t[0x2F] = def(Cpl, T::None, T::None, Always);

    t[0x30] = def(Jr, T::None, T::R8, Nc);
    t[0x31] = def(Ld16, T::SP, T::D16, Always);
    t[0x32] = def(Ld8, T::HLDecInd, T::A, Always);
    t[0x33] = def(Inc16, T::SP, T::None, Always);
    t[0x34] = def(Inc, T::HLInd, T::None, Always);
    t[0x35] = def(Dec, T::HLInd, T::None, Always);
    t[0x36] = def(Ld8, T::HLInd, T::D8, Always);
    t[0x37] = def(Scf, T::None, T::None, Always);
    t[0x38] = def(Jr, T::None, T::R8, Cond::C);
    t[0x39] = def(AddHl, T::HL, T::SP, Always);
    t[0x3A] = def(Ld8, T::A, T::HLDecInd, Always);
    t[0x3B] = def(Dec16, T::SP, T::None, Always);
    t[0x3C] = def(Inc, T::A, T::None, Always);
    t[0x3D] = def(Dec, T::A, T::None, Always);
    t[0x3E] = def(Ld8, T::A, T::D8, Always);
    t[0x3F] = def(Ccf, T::None, T::None, Always);

    // 0x40-0x7F: LD r,r' block, with HALT in the (HL),(HL) slot.
    for op in 0x40..=0x7F {
        if op == 0x76 {
            t[op] = def(Halt, T::None, T::None, Always);
            continue;
        }
        let dst = REG8[(op >> 3) & 0x07];
        let src = REG8[op & 0x07];
        t[op] = def(Ld8, dst, src, Always);
    }

    // 0x80-0xBF: 8-bit ALU block on A.
    let alu_ops: [Kind; 8] = [Add, Adc, Sub, Sbc, And, Xor, Or, Cp];
    for op in 0x80..=0xBF {
        t[op] = def(alu_ops[(op >> 3) & 0x07], T::A, REG8[op & 0x07], Always);
    }

    // 0xC0-0xFF: control flow, stack operations, immediate ALU forms,
    // zero-page loads. The gaps (D3, DB, DD, E3, E4, EB, EC, ED, F4, FC,
    // FD) are hardware opcode holes and stay undefined.
    t[0xC0] = def(Ret, T::None, T::None, Nz);
    t[0xC1] = def(Pop, T::BC, T::None, Always);
    t[0xC2] = def(Jp, T::None, T::D16, Nz);
    t[0xC3] = def(Jp, T::None, T::D16, Always);
    t[0xC4] = def(Call, T::None, T::D16, Nz);
    t[0xC5] = def(Push, T::None, T::BC, Always);
    t[0xC6] = def(Add, T::A, T::D8, Always);
    t[0xC7] = def(Rst, T::None, T::None, Always);
    t[0xC8] = def(Ret, T::None, T::None, Cond::Z);
    t[0xC9] = def(Ret, T::None, T::None, Always);
    t[0xCA] = def(Jp, T::None, T::D16, Cond::Z);
    t[0xCB] = def(Prefix, T::None, T::D8, Always);
    t[0xCC] = def(Call, T::None, T::D16, Cond::Z);
    t[0xCD] = def(Call, T::None, T::D16, Always);
    t[0xCE] = def(Adc, T::A, T::D8, Always);
    t[0xCF] = def(Rst, T::None, T::None, Always);

    t[0xD0] = def(Ret, T::None, T::None, Nc);
    t[0xD1] = def(Pop, T::DE, T::None, Always);
    t[0xD2] = def(Jp, T::None, T::D16, Nc);
    t[0xD4] = def(Call, T::None, T::D16, Nc);
    t[0xD5] = def(Push, T::None, T::DE, Always);
    t[0xD6] = def(Sub, T::A, T::D8, Always);
    t[0xD7] = def(Rst, T::None, T::None, Always);
    t[0xD8] = def(Ret, T::None, T::None, Cond::C);
    t[0xD9] = def(Reti, T::None, T::None, Always);
    t[0xDA] = def(Jp, T::None, T::D16, Cond::C);
    t[0xDC] = def(Call, T::None, T::D16, Cond::C);
    t[0xDE] = def(Sbc, T::A, T::D8, Always);
    t[0xDF] = def(Rst, T::None, T::None, Always);

    t[0xE0] = def(Ld8, T::D8Ind, T::A, Always);
    t[0xE1] = def(Pop, T::HL, T::None, Always);
    t[0xE2] = def(Ld8, T::CInd, T::A, Always);
    t[0xE5] = def(Push, T::None, T::HL, Always);
    t[0xE6] = def(And, T::A, T::D8, Always);
    t[0xE7] = def(Rst, T::None, T::None, Always);
    t[0xE8] = def(AddSp, T::SP, T::R8, Always);
    t[0xE9] = def(Jp, T::None, T::HL, Always);
    t[0xEA] = def(Ld8, T::D16Ind, T::A, Always);
    t[0xEE] = def(Xor, T::A, T::D8, Always);
    t[0xEF] = def(Rst, T::None, T::None, Always);

    t[0xF0] = def(Ld8, T::A, T::D8Ind, Always);
    t[0xF1] = def(Pop, T::AF, T::None, Always);
    t[0xF2] = def(Ld8, T::A, T::CInd, Always);
    t[0xF3] = def(Di, T::None, T::None, Always);
    t[0xF5] = def(Push, T::None, T::AF, Always);
    t[0xF6] = def(Or, T::A, T::D8, Always);
    t[0xF7] = def(Rst, T::None, T::None, Always);
    t[0xF8] = def(LdHlSpR8, T::HL, T::R8, Always);
    t[0xF9] = def(Ld16, T::SP, T::HL, Always);
    t[0xFA] = def(Ld8, T::A, T::D16Ind, Always);
    t[0xFB] = def(Ei, T::None, T::None, Always);
    t[0xFE] = def(Cp, T::A, T::D8, Always);
    t[0xFF] = def(Rst, T::None, T::None, Always);

    t
}

fn build_cb_table() -> [CbInstruction; 256] {
    let shift_ops: [CbOp; 8] = [
        CbOp::Rlc,
        CbOp::Rrc,
        CbOp::Rl,
        CbOp::Rr,
        CbOp::Sla,
        CbOp::Sra,
        CbOp::Swap,
        CbOp::Srl,
    ];

    let mut t = [CbInstruction {
        op: CbOp::Rlc,
        target: Target::B,
        bit: 0,
    }; 256];

    for (opcode, entry) in t.iter_mut().enumerate() {
        let target = REG8[opcode & 0x07];
        let bit = ((opcode >> 3) & 0x07) as u8;
        let op = match opcode >> 6 {
            0 => shift_ops[bit as usize],
            1 => CbOp::Bit,
            2 => CbOp::Res,
            _ => CbOp::Set,
        };
        *entry = CbInstruction { op, target, bit };
    }

    t
}
