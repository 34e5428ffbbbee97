//! Decoded instruction families and the `Insn::decode` dispatch.
//!
//! Each recogniser matches a fixed-bit group and then validates reserved
//! fields before accepting a variant; anything that does not match any
//! recogniser is an illegal instruction as far as this crate is concerned.

use crate::bitmask::decode_bit_masks;
use crate::reg::{Extend, GPReg, Shift};

fn bits(ins: u32, hi: u32, lo: u32) -> u32 {
    (ins >> lo) & ((1u32 << (hi - lo + 1)) - 1)
}

fn sign_extend(value: u32, width: u32) -> i64 {
    let shift = 64 - width;
    (((value as u64) << shift) as i64) >> shift
}

/// `ADD`/`SUB`(`S`) (immediate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddSubImm {
    pub is_64: bool,
    pub sub: bool,
    pub set_flags: bool,
    pub imm: u32,
    pub rn: GPReg,
    pub rd: GPReg,
}

/// `ADD`/`SUB`(`S`) (shifted register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddSubShiftedReg {
    pub is_64: bool,
    pub sub: bool,
    pub set_flags: bool,
    pub shift: Shift,
    pub amount: u32,
    pub rm: GPReg,
    pub rn: GPReg,
    pub rd: GPReg,
}

/// `ADD`/`SUB`(`S`) (extended register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddSubExtReg {
    pub is_64: bool,
    pub sub: bool,
    pub set_flags: bool,
    pub extend: Extend,
    pub amount: u32,
    pub rm: GPReg,
    pub rn: GPReg,
    pub rd: GPReg,
}

/// `ADC`/`SBC`(`S`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcSbc {
    pub is_64: bool,
    pub sub: bool,
    pub set_flags: bool,
    pub rm: GPReg,
    pub rn: GPReg,
    pub rd: GPReg,
}

/// Which logical operation a logical instruction performs, after folding
/// in the `N` invert bit (`AND`/`BIC`, `ORR`/`ORN`, `EOR`/`EON`, `ANDS`/`BICS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKind {
    And,
    Bic,
    Orr,
    Orn,
    Eor,
    Eon,
    Ands,
    Bics,
}

/// Logical (shifted register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalShiftedReg {
    pub is_64: bool,
    pub kind: LogicalKind,
    pub shift: Shift,
    pub amount: u32,
    pub rm: GPReg,
    pub rn: GPReg,
    pub rd: GPReg,
}

/// Logical (immediate). `rd` may be `SP` (for `ANDS` it may not, per the
/// ARM ARM; the decoder does not enforce that and leaves it to callers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalImm {
    pub is_64: bool,
    pub kind: LogicalKind,
    pub imm: u64,
    pub rn: GPReg,
    pub rd: GPReg,
}

/// `MOVZ`/`MOVN`/`MOVK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveWideKind {
    Movn,
    Movz,
    Movk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveWide {
    pub is_64: bool,
    pub kind: MoveWideKind,
    pub imm16: u16,
    pub shift: u32,
    pub rd: GPReg,
}

/// `ADR`/`ADRP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdrpKind {
    Adr,
    Adrp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adr {
    pub kind: AdrpKind,
    pub imm: i64,
    pub rd: GPReg,
}

/// `B`/`BL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchImm {
    pub link: bool,
    pub imm: i64,
}

/// `B.cond`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CondBranch {
    pub cond: u8,
    pub imm: i64,
}

/// `CBZ`/`CBNZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareAndBranch {
    pub is_64: bool,
    pub negate: bool,
    pub imm: i64,
    pub rt: GPReg,
}

/// `BR`/`BLR`/`RET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRegKind {
    Br,
    Blr,
    Ret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchReg {
    pub kind: BranchRegKind,
    pub rn: GPReg,
}

/// `LDP`/`STP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStorePair {
    pub load: bool,
    pub size: u32,
    pub post_index: bool,
    pub writeback: bool,
    pub imm: i64,
    pub rt1: GPReg,
    pub rt2: GPReg,
    pub rn: GPReg,
}

/// `LDR`/`STR` (immediate): unsigned-offset, pre-indexed, and post-indexed
/// forms, for the `X`/`W` general-purpose register variants only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStoreImm {
    pub load: bool,
    pub size: u32,
    pub post_index: bool,
    pub writeback: bool,
    pub imm: i64,
    pub rt: GPReg,
    pub rn: GPReg,
}

/// `LDR` (literal), 32-bit or 64-bit general-purpose variants only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadLiteral {
    pub is_64: bool,
    pub imm: i64,
    pub rt: GPReg,
}

/// A single recognised AArch64 instruction.
///
/// `Display` prints the instruction family's mnemonic group for
/// diagnostics; it does not format operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Insn {
    #[strum(serialize = "add/sub (imm)")]
    AddSubImm(AddSubImm),
    #[strum(serialize = "add/sub (shifted reg)")]
    AddSubShiftedReg(AddSubShiftedReg),
    #[strum(serialize = "add/sub (extended reg)")]
    AddSubExtReg(AddSubExtReg),
    #[strum(serialize = "adc/sbc")]
    AdcSbc(AdcSbc),
    #[strum(serialize = "logical (shifted reg)")]
    LogicalShiftedReg(LogicalShiftedReg),
    #[strum(serialize = "logical (imm)")]
    LogicalImm(LogicalImm),
    #[strum(serialize = "move wide")]
    MoveWide(MoveWide),
    #[strum(serialize = "adr/adrp")]
    Adr(Adr),
    #[strum(serialize = "b/bl")]
    BranchImm(BranchImm),
    #[strum(serialize = "b.cond")]
    CondBranch(CondBranch),
    #[strum(serialize = "cbz/cbnz")]
    CompareAndBranch(CompareAndBranch),
    #[strum(serialize = "br/blr/ret")]
    BranchReg(BranchReg),
    #[strum(serialize = "ldp/stp")]
    LoadStorePair(LoadStorePair),
    #[strum(serialize = "ldr/str (imm)")]
    LoadStoreImm(LoadStoreImm),
    #[strum(serialize = "ldr (literal)")]
    LoadLiteral(LoadLiteral),
    #[strum(serialize = "nop")]
    Nop,
}

impl Insn {
    /// Try each recogniser in turn; the first match wins. Returns `None`
    /// for anything this crate does not model (floating-point, SIMD,
    /// system registers, exceptions, and any other encoding outside the
    /// families above).
    pub fn decode(ins: u32) -> Option<Insn> {
        if ins == 0xd503201f {
            return Some(Insn::Nop);
        }
        decode_branch_reg(ins)
            .map(Insn::BranchReg)
            .or_else(|| decode_branch_imm(ins).map(Insn::BranchImm))
            .or_else(|| decode_cond_branch(ins).map(Insn::CondBranch))
            .or_else(|| decode_compare_and_branch(ins).map(Insn::CompareAndBranch))
            .or_else(|| decode_load_store_pair(ins).map(Insn::LoadStorePair))
            .or_else(|| decode_load_store_imm(ins).map(Insn::LoadStoreImm))
            .or_else(|| decode_load_literal(ins).map(Insn::LoadLiteral))
            .or_else(|| decode_adr(ins).map(Insn::Adr))
            .or_else(|| decode_move_wide(ins).map(Insn::MoveWide))
            .or_else(|| decode_logical_imm(ins).map(Insn::LogicalImm))
            .or_else(|| decode_logical_shifted_reg(ins).map(Insn::LogicalShiftedReg))
            .or_else(|| decode_add_sub_imm(ins).map(Insn::AddSubImm))
            .or_else(|| decode_add_sub_ext_reg(ins).map(Insn::AddSubExtReg))
            .or_else(|| decode_add_sub_shifted_reg(ins).map(Insn::AddSubShiftedReg))
            .or_else(|| decode_adc_sbc(ins).map(Insn::AdcSbc))
    }
}

fn decode_add_sub_imm(ins: u32) -> Option<AddSubImm> {
    if bits(ins, 28, 23) != 0b100010 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    let sub = bits(ins, 30, 30) == 1;
    let set_flags = bits(ins, 29, 29) == 1;
    let shift12 = bits(ins, 22, 22) == 1;
    let imm12 = bits(ins, 21, 10);
    let imm = if shift12 { imm12 << 12 } else { imm12 };
    let rn = GPReg::new(bits(ins, 9, 5) as u8, is_64, true);
    let rd = GPReg::new(bits(ins, 4, 0) as u8, is_64, !set_flags);
    Some(AddSubImm { is_64, sub, set_flags, imm, rn, rd })
}

fn decode_add_sub_shifted_reg(ins: u32) -> Option<AddSubShiftedReg> {
    if bits(ins, 28, 24) != 0b01011 || bits(ins, 21, 21) != 0 {
        return None;
    }
    let shift_bits = bits(ins, 23, 22);
    if shift_bits == 0b11 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    let sub = bits(ins, 30, 30) == 1;
    let set_flags = bits(ins, 29, 29) == 1;
    let amount = bits(ins, 15, 10);
    if !is_64 && amount >= 32 {
        return None;
    }
    Some(AddSubShiftedReg {
        is_64,
        sub,
        set_flags,
        shift: Shift::decode(shift_bits),
        amount,
        rm: GPReg::new(bits(ins, 20, 16) as u8, is_64, false),
        rn: GPReg::new(bits(ins, 9, 5) as u8, is_64, false),
        rd: GPReg::new(bits(ins, 4, 0) as u8, is_64, false),
    })
}

fn decode_add_sub_ext_reg(ins: u32) -> Option<AddSubExtReg> {
    if bits(ins, 28, 24) != 0b01011 || bits(ins, 23, 22) != 0 || bits(ins, 21, 21) != 1 {
        return None;
    }
    let amount = bits(ins, 12, 10);
    if amount > 4 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    let sub = bits(ins, 30, 30) == 1;
    let set_flags = bits(ins, 29, 29) == 1;
    let extend = Extend::decode(bits(ins, 15, 13));
    Some(AddSubExtReg {
        is_64,
        sub,
        set_flags,
        extend,
        amount,
        rm: GPReg::new(bits(ins, 20, 16) as u8, extend.source_width() >= 64, false),
        rn: GPReg::new(bits(ins, 9, 5) as u8, is_64, true),
        rd: GPReg::new(bits(ins, 4, 0) as u8, is_64, !set_flags),
    })
}

fn decode_adc_sbc(ins: u32) -> Option<AdcSbc> {
    if bits(ins, 28, 21) != 0b11010000 || bits(ins, 15, 10) != 0 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    Some(AdcSbc {
        is_64,
        sub: bits(ins, 30, 30) == 1,
        set_flags: bits(ins, 29, 29) == 1,
        rm: GPReg::new(bits(ins, 20, 16) as u8, is_64, false),
        rn: GPReg::new(bits(ins, 9, 5) as u8, is_64, false),
        rd: GPReg::new(bits(ins, 4, 0) as u8, is_64, false),
    })
}

fn decode_logical_shifted_reg(ins: u32) -> Option<LogicalShiftedReg> {
    if bits(ins, 28, 24) != 0b01010 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    let amount = bits(ins, 15, 10);
    if !is_64 && amount >= 32 {
        return None;
    }
    let n = bits(ins, 21, 21) == 1;
    let kind = match (bits(ins, 30, 29), n) {
        (0b00, false) => LogicalKind::And,
        (0b00, true) => LogicalKind::Bic,
        (0b01, false) => LogicalKind::Orr,
        (0b01, true) => LogicalKind::Orn,
        (0b10, false) => LogicalKind::Eor,
        (0b10, true) => LogicalKind::Eon,
        (0b11, false) => LogicalKind::Ands,
        (0b11, true) => LogicalKind::Bics,
        _ => unreachable!(),
    };
    Some(LogicalShiftedReg {
        is_64,
        kind,
        shift: Shift::decode(bits(ins, 23, 22)),
        amount,
        rm: GPReg::new(bits(ins, 20, 16) as u8, is_64, false),
        rn: GPReg::new(bits(ins, 9, 5) as u8, is_64, false),
        rd: GPReg::new(bits(ins, 4, 0) as u8, is_64, false),
    })
}

fn decode_logical_imm(ins: u32) -> Option<LogicalImm> {
    if bits(ins, 28, 23) != 0b100100 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    let n = bits(ins, 22, 22) as u8;
    let immr = bits(ins, 21, 16) as u8;
    let imms = bits(ins, 15, 10) as u8;
    let (imm, _tmask) = decode_bit_masks(is_64, n, imms, immr, true)?;
    let opc = bits(ins, 30, 29);
    let is_ands = opc == 0b11;
    let kind = match opc {
        0b00 => LogicalKind::And,
        0b01 => LogicalKind::Orr,
        0b10 => LogicalKind::Eor,
        0b11 => LogicalKind::Ands,
        _ => unreachable!(),
    };
    Some(LogicalImm {
        is_64,
        kind,
        imm,
        rn: GPReg::new(bits(ins, 9, 5) as u8, is_64, false),
        rd: GPReg::new(bits(ins, 4, 0) as u8, is_64, !is_ands),
    })
}

fn decode_move_wide(ins: u32) -> Option<MoveWide> {
    if bits(ins, 28, 23) != 0b100101 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    let hw = bits(ins, 22, 21);
    if !is_64 && hw >= 2 {
        return None;
    }
    let kind = match bits(ins, 30, 29) {
        0b00 => MoveWideKind::Movn,
        0b10 => MoveWideKind::Movz,
        0b11 => MoveWideKind::Movk,
        _ => return None,
    };
    Some(MoveWide {
        is_64,
        kind,
        imm16: bits(ins, 20, 5) as u16,
        shift: hw * 16,
        rd: GPReg::new(bits(ins, 4, 0) as u8, is_64, false),
    })
}

fn decode_adr(ins: u32) -> Option<Adr> {
    if bits(ins, 28, 24) != 0b10000 {
        return None;
    }
    let op = bits(ins, 31, 31);
    let immlo = bits(ins, 30, 29) as i64;
    let immhi = bits(ins, 23, 5) as i64;
    let raw = (immhi << 2) | immlo;
    let (kind, imm) = if op == 0 {
        (AdrpKind::Adr, sign_extend(raw as u32, 21))
    } else {
        (AdrpKind::Adrp, sign_extend(raw as u32, 21) * 4096)
    };
    Some(Adr { kind, imm, rd: GPReg::new(bits(ins, 4, 0) as u8, true, false) })
}

fn decode_branch_imm(ins: u32) -> Option<BranchImm> {
    if bits(ins, 30, 26) != 0b00101 {
        return None;
    }
    let link = bits(ins, 31, 31) == 1;
    let imm = sign_extend(bits(ins, 25, 0), 26) * 4;
    Some(BranchImm { link, imm })
}

fn decode_cond_branch(ins: u32) -> Option<CondBranch> {
    if bits(ins, 31, 24) != 0b01010100 || bits(ins, 4, 4) != 0 {
        return None;
    }
    let imm = sign_extend(bits(ins, 23, 5), 19) * 4;
    Some(CondBranch { cond: bits(ins, 3, 0) as u8, imm })
}

fn decode_compare_and_branch(ins: u32) -> Option<CompareAndBranch> {
    if bits(ins, 30, 25) != 0b011010 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    let imm = sign_extend(bits(ins, 23, 5), 19) * 4;
    Some(CompareAndBranch {
        is_64,
        negate: bits(ins, 24, 24) == 1,
        imm,
        rt: GPReg::new(bits(ins, 4, 0) as u8, is_64, false),
    })
}

fn decode_branch_reg(ins: u32) -> Option<BranchReg> {
    if bits(ins, 31, 25) != 0b1101011
        || bits(ins, 20, 16) != 0b11111
        || bits(ins, 15, 10) != 0
        || bits(ins, 4, 0) != 0
    {
        return None;
    }
    let kind = match bits(ins, 24, 21) {
        0b0000 => BranchRegKind::Br,
        0b0001 => BranchRegKind::Blr,
        0b0010 => BranchRegKind::Ret,
        _ => return None,
    };
    Some(BranchReg { kind, rn: GPReg::new(bits(ins, 9, 5) as u8, true, false) })
}

fn decode_load_store_pair(ins: u32) -> Option<LoadStorePair> {
    if bits(ins, 29, 27) != 0b101 || bits(ins, 26, 26) != 0 {
        return None;
    }
    let (post_index, writeback) = match bits(ins, 25, 23) {
        0b001 => (true, true),
        0b010 => (false, false),
        0b011 => (false, true),
        _ => return None,
    };
    let size = match bits(ins, 31, 30) {
        0b00 => 4,
        0b10 => 8,
        _ => return None,
    };
    let is_64 = size == 8;
    let load = bits(ins, 22, 22) == 1;
    let imm = sign_extend(bits(ins, 21, 15), 7) * size as i64;
    Some(LoadStorePair {
        load,
        size,
        post_index,
        writeback,
        imm,
        rt1: GPReg::new(bits(ins, 4, 0) as u8, is_64, false),
        rt2: GPReg::new(bits(ins, 14, 10) as u8, is_64, false),
        rn: GPReg::new(bits(ins, 9, 5) as u8, true, true),
    })
}

fn decode_load_store_imm(ins: u32) -> Option<LoadStoreImm> {
    if bits(ins, 29, 27) != 0b111 || bits(ins, 26, 26) != 0 {
        return None;
    }
    let size_field = bits(ins, 31, 30);
    let size = match size_field {
        0b10 => 4,
        0b11 => 8,
        _ => return None,
    };
    let is_64 = size == 8;
    let opc = bits(ins, 23, 22);
    let load = match opc {
        0b00 => false,
        0b01 => true,
        _ => return None,
    };
    let rt = GPReg::new(bits(ins, 4, 0) as u8, is_64, false);
    let rn = GPReg::new(bits(ins, 9, 5) as u8, true, true);

    match bits(ins, 25, 24) {
        // Unsigned offset: no writeback, imm12 scaled by the access size.
        0b01 => {
            let imm12 = bits(ins, 21, 10) as i64 * size as i64;
            Some(LoadStoreImm { load, size, post_index: false, writeback: false, imm: imm12, rt, rn })
        }
        // Unscaled immediate: pre/post-indexed forms select via bits[11:10].
        0b00 if bits(ins, 21, 21) == 0 => {
            let imm9 = sign_extend(bits(ins, 20, 12), 9);
            let (post_index, writeback) = match bits(ins, 11, 10) {
                0b01 => (true, true),
                0b11 => (false, true),
                _ => return None,
            };
            Some(LoadStoreImm { load, size, post_index, writeback, imm: imm9, rt, rn })
        }
        _ => None,
    }
}

fn decode_load_literal(ins: u32) -> Option<LoadLiteral> {
    if bits(ins, 29, 24) != 0b011000 || bits(ins, 31, 30) > 0b01 || bits(ins, 26, 26) != 0 {
        return None;
    }
    let is_64 = bits(ins, 31, 31) == 1;
    let imm = sign_extend(bits(ins, 23, 5), 19) * 4;
    Some(LoadLiteral { is_64, imm, rt: GPReg::new(bits(ins, 4, 0) as u8, is_64, false) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop() {
        assert_eq!(Insn::decode(0xd503201f), Some(Insn::Nop));
    }

    #[test]
    fn ldp_pre_index_sp_frame_setup() {
        // stp x28, x27, [sp, #-0x60]!
        let insn = Insn::decode(0xa9ba6ffc).unwrap();
        match insn {
            Insn::LoadStorePair(p) => {
                assert!(!p.load);
                assert_eq!(p.size, 8);
                assert!(p.writeback);
                assert!(!p.post_index);
                assert_eq!(p.imm, -0x60);
                assert!(p.rn.is_sp());
            }
            other => panic!("expected LoadStorePair, got {other:?}"),
        }
    }

    #[test]
    fn ldp_signed_offset_no_writeback() {
        // ldp x3, x4, [x20, #0x20]
        let insn = Insn::decode(0xa9421283).unwrap();
        match insn {
            Insn::LoadStorePair(p) => {
                assert!(p.load);
                assert!(!p.writeback);
                assert!(!p.post_index);
                assert_eq!(p.imm, 0x20);
                assert_eq!(p.rn.index(), 20);
                assert_eq!(p.rt1.index(), 3);
                assert_eq!(p.rt2.index(), 4);
            }
            other => panic!("expected LoadStorePair, got {other:?}"),
        }
    }

    #[test]
    fn ldr_immediate_unsigned_offset() {
        // ldr x8, [x8, #0x28]
        let insn = Insn::decode(0xf9401508).unwrap();
        match insn {
            Insn::LoadStoreImm(l) => {
                assert!(l.load);
                assert_eq!(l.size, 8);
                assert!(!l.writeback);
                assert_eq!(l.imm, 0x28);
                assert_eq!(l.rn.index(), 8);
                assert_eq!(l.rt.index(), 8);
            }
            other => panic!("expected LoadStoreImm, got {other:?}"),
        }
    }

    #[test]
    fn str_immediate_zero_offset() {
        // str x0, [x20]
        let insn = Insn::decode(0xf9000280).unwrap();
        match insn {
            Insn::LoadStoreImm(l) => {
                assert!(!l.load);
                assert_eq!(l.imm, 0);
                assert_eq!(l.rn.index(), 20);
                assert_eq!(l.rt.index(), 0);
            }
            other => panic!("expected LoadStoreImm, got {other:?}"),
        }
    }

    #[rstest::rstest]
    #[case(0xd61f0040, BranchRegKind::Br, 2)]
    #[case(0xd63f0100, BranchRegKind::Blr, 8)]
    #[case(0xd65f03c0, BranchRegKind::Ret, 30)]
    fn branch_reg_forms(#[case] ins: u32, #[case] kind: BranchRegKind, #[case] rn: u8) {
        let insn = Insn::decode(ins).unwrap();
        assert_eq!(insn, Insn::BranchReg(BranchReg { kind, rn: GPReg::new(rn, true, false) }));
    }

    #[test]
    fn mov_register_alias_via_orr() {
        // mov x0, x22  ==  orr x0, xzr, x22
        let insn = Insn::decode(0xaa1603e0).unwrap();
        match insn {
            Insn::LogicalShiftedReg(l) => {
                assert!(matches!(l.kind, LogicalKind::Orr));
                assert!(l.rn.is_zero());
                assert_eq!(l.rm.index(), 22);
                assert_eq!(l.rd.index(), 0);
                assert_eq!(crate::Alias::of(&insn), Some(crate::Alias::MovReg));
            }
            other => panic!("expected LogicalShiftedReg, got {other:?}"),
        }
    }

    #[test]
    fn unrecognised_encoding_is_none() {
        assert_eq!(Insn::decode(0), None);
    }
}
