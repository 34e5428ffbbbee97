//! Mnemonic aliases: several distinct `Insn` shapes are conventionally
//! written (and recognised by tools) under a different name when their
//! operands take a canonical form. These are pure predicates over an
//! already-decoded `Insn`; they do not change how operands are read.

use crate::insn::{AdcSbc, AddSubImm, AddSubShiftedReg, Insn, LogicalKind, LogicalShiftedReg};
use crate::reg::GPReg;

/// A recognised mnemonic alias for a decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias {
    /// `ADDS`/`SUBS` with a discarded destination (`XZR`/`WZR`).
    Cmp,
    /// `ADDS` with a discarded destination.
    Cmn,
    /// `ANDS` with a discarded destination.
    Tst,
    /// `ORR Rd, RZR, Rm` with no shift.
    MovReg,
    /// `ORR Rd, RZR, #imm` (logical immediate with an all-zero source).
    MovImm,
    /// `ADD Rd|SP, Rn|SP, #0` moving between `SP` and a general register.
    MovSp,
    /// `SUB(S) Rd, RZR, Rm` with no shift.
    Neg,
    Negs,
    /// `SBC(S) Rd, RZR, Rm`.
    Ngc,
    Ngcs,
}

impl Alias {
    /// Determine whether `insn` is conventionally written under an alias
    /// mnemonic, per the ARM ARM's alias rules. Returns `None` for
    /// anything without a defined alias, which includes every `Insn`
    /// variant not covered below.
    pub fn of(insn: &Insn) -> Option<Alias> {
        match insn {
            Insn::AddSubShiftedReg(a) => alias_of_add_sub_shifted(a),
            Insn::AddSubImm(a) => alias_of_add_sub_imm(a),
            Insn::LogicalShiftedReg(l) => alias_of_logical_shifted(l),
            Insn::LogicalImm(l) if is_zero(&l.rn) && matches!(l.kind, LogicalKind::Orr) => {
                Some(Alias::MovImm)
            }
            Insn::AdcSbc(a) => alias_of_adc_sbc(a),
            _ => None,
        }
    }
}

fn is_zero(reg: &GPReg) -> bool {
    reg.is_zero()
}

fn is_no_shift(shift: &crate::reg::Shift, amount: u32) -> bool {
    matches!(shift, crate::reg::Shift::Lsl) && amount == 0
}

fn alias_of_add_sub_shifted(a: &AddSubShiftedReg) -> Option<Alias> {
    if a.set_flags && is_zero(&a.rd) {
        return Some(if a.sub { Alias::Cmp } else { Alias::Cmn });
    }
    if a.sub && !a.set_flags && is_zero(&a.rn) {
        return Some(Alias::Neg);
    }
    if a.sub && a.set_flags && is_zero(&a.rn) {
        return Some(Alias::Negs);
    }
    None
}

fn alias_of_add_sub_imm(a: &AddSubImm) -> Option<Alias> {
    if a.set_flags && is_zero(&a.rd) {
        return Some(if a.sub { Alias::Cmp } else { Alias::Cmn });
    }
    if !a.sub && !a.set_flags && a.imm == 0 && (a.rn.is_sp() || a.rd.is_sp()) {
        return Some(Alias::MovSp);
    }
    None
}

fn alias_of_logical_shifted(l: &LogicalShiftedReg) -> Option<Alias> {
    let no_shift = is_no_shift(&l.shift, l.amount);
    match l.kind {
        LogicalKind::Ands if is_zero(&l.rd) => Some(Alias::Tst),
        LogicalKind::Orr if is_zero(&l.rn) && no_shift => Some(Alias::MovReg),
        _ => None,
    }
}

fn alias_of_adc_sbc(a: &AdcSbc) -> Option<Alias> {
    if !a.sub || !is_zero(&a.rn) {
        return None;
    }
    Some(if a.set_flags { Alias::Ngcs } else { Alias::Ngc })
}
