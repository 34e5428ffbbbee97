//! Bit-level recognisers for the AArch64 instruction families needed to
//! follow compiler-generated function prologues and short dataflow chains.
//!
//! This crate decodes only the arithmetic, logical, move, load/pair,
//! literal-load, branch, and no-op families; any other encoding simply
//! fails to decode (`Insn::decode` returns `None`), which callers treat as
//! an illegal instruction. There is no instruction-set completeness goal:
//! no floating-point, SIMD, MMU, exception, or system-register semantics.

mod alias;
mod bitmask;
mod insn;
mod reg;

pub use alias::Alias;
pub use bitmask::decode_bit_masks;
pub use insn::{
    AddSubExtReg, AddSubImm, AddSubShiftedReg, AdcSbc, Adr, AdrpKind, BranchImm, BranchReg,
    BranchRegKind, CompareAndBranch, CondBranch, Insn, LoadLiteral, LoadStoreImm, LoadStorePair,
    LogicalImm, LogicalKind, LogicalShiftedReg, MoveWide, MoveWideKind,
};
pub use reg::{Extend, GPReg, Shift};
