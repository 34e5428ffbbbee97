//! A taint-propagating AArch64 instruction simulator and JOP call engine
//! for kernel-memory inspection tools.
//!
//! This crate decodes and abstractly interprets a narrow, fixed subset of
//! AArch64 (see [`memctl_asm`]), tracking which register and memory
//! values are attacker-controlled versus kernel-constant as it goes. On
//! top of that core it builds two applications: [`ksim`], a
//! budget-and-scan-bounded simulator over a mapped code region used to
//! answer "does executing from here reach a call/store/return", and
//! [`jop`], a jump-oriented-programming call engine that invokes
//! arbitrary kernel functions through a 7-argument call primitive.
//!
//! Non-goals: this crate does not implement instruction-set completeness,
//! floating-point/SIMD/MMU/exception/system-register semantics, gadget
//! synthesis, or side-channel analysis. It does not parse Mach-O or talk
//! to a kernel itself; [`context::ExecutableImage`] (re-exported from
//! [`gadget`]), [`context::KernelCall7`], and [`context::KernelMemory`]
//! are the seams a host application plugs those in through.

pub mod context;
pub mod error;
pub mod gadget;
pub mod jop;
pub mod ksim;
pub mod sim;
pub mod symbol;
pub mod taint;

pub use context::{KernelCall7, KernelMemory, MemctlContext};
pub use error::{drain_errors, push_error, suppress, MemctlError, Suppress};
pub use gadget::{ExecutableImage, GadgetPattern, GadgetTable, Prot, Segment, PROT_EXECUTE, PROT_READ};
pub use jop::{CallStrategy, CallStrategyRegistry, InitialState, JopEngine};
pub use ksim::{BranchScript, CodeHost, CodeSimulator, ScanDirection};
pub use sim::{PState, Simulator, SimulatorHost, Word};
pub use symbol::SymbolTable;
pub use taint::{Taint, TaintDefaults};

pub use memctl_asm::{decode_bit_masks, Alias, Extend, GPReg, Insn, Shift};
