//! The code simulator (spec component D): wraps [`crate::sim::Simulator`]
//! over a mapped, read-only slice of kernel code and adds the bookkeeping
//! the core doesn't know about — instruction budget, scripted conditional
//! branches, and the "clear caller-saved registers across a call" rule.

use memctl_asm::{BranchRegKind, GPReg, Insn};

use crate::sim::{BranchType, FetchedInsn, MemoryAccess, Simulator, SimulatorHost, StepOutcome, Word};

/// Default instruction budget, matching `KSIM_MAX_INSTRUCTIONS` in the
/// original C library: `2^24`.
pub const KSIM_MAX_INSTRUCTIONS: u64 = 1 << 24;

/// A scripted answer for every conditional branch `ksim` encounters,
/// indexed by how many conditionals have been seen so far in the current
/// bounded execution. `AllFalse` (`KSIM_BRANCH_ALL_FALSE`) pins every
/// remaining conditional to not-taken once the script runs out, or
/// unconditionally when no real script is needed.
#[derive(Debug, Clone)]
pub enum BranchScript {
    List(Vec<bool>),
    AllFalse,
}

impl BranchScript {
    fn decide(&self, seen: usize) -> bool {
        match self {
            BranchScript::List(v) => v.get(seen).copied().unwrap_or(false),
            BranchScript::AllFalse => false,
        }
    }
}

/// The host half of ksim: everything [`SimulatorHost`] needs that isn't
/// the register file itself. Kept separate from [`CodeSimulator::sim`] so
/// `sim.step(&mut host)` borrows two disjoint fields instead of aliasing
/// `self`.
pub struct CodeHost<'a> {
    code: &'a [u8],
    base: u64,
    max_instructions: u64,
    instruction_count: u64,
    clear_temporaries_next_fetch: bool,
    pub break_condition: bool,
    last_break: u64,
    until: Option<Box<dyn FnMut(&Simulator) -> bool + 'a>>,
    branch_script: BranchScript,
    conditionals_seen: usize,
}

impl<'a> CodeHost<'a> {
    pub fn new(code: &'a [u8], base: u64) -> Self {
        CodeHost {
            code,
            base,
            max_instructions: KSIM_MAX_INSTRUCTIONS,
            instruction_count: 0,
            clear_temporaries_next_fetch: false,
            break_condition: false,
            last_break: u64::MAX,
            until: None,
            branch_script: BranchScript::AllFalse,
            conditionals_seen: 0,
        }
    }

    pub fn with_max_instructions(mut self, max: u64) -> Self {
        self.max_instructions = max;
        self
    }

    fn peek_word(&self, addr: u64) -> Option<u32> {
        let offset = addr.checked_sub(self.base)?;
        let offset = usize::try_from(offset).ok()?;
        let bytes = self.code.get(offset..offset.checked_add(4)?)?;
        Some(u32::from_le_bytes(bytes.try_into().unwrap()))
    }
}

impl<'a> SimulatorHost for CodeHost<'a> {
    fn fetch(&mut self, sim: &mut Simulator) -> bool {
        if sim.pc.taint.is_unknown() {
            return false;
        }
        if self.instruction_count >= self.max_instructions {
            tracing::debug!(max_instructions = self.max_instructions, "ksim budget exhausted");
            return false;
        }
        if self.clear_temporaries_next_fetch {
            let unknown = sim.defaults.unknown;
            for index in 0..18 {
                sim.gpr[index] = Word::new(0, unknown);
            }
            self.clear_temporaries_next_fetch = false;
        }
        let bits = match self.peek_word(sim.pc.value) {
            Some(bits) => bits,
            None => return false,
        };
        sim.fetched = FetchedInsn { bits, taint: sim.defaults.constant };

        if let Some(predicate) = &mut self.until {
            if self.instruction_count != self.last_break && predicate(sim) {
                tracing::debug!(pc = sim.pc.value, count = self.instruction_count, "ksim break condition hit");
                self.break_condition = true;
                self.last_break = self.instruction_count;
                return false;
            }
        }
        self.instruction_count += 1;
        true
    }

    fn memory(&mut self, sim: &mut Simulator, access: MemoryAccess, value: Word, _address: Word, _size: u32) -> Word {
        match access {
            MemoryAccess::Load => Word::new(0, sim.defaults.unknown),
            MemoryAccess::Store => value,
        }
    }

    fn branch(&mut self, _sim: &mut Simulator, kind: BranchType, address: Word, _condition: Word, taken: &mut bool) -> bool {
        match kind {
            BranchType::Conditional => {
                let seen = self.conditionals_seen;
                self.conditionals_seen += 1;
                *taken = self.branch_script.decide(seen);
                true
            }
            BranchType::BranchAndLink => {
                *taken = false;
                self.clear_temporaries_next_fetch = true;
                true
            }
            BranchType::Branch | BranchType::Return => !address.taint.is_unknown(),
        }
    }

    fn illegal_instruction(&mut self, sim: &mut Simulator) -> bool {
        let unknown = sim.defaults.unknown;
        for reg in sim.gpr.iter_mut() {
            *reg = Word::new(0, unknown);
        }
        sim.pstate.taint_nzcv = unknown;
        true
    }
}

/// Forward re-simulates (following taken branches); backward just
/// inspects raw bytes at successive `PC - 4i`, since there is nothing to
/// execute backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Backward,
}

/// The code simulator: a [`Simulator`] plus the mapped region and
/// bookkeeping it steps over.
pub struct CodeSimulator<'a> {
    pub sim: Simulator,
    pub host: CodeHost<'a>,
}

impl<'a> CodeSimulator<'a> {
    pub fn new(sim: Simulator, code: &'a [u8], base: u64) -> Self {
        CodeSimulator { sim, host: CodeHost::new(code, base) }
    }

    pub fn set_until(&mut self, predicate: impl FnMut(&Simulator) -> bool + 'a) {
        self.host.until = Some(Box::new(predicate));
    }

    pub fn clear_until(&mut self) {
        self.host.until = None;
        self.host.break_condition = false;
    }

    pub fn step(&mut self) -> StepOutcome {
        self.sim.step(&mut self.host)
    }

    pub fn run(&mut self) {
        while self.step() != StepOutcome::Aborted {}
    }

    fn peek_word(&self, addr: u64) -> Option<u32> {
        self.host.peek_word(addr)
    }

    /// Find the `k`-th (0-indexed) instruction matching `(word & mask) == ins`
    /// within `budget` instructions of the scan.
    pub fn scan_for(&mut self, direction: ScanDirection, ins: u32, mask: u32, k: u32, budget: u64) -> Option<u64> {
        let mut count = 0u32;
        match direction {
            ScanDirection::Forward => {
                for _ in 0..budget {
                    let pc = self.sim.pc.value;
                    let word = self.peek_word(pc)?;
                    if word & mask == ins {
                        if count == k {
                            return Some(pc);
                        }
                        count += 1;
                    }
                    if self.step() == StepOutcome::Aborted {
                        return None;
                    }
                }
                None
            }
            ScanDirection::Backward => {
                let pc0 = self.sim.pc.value;
                for i in 0..budget {
                    let addr = pc0.wrapping_sub(4 * i);
                    let word = self.peek_word(addr)?;
                    if word & mask == ins {
                        if count == k {
                            return Some(addr);
                        }
                        count += 1;
                    }
                }
                None
            }
        }
    }

    /// Find the `i`-th (0-indexed) unconditional `B label` forward of PC.
    pub fn scan_for_jump(&mut self, i: u32) -> Option<u64> {
        self.scan_for(ScanDirection::Forward, 0x1400_0000, 0xfc00_0000, i, self.host.max_instructions)
    }

    /// Find the `i`-th (0-indexed) `BL label` forward of PC.
    pub fn scan_for_call(&mut self, i: u32) -> Option<u64> {
        self.scan_for(ScanDirection::Forward, 0x9400_0000, 0xfc00_0000, i, self.host.max_instructions)
    }

    /// Run up to `budget` instructions, consulting `branches` for every
    /// conditional branch encountered. Returns `true` iff `predicate`
    /// reported a stop; returns `false` on an unknown-target branch or
    /// when the budget is exhausted.
    pub fn exec_until(&mut self, mut predicate: impl FnMut(&Simulator) -> bool, branches: BranchScript, budget: u64) -> bool {
        self.host.branch_script = branches;
        self.host.conditionals_seen = 0;
        for _ in 0..budget {
            if predicate(&self.sim) {
                return true;
            }
            if self.step() == StepOutcome::Aborted {
                return false;
            }
        }
        false
    }

    /// Step until a `BL` is reached (or the budget runs out); returns the
    /// call target if it was statically known.
    pub fn exec_until_call(&mut self, branches: BranchScript, budget: u64) -> Option<u64> {
        self.host.branch_script = branches;
        self.host.conditionals_seen = 0;
        for _ in 0..budget {
            let pc = self.sim.pc.value;
            let bits = self.peek_word(pc)?;
            if let Some(Insn::BranchImm(b)) = Insn::decode(bits) {
                if b.link && !self.sim.pc.taint.is_unknown() {
                    let target = pc.wrapping_add(b.imm as u64);
                    let _ = self.step();
                    return Some(target);
                }
            }
            if self.step() == StepOutcome::Aborted {
                return None;
            }
        }
        None
    }

    /// Step until a `RET` is reached (or the budget runs out).
    pub fn exec_until_return(&mut self, branches: BranchScript, budget: u64) -> bool {
        self.host.branch_script = branches;
        self.host.conditionals_seen = 0;
        for _ in 0..budget {
            let pc = self.sim.pc.value;
            if let Some(bits) = self.peek_word(pc) {
                if let Some(Insn::BranchReg(b)) = Insn::decode(bits) {
                    if matches!(b.kind, BranchRegKind::Ret) {
                        let _ = self.step();
                        return true;
                    }
                }
            }
            if self.step() == StepOutcome::Aborted {
                return false;
            }
        }
        false
    }

    /// Step until a store whose base register is `base_reg`; returns the
    /// stored value if it was statically known.
    pub fn exec_until_store(&mut self, branches: BranchScript, base_reg: GPReg, budget: u64) -> Option<Word> {
        self.host.branch_script = branches;
        self.host.conditionals_seen = 0;
        for _ in 0..budget {
            let pc = self.sim.pc.value;
            if let Some(bits) = self.peek_word(pc) {
                match Insn::decode(bits) {
                    Some(Insn::LoadStoreImm(s)) if !s.load && s.rn.index() == base_reg.index() => {
                        let value = self.sim.read_gpreg(s.rt);
                        let _ = self.step();
                        return Some(value);
                    }
                    Some(Insn::LoadStorePair(s)) if !s.load && s.rn.index() == base_reg.index() => {
                        let value = self.sim.read_gpreg(s.rt1);
                        let _ = self.step();
                        return Some(value);
                    }
                    _ => {}
                }
            }
            if self.step() == StepOutcome::Aborted {
                return None;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taint::TaintDefaults;

    fn code_sim(words: &[u32], base: u64) -> CodeSimulator<'static> {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let leaked: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        let mut sim = Simulator::new(TaintDefaults::ksim());
        sim.pc = Word::new(base, sim.defaults.constant);
        CodeSimulator::new(sim, leaked, base)
    }

    #[test]
    fn scan_for_jump_finds_first_b() {
        // nop ; b +8 ; nop
        let mut cs = code_sim(&[0xd503201f, 0x1400_0002, 0xd503201f], 0x1000);
        let found = cs.scan_for_jump(0);
        assert_eq!(found, Some(0x1004));
    }

    #[test]
    fn exec_until_return_stops_at_ret() {
        let mut cs = code_sim(&[0xd503201f, 0xd65f03c0], 0x2000);
        let stopped = cs.exec_until_return(BranchScript::AllFalse, 16);
        assert!(stopped);
    }

    #[test]
    fn bl_clears_caller_saved_and_does_not_jump() {
        // bl +0x1000 ; nop
        let mut cs = code_sim(&[0x9400_0400, 0xd503201f], 0x3000);
        cs.sim.write_gpreg(GPReg::new(0, true, false), Word::new(0x41, cs.sim.defaults.constant));
        let target = cs.exec_until_call(BranchScript::AllFalse, 16);
        assert_eq!(target, Some(0x3000 + 0x1000));
        assert_eq!(cs.sim.pc.value, 0x3004);
        let x0 = cs.sim.read_gpreg(GPReg::new(0, true, false));
        assert!(x0.taint.is_unknown());
    }

    #[test]
    fn illegal_instruction_clears_registers() {
        let mut cs = code_sim(&[0xffff_ffff], 0x4000);
        cs.sim.write_gpreg(GPReg::new(3, true, false), Word::new(0x99, cs.sim.defaults.constant));
        cs.step();
        let x3 = cs.sim.read_gpreg(GPReg::new(3, true, false));
        assert!(x3.taint.is_unknown());
    }
}
