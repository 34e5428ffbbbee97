//! Cross-module scenarios: a full simulator run over a tiny function, and
//! a strategy-1 JOP call driven end to end through `JopEngine`, checked
//! against the worked example's documented payload offsets.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;

use memctl::jop::gadgets::{MOV_X12_X2__BR_X3, STRATEGY_1_GADGETS};
use memctl::jop::strategy1::STRATEGY_1;
use memctl::{
    CallStrategyRegistry, CodeHost, CodeSimulator, ExecutableImage, GPReg, GadgetTable,
    JopEngine, KernelCall7, KernelMemory, MemctlContext, MemctlError, Segment, Simulator,
    TaintDefaults, Word, PROT_EXECUTE, PROT_READ,
};

struct OneSegmentImage<'a>(Segment<'a>);

impl<'a> ExecutableImage for OneSegmentImage<'a> {
    fn segments(&self) -> &[Segment<'_>] {
        std::slice::from_ref(&self.0)
    }
}

fn image_of(code: &[u8], vmaddr: u64) -> OneSegmentImage<'_> {
    OneSegmentImage(Segment { data: code, vmaddr, initprot: PROT_READ | PROT_EXECUTE, maxprot: PROT_READ | PROT_EXECUTE })
}

/// `mov x0, #5 ; add x0, x0, #3 ; ret` run end to end through
/// `CodeHost`/`Simulator`, checking the taint-tracked result and that
/// `exec_until_return` stops exactly where the `ret` is.
#[test]
fn full_step_run_over_a_tiny_function() {
    let code: Vec<u8> = [0xd28000a0u32, 0x91000c00, 0xd65f03c0].iter().flat_map(|w| w.to_le_bytes()).collect();
    let base = 0x1000u64;
    let mut sim = Simulator::new(TaintDefaults::ksim());
    sim.pc = Word::new(base, sim.defaults.constant);
    let mut host = CodeHost::new(&code, base);

    sim.step(&mut host);
    sim.step(&mut host);
    let x0 = sim.read_gpreg(GPReg::new(0, true, false));
    assert_eq!(x0.value, 8);
    assert_eq!(x0.taint, sim.defaults.constant);
    assert_eq!(sim.pc.value, base + 8);

    let mut cs = CodeSimulator::new(sim, &code, base);
    assert!(cs.exec_until_return(memctl::BranchScript::AllFalse, 4));
}

/// An illegal instruction poisons every register.
#[test]
fn illegal_instruction_poisons_registers_across_modules() {
    let code: Vec<u8> = 0xffff_ffffu32.to_le_bytes().to_vec();
    let base = 0x2000u64;
    let mut sim = Simulator::new(TaintDefaults::ksim());
    sim.pc = Word::new(base, sim.defaults.constant);
    sim.write_gpreg(GPReg::new(2, true, false), Word::new(0x41, sim.defaults.constant));
    let mut host = CodeHost::new(&code, base);
    sim.step(&mut host);
    assert!(sim.read_gpreg(GPReg::new(2, true, false)).taint.is_unknown());
}

struct FakeKernel {
    memory: RefCell<Vec<u8>>,
    base: u64,
}

#[derive(Clone)]
struct FakeKernelHandle(Rc<FakeKernel>);

impl KernelMemory for FakeKernelHandle {
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<usize, MemctlError> {
        let offset = (address - self.0.base) as usize;
        buf.copy_from_slice(&self.0.memory.borrow()[offset..offset + buf.len()]);
        Ok(buf.len())
    }
    fn write(&self, address: u64, buf: &[u8]) -> Result<usize, MemctlError> {
        let offset = (address - self.0.base) as usize;
        self.0.memory.borrow_mut()[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(buf.len())
    }
}

impl KernelCall7 for FakeKernelHandle {
    fn call(&self, _func: u64, _args: &[u64]) -> Result<u32, MemctlError> {
        Ok(0)
    }
}

/// The worked example: a strategy-1 payload for
/// `func=0xFFFF_FFFF_0001_0000`, `args=(1,2,3,4,5,6,7,8)` driven through
/// `JopEngine::call`, checking the documented payload offsets directly
/// out of the kernel memory the engine wrote to.
#[test]
fn strategy_1_call_matches_the_worked_example() {
    let mut code = Vec::new();
    for p in STRATEGY_1_GADGETS {
        for &w in p.words {
            code.extend_from_slice(&w.to_le_bytes());
        }
    }
    let mut gadgets = GadgetTable::new(STRATEGY_1_GADGETS);
    gadgets.locate(&image_of(&code, 0x8000), 0, &AtomicBool::new(false)).unwrap();
    assert!(STRATEGY_1.is_available(&gadgets));

    let kernel_payload = 0x9000_0000u64;
    let kernel = Rc::new(FakeKernel { memory: RefCell::new(vec![0u8; 0x400]), base: kernel_payload });
    let ctx = MemctlContext::new(gadgets)
        .with_kernel_call_7(FakeKernelHandle(kernel.clone()))
        .with_kernel_memory(FakeKernelHandle(kernel.clone()));
    let engine = JopEngine::new(CallStrategyRegistry::new(vec![STRATEGY_1]));

    let func = 0xFFFF_FFFF_0001_0000u64;
    let args = [1u64, 2, 3, 4, 5, 6, 7, 8];
    // Pre-seed the result slot: the fake kernel never executes the JOP
    // chain, so nothing else would write the function's return value here.
    ctx.require_kernel_memory().unwrap().write(kernel_payload + 0x9c, &99u64.to_le_bytes()).unwrap();
    let result = engine.call(&ctx, func, &args, kernel_payload).unwrap();
    assert_eq!(result, 99);

    let written = kernel.memory.borrow();
    let word_at = |offset: usize| u32::from_le_bytes(written[offset..offset + 4].try_into().unwrap());
    assert_eq!(word_at(0x54), func as u32);
    assert_eq!(u64::from_le_bytes(written[0x98..0xa0].try_into().unwrap()), args[0]);
    assert!(ctx.gadgets.address_of(MOV_X12_X2__BR_X3).is_some());
}
