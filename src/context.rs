//! The collaborator trait contracts (§6) and the context object that
//! replaces the original's process-wide globals (Design Notes §9,
//! "Global mutable state").

use crate::error::MemctlError;
use crate::gadget::GadgetTable;

/// The 7-argument kernel-call primitive (§6): `call_7` in the original.
/// Every JOP call strategy eventually bottoms out in one invocation of
/// this trait, either directly (strategies 1/2) or via a pre-staged
/// payload that this primitive merely launches (higher-arity strategies).
pub trait KernelCall7 {
    /// Invoke `func(args[0], .., args[args.len()-1])` in the kernel
    /// (`args.len() <= 7`) and return the truncated 32-bit result.
    fn call(&self, func: u64, args: &[u64]) -> Result<u32, MemctlError>;
}

/// Kernel virtual-memory accessors (§6): `kernel_read_*`/`kernel_write_*`.
pub trait KernelMemory {
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<usize, MemctlError>;
    fn write(&self, address: u64, buf: &[u8]) -> Result<usize, MemctlError>;
}

/// The explicit, constructible replacement for the original's
/// process-wide globals (`kernel_slide`, `static_gadgets[]`,
/// `kernel_pmap`, and friends). Populated once at initialization and
/// threaded through every call that previously reached for a global.
pub struct MemctlContext {
    pub kernel_slide: u64,
    pub gadgets: GadgetTable,
    pub kernel_call_7: Option<Box<dyn KernelCall7>>,
    pub kernel_memory: Option<Box<dyn KernelMemory>>,
}

impl MemctlContext {
    pub fn new(gadgets: GadgetTable) -> Self {
        MemctlContext { kernel_slide: 0, gadgets, kernel_call_7: None, kernel_memory: None }
    }

    pub fn with_kernel_slide(mut self, slide: u64) -> Self {
        self.kernel_slide = slide;
        self
    }

    pub fn with_kernel_call_7(mut self, call7: impl KernelCall7 + 'static) -> Self {
        self.kernel_call_7 = Some(Box::new(call7));
        self
    }

    pub fn with_kernel_memory(mut self, memory: impl KernelMemory + 'static) -> Self {
        self.kernel_memory = Some(Box::new(memory));
        self
    }

    /// Returns the call-7 primitive, or `FunctionalityUnavailable` if this
    /// context was never configured with one.
    pub fn require_kernel_call_7(&self) -> Result<&dyn KernelCall7, MemctlError> {
        self.kernel_call_7
            .as_deref()
            .ok_or_else(|| MemctlError::functionality_unavailable("no kernel_call_7 collaborator configured"))
    }

    pub fn require_kernel_memory(&self) -> Result<&dyn KernelMemory, MemctlError> {
        self.kernel_memory
            .as_deref()
            .ok_or_else(|| MemctlError::functionality_unavailable("no kernel_memory collaborator configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingCall7;
    impl KernelCall7 for RecordingCall7 {
        fn call(&self, _func: u64, _args: &[u64]) -> Result<u32, MemctlError> {
            Ok(42)
        }
    }

    #[test]
    fn missing_call7_is_functionality_unavailable() {
        let ctx = MemctlContext::new(GadgetTable::new(&[]));
        assert!(matches!(ctx.require_kernel_call_7(), Err(MemctlError::FunctionalityUnavailable { .. })));
    }

    #[test]
    fn configured_call7_is_reachable() {
        let ctx = MemctlContext::new(GadgetTable::new(&[])).with_kernel_call_7(RecordingCall7);
        let result = ctx.require_kernel_call_7().unwrap().call(0, &[]).unwrap();
        assert_eq!(result, 42);
    }
}
