//! The error taxonomy and the thread-local error stack.

use std::cell::RefCell;
use thiserror::Error;

/// The full set of failures the core can report.
///
/// Each variant carries the payload needed to act on it (path, address,
/// formatted message); callers that only care about the kind can match on
/// the discriminant without reaching into the payload.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MemctlError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("interrupted")]
    Interrupted,
    #[error("internal invariant violated: {message}")]
    Invariant { message: String },
    #[error("initialization failed: {message}")]
    Initialization { message: String },
    #[error("required API is not available: {api}")]
    ApiUnavailable { api: String },
    #[error("functionality unavailable: {reason}")]
    FunctionalityUnavailable { reason: String },
    #[error("kernel I/O error at {address:#x}: {message}")]
    KernelIo { address: u64, message: String },
    #[error("address {address:#x} is not accessible with the requested protection")]
    AddressProtection { address: u64 },
    #[error("address {address:#x} is not mapped")]
    AddressUnmapped { address: u64 },
    #[error("address {address:#x} is mapped but not accessible")]
    AddressInaccessible { address: u64 },
    #[error("failed to parse Mach-O image: {message}")]
    MachoParse { message: String },
    #[error("kernelcache error: {message}")]
    Kernelcache { message: String },
    #[error("internal error: {message}")]
    Core { message: String },
}

impl MemctlError {
    pub fn invariant(message: impl Into<String>) -> Self {
        MemctlError::Invariant { message: message.into() }
    }

    pub fn functionality_unavailable(reason: impl Into<String>) -> Self {
        MemctlError::FunctionalityUnavailable { reason: reason.into() }
    }

    pub fn kernel_io(address: u64, message: impl Into<String>) -> Self {
        MemctlError::KernelIo { address, message: message.into() }
    }
}

/// A thread-local stack of errors, mirroring the original C library's
/// push/pop error API.
///
/// Components push a `MemctlError` as they fail; a CLI-style collaborator
/// reads the stack bottom-up to print a descending error chain. `suppress`
/// returns an RAII guard that drops pushes made while it is held, standing
/// in for the source's stop-counter: components that attempt a compensating
/// action without wanting every intermediate failure recorded hold the
/// guard across that attempt.
#[derive(Debug, Default)]
pub struct ErrorStack {
    entries: RefCell<Vec<MemctlError>>,
    suppressed: RefCell<u32>,
}

thread_local! {
    static ERROR_STACK: ErrorStack = ErrorStack::default();
}

impl ErrorStack {
    pub fn push(&self, error: MemctlError) {
        if *self.suppressed.borrow() == 0 {
            self.entries.borrow_mut().push(error);
        }
    }

    pub fn pop(&self) -> Option<MemctlError> {
        self.entries.borrow_mut().pop()
    }

    pub fn drain(&self) -> Vec<MemctlError> {
        self.entries.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Push an error onto the calling thread's error stack.
pub fn push_error(error: MemctlError) {
    ERROR_STACK.with(|stack| stack.push(error));
}

/// Drain the calling thread's error stack, bottom-up (oldest push first).
pub fn drain_errors() -> Vec<MemctlError> {
    ERROR_STACK.with(|stack| {
        let mut drained = stack.drain();
        drained.reverse();
        drained
    })
}

/// An RAII guard that suppresses pushes to the calling thread's error stack
/// for its lifetime. Nests: the stack is only un-suppressed once every
/// outstanding guard has dropped.
pub struct Suppress {
    _private: (),
}

impl Suppress {
    pub fn new() -> Self {
        ERROR_STACK.with(|stack| *stack.suppressed.borrow_mut() += 1);
        Suppress { _private: () }
    }
}

impl Default for Suppress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Suppress {
    fn drop(&mut self) {
        ERROR_STACK.with(|stack| *stack.suppressed.borrow_mut() -= 1);
    }
}

/// Suppress error-stack pushes made by `f` and return its result.
pub fn suppress<T>(f: impl FnOnce() -> T) -> T {
    let _guard = Suppress::new();
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_is_fifo() {
        let _ = drain_errors();
        push_error(MemctlError::OutOfMemory);
        push_error(MemctlError::Interrupted);
        let drained = drain_errors();
        assert_eq!(drained, vec![MemctlError::OutOfMemory, MemctlError::Interrupted]);
        assert!(drain_errors().is_empty());
    }

    #[test]
    fn suppress_drops_pushes() {
        let _ = drain_errors();
        suppress(|| push_error(MemctlError::Interrupted));
        assert!(drain_errors().is_empty());
    }
}
