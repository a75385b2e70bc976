//! Backend enumeration values.
//!
//! The engine reports and accepts enumerations as plain integers, the way its
//! protobuf schema encodes them. The gateway owns the mapping to SCPI tokens;
//! this module only names the values both sides agree on.

/// Line interface of the transmitter and receiver.
pub mod interface {
    pub const OTU1: i32 = 0;
    pub const OTU2: i32 = 1;
    pub const OTU2E: i32 = 2;
    pub const OTU1E: i32 = 3;
    pub const OTU2F: i32 = 4;
    pub const OTU1F: i32 = 5;
    pub const OTU3: i32 = 6;
    pub const OTU4: i32 = 7;
    pub const STM16: i32 = 8;
    pub const STM64: i32 = 9;
    pub const OC48: i32 = 10;
    pub const OC192: i32 = 11;
}

/// Transmit clock source.
pub mod clock {
    pub const INTERNAL: i32 = 0;
    pub const LOOP: i32 = 1;
    pub const EXTERNAL: i32 = 2;
}

/// Injectable and countable error types.
pub mod error_type {
    pub const FAS: i32 = 0;
    pub const MFAS: i32 = 1;
    pub const OTU_BIP8: i32 = 2;
    pub const OTU_BEI: i32 = 3;
    pub const ODU_BIP8: i32 = 4;
    pub const ODU_BEI: i32 = 5;
    pub const FEC_CORRECTABLE: i32 = 6;
    pub const FEC_UNCORRECTABLE: i32 = 7;
    pub const TCM1_BIP8: i32 = 8;
    pub const TCM2_BIP8: i32 = 9;
    pub const TCM3_BIP8: i32 = 10;
    pub const PATTERN_BIT: i32 = 11;
}

/// Error insertion mode.
pub mod error_mode {
    pub const OFF: i32 = 0;
    pub const RATE: i32 = 1;
    pub const CONTINUOUS: i32 = 2;
}

/// Alarm types, shared by alarm generation and alarm results.
pub mod alarm {
    pub const LOS: i32 = 0;
    pub const LOF: i32 = 1;
    pub const OOF: i32 = 2;
    pub const LOM: i32 = 3;
    pub const OOM: i32 = 4;
    pub const OTU_AIS: i32 = 5;
    pub const OTU_IAE: i32 = 6;
    pub const OTU_BDI: i32 = 7;
    pub const ODU_AIS: i32 = 8;
    pub const ODU_OCI: i32 = 9;
    pub const ODU_LCK: i32 = 10;
    pub const ODU_BDI: i32 = 11;
    pub const OPU_PLM: i32 = 12;
    pub const OPU_CSF: i32 = 13;
}

/// Payload mapping structures.
pub mod mapping {
    pub const PRBS: i32 = 0;
    pub const NULL: i32 = 1;
    pub const ODU0_ODU1: i32 = 2;
    pub const ODU1_ODU2: i32 = 3;
    pub const ODU0_ODU2: i32 = 4;
    pub const ODUFLEX_ODU2: i32 = 5;
    pub const ODU2_ODU3: i32 = 6;
    pub const ODU2_ODU4: i32 = 7;
    pub const STM16_OTU1: i32 = 8;
    pub const STM64_OTU2: i32 = 9;
    pub const GFP: i32 = 10;
}

/// Test pattern carried in the payload.
pub mod pattern {
    pub const PRBS31: i32 = 0;
    pub const PRBS31_INV: i32 = 1;
    pub const PRBS23: i32 = 2;
    pub const PRBS23_INV: i32 = 3;
    pub const PRBS15: i32 = 4;
    pub const PRBS9: i32 = 5;
    pub const ALL_ZERO: i32 = 6;
    pub const ALL_ONE: i32 = 7;
    pub const USER: i32 = 8;
}
