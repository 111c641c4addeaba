//! Recoverable core errors
//!
//! The decode/execute core never panics on bad guest code. Faults that the
//! 8086 itself can't step past — an opcode with no dispatch entry — are
//! recorded on the `Cpu` as a pending error (see `Cpu::take_pending_error`)
//! together with a state snapshot, instead of unwinding the host process.
//! The embedding harness decides what to do with it: halt, report, or
//! restart from a checkpoint.

use core::fmt;
use std::error::Error;

use crate::cpu::snapshot::StateSnapshot;

/// Something the core cannot continue past on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// No dispatch table entry covers this opcode (including ModR/M-reg
    /// extensions the 8086 never defined, and 80186+-only encodings).
    InvalidOpcode {
        opcode: u8,
        cs: u16,
        ip: u16,
        snapshot: StateSnapshot,
    },
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuError::InvalidOpcode { opcode, cs, ip, .. } => write!(
                f,
                "invalid opcode {opcode:#04x} at {cs:04X}:{ip:04X}"
            ),
        }
    }
}

impl Error for CpuError {}
