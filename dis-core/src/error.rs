use std::fmt;

use crate::cpu::Mode;

/// The three error kinds the analysis pipeline ever bubbles out of `process()`.
///
/// Every other entry in the taxonomy described by the design (overlap with the
/// vector table, instruction overlap, unknown opcodes, an exhausted jump-engine
/// table, a code/data log longer than the PRG) is recovered locally: it is
/// absorbed into offset notes or worklist state and never becomes one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisasmError {
    /// A structural misconfiguration of the address mapper, caught at
    /// construction time (e.g. a bank size that isn't a multiple of the
    /// window size).
    StructuralConfig(String),
    /// A read outside the region the mapper has backed with a bank.
    MemoryRead { addr: u16 },
    /// The parameter reader for `mode` could not consume an operand at `addr`
    /// (for example, it ran past the end of the PRG image).
    OperandDecode { addr: u16, mode: Mode },
}

impl fmt::Display for DisasmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisasmError::StructuralConfig(message) => {
                write!(f, "structural configuration error: {message}")
            }
            DisasmError::MemoryRead { addr } => {
                write!(f, "reading memory at address {addr:04X}")
            }
            DisasmError::OperandDecode { addr, mode } => {
                write!(f, "decoding {mode:?} operand at address {addr:04X}")
            }
        }
    }
}

impl std::error::Error for DisasmError {}

pub type DisasmResult<T> = Result<T, DisasmError>;
