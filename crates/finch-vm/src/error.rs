//! Runtime failures.

/// Errors raised while executing an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("invalid opcode {opcode:#04X} at {at:#04X}")]
    InvalidOpcode { opcode: u8, at: u8 },

    /// Absolute operand with a nonzero high byte; every valid address fits
    /// in one byte.
    #[error("address {addr:#06X} is outside the 256-byte image")]
    AddressOutOfRange { addr: u16 },

    #[error("syscall with unsupported X={x}")]
    InvalidSyscall { x: u8 },

    /// A string print ran through all 256 bytes without a zero terminator.
    #[error("unterminated string at {addr:#04X}")]
    UnterminatedString { addr: u8 },

    /// Execution fuel exhausted (runaway loop).
    #[error("execution limit exceeded")]
    FuelExhausted,
}
