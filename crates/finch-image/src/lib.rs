//! Machine-code image format for the finch compiler and VM.
//!
//! This crate contains:
//! - The fixed 256-byte [`Image`] the code generator fills and the VM executes
//! - Instruction byte constants ([`opcodes`])
//! - A human-readable disassembly ([`dump::disassemble`])

pub mod dump;
pub mod image;
pub mod opcodes;

pub use dump::disassemble;
pub use image::{IMAGE_SIZE, Image, SCRATCH_ADDR};
