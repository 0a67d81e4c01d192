//! Instruction bytes of the restricted 6502 subset the code generator emits.
//!
//! Absolute operands are two bytes, little-endian; the high byte is always
//! `00` since every address fits in the 256-byte image.

/// `LDA #imm` — load constant into the accumulator.
pub const LDA_CONST: u8 = 0xA9;
/// `LDA addr` — load memory into the accumulator.
pub const LDA_MEM: u8 = 0xAD;
/// `STA addr` — store the accumulator into memory.
pub const STA_MEM: u8 = 0x8D;
/// `ADC addr` — add memory into the accumulator.
pub const ADC_MEM: u8 = 0x6D;
/// `LDX #imm` — load constant into the X register.
pub const LDX_CONST: u8 = 0xA2;
/// `LDX addr` — load memory into the X register.
pub const LDX_MEM: u8 = 0xAE;
/// `LDY #imm` — load constant into the Y register.
pub const LDY_CONST: u8 = 0xA0;
/// `LDY addr` — load memory into the Y register.
pub const LDY_MEM: u8 = 0xAC;
/// `CPX addr` — set the Z flag if X equals memory.
pub const CPX_MEM: u8 = 0xEC;
/// `BNE rel` — branch forward by a one-byte offset (wrapping) if Z is clear.
pub const BNE: u8 = 0xD0;
/// `SYS` — syscall: X=1 prints Y as an integer, X=2 prints the
/// zero-terminated string at address Y.
pub const SYS: u8 = 0xFF;
/// `BRK` — halt.
pub const BRK: u8 = 0x00;
