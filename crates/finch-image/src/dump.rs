//! Human-readable disassembly of the code segment of an image.

use std::fmt::Write as _;

use crate::image::Image;
use crate::opcodes;

/// Disassembles the code segment, starting at `0x00` and stopping after the
/// first `BRK`. Bytes that do not decode as an instruction are rendered as
/// `.byte`, so a corrupt image still dumps fully.
pub fn disassemble(image: &Image) -> String {
    let mut out = String::new();
    let mut pc = 0usize;

    while pc < crate::IMAGE_SIZE {
        let opcode = image[pc];
        let at = pc;
        pc += 1;

        match opcode {
            opcodes::BRK => {
                line(&mut out, at, &[opcode], "BRK");
                break;
            }
            opcodes::SYS => {
                line(&mut out, at, &[opcode], "SYS");
            }
            opcodes::LDA_CONST | opcodes::LDX_CONST | opcodes::LDY_CONST | opcodes::BNE => {
                let Some(operand) = byte_at(image, pc) else {
                    line(&mut out, at, &[opcode], ".byte");
                    break;
                };
                pc += 1;
                let text = match opcode {
                    opcodes::LDA_CONST => format!("LDA #${:02X}", operand),
                    opcodes::LDX_CONST => format!("LDX #${:02X}", operand),
                    opcodes::LDY_CONST => format!("LDY #${:02X}", operand),
                    _ => format!("BNE ${:02X}", operand),
                };
                line(&mut out, at, &[opcode, operand], &text);
            }
            opcodes::LDA_MEM
            | opcodes::STA_MEM
            | opcodes::ADC_MEM
            | opcodes::LDX_MEM
            | opcodes::LDY_MEM
            | opcodes::CPX_MEM => {
                let (Some(lo), Some(hi)) = (byte_at(image, pc), byte_at(image, pc + 1)) else {
                    line(&mut out, at, &[opcode], ".byte");
                    break;
                };
                pc += 2;
                let mnemonic = match opcode {
                    opcodes::LDA_MEM => "LDA",
                    opcodes::STA_MEM => "STA",
                    opcodes::ADC_MEM => "ADC",
                    opcodes::LDX_MEM => "LDX",
                    opcodes::LDY_MEM => "LDY",
                    _ => "CPX",
                };
                let text = format!("{} ${:02X}{:02X}", mnemonic, hi, lo);
                line(&mut out, at, &[opcode, lo, hi], &text);
            }
            other => {
                line(&mut out, at, &[other], ".byte");
            }
        }
    }

    out
}

fn byte_at(image: &Image, index: usize) -> Option<u8> {
    (index < crate::IMAGE_SIZE).then(|| image[index])
}

fn line(out: &mut String, addr: usize, bytes: &[u8], text: &str) {
    let mut hex = String::new();
    for byte in bytes {
        if !hex.is_empty() {
            hex.push(' ');
        }
        let _ = write!(hex, "{:02X}", byte);
    }
    let _ = writeln!(out, "{:04X}  {:<9} {}", addr, hex, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::*;

    #[test]
    fn disassembles_print_of_constant() {
        // LDY #$03; LDX #$01; SYS; BRK
        let mut image = Image::new();
        for (i, b) in [LDY_CONST, 0x03, LDX_CONST, 0x01, SYS, BRK]
            .into_iter()
            .enumerate()
        {
            image[i] = b;
        }

        insta::assert_snapshot!(disassemble(&image), @r"
        0000  A0 03     LDY #$03
        0002  A2 01     LDX #$01
        0004  FF        SYS
        0005  00        BRK
        ");
    }

    #[test]
    fn disassembles_absolute_operands_little_endian() {
        let mut image = Image::new();
        for (i, b) in [LDA_MEM, 0x2A, 0x00, STA_MEM, 0x2B, 0x00, BRK]
            .into_iter()
            .enumerate()
        {
            image[i] = b;
        }

        insta::assert_snapshot!(disassemble(&image), @r"
        0000  AD 2A 00  LDA $002A
        0003  8D 2B 00  STA $002B
        0006  00        BRK
        ");
    }

    #[test]
    fn unknown_byte_renders_as_raw() {
        let mut image = Image::new();
        image[0] = 0x42;
        image[1] = BRK;

        let dump = disassemble(&image);
        assert!(dump.contains(".byte"));
    }
}
