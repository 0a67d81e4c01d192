use finch_image::{Image, disassemble};

use super::EmitError;
use super::emitter::generate;
use crate::diagnostics::Diagnostics;
use crate::parser::{Parser, lex};

/// Full front-end pipeline, then emission.
fn try_image(source: &str) -> Result<Image, EmitError> {
    let lexed = lex(source);
    assert_eq!(lexed.diagnostics.error_count(), 0, "lexer errors");
    let tokens = lexed.tokens.clone();
    let parsed = Parser::new(source, lexed.tokens, lexed.end).parse();
    assert_eq!(parsed.diagnostics.error_count(), 0, "parser errors");
    let mut analysis = crate::analyze::analyze(&parsed.root, &tokens);
    assert_eq!(analysis.diagnostics.error_count(), 0, "analysis errors");

    let mut diag = Diagnostics::new();
    generate(&analysis.ast, &mut analysis.symbols, &mut diag)
}

fn image_of(source: &str) -> Image {
    try_image(source).expect("program fits in the image")
}

#[test]
fn print_constant_loads_y_and_syscalls() {
    let image = image_of("{print(3)}$");

    assert_eq!(&image.as_bytes()[..6], &[0xA0, 0x03, 0xA2, 0x01, 0xFF, 0x00]);
    assert!(image.as_bytes()[6..].iter().all(|&b| b == 0));
}

#[test]
fn declare_assign_print_backpatches_the_slot_past_the_code() {
    let image = image_of("{int a a=5 print(a)}$");

    // The static slot lands immediately after the trailing BRK (0x11).
    assert_eq!(
        &image.as_bytes()[..17],
        &[
            0xA9, 0x00, 0x8D, 0x11, 0x00, // LDA #0; STA a
            0xA9, 0x05, 0x8D, 0x11, 0x00, // LDA #5; STA a
            0xAC, 0x11, 0x00, // LDY a
            0xA2, 0x01, // LDX #1
            0xFF, // SYS
            0x00, // BRK
        ]
    );

    insta::assert_snapshot!(disassemble(&image), @r"
    0000  A9 00     LDA #$00
    0002  8D 11 00  STA $0011
    0005  A9 05     LDA #$05
    0007  8D 11 00  STA $0011
    000A  AC 11 00  LDY $0011
    000D  A2 01     LDX #$01
    000F  FF        SYS
    0010  00        BRK
    ");
}

#[test]
fn string_literal_lands_at_the_top_of_the_heap() {
    let image = image_of("{print(\"hi\")}$");

    assert_eq!(
        &image.as_bytes()[..6],
        &[0xA0, 0xFD, 0xA2, 0x02, 0xFF, 0x00]
    );
    assert_eq!(&image.as_bytes()[0xFD..], &[0x68, 0x69, 0x00]);
}

#[test]
fn identical_string_literals_share_one_heap_copy() {
    let image = image_of("{print(\"hi\") print(\"hi\")}$");

    assert_eq!(
        &image.as_bytes()[..11],
        &[0xA0, 0xFD, 0xA2, 0x02, 0xFF, 0xA0, 0xFD, 0xA2, 0x02, 0xFF, 0x00]
    );
    // A second copy would sit below 0xFD; nothing was written there.
    assert!(image.as_bytes()[0xF0..0xFD].iter().all(|&b| b == 0));
}

#[test]
fn shadowed_variables_get_distinct_slots() {
    let image = image_of("{int a {int a a=1} a=2}$");
    let bytes = image.as_bytes();

    // Outer declaration and outer assignment share a slot; the inner pair
    // shares the other.
    assert_eq!(bytes[3], 0x15);
    assert_eq!(bytes[8], 0x16);
    assert_eq!(bytes[13], 0x16);
    assert_eq!(bytes[18], 0x15);
}

#[test]
fn boolean_declaration_is_zero_initialized() {
    let image = image_of("{boolean b}$");
    assert_eq!(&image.as_bytes()[..5], &[0xA9, 0x00, 0x8D, 0x06, 0x00]);
}

#[test]
fn string_declaration_emits_no_initializer() {
    let image = image_of("{string s}$");
    // Only the trailing BRK.
    assert!(image.as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn if_statement_branches_over_its_block() {
    let image = image_of("{if (1 == 2) {print(9)}}$");

    insta::assert_snapshot!(disassemble(&image), @r"
    0000  A9 01     LDA #$01
    0002  8D 2B 00  STA $002B
    0005  A9 02     LDA #$02
    0007  8D 2C 00  STA $002C
    000A  AE 2C 00  LDX $002C
    000D  EC 2B 00  CPX $002B
    0010  A9 00     LDA #$00
    0012  D0 02     BNE $02
    0014  A9 01     LDA #$01
    0016  8D FF 00  STA $00FF
    0019  A2 01     LDX #$01
    001B  EC FF 00  CPX $00FF
    001E  A9 00     LDA #$00
    0020  8D FF 00  STA $00FF
    0023  D0 05     BNE $05
    0025  A0 09     LDY #$09
    0027  A2 01     LDX #$01
    0029  FF        SYS
    002A  00        BRK
    ");
}

#[test]
fn while_statement_jumps_back_with_a_wrapped_offset() {
    let image = image_of("{while (1 == 1) {}}$");

    insta::assert_snapshot!(disassemble(&image), @r"
    0000  A9 01     LDA #$01
    0002  8D 32 00  STA $0032
    0005  A9 01     LDA #$01
    0007  8D 33 00  STA $0033
    000A  AE 33 00  LDX $0033
    000D  EC 32 00  CPX $0032
    0010  A9 00     LDA #$00
    0012  D0 02     BNE $02
    0014  A9 01     LDA #$01
    0016  8D FF 00  STA $00FF
    0019  A2 01     LDX #$01
    001B  EC FF 00  CPX $00FF
    001E  A9 00     LDA #$00
    0020  8D FF 00  STA $00FF
    0023  D0 0C     BNE $0C
    0025  A9 00     LDA #$00
    0027  8D FF 00  STA $00FF
    002A  A2 01     LDX #$01
    002C  EC FF 00  CPX $00FF
    002F  D0 CF     BNE $CF
    0031  00        BRK
    ");
}

#[test]
fn oversized_program_fails_with_image_overflow() {
    let source = format!("{{print(\"{}\")}}$", "a".repeat(250));
    assert_eq!(try_image(&source), Err(EmitError::ImageOverflow));
}

#[test]
fn compilation_is_idempotent() {
    let source = "{int a a=1+2 if (a == 3) {print(a)}}$";
    assert_eq!(image_of(source), image_of(source));
}

#[test]
fn hex_dump_has_every_placeholder_resolved() {
    let image = image_of("{int a int b a=1 b=2 print(a)}$");
    let dump = image.to_string();

    for word in dump.split_whitespace() {
        assert_eq!(word.len(), 2);
        assert!(u8::from_str_radix(word, 16).is_ok());
    }
    assert_eq!(dump.lines().count(), 32);
}
