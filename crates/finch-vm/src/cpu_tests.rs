use finch_compiler::Compilation;
use finch_image::{Image, opcodes};

use super::cpu::{Cpu, execute};
use super::error::RuntimeError;

/// Compile a clean program and hand its image to the VM.
fn run(source: &str) -> String {
    let compiled = Compilation::new(source).run();
    assert!(
        !compiled.has_errors(),
        "unexpected errors:\n{}",
        compiled.diagnostics.printer().render()
    );
    execute(&compiled.image.expect("image emitted")).expect("program runs to BRK")
}

#[test]
fn prints_an_integer_constant() {
    assert_eq!(run("{print(3)}$"), "3");
}

#[test]
fn prints_a_string_literal() {
    assert_eq!(run("{print(\"hi\")}$"), "hi");
}

#[test]
fn prints_a_variable() {
    assert_eq!(run("{int a a=5 print(a)}$"), "5");
}

#[test]
fn prints_a_string_variable() {
    assert_eq!(run("{string s s=\"hey there\" print(s)}$"), "hey there");
}

#[test]
fn addition_chains_accumulate() {
    assert_eq!(run("{int a a=1+2+3 print(a)}$"), "6");
    assert_eq!(run("{int a int b b=4 a=9+b print(a)}$"), "13");
}

#[test]
fn booleans_print_as_zero_or_one() {
    assert_eq!(run("{print(true)}$"), "1");
    assert_eq!(run("{print(false)}$"), "0");
    assert_eq!(run("{print((1 == 1))}$"), "1");
    assert_eq!(run("{print((1 != 1))}$"), "0");
}

#[test]
fn uninitialized_numerics_read_zero() {
    assert_eq!(run("{int a print(a)}$"), "0");
    assert_eq!(run("{boolean b print(b)}$"), "0");
}

#[test]
fn if_branches_on_the_condition() {
    assert_eq!(run("{int a a=3 if (a == 3) {print(a)}}$"), "3");
    assert_eq!(run("{if (1 == 2) {print(9)} print(7)}$"), "7");
    assert_eq!(run("{if true {print(1)}}$"), "1");
    assert_eq!(run("{if false {print(1)}}$"), "");
}

#[test]
fn while_loops_until_the_condition_fails() {
    assert_eq!(run("{int a a=0 while (a != 3) {print(a) a=1+a}}$"), "012");
}

#[test]
fn while_with_false_condition_never_enters() {
    assert_eq!(run("{int a while (1 == 2) {a=1+a} print(a)}$"), "0");
}

#[test]
fn shadowed_variables_read_their_own_slots() {
    assert_eq!(run("{int a a=1 {int a a=2 print(a)} print(a)}$"), "21");
}

#[test]
fn string_comparison_compares_pooled_pointers() {
    assert_eq!(run("{boolean b b=(\"hi\" == \"hi\") print(b)}$"), "1");
    assert_eq!(run("{boolean b b=(\"hi\" != \"ho\") print(b)}$"), "1");
}

#[test]
fn comparison_chains_evaluate_inside_out() {
    assert_eq!(run("{print((true == (1 != 2)))}$"), "1");
}

#[test]
fn runaway_loop_exhausts_fuel() {
    let compiled = Compilation::new("{while (1 == 1) {}}$").run();
    let image = compiled.image.expect("image emitted");
    let result = Cpu::new(&image).with_fuel(10_000).run();
    assert_eq!(result, Err(RuntimeError::FuelExhausted));
}

#[test]
fn empty_image_halts_immediately() {
    assert_eq!(execute(&Image::new()), Ok(String::new()));
}

#[test]
fn invalid_opcode_is_reported_with_its_position() {
    let mut image = Image::new();
    image[0] = 0x42;
    assert_eq!(
        execute(&image),
        Err(RuntimeError::InvalidOpcode {
            opcode: 0x42,
            at: 0
        })
    );
}

#[test]
fn invalid_syscall_mode_is_reported() {
    let mut image = Image::new();
    for (i, b) in [opcodes::LDX_CONST, 0x07, opcodes::SYS].into_iter().enumerate() {
        image[i] = b;
    }
    assert_eq!(execute(&image), Err(RuntimeError::InvalidSyscall { x: 7 }));
}

#[test]
fn nonzero_high_address_byte_is_rejected() {
    let mut image = Image::new();
    for (i, b) in [opcodes::LDA_MEM, 0x00, 0x01].into_iter().enumerate() {
        image[i] = b;
    }
    assert_eq!(
        execute(&image),
        Err(RuntimeError::AddressOutOfRange { addr: 0x0100 })
    );
}
