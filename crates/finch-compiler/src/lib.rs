//! Finch: a batch compiler for a tiny statically-typed language, emitting
//! 256-byte 6502-style machine-code images.
//!
//! # Example
//!
//! ```
//! use finch_compiler::Compilation;
//!
//! let compiled = Compilation::new("{print(3)}$").run();
//! assert!(!compiled.has_errors());
//!
//! let image = compiled.image.expect("clean program compiles");
//! assert_eq!(&image.as_bytes()[..6], &[0xA0, 0x03, 0xA2, 0x01, 0xFF, 0x00]);
//! ```

pub mod analyze;
pub mod codegen;
pub mod diagnostics;
pub mod parser;
pub mod source;
mod stages;

pub use codegen::EmitError;
pub use diagnostics::{Diagnostics, DiagnosticsPrinter, LineCol, Severity, Stage};
pub use source::split_programs;
pub use stages::{Compilation, Compiled};
