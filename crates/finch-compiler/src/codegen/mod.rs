//! Code generation: AST + symbol table → 256-byte image.

mod emitter;

#[cfg(test)]
mod emitter_tests;

pub use emitter::generate;

/// Fatal per-program emission failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    /// Code and static data collided with the string heap (or the reserved
    /// scratch byte).
    #[error("Program exceeds 256 bytes")]
    ImageOverflow,
}
