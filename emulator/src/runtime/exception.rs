use thiserror::Error;

use crate::constants::Word;

use super::memory::MemoryError;

/// A fatal condition raised while decoding or executing an instruction
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    #[error("invalid instruction {word}")]
    InvalidInstruction { word: Word },

    #[error("invalid parameter mode {mode} in instruction {word}")]
    InvalidMode { word: Word, mode: Word },

    #[error("immediate parameter used as a write target in instruction {word}")]
    ImmediateWrite { word: Word },

    #[error("invalid memory access ({0})")]
    InvalidMemoryAccess(#[from] MemoryError),

    #[error("arithmetic overflow")]
    Overflow,
}

impl Exception {
    /// Whether the exception comes from a malformed instruction word
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Exception::InvalidInstruction { .. }
                | Exception::InvalidMode { .. }
                | Exception::ImmediateWrite { .. }
        )
    }
}
