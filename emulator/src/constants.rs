/// A memory cell, an operand or an I/O value
pub type Word = i64;

/// An effective memory address
pub type Address = usize;

/// Addresses below this limit are backed by a contiguous buffer, the others by
/// a sparse map
pub(crate) const DENSE_MEMORY_LIMIT: Address = 1 << 20;

/// Number of decimal digits taken by the opcode in an instruction word
pub(crate) const OPCODE_DIGITS: u32 = 2;
