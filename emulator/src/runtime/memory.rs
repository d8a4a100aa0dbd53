use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use thiserror::Error;

use crate::constants::{Address, Word, DENSE_MEMORY_LIMIT};

/// Represents errors related to memory manipulations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The effective address was negative
    #[error("invalid address {0}")]
    InvalidAddress(Word),
}

/// Convert a computed word to an address
///
/// # Errors
///
/// Fails if the word is negative
pub fn address_from_word(word: Word) -> Result<Address, MemoryError> {
    Address::try_from(word).map_err(|_| MemoryError::InvalidAddress(word))
}

/// Holds the memory cells of the machine.
///
/// Cells never written read as 0. Low addresses live in a buffer that grows on
/// write, higher ones in a sparse map. The buffer always holds the whole
/// program it was loaded from, even past the dense limit, and every key of the
/// map is above the end of the buffer.
#[derive(Debug, Default, Clone, Eq)]
pub struct Memory {
    dense: Vec<Word>,
    sparse: BTreeMap<Address, Word>,
}

impl Memory {
    /// Whether the cell lives in the contiguous buffer
    fn is_dense(&self, address: Address) -> bool {
        address < DENSE_MEMORY_LIMIT.max(self.dense.len())
    }

    /// Non-zero cells, by increasing address
    fn cells(&self) -> impl Iterator<Item = (Address, Word)> + '_ {
        self.dense
            .iter()
            .copied()
            .enumerate()
            .chain(self.sparse.iter().map(|(&address, &value)| (address, value)))
            .filter(|&(_, value)| value != 0)
    }

    /// Get the value of a cell
    #[must_use]
    pub fn get(&self, address: Address) -> Word {
        self[address]
    }

    /// Get a mutable reference to a cell, allocating it if needed
    pub fn get_mut(&mut self, address: Address) -> &mut Word {
        if self.is_dense(address) {
            if address >= self.dense.len() {
                self.dense.resize(address + 1, 0);
            }
            &mut self.dense[address]
        } else {
            self.sparse.entry(address).or_insert(0)
        }
    }

    /// Set the value of a cell
    pub fn set(&mut self, address: Address, value: Word) {
        *self.get_mut(address) = value;
    }

    /// The contiguous low part of the memory, starting at address 0
    #[must_use]
    pub fn as_slice(&self) -> &[Word] {
        &self.dense
    }
}

// Two memories are equal when every cell reads the same, whatever the layout
impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.cells().eq(other.cells())
    }
}

impl Index<Address> for Memory {
    type Output = Word;

    fn index(&self, address: Address) -> &Self::Output {
        let cell = if self.is_dense(address) {
            self.dense.get(address)
        } else {
            self.sparse.get(&address)
        };
        cell.unwrap_or(&0)
    }
}

impl IndexMut<Address> for Memory {
    fn index_mut(&mut self, address: Address) -> &mut Self::Output {
        self.get_mut(address)
    }
}

impl From<&[Word]> for Memory {
    fn from(words: &[Word]) -> Self {
        Self {
            dense: words.to_vec(),
            sparse: BTreeMap::new(),
        }
    }
}
