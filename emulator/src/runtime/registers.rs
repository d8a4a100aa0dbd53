use crate::constants::{Address, Word};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Instruction pointer
    pub ip: Address,

    /// Relative base, added to relative-mode operands
    pub relative_base: Word,
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%ip = {} | %rb = {}", self.ip, self.relative_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_test() {
        let registers = Registers {
            ip: 12,
            relative_base: -3,
        };
        assert_eq!(registers.to_string(), "%ip = 12 | %rb = -3");
    }
}
