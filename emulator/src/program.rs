use parse_display::Display;

use crate::constants::{Address, Word};
use crate::parser::{parse_words, ParseError};
use crate::runtime::{Instruction, Memory};

/// A parsed Intcode program
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    words: Vec<Word>,
}

impl Program {
    #[must_use]
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Decode the program linearly, starting at address 0
    #[must_use]
    pub fn disassemble(&self) -> Disassembly {
        Disassembly {
            memory: Memory::from(self.words()),
            address: 0,
            end: self.words.len(),
        }
    }
}

impl From<Vec<Word>> for Program {
    fn from(words: Vec<Word>) -> Self {
        Self::new(words)
    }
}

impl std::str::FromStr for Program {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_words(s).map(Self::new)
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{word}")?;
        }
        Ok(())
    }
}

/// A line of a disassembly listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Line {
    #[display("{0}")]
    Instruction(Instruction),

    /// A word that does not decode to an instruction
    #[display(".word {0}")]
    Data(Word),
}

impl Line {
    /// Number of memory cells covered by the line
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Instruction(inst) => inst.size(),
            Self::Data(_) => 1,
        }
    }
}

pub struct Disassembly {
    memory: Memory,
    address: Address,
    end: Address,
}

impl Iterator for Disassembly {
    type Item = (Address, Line);

    fn next(&mut self) -> Option<Self::Item> {
        if self.address >= self.end {
            return None;
        }

        let address = self.address;
        let line = match Instruction::decode(&self.memory, address) {
            Ok(inst) if address + inst.size() <= self.end => Line::Instruction(inst),
            _ => Line::Data(self.memory[address]),
        };
        self.address += line.size();
        Some((address, line))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn listing(source: &str) -> String {
        let program: Program = source.parse().unwrap();
        program
            .disassemble()
            .map(|(address, line)| format!("{address}: {line}\n"))
            .collect()
    }

    #[test]
    fn display_test() {
        let program: Program = " 1, 9,10,3,\n2,-3 ".parse().unwrap();
        assert_eq!(program.words(), &[1, 9, 10, 3, 2, -3]);
        assert_eq!(program.to_string(), "1,9,10,3,2,-3");
        assert_eq!(program.to_string().parse::<Program>(), Ok(program));
    }

    #[test]
    fn disassemble_test() {
        assert_eq!(
            listing("1,9,10,3,2,3,11,0,99,30,40,50"),
            indoc! {"
                0: add  [9], [10], [3]
                4: mul  [3], [11], [0]
                8: halt
                9: .word 30
                10: .word 40
                11: .word 50
            "}
        );

        assert_eq!(
            listing("109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99"),
            indoc! {"
                0: arb  1
                2: out  [rb-1]
                4: add  [100], 1, [100]
                8: eq   [100], 16, [101]
                12: jz   [101], 0
                15: halt
            "}
        );
    }

    #[test]
    fn disassemble_truncated_test() {
        // The last instruction would read past the end of the program
        assert_eq!(
            listing("104,7,1,0"),
            indoc! {"
                0: out  7
                2: .word 1
                3: .word 0
            "}
        );
    }
}
