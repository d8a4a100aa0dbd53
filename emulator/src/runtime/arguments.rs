use crate::constants::Word;

use super::exception::Exception;

/// How an operand is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The operand is an address
    Position,

    /// The operand is the value itself
    Immediate,

    /// The operand is an offset from the relative base
    Relative,
}

impl Mode {
    /// Decode a single mode digit
    pub(crate) fn from_digit(digit: Word, word: Word) -> Result<Self, Exception> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 => Ok(Mode::Relative),
            mode => Err(Exception::InvalidMode { word, mode }),
        }
    }
}

/// An instruction operand, tagged with its addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Position(Word),
    Immediate(Word),
    Relative(Word),
}

impl Param {
    #[must_use]
    pub const fn new(mode: Mode, value: Word) -> Self {
        match mode {
            Mode::Position => Param::Position(value),
            Mode::Immediate => Param::Immediate(value),
            Mode::Relative => Param::Relative(value),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            Param::Position(_) => Mode::Position,
            Param::Immediate(_) => Mode::Immediate,
            Param::Relative(_) => Mode::Relative,
        }
    }

    /// The raw operand, as stored in memory
    #[must_use]
    pub const fn raw(&self) -> Word {
        match self {
            Param::Position(v) | Param::Immediate(v) | Param::Relative(v) => *v,
        }
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Position(address) => write!(f, "[{address}]"),
            Self::Immediate(value) => write!(f, "{value}"),
            Self::Relative(offset) => write!(f, "[rb{offset:+}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_digit_test() {
        assert_eq!(Mode::from_digit(0, 1), Ok(Mode::Position));
        assert_eq!(Mode::from_digit(1, 101), Ok(Mode::Immediate));
        assert_eq!(Mode::from_digit(2, 201), Ok(Mode::Relative));
        assert_eq!(
            Mode::from_digit(3, 301),
            Err(Exception::InvalidMode { word: 301, mode: 3 })
        );
    }

    #[test]
    fn param_test() {
        let param = Param::new(Mode::Relative, -4);
        assert_eq!(param, Param::Relative(-4));
        assert_eq!(param.mode(), Mode::Relative);
        assert_eq!(param.raw(), -4);
    }

    #[test]
    fn display_test() {
        assert_eq!(Param::Position(9).to_string(), "[9]");
        assert_eq!(Param::Immediate(-1).to_string(), "-1");
        assert_eq!(Param::Relative(-1).to_string(), "[rb-1]");
        assert_eq!(Param::Relative(5).to_string(), "[rb+5]");
    }
}
