use parse_display::Display;
use tracing::debug;

use crate::constants::{Address, Word, OPCODE_DIGITS};

use super::{
    arguments::{Mode, Param},
    exception::Exception,
    memory::Memory,
    Machine, Status,
};

/// Operation selected by the two low decimal digits of an instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Add = 1,
    Multiply = 2,
    Input = 3,
    Output = 4,
    JumpIfTrue = 5,
    JumpIfFalse = 6,
    LessThan = 7,
    Equals = 8,
    AdjustRelativeBase = 9,
    Halt = 99,
}

impl Opcode {
    /// Extract the opcode of an instruction word
    ///
    /// # Errors
    ///
    /// Fails if the word is negative or the opcode is unknown
    pub fn from_word(word: Word) -> Result<Self, Exception> {
        if word < 0 {
            return Err(Exception::InvalidInstruction { word });
        }

        match word % 10_i64.pow(OPCODE_DIGITS) {
            1 => Ok(Opcode::Add),
            2 => Ok(Opcode::Multiply),
            3 => Ok(Opcode::Input),
            4 => Ok(Opcode::Output),
            5 => Ok(Opcode::JumpIfTrue),
            6 => Ok(Opcode::JumpIfFalse),
            7 => Ok(Opcode::LessThan),
            8 => Ok(Opcode::Equals),
            9 => Ok(Opcode::AdjustRelativeBase),
            99 => Ok(Opcode::Halt),
            _ => Err(Exception::InvalidInstruction { word }),
        }
    }

    /// Number of parameters following the instruction word
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelativeBase => 1,
            Opcode::Halt => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Instruction {
    /// Add two values
    #[display("add  {0}, {1}, {2}")]
    Add(Param, Param, Param),

    /// Multiply two values
    #[display("mul  {0}, {1}, {2}")]
    Multiply(Param, Param, Param),

    /// Take a value from the input queue
    #[display("in   {0}")]
    Input(Param),

    /// Push a value on the output queue
    #[display("out  {0}")]
    Output(Param),

    /// Jump if the value is not zero
    #[display("jnz  {0}, {1}")]
    JumpIfTrue(Param, Param),

    /// Jump if the value is zero
    #[display("jz   {0}, {1}")]
    JumpIfFalse(Param, Param),

    /// Store 1 if the first value is strictly less than the second, 0 otherwise
    #[display("lt   {0}, {1}, {2}")]
    LessThan(Param, Param, Param),

    /// Store 1 if both values are equal, 0 otherwise
    #[display("eq   {0}, {1}, {2}")]
    Equals(Param, Param, Param),

    /// Move the relative base
    #[display("arb  {0}")]
    AdjustRelativeBase(Param),

    /// Stop the machine
    #[display("halt")]
    Halt,
}

/// Reject immediate operands where an address is needed
fn write_target(param: Param, word: Word) -> Result<Param, Exception> {
    match param.mode() {
        Mode::Immediate => Err(Exception::ImmediateWrite { word }),
        Mode::Position | Mode::Relative => Ok(param),
    }
}

impl Instruction {
    /// Decode the instruction stored at `ip`
    ///
    /// # Errors
    ///
    /// Fails on unknown opcodes, unknown mode digits and immediate write
    /// targets.
    pub fn decode(memory: &Memory, ip: Address) -> Result<Self, Exception> {
        let word = memory[ip];
        let opcode = Opcode::from_word(word)?;

        // Mode digits, parameter 1 being the least significant
        let mut modes = word / 10_i64.pow(OPCODE_DIGITS);
        let mut param = |offset: Address| -> Result<Param, Exception> {
            let mode = Mode::from_digit(modes % 10, word)?;
            modes /= 10;
            Ok(Param::new(mode, memory[ip + offset]))
        };

        let instruction = match opcode {
            Opcode::Add => Self::Add(param(1)?, param(2)?, write_target(param(3)?, word)?),
            Opcode::Multiply => {
                Self::Multiply(param(1)?, param(2)?, write_target(param(3)?, word)?)
            }
            Opcode::Input => Self::Input(write_target(param(1)?, word)?),
            Opcode::Output => Self::Output(param(1)?),
            Opcode::JumpIfTrue => Self::JumpIfTrue(param(1)?, param(2)?),
            Opcode::JumpIfFalse => Self::JumpIfFalse(param(1)?, param(2)?),
            Opcode::LessThan => {
                Self::LessThan(param(1)?, param(2)?, write_target(param(3)?, word)?)
            }
            Opcode::Equals => Self::Equals(param(1)?, param(2)?, write_target(param(3)?, word)?),
            Opcode::AdjustRelativeBase => Self::AdjustRelativeBase(param(1)?),
            Opcode::Halt => Self::Halt,
        };

        Ok(instruction)
    }

    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Add(..) => Opcode::Add,
            Self::Multiply(..) => Opcode::Multiply,
            Self::Input(_) => Opcode::Input,
            Self::Output(_) => Opcode::Output,
            Self::JumpIfTrue(..) => Opcode::JumpIfTrue,
            Self::JumpIfFalse(..) => Opcode::JumpIfFalse,
            Self::LessThan(..) => Opcode::LessThan,
            Self::Equals(..) => Opcode::Equals,
            Self::AdjustRelativeBase(_) => Opcode::AdjustRelativeBase,
            Self::Halt => Opcode::Halt,
        }
    }

    /// Number of memory cells taken by the instruction
    #[must_use]
    pub const fn size(&self) -> usize {
        1 + self.opcode().arity()
    }

    /// Execute the instruction
    ///
    /// The instruction pointer is moved past the instruction, unless it jumped,
    /// halted or is waiting for input.
    #[tracing::instrument(skip(machine), level = "trace")]
    pub(crate) fn execute(&self, machine: &mut Machine) -> Result<Status, Exception> {
        use Instruction::{
            Add, AdjustRelativeBase, Equals, Halt, Input, JumpIfFalse, JumpIfTrue, LessThan,
            Multiply, Output,
        };

        let mut next = machine.registers.ip + self.size();

        let status = match *self {
            Add(a, b, target) => {
                let a = machine.read(a)?;
                let b = machine.read(b)?;
                let res = a.checked_add(b).ok_or(Exception::Overflow)?;
                debug!("{} + {} = {}", a, b, res);
                machine.write(target, res)?;
                Status::Continuing
            }

            Multiply(a, b, target) => {
                let a = machine.read(a)?;
                let b = machine.read(b)?;
                let res = a.checked_mul(b).ok_or(Exception::Overflow)?;
                debug!("{} * {} = {}", a, b, res);
                machine.write(target, res)?;
                Status::Continuing
            }

            Input(target) => {
                // Nothing is touched until a value is available, so that the
                // instruction can be attempted again
                let address = machine.resolve(target)?;
                let Some(value) = machine.next_input() else {
                    debug!("Input queue is empty");
                    return Ok(Status::NeedsInput);
                };
                debug!(value, address, "Read input");
                machine.memory[address] = value;
                Status::Continuing
            }

            Output(source) => {
                let value = machine.read(source)?;
                debug!(value, "Write output");
                machine.output.push_front(value);
                Status::ProducedOutput(value)
            }

            JumpIfTrue(condition, target) => {
                if machine.read(condition)? != 0 {
                    next = machine.jump_target(target)?;
                }
                Status::Continuing
            }

            JumpIfFalse(condition, target) => {
                if machine.read(condition)? == 0 {
                    next = machine.jump_target(target)?;
                }
                Status::Continuing
            }

            LessThan(a, b, target) => {
                let a = machine.read(a)?;
                let b = machine.read(b)?;
                debug!("{} < {} = {}", a, b, a < b);
                machine.write(target, Word::from(a < b))?;
                Status::Continuing
            }

            Equals(a, b, target) => {
                let a = machine.read(a)?;
                let b = machine.read(b)?;
                debug!("{} == {} = {}", a, b, a == b);
                machine.write(target, Word::from(a == b))?;
                Status::Continuing
            }

            AdjustRelativeBase(offset) => {
                let offset = machine.read(offset)?;
                let base = machine
                    .registers
                    .relative_base
                    .checked_add(offset)
                    .ok_or(Exception::Overflow)?;
                debug!(base, "Moving relative base");
                machine.registers.relative_base = base;
                Status::Continuing
            }

            Halt => return Ok(Status::Halted),
        };

        machine.registers.ip = next;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryError;

    fn decode(words: &[Word]) -> Result<Instruction, Exception> {
        Instruction::decode(&Memory::from(words), 0)
    }

    #[test]
    fn opcode_test() {
        assert_eq!(Opcode::from_word(1), Ok(Opcode::Add));
        assert_eq!(Opcode::from_word(1002), Ok(Opcode::Multiply));
        assert_eq!(Opcode::from_word(21_107), Ok(Opcode::LessThan));
        assert_eq!(Opcode::from_word(99), Ok(Opcode::Halt));
        assert_eq!(
            Opcode::from_word(42),
            Err(Exception::InvalidInstruction { word: 42 })
        );
        assert_eq!(
            Opcode::from_word(0),
            Err(Exception::InvalidInstruction { word: 0 })
        );
        assert_eq!(
            Opcode::from_word(-1),
            Err(Exception::InvalidInstruction { word: -1 })
        );
    }

    #[test]
    fn decode_modes_test() {
        assert_eq!(
            decode(&[1002, 4, 3, 4]),
            Ok(Instruction::Multiply(
                Param::Position(4),
                Param::Immediate(3),
                Param::Position(4)
            ))
        );
        assert_eq!(
            decode(&[21_101, -5, 7, 2]),
            Ok(Instruction::Add(
                Param::Immediate(-5),
                Param::Immediate(7),
                Param::Relative(2)
            ))
        );
        assert_eq!(
            decode(&[204, -1]),
            Ok(Instruction::Output(Param::Relative(-1)))
        );
        assert_eq!(
            decode(&[1105, 1, 9]),
            Ok(Instruction::JumpIfTrue(
                Param::Immediate(1),
                Param::Immediate(9)
            ))
        );
        assert_eq!(decode(&[99]), Ok(Instruction::Halt));
    }

    #[test]
    fn decode_operands_past_end_test() {
        // Missing operands read as zero
        assert_eq!(
            decode(&[4]),
            Ok(Instruction::Output(Param::Position(0)))
        );
    }

    #[test]
    fn decode_errors_test() {
        assert_eq!(
            decode(&[11_101, 1, 1, 3]),
            Err(Exception::ImmediateWrite { word: 11_101 })
        );
        assert_eq!(
            decode(&[103, 0]),
            Err(Exception::ImmediateWrite { word: 103 })
        );
        assert_eq!(
            decode(&[304, 0]),
            Err(Exception::InvalidMode { word: 304, mode: 3 })
        );
        assert_eq!(
            decode(&[12, 0]),
            Err(Exception::InvalidInstruction { word: 12 })
        );
        assert!(decode(&[12]).unwrap_err().is_decode_error());
        assert!(!Exception::InvalidMemoryAccess(MemoryError::InvalidAddress(-1)).is_decode_error());
    }

    #[test]
    fn size_test() {
        assert_eq!(decode(&[1, 0, 0, 0]).unwrap().size(), 4);
        assert_eq!(decode(&[5, 0, 0]).unwrap().size(), 3);
        assert_eq!(decode(&[109, 0]).unwrap().size(), 2);
        assert_eq!(Instruction::Halt.size(), 1);
    }

    #[test]
    fn display_test() {
        assert_eq!(
            decode(&[1, 9, 10, 3]).unwrap().to_string(),
            "add  [9], [10], [3]"
        );
        assert_eq!(
            decode(&[1008, 100, 16, 101]).unwrap().to_string(),
            "eq   [100], 16, [101]"
        );
        assert_eq!(decode(&[204, -1]).unwrap().to_string(), "out  [rb-1]");
        assert_eq!(decode(&[109, 1]).unwrap().to_string(), "arb  1");
        assert_eq!(decode(&[1106, 0, 36]).unwrap().to_string(), "jz   0, 36");
        assert_eq!(Instruction::Halt.to_string(), "halt");
    }

    #[test]
    fn execute_test() {
        let mut machine: Machine = "0,0,0,0,0".parse().unwrap();
        machine.registers.relative_base = 2;

        let status = Instruction::Add(Param::Immediate(5), Param::Immediate(7), Param::Relative(1))
            .execute(&mut machine)
            .unwrap();
        assert_eq!(status, Status::Continuing);
        assert_eq!(machine[3], 12);
        assert_eq!(machine.registers.ip, 4);

        let status = Instruction::JumpIfTrue(Param::Position(3), Param::Immediate(42))
            .execute(&mut machine)
            .unwrap();
        assert_eq!(status, Status::Continuing);
        assert_eq!(machine.registers.ip, 42);

        let status = Instruction::Output(Param::Relative(1))
            .execute(&mut machine)
            .unwrap();
        assert_eq!(status, Status::ProducedOutput(12));
        assert_eq!(machine.registers.ip, 44);
    }
}
