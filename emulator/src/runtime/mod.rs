use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use thiserror::Error;
use tracing::{debug, info};

use crate::constants::{Address, Word};
use crate::parser::ParseError;
use crate::program::Program;

mod arguments;
mod exception;
mod instructions;
mod memory;
mod registers;

pub use self::arguments::{Mode, Param};
pub use self::exception::Exception;
pub use self::instructions::{Instruction, Opcode};
pub use self::memory::{address_from_word, Memory, MemoryError};
pub use self::registers::Registers;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorError {
    #[error("exception at address {address}: {exception}")]
    Exception {
        address: Address,
        #[source]
        exception: Exception,
    },

    #[error("machine is faulted and must be reset")]
    Faulted,
}

impl ProcessorError {
    /// The exception that faulted the machine, if any
    #[must_use]
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            Self::Exception { exception, .. } => Some(exception),
            Self::Faulted => None,
        }
    }
}

type Result<T> = std::result::Result<T, ProcessorError>;

/// Outcome of a single step, or the reason a run returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The instruction was executed, the machine can go on
    Continuing,

    /// The machine executed a halt instruction
    Halted,

    /// The input queue is empty. The input instruction will be attempted again
    /// on the next run.
    NeedsInput,

    /// A value was pushed on the output queue
    ProducedOutput(Word),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Freshly built or reset
    #[default]
    Ready,
    Running,
    SuspendedOnInput,
    SuspendedOnOutput,
    Halted,

    /// An exception occurred, only a reset gets the machine out of this state
    Faulted,
}

/// Supplies input values on demand, once the input queue is empty
pub type InputProvider = Box<dyn FnMut() -> Option<Word>>;

/// An Intcode machine
///
/// It owns its memory, registers and I/O queues. Values are pushed on the
/// output queue from the front, so `output()[0]` is always the most recent one.
pub struct Machine {
    program: Program,
    pub registers: Registers,
    pub memory: Memory,
    pub cycles: usize,
    input: VecDeque<Word>,
    input_provider: Option<InputProvider>,
    output: VecDeque<Word>,
    state: State,
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Machine {{ registers: {:?}, state: {:?}, memory: [...] }}",
            self.registers, self.state
        )
    }
}

impl Machine {
    #[must_use]
    pub fn new(program: Program) -> Self {
        let memory = Memory::from(program.words());
        Self {
            program,
            registers: Registers::default(),
            memory,
            cycles: 0,
            input: VecDeque::new(),
            input_provider: None,
            output: VecDeque::new(),
            state: State::Ready,
        }
    }

    /// Put the machine back in the state it had right after being built
    ///
    /// Memory is reloaded from the program, registers are zeroed and both I/O
    /// queues are emptied. The input provider is kept.
    pub fn reset(&mut self) {
        debug!("Resetting machine");
        self.memory = Memory::from(self.program.words());
        self.registers = Registers::default();
        self.cycles = 0;
        self.input.clear();
        self.output.clear();
        self.state = State::Ready;
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// Queue values for the input instructions, in order
    pub fn add_input<I: IntoIterator<Item = Word>>(&mut self, values: I) {
        self.input.extend(values);
    }

    /// Ask `provider` for a value whenever an input instruction finds the
    /// queue empty. When it returns `None`, the machine suspends as usual.
    #[must_use]
    pub fn with_input_provider<F>(mut self, provider: F) -> Self
    where
        F: FnMut() -> Option<Word> + 'static,
    {
        self.input_provider = Some(Box::new(provider));
        self
    }

    /// Take the next input value, from the queue first, then from the provider
    fn next_input(&mut self) -> Option<Word> {
        self.input
            .pop_front()
            .or_else(|| self.input_provider.as_mut().and_then(|provider| provider()))
    }

    /// Values waiting to be read by the program
    #[must_use]
    pub fn input(&self) -> &VecDeque<Word> {
        &self.input
    }

    /// Values produced since the last reset, newest first
    #[must_use]
    pub fn output(&self) -> &VecDeque<Word> {
        &self.output
    }

    /// The most recent output
    #[must_use]
    pub fn last_output(&self) -> Option<Word> {
        self.output.front().copied()
    }

    /// Empty the output queue, returning the values in the order they were
    /// produced
    pub fn drain_output(&mut self) -> Vec<Word> {
        self.output.drain(..).rev().collect()
    }

    fn resolve(&self, param: Param) -> std::result::Result<Address, Exception> {
        let word = match param {
            Param::Position(address) => address,
            Param::Relative(offset) => self
                .registers
                .relative_base
                .checked_add(offset)
                .ok_or(Exception::Overflow)?,
            Param::Immediate(value) => return Err(Exception::ImmediateWrite { word: value }),
        };
        Ok(address_from_word(word)?)
    }

    fn read(&self, param: Param) -> std::result::Result<Word, Exception> {
        match param {
            Param::Immediate(value) => Ok(value),
            Param::Position(_) | Param::Relative(_) => Ok(self.memory[self.resolve(param)?]),
        }
    }

    fn write(&mut self, param: Param, value: Word) -> std::result::Result<(), Exception> {
        let address = self.resolve(param)?;
        self.memory[address] = value;
        Ok(())
    }

    fn jump_target(&self, param: Param) -> std::result::Result<Address, Exception> {
        let address = address_from_word(self.read(param)?)?;
        debug!("Jumping to address {}", address);
        Ok(address)
    }

    /// Decode and execute the instruction at the instruction pointer
    ///
    /// # Errors
    ///
    /// Fails if the instruction raised an exception, or if the machine was
    /// already faulted. The machine is left in the faulted state.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn step(&mut self) -> Result<Status> {
        match self.state {
            State::Halted => return Ok(Status::Halted),
            State::Faulted => return Err(ProcessorError::Faulted),
            _ => {}
        }

        let address = self.registers.ip;
        let status = Instruction::decode(&self.memory, address)
            .and_then(|inst| {
                debug!(address, "Executing instruction \"{}\"", inst);
                inst.execute(self)
            })
            .map_err(|exception| {
                self.state = State::Faulted;
                ProcessorError::Exception { address, exception }
            })?;

        self.state = match status {
            Status::Continuing => State::Running,
            Status::Halted => State::Halted,
            Status::NeedsInput => State::SuspendedOnInput,
            Status::ProducedOutput(_) => State::SuspendedOnOutput,
        };

        if status != Status::NeedsInput {
            self.cycles += 1;
        }

        Ok(status)
    }

    /// Run until the machine halts or runs out of input
    ///
    /// With `pause_on_output`, it also returns right after each output. This
    /// never returns [`Status::Continuing`].
    ///
    /// # Errors
    ///
    /// Fails if an instruction raised an exception or the machine was already
    /// faulted.
    #[tracing::instrument(skip(self))]
    pub fn run(&mut self, pause_on_output: bool) -> Result<Status> {
        loop {
            match self.step()? {
                Status::Continuing => {}
                Status::ProducedOutput(_) if !pause_on_output => {}
                status => {
                    info!(?status, cycles = self.cycles, registers = %self.registers, "Machine stopped");
                    return Ok(status);
                }
            }
        }
    }
}

impl std::str::FromStr for Machine {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s.parse()?))
    }
}

impl Index<Address> for Machine {
    type Output = Word;

    fn index(&self, address: Address) -> &Self::Output {
        &self.memory[address]
    }
}

impl IndexMut<Address> for Machine {
    fn index_mut(&mut self, address: Address) -> &mut Self::Output {
        &mut self.memory[address]
    }
}
