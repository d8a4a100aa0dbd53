use std::io::Write;

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueHint};
use intcode_emulator::constants::{Address, Word};
use intcode_emulator::runtime::Status;
use intcode_emulator::Machine;
use rustyline::DefaultEditor;
use tracing::{debug, info};

use super::load_program;
use crate::interactive::{run_interactive, LineSource};

/// Parse a memory patch given as `ADDRESS=VALUE`
fn parse_patch(s: &str) -> Result<(Address, Word), String> {
    let (address, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDRESS=VALUE, got `{s}`"))?;
    let address = address
        .trim()
        .parse()
        .map_err(|e| format!("invalid address `{address}`: {e}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value `{value}`: {e}"))?;
    Ok((address, value))
}

#[derive(Parser, Debug)]
pub struct RunOpt {
    /// Program file
    #[arg(value_hint = ValueHint::FilePath)]
    program: Utf8PathBuf,

    /// Values to feed to the program, in order
    #[arg(
        short,
        long = "input",
        value_name = "VALUE",
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    inputs: Vec<Word>,

    /// Set a memory cell before running
    #[arg(short = 's', long = "set", value_name = "ADDRESS=VALUE", value_parser = parse_patch)]
    patches: Vec<(Address, Word)>,

    /// Show a memory cell once the program stopped
    #[arg(short, long, value_name = "ADDRESS")]
    peek: Vec<Address>,

    /// Prompt for input on the terminal and show outputs as they come
    #[arg(long, action = ArgAction::SetTrue)]
    interactive: bool,
}

impl RunOpt {
    pub fn exec(self) -> anyhow::Result<()> {
        let program = load_program(&self.program)?;
        let mut machine = Machine::new(program);
        let mut stdout = std::io::stdout().lock();

        if self.interactive {
            let mut editor = DefaultEditor::new()?;
            self.run_machine(&mut machine, Some(&mut editor), &mut stdout)
        } else {
            self.run_machine(&mut machine, None, &mut stdout)
        }
    }

    /// Patch, feed and run the machine, then print its outputs in the order
    /// they were produced and the peeked cells
    fn run_machine<W: Write>(
        &self,
        machine: &mut Machine,
        lines: Option<&mut dyn LineSource>,
        out: &mut W,
    ) -> anyhow::Result<()> {
        for &(address, value) in &self.patches {
            debug!(address, value, "Patching memory");
            machine[address] = value;
        }
        machine.add_input(self.inputs.iter().copied());

        info!("Running program");
        let status = match lines {
            Some(lines) => run_interactive(machine, lines, out)?,
            None => machine.run(false)?,
        };

        for value in machine.drain_output() {
            writeln!(out, "{value}")?;
        }

        for &address in &self.peek {
            writeln!(out, "[{address}] = {}", machine[address])?;
        }

        info!(registers = %machine.registers, cycles = machine.cycles, "End of program");

        if status == Status::NeedsInput {
            bail!("program is waiting for more input");
        }

        Ok(())
    }
}
