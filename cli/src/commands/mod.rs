use std::process::exit;

use anyhow::Context;
use camino::Utf8Path;
use intcode_emulator::Program;
use tracing::{debug, info};

mod completion;
mod disassemble;
mod run;

#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Run a program
    Run(self::run::RunOpt),

    /// Print the instructions of a program
    Disassemble(self::disassemble::DisassembleOpt),

    /// Generate shell completions
    Completion(self::completion::CompletionOpt),
}

impl Subcommand {
    /// Run a subcommand
    pub fn exec(self) -> anyhow::Result<()> {
        match self {
            Self::Run(opt) => opt.exec(),
            Self::Disassemble(opt) => opt.exec(),
            Self::Completion(opt) => opt.exec(),
        }
    }
}

/// Read and parse a program file
///
/// Parse errors are reported with the offending location and end the process.
fn load_program(path: &Utf8Path) -> anyhow::Result<Program> {
    info!(%path, "Reading program");
    let source =
        std::fs::read_to_string(path).with_context(|| format!("could not read {path}"))?;

    debug!("Parsing program");
    match source.parse::<Program>() {
        Ok(program) => {
            debug!(words = program.words().len(), "Parsed program");
            Ok(program)
        }
        Err(e) => {
            let labels = vec![miette::LabeledSpan::at_offset(e.offset, e.to_string())];
            let report = miette::miette!(labels = labels, "Failed to parse program")
                .with_source_code(source);
            eprintln!("{report:?}");
            exit(1);
        }
    }
}
