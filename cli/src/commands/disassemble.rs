use camino::Utf8PathBuf;
use clap::{Parser, ValueHint};
use tracing::debug;

use super::load_program;

#[derive(Parser, Debug)]
pub struct DisassembleOpt {
    /// Program file
    #[arg(value_hint = ValueHint::FilePath)]
    program: Utf8PathBuf,
}

impl DisassembleOpt {
    pub fn exec(self) -> anyhow::Result<()> {
        let program = load_program(&self.program)?;

        debug!("Disassembling program");
        for (address, line) in program.disassemble() {
            println!("{address:>5}: {line}");
        }

        Ok(())
    }
}
