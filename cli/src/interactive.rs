//! This module implements the TTY interactive interface.
//!
//! The machine pauses after every output so that values show up as soon as
//! they are produced, and the user is prompted for a line whenever the program
//! needs input. On a terminal, rustyline handles the line-editing logic.

use std::io::Write;

use intcode_emulator::runtime::Status;
use intcode_emulator::{parse_words, Machine};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

const INPUT_PROMPT: &str = "<<< ";
const OUTPUT_PREFIX: &str = ">>> ";

/// Where the lines typed by the user come from
pub trait LineSource {
    /// Read one line, or `None` once the input is closed
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => {
                self.add_history_entry(line.as_str())?;
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Run the machine until it halts, asking for input when needed
///
/// Closing the input (Ctrl-D or Ctrl-C) stops the session with
/// [`Status::NeedsInput`].
pub fn run_interactive<S, W>(
    machine: &mut Machine,
    lines: &mut S,
    out: &mut W,
) -> anyhow::Result<Status>
where
    S: LineSource + ?Sized,
    W: Write,
{
    loop {
        match machine.run(true)? {
            Status::ProducedOutput(_) => {
                for value in machine.drain_output() {
                    writeln!(out, "{OUTPUT_PREFIX}{value}")?;
                }
            }

            Status::NeedsInput => {
                out.flush()?;
                let Some(line) = lines.read_line(INPUT_PROMPT)? else {
                    debug!("Input closed");
                    return Ok(Status::NeedsInput);
                };

                // Several values can be given at once, separated by commas
                match parse_words(&line) {
                    Ok(values) => machine.add_input(values),
                    Err(e) => warn!("{}", e),
                }
            }

            status => return Ok(status),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Lines typed in advance
    pub(crate) struct Script(pub(crate) VecDeque<String>);

    impl Script {
        pub(crate) fn new(lines: &[&str]) -> Self {
            Self(lines.iter().map(ToString::to_string).collect())
        }
    }

    impl LineSource for Script {
        fn read_line(&mut self, _prompt: &str) -> anyhow::Result<Option<String>> {
            Ok(self.0.pop_front())
        }
    }

    fn session(source: &str, lines: &[&str]) -> (Status, String, Script) {
        let mut machine: Machine = source.parse().unwrap();
        let mut script = Script::new(lines);
        let mut out = Vec::new();
        let status = run_interactive(&mut machine, &mut script, &mut out).unwrap();
        (status, String::from_utf8(out).unwrap(), script)
    }

    #[test]
    fn echo_until_halt_test() {
        let (status, out, script) = session("3,0,4,0,99", &["42", "unused"]);
        assert_eq!(status, Status::Halted);
        assert_eq!(out, ">>> 42\n");
        assert_eq!(script.0, ["unused"]);
    }

    #[test]
    fn several_values_per_line_test() {
        // Echo every input forever
        let lines = ["5", "6, -7", "oops", "", "8"];
        let (status, out, _) = session("3,20,4,20,1105,1,0", &lines);
        assert_eq!(status, Status::NeedsInput);
        assert_eq!(out, ">>> 5\n>>> 6\n>>> -7\n>>> 8\n");
    }

    #[test]
    fn outputs_before_first_input_test() {
        let (status, out, _) = session("104,1,104,2,3,0,4,0,99", &["3"]);
        assert_eq!(status, Status::Halted);
        assert_eq!(out, ">>> 1\n>>> 2\n>>> 3\n");
    }
}
