pub mod constants;
pub mod parser;
pub mod program;
pub mod runtime;

pub use self::{parser::parse_words, program::Program, runtime::Machine};
