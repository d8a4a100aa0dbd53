//! Program text parsing
//!
//! A program is a list of signed decimal integers separated by commas, with
//! optional whitespace around them. The parsing is handled by the `nom`
//! library.

use nom::character::complete::{char, i64 as parse_word, multispace0};
use nom::combinator::{all_consuming, opt};
use nom::error::ErrorKind;
use nom::multi::separated_list1;
use nom::sequence::{delimited, terminated};
use nom::{Finish, IResult, Offset};
use thiserror::Error;

use crate::constants::Word;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid program text at offset {offset} ({kind:?})")]
pub struct ParseError {
    /// Byte offset of the failure in the source text
    pub offset: usize,
    pub kind: ErrorKind,
}

fn parse_separator(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

fn parse_word_list(input: &str) -> IResult<&str, Vec<Word>> {
    delimited(
        multispace0,
        terminated(
            separated_list1(parse_separator, parse_word),
            opt(parse_separator),
        ),
        multispace0,
    )(input)
}

/// Parse a comma-separated list of words
///
/// # Errors
///
/// This function will return an error if the text is empty, has anything else
/// than integers and separators, or an integer does not fit in a word.
pub fn parse_words(input: &str) -> Result<Vec<Word>, ParseError> {
    let (_, words) = all_consuming(parse_word_list)(input)
        .finish()
        .map_err(|e| ParseError {
            offset: input.offset(e.input),
            kind: e.code,
        })?;
    Ok(words)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_words_test() {
        assert_eq!(parse_words("1,9,10,3"), Ok(vec![1, 9, 10, 3]));
        assert_eq!(parse_words("1, 1, 2, 0, 99"), Ok(vec![1, 1, 2, 0, 99]));
        assert_eq!(parse_words("  3,-1 ,8\n"), Ok(vec![3, -1, 8]));
        assert_eq!(parse_words("42"), Ok(vec![42]));
        assert_eq!(parse_words("1,\n2,\n"), Ok(vec![1, 2]));
        assert_eq!(
            parse_words("104,1125899906842624,99"),
            Ok(vec![104, 1_125_899_906_842_624, 99])
        );
    }

    #[test]
    fn parse_words_error_test() {
        assert_eq!(
            parse_words("1,2,x"),
            Err(ParseError {
                offset: 4,
                kind: ErrorKind::Eof
            })
        );
        assert_eq!(parse_words("1,,2").map_err(|e| e.offset), Err(2));
        assert_eq!(parse_words("").map_err(|e| e.offset), Err(0));
        assert_eq!(parse_words("  \n").map_err(|e| e.offset), Err(3));
        assert!(parse_words("1.5").is_err());
        assert!(parse_words("99999999999999999999").is_err());
    }
}
