//! Common parsing utilities shared by the SDP line grammar
//!
//! Small nom building blocks mirroring the character classes used by the
//! grammar (`\S`, `\w`, digits) plus the empty-means-absent conversion applied
//! at the record boundary.

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{digit1, satisfy},
    combinator::{all_consuming, map, map_res},
    sequence::preceded,
    IResult,
};
use std::str::FromStr;

/// Parses zero or more non-whitespace characters
pub fn non_space0(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| !c.is_whitespace())(input)
}

/// Parses one or more non-whitespace characters
pub fn non_space1(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// Parses zero or more word characters (alphanumeric or `_`)
pub fn word0(input: &str) -> IResult<&str, &str> {
    take_while(is_word_char)(input)
}

/// Parses one or more word characters (alphanumeric or `_`)
pub fn word1(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char)(input)
}

/// Parses a run of word characters and dashes, as used by rtcp-fb and ssrc
pub fn dashed_word0(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| is_word_char(c) || c == '-')(input)
}

/// Parses a decimal number into any integer type
pub fn number<T: FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, |s: &str| s.parse::<T>())(input)
}

/// Parses an address family marker such as `IP4`, yielding the digit
pub fn ip_version(input: &str) -> IResult<&str, u8> {
    preceded(
        tag("IP"),
        map(satisfy(|c| c.is_ascii_digit()), |c| c as u8 - b'0'),
    )(input)
}

/// Parses a single space separator
pub fn sp(input: &str) -> IResult<&str, &str> {
    tag(" ")(input)
}

/// Runs `parser` against the whole of `input`, returning the output only if
/// nothing is left over
pub fn full<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
    input: &'a str,
) -> Option<O> {
    all_consuming(parser)(input).ok().map(|(_, output)| output)
}

/// Empty-string-means-absent conversion
pub fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Whether `c` belongs to the `\w` class
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `c` is an RFC 4566 `token` character
pub fn is_token_char(c: char) -> bool {
    matches!(c, '!' | '#'..='\'' | '*' | '+' | '-' | '.' | '0'..='9' | 'A'..='Z' | '^'..='~')
}

/// Splits SDP text into physical lines
///
/// Accepts CRLF and bare LF terminators. The returned lines carry no
/// terminator and may be empty.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}
