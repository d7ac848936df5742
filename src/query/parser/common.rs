//! Shared tokenizing combinators, in the teacher codebase's nom style
//! (`open_cypher_parser::common`): whitespace-wrapping, identifiers,
//! literals, built on `nom`'s `Parser` trait rather than the old
//! free-function combinators.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit1, multispace0, satisfy};
use nom::combinator::{map, opt, recognize};
use nom::error::Error as NomError;
use nom::sequence::{delimited, pair};
use nom::{IResult, Parser};

pub type PResult<'a, O> = IResult<&'a str, O, NomError<&'a str>>;

/// Whitespace-wrapping combinator, mirroring `open_cypher_parser::common::ws`.
pub fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = NomError<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = NomError<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A bare SQL identifier: letters/digits/underscore, not starting with
/// a digit.
pub fn identifier(input: &str) -> PResult<'_, String> {
    let (rest, s) = recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(ident_char),
    ))
    .parse(input)?;
    Ok((rest, s.to_string()))
}

/// Case-insensitive keyword match, consuming surrounding whitespace.
pub fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = NomError<&'a str>> {
    ws(nom::bytes::complete::tag_no_case(word))
}

pub fn single_quoted_string(input: &str) -> PResult<'_, String> {
    let (rest, inner) = delimited(
        char('\''),
        map(
            nom::multi::many0(alt((
                map(nom::bytes::complete::tag("''"), |_| '\''),
                nom::character::complete::none_of("'"),
            ))),
            |chars: Vec<char>| chars.into_iter().collect::<String>(),
        ),
        char('\''),
    )
    .parse(input)?;
    Ok((rest, inner))
}

pub fn integer_literal(input: &str) -> PResult<'_, i64> {
    map(
        recognize(pair(opt(char('-')), digit1)),
        |s: &str| s.parse::<i64>().unwrap_or(0),
    )
    .parse(input)
}

pub fn float_literal(input: &str) -> PResult<'_, f64> {
    map(
        recognize((opt(char('-')), digit1, char('.'), digit1)),
        |s: &str| s.parse::<f64>().unwrap_or(0.0),
    )
    .parse(input)
}

pub fn comma(input: &str) -> PResult<'_, char> {
    ws(char(',')).parse(input)
}

pub fn lparen(input: &str) -> PResult<'_, char> {
    ws(char('(')).parse(input)
}

pub fn rparen(input: &str) -> PResult<'_, char> {
    ws(char(')')).parse(input)
}

/// `tag` re-exported for submodules that need a literal operator token.
pub fn sym<'a>(s: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = NomError<&'a str>> {
    ws(tag(s))
}
