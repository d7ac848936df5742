//! Expression grammar: precedence climbs `OR` < `AND` < `NOT` <
//! comparison < primary, the minimum needed to host `NLfilter`/`NLjoin`
//! calls and simple WHERE/ORDER BY expressions (spec.md §4.1).

use nom::branch::alt;
use nom::combinator::{map, opt};
use nom::multi::separated_list0;
use nom::sequence::pair;
use nom::Parser;

use super::common::*;
use crate::query::ast::{BinOp, ColumnRef, Expr, Literal};

pub fn parse_expression(input: &str) -> PResult<'_, Expr> {
    parse_or(input)
}

fn parse_or(input: &str) -> PResult<'_, Expr> {
    let (input, first) = parse_and(input)?;
    let (input, rest) = nom::multi::many0(pair(keyword("OR"), parse_and)).parse(input)?;
    Ok((
        input,
        rest.into_iter().fold(first, |acc, (_, rhs)| {
            Expr::BinaryOp(Box::new(acc), BinOp::Or, Box::new(rhs))
        }),
    ))
}

fn parse_and(input: &str) -> PResult<'_, Expr> {
    let (input, first) = parse_not(input)?;
    let (input, rest) = nom::multi::many0(pair(keyword("AND"), parse_not)).parse(input)?;
    Ok((
        input,
        rest.into_iter().fold(first, |acc, (_, rhs)| {
            Expr::BinaryOp(Box::new(acc), BinOp::And, Box::new(rhs))
        }),
    ))
}

fn parse_not(input: &str) -> PResult<'_, Expr> {
    alt((
        map(pair(keyword("NOT"), parse_not), |(_, e)| {
            Expr::Not(Box::new(e))
        }),
        parse_comparison,
    ))
    .parse(input)
}

fn comparison_op(input: &str) -> PResult<'_, BinOp> {
    alt((
        map(sym("<>"), |_| BinOp::NotEq),
        map(sym("!="), |_| BinOp::NotEq),
        map(sym("<="), |_| BinOp::LtEq),
        map(sym(">="), |_| BinOp::GtEq),
        map(sym("="), |_| BinOp::Eq),
        map(sym("<"), |_| BinOp::Lt),
        map(sym(">"), |_| BinOp::Gt),
        map(keyword("LIKE"), |_| BinOp::Like),
    ))
    .parse(input)
}

fn parse_comparison(input: &str) -> PResult<'_, Expr> {
    let (input, lhs) = parse_primary(input)?;
    let (input, op) = opt(comparison_op).parse(input)?;
    match op {
        Some(op) => {
            let (input, rhs) = parse_primary(input)?;
            Ok((input, Expr::BinaryOp(Box::new(lhs), op, Box::new(rhs))))
        }
        None => Ok((input, lhs)),
    }
}

fn parse_primary(input: &str) -> PResult<'_, Expr> {
    alt((
        parse_parenthesized,
        parse_call,
        parse_star,
        parse_literal,
        parse_column,
    ))
    .parse(input)
}

fn parse_parenthesized(input: &str) -> PResult<'_, Expr> {
    let (input, _) = lparen(input)?;
    let (input, inner) = parse_expression(input)?;
    let (input, _) = rparen(input)?;
    Ok((input, inner))
}

fn parse_star(input: &str) -> PResult<'_, Expr> {
    map(ws(nom::character::complete::char('*')), |_| Expr::Star).parse(input)
}

fn parse_literal(input: &str) -> PResult<'_, Expr> {
    ws(alt((
        map(single_quoted_string, |s| Expr::Literal(Literal::Str(s))),
        map(float_literal, |f| Expr::Literal(Literal::Float(f))),
        map(integer_literal, |i| Expr::Literal(Literal::Int(i))),
        map(keyword("TRUE"), |_| Expr::Literal(Literal::Bool(true))),
        map(keyword("FALSE"), |_| Expr::Literal(Literal::Bool(false))),
    )))
    .parse(input)
}

/// `alias.column` or a bare `column`.
fn parse_column_ref(input: &str) -> PResult<'_, ColumnRef> {
    let (input, first) = identifier(input)?;
    let (input, dotted) =
        opt(pair(nom::character::complete::char('.'), identifier)).parse(input)?;
    Ok(match dotted {
        Some((_, col)) => (
            input,
            ColumnRef {
                table: Some(first),
                column: col,
            },
        ),
        None => (
            input,
            ColumnRef {
                table: None,
                column: first,
            },
        ),
    })
}

fn parse_column(input: &str) -> PResult<'_, Expr> {
    map(ws(parse_column_ref), Expr::Column).parse(input)
}

/// A function call: `NAME(arg, arg, ...)`, `NAME(*)`, or `NAME()`.
/// Recognized as a call whenever `NAME` is immediately followed by `(`,
/// which keeps `NLfilter(...)`/`NLjoin(...)`/aggregates indistinguishable
/// from any other call syntactically (spec.md §4.1 extracts them by name
/// afterwards).
fn parse_call(input: &str) -> PResult<'_, Expr> {
    let (input, name) = ws(identifier).parse(input)?;
    let (input, _) = lparen(input)?;
    let (input, args) = separated_list0(comma, parse_expression).parse(input)?;
    let (input, _) = rparen(input)?;
    Ok((input, Expr::Call { name, args }))
}
