//! Top-level `SELECT` grammar, assembling [`RawSelect`] from the
//! shared tokenizer and expression parsers.

use nom::branch::alt;
use nom::combinator::{map, opt};
use nom::multi::separated_list0;
use nom::sequence::pair;
use nom::Parser;

use super::common::*;
use super::expression::parse_expression;
use crate::query::ast::{LimitSpec, RawSelect, SelectItem, TableRef};

fn parse_select_item(input: &str) -> PResult<'_, SelectItem> {
    let (input, expr) = parse_expression(input)?;
    let (input, alias) = opt(alt((
        map(pair(keyword("AS"), identifier), |(_, a)| a),
        ws(identifier),
    )))
    .parse(input)?;
    Ok((input, SelectItem { expr, alias }))
}

fn parse_table_ref(input: &str) -> PResult<'_, TableRef> {
    let (input, table) = ws(identifier).parse(input)?;
    let (input, alias) = opt(alt((
        map(pair(keyword("AS"), identifier), |(_, a)| a),
        ws(identifier),
    )))
    .parse(input)?;
    Ok((
        input,
        TableRef {
            alias: alias.unwrap_or_else(|| table.clone()),
            table,
        },
    ))
}

fn parse_order_item(input: &str) -> PResult<'_, (crate::query::ast::Expr, bool)> {
    let (input, expr) = parse_expression(input)?;
    let (input, desc) = opt(alt((keyword("DESC"), keyword("ASC")))).parse(input)?;
    Ok((input, (expr, desc.map(|d| d.eq_ignore_ascii_case("desc")).unwrap_or(false))))
}

fn parse_limit(input: &str) -> PResult<'_, LimitSpec> {
    match opt(keyword("LIMIT")).parse(input)? {
        (input, Some(_)) => {
            let (input, n) = integer_literal(input)?;
            Ok((input, LimitSpec::Literal(n.max(0) as u64)))
        }
        (input, None) => Ok((input, LimitSpec::None)),
    }
}

/// Parses a single `SELECT` statement, with an optional trailing `;`.
pub fn parse_select(input: &str) -> PResult<'_, RawSelect> {
    let (input, _) = keyword("SELECT").parse(input)?;
    let (input, items) = separated_list0(comma, parse_select_item).parse(input)?;
    let (input, _) = keyword("FROM").parse(input)?;
    let (input, from) = separated_list0(comma, parse_table_ref).parse(input)?;

    let (input, where_clause) = opt(|i| {
        let (i, _) = keyword("WHERE").parse(i)?;
        parse_expression(i)
    })
    .parse(input)?;

    let (input, group_by) = match opt(pair(keyword("GROUP"), keyword("BY"))).parse(input)? {
        (input, Some(_)) => separated_list0(comma, parse_expression).parse(input)?,
        (input, None) => (input, Vec::new()),
    };

    let (input, order_by) = match opt(pair(keyword("ORDER"), keyword("BY"))).parse(input)? {
        (input, Some(_)) => separated_list0(comma, parse_order_item).parse(input)?,
        (input, None) => (input, Vec::new()),
    };

    let (input, limit) = parse_limit(input)?;
    let (input, _) = ws(opt(sym(";"))).parse(input)?;

    Ok((
        input,
        RawSelect {
            items,
            from,
            where_clause,
            group_by,
            order_by,
            limit,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::Expr;

    #[test]
    fn parses_plain_select() {
        let (rest, select) = parse_select("SELECT pic FROM cars c").unwrap();
        assert_eq!(rest, "");
        assert_eq!(select.items.len(), 1);
        assert_eq!(select.from[0].table, "cars");
        assert_eq!(select.from[0].alias, "c");
    }

    #[test]
    fn parses_where_with_nlfilter() {
        let (_, select) =
            parse_select("SELECT * FROM cars c WHERE NLfilter(c.pic, 'a red car')").unwrap();
        match select.where_clause {
            Some(Expr::Call { name, .. }) => assert_eq!(name, "NLfilter"),
            other => panic!("expected NLfilter call, got {other:?}"),
        }
    }

    #[test]
    fn parses_limit_and_order_by() {
        let (_, select) =
            parse_select("SELECT * FROM cars ORDER BY price DESC LIMIT 2").unwrap();
        assert_eq!(select.limit, LimitSpec::Literal(2));
        assert_eq!(select.order_by.len(), 1);
        assert!(select.order_by[0].1);
    }

    #[test]
    fn parses_group_by_count() {
        let (_, select) =
            parse_select("SELECT COUNT(*) FROM cars c WHERE NLfilter(c.pic, 'red')").unwrap();
        assert_eq!(select.items.len(), 1);
    }
}
