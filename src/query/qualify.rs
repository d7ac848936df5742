//! Resolves aliases against the catalog, splits WHERE into per-alias
//! pure-SQL conjuncts plus semantic predicates, and renders the
//! qualified SQL string the rewriter later substitutes into
//! (spec.md §4.1, §4.3).

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::query::ast::{ColumnRef, Expr, LimitSpec, RawSelect};
use crate::query::errors::SchemaError;
use crate::query::{Predicate, Query};

struct Aliases {
    /// alias -> table
    table_of: HashMap<String, String>,
}

impl Aliases {
    fn resolve(&self, col: &ColumnRef) -> Result<String, SchemaError> {
        match &col.table {
            Some(alias) => {
                if self.table_of.contains_key(alias) {
                    Ok(alias.clone())
                } else {
                    Err(SchemaError::UnknownTable(alias.clone()))
                }
            }
            None => {
                let matches: Vec<&String> = self.table_of.keys().collect();
                match matches.len() {
                    1 => Ok(matches[0].clone()),
                    0 => Err(SchemaError::UnknownColumn(col.column.clone())),
                    _ => Err(SchemaError::AmbiguousColumn {
                        column: col.column.clone(),
                        aliases: matches.into_iter().cloned().collect(),
                    }),
                }
            }
        }
    }
}

fn build_aliases(raw: &RawSelect, catalog: &Catalog) -> Result<Aliases, SchemaError> {
    let mut table_of = HashMap::new();
    for t in &raw.from {
        if table_of.insert(t.alias.clone(), t.table.clone()).is_some() {
            return Err(SchemaError::DuplicateAlias(t.alias.clone()));
        }
        if !catalog.has_table(&t.table) {
            return Err(SchemaError::UnknownTable(t.table.clone()));
        }
    }
    Ok(Aliases { table_of })
}

/// Qualifies every bare column reference in `expr` with its resolved
/// alias, producing a new expression with no ambiguity left.
fn qualify_expr(expr: &Expr, aliases: &Aliases) -> Result<Expr, SchemaError> {
    Ok(match expr {
        Expr::Column(c) => Expr::Column(ColumnRef {
            table: Some(aliases.resolve(c)?),
            column: c.column.clone(),
        }),
        Expr::Literal(l) => Expr::Literal(l.clone()),
        Expr::Star => Expr::Star,
        Expr::BinaryOp(l, op, r) => Expr::BinaryOp(
            Box::new(qualify_expr(l, aliases)?),
            op.clone(),
            Box::new(qualify_expr(r, aliases)?),
        ),
        Expr::Not(e) => Expr::Not(Box::new(qualify_expr(e, aliases)?)),
        Expr::Call { name, args } => Expr::Call {
            name: name.clone(),
            args: args
                .iter()
                .map(|a| qualify_expr(a, aliases))
                .collect::<Result<_, _>>()?,
        },
    })
}

fn extract_predicate(expr: &Expr, aliases: &Aliases) -> Result<Option<Predicate>, SchemaError> {
    let Expr::Call { name, args } = expr else {
        return Ok(None);
    };
    match name.as_str() {
        "NLfilter" if args.len() == 2 => {
            let Expr::Column(col) = &args[0] else {
                return Ok(None);
            };
            let Expr::Literal(crate::query::ast::Literal::Str(condition)) = &args[1] else {
                return Ok(None);
            };
            let alias = aliases.resolve(col)?;
            Ok(Some(Predicate::Unary {
                table: aliases.table_of[&alias].clone(),
                alias,
                column: col.column.clone(),
                condition: condition.clone(),
                original_sql: expr.to_sql(),
            }))
        }
        "NLjoin" if args.len() == 3 => {
            let (Expr::Column(left), Expr::Column(right)) = (&args[0], &args[1]) else {
                return Ok(None);
            };
            let Expr::Literal(crate::query::ast::Literal::Str(condition)) = &args[2] else {
                return Ok(None);
            };
            let left_alias = aliases.resolve(left)?;
            let right_alias = aliases.resolve(right)?;
            Ok(Some(Predicate::Join {
                left_table: aliases.table_of[&left_alias].clone(),
                left_alias,
                left_column: left.column.clone(),
                right_table: aliases.table_of[&right_alias].clone(),
                right_alias,
                right_column: right.column.clone(),
                condition: condition.clone(),
                original_sql: expr.to_sql(),
            }))
        }
        _ => Ok(None),
    }
}

/// Walks an already-qualified WHERE expression looking for semantic
/// predicate calls anywhere in the tree, not just at the top level —
/// `NLfilter` may appear inside a larger boolean expression.
fn collect_predicates(expr: &Expr, aliases: &Aliases, out: &mut Vec<Predicate>) -> Result<(), SchemaError> {
    if let Some(p) = extract_predicate(expr, aliases)? {
        out.push(p);
        return Ok(());
    }
    match expr {
        Expr::BinaryOp(l, _, r) => {
            collect_predicates(l, aliases, out)?;
            collect_predicates(r, aliases, out)?;
        }
        Expr::Not(e) => collect_predicates(e, aliases, out)?,
        Expr::Call { args, .. } => {
            for a in args {
                collect_predicates(a, aliases, out)?;
            }
        }
        Expr::Column(_) | Expr::Literal(_) | Expr::Star => {}
    }
    Ok(())
}

pub fn qualify(raw: RawSelect, catalog: &Catalog) -> Result<Query, SchemaError> {
    let aliases = build_aliases(&raw, catalog)?;

    let items = raw
        .items
        .iter()
        .map(|i| qualify_expr(&i.expr, &aliases))
        .collect::<Result<Vec<_>, _>>()?;

    let where_qualified = raw
        .where_clause
        .as_ref()
        .map(|e| qualify_expr(e, &aliases))
        .transpose()?;

    let mut predicates = Vec::new();
    if let Some(w) = &where_qualified {
        collect_predicates(w, &aliases, &mut predicates)?;
    }

    // Pure-SQL conjuncts per alias: every top-level AND conjunct whose
    // columns all belong to a single alias and which is not itself a
    // semantic predicate (spec.md §4.1).
    let mut alias_conjuncts: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(w) = where_qualified.clone() {
        for conjunct in w.split_and() {
            if extract_predicate(&conjunct, &aliases)?.is_some() {
                continue;
            }
            if let Some(col) = conjunct.sole_column() {
                if let Some(alias) = &col.table {
                    alias_conjuncts
                        .entry(alias.clone())
                        .or_default()
                        .push(conjunct.to_sql());
                }
            }
        }
    }

    let group_by = raw
        .group_by
        .iter()
        .map(|e| qualify_expr(e, &aliases))
        .collect::<Result<Vec<_>, _>>()?;

    let order_by = raw
        .order_by
        .iter()
        .map(|(e, desc)| qualify_expr(e, &aliases).map(|e| (e, *desc)))
        .collect::<Result<Vec<_>, _>>()?;

    let limit = match raw.limit {
        LimitSpec::Literal(n) => Some(n),
        LimitSpec::Expr(_) | LimitSpec::None => None,
    };

    let from = raw
        .from
        .iter()
        .map(|t| (t.alias.clone(), t.table.clone()))
        .collect();

    Ok(Query {
        select_items: items,
        from,
        where_clause: where_qualified,
        predicates,
        alias_conjuncts,
        group_by,
        order_by,
        limit,
    })
}
