//! Minimal SQL AST — just enough of `SELECT` to host `NLfilter`/`NLjoin`
//! predicates (spec.md §1: "we rely on the underlying engine" for the
//! rest of SQL planning; we only need to parse far enough to find
//! predicates, split WHERE on AND, and re-serialize).

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Literal {
    pub fn to_sql(&self) -> String {
        match self {
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Str(s) => format!("'{}'", s.replace('\'', "''")),
            Literal::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    And,
    Or,
}

impl BinOp {
    pub fn to_sql(&self) -> &'static str {
        match self {
            BinOp::Eq => "=",
            BinOp::NotEq => "<>",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::Like => "LIKE",
            BinOp::And => "AND",
            BinOp::Or => "OR",
        }
    }
}

/// A (possibly unqualified) column reference as written by the user,
/// before qualification resolves `table` to an alias.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn to_sql(&self) -> String {
        match &self.table {
            Some(t) => format!("{t}.{}", self.column),
            None => self.column.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Literal),
    Star,
    BinaryOp(Box<Expr>, BinOp, Box<Expr>),
    Not(Box<Expr>),
    /// Any function call, e.g. `COUNT(*)`, `NLfilter(c.col, 'cond')`.
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn to_sql(&self) -> String {
        match self {
            Expr::Column(c) => c.to_sql(),
            Expr::Literal(l) => l.to_sql(),
            Expr::Star => "*".to_string(),
            Expr::BinaryOp(l, op, r) => format!("{} {} {}", l.to_sql(), op.to_sql(), r.to_sql()),
            Expr::Not(e) => format!("NOT {}", e.to_sql()),
            Expr::Call { name, args } => format!(
                "{name}({})",
                args.iter().map(Expr::to_sql).collect::<Vec<_>>().join(", ")
            ),
        }
    }

    /// The single [`ColumnRef`] this expression reads, if it reads
    /// exactly one. Used to classify a WHERE conjunct as alias-local.
    pub fn sole_column(&self) -> Option<&ColumnRef> {
        fn collect<'a>(e: &'a Expr, out: &mut Vec<&'a ColumnRef>) {
            match e {
                Expr::Column(c) => out.push(c),
                Expr::BinaryOp(l, _, r) => {
                    collect(l, out);
                    collect(r, out);
                }
                Expr::Not(e) => collect(e, out),
                Expr::Call { args, .. } => {
                    for a in args {
                        collect(a, out);
                    }
                }
                Expr::Literal(_) | Expr::Star => {}
            }
        }
        let mut cols = Vec::new();
        collect(self, &mut cols);
        let mut aliases: Vec<&str> = cols
            .iter()
            .filter_map(|c| c.table.as_deref())
            .collect();
        aliases.dedup();
        if cols.len() == 1 || (!aliases.is_empty() && aliases.len() == 1) {
            cols.first().copied()
        } else {
            None
        }
    }

    /// Split a boolean expression into its top-level `AND` conjuncts
    /// (spec.md §4.1).
    pub fn split_and(self) -> Vec<Expr> {
        match self {
            Expr::BinaryOp(l, BinOp::And, r) => {
                let mut out = l.split_and();
                out.extend(r.split_and());
                out
            }
            other => vec![other],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub table: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LimitSpec {
    Literal(u64),
    /// A non-literal LIMIT expression, kept verbatim for engine passthrough.
    Expr(String),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSelect {
    pub items: Vec<SelectItem>,
    pub from: Vec<TableRef>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<(Expr, bool)>,
    pub limit: LimitSpec,
}
