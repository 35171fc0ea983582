//! Filter predicates for store queries.
//!
//! A [`Predicate`] is a side-effect-free description of a `WHERE` condition.
//! Query code composes them and renders the result once with
//! [`Predicate::to_sql`], binding the parameters through rusqlite.
//!
//! Most API filters are optional: a field left out of the filter must impose
//! no constraint. [`optional_predicate`] turns an `Option` into either the
//! caller's predicate or [`Predicate::All`], which matches every row.

use assembler_types::decode;
use rusqlite::types::Value;

/// Column holding the store-local ID in every node table.
pub const ID_COLUMN: &str = "id";

/// A composable `WHERE` condition.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// No constraint.
    All,
    /// `column = value`.
    FieldEq { column: String, value: Value },
    /// `column = value`, ASCII case-insensitive.
    FieldEqFold { column: String, value: String },
    /// `column IN (values...)`. Empty matches nothing.
    FieldIn { column: String, values: Vec<Value> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// Rendered SQL with positional (`?`) parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlFragment {
    fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Parameters in a form `Statement::query` accepts.
    pub fn bind(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, Value>> {
        rusqlite::params_from_iter(self.params.iter())
    }
}

impl Predicate {
    pub fn field_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::FieldEq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn text_eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::field_eq(column, Value::Text(value.into()))
    }

    pub fn text_eq_fold(column: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::FieldEqFold {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn field_in<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::FieldIn {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// True when this predicate constrains nothing.
    pub fn is_all(&self) -> bool {
        match self {
            Predicate::All => true,
            Predicate::And(parts) => parts.iter().all(Predicate::is_all),
            _ => false,
        }
    }

    /// Conjunction, dropping no-op sides.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self.is_all(), other.is_all()) {
            (true, _) => other,
            (_, true) => self,
            _ => match self {
                Predicate::And(mut parts) => {
                    parts.push(other);
                    Predicate::And(parts)
                }
                _ => Predicate::And(vec![self, other]),
            },
        }
    }

    /// Conjunction of many predicates; no-ops are dropped.
    pub fn and_all(preds: impl IntoIterator<Item = Predicate>) -> Predicate {
        preds.into_iter().fold(Predicate::All, Predicate::and)
    }

    pub fn or(self, other: Predicate) -> Predicate {
        match self {
            Predicate::Or(mut parts) => {
                parts.push(other);
                Predicate::Or(parts)
            }
            _ => Predicate::Or(vec![self, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    /// Render as a `WHERE` condition (without the `WHERE` keyword).
    pub fn to_sql(&self) -> SqlFragment {
        let mut out = SqlFragment::default();
        self.write_sql(&mut out);
        out
    }

    fn write_sql(&self, out: &mut SqlFragment) {
        match self {
            Predicate::All => out.sql.push_str("1 = 1"),
            Predicate::FieldEq { column, value } => {
                out.sql.push_str(&quote_ident(column));
                out.sql.push_str(" = ?");
                out.params.push(value.clone());
            }
            Predicate::FieldEqFold { column, value } => {
                out.sql.push_str(&quote_ident(column));
                out.sql.push_str(" = ? COLLATE NOCASE");
                out.params.push(Value::Text(value.clone()));
            }
            Predicate::FieldIn { column, values } => {
                if values.is_empty() {
                    out.sql.push_str("1 = 0");
                    return;
                }
                out.sql.push_str(&quote_ident(column));
                out.sql.push_str(" IN (");
                out.sql.push_str(&vec!["?"; values.len()].join(", "));
                out.sql.push(')');
                out.params.extend(values.iter().cloned());
            }
            Predicate::And(parts) => write_joined(out, parts, " AND ", "1 = 1"),
            Predicate::Or(parts) => write_joined(out, parts, " OR ", "1 = 0"),
            Predicate::Not(inner) => {
                out.sql.push_str("NOT (");
                inner.write_sql(out);
                out.sql.push(')');
            }
        }
    }
}

fn write_joined(out: &mut SqlFragment, parts: &[Predicate], sep: &str, empty: &str) {
    if parts.is_empty() {
        out.sql.push_str(empty);
        return;
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.sql.push_str(sep);
        }
        out.sql.push('(');
        part.write_sql(out);
        out.sql.push(')');
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// ── Optional filters ────────────────────────────────────────────────────────

/// `f(value)` when a value is present, otherwise [`Predicate::All`].
///
/// `f` is not called for an absent value.
pub fn optional_predicate<T, F>(value: Option<T>, f: F) -> Predicate
where
    F: FnOnce(T) -> Predicate,
{
    match value {
        Some(v) => f(v),
        None => Predicate::All,
    }
}

/// Match the node whose local ID is carried by `global_id`.
///
/// The type tag is ignored; the caller has already picked the table.
pub fn id_eq(global_id: &str) -> Predicate {
    Predicate::text_eq(ID_COLUMN, decode(global_id).local_id)
}

/// Match any node whose local ID is carried by one of `global_ids`.
pub fn id_in<I, S>(global_ids: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Predicate::field_in(
        ID_COLUMN,
        global_ids
            .into_iter()
            .map(|id| Value::Text(decode(id.as_ref()).local_id)),
    )
}

/// Lowercase an optional filter value.
///
/// ASCII only, matching SQLite's `NOCASE` collation used by
/// [`Predicate::text_eq_fold`]. Non-ASCII letters pass through unchanged.
pub fn to_lower_opt(s: Option<&str>) -> Option<String> {
    s.map(str::to_ascii_lowercase)
}

// ── Selector ────────────────────────────────────────────────────────────────

/// A `SELECT` over one node table.
#[derive(Clone, Debug)]
pub struct Selector {
    table: String,
    columns: Vec<String>,
    predicate: Predicate,
    limit: Option<usize>,
}

impl Selector {
    /// Select every column of `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            predicate: Predicate::All,
            limit: None,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a condition; repeated calls are ANDed together.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = std::mem::replace(&mut self.predicate, Predicate::All).and(predicate);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn to_sql(&self) -> SqlFragment {
        let cols = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut out = SqlFragment::new(format!("SELECT {cols} FROM {}", quote_ident(&self.table)));

        if !self.predicate.is_all() {
            let cond = self.predicate.to_sql();
            out.sql.push_str(" WHERE ");
            out.sql.push_str(&cond.sql);
            out.params = cond.params;
        }
        if let Some(limit) = self.limit {
            out.sql.push_str(&format!(" LIMIT {limit}"));
        }

        tracing::trace!(sql = %out.sql, params = out.params.len(), "rendered selector");
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
