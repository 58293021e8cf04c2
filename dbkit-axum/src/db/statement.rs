//! Composable, unexecuted `SELECT` statements.
//!
//! A [`Select`] is a plain value: filters, ordering and limits are added by
//! consuming builder methods and nothing touches the database until a
//! session runs it. Table, column and ordering strings are written into the
//! SQL as-is and must come from code, never from user input. User values go
//! through [`Value`] binds.

use std::ops::{BitAnd, BitOr, Not};

use sqlx::{QueryBuilder, Sqlite};

use super::value::Value;

/// A `SELECT` over one table
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    joins: Vec<String>,
    conditions: Vec<Condition>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    /// Select every column of `table`.
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Replace the selected columns (default `<table>.*`).
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append a raw join clause, e.g. `LEFT JOIN profiles ON profiles.user_id = users.id`.
    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Add a condition; all conditions are combined with `AND`.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append an ordering term, e.g. `users.id DESC`.
    pub fn order_by(mut self, term: impl Into<String>) -> Self {
        self.order_by.push(term.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Lower the limit to `max` unless it is already smaller.
    pub fn limit_at_most(mut self, max: u64) -> Self {
        self.limit = Some(self.limit.map_or(max, |limit| limit.min(max)));
        self
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Drop limit and offset.
    pub fn without_limits(mut self) -> Self {
        self.limit = None;
        self.offset = None;
        self
    }

    pub fn without_order(mut self) -> Self {
        self.order_by.clear();
        self
    }

    pub fn is_ordered(&self) -> bool {
        !self.order_by.is_empty()
    }

    /// Render into a query builder ready to execute.
    pub fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("");
        self.push_to(&mut qb);
        qb
    }

    /// `SELECT COUNT(*)` over the rows this statement returns.
    pub fn count_query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM (");
        self.push_to(&mut qb);
        qb.push(") AS counted");
        qb
    }

    /// `SELECT EXISTS(...)` over this statement.
    pub fn exists_query(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT EXISTS(");
        self.push_to(&mut qb);
        qb.push(")");
        qb
    }

    /// SQL text with `?` placeholders, for logging and tests.
    pub fn to_sql(&self) -> String {
        self.build().into_sql()
    }

    fn push_to(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        qb.push("SELECT ");
        if self.columns.is_empty() {
            qb.push(&self.table).push(".*");
        } else {
            qb.push(self.columns.join(", "));
        }
        qb.push(" FROM ").push(&self.table);

        for join in &self.joins {
            qb.push(" ").push(join);
        }

        for (i, condition) in self.conditions.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            condition.push_to(qb);
        }

        if !self.order_by.is_empty() {
            qb.push(" ORDER BY ").push(self.order_by.join(", "));
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                qb.push(" LIMIT ").push(sql_int(limit));
                if let Some(offset) = offset {
                    qb.push(" OFFSET ").push(sql_int(offset));
                }
            }
            // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
            (None, Some(offset)) => {
                qb.push(" LIMIT -1 OFFSET ").push(sql_int(offset));
            }
            (None, None) => {}
        }
    }
}

/// SQLite integers are signed 64-bit.
fn sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Comparison operator for [`Condition::Compare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A boolean SQL expression with bound values
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    Like {
        column: String,
        pattern: String,
        case_insensitive: bool,
    },
    Null {
        column: String,
        negated: bool,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    /// Raw SQL; each `?` takes the next bind, missing binds become NULL
    Raw {
        sql: String,
        binds: Vec<Value>,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Raw SQL with `?` placeholders.
    ///
    /// A `?` inside a single-quoted string literal is kept as text. Other
    /// quoting (`"ident?"`, comments) is not parsed, so keep `?` out of it.
    pub fn raw(sql: impl Into<String>, binds: Vec<Value>) -> Self {
        Self::Raw {
            sql: sql.into(),
            binds,
        }
    }

    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            this => Self::All(vec![this, other]),
        }
    }

    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            this => Self::Any(vec![this, other]),
        }
    }

    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Prefix bare column names with `table`. Raw SQL is left alone.
    pub fn qualified(self, table: &str) -> Self {
        match self {
            Self::Compare { column, op, value } => Self::Compare {
                column: qualify(table, column),
                op,
                value,
            },
            Self::Like {
                column,
                pattern,
                case_insensitive,
            } => Self::Like {
                column: qualify(table, column),
                pattern,
                case_insensitive,
            },
            Self::Null { column, negated } => Self::Null {
                column: qualify(table, column),
                negated,
            },
            Self::In { column, values } => Self::In {
                column: qualify(table, column),
                values,
            },
            raw @ Self::Raw { .. } => raw,
            Self::All(conditions) => {
                Self::All(conditions.into_iter().map(|c| c.qualified(table)).collect())
            }
            Self::Any(conditions) => {
                Self::Any(conditions.into_iter().map(|c| c.qualified(table)).collect())
            }
            Self::Not(condition) => Self::Not(Box::new(condition.qualified(table))),
        }
    }

    fn push_to(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            Self::Compare { column, op, value } => {
                qb.push(column).push(" ").push(op.as_str()).push(" ");
                value.push_bind(qb);
            }
            Self::Like {
                column,
                pattern,
                case_insensitive: false,
            } => {
                qb.push(column).push(" LIKE ");
                qb.push_bind(pattern.clone());
            }
            Self::Like {
                column,
                pattern,
                case_insensitive: true,
            } => {
                qb.push("LOWER(").push(column).push(") LIKE LOWER(");
                qb.push_bind(pattern.clone());
                qb.push(")");
            }
            Self::Null { column, negated } => {
                qb.push(column)
                    .push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::In { values, .. } if values.is_empty() => {
                qb.push("1 = 0");
            }
            Self::In { column, values } => {
                qb.push(column).push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    value.push_bind(qb);
                }
                qb.push(")");
            }
            Self::Raw { sql, binds } => {
                let mut binds = binds.iter();
                let mut quoted = false;
                let mut start = 0;
                qb.push("(");
                for (i, ch) in sql.char_indices() {
                    match ch {
                        '\'' => quoted = !quoted,
                        '?' if !quoted => {
                            qb.push(&sql[start..i]);
                            binds.next().unwrap_or(&Value::Null).push_bind(qb);
                            start = i + 1;
                        }
                        _ => {}
                    }
                }
                qb.push(&sql[start..]);
                qb.push(")");
            }
            Self::All(conditions) => push_group(qb, conditions, " AND ", "1 = 1"),
            Self::Any(conditions) => push_group(qb, conditions, " OR ", "1 = 0"),
            Self::Not(condition) => {
                qb.push("NOT (");
                condition.push_to(qb);
                qb.push(")");
            }
        }
    }
}

pub(crate) fn qualify(table: &str, column: String) -> String {
    if column.contains('.') || column.contains('(') {
        column
    } else {
        format!("{}.{}", table, column)
    }
}

fn push_group(
    qb: &mut QueryBuilder<'static, Sqlite>,
    conditions: &[Condition],
    separator: &str,
    empty: &str,
) {
    if conditions.is_empty() {
        qb.push(empty);
        return;
    }

    qb.push("(");
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        condition.push_to(qb);
    }
    qb.push(")");
}

impl BitAnd for Condition {
    type Output = Condition;

    fn bitand(self, rhs: Condition) -> Condition {
        self.and(rhs)
    }
}

impl BitOr for Condition {
    type Output = Condition;

    fn bitor(self, rhs: Condition) -> Condition {
        self.or(rhs)
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        self.negate()
    }
}

/// A column reference used to build conditions
#[derive(Debug, Clone)]
pub struct Column(String);

/// Start a condition on `name` (`"email"` or `"users.email"`).
pub fn col(name: impl Into<String>) -> Column {
    Column(name.into())
}

impl Column {
    pub fn name(&self) -> &str {
        &self.0
    }

    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Condition {
        Condition::Compare {
            column: self.0,
            op,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Le, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Condition {
        self.compare(CompareOp::Ge, value)
    }

    pub fn like(self, pattern: impl Into<String>) -> Condition {
        Condition::Like {
            column: self.0,
            pattern: pattern.into(),
            case_insensitive: false,
        }
    }

    /// Case-insensitive `LIKE`.
    pub fn ilike(self, pattern: impl Into<String>) -> Condition {
        Condition::Like {
            column: self.0,
            pattern: pattern.into(),
            case_insensitive: true,
        }
    }

    pub fn is_null(self) -> Condition {
        Condition::Null {
            column: self.0,
            negated: false,
        }
    }

    pub fn is_not_null(self) -> Condition {
        Condition::Null {
            column: self.0,
            negated: true,
        }
    }

    pub fn is_in<I, V>(self, values: I) -> Condition
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition::In {
            column: self.0,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_select() {
        assert_eq!(Select::from_table("users").to_sql(), "SELECT users.* FROM users");
    }

    #[test]
    fn renders_filters_order_and_limits() {
        let stmt = Select::from_table("users")
            .filter(col("users.id").gt(8))
            .filter(col("name").ilike("%user%"))
            .order_by("users.id")
            .limit(2)
            .offset(4);

        assert_eq!(
            stmt.to_sql(),
            "SELECT users.* FROM users WHERE users.id > ? AND LOWER(name) LIKE LOWER(?) \
             ORDER BY users.id LIMIT 2 OFFSET 4"
        );
    }

    #[test]
    fn offset_without_limit() {
        let stmt = Select::from_table("users").offset(3);
        assert_eq!(stmt.to_sql(), "SELECT users.* FROM users LIMIT -1 OFFSET 3");
    }

    #[test]
    fn combinators_group_with_parentheses() {
        let cond = (col("a").eq(1) | col("b").eq(2)) & !col("c").is_null();
        let stmt = Select::from_table("t").columns(["a", "b"]).filter(cond);
        assert_eq!(
            stmt.to_sql(),
            "SELECT a, b FROM t WHERE ((a = ? OR b = ?) AND NOT (c IS NULL))"
        );
    }

    #[test]
    fn empty_in_matches_nothing() {
        let stmt = Select::from_table("t").filter(col("id").is_in(Vec::<i64>::new()));
        assert_eq!(stmt.to_sql(), "SELECT t.* FROM t WHERE 1 = 0");

        let stmt = Select::from_table("t").filter(col("id").is_in([1, 2, 3]));
        assert_eq!(stmt.to_sql(), "SELECT t.* FROM t WHERE id IN (?, ?, ?)");
    }

    #[test]
    fn raw_condition_binds_placeholders() {
        let stmt = Select::from_table("t").filter(Condition::raw(
            "a = ? OR b = ?",
            vec![Value::from(1_i64), Value::from("x")],
        ));
        assert_eq!(stmt.to_sql(), "SELECT t.* FROM t WHERE (a = ? OR b = ?)");
    }

    #[test]
    fn raw_condition_keeps_quoted_question_marks() {
        let stmt = Select::from_table("t").filter(Condition::raw(
            "name <> 'who?' AND id = ?",
            vec![Value::from(2_i64)],
        ));
        assert_eq!(stmt.to_sql(), "SELECT t.* FROM t WHERE (name <> 'who?' AND id = ?)");
    }

    #[test]
    fn oversized_limits_are_capped() {
        let stmt = Select::from_table("t").limit(u64::MAX).offset(u64::MAX);
        assert_eq!(
            stmt.to_sql(),
            format!("SELECT t.* FROM t LIMIT {0} OFFSET {0}", i64::MAX)
        );
    }

    #[test]
    fn count_and_exists_wrap_the_statement() {
        let stmt = Select::from_table("t").filter(col("id").eq(1));
        assert_eq!(
            stmt.count_query().into_sql(),
            "SELECT COUNT(*) FROM (SELECT t.* FROM t WHERE id = ?) AS counted"
        );
        assert_eq!(
            stmt.exists_query().into_sql(),
            "SELECT EXISTS(SELECT t.* FROM t WHERE id = ?)"
        );
    }

    #[test]
    fn qualifies_bare_columns() {
        let cond = (col("email").eq("a") | col("profiles.bio").is_null())
            & Condition::raw("id > ?", vec![Value::from(1_i64)]);
        let stmt = Select::from_table("users").filter(cond.qualified("users"));
        assert_eq!(
            stmt.to_sql(),
            "SELECT users.* FROM users WHERE ((users.email = ? OR profiles.bio IS NULL) AND (id > ?))"
        );
    }

    #[test]
    fn limit_helpers() {
        let stmt = Select::from_table("t").limit(10).offset(5);
        assert_eq!(stmt.clone().limit_at_most(2).limit_value(), Some(2));
        assert_eq!(stmt.clone().limit_at_most(20).limit_value(), Some(10));

        let stripped = stmt.order_by("id").without_limits().without_order();
        assert_eq!(stripped.limit_value(), None);
        assert_eq!(stripped.offset_value(), None);
        assert!(!stripped.is_ordered());
    }
}
