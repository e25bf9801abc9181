/*
 * Responsibility
 * - 部分更新 (PATCH) 用の SET 句と位置パラメータを組み立てる
 * - 値の順序 = プレースホルダの順序 (挿入順を保持するコンテナを使う)
 * - I/O なし。bind は bind_values で repo 側から行う
 */
use chrono::{DateTime, Utc};
use sqlx::{Postgres, postgres::PgArguments, query::QueryAs};
use thiserror::Error;

/// `field -> column` rename table. Fields not listed map to themselves.
pub type ColumnRenames = [(&'static str, &'static str)];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("no data")]
    Empty,
}

/// A value bound to one positional placeholder.
///
/// NULLs stay typed so Postgres accepts them for non-text columns.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(Option<i64>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            SqlValue::Int(None)
                | SqlValue::Text(None)
                | SqlValue::Timestamp(None)
        )
    }
}

macro_rules! sql_value_from {
    ($variant:ident, $ty:ty, $conv:expr) => {
        impl From<$ty> for SqlValue {
            fn from(v: $ty) -> Self {
                SqlValue::$variant(Some($conv(v)))
            }
        }

        impl From<Option<$ty>> for SqlValue {
            fn from(v: Option<$ty>) -> Self {
                SqlValue::$variant(v.map($conv))
            }
        }
    };
}

sql_value_from!(Int, i32, i64::from);
sql_value_from!(Int, i64, |v| v);
sql_value_from!(Text, String, |v| v);
sql_value_from!(Text, &str, str::to_string);
sql_value_from!(Timestamp, DateTime<Utc>, |v| v);

/// Sparse update map that keeps insertion order.
///
/// Setting a field twice replaces its value but keeps its first position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    entries: Vec<(String, SqlValue)>,
}

impl FieldUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == field) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// `SET` fragment plus the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub set_clause: String,
    pub values: Vec<SqlValue>,
}

impl PartialUpdate {
    /// Placeholder for the k-th (1-based) parameter appended after `values`.
    pub fn next_placeholder(&self, k: usize) -> String {
        format!("${}", self.values.len() + k)
    }
}

pub fn sql_for_partial_update(
    updates: &FieldUpdates,
    renames: &ColumnRenames,
) -> Result<PartialUpdate, UpdateError> {
    if updates.is_empty() {
        return Err(UpdateError::Empty);
    }

    let set_clause = updates
        .iter()
        .enumerate()
        .map(|(idx, (field, _))| {
            let column = renames
                .iter()
                .find(|(from, _)| *from == field)
                .map(|(_, to)| *to)
                .unwrap_or(field);
            format!("\"{}\"=${}", column, idx + 1)
        })
        .collect::<Vec<_>>()
        .join(", ");

    let values = updates.iter().map(|(_, v)| v.clone()).collect();

    Ok(PartialUpdate { set_clause, values })
}

/// Bind every value in order, keeping each value's SQL type (NULLs included).
pub fn bind_values<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    values: &'q [SqlValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for v in values {
        q = match v {
            SqlValue::Int(n) => q.bind(*n),
            SqlValue::Text(s) => q.bind(s.as_deref()),
            SqlValue::Timestamp(ts) => q.bind(*ts),
        };
    }
    q
}
