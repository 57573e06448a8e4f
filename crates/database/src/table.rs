//! The in-memory result of a query: ordered named columns and fully
//! materialized rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use sqlx::postgres::{PgColumn, PgRow};
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::DbError;

/// A single cell. The variant is chosen from the PostgreSQL column type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::TimestampTz(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// A tabular query result.
///
/// Every row holds exactly one value per column. A query that returns no
/// rows still yields its column set, so "no data" is distinguishable from
/// [`Table::empty`], which has no columns at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// A table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, DbError> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(DbError::RowWidth {
                row,
                expected: columns.len(),
                found: values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Materializes fetched PostgreSQL rows under the result's `columns`.
    ///
    /// `columns` comes from the first row, or from the prepared statement
    /// when there are no rows.
    pub fn from_pg_rows(columns: &[PgColumn], rows: &[PgRow]) -> Result<Self, DbError> {
        let columns: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

        let rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|idx| decode_value(row, idx))
                    .collect::<Result<Vec<Value>, DbError>>()
            })
            .collect::<Result<Vec<Vec<Value>>, DbError>>()?;

        Self::new(columns, rows)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Position of `name` among the columns, ignoring ASCII case
    /// (PostgreSQL folds unquoted aliases to lowercase).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Iterates rows as column-name → value maps.
    pub fn iter_records(&self) -> impl Iterator<Item = BTreeMap<&str, &Value>> + '_ {
        self.rows.iter().map(|row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect()
        })
    }
}

/// Serializes as an array of objects, one per row, keys in column order.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record {
                columns: &self.columns,
                values: row,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

fn decode_value(row: &PgRow, idx: usize) -> Result<Value, DbError> {
    let column = row.column(idx);
    let type_name = column.type_info().name();

    let value = match type_name {
        "BOOL" => get::<bool>(row, idx)?.map(Value::Bool),
        "INT2" => get::<i16>(row, idx)?.map(|v| Value::Int(v.into())),
        "INT4" => get::<i32>(row, idx)?.map(|v| Value::Int(v.into())),
        "INT8" => get::<i64>(row, idx)?.map(Value::Int),
        "FLOAT4" => get::<f32>(row, idx)?.map(|v| Value::Float(v.into())),
        "FLOAT8" => get::<f64>(row, idx)?.map(Value::Float),
        "NUMERIC" => get::<Decimal>(row, idx)?.map(Value::Decimal),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => get::<String>(row, idx)?.map(Value::Text),
        "DATE" => get::<NaiveDate>(row, idx)?.map(Value::Date),
        "TIMESTAMP" => get::<NaiveDateTime>(row, idx)?.map(Value::Timestamp),
        "TIMESTAMPTZ" => get::<DateTime<Utc>>(row, idx)?.map(Value::TimestampTz),
        // Anything else is shown as text when the driver can produce it.
        _ => get::<String>(row, idx)?.map(Value::Text),
    };

    Ok(value.unwrap_or(Value::Null))
}

fn get<'r, T>(row: &'r PgRow, idx: usize) -> Result<Option<T>, DbError>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get::<Option<T>, _>(idx).map_err(|e| {
        let column = row.column(idx);
        DbError::Decode {
            column: column.name().to_string(),
            type_name: column.type_info().name().to_string(),
            message: e.to_string(),
        }
    })
}
