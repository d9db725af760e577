//! SQLite type rendering.
//!
//! SQLite keeps the declared type text of every column, so the canonical
//! string is the type a `CREATE TABLE` statement would declare for the
//! column. Auto-increment columns are plain `integer` columns.

use crate::spec::{ColumnSpec, ColumnType, GenericType};

use super::{decimal_literal, normalize_literal, string_literal, with_size, TypeCanonicalizer};

/// SQLite type canonicalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTypes;

impl SqliteTypes {
    /// Creates a new SQLite canonicalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn generic(ty: GenericType, column: &ColumnSpec) -> String {
        match ty {
            GenericType::Integer => "integer".to_string(),
            GenericType::BigInt => "bigint".to_string(),
            GenericType::SmallInt => "smallint".to_string(),
            GenericType::String => string_literal(column),
            GenericType::Boolean => "boolean".to_string(),
            GenericType::Float => "real".to_string(),
            GenericType::Double => "double precision".to_string(),
            GenericType::Decimal => decimal_literal(column),
            GenericType::Date => "date".to_string(),
            GenericType::DateTime | GenericType::Timestamp => "timestamp".to_string(),
            GenericType::Time if column.only_time => "time".to_string(),
            GenericType::Time => "timestamp".to_string(),
            GenericType::Blob => "blob".to_string(),
            GenericType::Json => "json".to_string(),
            GenericType::Uuid => "uuid".to_string(),
        }
    }
}

impl TypeCanonicalizer for SqliteTypes {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn canonical_type(&self, column: &ColumnSpec) -> String {
        match &column.column_type {
            None => String::new(),
            Some(ColumnType::Generic(ty)) => Self::generic(*ty, column),
            Some(ColumnType::Native(literal)) => with_size(normalize_literal(literal), column.size),
        }
    }
}
