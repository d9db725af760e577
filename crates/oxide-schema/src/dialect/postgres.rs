//! PostgreSQL type rendering.
//!
//! Native literals are folded onto the names PostgreSQL reports in its
//! catalogs (`int4` becomes `integer`, `character varying` becomes
//! `varchar`, ...). Array suffixes are preserved.

use crate::spec::{ColumnSpec, ColumnType, GenericType};

use super::{decimal_literal, normalize_literal, string_literal, with_size, TypeCanonicalizer};

/// Alternative spellings and their catalog names.
const ALIASES: &[(&str, &str)] = &[
    ("int", "integer"),
    ("int4", "integer"),
    ("int8", "bigint"),
    ("int2", "smallint"),
    ("bool", "boolean"),
    ("float4", "real"),
    ("float8", "double precision"),
    ("decimal", "numeric"),
    ("character varying", "varchar"),
    ("character", "char"),
    ("timestamp without time zone", "timestamp"),
    ("timestamptz", "timestamp with time zone"),
    ("time without time zone", "time"),
    ("timetz", "time with time zone"),
];

/// PostgreSQL type canonicalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTypes;

impl PostgresTypes {
    /// Creates a new PostgreSQL canonicalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn generic(ty: GenericType, column: &ColumnSpec) -> String {
        match ty {
            GenericType::Integer if column.serial => "serial".to_string(),
            GenericType::Integer => "integer".to_string(),
            GenericType::BigInt if column.serial => "bigserial".to_string(),
            GenericType::BigInt => "bigint".to_string(),
            GenericType::SmallInt if column.serial => "smallserial".to_string(),
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
            GenericType::Blob => "bytea".to_string(),
            GenericType::Json => "jsonb".to_string(),
            GenericType::Uuid => "uuid".to_string(),
        }
    }

    /// Folds the type name of a normalized literal, keeping its parameters
    /// and array suffix. Parameters may precede a time zone clause, as in
    /// `timestamp(3) without time zone`; the catalog places them right
    /// after `time` or `timestamp`.
    fn fold_alias(literal: &str) -> String {
        let (head, array) = literal.split_at(literal.find('[').unwrap_or(literal.len()));
        let (name, params) = match (head.find('('), head.rfind(')')) {
            (Some(open), Some(close)) if open < close => (
                format!("{} {}", &head[..open], &head[close + 1..]),
                &head[open..=close],
            ),
            _ => (head.to_string(), ""),
        };
        let name = name.trim();
        let name = ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map_or(name, |(_, folded)| *folded);

        match name.strip_suffix(" with time zone") {
            Some(base) if !params.is_empty() => format!("{base}{params} with time zone{array}"),
            _ => format!("{name}{params}{array}"),
        }
    }
}

impl TypeCanonicalizer for PostgresTypes {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn canonical_type(&self, column: &ColumnSpec) -> String {
        match &column.column_type {
            None => String::new(),
            Some(ColumnType::Generic(ty)) => Self::generic(*ty, column),
            Some(ColumnType::Native(literal)) => {
                let folded = Self::fold_alias(&normalize_literal(literal));
                with_size(folded, column.size)
            }
        }
    }
}
