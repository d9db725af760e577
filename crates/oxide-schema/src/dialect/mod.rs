//! Type canonicalization.
//!
//! Each dialect knows how to render a column's declared type and its
//! qualifier attributes into the literal type string the engine itself
//! would use. Two columns have the same type if and only if they render to
//! the same string.

mod postgres;
mod sqlite;

pub use postgres::PostgresTypes;
pub use sqlite::SqliteTypes;

use crate::spec::{ColumnSize, ColumnSpec};

/// Renders a column's type into a canonical string for comparison.
pub trait TypeCanonicalizer: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the canonical type string of `column`, or an empty string if
    /// the column has no declared type.
    fn canonical_type(&self, column: &ColumnSpec) -> String;
}

impl<T: TypeCanonicalizer + ?Sized> TypeCanonicalizer for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn canonical_type(&self, column: &ColumnSpec) -> String {
        (**self).canonical_type(column)
    }
}

impl<T: TypeCanonicalizer + ?Sized> TypeCanonicalizer for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn canonical_type(&self, column: &ColumnSpec) -> String {
        (**self).canonical_type(column)
    }
}

/// Lowercases a type literal and normalizes its whitespace, so that
/// `"VARCHAR (50)"` and `"varchar(50)"` compare equal.
#[must_use]
pub fn normalize_literal(literal: &str) -> String {
    let collapsed = literal
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let chars: Vec<char> = collapsed.chars().collect();

    let mut out = String::with_capacity(collapsed.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p));
            let next = chars.get(i + 1);
            if matches!(prev, Some('(' | ',')) || matches!(next, Some('(' | ')' | ',')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Appends `size` to a literal that carries no parameters of its own.
fn with_size(literal: String, size: Option<ColumnSize>) -> String {
    match size {
        Some(size) if !literal.contains('(') => format!("{literal}{size}"),
        _ => literal,
    }
}

/// Shared rendering of a generic string column.
fn string_literal(column: &ColumnSpec) -> String {
    if column.text {
        return "text".to_string();
    }
    let base = if column.fixed { "char" } else { "varchar" };
    match column.size {
        Some(size) => format!("{base}{size}"),
        None => format!("{base}(255)"),
    }
}

/// Shared rendering of a generic decimal column.
fn decimal_literal(column: &ColumnSpec) -> String {
    with_size("numeric".to_string(), column.size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_literal() {
        assert_eq!(normalize_literal("VARCHAR (50)"), "varchar(50)");
        assert_eq!(normalize_literal("numeric( 10 , 2 )"), "numeric(10,2)");
        assert_eq!(normalize_literal("Double   Precision"), "double precision");
        assert_eq!(normalize_literal(" text[] "), "text[]");
    }

    #[test]
    fn test_with_size() {
        assert_eq!(
            with_size("varchar".to_string(), Some(ColumnSize::Length(20))),
            "varchar(20)"
        );
        assert_eq!(
            with_size("varchar(10)".to_string(), Some(ColumnSize::Length(20))),
            "varchar(10)"
        );
        assert_eq!(with_size("integer".to_string(), None), "integer");
    }
}
