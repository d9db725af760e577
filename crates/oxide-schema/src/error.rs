//! Error types for schema checks.

use std::sync::Arc;

use crate::diff::{DiffKind, DiffRecord};
use crate::normalize::Defaults;
use crate::spec::Category;

/// A description used attribute names that are not recognized for its
/// category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} for {} {}", describe_keys(&.keys), .category.element_noun(), .element)]
pub struct InvalidAttributeError {
    /// Category of the offending element.
    pub category: Category,
    /// Identity of the offending element (column name, index columns, ...).
    pub element: String,
    /// Every unrecognized key, in input order.
    pub keys: Vec<String>,
}

fn describe_keys(keys: &[String]) -> String {
    let verb = if keys.len() == 1 {
        "is an invalid attribute"
    } else {
        "are invalid attributes"
    };
    format!("{} {verb}", keys.join(", "))
}

/// Errors turning a raw spec into a normalized one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// Unrecognized attribute names.
    #[error(transparent)]
    InvalidAttribute(#[from] InvalidAttributeError),

    /// A required identity attribute is absent or null.
    #[error("{} {element} is missing required attribute `{attribute}`", .category.element_noun())]
    MissingAttribute {
        /// Category of the offending element.
        category: Category,
        /// Identity of the offending element.
        element: String,
        /// The missing attribute.
        attribute: &'static str,
    },

    /// A recognized attribute holds a value of the wrong shape.
    #[error("invalid value in {} {element}: {message}", .category.element_noun())]
    InvalidValue {
        /// Category of the offending element.
        category: Category,
        /// Identity of the offending element.
        element: String,
        /// What was wrong with the value.
        message: String,
    },
}

/// The schema source has no table by the requested name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Table {table} doesn't exist")]
pub struct TableNotFoundError {
    /// The requested table.
    pub table: String,
}

impl TableNotFoundError {
    /// Creates a new error for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

/// The live table does not match its expected description.
///
/// Holds the complete, ordered list of [`DiffRecord`]s from one check. The
/// `Display` implementation renders the report on demand; see
/// [`SchemaDiffError::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDiffError {
    table: String,
    records: Vec<DiffRecord>,
    defaults: Arc<Defaults>,
}

impl SchemaDiffError {
    pub(crate) fn new(table: impl Into<String>, records: Vec<DiffRecord>, defaults: Arc<Defaults>) -> Self {
        Self {
            table: table.into(),
            records,
            defaults,
        }
    }

    /// The checked table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Every difference, in emission order.
    #[must_use]
    pub fn records(&self) -> &[DiffRecord] {
        &self.records
    }

    /// The defaults the compared specs were normalized against.
    #[must_use]
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Differences of one category and kind, in emission order.
    pub fn records_of(
        &self,
        category: Category,
        kind: DiffKind,
    ) -> impl Iterator<Item = &DiffRecord> + '_ {
        self.records
            .iter()
            .filter(move |record| record.category() == category && record.kind() == kind)
    }
}

impl std::error::Error for SchemaDiffError {}

/// Errors returned by a schema check.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckError {
    /// An actual or expected spec could not be normalized.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The table does not exist in the schema source.
    #[error(transparent)]
    TableNotFound(#[from] TableNotFoundError),

    /// The table does not match its expected description.
    #[error(transparent)]
    SchemaDiff(#[from] SchemaDiffError),
}

impl CheckError {
    /// Returns the schema diff, if this is a mismatch failure.
    #[must_use]
    pub fn as_schema_diff(&self) -> Option<&SchemaDiffError> {
        match self {
            Self::SchemaDiff(diff) => Some(diff),
            _ => None,
        }
    }
}

impl From<InvalidAttributeError> for CheckError {
    fn from(error: InvalidAttributeError) -> Self {
        Self::Normalize(error.into())
    }
}

/// Result type for schema checks.
pub type Result<T> = std::result::Result<T, CheckError>;
