//! Providers of actual table descriptions.

use std::collections::BTreeMap;
use std::fmt;

use crate::dialect::TypeCanonicalizer;
use crate::diff::{CheckOptions, SchemaChecker};
use crate::error::{Result, TableNotFoundError};
use crate::spec::TableDescription;

/// A provider of live table descriptions.
pub trait SchemaSource {
    /// Describes the named table.
    fn describe_table(&self, table: &str) -> std::result::Result<TableDescription, TableNotFoundError>;

    /// The type canonicalizer matching the engine behind this source.
    fn types(&self) -> &dyn TypeCanonicalizer;
}

/// An in-memory schema source.
///
/// ```
/// use oxide_schema::{SchemaSource, SqliteTypes, StaticSource, TableDescription};
///
/// let source = StaticSource::new(SqliteTypes).table("users", TableDescription::new());
/// assert!(source.describe_table("users").is_ok());
/// assert!(source.describe_table("posts").is_err());
/// ```
pub struct StaticSource {
    tables: BTreeMap<String, TableDescription>,
    types: Box<dyn TypeCanonicalizer>,
}

impl StaticSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new(types: impl TypeCanonicalizer + 'static) -> Self {
        Self {
            tables: BTreeMap::new(),
            types: Box::new(types),
        }
    }

    /// Adds a table.
    #[must_use]
    pub fn table(mut self, name: impl Into<String>, description: TableDescription) -> Self {
        self.insert(name, description);
        self
    }

    /// Adds or replaces a table, returning the previous description.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        description: TableDescription,
    ) -> Option<TableDescription> {
        self.tables.insert(name.into(), description)
    }

    /// Returns a table's description.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableDescription> {
        self.tables.get(name)
    }

    /// Table names, sorted.
    pub fn table_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tables.keys().map(String::as_str)
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the source has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl fmt::Debug for StaticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSource")
            .field("tables", &self.tables)
            .field("types", &self.types.name())
            .finish()
    }
}

impl SchemaSource for StaticSource {
    fn describe_table(&self, table: &str) -> std::result::Result<TableDescription, TableNotFoundError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| TableNotFoundError::new(table))
    }

    fn types(&self) -> &dyn TypeCanonicalizer {
        self.types.as_ref()
    }
}

/// Checks a table of `source` against its expected description.
///
/// A disabled check succeeds without consulting the source. Otherwise a
/// missing table fails with
/// [`CheckError::TableNotFound`](crate::CheckError::TableNotFound) before
/// any comparison is made.
pub fn check_table(
    source: &(impl SchemaSource + ?Sized),
    table: &str,
    expected: &TableDescription,
    options: CheckOptions,
) -> Result<()> {
    if options.disabled {
        return Ok(());
    }
    let actual = source.describe_table(table)?;
    SchemaChecker::new(source.types()).check(table, &actual, expected, options)
}
