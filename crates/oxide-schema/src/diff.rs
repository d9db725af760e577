//! The diff engine.
//!
//! [`SchemaChecker`] normalizes both descriptions of a table, matches every
//! category independently and collects the differences into a
//! [`SchemaDiffError`].

use std::fmt;
use std::sync::Arc;

use crate::dialect::TypeCanonicalizer;
use crate::error::{NormalizeError, Result, SchemaDiffError};
use crate::matcher::{self, Outcome};
use crate::normalize::{Defaults, Normalizer};
use crate::spec::{Category, ColumnSpec, ConstraintSpec, IndexSpec, RawSpec, TableDescription};

/// One normalized schema element of any category.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A column.
    Column(ColumnSpec),
    /// An index.
    Index(IndexSpec),
    /// A table-level constraint.
    Constraint(ConstraintSpec),
}

impl Element {
    /// The category this element belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Column(_) => Category::Columns,
            Self::Index(_) => Category::Indexes,
            Self::Constraint(_) => Category::Constraints,
        }
    }

    /// Short identity of the element: the column name, the index name or
    /// column list, the constraint name or body.
    #[must_use]
    pub fn identity(&self) -> String {
        match self {
            Self::Column(column) => column.name.clone(),
            Self::Index(index) => index
                .name
                .clone()
                .unwrap_or_else(|| format!("[{}]", index.columns.join(", "))),
            Self::Constraint(constraint) => constraint
                .name
                .clone()
                .unwrap_or_else(|| constraint.check.clone()),
        }
    }
}

impl From<ColumnSpec> for Element {
    fn from(column: ColumnSpec) -> Self {
        Self::Column(column)
    }
}

impl From<IndexSpec> for Element {
    fn from(index: IndexSpec) -> Self {
        Self::Index(index)
    }
}

impl From<ConstraintSpec> for Element {
    fn from(constraint: ConstraintSpec) -> Self {
        Self::Constraint(constraint)
    }
}

/// Kind of discrepancy, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Present in the live table only.
    Extra,
    /// Expected but absent from the live table.
    Missing,
    /// Present on both sides with different attributes.
    Mismatch,
}

impl DiffKind {
    /// All kinds, in reporting order.
    pub const ALL: [Self; 3] = [Self::Extra, Self::Missing, Self::Mismatch];
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Extra => "extra",
            Self::Missing => "missing",
            Self::Mismatch => "mismatch",
        };
        f.write_str(name)
    }
}

/// Which description an unpaired element came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The live table.
    Actual,
    /// The declared expectation.
    Expected,
}

/// One unit of disagreement between the actual and expected descriptions.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffRecord {
    /// An actual element with no expected counterpart.
    Extra(Element),
    /// An expected element with no actual counterpart.
    Missing(Element),
    /// An actual and an expected element with the same identity that are
    /// not equal.
    Mismatch {
        /// The element found in the live table.
        actual: Element,
        /// The element that was declared.
        expected: Element,
    },
}

impl DiffRecord {
    /// The category of the record's element(s).
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Extra(element) | Self::Missing(element) => element.category(),
            Self::Mismatch { expected, .. } => expected.category(),
        }
    }

    /// The kind of discrepancy.
    #[must_use]
    pub const fn kind(&self) -> DiffKind {
        match self {
            Self::Extra(_) => DiffKind::Extra,
            Self::Missing(_) => DiffKind::Missing,
            Self::Mismatch { .. } => DiffKind::Mismatch,
        }
    }

    /// The side an unpaired element came from; `None` for mismatches.
    #[must_use]
    pub const fn side(&self) -> Option<Side> {
        match self {
            Self::Extra(_) => Some(Side::Actual),
            Self::Missing(_) => Some(Side::Expected),
            Self::Mismatch { .. } => None,
        }
    }

    fn from_outcome<T: Into<Element>>(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Extra(actual) => Self::Extra(actual.into()),
            Outcome::Missing(expected) => Self::Missing(expected.into()),
            Outcome::Mismatch { actual, expected } => Self::Mismatch {
                actual: actual.into(),
                expected: expected.into(),
            },
        }
    }
}

/// Options for a schema check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Leave the indexes category out of the comparison.
    pub skip_indexes: bool,
    /// Succeed without comparing anything.
    pub disabled: bool,
}

impl CheckOptions {
    /// Creates default options: every category compared.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            skip_indexes: false,
            disabled: false,
        }
    }

    /// Sets whether indexes are skipped.
    #[must_use]
    pub const fn skip_indexes(mut self, skip: bool) -> Self {
        self.skip_indexes = skip;
        self
    }

    /// Sets whether the check is disabled.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Categories compared under these options, in order.
    pub fn categories(self) -> impl Iterator<Item = Category> {
        Category::ALL
            .into_iter()
            .filter(move |category| !(self.skip_indexes && *category == Category::Indexes))
    }
}

/// Both descriptions of one category, normalized.
struct Normalized<T> {
    actual: Vec<T>,
    expected: Vec<T>,
}

impl<T> Normalized<T> {
    fn empty() -> Self {
        Self {
            actual: Vec::new(),
            expected: Vec::new(),
        }
    }
}

/// Compares live tables against their expected descriptions.
#[derive(Debug, Clone)]
pub struct SchemaChecker<T> {
    types: T,
    normalizer: Normalizer,
}

impl<T: TypeCanonicalizer> SchemaChecker<T> {
    /// Creates a checker using the standard defaults.
    #[must_use]
    pub fn new(types: T) -> Self {
        Self::with_defaults(types, Arc::new(Defaults::standard()))
    }

    /// Creates a checker using custom defaults.
    #[must_use]
    pub const fn with_defaults(types: T, defaults: Arc<Defaults>) -> Self {
        Self {
            types,
            normalizer: Normalizer::new(defaults),
        }
    }

    /// The type canonicalizer.
    #[must_use]
    pub const fn types(&self) -> &T {
        &self.types
    }

    /// The normalizer both descriptions go through.
    #[must_use]
    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Checks `actual` against `expected`.
    ///
    /// Fails with [`CheckError::Normalize`](crate::CheckError::Normalize)
    /// if any element of either side cannot be normalized, in which case no
    /// matching happens, and with
    /// [`CheckError::SchemaDiff`](crate::CheckError::SchemaDiff) carrying
    /// every difference if the descriptions disagree.
    pub fn check(
        &self,
        table: &str,
        actual: &TableDescription,
        expected: &TableDescription,
        options: CheckOptions,
    ) -> Result<()> {
        if options.disabled {
            return Ok(());
        }
        let records = self.diff(actual, expected, options)?;
        if records.is_empty() {
            Ok(())
        } else {
            Err(SchemaDiffError::new(table, records, Arc::clone(self.normalizer.defaults())).into())
        }
    }

    /// Returns every difference between `actual` and `expected`, ordered by
    /// category, ignoring `options.disabled`.
    pub fn diff(
        &self,
        actual: &TableDescription,
        expected: &TableDescription,
        options: CheckOptions,
    ) -> Result<Vec<DiffRecord>> {
        let columns = self.normalize_all(Category::Columns, actual, expected, |n, raw| n.column(raw))?;
        let indexes = if options.skip_indexes {
            Normalized::empty()
        } else {
            self.normalize_all(Category::Indexes, actual, expected, |n, raw| n.index(raw))?
        };
        let constraints =
            self.normalize_all(Category::Constraints, actual, expected, |n, raw| n.constraint(raw))?;

        let mut records: Vec<DiffRecord> = matcher::match_elements(
            &columns.actual,
            &columns.expected,
            |a, e| matcher::columns_equal(&self.types, a, e),
            matcher::columns_related,
        )
        .into_iter()
        .map(DiffRecord::from_outcome)
        .collect();

        records.extend(
            matcher::match_elements(
                &indexes.actual,
                &indexes.expected,
                matcher::indexes_equal,
                matcher::indexes_related,
            )
            .into_iter()
            .map(DiffRecord::from_outcome),
        );

        records.extend(
            matcher::match_elements(
                &constraints.actual,
                &constraints.expected,
                matcher::constraints_equal,
                matcher::constraints_related,
            )
            .into_iter()
            .map(DiffRecord::from_outcome),
        );

        Ok(records)
    }

    /// Normalizes the expected side first, so that mistakes in a declared
    /// expectation are reported before problems in the live description.
    fn normalize_all<S>(
        &self,
        category: Category,
        actual: &TableDescription,
        expected: &TableDescription,
        normalize: impl Fn(&Normalizer, &RawSpec) -> std::result::Result<S, NormalizeError>,
    ) -> Result<Normalized<S>> {
        let expected = expected
            .specs(category)
            .iter()
            .map(|raw| normalize(&self.normalizer, raw))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let actual = actual
            .specs(category)
            .iter()
            .map(|raw| normalize(&self.normalizer, raw))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Normalized { actual, expected })
    }
}

/// Checks one table with the standard defaults.
///
/// ```
/// use oxide_schema::{check_schema, CheckOptions, SqliteTypes, TableDescription};
/// use serde_json::json;
///
/// let actual = TableDescription::from_json(json!({
///     "columns": [{"name": "id", "type": "integer", "nullable": false}]
/// }))
/// .unwrap();
/// let expected = TableDescription::from_json(json!({
///     "columns": [{"name": "id", "type": "Integer", "nullable": false}]
/// }))
/// .unwrap();
///
/// assert!(check_schema("users", &actual, &expected, &SqliteTypes, CheckOptions::new()).is_ok());
/// ```
pub fn check_schema(
    table: &str,
    actual: &TableDescription,
    expected: &TableDescription,
    types: &dyn TypeCanonicalizer,
    options: CheckOptions,
) -> Result<()> {
    SchemaChecker::new(types).check(table, actual, expected, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqliteTypes;
    use crate::error::CheckError;
    use serde_json::{json, Value};

    fn table(value: Value) -> TableDescription {
        TableDescription::from_json(value).unwrap()
    }

    fn records(actual: Value, expected: Value, options: CheckOptions) -> Vec<DiffRecord> {
        SchemaChecker::new(SqliteTypes)
            .diff(&table(actual), &table(expected), options)
            .unwrap()
    }

    #[test]
    fn test_categories_in_order() {
        let found = records(
            json!({
                "columns": [{"name": "a"}],
                "indexes": [{"columns": ["a"]}],
                "constraints": [{"check": "a > 0"}],
            }),
            json!({}),
            CheckOptions::new(),
        );
        let categories: Vec<Category> = found.iter().map(DiffRecord::category).collect();
        assert_eq!(
            categories,
            vec![Category::Columns, Category::Indexes, Category::Constraints]
        );
        assert!(found.iter().all(|r| r.kind() == DiffKind::Extra));
        assert!(found.iter().all(|r| r.side() == Some(Side::Actual)));
    }

    #[test]
    fn test_skip_indexes() {
        let found = records(
            json!({"indexes": [{"columns": ["a"]}]}),
            json!({"indexes": [{"columns": ["b"], "bogus": 1}]}),
            CheckOptions::new().skip_indexes(true),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_disabled_skips_everything() {
        let checker = SchemaChecker::new(SqliteTypes);
        let result = checker.check(
            "users",
            &table(json!({"columns": [{"name": "a"}]})),
            &table(json!({"columns": [{"name": "b", "foo": 1}]})),
            CheckOptions::new().disabled(true),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_expected_side_normalized_first() {
        let checker = SchemaChecker::new(SqliteTypes);
        let error = checker
            .check(
                "users",
                &table(json!({"columns": [{"name": "a", "bar": 1}]})),
                &table(json!({"columns": [{"name": "a", "foo": 1}]})),
                CheckOptions::new(),
            )
            .unwrap_err();
        assert_eq!(error.to_string(), "foo is an invalid attribute for column a");
    }

    #[test]
    fn test_type_qualifiers_compared_through_canonical_type() {
        let found = records(
            json!({"columns": [{"name": "code", "type": "char(2)"}]}),
            json!({"columns": [{"name": "code", "type": "String", "fixed": true, "size": 2}]}),
            CheckOptions::new(),
        );
        assert!(found.is_empty());

        let found = records(
            json!({"columns": [{"name": "code", "type": "varchar(2)"}]}),
            json!({"columns": [{"name": "code", "type": "String", "fixed": true, "size": 2}]}),
            CheckOptions::new(),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), DiffKind::Mismatch);
        assert_eq!(found[0].side(), None);
    }

    #[test]
    fn test_mismatch_error_carries_table_and_records() {
        let checker = SchemaChecker::new(SqliteTypes);
        let error = checker
            .check(
                "users",
                &table(json!({"columns": [{"name": "age", "type": "integer"}]})),
                &table(json!({"columns": [{"name": "age", "type": "Integer", "nullable": false}]})),
                CheckOptions::new(),
            )
            .unwrap_err();

        let CheckError::SchemaDiff(diff) = error else {
            panic!("expected a schema diff");
        };
        assert_eq!(diff.table(), "users");
        assert_eq!(diff.records().len(), 1);
        assert_eq!(diff.records_of(Category::Columns, DiffKind::Mismatch).count(), 1);
    }

    #[test]
    fn test_constraint_name_difference_is_mismatch() {
        let found = records(
            json!({"constraints": [{"check": "price > 0", "name": "positive"}]}),
            json!({"constraints": [{"check": "price > 0"}]}),
            CheckOptions::new(),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind(), DiffKind::Mismatch);
    }

    #[test]
    fn test_element_identity() {
        let index = Element::Index(IndexSpec {
            columns: vec!["a".to_string(), "b".to_string()],
            name: None,
            index_type: None,
            unique: false,
            predicate: None,
        });
        assert_eq!(index.identity(), "[a, b]");
        assert_eq!(index.category(), Category::Indexes);
    }

    #[test]
    fn test_options_categories() {
        let all: Vec<Category> = CheckOptions::new().categories().collect();
        assert_eq!(all, Category::ALL.to_vec());
        let some: Vec<Category> = CheckOptions::new().skip_indexes(true).categories().collect();
        assert_eq!(some, vec![Category::Columns, Category::Constraints]);
    }
}
