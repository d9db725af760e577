//! Schema element types.
//!
//! A table is described by three lists of raw attribute maps (see
//! [`TableDescription`]). The [`Normalizer`](crate::normalize::Normalizer)
//! turns each raw map into one of the fixed-shape specs defined here, with
//! every attribute filled in.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw attribute mapping for one column, index or constraint.
pub type RawSpec = Map<String, Value>;

/// The three kinds of schema elements, compared independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Table columns.
    Columns,
    /// Table indexes.
    Indexes,
    /// Table-level constraints.
    Constraints,
}

impl Category {
    /// All categories, in comparison and reporting order.
    pub const ALL: [Self; 3] = [Self::Columns, Self::Indexes, Self::Constraints];

    /// Plural name, as used in report headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Columns => "columns",
            Self::Indexes => "indexes",
            Self::Constraints => "constraints",
        }
    }

    /// Singular noun for one element of this category.
    #[must_use]
    pub const fn element_noun(self) -> &'static str {
        match self {
            Self::Columns => "column",
            Self::Indexes => "index",
            Self::Constraints => "constraint",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database-independent type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericType {
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Character string; refined by `size`, `fixed` and `text`.
    String,
    /// Boolean.
    Boolean,
    /// Floating point (single precision).
    Float,
    /// Floating point (double precision).
    Double,
    /// Exact numeric; refined by `size`.
    Decimal,
    /// Date only.
    Date,
    /// Date and time.
    DateTime,
    /// Time of day when `only_time` is set, a timestamp otherwise.
    Time,
    /// Timestamp.
    Timestamp,
    /// Binary large object.
    Blob,
    /// JSON document.
    Json,
    /// UUID.
    Uuid,
}

impl GenericType {
    const NAMES: [(&'static str, Self); 15] = [
        ("Integer", Self::Integer),
        ("BigInt", Self::BigInt),
        ("SmallInt", Self::SmallInt),
        ("String", Self::String),
        ("Boolean", Self::Boolean),
        ("Float", Self::Float),
        ("Double", Self::Double),
        ("Decimal", Self::Decimal),
        ("Date", Self::Date),
        ("DateTime", Self::DateTime),
        ("Time", Self::Time),
        ("Timestamp", Self::Timestamp),
        ("Blob", Self::Blob),
        ("Json", Self::Json),
        ("Uuid", Self::Uuid),
    ];

    /// Looks up a generic type by its declared name (case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, ty)| *ty)
    }

    /// The declared name of this type.
    #[must_use]
    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, ty)| *ty == self)
            .map_or("", |(name, _)| name)
    }
}

/// A column's declared type.
///
/// Strings naming a [`GenericType`] (`"Integer"`, `"String"`, ...) are
/// generic; anything else is taken as an engine-specific literal such as
/// `"varchar(50)"` or `"text[]"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// A database-independent type.
    Generic(GenericType),
    /// An engine-specific type literal.
    Native(String),
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        GenericType::from_name(&value).map_or(Self::Native(value), Self::Generic)
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        match value {
            ColumnType::Generic(ty) => ty.name().to_string(),
            ColumnType::Native(literal) => literal,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(ty) => f.write_str(ty.name()),
            Self::Native(literal) => f.write_str(literal),
        }
    }
}

/// Length or precision qualifier of a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSize {
    /// A single length, e.g. `50` for `varchar(50)`.
    Length(u32),
    /// Precision and scale, e.g. `[10, 2]` for `numeric(10,2)`.
    Precision(u32, u32),
}

impl fmt::Display for ColumnSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(len) => write!(f, "({len})"),
            Self::Precision(precision, scale) => write!(f, "({precision},{scale})"),
        }
    }
}

/// Foreign key action (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action (error if referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (same as NoAction but checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the foreign key column to NULL.
    SetNull,
    /// Set the foreign key column to its default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Parses the SQL spelling of an action, e.g. `"SET NULL"`.
    #[must_use]
    pub fn from_sql(sql: &str) -> Option<Self> {
        match sql.trim().to_ascii_uppercase().as_str() {
            "NO ACTION" => Some(Self::NoAction),
            "RESTRICT" => Some(Self::Restrict),
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            "SET DEFAULT" => Some(Self::SetDefault),
            _ => None,
        }
    }

    /// The attribute value of this action, e.g. `"set_null"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAction => "no_action",
            Self::Restrict => "restrict",
            Self::Cascade => "cascade",
            Self::SetNull => "set_null",
            Self::SetDefault => "set_default",
        }
    }
}

/// A fully normalized column.
///
/// `fixed`, `size`, `text`, `serial` and `only_time` only refine the type;
/// they are compared through the canonical type string, never on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub column_type: Option<ColumnType>,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Default value.
    pub default: Option<Value>,
    /// Collation.
    pub collate: Option<String>,
    /// Whether the column is (part of) the primary key.
    pub primary_key: bool,
    /// Name of the primary key constraint.
    pub primary_key_constraint_name: Option<String>,
    /// Referenced table, for foreign key columns.
    pub table: Option<String>,
    /// Referenced columns.
    pub key: Vec<String>,
    /// ON DELETE action.
    pub on_delete: ForeignKeyAction,
    /// ON UPDATE action.
    pub on_update: ForeignKeyAction,
    /// Whether the foreign key is deferrable.
    pub deferrable: Option<bool>,
    /// Whether the column has a UNIQUE constraint.
    pub unique: bool,
    /// Name of the unique constraint.
    pub unique_constraint_name: Option<String>,
    /// Auto-increment.
    pub serial: bool,
    /// Fixed-length string.
    pub fixed: bool,
    /// Length or precision.
    pub size: Option<ColumnSize>,
    /// Unbounded text string.
    pub text: bool,
    /// Time of day without a date part.
    pub only_time: bool,
}

/// A fully normalized index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexSpec {
    /// Indexed columns, in index order.
    pub columns: Vec<String>,
    /// Index name. An expectation without a name accepts any name.
    pub name: Option<String>,
    /// Storage method, e.g. `gin`.
    #[serde(rename = "type")]
    pub index_type: Option<String>,
    /// Whether this is a unique index.
    pub unique: bool,
    /// Partial index predicate.
    #[serde(rename = "where")]
    pub predicate: Option<String>,
}

/// A fully normalized table-level check constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintSpec {
    /// Constraint expression, compared as written.
    pub check: String,
    /// Constraint name.
    pub name: Option<String>,
}

/// The structure of one table: three ordered lists of raw specs.
///
/// This is both what a schema source reports for a live table and the
/// on-disk format of an expected schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableDescription {
    /// Column specs.
    pub columns: Vec<RawSpec>,
    /// Index specs.
    pub indexes: Vec<RawSpec>,
    /// Constraint specs.
    pub constraints: Vec<RawSpec>,
}

impl TableDescription {
    /// Creates an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a description from a JSON value such as
    /// `{"columns": [{"name": "id", "type": "Integer"}]}`.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Adds a column spec.
    #[must_use]
    pub fn column(mut self, spec: RawSpec) -> Self {
        self.columns.push(spec);
        self
    }

    /// Adds an index spec.
    #[must_use]
    pub fn index(mut self, spec: RawSpec) -> Self {
        self.indexes.push(spec);
        self
    }

    /// Adds a constraint spec.
    #[must_use]
    pub fn constraint(mut self, spec: RawSpec) -> Self {
        self.constraints.push(spec);
        self
    }

    /// Returns the raw specs of one category.
    #[must_use]
    pub fn specs(&self, category: Category) -> &[RawSpec] {
        match category {
            Category::Columns => &self.columns,
            Category::Indexes => &self.indexes,
            Category::Constraints => &self.constraints,
        }
    }

    /// Returns true if no element of any category is described.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.indexes.is_empty() && self.constraints.is_empty()
    }
}
