//! # oxide-schema
//!
//! Checks that a live database table matches the shape a developer
//! declared for it.
//!
//! Both sides are given as a [`TableDescription`]: three ordered lists of
//! attribute maps, one for columns, one for indexes and one for table-level
//! constraints. Each element is normalized against a table of defaults, so
//! an expectation only needs to spell out what differs from them. The
//! elements of each category are then paired up and every disagreement is
//! recorded as a [`DiffRecord`]:
//!
//! - **extra**: present in the live table, not expected
//! - **missing**: expected, absent from the live table
//! - **mismatch**: present on both sides with different attributes
//!
//! Column types are compared through a [`TypeCanonicalizer`], which maps
//! every spelling of a type (`"Integer"`, `"INT"`, `"int4"`) onto the one
//! literal the engine uses.
//!
//! ## Checking a table
//!
//! ```rust
//! use oxide_schema::prelude::*;
//! use serde_json::json;
//!
//! let actual = TableDescription::from_json(json!({
//!     "columns": [
//!         {"name": "id", "type": "integer", "nullable": false, "primary_key": true},
//!         {"name": "nickname", "type": "varchar(50)"},
//!     ]
//! }))
//! .unwrap();
//! let expected = TableDescription::from_json(json!({
//!     "columns": [
//!         {"name": "id", "type": "Integer", "nullable": false, "primary_key": true},
//!     ]
//! }))
//! .unwrap();
//!
//! let error = check_schema("users", &actual, &expected, &SqliteTypes, CheckOptions::new())
//!     .unwrap_err();
//! let diff = error.as_schema_diff().unwrap();
//!
//! assert_eq!(diff.records().len(), 1);
//! assert!(diff.to_string().starts_with("Table users has extra columns:"));
//! ```
//!
//! The rendered report is only built when the error is displayed; callers
//! that need structured access should inspect [`SchemaDiffError::records`].
//!
//! This crate performs no I/O. Live descriptions come from a
//! [`SchemaSource`], such as the SQLite introspector in
//! `oxide-schema-sqlite` or the in-memory [`StaticSource`].

pub mod dialect;
pub mod diff;
pub mod error;
mod matcher;
pub mod normalize;
pub mod report;
pub mod source;
pub mod spec;

pub use dialect::{PostgresTypes, SqliteTypes, TypeCanonicalizer};
pub use diff::{check_schema, CheckOptions, DiffKind, DiffRecord, Element, SchemaChecker, Side};
pub use error::{
    CheckError, InvalidAttributeError, NormalizeError, Result, SchemaDiffError, TableNotFoundError,
};
pub use normalize::{Defaults, Normalizer};
pub use report::{dump_element, dump_spec};
pub use source::{check_table, SchemaSource, StaticSource};
pub use spec::{
    Category, ColumnSize, ColumnSpec, ColumnType, ConstraintSpec, ForeignKeyAction, GenericType,
    IndexSpec, RawSpec, TableDescription,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{PostgresTypes, SqliteTypes, TypeCanonicalizer};
    pub use crate::diff::{check_schema, CheckOptions, DiffKind, DiffRecord, SchemaChecker};
    pub use crate::error::{CheckError, Result, SchemaDiffError};
    pub use crate::source::{check_table, SchemaSource, StaticSource};
    pub use crate::spec::{Category, TableDescription};
}
