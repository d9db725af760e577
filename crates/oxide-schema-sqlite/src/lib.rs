//! # oxide-schema-sqlite
//!
//! Reads live table descriptions from SQLite and checks them against
//! expected descriptions with [`oxide_schema`].
//!
//! ```rust,ignore
//! use oxide_schema::TableDescription;
//! use oxide_schema_sqlite::{options_from_env, SqliteIntrospector};
//!
//! let introspector = SqliteIntrospector::connect("sqlite:app.db").await?;
//! let expected: TableDescription = serde_json::from_str(&std::fs::read_to_string("users.json")?)?;
//!
//! // Fails with the rendered report if the live table differs.
//! introspector.check_table("users", &expected, options_from_env()).await?;
//! ```
//!
//! Setting `DISABLE_SCHEMA_CHECK=1` turns every check made with
//! [`options_from_env`] into a no-op.

pub mod ddl;
pub mod error;
pub mod introspect;

pub use error::{IntrospectError, SqliteCheckError};
pub use introspect::SqliteIntrospector;

use oxide_schema::CheckOptions;

/// Environment variable that disables schema checks.
pub const DISABLE_ENV_KEY: &str = "DISABLE_SCHEMA_CHECK";

/// Returns true if `value` turns schema checks off.
///
/// Any value other than an empty string, `0`, `false`, `no` or `off`
/// (ignoring case) counts.
#[must_use]
pub fn is_disable_value(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value == "0"
        || ["false", "no", "off"]
            .iter()
            .any(|falsey| value.eq_ignore_ascii_case(falsey)))
}

/// Returns true if schema checks are disabled through the environment.
#[must_use]
pub fn disabled_by_env() -> bool {
    std::env::var(DISABLE_ENV_KEY).is_ok_and(|value| is_disable_value(&value))
}

/// Default check options, disabled if the environment says so.
#[must_use]
pub fn options_from_env() -> CheckOptions {
    CheckOptions::new().disabled(disabled_by_env())
}

/// Hint appended to a failed check's report.
#[must_use]
pub fn disable_hint() -> String {
    format!("You may disable schema checks by setting {DISABLE_ENV_KEY}=1.")
}
