//! Live table descriptions read from a SQLite database.
//!
//! Columns come from `pragma_table_info`, indexes from `pragma_index_list`
//! and `pragma_index_info`, foreign keys from `pragma_foreign_key_list`.
//! Everything else is recovered from the stored DDL (see [`crate::ddl`]).
//!
//! SQLite implements a `UNIQUE` column constraint as an automatic index.
//! Such an index over a single column is reported as the column's `unique`
//! attribute instead of as an index, and primary key indexes are not
//! reported at all.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn};

use oxide_schema::{
    CheckError, CheckOptions, ForeignKeyAction, Normalizer, RawSpec, SchemaChecker, SqliteTypes,
    StaticSource, TableDescription, TableNotFoundError,
};

use crate::ddl;
use crate::error::{Result, SqliteCheckError};

/// Row of `pragma_table_info`: name, type, notnull, dflt_value, pk.
type ColumnRow = (String, String, i64, Option<String>, i64);

/// Row of `pragma_index_list`: name, unique, origin, partial.
type IndexRow = (String, i64, String, i64);

/// Row of `pragma_foreign_key_list`: id, table, from, to, on_update,
/// on_delete.
type ForeignKeyRow = (i64, String, String, Option<String>, String, String);

/// Reads table descriptions from a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteIntrospector {
    pool: SqlitePool,
}

impl SqliteIntrospector {
    /// Creates an introspector over an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Lists user tables, sorted by name.
    pub async fn tables(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Describes one table. Table names compare case-insensitively, as
    /// SQLite identifiers do.
    pub async fn describe_table(&self, table: &str) -> Result<TableDescription> {
        let row: Option<(String, Option<String>)> = sqlx::query_as(
            "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE",
        )
        .bind(table)
        .fetch_optional(&self.pool)
        .await?;
        let Some((stored_name, create_sql)) = row else {
            return Err(TableNotFoundError::new(table).into());
        };
        let create_sql = create_sql.unwrap_or_default();

        let mut columns = self.columns(&stored_name, &create_sql).await?;
        let indexes = self.indexes(&stored_name, &mut columns).await?;
        self.foreign_keys(&stored_name, &mut columns).await?;

        let constraints: Vec<RawSpec> = ddl::check_constraints(&create_sql)
            .into_iter()
            .map(|check| raw(json!({"check": check.body, "name": check.name})))
            .collect();

        debug!(
            table = %table,
            columns = columns.len(),
            indexes = indexes.len(),
            constraints = constraints.len(),
            "Described table"
        );

        Ok(TableDescription {
            columns,
            indexes,
            constraints,
        })
    }

    /// Describes every user table.
    pub async fn snapshot(&self) -> Result<StaticSource> {
        let mut source = StaticSource::new(SqliteTypes);
        for table in self.tables().await? {
            let description = self.describe_table(&table).await?;
            source.insert(table, description);
        }
        Ok(source)
    }

    /// Describes one table in compact form: each element reduced to its
    /// identity and non-default attributes, ready to be saved as an
    /// expected description.
    pub async fn dump_table(&self, table: &str) -> std::result::Result<TableDescription, SqliteCheckError> {
        let description = self.describe_table(table).await?;
        let compact = Normalizer::default()
            .compact_table(&description)
            .map_err(CheckError::from)?;
        Ok(compact)
    }

    /// Checks a live table against its expected description.
    pub async fn check_table(
        &self,
        table: &str,
        expected: &TableDescription,
        options: CheckOptions,
    ) -> std::result::Result<(), SqliteCheckError> {
        if options.disabled {
            debug!(table = %table, "Schema check disabled");
            return Ok(());
        }
        let actual = self.describe_table(table).await?;
        SchemaChecker::new(SqliteTypes).check(table, &actual, expected, options)?;
        debug!(table = %table, "Schema matches");
        Ok(())
    }

    async fn columns(&self, table: &str, create_sql: &str) -> Result<Vec<RawSpec>> {
        let rows: Vec<ColumnRow> = sqlx::query_as(
            r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid"#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        let pk_count = rows.iter().filter(|(.., pk)| *pk > 0).count();
        let collations = ddl::column_collations(create_sql);

        let columns = rows
            .into_iter()
            .map(|(name, ty, notnull, default, pk)| {
                // INTEGER PRIMARY KEY aliases the rowid, which is never NULL.
                let rowid = pk > 0 && pk_count == 1 && ty.eq_ignore_ascii_case("INTEGER");

                let mut spec = RawSpec::new();
                spec.insert("name".to_string(), json!(name));
                if !ty.is_empty() {
                    spec.insert("type".to_string(), json!(ty));
                }
                spec.insert("nullable".to_string(), json!(notnull == 0 && !rowid));
                if let Some(default) = default {
                    spec.insert("default".to_string(), ddl::parse_default(&default));
                }
                if let Some((_, collation)) = collations.iter().find(|(column, _)| *column == name)
                {
                    spec.insert("collate".to_string(), json!(collation));
                }
                spec.insert("primary_key".to_string(), json!(pk > 0));
                if rowid && ddl::has_autoincrement(create_sql, &name) {
                    spec.insert("serial".to_string(), json!(true));
                }
                spec
            })
            .collect();
        Ok(columns)
    }

    async fn indexes(&self, table: &str, columns: &mut [RawSpec]) -> Result<Vec<RawSpec>> {
        let rows: Vec<IndexRow> = sqlx::query_as(
            r#"SELECT name, "unique", origin, partial FROM pragma_index_list(?) ORDER BY name"#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        let mut indexes = Vec::new();
        for (name, unique, origin, partial) in rows {
            if origin == "pk" {
                continue;
            }

            let index_columns: Vec<(Option<String>,)> =
                sqlx::query_as("SELECT name FROM pragma_index_info(?) ORDER BY seqno")
                    .bind(&name)
                    .fetch_all(&self.pool)
                    .await?;
            let Some(index_columns) = index_columns
                .into_iter()
                .map(|(column,)| column)
                .collect::<Option<Vec<String>>>()
            else {
                warn!(table = %table, index = %name, "Skipping expression index");
                continue;
            };

            if origin == "u" {
                if let [column] = index_columns.as_slice() {
                    if let Some(spec) = column_mut(columns, column) {
                        spec.insert("unique".to_string(), json!(true));
                        continue;
                    }
                }
                indexes.push(raw(json!({"columns": index_columns, "unique": true})));
                continue;
            }

            let predicate = if partial == 0 {
                None
            } else {
                self.index_sql(&name)
                    .await?
                    .as_deref()
                    .and_then(ddl::index_predicate)
            };
            indexes.push(raw(json!({
                "columns": index_columns,
                "name": name,
                "unique": unique != 0,
                "where": predicate,
            })));
        }
        Ok(indexes)
    }

    async fn index_sql(&self, index: &str) -> Result<Option<String>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT sql FROM sqlite_master WHERE type = 'index' AND name = ?")
                .bind(index)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.and_then(|(sql,)| sql))
    }

    async fn foreign_keys(&self, table: &str, columns: &mut [RawSpec]) -> Result<()> {
        let rows: Vec<ForeignKeyRow> = sqlx::query_as(
            r#"SELECT id, "table", "from", "to", on_update, on_delete FROM pragma_foreign_key_list(?) ORDER BY id, seq"#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        let mut groups: BTreeMap<i64, Vec<ForeignKeyRow>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.0).or_default().push(row);
        }

        for group in groups.into_values() {
            let [(_, parent, from, to, on_update, on_delete)] = group.as_slice() else {
                let parent = group.first().map(|row| row.1.as_str()).unwrap_or_default();
                warn!(table = %table, references = %parent, "Skipping multi-column foreign key");
                continue;
            };

            let key = match to {
                Some(to) => vec![to.clone()],
                None => self.primary_key(parent).await?,
            };
            let Some(spec) = column_mut(columns, from) else {
                continue;
            };
            spec.insert("table".to_string(), json!(parent));
            if !key.is_empty() {
                spec.insert("key".to_string(), json!(key));
            }
            for (attribute, action) in [("on_update", on_update), ("on_delete", on_delete)] {
                match ForeignKeyAction::from_sql(action) {
                    Some(action) => {
                        spec.insert(attribute.to_string(), json!(action.as_str()));
                    }
                    None => warn!(table = %table, column = %from, action = %action, "Unknown foreign key action"),
                }
            }
        }
        Ok(())
    }

    async fn primary_key(&self, table: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM pragma_table_info(?) WHERE pk > 0 ORDER BY pk")
                .bind(table)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

fn raw(value: Value) -> RawSpec {
    match value {
        Value::Object(map) => map,
        _ => RawSpec::new(),
    }
}

fn column_mut<'a>(columns: &'a mut [RawSpec], name: &str) -> Option<&'a mut RawSpec> {
    columns
        .iter_mut()
        .find(|spec| spec.get("name").and_then(Value::as_str) == Some(name))
}
