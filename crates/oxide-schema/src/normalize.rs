//! Spec normalization.
//!
//! Every category has a fixed, ordered set of attributes, each with a
//! documented default. [`Defaults`] holds those tables; the [`Normalizer`]
//! overlays a raw spec onto them and deserializes the result into the
//! category's typed spec, so two specs become directly comparable. Unknown
//! attribute names are rejected, all of them at once.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::{InvalidAttributeError, NormalizeError};
use crate::spec::{Category, ColumnSpec, ConstraintSpec, IndexSpec, RawSpec, TableDescription};

/// Default attribute values, one ordered map per category.
///
/// The key set of each map is the complete set of recognized attributes for
/// that category, and its key order is the order attributes are rendered in.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    columns: RawSpec,
    indexes: RawSpec,
    constraints: RawSpec,
}

impl Defaults {
    /// The standard defaults.
    #[must_use]
    pub fn standard() -> Self {
        let columns = json!({
            "name": null,
            "type": null,
            "nullable": true,
            "default": null,
            "collate": null,
            "primary_key": false,
            "primary_key_constraint_name": null,
            "table": null,
            "key": ["id"],
            "on_delete": "no_action",
            "on_update": "no_action",
            "deferrable": null,
            "unique": false,
            "unique_constraint_name": null,
            "serial": false,
            "fixed": false,
            "size": null,
            "text": false,
            "only_time": false,
        });
        let indexes = json!({
            "columns": null,
            "name": null,
            "type": null,
            "unique": false,
            "where": null,
        });
        let constraints = json!({
            "check": null,
            "name": null,
        });

        Self {
            columns: into_map(columns),
            indexes: into_map(indexes),
            constraints: into_map(constraints),
        }
    }

    /// Replaces the default of an existing attribute.
    ///
    /// Unknown attributes are ignored: the attribute set of a category is
    /// fixed by its typed spec.
    #[must_use]
    pub fn with_default(mut self, category: Category, attribute: &str, value: Value) -> Self {
        if let Some(slot) = self.map_mut(category).get_mut(attribute) {
            *slot = value;
        }
        self
    }

    /// The default map of one category.
    #[must_use]
    pub const fn for_category(&self, category: Category) -> &RawSpec {
        match category {
            Category::Columns => &self.columns,
            Category::Indexes => &self.indexes,
            Category::Constraints => &self.constraints,
        }
    }

    /// Recognized attribute names of one category, in rendering order.
    pub fn attributes(&self, category: Category) -> impl Iterator<Item = &str> + '_ {
        self.for_category(category).keys().map(String::as_str)
    }

    /// Keeps only the identity attributes and the attributes whose value
    /// differs from the default, in rendering order.
    #[must_use]
    pub fn strip(&self, category: Category, full: &RawSpec) -> RawSpec {
        let identity = identity_attributes(category);
        self.for_category(category)
            .iter()
            .filter_map(|(key, default)| {
                let value = full.get(key).unwrap_or(&Value::Null);
                let keep = if identity.contains(&key.as_str()) {
                    !value.is_null()
                } else {
                    value != default
                };
                keep.then(|| (key.clone(), value.clone()))
            })
            .collect()
    }

    fn map_mut(&mut self, category: Category) -> &mut RawSpec {
        match category {
            Category::Columns => &mut self.columns,
            Category::Indexes => &mut self.indexes,
            Category::Constraints => &mut self.constraints,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// Attributes that identify an element and are always rendered.
#[must_use]
pub const fn identity_attributes(category: Category) -> &'static [&'static str] {
    match category {
        Category::Columns => &["name", "type"],
        Category::Indexes => &["columns"],
        Category::Constraints => &["check"],
    }
}

/// The attribute an element cannot be described without.
const fn required_attribute(category: Category) -> &'static str {
    match category {
        Category::Columns => "name",
        Category::Indexes => "columns",
        Category::Constraints => "check",
    }
}

fn into_map(value: Value) -> RawSpec {
    match value {
        Value::Object(map) => map,
        _ => RawSpec::new(),
    }
}

/// Serializes a typed spec back into its full attribute map.
pub(crate) fn to_raw<T: Serialize>(spec: &T) -> RawSpec {
    serde_json::to_value(spec).map_or_else(|_| RawSpec::new(), into_map)
}

/// Human-readable identity of a raw spec, for error messages.
#[must_use]
pub fn describe(category: Category, raw: &RawSpec) -> String {
    let pick = |key: &str| raw.get(key).filter(|value| !value.is_null());
    let identity = match category {
        Category::Columns => pick("name"),
        Category::Indexes => pick("name").or_else(|| pick("columns")),
        Category::Constraints => pick("name").or_else(|| pick("check")),
    };
    match identity {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => {
            let names: Vec<String> = items
                .iter()
                .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
                .collect();
            format!("[{}]", names.join(", "))
        }
        Some(other) => other.to_string(),
        None => "<unnamed>".to_string(),
    }
}

/// Fills in defaults and validates attribute names.
#[derive(Debug, Clone)]
pub struct Normalizer {
    defaults: Arc<Defaults>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(Defaults::standard()))
    }
}

impl Normalizer {
    /// Creates a normalizer over the given defaults.
    #[must_use]
    pub const fn new(defaults: Arc<Defaults>) -> Self {
        Self { defaults }
    }

    /// The defaults this normalizer fills in.
    #[must_use]
    pub const fn defaults(&self) -> &Arc<Defaults> {
        &self.defaults
    }

    /// Normalizes a raw column spec.
    pub fn column(&self, raw: &RawSpec) -> Result<ColumnSpec, NormalizeError> {
        self.typed(Category::Columns, raw)
    }

    /// Normalizes a raw index spec.
    pub fn index(&self, raw: &RawSpec) -> Result<IndexSpec, NormalizeError> {
        let index: IndexSpec = self.typed(Category::Indexes, raw)?;
        if index.columns.is_empty() {
            return Err(NormalizeError::InvalidValue {
                category: Category::Indexes,
                element: describe(Category::Indexes, raw),
                message: "an index must cover at least one column".to_string(),
            });
        }
        Ok(index)
    }

    /// Normalizes a raw constraint spec.
    pub fn constraint(&self, raw: &RawSpec) -> Result<ConstraintSpec, NormalizeError> {
        self.typed(Category::Constraints, raw)
    }

    /// Returns the raw spec reduced to its identity and non-default
    /// attributes, in rendering order.
    pub fn compact(&self, category: Category, raw: &RawSpec) -> Result<RawSpec, NormalizeError> {
        let merged = self.merged(category, raw)?;
        Ok(self.defaults.strip(category, &merged))
    }

    /// Compacts every element of a table description.
    pub fn compact_table(&self, table: &TableDescription) -> Result<TableDescription, NormalizeError> {
        let compact_all = |category: Category| {
            table
                .specs(category)
                .iter()
                .map(|raw| self.compact(category, raw))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(TableDescription {
            columns: compact_all(Category::Columns)?,
            indexes: compact_all(Category::Indexes)?,
            constraints: compact_all(Category::Constraints)?,
        })
    }

    /// Overlays `raw` onto the category defaults.
    ///
    /// The result always has exactly the default key set, so two merged
    /// specs of one category never differ in their attribute names.
    fn merged(&self, category: Category, raw: &RawSpec) -> Result<RawSpec, NormalizeError> {
        let defaults = self.defaults.for_category(category);

        let unknown: Vec<String> = raw
            .keys()
            .filter(|key| !defaults.contains_key(key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(InvalidAttributeError {
                category,
                element: describe(category, raw),
                keys: unknown,
            }
            .into());
        }

        let mut merged = defaults.clone();
        for (key, value) in raw {
            if !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }

        let required = required_attribute(category);
        if merged.get(required).is_none_or(Value::is_null) {
            return Err(NormalizeError::MissingAttribute {
                category,
                element: describe(category, raw),
                attribute: required,
            });
        }

        Ok(merged)
    }

    fn typed<T: DeserializeOwned>(&self, category: Category, raw: &RawSpec) -> Result<T, NormalizeError> {
        let merged = self.merged(category, raw)?;
        serde_json::from_value(Value::Object(merged)).map_err(|error| NormalizeError::InvalidValue {
            category,
            element: describe(category, raw),
            message: error.to_string(),
        })
    }
}
