//! Rendering of schema differences.
//!
//! A report has one section per category and kind that has any records:
//!
//! ```text
//! Table users has extra columns:
//!
//! 	{"name": "nickname", "type": "varchar(50)"}
//!
//! Table users has mismatched columns:
//!
//! 	actual:    {"name": "age", "type": "integer"}
//! 	expected:  {"name": "age", "type": "Integer", "nullable": false}
//! ```
//!
//! Elements are printed the way they would be declared, with every
//! default-valued attribute left out.

use std::fmt::{self, Write as _};

use serde_json::Value;

use crate::diff::{DiffKind, DiffRecord, Element};
use crate::error::SchemaDiffError;
use crate::normalize::{to_raw, Defaults};
use crate::spec::{Category, RawSpec};

impl SchemaDiffError {
    /// Renders the full report.
    #[must_use]
    pub fn render(&self) -> String {
        let mut sections = Vec::new();
        for category in Category::ALL {
            for kind in DiffKind::ALL {
                let entries: Vec<String> = self
                    .records_of(category, kind)
                    .map(|record| self.entry(record))
                    .collect();
                if entries.is_empty() {
                    continue;
                }
                let separator = if kind == DiffKind::Mismatch { "\n\n\t" } else { "\n\t" };
                sections.push(format!(
                    "{}\n\n\t{}\n",
                    header(self.table(), category, kind),
                    entries.join(separator)
                ));
            }
        }
        sections.join("\n")
    }

    fn entry(&self, record: &DiffRecord) -> String {
        let defaults = self.defaults();
        match record {
            DiffRecord::Extra(element) | DiffRecord::Missing(element) => {
                dump_element(element, defaults)
            }
            DiffRecord::Mismatch { actual, expected } => format!(
                "actual:    {}\n\texpected:  {}",
                dump_element(actual, defaults),
                dump_element(expected, defaults)
            ),
        }
    }
}

impl fmt::Display for SchemaDiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn header(table: &str, category: Category, kind: DiffKind) -> String {
    match kind {
        DiffKind::Extra => format!("Table {table} has extra {category}:"),
        DiffKind::Missing => format!("Table {table} is missing {category}:"),
        DiffKind::Mismatch => format!("Table {table} has mismatched {category}:"),
    }
}

/// Renders one element on a single line, as a developer would declare it.
///
/// Only the identity attributes and the attributes whose value differs
/// from `defaults` are printed, in the attribute order of `defaults`.
#[must_use]
pub fn dump_element(element: &Element, defaults: &Defaults) -> String {
    let full = match element {
        Element::Column(column) => to_raw(column),
        Element::Index(index) => to_raw(index),
        Element::Constraint(constraint) => to_raw(constraint),
    };
    dump_spec(&defaults.strip(element.category(), &full))
}

/// Renders an attribute map on a single line.
#[must_use]
pub fn dump_spec(spec: &RawSpec) -> String {
    let mut out = String::new();
    write_map(&mut out, spec);
    out
}

fn write_map(out: &mut String, map: &RawSpec) {
    out.push('{');
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_string(out, key);
        out.push_str(": ");
        write_value(out, value);
    }
    out.push('}');
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => write_map(out, map),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::String(text) => write_string(out, text),
        scalar => {
            let _ = write!(out, "{scalar}");
        }
    }
}

fn write_string(out: &mut String, text: &str) {
    // Value's Display produces a quoted, escaped JSON string.
    let _ = write!(out, "{}", Value::from(text));
}
