//! Facts SQLite only keeps in the stored `CREATE` statements.
//!
//! The pragmas report columns, indexes and foreign keys, but not table
//! level `CHECK` constraints, partial index predicates, collations or
//! `AUTOINCREMENT`. Those are recovered from `sqlite_master.sql`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static CHECK_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)^(?:CONSTRAINT\s+("[^"]+"|`[^`]+`|\[[^\]]+\]|\w+)\s+)?CHECK\s*\("#)
        .expect("Invalid CHECK constraint regex")
});

static INDEX_WHERE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\)\s*WHERE\s+(.+?)\s*;?\s*$").expect("Invalid index predicate regex")
});

static COLLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bCOLLATE\s+("[^"]+"|`[^`]+`|\[[^\]]+\]|\w+)"#)
        .expect("Invalid collation regex")
});

static AUTOINCREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bAUTOINCREMENT\b").expect("Invalid autoincrement regex"));

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?([eE][+-]?\d+)?$").expect("Invalid number regex"));

/// Words that start a table constraint rather than a column definition.
const TABLE_CONSTRAINT_KEYWORDS: &[&str] = &["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN"];

/// A table-level `CHECK` constraint found in a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDefinition {
    /// Constraint name, if declared with `CONSTRAINT name`.
    pub name: Option<String>,
    /// The expression between the parentheses, trimmed.
    pub body: String,
}

/// Tracks whether a scan is inside a string literal or a quoted
/// identifier. SQLite quotes with `'`, `"`, backticks and `[...]`;
/// doubled quotes inside a literal close and reopen it.
#[derive(Debug, Default)]
struct Quoting(Option<char>);

impl Quoting {
    /// Feeds the next character and returns true if it lies outside any
    /// quoting. Quote characters themselves count as inside.
    fn outside(&mut self, c: char) -> bool {
        match self.0 {
            Some(open) => {
                if c == closing_quote(open) {
                    self.0 = None;
                }
                false
            }
            None if matches!(c, '\'' | '"' | '`' | '[') => {
                self.0 = Some(c);
                false
            }
            None => true,
        }
    }
}

const fn closing_quote(open: char) -> char {
    if open == '[' {
        ']'
    } else {
        open
    }
}

/// `text` with every quoted character replaced by a space, so keyword
/// searches cannot match inside literals or identifiers.
fn mask_quoted(text: &str) -> String {
    let mut quoting = Quoting::default();
    text.chars()
        .map(|c| if quoting.outside(c) { c } else { ' ' })
        .collect()
}

/// Splits the parenthesized body of a `CREATE TABLE` statement into its
/// top-level column and constraint definitions.
#[must_use]
pub fn definitions(create_sql: &str) -> Vec<&str> {
    let Some(open) = create_sql.find('(') else {
        return Vec::new();
    };

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoting = Quoting::default();
    let mut start = open + 1;

    for (i, c) in create_sql.char_indices().skip_while(|(i, _)| *i <= open) {
        if !quoting.outside(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                parts.push(create_sql[start..i].trim());
                break;
            }
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(create_sql[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.retain(|part| !part.is_empty());
    parts
}

/// Returns true if `definition` declares a column rather than a table
/// constraint.
fn is_column_definition(definition: &str) -> bool {
    let first = definition
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    !TABLE_CONSTRAINT_KEYWORDS.contains(&first.as_str())
}

/// The unquoted name declared by a column definition.
fn column_name(definition: &str) -> Option<String> {
    definition.split_whitespace().next().map(unquote)
}

/// The text inside the parenthesis opening at byte `open`.
fn balanced(text: &str, open: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut quoting = Quoting::default();
    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open) {
        if !quoting.outside(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return text.get(open + 1..i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts the table-level `CHECK` constraints of a `CREATE TABLE`
/// statement, in declaration order. Column-level checks are not included.
#[must_use]
pub fn check_constraints(create_sql: &str) -> Vec<CheckDefinition> {
    definitions(create_sql)
        .into_iter()
        .filter_map(|definition| {
            let captures = CHECK_DEFINITION.captures(definition)?;
            let whole = captures.get(0)?;
            let body = balanced(definition, whole.end() - 1)?;
            Some(CheckDefinition {
                name: captures.get(1).map(|m| unquote(m.as_str())),
                body: body.trim().to_string(),
            })
        })
        .collect()
}

/// Extracts the `WHERE` predicate of a partial `CREATE INDEX` statement.
#[must_use]
pub fn index_predicate(index_sql: &str) -> Option<String> {
    INDEX_WHERE
        .captures(index_sql)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns the declared collation of each column that has one.
#[must_use]
pub fn column_collations(create_sql: &str) -> Vec<(String, String)> {
    definitions(create_sql)
        .into_iter()
        .filter(|definition| is_column_definition(definition))
        .filter_map(|definition| {
            let name = column_name(definition)?;
            let collation = COLLATE.captures(definition)?.get(1)?;
            Some((name, unquote(collation.as_str())))
        })
        .collect()
}

/// Returns true if the definition of `column` carries `AUTOINCREMENT`.
///
/// Only the column's own definition is searched, outside of string
/// literals and quoted identifiers. Column names compare case-insensitively.
#[must_use]
pub fn has_autoincrement(create_sql: &str, column: &str) -> bool {
    definitions(create_sql)
        .into_iter()
        .filter(|definition| is_column_definition(definition))
        .find(|definition| {
            column_name(definition).is_some_and(|name| name.eq_ignore_ascii_case(column))
        })
        .is_some_and(|definition| AUTOINCREMENT.is_match(&mask_quoted(definition)))
}

/// Strips identifier quoting.
#[must_use]
pub fn unquote(identifier: &str) -> String {
    let trimmed = identifier.trim();
    let inner = ['"', '`']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .or_else(|| {
            trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
        });
    inner.unwrap_or(trimmed).to_string()
}

/// Converts a `dflt_value` as reported by `pragma_table_info` into the
/// value an expectation would declare: numbers and string literals become
/// JSON numbers and strings, `NULL` becomes null, and any other expression
/// (`CURRENT_TIMESTAMP`, `(datetime('now'))`) is kept as SQL text.
#[must_use]
pub fn parse_default(sql: &str) -> Value {
    let sql = sql.trim();
    if sql.eq_ignore_ascii_case("NULL") {
        return Value::Null;
    }
    if let Some(literal) = sql.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return Value::String(literal.replace("''", "'"));
    }
    if NUMERIC.is_match(sql) {
        if let Ok(integer) = sql.parse::<i64>() {
            return Value::from(integer);
        }
        if let Some(number) = sql.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(sql.to_string())
}
