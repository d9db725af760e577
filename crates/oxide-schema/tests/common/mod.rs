#![allow(dead_code)]

use oxide_schema::{
    check_schema, CheckError, CheckOptions, SchemaDiffError, SqliteTypes, TableDescription,
};
use serde_json::Value;

pub fn table(value: Value) -> TableDescription {
    TableDescription::from_json(value.clone())
        .unwrap_or_else(|e| panic!("Invalid description: {value}\nError: {e}"))
}

pub fn check(actual: Value, expected: Value) -> Result<(), CheckError> {
    check_schema(
        "users",
        &table(actual),
        &table(expected),
        &SqliteTypes,
        CheckOptions::new(),
    )
}

pub fn check_diff(actual: Value, expected: Value) -> SchemaDiffError {
    match check(actual, expected) {
        Err(CheckError::SchemaDiff(diff)) => diff,
        other => panic!("Expected a schema diff, got {other:?}"),
    }
}
