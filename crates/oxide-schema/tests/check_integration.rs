//! Integration tests for the full check pipeline.
//!
//! Each test builds an actual and an expected table description from JSON,
//! runs `check_schema` and inspects the resulting records.

mod common;

use common::{check, check_diff, table};
use oxide_schema::{
    check_schema, Category, CheckError, CheckOptions, Defaults, DiffKind, DiffRecord, Element,
    NormalizeError, PostgresTypes, SchemaChecker, SqliteTypes,
};
use serde_json::json;

// =============================================================================
// Perfect matches
// =============================================================================

#[test]
fn simple_match_succeeds() {
    let description = json!({
        "columns": [{"name": "x", "type": "Int", "nullable": false}]
    });
    assert!(check(description.clone(), description).is_ok());
}

#[test]
fn self_comparison_is_always_perfect() {
    let description = json!({
        "columns": [
            {"name": "id", "type": "Integer", "primary_key": true, "nullable": false, "serial": true},
            {"name": "org_id", "type": "BigInt", "table": "orgs", "on_delete": "cascade"},
            {"name": "price", "type": "Decimal", "size": [10, 2], "default": 0},
            {"name": "code", "type": "String", "fixed": true, "size": 3, "unique": true},
        ],
        "indexes": [
            {"columns": ["org_id", "code"], "unique": true, "name": "idx_org_code"},
            {"columns": ["price"], "where": "price > 0"},
        ],
        "constraints": [{"check": "price >= 0", "name": "non_negative_price"}],
    });
    assert!(check(description.clone(), description).is_ok());
}

#[test]
fn empty_descriptions_match() {
    assert!(check(json!({}), json!({})).is_ok());
}

// =============================================================================
// Extra and missing elements
// =============================================================================

#[test]
fn extra_column() {
    let diff = check_diff(
        json!({"columns": [{"name": "name", "type": "varchar(255)"}]}),
        json!({}),
    );

    assert_eq!(diff.records().len(), 1);
    let DiffRecord::Extra(Element::Column(column)) = &diff.records()[0] else {
        panic!("Expected an extra column, got {:?}", diff.records());
    };
    assert_eq!(column.name, "name");
}

#[test]
fn missing_column() {
    let diff = check_diff(
        json!({"columns": [{"name": "id", "type": "Integer"}]}),
        json!({"columns": [
            {"name": "id", "type": "Integer"},
            {"name": "age", "type": "Integer"},
        ]}),
    );

    assert_eq!(diff.records().len(), 1);
    let DiffRecord::Missing(Element::Column(column)) = &diff.records()[0] else {
        panic!("Expected a missing column, got {:?}", diff.records());
    };
    assert_eq!(column.name, "age");
}

#[test]
fn disjoint_lists_are_all_extra_or_missing() {
    let diff = check_diff(
        json!({
            "columns": [{"name": "a"}, {"name": "b"}],
            "indexes": [{"columns": ["a"], "name": "idx_a"}],
            "constraints": [{"check": "a > 0"}],
        }),
        json!({
            "columns": [{"name": "c"}, {"name": "d"}, {"name": "e"}],
            "indexes": [
                {"columns": ["c"], "name": "idx_c"},
                {"columns": ["d"], "name": "idx_d"},
            ],
        }),
    );

    let count = |kind: DiffKind| diff.records().iter().filter(|r| r.kind() == kind).count();
    assert_eq!(count(DiffKind::Extra), 4);
    assert_eq!(count(DiffKind::Missing), 5);
    assert_eq!(count(DiffKind::Mismatch), 0);
}

#[test]
fn records_ordered_by_category_then_expected_then_actual() {
    let diff = check_diff(
        json!({
            "columns": [{"name": "z"}, {"name": "b", "nullable": false}],
            "indexes": [{"columns": ["z"], "name": "idx_z"}],
        }),
        json!({
            "columns": [{"name": "a"}, {"name": "b"}],
            "indexes": [{"columns": ["a"], "name": "idx_a"}],
        }),
    );

    let summary: Vec<(Category, DiffKind, String)> = diff
        .records()
        .iter()
        .map(|record| {
            let element = match record {
                DiffRecord::Extra(e) | DiffRecord::Missing(e) => e,
                DiffRecord::Mismatch { expected, .. } => expected,
            };
            (record.category(), record.kind(), element.identity())
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (Category::Columns, DiffKind::Missing, "a".to_string()),
            (Category::Columns, DiffKind::Mismatch, "b".to_string()),
            (Category::Columns, DiffKind::Extra, "z".to_string()),
            (Category::Indexes, DiffKind::Missing, "idx_a".to_string()),
            (Category::Indexes, DiffKind::Extra, "idx_z".to_string()),
        ]
    );
}

#[test]
fn repeated_checks_produce_identical_records() {
    let actual = json!({
        "columns": [{"name": "a", "type": "text"}, {"name": "b"}, {"name": "c"}],
        "constraints": [{"check": "a <> ''"}],
    });
    let expected = json!({
        "columns": [{"name": "c", "nullable": false}, {"name": "d"}],
        "constraints": [{"check": "b > 0"}],
    });

    let first = check_diff(actual.clone(), expected.clone());
    let second = check_diff(actual, expected);
    assert_eq!(first.records(), second.records());
}

// =============================================================================
// Type equivalence
// =============================================================================

#[test]
fn type_alias_equivalence() {
    assert!(check(
        json!({"columns": [{"name": "id", "type": "integer"}]}),
        json!({"columns": [{"name": "id", "type": "Integer"}]}),
    )
    .is_ok());
    assert!(check(
        json!({"columns": [{"name": "id", "type": "INTEGER"}]}),
        json!({"columns": [{"name": "id", "type": "integer"}]}),
    )
    .is_ok());
}

#[test]
fn postgres_aliases_are_equivalent() {
    let actual = table(json!({"columns": [
        {"name": "id", "type": "int4"},
        {"name": "title", "type": "character varying(120)"},
        {"name": "flag", "type": "bool"},
    ]}));
    let expected = table(json!({"columns": [
        {"name": "id", "type": "Integer"},
        {"name": "title", "type": "String", "size": 120},
        {"name": "flag", "type": "Boolean"},
    ]}));
    assert!(check_schema("posts", &actual, &expected, &PostgresTypes, CheckOptions::new()).is_ok());
}

#[test]
fn different_types_mismatch() {
    let diff = check_diff(
        json!({"columns": [{"name": "age", "type": "text"}]}),
        json!({"columns": [{"name": "age", "type": "Integer"}]}),
    );
    assert_eq!(diff.records().len(), 1);
    assert_eq!(diff.records()[0].kind(), DiffKind::Mismatch);
}

// =============================================================================
// Indexes
// =============================================================================

#[test]
fn index_loose_match_is_one_mismatch() {
    let diff = check_diff(
        json!({"indexes": [{"columns": ["name"], "name": "idx_a", "unique": false}]}),
        json!({"indexes": [{"columns": ["name"], "unique": true}]}),
    );

    assert_eq!(diff.records().len(), 1);
    let DiffRecord::Mismatch {
        actual: Element::Index(actual),
        expected: Element::Index(expected),
    } = &diff.records()[0]
    else {
        panic!("Expected an index mismatch, got {:?}", diff.records());
    };
    assert_eq!(actual.name.as_deref(), Some("idx_a"));
    assert!(expected.unique);
}

#[test]
fn index_matched_by_name_with_other_columns() {
    let diff = check_diff(
        json!({"indexes": [{"columns": ["a"], "name": "idx_x"}]}),
        json!({"indexes": [{"columns": ["b"], "name": "idx_x"}]}),
    );
    assert_eq!(diff.records().len(), 1);
    assert_eq!(diff.records()[0].kind(), DiffKind::Mismatch);
}

#[test]
fn unnamed_indexes_on_different_columns_are_one_mismatch() {
    let diff = check_diff(
        json!({"indexes": [{"columns": ["a"]}]}),
        json!({"indexes": [{"columns": ["b"]}]}),
    );

    assert_eq!(diff.records().len(), 1);
    let DiffRecord::Mismatch {
        actual: Element::Index(actual),
        expected: Element::Index(expected),
    } = &diff.records()[0]
    else {
        panic!("Expected an index mismatch, got {:?}", diff.records());
    };
    assert_eq!(actual.columns, vec!["a"]);
    assert_eq!(expected.columns, vec!["b"]);
}

#[test]
fn related_index_tie_break_takes_first_actual() {
    // i1 shares the column list and idx_x shares the name; the earlier one
    // in actual order is paired, the other is left over.
    let diff = check_diff(
        json!({"indexes": [
            {"columns": ["b"], "name": "i1"},
            {"columns": ["a"], "name": "idx_x"},
        ]}),
        json!({"indexes": [{"columns": ["b"], "name": "idx_x", "unique": true}]}),
    );

    assert_eq!(diff.records().len(), 2);
    let DiffRecord::Mismatch {
        actual: Element::Index(paired),
        expected: Element::Index(expected),
    } = &diff.records()[0]
    else {
        panic!("Expected an index mismatch first, got {:?}", diff.records());
    };
    assert_eq!(paired.name.as_deref(), Some("i1"));
    assert_eq!(expected.name.as_deref(), Some("idx_x"));

    let DiffRecord::Extra(Element::Index(extra)) = &diff.records()[1] else {
        panic!("Expected an extra index, got {:?}", diff.records());
    };
    assert_eq!(extra.name.as_deref(), Some("idx_x"));
    assert_eq!(extra.columns, vec!["a"]);
}

#[test]
fn unnamed_expected_index_ignores_actual_name() {
    assert!(check(
        json!({"indexes": [{"columns": ["email"], "name": "sqlite_autoindex_users_1"}]}),
        json!({"indexes": [{"columns": ["email"]}]}),
    )
    .is_ok());
}

#[test]
fn skip_indexes_option() {
    let result = check_schema(
        "users",
        &table(json!({"indexes": [{"columns": ["a"]}]})),
        &table(json!({})),
        &SqliteTypes,
        CheckOptions::new().skip_indexes(true),
    );
    assert!(result.is_ok());
}

// =============================================================================
// Invalid input
// =============================================================================

#[test]
fn invalid_attribute_raised_before_matching() {
    let error = check(
        json!({"columns": [{"name": "other"}]}),
        json!({"columns": [{"name": "age", "type": "Integer", "foo": true}]}),
    )
    .unwrap_err();

    let CheckError::Normalize(NormalizeError::InvalidAttribute(invalid)) = &error else {
        panic!("Expected an invalid attribute error, got {error:?}");
    };
    assert_eq!(invalid.keys, vec!["foo"]);
    assert_eq!(invalid.element, "age");
    assert!(error.to_string().contains("foo"));
    assert!(error.to_string().contains("age"));
}

#[test]
fn invalid_attribute_in_actual_side() {
    let error = check(json!({"indexes": [{"columns": ["a"], "method": "btree"}]}), json!({}))
        .unwrap_err();
    assert_eq!(error.to_string(), "method is an invalid attribute for index [a]");
}

#[test]
fn unknown_top_level_key_rejected() {
    assert!(oxide_schema::TableDescription::from_json(json!({"triggers": []})).is_err());
}

// =============================================================================
// Custom defaults
// =============================================================================

#[test]
fn custom_defaults_change_what_matches() {
    let defaults = Defaults::standard().with_default(Category::Columns, "nullable", json!(false));
    let checker = SchemaChecker::with_defaults(SqliteTypes, defaults.into());

    let result = checker.check(
        "users",
        &table(json!({"columns": [{"name": "id", "nullable": false}]})),
        &table(json!({"columns": [{"name": "id"}]})),
        CheckOptions::new(),
    );
    assert!(result.is_ok());
}
