//! Round trip through a database file: dump a live table to disk, then
//! check the same table against the dumped description.

use oxide_schema::{CheckOptions, TableDescription};
use oxide_schema_sqlite::SqliteIntrospector;

async fn create_database(dir: &tempfile::TempDir) -> SqliteIntrospector {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("app.db").display());
    let introspector = SqliteIntrospector::connect(&url)
        .await
        .expect("Failed to open database file");

    for sql in [
        r"CREATE TABLE posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            slug VARCHAR(80) NOT NULL UNIQUE,
            title TEXT NOT NULL,
            published BOOLEAN NOT NULL DEFAULT 0,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            CHECK (length(title) > 0)
        )",
        "CREATE INDEX idx_posts_created ON posts (created_at, published)",
    ] {
        sqlx::query(sql)
            .execute(introspector.pool())
            .await
            .expect("Failed to create schema");
    }
    introspector
}

#[tokio::test]
async fn dumped_description_matches_its_table() {
    let dir = tempfile::tempdir().unwrap();
    let introspector = create_database(&dir).await;

    let dump = introspector.dump_table("posts").await.unwrap();
    let path = dir.path().join("posts.json");
    std::fs::write(&path, serde_json::to_string_pretty(&dump).unwrap()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let expected: TableDescription = serde_json::from_str(&text).unwrap();
    assert_eq!(expected, dump);

    introspector
        .check_table("posts", &expected, CheckOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn dump_omits_default_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let introspector = create_database(&dir).await;

    let dump = serde_json::to_value(introspector.dump_table("posts").await.unwrap()).unwrap();
    assert_eq!(
        dump["columns"][2],
        serde_json::json!({"name": "title", "type": "TEXT", "nullable": false})
    );
    assert_eq!(
        dump["columns"][4],
        serde_json::json!({"name": "created_at", "type": "TIMESTAMP", "default": "CURRENT_TIMESTAMP"})
    );
    assert_eq!(
        dump["indexes"],
        serde_json::json!([{"columns": ["created_at", "published"], "name": "idx_posts_created"}])
    );
    assert_eq!(
        dump["constraints"],
        serde_json::json!([{"check": "length(title) > 0"}])
    );
}

#[tokio::test]
async fn edited_description_reports_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let introspector = create_database(&dir).await;

    let mut expected = introspector.dump_table("posts").await.unwrap();
    expected.columns[2].insert("nullable".to_string(), serde_json::json!(true));

    let error = introspector
        .check_table("posts", &expected, CheckOptions::new())
        .await
        .unwrap_err();
    let report = error.as_schema_diff().unwrap().render();
    assert!(report.starts_with("Table posts has mismatched columns:"));
    assert!(report.contains(r#"actual:    {"name": "title", "type": "TEXT", "nullable": false}"#));
    assert!(report.contains(r#"expected:  {"name": "title", "type": "TEXT"}"#));
}
