//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn fresh_db() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = fresh_db().await;
    lodgr_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("tenant"), "missing tenant table");
    assert!(info_str.contains("property"), "missing property table");
    assert!(info_str.contains("reservation"), "missing reservation table");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn reservation_indexes_are_defined() {
    let db = fresh_db().await;
    lodgr_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR TABLE reservation").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info_str = format!("{:?}", info.expect("table info"));

    assert!(info_str.contains("idx_reservation_tenant"));
    assert!(info_str.contains("idx_reservation_property"));
    assert!(info_str.contains("idx_reservation_dates"));
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = fresh_db().await;

    lodgr_db::run_migrations(&db).await.unwrap();
    lodgr_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn property_defaults_apply() {
    let db = fresh_db().await;
    lodgr_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE property SET \
         tenant_id = 'acme', property_code = '101', name = 'Main St'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let mut result = db
        .query("SELECT VALUE timezone FROM property WHERE property_code = '101'")
        .await
        .unwrap();
    let zones: Vec<String> = result.take(0).unwrap();
    assert_eq!(zones, vec!["UTC".to_string()]);
}

#[tokio::test]
async fn unique_index_scopes_codes_to_tenant() {
    let db = fresh_db().await;
    lodgr_db::run_migrations(&db).await.unwrap();

    let insert = |tenant: &'static str| {
        let db = db.clone();
        async move {
            db.query(
                "CREATE property SET \
                 tenant_id = $tenant, property_code = '101', name = 'Main St'",
            )
            .bind(("tenant", tenant))
            .await
            .unwrap()
            .check()
        }
    };

    insert("acme").await.unwrap();
    insert("globex").await.unwrap();

    let result = insert("acme").await;
    assert!(result.is_err(), "duplicate (tenant, code) should be rejected");
}
