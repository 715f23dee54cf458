//! Schema migration tests: fresh apply, re-apply, and seed data.

use sqlx::PgPool;

/// Running migrations twice succeeds both times; the second run is a no-op.
#[sqlx::test(migrations = false)]
async fn migrations_are_idempotent(pool: PgPool) {
    launchpad_db::run_migrations(&pool)
        .await
        .expect("first migration run should succeed");
    let first = launchpad_db::applied_migrations(&pool).await.unwrap();

    launchpad_db::run_migrations(&pool)
        .await
        .expect("second migration run should succeed");
    let second = launchpad_db::applied_migrations(&pool).await.unwrap();

    assert_eq!(first, second, "second run must not apply anything new");
    assert_eq!(first.len(), launchpad_db::MIGRATOR.iter().count());
}

/// Connect, migrate, and verify the seeded roles exist.
#[sqlx::test(migrations = "../../db/migrations")]
async fn migrated_schema_has_seeded_roles(pool: PgPool) {
    launchpad_db::health_check(&pool).await.unwrap();

    let roles = launchpad_db::repositories::RoleRepo::list(&pool).await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["admin", "manager", "moderator", "member"]);
}

/// The users table starts empty.
#[sqlx::test(migrations = "../../db/migrations")]
async fn users_table_starts_empty(pool: PgPool) {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}
