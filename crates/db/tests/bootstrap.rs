use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    academy_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "user_sessions",
        "password_reset_tokens",
        "courses",
        "lessons",
        "enrollments",
        "lesson_progress",
        "events",
        "event_speakers",
        "event_registrations",
        "chat_rooms",
        "chat_room_participants",
        "messages",
        "message_read_statuses",
        "posts",
        "comments",
        "likes",
        "notifications",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// Every unique constraint carries the `uq_` prefix the API relies on for 409s.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unique_constraints_are_prefixed(pool: PgPool) {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT conname::text FROM pg_constraint
         WHERE contype = 'u' AND connamespace = 'public'::regnamespace",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!names.is_empty());
    for name in names {
        assert!(name.starts_with("uq_"), "unique constraint {name} lacks uq_ prefix");
    }
}

/// The updated_at trigger advances the timestamp on update.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_trigger(pool: PgPool) {
    let (id, created): (i64, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash)
         VALUES ('trigger', 'trigger@example.com', 'x')
         RETURNING id, updated_at",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let updated: chrono::DateTime<chrono::Utc> =
        sqlx::query_scalar("UPDATE users SET bio = 'hi' WHERE id = $1 RETURNING updated_at")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();

    assert!(updated >= created);
}

/// Every table has bigint ids and timestamptz `created_at`/`updated_at`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tables_follow_column_conventions(pool: PgPool) {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert!(!tables.is_empty());

    for table in &tables {
        for (column, expected) in [
            ("id", "bigint"),
            ("created_at", "timestamp with time zone"),
            ("updated_at", "timestamp with time zone"),
        ] {
            let data_type: Option<String> = sqlx::query_scalar(
                "SELECT data_type::text
                 FROM information_schema.columns
                 WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
            )
            .bind(table)
            .bind(column)
            .fetch_optional(&pool)
            .await
            .unwrap();

            let data_type =
                data_type.unwrap_or_else(|| panic!("{table} is missing column {column}"));
            assert_eq!(data_type, expected, "{table}.{column} has type {data_type}");
        }
    }
}
