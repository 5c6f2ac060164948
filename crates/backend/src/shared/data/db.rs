use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

/// Open the sqlite database at `db_file` and make sure the schema exists.
///
/// Returns the connection instead of stashing it in a global; callers thread
/// it through `AppState`.
pub async fn initialize_database(db_file: &str) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;
    Ok(conn)
}

/// In-memory database with the production schema, for tests.
///
/// Limited to a single pooled connection: every sqlite `::memory:` connection
/// is its own database, so the pool must never hand out a second one.
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    let conn = Database::connect(options).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

/// Create tables and indexes if they are not there yet. Idempotent.
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'consumer',
            contact_no TEXT,
            address TEXT,
            service_type TEXT,
            experience INTEGER,
            hourly_rate REAL,
            location_lat REAL,
            location_lng REAL,
            average_rating REAL,
            rating_count INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            price REAL NOT NULL,
            provider_name TEXT NOT NULL,
            provider_contact TEXT,
            provider_email TEXT NOT NULL,
            created_by TEXT NOT NULL,
            location_lat REAL NOT NULL,
            location_lng REAL NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY NOT NULL,
            service_id TEXT NOT NULL,
            service_title TEXT NOT NULL,
            consumer_id TEXT NOT NULL,
            consumer_name TEXT,
            consumer_email TEXT NOT NULL,
            contact_number TEXT,
            provider_id TEXT NOT NULL,
            scheduled_at TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            special_instructions TEXT,
            notes TEXT,
            feedback_rating INTEGER,
            feedback_comment TEXT,
            feedback_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS sys_refresh_tokens (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            token_hash TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            revoked_at TEXT
        );
        "#,
        "CREATE INDEX IF NOT EXISTS idx_bookings_service_id ON bookings (service_id);",
        "CREATE INDEX IF NOT EXISTS idx_bookings_consumer_id ON bookings (consumer_id);",
        "CREATE INDEX IF NOT EXISTS idx_bookings_provider_id ON bookings (provider_id);",
        "CREATE INDEX IF NOT EXISTS idx_bookings_scheduled_at ON bookings (scheduled_at);",
        "CREATE INDEX IF NOT EXISTS idx_services_created_by ON services (created_by);",
    ];

    for sql in statements {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }

    tracing::info!("Database schema ready");
    Ok(())
}
