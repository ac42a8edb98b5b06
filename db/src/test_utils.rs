use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory SQLite database with every migration applied.
///
/// Pinned to one pooled connection: every new connection to `sqlite::memory:` would
/// otherwise open its own empty database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Statement};

    #[tokio::test]
    async fn tags_default_to_duplicate_warnings() {
        let db = setup_test_db().await;
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "INSERT INTO tags (name, created_at) VALUES ('legacy', '2024-01-01T00:00:00+00:00')",
        ))
        .await
        .unwrap();

        let tag = crate::models::tag::Model::find_by_name(&db, "legacy")
            .await
            .unwrap()
            .unwrap();
        assert!(tag.warn_on_duplicates);
    }
}
