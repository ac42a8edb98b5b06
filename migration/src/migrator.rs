use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202610010001_create_tags::Migration),
            Box::new(migrations::m202610010002_create_attendees::Migration),
            Box::new(migrations::m202610010003_add_tag_warn_on_duplicates::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::m202610010003_add_tag_warn_on_duplicates;
    use sea_orm::{ConnectOptions, Database};

    #[tokio::test]
    async fn migrations_apply_to_sqlite_and_rerun_cleanly() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();

        Migrator::up(&db, None).await.unwrap();

        let manager = SchemaManager::new(&db);
        assert!(manager.has_table("tags").await.unwrap());
        assert!(manager.has_table("attendees").await.unwrap());
        assert!(manager.has_column("tags", "warn_on_duplicates").await.unwrap());

        // The column check makes the last step safe to apply twice.
        m202610010003_add_tag_warn_on_duplicates::Migration
            .up(&manager)
            .await
            .unwrap();

        Migrator::up(&db, None).await.unwrap();
    }
}
