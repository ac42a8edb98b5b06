//! Master record for a check-in tag such as `hackgt` or `lunch-day-1`.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, QueryOrder};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    /// Lowercase tag name, unique.
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    /// Optional validity window; either both bounds are set or neither is.
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// When false, repeated check-ins/outs are recorded as successful.
    pub warn_on_duplicates: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        name: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        warn_on_duplicates: bool,
    ) -> Result<Model, DbErr> {
        let active_model = ActiveModel {
            name: Set(name.to_owned()),
            start: Set(start),
            end: Set(end),
            warn_on_duplicates: Set(warn_on_duplicates),
            created_at: Set(Utc::now()),
        };
        active_model.insert(db).await
    }

    pub async fn find_by_name<C: ConnectionTrait>(
        db: &C,
        name: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(name.to_owned()).one(db).await
    }

    pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, DbErr> {
        Entity::find().order_by_asc(Column::Name).all(db).await
    }

    /// Deletes the tag row only; see `attendee::Model::drop_tag_everywhere` for the
    /// attendee side.
    pub async fn delete_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<bool, DbErr> {
        let res = Entity::delete_by_id(name.to_owned()).exec(db).await?;
        Ok(res.rows_affected > 0)
    }

    /// Whether `at` falls inside the validity window. Tags without a window are always open.
    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= at && at < end,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use chrono::Duration;

    #[tokio::test]
    async fn create_find_list_delete() {
        let db = setup_test_db().await;

        Model::create(&db, "hackgt", None, None, true).await.unwrap();
        Model::create(&db, "breakfast", None, None, false)
            .await
            .unwrap();

        let found = Model::find_by_name(&db, "hackgt").await.unwrap().unwrap();
        assert!(found.warn_on_duplicates);

        let names: Vec<_> = Model::list(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["breakfast", "hackgt"]);

        assert!(Model::delete_by_name(&db, "hackgt").await.unwrap());
        assert!(!Model::delete_by_name(&db, "hackgt").await.unwrap());
        assert!(Model::find_by_name(&db, "hackgt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let db = setup_test_db().await;
        Model::create(&db, "hackgt", None, None, true).await.unwrap();
        assert!(Model::create(&db, "hackgt", None, None, true).await.is_err());
    }

    #[test]
    fn window_is_half_open() {
        let start = Utc::now();
        let end = start + Duration::hours(2);
        let tag = Model {
            name: "lunch".into(),
            start: Some(start),
            end: Some(end),
            warn_on_duplicates: true,
            created_at: start,
        };
        assert!(tag.is_open_at(start));
        assert!(tag.is_open_at(start + Duration::hours(1)));
        assert!(!tag.is_open_at(end));
        assert!(!tag.is_open_at(start - Duration::seconds(1)));
    }
}
