//! Local attendee record: identity copied from the registration service on first
//! check-in, plus the per-tag check-in state owned by this service.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, TransactionTrait};
use serde::Serialize;

pub use super::tag_state::{Emails, TagDetail, TagMap, TagState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendees")]
pub struct Model {
    /// The registration service's user id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(column_type = "Json")]
    pub emails: Emails,
    #[sea_orm(column_type = "Json")]
    pub tags: TagMap,
    /// Bumped on every write; writers must present the version they read.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Outcome of removing a tag from every attendee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagRemoval {
    pub updated: u64,
    pub deleted: u64,
}

impl Model {
    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id.to_owned()).one(db).await
    }

    /// Inserts a brand-new attendee at version 0.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        id: &str,
        name: &str,
        emails: Vec<String>,
        tags: TagMap,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(id.to_owned()),
            name: Set(name.to_owned()),
            emails: Set(Emails(emails)),
            tags: Set(tags),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        active_model.insert(db).await
    }

    /// Writes `self` only if the stored row is still at `self.version`.
    ///
    /// Returns the stored model (version incremented) on success, or `None` when another
    /// writer got there first.
    pub async fn save_if_unchanged<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Option<Model>, DbErr> {
        let now = Utc::now();
        let next_version = self.version + 1;
        let res = Entity::update_many()
            .set(ActiveModel {
                name: Set(self.name.clone()),
                emails: Set(self.emails.clone()),
                tags: Set(self.tags.clone()),
                version: Set(next_version),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(Column::Id.eq(self.id.as_str()))
            .filter(Column::Version.eq(self.version))
            .exec(db)
            .await?;

        if res.rows_affected == 0 {
            return Ok(None);
        }
        Ok(Some(Model {
            version: next_version,
            updated_at: now,
            ..self.clone()
        }))
    }

    /// Drops `tag` from every attendee that has it, in one transaction. Attendees left
    /// without any tag are deleted.
    pub async fn drop_tag_everywhere<C: TransactionTrait + ConnectionTrait>(
        db: &C,
        tag: &str,
    ) -> Result<TagRemoval, DbErr> {
        let txn = db.begin().await?;
        let mut removal = TagRemoval::default();

        for mut attendee in Entity::find().all(&txn).await? {
            if attendee.tags.remove(tag).is_none() {
                continue;
            }
            if attendee.tags.is_empty() {
                Entity::delete_by_id(attendee.id.clone()).exec(&txn).await?;
                removal.deleted += 1;
            } else if attendee.save_if_unchanged(&txn).await?.is_some() {
                removal.updated += 1;
            }
        }

        txn.commit().await?;
        Ok(removal)
    }

    /// `(tag, state)` pairs in tag-name order.
    pub fn tag_states(&self) -> impl Iterator<Item = (&String, &TagState)> {
        self.tags.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    fn state(checked_in: bool) -> TagState {
        TagState {
            checked_in,
            checkin_success: true,
            ..Default::default()
        }
    }

    fn tags(names: &[&str]) -> TagMap {
        let mut map = TagMap::default();
        for name in names {
            map.insert(*name, state(true));
        }
        map
    }

    #[tokio::test]
    async fn create_and_round_trip_json_columns() {
        let db = setup_test_db().await;
        let created = Model::create(
            &db,
            "u1",
            "Ada Lovelace",
            vec!["ada@example.com".into()],
            tags(&["hackgt"]),
        )
        .await
        .unwrap();
        assert_eq!(created.version, 0);

        let found = Model::find_by_id(&db, "u1").await.unwrap().unwrap();
        assert_eq!(found.emails, Emails(vec!["ada@example.com".into()]));
        assert!(found.tags.get("hackgt").unwrap().checked_in);
    }

    #[tokio::test]
    async fn stale_version_is_not_written() {
        let db = setup_test_db().await;
        let original = Model::create(&db, "u1", "Ada", vec![], tags(&["hackgt"]))
            .await
            .unwrap();

        let mut first = original.clone();
        first.tags.insert("hackgt", state(false));
        let saved = first.save_if_unchanged(&db).await.unwrap().unwrap();
        assert_eq!(saved.version, 1);

        // Second writer still holds version 0.
        let mut second = original.clone();
        second.tags.insert("lunch", state(true));
        assert!(second.save_if_unchanged(&db).await.unwrap().is_none());

        let stored = Model::find_by_id(&db, "u1").await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert!(!stored.tags.get("hackgt").unwrap().checked_in);
        assert!(!stored.tags.contains("lunch"));
    }

    #[tokio::test]
    async fn dropping_a_tag_deletes_attendees_left_without_tags() {
        let db = setup_test_db().await;
        Model::create(&db, "only", "Only Hackgt", vec![], tags(&["hackgt"]))
            .await
            .unwrap();
        Model::create(&db, "both", "Both", vec![], tags(&["hackgt", "lunch"]))
            .await
            .unwrap();
        Model::create(&db, "other", "Other", vec![], tags(&["lunch"]))
            .await
            .unwrap();

        let removal = Model::drop_tag_everywhere(&db, "hackgt").await.unwrap();
        assert_eq!(removal, TagRemoval { updated: 1, deleted: 1 });

        assert!(Model::find_by_id(&db, "only").await.unwrap().is_none());
        let both = Model::find_by_id(&db, "both").await.unwrap().unwrap();
        assert!(!both.tags.contains("hackgt"));
        assert_eq!(both.version, 1);
        let other = Model::find_by_id(&db, "other").await.unwrap().unwrap();
        assert_eq!(other.version, 0);
    }
}
