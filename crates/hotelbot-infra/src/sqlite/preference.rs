//! SQLite search-preference repository.
//!
//! One row per session (`UNIQUE (session_id)`); writes go through
//! `INSERT ... ON CONFLICT DO UPDATE` so the invariant holds even under
//! concurrent callers. The extra-preference bag is stored as JSON text.

use chrono::Utc;
use hotelbot_core::repository::preference::PreferenceRepository;
use hotelbot_types::error::RepositoryError;
use hotelbot_types::money::Money;
use hotelbot_types::preference::{ExtraPreferences, SearchPreferenceInput, UserSearchPreference};
use hotelbot_types::session::SessionId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::support::{
    count_to_u64, format_datetime, map_sqlx_error, parse_date, parse_datetime, parse_session_id,
    query_error,
};

pub struct SqlitePreferenceRepository {
    pool: DatabasePool,
}

impl SqlitePreferenceRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct PreferenceRow {
    id: i64,
    session_id: String,
    location: String,
    check_in: Option<String>,
    check_out: Option<String>,
    guests: i64,
    budget_min_cents: Option<i64>,
    budget_max_cents: Option<i64>,
    room_type: String,
    preferences: String,
    created_at: String,
    updated_at: String,
}

impl PreferenceRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            location: row.try_get("location")?,
            check_in: row.try_get("check_in")?,
            check_out: row.try_get("check_out")?,
            guests: row.try_get("guests")?,
            budget_min_cents: row.try_get("budget_min_cents")?,
            budget_max_cents: row.try_get("budget_max_cents")?,
            room_type: row.try_get("room_type")?,
            preferences: row.try_get("preferences")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_preference(self) -> Result<UserSearchPreference, RepositoryError> {
        let extra: ExtraPreferences = serde_json::from_str(&self.preferences)
            .map_err(|e| RepositoryError::Query(format!("invalid preferences JSON: {e}")))?;
        let guests = u32::try_from(self.guests)
            .map_err(|_| RepositoryError::Query(format!("invalid guest count: {}", self.guests)))?;

        Ok(UserSearchPreference {
            id: self.id,
            session_id: parse_session_id(&self.session_id)?,
            location: self.location,
            check_in: self.check_in.as_deref().map(parse_date).transpose()?,
            check_out: self.check_out.as_deref().map(parse_date).transpose()?,
            guests,
            budget_min: self.budget_min_cents.map(cents_to_money).transpose()?,
            budget_max: self.budget_max_cents.map(cents_to_money).transpose()?,
            room_type: self.room_type,
            extra,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn cents_to_money(cents: i64) -> Result<Money, RepositoryError> {
    Money::from_cents(cents).map_err(|e| RepositoryError::Query(e.to_string()))
}

impl PreferenceRepository for SqlitePreferenceRepository {
    async fn upsert_preference(
        &self,
        session_id: &SessionId,
        input: &SearchPreferenceInput,
    ) -> Result<UserSearchPreference, RepositoryError> {
        input.validate()?;
        let extra = serde_json::to_string(&input.extra)
            .map_err(|e| RepositoryError::validation("preferences", e.to_string()))?;
        let now = format_datetime(&Utc::now());

        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let row = sqlx::query(
            r#"INSERT INTO user_search_preferences
                   (session_id, location, check_in, check_out, guests, budget_min_cents,
                    budget_max_cents, room_type, preferences, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (session_id) DO UPDATE SET
                   location = excluded.location,
                   check_in = excluded.check_in,
                   check_out = excluded.check_out,
                   guests = excluded.guests,
                   budget_min_cents = excluded.budget_min_cents,
                   budget_max_cents = excluded.budget_max_cents,
                   room_type = excluded.room_type,
                   preferences = excluded.preferences,
                   updated_at = excluded.updated_at
               RETURNING *"#,
        )
        .bind(session_id.to_string())
        .bind(&input.location)
        .bind(input.check_in.map(|d| d.to_string()))
        .bind(input.check_out.map(|d| d.to_string()))
        .bind(i64::from(input.guests))
        .bind(input.budget_min.map(Money::cents))
        .bind(input.budget_max.map(Money::cents))
        .bind(&input.room_type)
        .bind(&extra)
        .bind(&now)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, "preference"))?;

        sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        PreferenceRow::from_row(&row)
            .map_err(query_error)?
            .into_preference()
    }

    async fn get_preference(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<UserSearchPreference>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_search_preferences WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => Ok(Some(
                PreferenceRow::from_row(&row)
                    .map_err(query_error)?
                    .into_preference()?,
            )),
            None => Ok(None),
        }
    }

    async fn delete_preference(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM user_search_preferences WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn count_preferences(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM user_search_preferences")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count_to_u64(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::chat::SqliteChatRepository;
    use crate::sqlite::test_support::test_pool;
    use chrono::NaiveDate;
    use hotelbot_core::chat::repository::ChatRepository;

    fn paris_input() -> SearchPreferenceInput {
        let mut extra = ExtraPreferences::new();
        extra.insert("pets".to_string(), serde_json::json!(true));
        extra.insert("floor".to_string(), serde_json::json!("high"));

        SearchPreferenceInput {
            location: "Paris".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 5, 1),
            check_out: NaiveDate::from_ymd_opt(2026, 5, 4),
            guests: 2,
            budget_min: Some("80".parse().unwrap()),
            budget_max: Some("220.50".parse().unwrap()),
            room_type: "double".to_string(),
            extra,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let pool = test_pool().await;
        let chats = SqliteChatRepository::new(pool.clone());
        let repo = SqlitePreferenceRepository::new(pool);
        let session = chats.create_session(None).await.unwrap();

        assert!(repo.get_preference(&session.id).await.unwrap().is_none());

        let saved = repo.upsert_preference(&session.id, &paris_input()).await.unwrap();
        assert_eq!(saved.session_id, session.id);
        assert_eq!(saved.guests, 2);
        assert_eq!(saved.budget_max.unwrap().to_string(), "220.50");
        assert_eq!(saved.extra["pets"], serde_json::json!(true));

        let found = repo.get_preference(&session.id).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(found.to_string(), "Paris - 2026-05-01");
    }

    #[tokio::test]
    async fn test_second_upsert_replaces_first() {
        let pool = test_pool().await;
        let chats = SqliteChatRepository::new(pool.clone());
        let repo = SqlitePreferenceRepository::new(pool);
        let session = chats.create_session(None).await.unwrap();

        let first = repo.upsert_preference(&session.id, &paris_input()).await.unwrap();

        let replacement = SearchPreferenceInput {
            location: "Lyon".to_string(),
            ..Default::default()
        };
        let second = repo.upsert_preference(&session.id, &replacement).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.location, "Lyon");
        assert_eq!(second.guests, 1);
        assert!(second.check_in.is_none());
        assert!(second.budget_min.is_none());
        assert!(second.extra.is_empty());

        assert_eq!(repo.count_preferences().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_session() {
        let pool = test_pool().await;
        let chats = SqliteChatRepository::new(pool.clone());
        let repo = SqlitePreferenceRepository::new(pool);
        let session = chats.create_session(None).await.unwrap();

        let saved = repo.upsert_preference(&session.id, &paris_input()).await.unwrap();
        let found = chats.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.updated_at, saved.updated_at);
    }

    #[tokio::test]
    async fn test_upsert_unknown_session_is_reference_error() {
        let repo = SqlitePreferenceRepository::new(test_pool().await);

        let err = repo
            .upsert_preference(&SessionId::new(), &paris_input())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Reference(_)));
    }

    #[tokio::test]
    async fn test_upsert_validates() {
        let pool = test_pool().await;
        let chats = SqliteChatRepository::new(pool.clone());
        let repo = SqlitePreferenceRepository::new(pool);
        let session = chats.create_session(None).await.unwrap();

        let bad = SearchPreferenceInput {
            guests: 0,
            ..Default::default()
        };
        let err = repo.upsert_preference(&session.id, &bad).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation { ref field, .. } if field == "guests"));
        assert_eq!(repo.count_preferences().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_preference() {
        let pool = test_pool().await;
        let chats = SqliteChatRepository::new(pool.clone());
        let repo = SqlitePreferenceRepository::new(pool);
        let session = chats.create_session(None).await.unwrap();

        repo.upsert_preference(&session.id, &paris_input()).await.unwrap();
        repo.delete_preference(&session.id).await.unwrap();
        assert!(repo.get_preference(&session.id).await.unwrap().is_none());

        assert!(matches!(
            repo.delete_preference(&session.id).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
