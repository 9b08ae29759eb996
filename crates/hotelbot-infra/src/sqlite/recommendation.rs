//! SQLite recommendation and click repository.
//!
//! Recommendations are append-only. Clicks carry a `UNIQUE (recommendation_id,
//! session_id)` constraint; `record_click` surfaces the breach as
//! `ConstraintViolation`, `record_click_if_absent` turns it into a no-op.

use chrono::Utc;
use hotelbot_core::repository::recommendation::RecommendationRepository;
use hotelbot_types::error::RepositoryError;
use hotelbot_types::money::Money;
use hotelbot_types::recommendation::{
    ClickId, HotelRecommendation, NewHotelRecommendation, RecommendationClick, RecommendationId,
};
use hotelbot_types::session::SessionId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::support::{
    count_to_u64, format_datetime, map_sqlx_error, parse_datetime, parse_session_id, query_error,
};

pub struct SqliteRecommendationRepository {
    pool: DatabasePool,
}

impl SqliteRecommendationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct RecommendationRow {
    id: i64,
    session_id: String,
    booking_id: String,
    name: String,
    location: String,
    price_per_night_cents: i64,
    rating: Option<f64>,
    total_rating_count: i64,
    image_url: Option<String>,
    affiliate_url: String,
    description: String,
    amenities: String,
    score: f64,
    sent_at: String,
}

impl RecommendationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            booking_id: row.try_get("booking_id")?,
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            price_per_night_cents: row.try_get("price_per_night_cents")?,
            rating: row.try_get("rating")?,
            total_rating_count: row.try_get("total_rating_count")?,
            image_url: row.try_get("image_url")?,
            affiliate_url: row.try_get("affiliate_url")?,
            description: row.try_get("description")?,
            amenities: row.try_get("amenities")?,
            score: row.try_get("score")?,
            sent_at: row.try_get("sent_at")?,
        })
    }

    fn into_recommendation(self) -> Result<HotelRecommendation, RepositoryError> {
        let amenities: Vec<String> = serde_json::from_str(&self.amenities)
            .map_err(|e| RepositoryError::Query(format!("invalid amenities JSON: {e}")))?;
        let price_per_night = Money::from_cents(self.price_per_night_cents)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let total_rating_count = u32::try_from(self.total_rating_count).map_err(|_| {
            RepositoryError::Query(format!("invalid rating count: {}", self.total_rating_count))
        })?;

        Ok(HotelRecommendation {
            id: RecommendationId(self.id),
            session_id: parse_session_id(&self.session_id)?,
            booking_id: self.booking_id,
            name: self.name,
            location: self.location,
            price_per_night,
            rating: self.rating,
            total_rating_count,
            image_url: self.image_url,
            affiliate_url: self.affiliate_url,
            description: self.description,
            amenities,
            score: self.score,
            sent_at: parse_datetime(&self.sent_at)?,
        })
    }
}

struct ClickRow {
    id: i64,
    recommendation_id: i64,
    session_id: String,
    clicked_at: String,
}

impl ClickRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            recommendation_id: row.try_get("recommendation_id")?,
            session_id: row.try_get("session_id")?,
            clicked_at: row.try_get("clicked_at")?,
        })
    }

    fn into_click(self) -> Result<RecommendationClick, RepositoryError> {
        Ok(RecommendationClick {
            id: ClickId(self.id),
            recommendation_id: RecommendationId(self.recommendation_id),
            session_id: parse_session_id(&self.session_id)?,
            clicked_at: parse_datetime(&self.clicked_at)?,
        })
    }
}

fn row_to_recommendation(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<HotelRecommendation, RepositoryError> {
    RecommendationRow::from_row(row)
        .map_err(query_error)?
        .into_recommendation()
}

fn row_to_click(row: &sqlx::sqlite::SqliteRow) -> Result<RecommendationClick, RepositoryError> {
    ClickRow::from_row(row).map_err(query_error)?.into_click()
}

impl SqliteRecommendationRepository {
    /// Shared insert path for both click variants.
    ///
    /// With `ignore_duplicate` the unique pair is resolved with `DO NOTHING`
    /// and `None` comes back; foreign keys are still checked either way.
    async fn insert_click(
        &self,
        recommendation_id: RecommendationId,
        session_id: &SessionId,
        ignore_duplicate: bool,
    ) -> Result<Option<RecommendationClick>, RepositoryError> {
        let sql = if ignore_duplicate {
            r#"INSERT INTO recommendation_clicks (recommendation_id, session_id, clicked_at)
               VALUES (?, ?, ?)
               ON CONFLICT (recommendation_id, session_id) DO NOTHING
               RETURNING *"#
        } else {
            r#"INSERT INTO recommendation_clicks (recommendation_id, session_id, clicked_at)
               VALUES (?, ?, ?)
               RETURNING *"#
        };
        let now = format_datetime(&Utc::now());

        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let row = sqlx::query(sql)
            .bind(recommendation_id.0)
            .bind(session_id.to_string())
            .bind(&now)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| match map_sqlx_error(e, "click") {
                RepositoryError::ConstraintViolation(_) => RepositoryError::ConstraintViolation(
                    format!(
                        "session {session_id} already clicked recommendation {recommendation_id}"
                    ),
                ),
                other => other,
            })?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        row_to_click(&row).map(Some)
    }
}

// ---------------------------------------------------------------------------
// RecommendationRepository implementation
// ---------------------------------------------------------------------------

impl RecommendationRepository for SqliteRecommendationRepository {
    async fn add_recommendation(
        &self,
        recommendation: &NewHotelRecommendation,
    ) -> Result<HotelRecommendation, RepositoryError> {
        recommendation.validate()?;
        let amenities = serde_json::to_string(&recommendation.amenities)
            .map_err(|e| RepositoryError::validation("amenities", e.to_string()))?;
        let now = format_datetime(&Utc::now());

        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let row = sqlx::query(
            r#"INSERT INTO hotel_recommendations
                   (session_id, booking_id, name, location, price_per_night_cents, rating,
                    total_rating_count, image_url, affiliate_url, description, amenities,
                    score, sent_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(recommendation.session_id.to_string())
        .bind(&recommendation.booking_id)
        .bind(&recommendation.name)
        .bind(&recommendation.location)
        .bind(recommendation.price_per_night.cents())
        .bind(recommendation.rating)
        .bind(i64::from(recommendation.total_rating_count))
        .bind(&recommendation.image_url)
        .bind(&recommendation.affiliate_url)
        .bind(&recommendation.description)
        .bind(&amenities)
        .bind(recommendation.score)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, "recommendation"))?;

        sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(recommendation.session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        row_to_recommendation(&row)
    }

    async fn get_recommendation(
        &self,
        recommendation_id: RecommendationId,
    ) -> Result<Option<HotelRecommendation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM hotel_recommendations WHERE id = ?")
            .bind(recommendation_id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(row_to_recommendation).transpose()
    }

    async fn list_recommendations(
        &self,
        session_id: &SessionId,
        limit: Option<i64>,
    ) -> Result<Vec<HotelRecommendation>, RepositoryError> {
        let mut sql = String::from(
            "SELECT * FROM hotel_recommendations WHERE session_id = ? ORDER BY sent_at DESC, id DESC",
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(row_to_recommendation).collect()
    }

    async fn count_recommendations(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM hotel_recommendations")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count_to_u64(count))
    }

    async fn record_click(
        &self,
        recommendation_id: RecommendationId,
        session_id: &SessionId,
    ) -> Result<RecommendationClick, RepositoryError> {
        self.insert_click(recommendation_id, session_id, false)
            .await?
            .ok_or_else(|| RepositoryError::Query("click insert returned no row".to_string()))
    }

    async fn record_click_if_absent(
        &self,
        recommendation_id: RecommendationId,
        session_id: &SessionId,
    ) -> Result<Option<RecommendationClick>, RepositoryError> {
        self.insert_click(recommendation_id, session_id, true).await
    }

    async fn list_clicks(
        &self,
        recommendation_id: RecommendationId,
    ) -> Result<Vec<RecommendationClick>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM recommendation_clicks WHERE recommendation_id = ? ORDER BY clicked_at DESC, id DESC",
        )
        .bind(recommendation_id.0)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(row_to_click).collect()
    }

    async fn count_clicks(
        &self,
        recommendation_id: Option<RecommendationId>,
    ) -> Result<u64, RepositoryError> {
        let row = match recommendation_id {
            Some(recommendation_id) => {
                sqlx::query(
                    "SELECT COUNT(*) AS cnt FROM recommendation_clicks WHERE recommendation_id = ?",
                )
                .bind(recommendation_id.0)
                .fetch_one(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query("SELECT COUNT(*) AS cnt FROM recommendation_clicks")
                    .fetch_one(&self.pool.reader)
                    .await
            }
        }
        .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count_to_u64(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::chat::SqliteChatRepository;
    use crate::sqlite::preference::SqlitePreferenceRepository;
    use crate::sqlite::test_support::test_pool;
    use hotelbot_core::chat::repository::ChatRepository;
    use hotelbot_core::repository::preference::PreferenceRepository;
    use hotelbot_types::message::NewMessage;
    use hotelbot_types::preference::SearchPreferenceInput;

    fn make_recommendation(session_id: SessionId, name: &str) -> NewHotelRecommendation {
        NewHotelRecommendation {
            session_id,
            booking_id: format!("BK-{name}"),
            name: name.to_string(),
            location: "Paris".to_string(),
            price_per_night: "149.90".parse().unwrap(),
            rating: Some(8.4),
            total_rating_count: 312,
            image_url: Some("https://img.example.com/h.jpg".to_string()),
            affiliate_url: format!("https://book.example.com/{name}?aid=7"),
            description: "Near the Louvre".to_string(),
            amenities: vec!["wifi".to_string(), "breakfast".to_string()],
            score: 0.72,
        }
    }

    async fn setup() -> (SqliteChatRepository, SqliteRecommendationRepository, SessionId) {
        let pool = test_pool().await;
        let chats = SqliteChatRepository::new(pool.clone());
        let recs = SqliteRecommendationRepository::new(pool);
        let session = chats.create_session(None).await.unwrap();
        (chats, recs, session.id)
    }

    #[tokio::test]
    async fn test_add_and_get_recommendation() {
        let (_chats, recs, sid) = setup().await;

        let saved = recs
            .add_recommendation(&make_recommendation(sid, "lutetia"))
            .await
            .unwrap();
        assert_eq!(saved.session_id, sid);
        assert_eq!(saved.price_per_night.to_string(), "149.90");
        assert_eq!(saved.amenities, vec!["wifi", "breakfast"]);
        assert_eq!(saved.to_string(), "lutetia (Paris)");

        let found = recs.get_recommendation(saved.id).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert!(recs
            .get_recommendation(RecommendationId(saved.id.0 + 100))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_missing_affiliate_url_is_validation_error() {
        let (_chats, recs, sid) = setup().await;

        let rec = NewHotelRecommendation {
            affiliate_url: String::new(),
            ..make_recommendation(sid, "nolink")
        };
        let err = recs.add_recommendation(&rec).await.unwrap_err();
        assert!(
            matches!(err, RepositoryError::Validation { ref field, .. } if field == "affiliate_url")
        );
        assert_eq!(recs.count_recommendations().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recommendation_unknown_session_is_reference_error() {
        let (_chats, recs, _sid) = setup().await;

        let err = recs
            .add_recommendation(&make_recommendation(SessionId::new(), "ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Reference(_)));
    }

    #[tokio::test]
    async fn test_list_recommendations_newest_first() {
        let (_chats, recs, sid) = setup().await;

        let mut ids = Vec::new();
        for name in ["first", "second", "third"] {
            ids.push(
                recs.add_recommendation(&make_recommendation(sid, name))
                    .await
                    .unwrap()
                    .id,
            );
        }

        let listed = recs.list_recommendations(&sid, None).await.unwrap();
        let listed_ids: Vec<RecommendationId> = listed.iter().map(|r| r.id).collect();
        ids.reverse();
        assert_eq!(listed_ids, ids);

        let limited = recs.list_recommendations(&sid, Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].name, "third");
    }

    #[tokio::test]
    async fn test_duplicate_click_is_constraint_violation() {
        let (_chats, recs, sid) = setup().await;
        let rec = recs
            .add_recommendation(&make_recommendation(sid, "clicky"))
            .await
            .unwrap();

        let click = recs.record_click(rec.id, &sid).await.unwrap();
        assert_eq!(click.recommendation_id, rec.id);
        assert_eq!(click.session_id, sid);

        let err = recs.record_click(rec.id, &sid).await.unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(recs.count_clicks(Some(rec.id)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_click_if_absent_is_noop_on_duplicate() {
        let (chats, recs, sid) = setup().await;
        let rec = recs
            .add_recommendation(&make_recommendation(sid, "once"))
            .await
            .unwrap();

        let first = recs.record_click_if_absent(rec.id, &sid).await.unwrap();
        assert!(first.is_some());
        let second = recs.record_click_if_absent(rec.id, &sid).await.unwrap();
        assert!(second.is_none());

        // A different session may click the same recommendation.
        let other = chats.create_session(None).await.unwrap();
        assert!(recs
            .record_click_if_absent(rec.id, &other.id)
            .await
            .unwrap()
            .is_some());

        let clicks = recs.list_clicks(rec.id).await.unwrap();
        assert_eq!(clicks.len(), 2);
        assert_eq!(clicks[0].session_id, other.id);
        assert_eq!(recs.count_clicks(None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_click_on_missing_recommendation_is_reference_error() {
        let (_chats, recs, sid) = setup().await;

        let err = recs
            .record_click(RecommendationId(9999), &sid)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Reference(_)));

        let err = recs
            .record_click_if_absent(RecommendationId(9999), &sid)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Reference(_)));
    }

    #[tokio::test]
    async fn test_delete_session_cascades_everything() {
        let pool = test_pool().await;
        let chats = SqliteChatRepository::new(pool.clone());
        let recs = SqliteRecommendationRepository::new(pool.clone());
        let prefs = SqlitePreferenceRepository::new(pool.clone());

        let doomed = chats.create_session(None).await.unwrap();
        let keeper = chats.create_session(None).await.unwrap();

        chats
            .add_message(&NewMessage::user(doomed.id, "Need a hotel in Paris"))
            .await
            .unwrap();
        prefs
            .upsert_preference(&doomed.id, &SearchPreferenceInput::default())
            .await
            .unwrap();
        let doomed_rec = recs
            .add_recommendation(&make_recommendation(doomed.id, "gone"))
            .await
            .unwrap();
        recs.record_click(doomed_rec.id, &doomed.id).await.unwrap();
        // The keeper's click on the doomed recommendation is owned by it.
        recs.record_click(doomed_rec.id, &keeper.id).await.unwrap();

        let keeper_rec = recs
            .add_recommendation(&make_recommendation(keeper.id, "stays"))
            .await
            .unwrap();
        // The doomed session's click on the keeper's recommendation references it.
        recs.record_click(keeper_rec.id, &doomed.id).await.unwrap();
        recs.record_click(keeper_rec.id, &keeper.id).await.unwrap();

        chats.delete_session(&doomed.id).await.unwrap();

        assert_eq!(chats.count_messages(Some(&doomed.id)).await.unwrap(), 0);
        assert!(prefs.get_preference(&doomed.id).await.unwrap().is_none());
        assert!(recs.list_recommendations(&doomed.id, None).await.unwrap().is_empty());
        assert!(recs.get_recommendation(doomed_rec.id).await.unwrap().is_none());
        assert_eq!(recs.count_clicks(Some(doomed_rec.id)).await.unwrap(), 0);

        let remaining = recs.list_clicks(keeper_rec.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].session_id, keeper.id);
        assert_eq!(recs.count_clicks(None).await.unwrap(), 1);
        assert_eq!(chats.count_sessions().await.unwrap(), 1);
    }
}
