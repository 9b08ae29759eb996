//! RecommendationRepository trait definition.
//!
//! Recommendations are immutable once sent; clicks are owned by their
//! recommendation and unique per (recommendation, session).

use hotelbot_types::error::RepositoryError;
use hotelbot_types::recommendation::{
    HotelRecommendation, NewHotelRecommendation, RecommendationClick, RecommendationId,
};
use hotelbot_types::session::SessionId;

pub trait RecommendationRepository: Send + Sync {
    /// Store a recommendation; fails with `Validation` before any write when
    /// required fields (e.g. `affiliate_url`) are missing.
    fn add_recommendation(
        &self,
        recommendation: &NewHotelRecommendation,
    ) -> impl std::future::Future<Output = Result<HotelRecommendation, RepositoryError>> + Send;

    fn get_recommendation(
        &self,
        recommendation_id: RecommendationId,
    ) -> impl std::future::Future<Output = Result<Option<HotelRecommendation>, RepositoryError>> + Send;

    /// Recommendations for a session, most recently sent first.
    fn list_recommendations(
        &self,
        session_id: &SessionId,
        limit: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<HotelRecommendation>, RepositoryError>> + Send;

    fn count_recommendations(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Record a click. A second click for the same pair fails with
    /// `ConstraintViolation`.
    fn record_click(
        &self,
        recommendation_id: RecommendationId,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<RecommendationClick, RepositoryError>> + Send;

    /// Record a click unless one already exists for the pair; returns `None`
    /// for the duplicate.
    fn record_click_if_absent(
        &self,
        recommendation_id: RecommendationId,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Option<RecommendationClick>, RepositoryError>> + Send;

    /// Clicks on a recommendation, most recent first.
    fn list_clicks(
        &self,
        recommendation_id: RecommendationId,
    ) -> impl std::future::Future<Output = Result<Vec<RecommendationClick>, RepositoryError>> + Send;

    /// Click count for one recommendation, or for all recommendations when `None`.
    fn count_clicks(
        &self,
        recommendation_id: Option<RecommendationId>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
