use hotelbot_types::error::RepositoryError;
use hotelbot_types::preference::{SearchPreferenceInput, UserSearchPreference};
use hotelbot_types::session::SessionId;

/// Repository trait for the one-per-session search preference snapshot.
pub trait PreferenceRepository: Send + Sync {
    /// Create or replace the snapshot for a session.
    ///
    /// The original `created_at` survives a replace; `updated_at` is refreshed.
    fn upsert_preference(
        &self,
        session_id: &SessionId,
        input: &SearchPreferenceInput,
    ) -> impl std::future::Future<Output = Result<UserSearchPreference, RepositoryError>> + Send;

    fn get_preference(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Option<UserSearchPreference>, RepositoryError>> + Send;

    fn delete_preference(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn count_preferences(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
