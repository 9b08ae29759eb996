//! Chat service orchestrating the conversation aggregate.
//!
//! ChatService coordinates the ChatRepository, PreferenceRepository and
//! RecommendationRepository: starting sessions, recording turns, caching
//! preferences, surfacing recommendations and tracking clicks.

use hotelbot_types::error::RepositoryError;
use hotelbot_types::message::{Message, NewMessage};
use hotelbot_types::preference::{SearchPreferenceInput, UserSearchPreference};
use hotelbot_types::recommendation::{
    HotelRecommendation, NewHotelRecommendation, RecommendationClick, RecommendationId,
};
use hotelbot_types::session::{ChatSession, SessionId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chat::repository::ChatRepository;
use crate::repository::preference::PreferenceRepository;
use crate::repository::recommendation::RecommendationRepository;

/// Result of a duplicate-tolerant click registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Recorded(RecommendationClick),
    AlreadyRecorded,
}

/// Row counts for every table in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub sessions: u64,
    pub messages: u64,
    pub preferences: u64,
    pub recommendations: u64,
    pub clicks: u64,
}

/// A session with everything it owns, as loaded by [`ChatService::transcript`].
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub session: ChatSession,
    pub messages: Vec<Message>,
    pub preference: Option<UserSearchPreference>,
    pub recommendations: Vec<HotelRecommendation>,
}

/// Generic over the repository traits so hotelbot-core never depends on
/// hotelbot-infra.
pub struct ChatService<C: ChatRepository, P: PreferenceRepository, R: RecommendationRepository> {
    chat_repo: C,
    preference_repo: P,
    recommendation_repo: R,
}

impl<C, P, R> ChatService<C, P, R>
where
    C: ChatRepository,
    P: PreferenceRepository,
    R: RecommendationRepository,
{
    pub fn new(chat_repo: C, preference_repo: P, recommendation_repo: R) -> Self {
        Self {
            chat_repo,
            preference_repo,
            recommendation_repo,
        }
    }

    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    pub fn preference_repo(&self) -> &P {
        &self.preference_repo
    }

    pub fn recommendation_repo(&self) -> &R {
        &self.recommendation_repo
    }

    // --- Session lifecycle ---

    pub async fn start_session(&self, email: Option<&str>) -> Result<ChatSession, RepositoryError> {
        let session = self.chat_repo.create_session(email).await?;
        info!(session_id = %session.id, has_email = session.email.is_some(), "Session started");
        Ok(session)
    }

    pub async fn get_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        self.chat_repo.get_session(session_id).await
    }

    /// List sessions, most recent first.
    pub async fn list_sessions(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        self.chat_repo.list_sessions(limit, offset).await
    }

    pub async fn set_email(
        &self,
        session_id: &SessionId,
        email: Option<&str>,
    ) -> Result<ChatSession, RepositoryError> {
        let session = self.chat_repo.update_email(session_id, email).await?;
        info!(session_id = %session_id, "Session email updated");
        Ok(session)
    }

    /// Delete the session and everything it owns.
    pub async fn end_session(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        match self.chat_repo.delete_session(session_id).await {
            Ok(()) => {
                info!(session_id = %session_id, "Session deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                warn!(session_id = %session_id, "Attempted to delete non-existent session");
                Err(RepositoryError::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    // --- Messages ---

    pub async fn record_user_message(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<Message, RepositoryError> {
        self.record_message(NewMessage::user(*session_id, text)).await
    }

    pub async fn record_bot_message(
        &self,
        session_id: &SessionId,
        text: &str,
        intent: Option<&str>,
    ) -> Result<Message, RepositoryError> {
        let mut message = NewMessage::bot(*session_id, text);
        message.intent = intent.map(str::to_string);
        self.record_message(message).await
    }

    pub async fn record_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let saved = self.chat_repo.add_message(&message).await?;
        debug!(
            session_id = %saved.session_id,
            message_id = %saved.id,
            sender = %saved.sender,
            intent = saved.intent.as_deref().unwrap_or(""),
            "Message recorded"
        );
        Ok(saved)
    }

    /// Load a session together with its messages, preference and recommendations.
    ///
    /// Returns `NotFound` when the session does not exist.
    pub async fn transcript(&self, session_id: &SessionId) -> Result<Transcript, RepositoryError> {
        let session = self
            .chat_repo
            .get_session(session_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let messages = self.chat_repo.get_messages(session_id, None, None).await?;
        let preference = self.preference_repo.get_preference(session_id).await?;
        let recommendations = self
            .recommendation_repo
            .list_recommendations(session_id, None)
            .await?;

        Ok(Transcript {
            session,
            messages,
            preference,
            recommendations,
        })
    }

    // --- Preferences ---

    pub async fn save_preferences(
        &self,
        session_id: &SessionId,
        input: &SearchPreferenceInput,
    ) -> Result<UserSearchPreference, RepositoryError> {
        let saved = self.preference_repo.upsert_preference(session_id, input).await?;
        info!(session_id = %session_id, location = %saved.location, "Search preferences saved");
        Ok(saved)
    }

    // --- Recommendations ---

    pub async fn recommend(
        &self,
        recommendation: &NewHotelRecommendation,
    ) -> Result<HotelRecommendation, RepositoryError> {
        let saved = self.recommendation_repo.add_recommendation(recommendation).await?;
        info!(
            session_id = %saved.session_id,
            recommendation_id = %saved.id,
            booking_id = %saved.booking_id,
            "Recommendation sent"
        );
        Ok(saved)
    }

    /// Record a click, treating a repeat click by the same session as a no-op.
    pub async fn register_click(
        &self,
        recommendation_id: RecommendationId,
        session_id: &SessionId,
    ) -> Result<ClickOutcome, RepositoryError> {
        match self
            .recommendation_repo
            .record_click_if_absent(recommendation_id, session_id)
            .await?
        {
            Some(click) => {
                info!(
                    session_id = %session_id,
                    recommendation_id = %recommendation_id,
                    "Recommendation click recorded"
                );
                Ok(ClickOutcome::Recorded(click))
            }
            None => {
                debug!(
                    session_id = %session_id,
                    recommendation_id = %recommendation_id,
                    "Duplicate click ignored"
                );
                Ok(ClickOutcome::AlreadyRecorded)
            }
        }
    }

    pub async fn stats(&self) -> Result<StoreStats, RepositoryError> {
        Ok(StoreStats {
            sessions: self.chat_repo.count_sessions().await?,
            messages: self.chat_repo.count_messages(None).await?,
            preferences: self.preference_repo.count_preferences().await?,
            recommendations: self.recommendation_repo.count_recommendations().await?,
            clicks: self.recommendation_repo.count_clicks(None).await?,
        })
    }
}
