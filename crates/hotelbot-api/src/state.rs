//! Application state wiring the store together.
//!
//! ChatService is generic over the repository traits; AppState pins it to the
//! SQLite implementations.

use std::path::PathBuf;
use std::sync::Arc;

use hotelbot_core::chat::service::ChatService;
use hotelbot_infra::config::{database_url, load_store_config, resolve_data_dir};
use hotelbot_infra::sqlite::chat::SqliteChatRepository;
use hotelbot_infra::sqlite::pool::DatabasePool;
use hotelbot_infra::sqlite::preference::SqlitePreferenceRepository;
use hotelbot_infra::sqlite::recommendation::SqliteRecommendationRepository;

pub type ConcreteChatService = ChatService<
    SqliteChatRepository,
    SqlitePreferenceRepository,
    SqliteRecommendationRepository,
>;

/// Shared application state used by every CLI command.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_store_config(&data_dir).await;
        let db_url = database_url(&config, &data_dir);
        let db_pool = DatabasePool::connect(&db_url, &config.database).await?;
        tracing::debug!(data_dir = %data_dir.display(), "Store opened");

        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqlitePreferenceRepository::new(db_pool.clone()),
            SqliteRecommendationRepository::new(db_pool.clone()),
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            data_dir,
        })
    }
}
