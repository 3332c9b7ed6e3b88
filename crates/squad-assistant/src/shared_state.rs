//! Shared application state wired once at startup and handed to the
//! pipeline and API handlers through `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::classifiers::GreetingRotation;
use crate::collaborators::{
    EmbeddingService, GenerationService, ModerationService, OpenAiEmbeddings, OpenAiGeneration,
    OpenAiModeration, UpstashVectorIndex, VectorIndex,
};
use crate::config::Config;
use crate::rate_limit::RateLimiter;
use crate::store::AssistantDatabase;

pub struct SharedState {
    pub config: Arc<Config>,
    pub database: Arc<AssistantDatabase>,
    pub moderation: Arc<dyn ModerationService>,
    pub embeddings: Arc<dyn EmbeddingService>,
    pub vector_index: Arc<dyn VectorIndex>,
    pub generation: Arc<dyn GenerationService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub greeting_rotation: Arc<GreetingRotation>,
    /// Admin kill switch; flipping it pauses the answering stages while
    /// keeping greetings and leaderboard lookups responsive.
    assistant_enabled: AtomicBool,
}

impl SharedState {
    pub fn new(config: Config, database: Arc<AssistantDatabase>) -> Self {
        info!("Initializing shared assistant state");
        let base_url = config.openai_base_url.clone();
        let api_key = config.openai_api_key.clone();
        let moderation = Arc::new(OpenAiModeration::new(base_url.clone(), api_key.clone()));
        let embeddings = Arc::new(OpenAiEmbeddings::new(
            base_url.clone(),
            api_key.clone(),
            config.embed_model.clone(),
        ));
        let vector_index = Arc::new(UpstashVectorIndex::new(
            config.vector_url.clone(),
            config.vector_token.clone(),
        ));
        let generation = Arc::new(OpenAiGeneration::new(
            base_url,
            api_key,
            config.gen_model.clone(),
        ));
        Self::with_collaborators(
            config,
            database,
            moderation,
            embeddings,
            vector_index,
            generation,
        )
    }

    /// Wires explicit collaborators; tests use this to substitute fakes.
    pub fn with_collaborators(
        config: Config,
        database: Arc<AssistantDatabase>,
        moderation: Arc<dyn ModerationService>,
        embeddings: Arc<dyn EmbeddingService>,
        vector_index: Arc<dyn VectorIndex>,
        generation: Arc<dyn GenerationService>,
    ) -> Self {
        let enabled = config.assistant_enabled;
        Self {
            moderation,
            embeddings,
            vector_index,
            generation,
            config: Arc::new(config),
            database,
            rate_limiter: Arc::new(RateLimiter::default()),
            greeting_rotation: Arc::new(GreetingRotation::new()),
            assistant_enabled: AtomicBool::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.assistant_enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.assistant_enabled.store(enabled, Ordering::Relaxed);
        info!("Assistant enabled flag set to {}", enabled);
    }
}
