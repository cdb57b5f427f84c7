use crate::config::Config;
use crate::feedback::{FeedbackRelay, HttpRelayTransport, RelayTransport};
use crate::relay::{GeminiClient, TextGenerator};
use crate::storage::EntryStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: EntryStore,
    pub feedback: FeedbackRelay,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(
        store: EntryStore,
        feedback: FeedbackRelay,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            feedback,
            generator,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let transport: Arc<dyn RelayTransport> = Arc::new(HttpRelayTransport::new(
            config.relay_url.clone(),
            config.relay_timeout,
        )?);
        let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(config.gemini.clone())?);

        Ok(Self::new(
            EntryStore::new(&config.data_path),
            FeedbackRelay::new(transport, config.relay_timeout),
            generator,
        ))
    }
}
