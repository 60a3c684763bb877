use anyhow::{Context, Result};
use portfolio_core::{
    contact::{ContactRelay, ContactSettings, Mailer, ResendMailer},
    llm_client::{LlmConfig, OpenAiClient},
    prompts::PersonaPrompt,
    relay::ChatRelay,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;

/// Everything the request handlers need; immutable once built
pub struct PortfolioService {
    pub chat: ChatRelay,
    pub contact: ContactRelay,
}

impl PortfolioService {
    /// Create a new PortfolioService
    pub fn new(settings: &Settings) -> Result<Self> {
        let persona = match &settings.persona_prompt_path {
            Some(path) => {
                info!("Loading persona prompt from {}", path);
                PersonaPrompt::from_file(path)
                    .with_context(|| format!("Failed to read persona prompt {}", path))?
            }
            None => PersonaPrompt::default(),
        };

        // Create LLM client
        let mut llm_config = LlmConfig::new();
        if let Some(key) = &settings.openai_api_key {
            llm_config = llm_config.with_api_key(key.clone());
        }
        if let Some(base_url) = &settings.openai_base_url {
            llm_config = llm_config.with_base_url(base_url.clone());
        }
        let llm_client = OpenAiClient::new(llm_config)
            .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;
        if settings.openai_api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; chat requests will answer 503");
        }

        // Create mailer
        let mailer: Option<Arc<dyn Mailer>> = match &settings.resend_api_key {
            Some(key) => Some(Arc::new(
                ResendMailer::new(key.clone())
                    .map_err(|e| anyhow::anyhow!("Failed to create mailer: {}", e))?,
            )),
            None => {
                warn!("RESEND_API_KEY is not set; contact submissions will fail");
                None
            }
        };

        let contact_settings = ContactSettings {
            sender_domain: settings.resend_domain.clone(),
            inbox: settings.contact_inbox.clone(),
            utc_offset: settings.contact_utc_offset()?,
        };

        Ok(Self {
            chat: ChatRelay::new(Arc::new(llm_client), persona),
            contact: ContactRelay::new(mailer, contact_settings),
        })
    }
}
