use anyhow::{Context as _, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

use crate::ai::{GeminiClient, StructuredGenerator};
use crate::config::Settings;
use crate::resolver::Resolver;
use crate::storage::LocalStore;

/// Everything built once at start-up and shared by the CLI and the TUI.
pub struct Context {
  pub settings: Settings,
  pub http: Client,
  pub resolver: Arc<Resolver>,
  /// Present only when an AI credential is configured.
  pub ai: Option<Arc<dyn StructuredGenerator>>,
  pub store: Arc<LocalStore>,
}

impl Context {
  pub fn build(settings: Settings) -> Result<Self> {
    let http = Client::builder()
      .user_agent(concat!("neontok/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("Failed to build HTTP client")?;

    let ai: Option<Arc<dyn StructuredGenerator>> = settings.ai_credential.as_ref().map(|key| {
      Arc::new(GeminiClient::new(http.clone(), key.clone(), settings.ai_model.clone())) as Arc<dyn StructuredGenerator>
    });
    let resolver = Arc::new(Resolver::new(http.clone(), ai.clone()));
    let store = Arc::new(match &settings.data_dir {
      Some(dir) => LocalStore::open(dir),
      None => LocalStore::in_memory(),
    });

    info!(
      ai = ai.is_some(),
      sources = ?resolver.strategy_names(),
      language = settings.language.code(),
      "context: initialized"
    );
    Ok(Self { settings, http, resolver, ai, store })
  }

  /// Assemble a context from prebuilt parts.
  #[cfg(test)]
  pub fn from_parts(settings: Settings, resolver: Resolver, ai: Option<Arc<dyn StructuredGenerator>>) -> Self {
    Self { settings, http: Client::new(), resolver: Arc::new(resolver), ai, store: Arc::new(LocalStore::in_memory()) }
  }
}
