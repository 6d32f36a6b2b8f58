use std::sync::Arc;

use crate::{config::Config, profiles::{ProfileDirectory, StaticDirectory}};

/// Shared by every handler through axum's `State` extractor. Nothing in
/// here is mutated after construction.
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<Config>,
  pub http: reqwest::Client,
  pub profiles: Arc<dyn ProfileDirectory>
}

impl AppState {
  pub fn new(config: Config) -> Self {
    Self::with_profiles(config, StaticDirectory::builtin())
  }

  pub fn with_profiles(config: Config, profiles: impl ProfileDirectory + 'static) -> Self {
    AppState {
      config: Arc::new(config),
      http: reqwest::Client::new(),
      profiles: Arc::new(profiles)
    }
  }
}
