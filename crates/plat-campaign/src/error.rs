//! Error type for `plat-campaign`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("campaign not found: {0}")]
  CampaignNotFound(i64),

  /// A required setting was absent; the whole batch fails before any send.
  #[error("missing configuration: {0}")]
  ConfigurationMissing(&'static str),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("export error: {0}")]
  Export(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
