//! JSON REST API for the plat pipeline.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`plat_core::store::ParcelStore`] and [`plat_core::store::CampaignStore`],
//! plus a pluggable email transport. Auth, TLS, and transport concerns are
//! the caller's responsibility.

pub mod campaigns;
pub mod error;
pub mod parcels;

#[cfg(test)]
mod tests;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  routing::{get, post},
  Router,
};
use plat_campaign::send::{EmailTransport, OutboxConfig};
use plat_core::store::{CampaignStore, ParcelStore};
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_send_delay_ms() -> u64 {
  500
}

/// Runtime server configuration, deserialized from `config.toml` with
/// `PLAT_`-prefixed environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  /// Outbound From address for send batches.
  pub from_address:  String,
  #[serde(default = "default_send_delay_ms")]
  pub send_delay_ms: u64,
}

impl ServerConfig {
  pub fn outbox(&self) -> OutboxConfig {
    OutboxConfig {
      from_address: self.from_address.clone(),
      send_delay:   Duration::from_millis(self.send_delay_ms),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, T> {
  pub store:     Arc<S>,
  pub transport: Arc<T>,
  pub outbox:    Arc<OutboxConfig>,
}

// Manual impl: the derive would demand S: Clone and T: Clone, but both
// already live behind Arcs.
impl<S, T> Clone for AppState<S, T> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      transport: self.transport.clone(),
      outbox:    self.outbox.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, T>(state: AppState<S, T>) -> Router<()>
where
  S: ParcelStore + CampaignStore + Send + Sync + 'static,
  T: EmailTransport + 'static,
{
  Router::new()
    // Campaigns
    .route("/campaigns", post(campaigns::create::<S, T>))
    .route("/campaigns/{id}", get(campaigns::get_one::<S, T>))
    .route(
      "/campaigns/{id}/send-emails",
      post(campaigns::send_emails::<S, T>),
    )
    .route(
      "/campaigns/{id}/generate-letters",
      post(campaigns::generate_letters::<S, T>),
    )
    // Parcels and reports
    .route("/parcels", get(parcels::list::<S, T>))
    .route("/export", get(parcels::export::<S, T>))
    .with_state(state)
}
