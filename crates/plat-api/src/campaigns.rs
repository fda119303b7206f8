//! Handlers for `/campaigns` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/campaigns` | Creates the campaign and runs its derivation pass |
//! | `GET`  | `/campaigns/:id` | Campaign plus delivery counters |
//! | `POST` | `/campaigns/:id/send-emails` | Send batch |
//! | `POST` | `/campaigns/:id/generate-letters` | Letter batch |

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use plat_campaign::{
  derive::derive_contacts,
  resolve::{DeterministicResolver, EmailResolver, HeuristicResolver},
  send::{generate_campaign_letters, send_campaign_emails, EmailTransport, LetterReport, SendReport},
};
use plat_core::{
  campaign::{CampaignSummary, NewCampaign},
  store::{CampaignStore, ParcelStore},
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, AppState};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub campaign_name:    String,
  pub county:           String,
  pub state:            String,
  pub max_value:        Option<f64>,
  pub offer_percentage: f64,
  #[serde(default)]
  pub test_mode:        bool,
  pub test_email:       Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
  pub campaign_id:    i64,
  pub contacts_added: usize,
  pub test_mode:      bool,
}

/// `POST /campaigns` — creates the campaign, then derives its contacts in
/// the same request. Test-mode campaigns use the deterministic resolver so
/// the derived emails are reproducible.
pub async fn create<S, T>(
  State(state): State<AppState<S, T>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParcelStore + CampaignStore,
  T: EmailTransport,
{
  if body.campaign_name.trim().is_empty() {
    return Err(ApiError::BadRequest("campaign_name must not be empty".into()));
  }
  if body.test_mode && body.test_email.as_deref().unwrap_or("").trim().is_empty() {
    return Err(ApiError::BadRequest(
      "test_mode campaigns require test_email".into(),
    ));
  }

  let campaign = state
    .store
    .create_campaign(NewCampaign {
      name:             body.campaign_name,
      county:           body.county,
      state:            body.state,
      max_value:        body.max_value,
      offer_percentage: body.offer_percentage,
      test_mode:        body.test_mode,
      test_email:       body.test_email,
    })
    .await
    .map_err(ApiError::store)?;

  let resolver: &dyn EmailResolver = if campaign.test_mode {
    &DeterministicResolver
  } else {
    &HeuristicResolver
  };
  let report = derive_contacts(state.store.as_ref(), &campaign, resolver).await?;

  Ok((
    StatusCode::CREATED,
    Json(CreateResponse {
      campaign_id:    campaign.id,
      contacts_added: report.contacts_added,
      test_mode:      campaign.test_mode,
    }),
  ))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /campaigns/:id`
pub async fn get_one<S, T>(
  State(state): State<AppState<S, T>>,
  Path(id): Path<i64>,
) -> Result<Json<CampaignSummary>, ApiError>
where
  S: ParcelStore + CampaignStore,
  T: EmailTransport,
{
  let summary = state
    .store
    .campaign_summary(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("campaign {id} not found")))?;
  Ok(Json(summary))
}

// ─── Delivery batches ────────────────────────────────────────────────────────

/// `POST /campaigns/:id/send-emails`
pub async fn send_emails<S, T>(
  State(state): State<AppState<S, T>>,
  Path(id): Path<i64>,
) -> Result<Json<SendReport>, ApiError>
where
  S: ParcelStore + CampaignStore,
  T: EmailTransport,
{
  let report = send_campaign_emails(
    state.store.as_ref(),
    &state.outbox,
    id,
    state.transport.as_ref(),
  )
  .await?;
  Ok(Json(report))
}

/// `POST /campaigns/:id/generate-letters`
pub async fn generate_letters<S, T>(
  State(state): State<AppState<S, T>>,
  Path(id): Path<i64>,
) -> Result<Json<LetterReport>, ApiError>
where
  S: ParcelStore + CampaignStore,
  T: EmailTransport,
{
  let report = generate_campaign_letters(state.store.as_ref(), id).await?;
  Ok(Json(report))
}
