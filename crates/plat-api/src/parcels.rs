//! Handlers for `/parcels` and `/export`.

use axum::{
  extract::{Query, State},
  http::header,
  response::IntoResponse,
  Json,
};
use plat_campaign::{
  export::{contacts_csv, parcels_csv},
  send::EmailTransport,
};
use plat_core::{
  filter::ParcelFilter,
  parcel::Parcel,
  store::{CampaignStore, ParcelStore},
};
use serde::Deserialize;

use crate::{error::ApiError, AppState};

fn default_state() -> String {
  "MI".to_owned()
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub county:    String,
  #[serde(default = "default_state")]
  pub state:     String,
  pub max_value: Option<f64>,
  pub min_sqft:  Option<f64>,
  pub max_sqft:  Option<f64>,
  pub year_min:  Option<i32>,
}

impl ListParams {
  fn filter(&self) -> ParcelFilter {
    ParcelFilter {
      max_value: self.max_value,
      min_sqft:  self.min_sqft,
      max_sqft:  self.max_sqft,
      year_min:  self.year_min,
    }
  }
}

/// `GET /parcels?county=<county>[&state=&max_value=&min_sqft=&max_sqft=&year_min=]`
pub async fn list<S, T>(
  State(state): State<AppState<S, T>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Parcel>>, ApiError>
where
  S: ParcelStore + CampaignStore,
  T: EmailTransport,
{
  let parcels = state
    .store
    .query(&params.county, &params.state, &params.filter())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(parcels))
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
  Parcels,
  Contacts,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  pub report:      ReportKind,
  // Parcel report criteria.
  pub county:      Option<String>,
  #[serde(default = "default_state")]
  pub state:       String,
  pub max_value:   Option<f64>,
  pub min_sqft:    Option<f64>,
  pub max_sqft:    Option<f64>,
  pub year_min:    Option<i32>,
  // Contact report selector.
  pub campaign_id: Option<i64>,
}

/// `GET /export?report=parcels|contacts&...` — CSV body.
pub async fn export<S, T>(
  State(state): State<AppState<S, T>>,
  Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ParcelStore + CampaignStore,
  T: EmailTransport,
{
  let csv = match params.report {
    ReportKind::Parcels => {
      let county = params
        .county
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("parcels report requires county".into()))?;
      let filter = ParcelFilter {
        max_value: params.max_value,
        min_sqft:  params.min_sqft,
        max_sqft:  params.max_sqft,
        year_min:  params.year_min,
      };
      let parcels = state
        .store
        .query(county, &params.state, &filter)
        .await
        .map_err(ApiError::store)?;
      parcels_csv(&parcels)?
    }
    ReportKind::Contacts => {
      let campaign_id = params.campaign_id.ok_or_else(|| {
        ApiError::BadRequest("contacts report requires campaign_id".into())
      })?;
      state
        .store
        .get_campaign(campaign_id)
        .await
        .map_err(ApiError::store)?
        .ok_or_else(|| {
          ApiError::NotFound(format!("campaign {campaign_id} not found"))
        })?;
      let contacts = state
        .store
        .list_contacts(campaign_id)
        .await
        .map_err(ApiError::store)?;
      contacts_csv(&contacts)?
    }
  };

  Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv))
}
