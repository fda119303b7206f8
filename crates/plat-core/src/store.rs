//! The `ParcelStore` / `CampaignStore` traits and supporting types.
//!
//! The traits are implemented by storage backends (e.g. `plat-store-sqlite`).
//! Higher layers (`plat-etl`, `plat-campaign`, `plat-api`) depend on these
//! abstractions, not on any concrete backend.

use std::future::Future;

use crate::{
  campaign::{Campaign, CampaignContact, CampaignSummary, NewCampaign, NewContact},
  filter::ParcelFilter,
  parcel::{Parcel, ParcelRecord},
};

// ─── Outcome types ───────────────────────────────────────────────────────────

/// Result of one batch upsert (one page's worth of rows).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
  /// Rows that did not previously exist.
  pub created: usize,
  /// Rows merged into an existing natural key.
  pub updated: usize,
}

impl UpsertOutcome {
  pub fn absorb(&mut self, other: UpsertOutcome) {
    self.created += other.created;
    self.updated += other.updated;
  }
}

// ─── Parcel store ────────────────────────────────────────────────────────────

/// Abstraction over the canonical parcel set.
///
/// Upserts are idempotent by natural key and field-merging: re-running an
/// ETL page must never duplicate rows, and a partial-coverage source must
/// never null out fields a richer source already populated.
///
/// All methods return `Send` futures so the traits can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ParcelStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert-or-merge a batch of records atomically (one transaction).
  ///
  /// Per record: absent natural key → insert; present → update only the
  /// columns the record provides as non-null. A key collision racing with
  /// a concurrent run is resolved as an update, never surfaced as a
  /// uniqueness violation.
  fn upsert_batch(
    &self,
    records: Vec<ParcelRecord>,
  ) -> impl Future<Output = Result<UpsertOutcome, Self::Error>> + Send + '_;

  /// All parcels for a (county, state) that pass `filter`, in store
  /// iteration order. The key components are case-normalized before
  /// comparison.
  fn query<'a>(
    &'a self,
    county: &'a str,
    state: &'a str,
    filter: &'a ParcelFilter,
  ) -> impl Future<Output = Result<Vec<Parcel>, Self::Error>> + Send + 'a;

  /// Look up one parcel by natural key.
  fn get_parcel<'a>(
    &'a self,
    county: &'a str,
    state: &'a str,
    parcel_id: &'a str,
  ) -> impl Future<Output = Result<Option<Parcel>, Self::Error>> + Send + 'a;
}

// ─── Campaign store ──────────────────────────────────────────────────────────

/// Abstraction over campaigns and their derived contacts.
///
/// Contacts are append-only; the only mutations ever applied are the two
/// delivery-state flags.
pub trait CampaignStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn create_campaign(
    &self,
    input: NewCampaign,
  ) -> impl Future<Output = Result<Campaign, Self::Error>> + Send + '_;

  fn get_campaign(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Campaign>, Self::Error>> + Send + '_;

  /// Insert a derivation pass's contacts atomically (one transaction).
  /// Returns the assigned contact ids in input order.
  fn add_contacts(
    &self,
    campaign_id: i64,
    contacts: Vec<NewContact>,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  /// All contacts for a campaign, in insertion order.
  fn list_contacts(
    &self,
    campaign_id: i64,
  ) -> impl Future<Output = Result<Vec<CampaignContact>, Self::Error>> + Send + '_;

  /// Send-batch candidates: `email_sent = false` AND a non-empty email.
  /// Already-sent contacts are excluded so re-runs are idempotent.
  fn unsent_email_contacts(
    &self,
    campaign_id: i64,
  ) -> impl Future<Output = Result<Vec<CampaignContact>, Self::Error>> + Send + '_;

  /// Letter-batch candidates: no email on file AND `letter_generated =
  /// false`. A contact is never eligible for both paths in one pass.
  fn letter_candidates(
    &self,
    campaign_id: i64,
  ) -> impl Future<Output = Result<Vec<CampaignContact>, Self::Error>> + Send + '_;

  fn mark_email_sent(
    &self,
    contact_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn mark_letter_generated(
    &self,
    contact_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Campaign plus aggregated delivery counters. `None` for an unknown id.
  fn campaign_summary(
    &self,
    campaign_id: i64,
  ) -> impl Future<Output = Result<Option<CampaignSummary>, Self::Error>> + Send + '_;
}
