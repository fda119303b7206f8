//! Integration tests for `SqliteStore` against an in-memory database.

use plat_core::{
  campaign::{NewCampaign, NewContact},
  filter::ParcelFilter,
  parcel::ParcelRecord,
  store::{CampaignStore, ParcelStore},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn record(parcel_id: &str) -> ParcelRecord {
  ParcelRecord {
    county: "Kent".into(),
    state: "MI".into(),
    parcel_id: parcel_id.into(),
    ..Default::default()
  }
}

fn campaign_input() -> NewCampaign {
  NewCampaign {
    name:             "august mailer".into(),
    county:           "Kent".into(),
    state:            "MI".into(),
    max_value:        Some(150_000.0),
    offer_percentage: 60.0,
    test_mode:        true,
    test_email:       Some("buyer@example.com".into()),
  }
}

fn contact_input(owner: &str, email: Option<&str>) -> NewContact {
  NewContact {
    parcel_id:        Some("41-01".into()),
    owner_name:       owner.into(),
    first_name:       "John".into(),
    last_name:        "Doe".into(),
    email:            email.map(Into::into),
    mailing_address:  Some("100 Division Ave".into()),
    mailing_city:     Some("Grand Rapids".into()),
    mailing_state:    Some("MI".into()),
    mailing_zip:      Some("49503".into()),
    property_address: Some("123 Main St".into()),
    property_city:    Some("Grand Rapids".into()),
    property_zip:     Some("49503".into()),
    assessed_value:   Some(90_000.0),
  }
}

// ─── Parcel upsert ───────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_creates_then_updates() {
  let s = store().await;

  let outcome = s.upsert_batch(vec![record("41-01")]).await.unwrap();
  assert_eq!(outcome.created, 1);
  assert_eq!(outcome.updated, 0);

  let outcome = s.upsert_batch(vec![record("41-01")]).await.unwrap();
  assert_eq!(outcome.created, 0);
  assert_eq!(outcome.updated, 1);

  let all = s
    .query("kent", "mi", &ParcelFilter::default())
    .await
    .unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn upsert_is_idempotent_across_reruns() {
  let s = store().await;
  let batch = vec![record("41-01"), record("41-02"), record("41-03")];

  s.upsert_batch(batch.clone()).await.unwrap();
  s.upsert_batch(batch.clone()).await.unwrap();
  s.upsert_batch(batch).await.unwrap();

  let all = s
    .query("KENT", "MI", &ParcelFilter::default())
    .await
    .unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn upsert_key_is_case_insensitive() {
  let s = store().await;

  s.upsert_batch(vec![record("41-01")]).await.unwrap();

  let mut lowered = record("41-01");
  lowered.county = "kent".into();
  lowered.state = "mi".into();
  let outcome = s.upsert_batch(vec![lowered]).await.unwrap();
  assert_eq!(outcome.created, 0);
  assert_eq!(outcome.updated, 1);
}

#[tokio::test]
async fn partial_source_never_nulls_richer_fields() {
  let s = store().await;

  // Rich row first (e.g. assessor CSV).
  let mut rich = record("41-01");
  rich.owner_name = Some("SMITH, JOHN".into());
  rich.assessed_value = Some(120_000.0);
  rich.year_built = Some(1950);
  s.upsert_batch(vec![rich]).await.unwrap();

  // Sparse re-ingest (e.g. geometry-only feature service) must only fill,
  // never clear.
  let mut sparse = record("41-01");
  sparse.situs_address = Some("123 Main St".into());
  s.upsert_batch(vec![sparse]).await.unwrap();

  let p = s.get_parcel("Kent", "MI", "41-01").await.unwrap().unwrap();
  assert_eq!(p.owner_name.as_deref(), Some("SMITH, JOHN"));
  assert_eq!(p.assessed_value, Some(120_000.0));
  assert_eq!(p.year_built, Some(1950));
  assert_eq!(p.situs_address.as_deref(), Some("123 Main St"));
}

#[tokio::test]
async fn newer_values_overwrite_older_ones() {
  let s = store().await;

  let mut first = record("41-01");
  first.assessed_value = Some(100_000.0);
  s.upsert_batch(vec![first]).await.unwrap();

  let mut second = record("41-01");
  second.assessed_value = Some(110_000.0);
  s.upsert_batch(vec![second]).await.unwrap();

  let p = s.get_parcel("Kent", "MI", "41-01").await.unwrap().unwrap();
  assert_eq!(p.assessed_value, Some(110_000.0));
}

#[tokio::test]
async fn get_parcel_missing_returns_none() {
  let s = store().await;
  let p = s.get_parcel("Kent", "MI", "nope").await.unwrap();
  assert!(p.is_none());
}

// ─── Parcel query ────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_filters_by_county_and_state() {
  let s = store().await;

  let mut other = record("99-01");
  other.county = "Ottawa".into();
  s.upsert_batch(vec![record("41-01"), other]).await.unwrap();

  let kent = s
    .query("Kent", "MI", &ParcelFilter::default())
    .await
    .unwrap();
  assert_eq!(kent.len(), 1);
  assert_eq!(kent[0].parcel_id, "41-01");
}

#[tokio::test]
async fn query_max_value_passes_when_either_estimate_qualifies() {
  let s = store().await;

  let mut assessed_high = record("41-01");
  assessed_high.assessed_value = Some(200_000.0);
  assessed_high.taxable_value = Some(90_000.0);

  let mut both_high = record("41-02");
  both_high.assessed_value = Some(200_000.0);
  both_high.taxable_value = Some(180_000.0);

  s.upsert_batch(vec![assessed_high, both_high])
    .await
    .unwrap();

  let filter = ParcelFilter {
    max_value: Some(150_000.0),
    ..Default::default()
  };
  let hits = s.query("Kent", "MI", &filter).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].parcel_id, "41-01");
}

#[tokio::test]
async fn query_applies_size_and_age_criteria() {
  let s = store().await;

  let mut old_small = record("41-01");
  old_small.building_sqft = Some(900.0);
  old_small.year_built = Some(1940);

  let mut new_big = record("41-02");
  new_big.building_sqft = Some(2400.0);
  new_big.year_built = Some(2005);

  s.upsert_batch(vec![old_small, new_big]).await.unwrap();

  let filter = ParcelFilter {
    min_sqft: Some(1000.0),
    year_min: Some(1980),
    ..Default::default()
  };
  let hits = s.query("Kent", "MI", &filter).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].parcel_id, "41-02");
}

// ─── Campaigns ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_campaign() {
  let s = store().await;

  let campaign = s.create_campaign(campaign_input()).await.unwrap();
  assert!(campaign.id > 0);
  // County/state stored normalized so parcel queries line up.
  assert_eq!(campaign.county, "KENT");
  assert_eq!(campaign.state, "MI");

  let fetched = s.get_campaign(campaign.id).await.unwrap().unwrap();
  assert_eq!(fetched, campaign);
}

#[tokio::test]
async fn get_campaign_missing_returns_none() {
  let s = store().await;
  assert!(s.get_campaign(42).await.unwrap().is_none());
}

#[tokio::test]
async fn add_contacts_to_missing_campaign_fails() {
  let s = store().await;
  let err = s
    .add_contacts(42, vec![contact_input("DOE, JOHN", None)])
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::CampaignNotFound(42)));
}

#[tokio::test]
async fn contacts_round_trip_in_insertion_order() {
  let s = store().await;
  let campaign = s.create_campaign(campaign_input()).await.unwrap();

  let ids = s
    .add_contacts(campaign.id, vec![
      contact_input("DOE, JOHN", Some("test.john.doe@example.com")),
      contact_input("ROE, JANE", None),
    ])
    .await
    .unwrap();
  assert_eq!(ids.len(), 2);

  let contacts = s.list_contacts(campaign.id).await.unwrap();
  assert_eq!(contacts.len(), 2);
  assert_eq!(contacts[0].id, ids[0]);
  assert_eq!(contacts[0].owner_name, "DOE, JOHN");
  assert!(!contacts[0].email_sent);
  assert!(!contacts[0].letter_generated);
}

// ─── Delivery candidates ─────────────────────────────────────────────────────

#[tokio::test]
async fn email_and_letter_candidates_partition_contacts() {
  let s = store().await;
  let campaign = s.create_campaign(campaign_input()).await.unwrap();

  s.add_contacts(campaign.id, vec![
    contact_input("DOE, JOHN", Some("test.john.doe@example.com")),
    contact_input("ROE, JANE", None),
    contact_input("POE, EDGAR", Some("")),
  ])
  .await
  .unwrap();

  let emailable = s.unsent_email_contacts(campaign.id).await.unwrap();
  assert_eq!(emailable.len(), 1);
  assert_eq!(emailable[0].owner_name, "DOE, JOHN");

  // Empty-string emails fall through to the letter path.
  let letters = s.letter_candidates(campaign.id).await.unwrap();
  assert_eq!(letters.len(), 2);
}

#[tokio::test]
async fn sent_contacts_are_excluded_from_resend() {
  let s = store().await;
  let campaign = s.create_campaign(campaign_input()).await.unwrap();

  let ids = s
    .add_contacts(campaign.id, vec![
      contact_input("DOE, JOHN", Some("a@example.com")),
      contact_input("ROE, JANE", Some("b@example.com")),
    ])
    .await
    .unwrap();

  s.mark_email_sent(ids[0]).await.unwrap();

  let remaining = s.unsent_email_contacts(campaign.id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].id, ids[1]);
}

#[tokio::test]
async fn letter_generation_is_tracked_per_contact() {
  let s = store().await;
  let campaign = s.create_campaign(campaign_input()).await.unwrap();

  let ids = s
    .add_contacts(campaign.id, vec![
      contact_input("DOE, JOHN", None),
      contact_input("ROE, JANE", None),
    ])
    .await
    .unwrap();

  s.mark_letter_generated(ids[0]).await.unwrap();

  let remaining = s.letter_candidates(campaign.id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].id, ids[1]);
}

#[tokio::test]
async fn marking_missing_contact_fails() {
  let s = store().await;
  let err = s.mark_email_sent(42).await.unwrap_err();
  assert!(matches!(err, crate::Error::ContactNotFound(42)));
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn campaign_summary_counts_delivery_state() {
  let s = store().await;
  let campaign = s.create_campaign(campaign_input()).await.unwrap();

  let ids = s
    .add_contacts(campaign.id, vec![
      contact_input("DOE, JOHN", Some("a@example.com")),
      contact_input("ROE, JANE", Some("b@example.com")),
      contact_input("POE, EDGAR", None),
    ])
    .await
    .unwrap();
  s.mark_email_sent(ids[0]).await.unwrap();
  s.mark_letter_generated(ids[2]).await.unwrap();

  let summary = s.campaign_summary(campaign.id).await.unwrap().unwrap();
  assert_eq!(summary.contacts, 3);
  assert_eq!(summary.with_email, 2);
  assert_eq!(summary.emails_sent, 1);
  assert_eq!(summary.letters_generated, 1);

  assert!(s.campaign_summary(42).await.unwrap().is_none());
}
