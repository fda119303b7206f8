//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory store.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use axum::{
  body::Body,
  http::{header, Request, StatusCode},
  Router,
};
use plat_campaign::send::{EmailTransport, OutboundEmail, OutboxConfig, TransportError};
use plat_core::{
  campaign::NewContact,
  parcel::ParcelRecord,
  store::{CampaignStore, ParcelStore},
};
use plat_store_sqlite::SqliteStore;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{api_router, AppState};

#[derive(Default)]
struct RecordingTransport {
  sent: Mutex<Vec<OutboundEmail>>,
}

impl EmailTransport for RecordingTransport {
  async fn send(&self, message: &OutboundEmail) -> Result<(), TransportError> {
    self.sent.lock().unwrap().push(message.clone());
    Ok(())
  }
}

struct TestApp {
  store:     SqliteStore,
  transport: Arc<RecordingTransport>,
  router:    Router,
}

async fn make_app() -> TestApp {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let transport = Arc::new(RecordingTransport::default());
  let state = AppState {
    store:     Arc::new(store.clone()),
    transport: transport.clone(),
    outbox:    Arc::new(OutboxConfig {
      from_address: "offers@example.com".into(),
      send_delay:   Duration::from_millis(0),
    }),
  };
  TestApp {
    store,
    transport,
    router: api_router(state),
  }
}

fn parcel(parcel_id: &str, owner: Option<&str>, assessed: Option<f64>) -> ParcelRecord {
  ParcelRecord {
    county: "Kent".into(),
    state: "MI".into(),
    parcel_id: parcel_id.into(),
    owner_name: owner.map(Into::into),
    assessed_value: assessed,
    situs_address: Some("123 Main St".into()),
    ..Default::default()
  }
}

async fn send_json(
  router: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let response = router
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  (status, bytes.to_vec())
}

fn as_json(bytes: &[u8]) -> Value {
  serde_json::from_slice(bytes).unwrap()
}

fn create_body(test_mode: bool) -> Value {
  json!({
    "campaign_name": "august mailer",
    "county": "Kent",
    "state": "MI",
    "max_value": null,
    "offer_percentage": 60.0,
    "test_mode": test_mode,
    "test_email": if test_mode { json!("ops@example.com") } else { Value::Null },
  })
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn campaign_flows_from_parcel_to_test_mode_email() {
  let app = make_app().await;
  app
    .store
    .upsert_batch(vec![
      parcel("41-01", Some("DOE, JOHN"), Some(100_000.0)),
      parcel("41-02", Some("ACME TRUST"), Some(90_000.0)),
    ])
    .await
    .unwrap();

  let (status, body) =
    send_json(&app.router, "POST", "/campaigns", Some(create_body(true))).await;
  assert_eq!(status, StatusCode::CREATED);
  let created = as_json(&body);
  assert_eq!(created["contacts_added"], 1);
  assert_eq!(created["test_mode"], true);
  let id = created["campaign_id"].as_i64().unwrap();

  let (status, body) =
    send_json(&app.router, "GET", &format!("/campaigns/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  let summary = as_json(&body);
  assert_eq!(summary["contacts"], 1);
  assert_eq!(summary["with_email"], 1);
  assert_eq!(summary["emails_sent"], 0);

  let (status, body) = send_json(
    &app.router,
    "POST",
    &format!("/campaigns/{id}/send-emails"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let report = as_json(&body);
  assert_eq!(report["sent"], 1);
  assert_eq!(report["failed"], 0);

  let messages = app.transport.sent.lock().unwrap().clone();
  assert_eq!(messages.len(), 1);
  assert_eq!(messages[0].to, "ops@example.com");
  assert_eq!(messages[0].from, "offers@example.com");
  assert!(messages[0].body.contains("TEST MODE"));
  assert!(messages[0].body.contains("test.john.doe@example.com"));
  assert!(messages[0].body.contains("$60,000"));

  // The send batch is idempotent across requests.
  let (_, body) = send_json(
    &app.router,
    "POST",
    &format!("/campaigns/{id}/send-emails"),
    None,
  )
  .await;
  assert_eq!(as_json(&body)["attempted"], 0);
}

#[tokio::test]
async fn letters_cover_contacts_without_email() {
  let app = make_app().await;
  let (_, body) =
    send_json(&app.router, "POST", "/campaigns", Some(create_body(true))).await;
  let id = as_json(&body)["campaign_id"].as_i64().unwrap();

  // An email-less contact, as a live-mode heuristic miss would produce.
  app
    .store
    .add_contacts(id, vec![NewContact {
      parcel_id:        Some("41-01".into()),
      owner_name:       "ROE, JANE".into(),
      first_name:       "Jane".into(),
      last_name:        "Roe".into(),
      email:            None,
      mailing_address:  None,
      mailing_city:     None,
      mailing_state:    None,
      mailing_zip:      None,
      property_address: Some("9 Elm Ave".into()),
      property_city:    None,
      property_zip:     None,
      assessed_value:   Some(80_000.0),
    }])
    .await
    .unwrap();

  let (status, body) = send_json(
    &app.router,
    "POST",
    &format!("/campaigns/{id}/generate-letters"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let report = as_json(&body);
  assert_eq!(report["generated"], 1);
  assert_eq!(report["letters"][0]["recipient"], "Jane Roe");
  assert!(report["letters"][0]["body"]
    .as_str()
    .unwrap()
    .contains("$48,000"));

  // Rerun finds nothing left.
  let (_, body) = send_json(
    &app.router,
    "POST",
    &format!("/campaigns/{id}/generate-letters"),
    None,
  )
  .await;
  assert_eq!(as_json(&body)["generated"], 0);
}

// ─── Parcels and export ──────────────────────────────────────────────────────

#[tokio::test]
async fn parcels_endpoint_applies_filters() {
  let app = make_app().await;
  app
    .store
    .upsert_batch(vec![
      parcel("41-01", None, Some(100_000.0)),
      parcel("41-02", None, Some(400_000.0)),
    ])
    .await
    .unwrap();

  let (status, body) = send_json(
    &app.router,
    "GET",
    "/parcels?county=Kent&state=MI&max_value=150000",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let parcels = as_json(&body);
  assert_eq!(parcels.as_array().unwrap().len(), 1);
  assert_eq!(parcels[0]["parcel_id"], "41-01");
}

#[tokio::test]
async fn export_returns_csv_reports() {
  let app = make_app().await;
  app
    .store
    .upsert_batch(vec![parcel("41-01", Some("DOE, JOHN"), Some(100_000.0))])
    .await
    .unwrap();
  let (_, body) =
    send_json(&app.router, "POST", "/campaigns", Some(create_body(true))).await;
  let id = as_json(&body)["campaign_id"].as_i64().unwrap();

  let (status, body) = send_json(
    &app.router,
    "GET",
    "/export?report=parcels&county=Kent",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let text = String::from_utf8(body).unwrap();
  assert!(text.starts_with("county,state,parcel_id"));
  assert!(text.contains("41-01"));

  let (status, body) = send_json(
    &app.router,
    "GET",
    &format!("/export?report=contacts&campaign_id={id}"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let text = String::from_utf8(body).unwrap();
  assert!(text.starts_with("first_name,last_name,email"));
  assert!(text.contains("John,Doe,test.john.doe@example.com"));
}

// ─── Error paths ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_campaign_returns_404() {
  let app = make_app().await;
  let (status, _) = send_json(&app.router, "GET", "/campaigns/42", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) =
    send_json(&app.router, "POST", "/campaigns/42/send-emails", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mode_without_test_email_is_rejected() {
  let app = make_app().await;
  let mut body = create_body(true);
  body["test_email"] = Value::Null;
  let (status, _) = send_json(&app.router, "POST", "/campaigns", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_requires_a_selector() {
  let app = make_app().await;
  let (status, _) =
    send_json(&app.router, "GET", "/export?report=contacts", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) =
    send_json(&app.router, "GET", "/export?report=parcels", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
