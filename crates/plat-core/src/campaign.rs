//! Campaign and contact types.
//!
//! A campaign is one named outreach run (filter + offer percentage + test
//! flag). Its contacts are derived once from the filtered parcel set and are
//! append-only afterwards; only the two delivery flags ever change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Campaign ────────────────────────────────────────────────────────────────

/// One outreach configuration. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
  pub id:               i64,
  pub name:             String,
  pub county:           String,
  pub state:            String,
  /// Upper bound on assessed/taxable value used when deriving contacts.
  pub max_value:        Option<f64>,
  pub offer_percentage: f64,
  /// When set, sends are simulated and redirected to `test_email`.
  pub test_mode:        bool,
  pub test_email:       Option<String>,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::CampaignStore::create_campaign`].
/// `created_at` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewCampaign {
  pub name:             String,
  pub county:           String,
  pub state:            String,
  pub max_value:        Option<f64>,
  pub offer_percentage: f64,
  pub test_mode:        bool,
  pub test_email:       Option<String>,
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// One derived outreach target, owned by exactly one campaign.
///
/// `parcel_id` is a weak reference back to the originating parcel — lookup
/// only, never enforced, since parcels may be re-ingested or deleted
/// independently of outreach history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignContact {
  pub id:               i64,
  pub campaign_id:      i64,
  pub parcel_id:        Option<String>,
  /// The owner string exactly as the source carried it.
  pub owner_name:       String,
  pub first_name:       String,
  pub last_name:        String,
  pub email:            Option<String>,
  pub mailing_address:  Option<String>,
  pub mailing_city:     Option<String>,
  pub mailing_state:    Option<String>,
  pub mailing_zip:      Option<String>,
  pub property_address: Option<String>,
  pub property_city:    Option<String>,
  pub property_zip:     Option<String>,
  pub assessed_value:   Option<f64>,
  pub email_sent:       bool,
  pub letter_generated: bool,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::CampaignStore::add_contacts`].
/// Both delivery flags start false; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewContact {
  pub parcel_id:        Option<String>,
  pub owner_name:       String,
  pub first_name:       String,
  pub last_name:        String,
  pub email:            Option<String>,
  pub mailing_address:  Option<String>,
  pub mailing_city:     Option<String>,
  pub mailing_state:    Option<String>,
  pub mailing_zip:      Option<String>,
  pub property_address: Option<String>,
  pub property_city:    Option<String>,
  pub property_zip:     Option<String>,
  pub assessed_value:   Option<f64>,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Per-campaign aggregated delivery counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
  pub campaign:          Campaign,
  pub contacts:          u64,
  pub with_email:        u64,
  pub emails_sent:       u64,
  pub letters_generated: u64,
}
