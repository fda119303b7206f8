//! Parcel types — the canonical property record shared by every source.
//!
//! A [`ParcelRecord`] is the pre-persistence handoff from an ETL adapter:
//! every non-key field is optional because sources differ wildly in coverage
//! (a geometry-only feature service vs. a full assessor CSV export). The
//! persisted [`Parcel`] keeps the same optionality so partial sources can
//! enrich rows without inventing values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Natural key ─────────────────────────────────────────────────────────────

/// The durable identity of a parcel across repeated ETL runs.
///
/// Components are case-normalized (trimmed, uppercased) so that "Kent"/"kent"
/// and "mi"/"MI" collapse to one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
  pub county:    String,
  pub state:     String,
  pub parcel_id: String,
}

impl NaturalKey {
  pub fn new(county: &str, state: &str, parcel_id: &str) -> Self {
    Self {
      county:    normalize_key_component(county),
      state:     normalize_key_component(state),
      parcel_id: normalize_key_component(parcel_id),
    }
  }
}

/// Trim and uppercase one natural-key component.
pub fn normalize_key_component(s: &str) -> String {
  s.trim().to_uppercase()
}

// ─── Incoming record ─────────────────────────────────────────────────────────

/// One normalized row produced by a source adapter, not yet persisted.
///
/// `county`, `state` and `parcel_id` are required; everything else is
/// whatever the source happened to carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelRecord {
  pub county:            String,
  pub state:             String,
  pub parcel_id:         String,
  pub situs_address:     Option<String>,
  pub city:              Option<String>,
  pub zip_code:          Option<String>,
  pub property_class:    Option<String>,
  pub owner_name:        Option<String>,
  pub mailing_address:   Option<String>,
  pub mailing_city:      Option<String>,
  pub mailing_state:     Option<String>,
  pub mailing_zip:       Option<String>,
  pub land_sqft:         Option<f64>,
  pub building_sqft:     Option<f64>,
  pub assessed_value:    Option<f64>,
  pub taxable_value:     Option<f64>,
  pub year_built:        Option<i32>,
  /// Provenance string, e.g. "Kent FeatureServer 1".
  pub source:            Option<String>,
  pub source_updated_at: Option<DateTime<Utc>>,
}

impl ParcelRecord {
  pub fn natural_key(&self) -> NaturalKey {
    NaturalKey::new(&self.county, &self.state, &self.parcel_id)
  }
}

// ─── Persisted parcel ────────────────────────────────────────────────────────

/// One persisted property record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
  pub id:                i64,
  pub county:            String,
  pub state:             String,
  pub parcel_id:         String,
  pub situs_address:     Option<String>,
  pub city:              Option<String>,
  pub zip_code:          Option<String>,
  pub property_class:    Option<String>,
  pub owner_name:        Option<String>,
  pub mailing_address:   Option<String>,
  pub mailing_city:      Option<String>,
  pub mailing_state:     Option<String>,
  pub mailing_zip:       Option<String>,
  pub land_sqft:         Option<f64>,
  pub building_sqft:     Option<f64>,
  pub assessed_value:    Option<f64>,
  pub taxable_value:     Option<f64>,
  pub year_built:        Option<i32>,
  pub source:            Option<String>,
  pub source_updated_at: Option<DateTime<Utc>>,
}

impl Parcel {
  pub fn natural_key(&self) -> NaturalKey {
    NaturalKey::new(&self.county, &self.state, &self.parcel_id)
  }
}
