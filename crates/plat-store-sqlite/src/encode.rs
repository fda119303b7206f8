//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Booleans are INTEGER 0/1.

use chrono::{DateTime, Utc};
use plat_core::{
  campaign::{Campaign, CampaignContact},
  parcel::Parcel,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `parcels` row.
pub struct RawParcel {
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
  pub source_updated_at: Option<String>,
}

impl RawParcel {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      county:            row.get(1)?,
      state:             row.get(2)?,
      parcel_id:         row.get(3)?,
      situs_address:     row.get(4)?,
      city:              row.get(5)?,
      zip_code:          row.get(6)?,
      property_class:    row.get(7)?,
      owner_name:        row.get(8)?,
      mailing_address:   row.get(9)?,
      mailing_city:      row.get(10)?,
      mailing_state:     row.get(11)?,
      mailing_zip:       row.get(12)?,
      land_sqft:         row.get(13)?,
      building_sqft:     row.get(14)?,
      assessed_value:    row.get(15)?,
      taxable_value:     row.get(16)?,
      year_built:        row.get(17)?,
      source:            row.get(18)?,
      source_updated_at: row.get(19)?,
    })
  }

  pub fn into_parcel(self) -> Result<Parcel> {
    let source_updated_at = self
      .source_updated_at
      .as_deref()
      .map(decode_dt)
      .transpose()?;
    Ok(Parcel {
      id: self.id,
      county: self.county,
      state: self.state,
      parcel_id: self.parcel_id,
      situs_address: self.situs_address,
      city: self.city,
      zip_code: self.zip_code,
      property_class: self.property_class,
      owner_name: self.owner_name,
      mailing_address: self.mailing_address,
      mailing_city: self.mailing_city,
      mailing_state: self.mailing_state,
      mailing_zip: self.mailing_zip,
      land_sqft: self.land_sqft,
      building_sqft: self.building_sqft,
      assessed_value: self.assessed_value,
      taxable_value: self.taxable_value,
      year_built: self.year_built,
      source: self.source,
      source_updated_at,
    })
  }
}

/// Raw values read directly from a `campaigns` row.
pub struct RawCampaign {
  pub id:               i64,
  pub name:             String,
  pub county:           String,
  pub state:            String,
  pub max_value:        Option<f64>,
  pub offer_percentage: f64,
  pub test_mode:        bool,
  pub test_email:       Option<String>,
  pub created_at:       String,
}

impl RawCampaign {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      name:             row.get(1)?,
      county:           row.get(2)?,
      state:            row.get(3)?,
      max_value:        row.get(4)?,
      offer_percentage: row.get(5)?,
      test_mode:        row.get(6)?,
      test_email:       row.get(7)?,
      created_at:       row.get(8)?,
    })
  }

  pub fn into_campaign(self) -> Result<Campaign> {
    let created_at = decode_dt(&self.created_at)?;
    Ok(Campaign {
      id: self.id,
      name: self.name,
      county: self.county,
      state: self.state,
      max_value: self.max_value,
      offer_percentage: self.offer_percentage,
      test_mode: self.test_mode,
      test_email: self.test_email,
      created_at,
    })
  }
}

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub id:               i64,
  pub campaign_id:      i64,
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
  pub email_sent:       bool,
  pub letter_generated: bool,
  pub created_at:       String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      campaign_id:      row.get(1)?,
      parcel_id:        row.get(2)?,
      owner_name:       row.get(3)?,
      first_name:       row.get(4)?,
      last_name:        row.get(5)?,
      email:            row.get(6)?,
      mailing_address:  row.get(7)?,
      mailing_city:     row.get(8)?,
      mailing_state:    row.get(9)?,
      mailing_zip:      row.get(10)?,
      property_address: row.get(11)?,
      property_city:    row.get(12)?,
      property_zip:     row.get(13)?,
      assessed_value:   row.get(14)?,
      email_sent:       row.get(15)?,
      letter_generated: row.get(16)?,
      created_at:       row.get(17)?,
    })
  }

  pub fn into_contact(self) -> Result<CampaignContact> {
    let created_at = decode_dt(&self.created_at)?;
    Ok(CampaignContact {
      id: self.id,
      campaign_id: self.campaign_id,
      parcel_id: self.parcel_id,
      owner_name: self.owner_name,
      first_name: self.first_name,
      last_name: self.last_name,
      email: self.email,
      mailing_address: self.mailing_address,
      mailing_city: self.mailing_city,
      mailing_state: self.mailing_state,
      mailing_zip: self.mailing_zip,
      property_address: self.property_address,
      property_city: self.property_city,
      property_zip: self.property_zip,
      assessed_value: self.assessed_value,
      email_sent: self.email_sent,
      letter_generated: self.letter_generated,
      created_at,
    })
  }
}
