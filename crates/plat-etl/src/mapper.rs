//! Schema mapping: from whatever columns a source carries to the canonical
//! parcel fields.
//!
//! Resolution happens once per adapter against the source's header set;
//! per-row work is then plain indexed lookups. A field no synonym matches is
//! simply absent from the mapping, and every row gets `None` there — sparse
//! sources are expected, not an error.

use plat_core::parcel::ParcelRecord;
use serde_json::Value;

use crate::adapter::{RawRecord, SourceDescriptor};

// ─── Canonical fields ────────────────────────────────────────────────────────

/// Every mappable canonical column.
///
/// `StateZip` is a combined source field ("MI49503") some assessor feeds
/// carry instead of separate state/zip columns; it is split during row
/// mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
  ParcelId,
  SitusAddress,
  City,
  State,
  ZipCode,
  StateZip,
  PropertyClass,
  OwnerName,
  MailingAddress,
  MailingCity,
  MailingState,
  MailingZip,
  LandSqft,
  BuildingSqft,
  AssessedValue,
  TaxableValue,
  YearBuilt,
}

// ─── Synonym table ───────────────────────────────────────────────────────────

/// Ordered candidate column names per canonical field. Earlier entries win.
pub struct SynonymTable {
  entries: Vec<(CanonicalField, &'static [&'static str])>,
}

impl Default for SynonymTable {
  fn default() -> Self {
    use CanonicalField::*;
    Self {
      entries: vec![
        (ParcelId, &[
          "parcel", "parcel number", "pnnum", "pnum", "apn", "parcelid",
          "parcel_id", "pid",
        ]),
        (SitusAddress, &[
          "situs address", "property address", "propertyaddress", "address",
          "site address", "loc addr", "prop addr",
        ]),
        (City, &["city", "situs city", "prop city", "propaddresscity"]),
        (State, &["state", "situs state", "prop state"]),
        (ZipCode, &["zip", "zipcode", "zip code", "situs zip", "prop zip"]),
        (StateZip, &["propaddressstate_zipcode", "state_zipcode"]),
        (PropertyClass, &["property class", "propertyclass", "class", "prop class"]),
        (OwnerName, &[
          "owner", "owner name", "ownernamelong", "ownername", "owner1",
          "grantee",
        ]),
        (MailingAddress, &[
          "mailing address", "owner address", "mail address", "mail_addr",
          "mailing addr1", "mailing",
        ]),
        (MailingCity, &["mailing city", "owner city", "mail city"]),
        (MailingState, &["mailing state", "owner state", "mail state"]),
        (MailingZip, &["mailing zip", "owner zip", "mail zip", "mail zipcode"]),
        (LandSqft, &["land sqft", "lot sqft", "land sq ft", "acreage sqft"]),
        (BuildingSqft, &[
          "building sqft", "improvement sqft", "bldg sqft", "bldgsqft",
          "impr sq ft",
        ]),
        (AssessedValue, &[
          "assessed value", "sev", "state equalized value", "assessed",
        ]),
        (TaxableValue, &["taxable value", "taxable"]),
        (YearBuilt, &["year built", "yr built", "yearbuilt"]),
      ],
    }
  }
}

impl SynonymTable {
  /// Resolve this table against a source's headers, case-insensitively.
  pub fn resolve(&self, headers: &[String]) -> ResolvedMapping {
    let lowered: Vec<(String, &String)> =
      headers.iter().map(|h| (h.to_lowercase(), h)).collect();

    let mut columns = Vec::new();
    for (field, candidates) in &self.entries {
      let hit = candidates.iter().find_map(|cand| {
        lowered
          .iter()
          .find(|(lc, _)| lc == cand)
          .map(|(_, original)| (*original).clone())
      });
      if let Some(column) = hit {
        columns.push((*field, column));
      }
    }
    ResolvedMapping { columns }
  }
}

// ─── Resolved mapping ────────────────────────────────────────────────────────

/// A frozen field-to-column mapping for one source.
#[derive(Debug, Clone)]
pub struct ResolvedMapping {
  columns: Vec<(CanonicalField, String)>,
}

impl ResolvedMapping {
  pub fn column(&self, field: CanonicalField) -> Option<&str> {
    self
      .columns
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, c)| c.as_str())
  }

  fn raw<'a>(&self, record: &'a RawRecord, field: CanonicalField) -> Option<&'a Value> {
    self.column(field).and_then(|c| record.get(c))
  }

  fn text(&self, record: &RawRecord, field: CanonicalField) -> Option<String> {
    value_text(self.raw(record, field)?)
  }

  fn number(&self, record: &RawRecord, field: CanonicalField) -> Option<f64> {
    value_number(self.raw(record, field)?)
  }

  fn integer(&self, record: &RawRecord, field: CanonicalField) -> Option<i32> {
    self.number(record, field).and_then(|n| {
      let truncated = n.trunc();
      (truncated >= i32::MIN as f64 && truncated <= i32::MAX as f64)
        .then_some(truncated as i32)
    })
  }

  /// Normalize one raw row. `None` when the row carries no parcel id — such
  /// rows have no durable identity and are skipped by the runner.
  pub fn map_row(
    &self,
    record: &RawRecord,
    descriptor: &SourceDescriptor,
  ) -> Option<ParcelRecord> {
    use CanonicalField::*;

    let parcel_id = self.text(record, ParcelId)?;

    let mut state = self.text(record, State);
    let mut zip_code = self.text(record, ZipCode);
    if state.is_none()
      && zip_code.is_none()
      && let Some((st, zp)) = self.text(record, StateZip).and_then(split_state_zip)
    {
      state = Some(st);
      zip_code = zp;
    }

    Some(ParcelRecord {
      county: descriptor.county.clone(),
      state: state.unwrap_or_else(|| descriptor.state.clone()),
      parcel_id,
      situs_address: self.text(record, SitusAddress),
      city: self.text(record, City),
      zip_code,
      property_class: self.text(record, PropertyClass),
      owner_name: self.text(record, OwnerName),
      mailing_address: self.text(record, MailingAddress),
      mailing_city: self.text(record, MailingCity),
      mailing_state: self.text(record, MailingState),
      mailing_zip: self.text(record, MailingZip),
      land_sqft: self.number(record, LandSqft),
      building_sqft: self.number(record, BuildingSqft),
      assessed_value: self.number(record, AssessedValue),
      taxable_value: self.number(record, TaxableValue),
      year_built: self.integer(record, YearBuilt),
      source: Some(descriptor.source_id.clone()),
      source_updated_at: None,
    })
  }
}

// ─── Value coercion ──────────────────────────────────────────────────────────

fn value_text(v: &Value) -> Option<String> {
  let s = match v {
    Value::String(s) => s.trim().to_owned(),
    Value::Number(n) => n.to_string(),
    _ => return None,
  };
  (!s.is_empty()).then_some(s)
}

/// Numbers arrive as JSON numbers from feature services and as strings like
/// "$120,000" from CSV exports.
fn value_number(v: &Value) -> Option<f64> {
  match v {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => {
      let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
      cleaned.parse().ok()
    }
    _ => None,
  }
}

/// Split a combined "MI 49503" / "MI49503" field into (state, zip).
/// Source rows are untrusted; anything not led by a two-letter ASCII state
/// code yields `None` rather than a guess.
fn split_state_zip(s: String) -> Option<(String, Option<String>)> {
  let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
  if compact.len() < 2 || !compact.is_char_boundary(2) {
    return None;
  }
  let state = compact[..2].to_owned();
  let zip = compact[2..].to_owned();
  Some((state, (!zip.is_empty()).then_some(zip)))
}
