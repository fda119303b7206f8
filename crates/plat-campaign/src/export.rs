//! CSV report exports for mail-merge and analysis tooling.

use plat_core::{campaign::CampaignContact, parcel::Parcel};

use crate::{Error, Result};

fn opt_str(v: &Option<String>) -> String {
  v.clone().unwrap_or_default()
}

fn opt_num(v: Option<f64>) -> String {
  v.map(|n| n.to_string()).unwrap_or_default()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
  let bytes = writer
    .into_inner()
    .map_err(|e| Error::Export(e.to_string()))?;
  String::from_utf8(bytes).map_err(|e| Error::Export(e.to_string()))
}

/// All canonical parcel columns, one row per parcel, store iteration order.
pub fn parcels_csv(parcels: &[Parcel]) -> Result<String> {
  let mut w = csv::Writer::from_writer(Vec::new());
  w.write_record([
    "county",
    "state",
    "parcel_id",
    "situs_address",
    "city",
    "zip_code",
    "property_class",
    "owner_name",
    "mailing_address",
    "mailing_city",
    "mailing_state",
    "mailing_zip",
    "land_sqft",
    "building_sqft",
    "assessed_value",
    "taxable_value",
    "year_built",
    "source",
    "source_updated_at",
  ])?;
  for p in parcels {
    w.write_record([
      p.county.clone(),
      p.state.clone(),
      p.parcel_id.clone(),
      opt_str(&p.situs_address),
      opt_str(&p.city),
      opt_str(&p.zip_code),
      opt_str(&p.property_class),
      opt_str(&p.owner_name),
      opt_str(&p.mailing_address),
      opt_str(&p.mailing_city),
      opt_str(&p.mailing_state),
      opt_str(&p.mailing_zip),
      opt_num(p.land_sqft),
      opt_num(p.building_sqft),
      opt_num(p.assessed_value),
      opt_num(p.taxable_value),
      p.year_built.map(|y| y.to_string()).unwrap_or_default(),
      opt_str(&p.source),
      p.source_updated_at
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default(),
    ])?;
  }
  finish(w)
}

/// The mail-merge contact sheet.
pub fn contacts_csv(contacts: &[CampaignContact]) -> Result<String> {
  let mut w = csv::Writer::from_writer(Vec::new());
  w.write_record([
    "first_name",
    "last_name",
    "email",
    "mailing_address",
    "city",
    "state",
    "zip",
    "property_address",
    "assessed_value",
    "email_sent",
    "letter_generated",
  ])?;
  for c in contacts {
    w.write_record([
      c.first_name.clone(),
      c.last_name.clone(),
      opt_str(&c.email),
      opt_str(&c.mailing_address),
      opt_str(&c.mailing_city),
      opt_str(&c.mailing_state),
      opt_str(&c.mailing_zip),
      opt_str(&c.property_address),
      opt_num(c.assessed_value),
      c.email_sent.to_string(),
      c.letter_generated.to_string(),
    ])?;
  }
  finish(w)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn contact() -> CampaignContact {
    CampaignContact {
      id:               1,
      campaign_id:      1,
      parcel_id:        Some("41-01".into()),
      owner_name:       "DOE, JOHN".into(),
      first_name:       "John".into(),
      last_name:        "Doe".into(),
      email:            Some("john@example.com".into()),
      mailing_address:  Some("100 Division Ave".into()),
      mailing_city:     Some("Grand Rapids".into()),
      mailing_state:    Some("MI".into()),
      mailing_zip:      Some("49503".into()),
      property_address: Some("123 Main St".into()),
      property_city:    Some("Grand Rapids".into()),
      property_zip:     Some("49503".into()),
      assessed_value:   Some(100_000.0),
      email_sent:       true,
      letter_generated: false,
      created_at:       Utc::now(),
    }
  }

  fn parcel() -> Parcel {
    Parcel {
      id:                1,
      county:            "KENT".into(),
      state:             "MI".into(),
      parcel_id:         "41-01".into(),
      situs_address:     Some("123 Main St".into()),
      city:              Some("Grand Rapids".into()),
      zip_code:          Some("49503".into()),
      property_class:    None,
      owner_name:        Some("DOE, JOHN".into()),
      mailing_address:   None,
      mailing_city:      None,
      mailing_state:     None,
      mailing_zip:       None,
      land_sqft:         None,
      building_sqft:     Some(1200.0),
      assessed_value:    Some(100_000.0),
      taxable_value:     None,
      year_built:        Some(1948),
      source:            Some("Kent FeatureServer 1".into()),
      source_updated_at: None,
    }
  }

  #[test]
  fn contact_sheet_has_the_mail_merge_header() {
    let csv = contacts_csv(&[contact()]).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
      lines.next().unwrap(),
      "first_name,last_name,email,mailing_address,city,state,zip,\
       property_address,assessed_value,email_sent,letter_generated"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("John,Doe,john@example.com,100 Division Ave"));
    assert!(row.ends_with("true,false"));
  }

  #[test]
  fn parcel_export_round_trips_optional_fields_as_blanks() {
    let csv = parcels_csv(&[parcel()]).unwrap();
    let mut lines = csv.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("county,state,parcel_id"));
    let row = lines.next().unwrap();
    assert!(row.contains("KENT,MI,41-01"));
    assert!(row.contains("1948"));
    // taxable_value is unset and must export as an empty cell.
    assert!(row.contains(",,1948"));
  }

  #[test]
  fn empty_input_yields_header_only() {
    let csv = contacts_csv(&[]).unwrap();
    assert_eq!(csv.lines().count(), 1);
  }
}
