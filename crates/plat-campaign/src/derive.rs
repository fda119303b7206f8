//! Contact derivation: from a campaign's filtered parcel set to stored
//! outreach contacts.

use plat_core::{
  campaign::{Campaign, NewContact},
  filter::ParcelFilter,
  owner::parse_owner_name,
  store::{CampaignStore, ParcelStore},
};
use serde::Serialize;

use crate::{
  resolve::{EmailResolver, ResolveRequest},
  Error, Result,
};

/// Yield and skip counters for one derivation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DerivationReport {
  pub contacts_added:   usize,
  /// Parcels with no owner string at all.
  pub skipped_no_owner: usize,
  /// Parcels whose owner string parsed to no usable person.
  pub skipped_unparsed: usize,
}

/// Derive and persist contacts for `campaign` in one pass.
///
/// All contacts land in one store transaction; reruns append rather than
/// dedupe, so derivation is expected to run once per campaign.
pub async fn derive_contacts<S>(
  store: &S,
  campaign: &Campaign,
  resolver: &dyn EmailResolver,
) -> Result<DerivationReport>
where
  S: ParcelStore + CampaignStore,
{
  let filter = ParcelFilter {
    max_value: campaign.max_value,
    ..Default::default()
  };
  let parcels = store
    .query(&campaign.county, &campaign.state, &filter)
    .await
    .map_err(Error::store)?;

  let mut report = DerivationReport::default();
  let mut contacts = Vec::new();

  for parcel in &parcels {
    let Some(owner_name) = parcel.owner_name.as_deref() else {
      report.skipped_no_owner += 1;
      continue;
    };
    let Some(owner) = parse_owner_name(owner_name) else {
      report.skipped_unparsed += 1;
      tracing::warn!(
        campaign_id = campaign.id,
        parcel_id = %parcel.parcel_id,
        owner = owner_name,
        "owner string yielded no personal name, skipping"
      );
      continue;
    };

    let email = resolver.resolve(&ResolveRequest {
      first_name: &owner.first_name,
      last_name:  &owner.last_name,
      address:    parcel.mailing_address.as_deref(),
      city:       parcel.mailing_city.as_deref(),
      state:      parcel.mailing_state.as_deref(),
    });

    contacts.push(NewContact {
      parcel_id: Some(parcel.parcel_id.clone()),
      owner_name: owner_name.to_owned(),
      first_name: owner.first_name,
      last_name: owner.last_name,
      email,
      mailing_address: parcel.mailing_address.clone(),
      mailing_city: parcel.mailing_city.clone(),
      mailing_state: parcel.mailing_state.clone(),
      mailing_zip: parcel.mailing_zip.clone(),
      property_address: parcel.situs_address.clone(),
      property_city: parcel.city.clone(),
      property_zip: parcel.zip_code.clone(),
      assessed_value: parcel.assessed_value,
    });
  }

  report.contacts_added = contacts.len();
  if !contacts.is_empty() {
    store
      .add_contacts(campaign.id, contacts)
      .await
      .map_err(Error::store)?;
  }

  tracing::info!(
    campaign_id = campaign.id,
    parcels = parcels.len(),
    contacts_added = report.contacts_added,
    skipped_no_owner = report.skipped_no_owner,
    skipped_unparsed = report.skipped_unparsed,
    "derivation pass complete"
  );
  Ok(report)
}
