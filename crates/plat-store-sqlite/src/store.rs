//! [`SqliteStore`] — the SQLite implementation of [`ParcelStore`] and
//! [`CampaignStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use plat_core::{
  campaign::{Campaign, CampaignContact, CampaignSummary, NewCampaign, NewContact},
  filter::ParcelFilter,
  parcel::{normalize_key_component, Parcel, ParcelRecord},
  store::{CampaignStore, ParcelStore, UpsertOutcome},
};

use crate::{
  encode::{encode_dt, RawCampaign, RawContact, RawParcel},
  schema::SCHEMA,
  Error, Result,
};

const PARCEL_COLUMNS: &str = "id, county, state, parcel_id, situs_address, city, zip_code, \
   property_class, owner_name, mailing_address, mailing_city, mailing_state, \
   mailing_zip, land_sqft, building_sqft, assessed_value, taxable_value, \
   year_built, source, source_updated_at";

const CONTACT_COLUMNS: &str = "id, campaign_id, parcel_id, owner_name, first_name, last_name, email, \
   mailing_address, mailing_city, mailing_state, mailing_zip, \
   property_address, property_city, property_zip, assessed_value, \
   email_sent, letter_generated, created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A plat store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Upsert internals ────────────────────────────────────────────────────────

/// Insert-or-merge one record inside an open transaction.
/// Returns `true` when the row was newly created.
///
/// The update path only touches columns the record provides as non-null
/// (COALESCE with the incoming value first); the insert path carries an
/// `ON CONFLICT` clause with the opposite COALESCE order so a natural-key
/// collision racing with a concurrent ETL run degrades to the same
/// field-level merge instead of a uniqueness violation.
fn upsert_one(tx: &rusqlite::Transaction<'_>, record: &ParcelRecord) -> rusqlite::Result<bool> {
  let key = record.natural_key();
  let source_updated_at = record.source_updated_at.map(encode_dt);

  let existing: Option<i64> = tx
    .query_row(
      "SELECT id FROM parcels WHERE county = ?1 AND state = ?2 AND parcel_id = ?3",
      rusqlite::params![key.county, key.state, key.parcel_id],
      |row| row.get(0),
    )
    .optional()?;

  if let Some(id) = existing {
    tx.execute(
      "UPDATE parcels SET
         situs_address     = COALESCE(?1,  situs_address),
         city              = COALESCE(?2,  city),
         zip_code          = COALESCE(?3,  zip_code),
         property_class    = COALESCE(?4,  property_class),
         owner_name        = COALESCE(?5,  owner_name),
         mailing_address   = COALESCE(?6,  mailing_address),
         mailing_city      = COALESCE(?7,  mailing_city),
         mailing_state     = COALESCE(?8,  mailing_state),
         mailing_zip       = COALESCE(?9,  mailing_zip),
         land_sqft         = COALESCE(?10, land_sqft),
         building_sqft     = COALESCE(?11, building_sqft),
         assessed_value    = COALESCE(?12, assessed_value),
         taxable_value     = COALESCE(?13, taxable_value),
         year_built        = COALESCE(?14, year_built),
         source            = COALESCE(?15, source),
         source_updated_at = COALESCE(?16, source_updated_at)
       WHERE id = ?17",
      rusqlite::params![
        record.situs_address,
        record.city,
        record.zip_code,
        record.property_class,
        record.owner_name,
        record.mailing_address,
        record.mailing_city,
        record.mailing_state,
        record.mailing_zip,
        record.land_sqft,
        record.building_sqft,
        record.assessed_value,
        record.taxable_value,
        record.year_built,
        record.source,
        source_updated_at,
        id,
      ],
    )?;
    return Ok(false);
  }

  tx.execute(
    "INSERT INTO parcels (
       county, state, parcel_id, situs_address, city, zip_code,
       property_class, owner_name, mailing_address, mailing_city,
       mailing_state, mailing_zip, land_sqft, building_sqft,
       assessed_value, taxable_value, year_built, source, source_updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
               ?15, ?16, ?17, ?18, ?19)
     ON CONFLICT(county, state, parcel_id) DO UPDATE SET
       situs_address     = COALESCE(excluded.situs_address,     situs_address),
       city              = COALESCE(excluded.city,              city),
       zip_code          = COALESCE(excluded.zip_code,          zip_code),
       property_class    = COALESCE(excluded.property_class,    property_class),
       owner_name        = COALESCE(excluded.owner_name,        owner_name),
       mailing_address   = COALESCE(excluded.mailing_address,   mailing_address),
       mailing_city      = COALESCE(excluded.mailing_city,      mailing_city),
       mailing_state     = COALESCE(excluded.mailing_state,     mailing_state),
       mailing_zip       = COALESCE(excluded.mailing_zip,       mailing_zip),
       land_sqft         = COALESCE(excluded.land_sqft,         land_sqft),
       building_sqft     = COALESCE(excluded.building_sqft,     building_sqft),
       assessed_value    = COALESCE(excluded.assessed_value,    assessed_value),
       taxable_value     = COALESCE(excluded.taxable_value,     taxable_value),
       year_built        = COALESCE(excluded.year_built,        year_built),
       source            = COALESCE(excluded.source,            source),
       source_updated_at = COALESCE(excluded.source_updated_at, source_updated_at)",
    rusqlite::params![
      key.county,
      key.state,
      key.parcel_id,
      record.situs_address,
      record.city,
      record.zip_code,
      record.property_class,
      record.owner_name,
      record.mailing_address,
      record.mailing_city,
      record.mailing_state,
      record.mailing_zip,
      record.land_sqft,
      record.building_sqft,
      record.assessed_value,
      record.taxable_value,
      record.year_built,
      record.source,
      source_updated_at,
    ],
  )?;
  Ok(true)
}

// ─── ParcelStore impl ────────────────────────────────────────────────────────

impl ParcelStore for SqliteStore {
  type Error = Error;

  async fn upsert_batch(&self, records: Vec<ParcelRecord>) -> Result<UpsertOutcome> {
    let outcome: UpsertOutcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut outcome = UpsertOutcome::default();
        for record in &records {
          if upsert_one(&tx, record)? {
            outcome.created += 1;
          } else {
            outcome.updated += 1;
          }
        }
        tx.commit()?;
        Ok(outcome)
      })
      .await?;
    Ok(outcome)
  }

  async fn query(
    &self,
    county: &str,
    state: &str,
    filter: &ParcelFilter,
  ) -> Result<Vec<Parcel>> {
    let county = normalize_key_component(county);
    let state = normalize_key_component(state);

    let raws: Vec<RawParcel> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PARCEL_COLUMNS} FROM parcels
           WHERE county = ?1 AND state = ?2
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![county, state], |row| {
            RawParcel::from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut parcels: Vec<Parcel> = raws
      .into_iter()
      .map(RawParcel::into_parcel)
      .collect::<Result<_>>()?;

    // Value/size/age criteria are applied in one place, on the domain type.
    parcels.retain(|p| filter.matches(p));
    Ok(parcels)
  }

  async fn get_parcel(
    &self,
    county: &str,
    state: &str,
    parcel_id: &str,
  ) -> Result<Option<Parcel>> {
    let county = normalize_key_component(county);
    let state = normalize_key_component(state);
    let parcel_id = normalize_key_component(parcel_id);

    let raw: Option<RawParcel> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PARCEL_COLUMNS} FROM parcels
                 WHERE county = ?1 AND state = ?2 AND parcel_id = ?3"
              ),
              rusqlite::params![county, state, parcel_id],
              |row| RawParcel::from_row(row),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParcel::into_parcel).transpose()
  }
}

// ─── CampaignStore impl ──────────────────────────────────────────────────────

impl SqliteStore {
  async fn contacts_where(
    &self,
    campaign_id: i64,
    predicate: &'static str,
  ) -> Result<Vec<CampaignContact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts
           WHERE campaign_id = ?1 {predicate}
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![campaign_id], |row| {
            RawContact::from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn set_contact_flag(&self, contact_id: i64, column: &'static str) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("UPDATE contacts SET {column} = 1 WHERE id = ?1"),
          rusqlite::params![contact_id],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::ContactNotFound(contact_id));
    }
    Ok(())
  }
}

impl CampaignStore for SqliteStore {
  type Error = Error;

  async fn create_campaign(&self, input: NewCampaign) -> Result<Campaign> {
    let campaign = Campaign {
      id:               0, // assigned below
      name:             input.name,
      county:           normalize_key_component(&input.county),
      state:            normalize_key_component(&input.state),
      max_value:        input.max_value,
      offer_percentage: input.offer_percentage,
      test_mode:        input.test_mode,
      test_email:       input.test_email,
      created_at:       Utc::now(),
    };

    let row = campaign.clone();
    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO campaigns (
             name, county, state, max_value, offer_percentage,
             test_mode, test_email, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.name,
            row.county,
            row.state,
            row.max_value,
            row.offer_percentage,
            row.test_mode,
            row.test_email,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Campaign { id, ..campaign })
  }

  async fn get_campaign(&self, id: i64) -> Result<Option<Campaign>> {
    let raw: Option<RawCampaign> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name, county, state, max_value, offer_percentage,
                      test_mode, test_email, created_at
               FROM campaigns WHERE id = ?1",
              rusqlite::params![id],
              |row| RawCampaign::from_row(row),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCampaign::into_campaign).transpose()
  }

  async fn add_contacts(
    &self,
    campaign_id: i64,
    contacts: Vec<NewContact>,
  ) -> Result<Vec<i64>> {
    let created_at = encode_dt(Utc::now());

    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let campaign_exists: bool = tx
          .query_row(
            "SELECT 1 FROM campaigns WHERE id = ?1",
            rusqlite::params![campaign_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !campaign_exists {
          return Err(tokio_rusqlite::Error::Rusqlite(
            rusqlite::Error::QueryReturnedNoRows,
          ));
        }

        let mut ids = Vec::with_capacity(contacts.len());
        {
          let mut stmt = tx.prepare(
            "INSERT INTO contacts (
               campaign_id, parcel_id, owner_name, first_name, last_name,
               email, mailing_address, mailing_city, mailing_state,
               mailing_zip, property_address, property_city, property_zip,
               assessed_value, email_sent, letter_generated, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                       ?13, ?14, 0, 0, ?15)",
          )?;
          for contact in &contacts {
            stmt.execute(rusqlite::params![
              campaign_id,
              contact.parcel_id,
              contact.owner_name,
              contact.first_name,
              contact.last_name,
              contact.email,
              contact.mailing_address,
              contact.mailing_city,
              contact.mailing_state,
              contact.mailing_zip,
              contact.property_address,
              contact.property_city,
              contact.property_zip,
              contact.assessed_value,
              created_at,
            ])?;
            ids.push(tx.last_insert_rowid());
          }
        }
        tx.commit()?;
        Ok(ids)
      })
      .await
      .map_err(|e| match e {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows) => {
          Error::CampaignNotFound(campaign_id)
        }
        other => Error::Database(other),
      })?;

    Ok(ids)
  }

  async fn list_contacts(&self, campaign_id: i64) -> Result<Vec<CampaignContact>> {
    self.contacts_where(campaign_id, "").await
  }

  async fn unsent_email_contacts(&self, campaign_id: i64) -> Result<Vec<CampaignContact>> {
    self
      .contacts_where(
        campaign_id,
        "AND email_sent = 0 AND email IS NOT NULL AND email != ''",
      )
      .await
  }

  async fn letter_candidates(&self, campaign_id: i64) -> Result<Vec<CampaignContact>> {
    self
      .contacts_where(
        campaign_id,
        "AND letter_generated = 0 AND (email IS NULL OR email = '')",
      )
      .await
  }

  async fn mark_email_sent(&self, contact_id: i64) -> Result<()> {
    self.set_contact_flag(contact_id, "email_sent").await
  }

  async fn mark_letter_generated(&self, contact_id: i64) -> Result<()> {
    self.set_contact_flag(contact_id, "letter_generated").await
  }

  async fn campaign_summary(&self, campaign_id: i64) -> Result<Option<CampaignSummary>> {
    let campaign = match self.get_campaign(campaign_id).await? {
      Some(c) => c,
      None => return Ok(None),
    };

    let (contacts, with_email, emails_sent, letters_generated): (u64, u64, u64, u64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COUNT(*),
             COALESCE(SUM(CASE WHEN email IS NOT NULL AND email != '' THEN 1 ELSE 0 END), 0),
             COALESCE(SUM(email_sent), 0),
             COALESCE(SUM(letter_generated), 0)
           FROM contacts WHERE campaign_id = ?1",
          rusqlite::params![campaign_id],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?)
      })
      .await?;

    Ok(Some(CampaignSummary {
      campaign,
      contacts,
      with_email,
      emails_sent,
      letters_generated,
    }))
  }
}
