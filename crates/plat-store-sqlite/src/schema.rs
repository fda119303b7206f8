//! SQL schema for the plat SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per property; natural key (county, state, parcel_id) is stored
-- case-normalized and enforced unique regardless of how many ETL runs
-- reprocess the same upstream page.
CREATE TABLE IF NOT EXISTS parcels (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    county            TEXT NOT NULL,
    state             TEXT NOT NULL,
    parcel_id         TEXT NOT NULL,
    situs_address     TEXT,
    city              TEXT,
    zip_code          TEXT,
    property_class    TEXT,
    owner_name        TEXT,
    mailing_address   TEXT,
    mailing_city      TEXT,
    mailing_state     TEXT,
    mailing_zip       TEXT,
    land_sqft         REAL,
    building_sqft     REAL,
    assessed_value    REAL,
    taxable_value     REAL,
    year_built        INTEGER,
    source            TEXT,
    source_updated_at TEXT             -- ISO 8601 UTC
);

CREATE UNIQUE INDEX IF NOT EXISTS parcels_natural_key_idx
    ON parcels(county, state, parcel_id);
CREATE INDEX IF NOT EXISTS parcels_county_state_idx
    ON parcels(county, state);

-- Campaigns are immutable after creation.
CREATE TABLE IF NOT EXISTS campaigns (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT NOT NULL,
    county           TEXT NOT NULL,
    state            TEXT NOT NULL,
    max_value        REAL,
    offer_percentage REAL NOT NULL,
    test_mode        INTEGER NOT NULL DEFAULT 0,
    test_email       TEXT,
    created_at       TEXT NOT NULL
);

-- Contacts are append-only outreach history. Only the two delivery flags
-- are ever updated; rows are never deleted.
CREATE TABLE IF NOT EXISTS contacts (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_id      INTEGER NOT NULL REFERENCES campaigns(id),
    parcel_id        TEXT,            -- weak reference, lookup only
    owner_name       TEXT NOT NULL,
    first_name       TEXT NOT NULL,
    last_name        TEXT NOT NULL,
    email            TEXT,
    mailing_address  TEXT,
    mailing_city     TEXT,
    mailing_state    TEXT,
    mailing_zip      TEXT,
    property_address TEXT,
    property_city    TEXT,
    property_zip     TEXT,
    assessed_value   REAL,
    email_sent       INTEGER NOT NULL DEFAULT 0,
    letter_generated INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contacts_campaign_idx ON contacts(campaign_id);

PRAGMA user_version = 1;
";
