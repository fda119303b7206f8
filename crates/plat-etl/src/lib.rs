//! Source ingestion: schema mapping, source adapters and the paging runner.
//!
//! An adapter yields pages of raw records; the mapper normalizes them into
//! [`plat_core::parcel::ParcelRecord`]s; the runner pushes each page through
//! the store's batch upsert with a polite inter-page delay.

pub mod adapter;
pub mod csv_file;
mod error;
pub mod feature_service;
pub mod mapper;
pub mod runner;


pub use error::{Error, Result};
