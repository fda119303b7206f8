//! Core types and trait definitions for the plat parcel-outreach pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing heavier than serde.

pub mod campaign;
pub mod filter;
pub mod offer;
pub mod owner;
pub mod parcel;
pub mod store;
