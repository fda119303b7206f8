//! Campaign operations: contact derivation, email resolution, outreach
//! delivery and CSV reporting.
//!
//! Everything here is generic over the store traits; the concrete SQLite
//! backend only appears in tests.

pub mod derive;
mod error;
pub mod export;
pub mod resolve;
pub mod send;

pub use error::{Error, Result};
