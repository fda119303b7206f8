//! SQLite implementation of the plat store traits.

mod encode;
mod error;
mod schema;
mod store;

#[cfg(test)]
mod tests;

pub use error::{Error, Result};
pub use store::SqliteStore;
