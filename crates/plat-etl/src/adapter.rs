//! The [`SourceAdapter`] seam between upstream formats and the runner.

use std::future::Future;

use crate::{mapper::ResolvedMapping, Result};

/// One raw upstream row: column name to JSON value. Feature services hand
/// these over directly as `attributes` objects; the CSV adapter synthesizes
/// them from header + cells.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Identity and defaults for one upstream source.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
  /// Provenance string stored on every row, e.g. "Kent FeatureServer 1".
  pub source_id: String,
  pub county:    String,
  pub state:     String,
  /// Human-readable name for logs.
  pub label:     String,
}

/// One fetched page of raw records.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
  pub records:  Vec<RawRecord>,
  /// Whether the source indicated more rows past this page.
  pub has_more: bool,
}

/// A paged upstream source with a pre-resolved column mapping.
///
/// `next_page` takes an absolute row offset so interrupted runs can resume
/// where they left off.
pub trait SourceAdapter: Send + Sync {
  fn descriptor(&self) -> &SourceDescriptor;

  /// The column mapping, resolved once when the adapter was built.
  fn mapping(&self) -> &ResolvedMapping;

  fn next_page(
    &self,
    offset: usize,
    page_size: usize,
  ) -> impl Future<Output = Result<SourcePage>> + Send + '_;
}
