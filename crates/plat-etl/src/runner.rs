//! The paging ETL runner: fetch, map, upsert, repeat.

use std::time::Duration;

use plat_core::store::{ParcelStore, UpsertOutcome};
use uuid::Uuid;

use crate::{adapter::SourceAdapter, Error, Result};

/// Knobs for one run. Defaults mirror typical public feature-service limits.
#[derive(Debug, Clone)]
pub struct EtlOptions {
  pub page_size:    usize,
  pub max_pages:    usize,
  /// Absolute row offset to begin at; lets an interrupted run resume.
  pub start_offset: usize,
  /// Pause between page fetches, out of politeness to public endpoints.
  pub page_delay:   Duration,
}

impl Default for EtlOptions {
  fn default() -> Self {
    Self {
      page_size:    2000,
      max_pages:    999,
      start_offset: 0,
      page_delay:   Duration::from_millis(500),
    }
  }
}

/// What one run did, for logs and operator reports.
#[derive(Debug, Clone)]
pub struct EtlRunSummary {
  pub run_id:       Uuid,
  pub source:       String,
  pub pages:        usize,
  pub rows_seen:    usize,
  /// Rows dropped for lacking a parcel id.
  pub rows_skipped: usize,
  pub outcome:      UpsertOutcome,
  /// Offset to pass as `start_offset` to continue this run.
  pub next_offset:  usize,
}

/// Drain `adapter` into `store`, one page per transaction.
///
/// A page that maps to zero usable rows still advances the offset; an empty
/// fetch ends the run.
pub async fn run<S, A>(store: &S, adapter: &A, options: &EtlOptions) -> Result<EtlRunSummary>
where
  S: ParcelStore,
  A: SourceAdapter,
{
  let run_id = Uuid::new_v4();
  let descriptor = adapter.descriptor();
  let mapping = adapter.mapping();

  tracing::info!(
    %run_id,
    source = %descriptor.label,
    start_offset = options.start_offset,
    "starting etl run"
  );

  let mut summary = EtlRunSummary {
    run_id,
    source: descriptor.source_id.clone(),
    pages: 0,
    rows_seen: 0,
    rows_skipped: 0,
    outcome: UpsertOutcome::default(),
    next_offset: options.start_offset,
  };

  for _ in 0..options.max_pages {
    let page = adapter
      .next_page(summary.next_offset, options.page_size)
      .await?;
    if page.records.is_empty() {
      break;
    }

    let fetched = page.records.len();
    let records: Vec<_> = page
      .records
      .iter()
      .filter_map(|r| mapping.map_row(r, descriptor))
      .collect();

    summary.pages += 1;
    summary.rows_seen += fetched;
    summary.rows_skipped += fetched - records.len();
    summary.next_offset += fetched;

    if !records.is_empty() {
      let outcome = store.upsert_batch(records).await.map_err(Error::store)?;
      summary.outcome.absorb(outcome);
    }

    tracing::info!(
      %run_id,
      page = summary.pages,
      rows = fetched,
      created = summary.outcome.created,
      updated = summary.outcome.updated,
      "page upserted"
    );

    if !page.has_more {
      break;
    }
    tokio::time::sleep(options.page_delay).await;
  }

  tracing::info!(
    %run_id,
    pages = summary.pages,
    rows_seen = summary.rows_seen,
    rows_skipped = summary.rows_skipped,
    created = summary.outcome.created,
    updated = summary.outcome.updated,
    "etl run complete"
  );
  Ok(summary)
}
