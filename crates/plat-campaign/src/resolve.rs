//! Email resolution.
//!
//! There is no reliable public mapping from an assessor owner name to an
//! email address, so resolution is a capability seam: a deterministic
//! implementation for test campaigns and a pattern-guessing heuristic for
//! live ones. A `None` outcome is normal and routes the contact to the
//! letter path instead.

use rand_core::{OsRng, RngCore};

/// Identity fields available when guessing an address. The mailing fields
/// are carried for locality-aware implementations; neither built-in
/// resolver consults them.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
  pub first_name: &'a str,
  pub last_name:  &'a str,
  pub address:    Option<&'a str>,
  pub city:       Option<&'a str>,
  pub state:      Option<&'a str>,
}

pub trait EmailResolver: Send + Sync {
  fn resolve(&self, request: &ResolveRequest<'_>) -> Option<String>;
}

// ─── Deterministic (test campaigns) ──────────────────────────────────────────

/// Produces a stable, obviously-fake address for every named contact.
/// Used by test-mode campaigns so fixtures are reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicResolver;

impl EmailResolver for DeterministicResolver {
  fn resolve(&self, request: &ResolveRequest<'_>) -> Option<String> {
    let first = request.first_name.trim().to_lowercase();
    if first.is_empty() {
      return None;
    }
    let last = request.last_name.trim().to_lowercase();
    if last.is_empty() {
      Some(format!("test.{first}@example.com"))
    } else {
      Some(format!("test.{first}.{last}@example.com"))
    }
  }
}

// ─── Heuristic (live campaigns) ──────────────────────────────────────────────

const COMMON_DOMAINS: &[&str] =
  &["gmail.com", "yahoo.com", "hotmail.com", "outlook.com", "aol.com"];

/// Percentage of contacts the heuristic claims an address for. Most guesses
/// would bounce anyway; keeping the rate low keeps the letter path primary.
const HIT_RATE_PERCENT: u32 = 15;

/// Guesses `first.last` / `flast` / `firstlast` patterns against common
/// consumer domains. No accuracy is promised or implied.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicResolver;

impl EmailResolver for HeuristicResolver {
  fn resolve(&self, request: &ResolveRequest<'_>) -> Option<String> {
    let first = request.first_name.trim().to_lowercase();
    let last = request.last_name.trim().to_lowercase();
    if first.is_empty() || last.is_empty() {
      return None;
    }

    if OsRng.next_u32() % 100 >= HIT_RATE_PERCENT {
      return None;
    }

    let initial: String = first.chars().take(1).collect();
    let local = match OsRng.next_u32() % 3 {
      0 => format!("{first}.{last}"),
      1 => format!("{initial}{last}"),
      _ => format!("{first}{last}"),
    };
    let domain = COMMON_DOMAINS[(OsRng.next_u32() as usize) % COMMON_DOMAINS.len()];
    Some(format!("{local}@{domain}"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn req<'a>(first: &'a str, last: &'a str) -> ResolveRequest<'a> {
    ResolveRequest {
      first_name: first,
      last_name:  last,
      address:    None,
      city:       None,
      state:      None,
    }
  }

  #[test]
  fn deterministic_resolver_is_stable_and_lowercase() {
    let r = DeterministicResolver;
    let req = req("John", "Doe");
    assert_eq!(r.resolve(&req).as_deref(), Some("test.john.doe@example.com"));
    assert_eq!(r.resolve(&req), r.resolve(&req));
  }

  #[test]
  fn deterministic_resolver_handles_first_name_only() {
    let r = DeterministicResolver;
    assert_eq!(
      r.resolve(&req("Madonna", "")).as_deref(),
      Some("test.madonna@example.com")
    );
  }

  #[test]
  fn deterministic_resolver_rejects_empty_names() {
    let r = DeterministicResolver;
    assert_eq!(r.resolve(&req("  ", "Doe")), None);
  }

  #[test]
  fn mailing_context_does_not_change_the_deterministic_result() {
    let r = DeterministicResolver;
    let with_context = ResolveRequest {
      address: Some("100 Division Ave"),
      city: Some("Grand Rapids"),
      state: Some("MI"),
      ..req("John", "Doe")
    };
    assert_eq!(r.resolve(&with_context), r.resolve(&req("John", "Doe")));
  }

  #[test]
  fn heuristic_resolver_needs_both_names() {
    let r = HeuristicResolver;
    assert_eq!(r.resolve(&req("John", "")), None);
  }

  #[test]
  fn heuristic_hits_are_plausible_addresses() {
    let r = HeuristicResolver;
    let req = req("John", "Doe");
    // The hit rate is random; only the shape of any hit is asserted.
    for _ in 0..200 {
      if let Some(email) = r.resolve(&req) {
        let (local, domain) = email.split_once('@').unwrap();
        assert!(["john.doe", "jdoe", "johndoe"].contains(&local));
        assert!(COMMON_DOMAINS.contains(&domain));
      }
    }
  }
}
