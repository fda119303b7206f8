//! Owner-name parsing.
//!
//! County rolls carry owner strings in assessor shorthand: usually
//! "LAST, FIRST", often with a joint owner glued on ("SMITH, JOHN & JANE")
//! and frequently with organizational or estate suffixes ("ACME HOLDINGS
//! LLC", "DOE JOHN ESTATE"). This module reduces such a string to a single
//! structured identity, or rejects it when no personal name can be
//! recovered.
//!
//! Joint-owner constructs are NOT split into multiple contacts; only the
//! first named party is used.

// ─── Suffix table ────────────────────────────────────────────────────────────

/// Single-token organizational/estate suffixes, compared after stripping
/// periods and uppercasing.
const ORG_SUFFIXES: &[&str] = &[
  "LLC", "LC", "INC", "CORP", "CO", "LTD", "LLP", "LP", "TRUST", "TRUSTEE",
  "TRUSTEES", "ESTATE", "EST", "ETAL", "REVOCABLE", "IRREVOCABLE",
];

/// Two-token suffix pairs ("ET AL", "ET UX", "ET VIR").
const ORG_SUFFIX_PAIRS: &[(&str, &str)] = &[("ET", "AL"), ("ET", "UX"), ("ET", "VIR")];

// ─── Parsed identity ─────────────────────────────────────────────────────────

/// A structured owner identity recovered from a raw roll string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOwner {
  pub first_name: String,
  /// Empty for single-token personal names.
  pub last_name:  String,
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a raw owner string into a [`ParsedOwner`].
///
/// Returns `None` (no contact should be created) when:
/// - the string is empty or yields zero tokens after suffix stripping, or
/// - exactly one token remains AND at least one org/estate suffix was
///   stripped — the residue is an organization name, not a person
///   ("ACME TRUST" → "ACME" → rejected).
///
/// A plain single-token name with no suffix is accepted as a
/// first-name-only identity.
pub fn parse_owner_name(raw: &str) -> Option<ParsedOwner> {
  // Joint owners: keep only the first named party.
  let head = raw.split('&').next().unwrap_or("").trim();
  if head.is_empty() {
    return None;
  }

  // "LAST, FIRST ..." — the assessor convention. Everything before the
  // first comma is the family-name segment.
  let (family_seg, given_seg) = match head.split_once(',') {
    Some((before, after)) => (before.trim(), Some(after.trim())),
    None => (head, None),
  };

  let mut stripped_any = false;
  let family_tokens = strip_suffixes(family_seg, &mut stripped_any);
  let given_tokens = given_seg
    .map(|s| strip_suffixes(s, &mut stripped_any))
    .unwrap_or_default();

  let token_count = family_tokens.len() + given_tokens.len();
  if token_count == 0 || (token_count == 1 && stripped_any) {
    return None;
  }

  let (first_name, last_name) = match (given_tokens.first(), family_tokens.as_slice()) {
    // Comma form: the whole pre-comma segment is the family name, so
    // "VAN DER BERG, JOHN" keeps all three family tokens.
    (Some(given), [_, ..]) => (title_case(given), title_case_tokens(&family_tokens)),
    // Comma form with nothing usable before the comma.
    (Some(given), []) => (title_case(given), String::new()),
    // No comma: first token → first name, last token → last name.
    (None, [single]) => (title_case(single), String::new()),
    (None, [first, .., last]) => (title_case(first), title_case(last)),
    (None, []) => return None,
  };

  Some(ParsedOwner {
    first_name,
    last_name,
  })
}

/// Tokenize one segment, dropping org/estate suffix tokens.
/// Sets `stripped_any` when anything was removed.
fn strip_suffixes(segment: &str, stripped_any: &mut bool) -> Vec<String> {
  let tokens: Vec<String> = segment
    .split_whitespace()
    .map(|t| {
      t.chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect::<String>()
        .to_uppercase()
    })
    .filter(|t| !t.is_empty())
    .collect();

  let mut kept = Vec::with_capacity(tokens.len());
  let mut i = 0;
  while i < tokens.len() {
    if i + 1 < tokens.len()
      && ORG_SUFFIX_PAIRS
        .iter()
        .any(|(a, b)| tokens[i] == *a && tokens[i + 1] == *b)
    {
      *stripped_any = true;
      i += 2;
      continue;
    }
    if ORG_SUFFIXES.contains(&tokens[i].as_str()) {
      *stripped_any = true;
      i += 1;
      continue;
    }
    kept.push(tokens[i].clone());
    i += 1;
  }
  kept
}

/// Title-case each token, joined with single spaces.
fn title_case_tokens(tokens: &[String]) -> String {
  tokens
    .iter()
    .map(|t| title_case(t))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Uppercase first letter, lowercase the rest.
fn title_case(token: &str) -> String {
  let mut chars = token.chars();
  match chars.next() {
    Some(c) => c.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parsed(first: &str, last: &str) -> ParsedOwner {
    ParsedOwner { first_name: first.into(), last_name: last.into() }
  }

  #[test]
  fn comma_form_is_last_comma_first() {
    assert_eq!(parse_owner_name("DOE, JOHN"), Some(parsed("John", "Doe")));
  }

  #[test]
  fn joint_owners_keep_only_first_party() {
    // Content after the ampersand is discarded entirely.
    assert_eq!(
      parse_owner_name("SMITH, JOHN & JANE"),
      Some(parsed("John", "Smith"))
    );
  }

  #[test]
  fn multi_token_family_segment_is_kept_whole() {
    assert_eq!(
      parse_owner_name("VAN DER BERG, JOHN"),
      Some(parsed("John", "Van Der Berg"))
    );
  }

  #[test]
  fn no_comma_takes_first_and_last_tokens() {
    assert_eq!(
      parse_owner_name("JOHN QUINCY ADAMS"),
      Some(parsed("John", "Adams"))
    );
  }

  #[test]
  fn single_token_name_is_first_name_only() {
    assert_eq!(parse_owner_name("MADONNA"), Some(parsed("Madonna", "")));
  }

  #[test]
  fn org_residue_is_rejected() {
    // Stripping TRUST leaves one token; a one-token leftover with a
    // stripped suffix is treated as an organization name, never a person.
    assert_eq!(parse_owner_name("ACME TRUST"), None);
    assert_eq!(parse_owner_name("WIDGETS LLC"), None);
    assert_eq!(parse_owner_name("SUNSHINE PROPERTIES L.L.C."), None);
  }

  #[test]
  fn personal_name_with_suffix_survives() {
    assert_eq!(
      parse_owner_name("JOHN SMITH TRUST"),
      Some(parsed("John", "Smith"))
    );
    assert_eq!(
      parse_owner_name("DOE, JOHN ET AL"),
      Some(parsed("John", "Doe"))
    );
  }

  #[test]
  fn empty_and_suffix_only_strings_are_rejected() {
    assert_eq!(parse_owner_name(""), None);
    assert_eq!(parse_owner_name("   "), None);
    assert_eq!(parse_owner_name("LLC"), None);
    assert_eq!(parse_owner_name("& JANE"), None);
  }

  #[test]
  fn spelling_variants_of_suffixes_strip() {
    assert_eq!(parse_owner_name("ACME INC."), None);
    assert_eq!(parse_owner_name("ACME ESTATE"), None);
    assert_eq!(parse_owner_name("ACME ET AL"), None);
  }
}
