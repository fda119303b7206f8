//! Offer computation and outreach rendering.
//!
//! Rendering is pure templating: identical inputs always produce identical
//! text, which is what makes outreach fixtures reproducible in tests. There
//! is no generative content here and never will be.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::campaign::CampaignContact;

// ─── Offer amount ────────────────────────────────────────────────────────────

/// A computed offer, or the sentinel used when no assessed value exists.
///
/// Callers must branch on the variant before formatting a number; the
/// placeholder is deliberately non-numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum OfferAmount {
  /// Whole currency units.
  Cash(i64),
  /// No assessed value was available; the offer is presented as
  /// "competitive cash" rather than a made-up number.
  Competitive,
}

impl OfferAmount {
  /// `assessed_value × (offer_percentage / 100)`, rounded to whole currency
  /// units. Missing assessed value yields the placeholder.
  pub fn compute(assessed_value: Option<f64>, offer_percentage: f64) -> Self {
    match assessed_value {
      Some(value) => Self::Cash((value * offer_percentage / 100.0).round() as i64),
      None => Self::Competitive,
    }
  }

  /// The phrase embedded into letters and email bodies.
  fn phrase(&self) -> String {
    match self {
      Self::Cash(amount) => format!("${}", group_thousands(*amount)),
      Self::Competitive => "a competitive cash amount".to_string(),
    }
  }
}

impl fmt::Display for OfferAmount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Cash(amount) => write!(f, "${}", group_thousands(*amount)),
      Self::Competitive => write!(f, "competitive cash"),
    }
  }
}

/// Insert `,` thousands separators into a non-negative amount.
fn group_thousands(amount: i64) -> String {
  let digits = amount.abs().to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
  if amount < 0 {
    out.push('-');
  }
  let offset = digits.len() % 3;
  for (i, c) in digits.chars().enumerate() {
    if i != 0 && (i + 3 - offset) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// A rendered email ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedEmail {
  pub subject: String,
  pub body:    String,
}

fn greeting_name(contact: &CampaignContact) -> &str {
  if contact.first_name.is_empty() { "Homeowner" } else { &contact.first_name }
}

fn property_phrase(contact: &CampaignContact) -> String {
  match contact.property_address.as_deref() {
    Some(addr) if !addr.is_empty() => format!("your property at {addr}"),
    _ => "your property".to_string(),
  }
}

/// Render the short email body.
pub fn render_email(contact: &CampaignContact, offer: &OfferAmount) -> RenderedEmail {
  let body = format!(
    "Hello {greeting},\n\n\
     I am interested in purchasing {property} for {offer}. The offer is all \
     cash, with no financing contingencies and a closing date of your \
     choosing.\n\n\
     Please let me know if you're interested!\n\n\
     Best regards",
    greeting = greeting_name(contact),
    property = property_phrase(contact),
    offer = offer.phrase(),
  );
  RenderedEmail { subject: "Cash Offer for Your Home".to_string(), body }
}

/// Prepend the test-mode banner to an email body.
///
/// The banner must name both the intended recipient and the substituted
/// test recipient so a reviewer can validate routing before a live run.
pub fn render_test_banner(
  body: &str,
  intended_recipient: Option<&str>,
  test_recipient: &str,
) -> String {
  format!(
    "*** TEST MODE: SIMULATED SEND, NOT DELIVERED ***\n\
     Intended recipient: {}\n\
     Redirected to:      {}\n\
     ************************************************\n\n\
     {}",
    intended_recipient.unwrap_or("(none on file)"),
    test_recipient,
    body,
  )
}

/// Render the longer formal letter for contacts without a resolved email.
pub fn render_letter(contact: &CampaignContact, offer: &OfferAmount) -> String {
  let full_name = match (contact.first_name.as_str(), contact.last_name.as_str()) {
    ("", "") => "Homeowner".to_string(),
    (first, "") => first.to_string(),
    (first, last) => format!("{first} {last}"),
  };
  format!(
    "Dear {full_name},\n\n\
     I am writing to express my interest in purchasing {property}.\n\n\
     After reviewing county records for the property, I am prepared to \
     offer {offer}. This is an all-cash offer with no financing \
     contingencies, no agent commissions, and a closing date of your \
     choosing.\n\n\
     If you would like to discuss this offer, please reply by mail or \
     email at your convenience. There is no obligation, and the offer \
     remains open for thirty days.\n\n\
     Sincerely",
    property = property_phrase(contact),
    offer = offer.phrase(),
  )
}
