//! Outreach delivery: the email send batch and the letter batch.

use std::{future::Future, time::Duration};

use plat_core::{
  campaign::CampaignContact,
  offer::{render_email, render_letter, render_test_banner, OfferAmount},
  store::CampaignStore,
};
use serde::Serialize;
use thiserror::Error;

use crate::{Error, Result};

// ─── Transport seam ──────────────────────────────────────────────────────────

/// A fully rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
  pub to:      String,
  pub from:    String,
  pub subject: String,
  pub body:    String,
}

#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// Delivery mechanism seam. Real SMTP lives behind this; the shipped
/// implementation only previews.
pub trait EmailTransport: Send + Sync {
  fn send<'a>(
    &'a self,
    message: &'a OutboundEmail,
  ) -> impl Future<Output = Result<(), TransportError>> + Send + 'a;
}

/// Logs each message instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewTransport;

impl EmailTransport for PreviewTransport {
  async fn send(&self, message: &OutboundEmail) -> Result<(), TransportError> {
    tracing::info!(
      to = %message.to,
      from = %message.from,
      subject = %message.subject,
      body = %message.body,
      "email preview (not delivered)"
    );
    Ok(())
  }
}

// ─── Outbox configuration ────────────────────────────────────────────────────

/// Outbound identity and pacing for send batches.
#[derive(Debug, Clone)]
pub struct OutboxConfig {
  pub from_address: String,
  /// Pause between consecutive sends.
  pub send_delay:   Duration,
}

impl OutboxConfig {
  fn validate(&self) -> Result<()> {
    if self.from_address.trim().is_empty() {
      return Err(Error::ConfigurationMissing("from_address"));
    }
    Ok(())
  }
}

// ─── Send batch ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SendReport {
  pub attempted: usize,
  pub sent:      usize,
  pub failed:    usize,
}

/// Send every unsent, emailable contact of a campaign.
///
/// A transport failure marks that one contact failed and moves on; its
/// `email_sent` flag stays false so the next batch retries it. In test
/// mode every message is redirected to the campaign's test address with a
/// simulation banner prepended.
pub async fn send_campaign_emails<S, T>(
  store: &S,
  config: &OutboxConfig,
  campaign_id: i64,
  transport: &T,
) -> Result<SendReport>
where
  S: CampaignStore,
  T: EmailTransport,
{
  config.validate()?;
  let campaign = store
    .get_campaign(campaign_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CampaignNotFound(campaign_id))?;

  let test_email = if campaign.test_mode {
    match campaign.test_email.as_deref() {
      Some(addr) if !addr.trim().is_empty() => Some(addr.to_owned()),
      _ => return Err(Error::ConfigurationMissing("test_email")),
    }
  } else {
    None
  };

  let candidates = store
    .unsent_email_contacts(campaign_id)
    .await
    .map_err(Error::store)?;

  let mut report = SendReport {
    attempted: candidates.len(),
    ..Default::default()
  };

  for contact in &candidates {
    // Candidates are selected on a non-empty email.
    let Some(recipient) = contact.email.clone() else {
      continue;
    };

    let offer = OfferAmount::compute(contact.assessed_value, campaign.offer_percentage);
    let rendered = render_email(contact, &offer);
    let message = match &test_email {
      Some(redirect) => OutboundEmail {
        to:      redirect.clone(),
        from:    config.from_address.clone(),
        subject: rendered.subject,
        body:    render_test_banner(&rendered.body, Some(&recipient), redirect),
      },
      None => OutboundEmail {
        to:      recipient,
        from:    config.from_address.clone(),
        subject: rendered.subject,
        body:    rendered.body,
      },
    };

    match transport.send(&message).await {
      Ok(()) => {
        store
          .mark_email_sent(contact.id)
          .await
          .map_err(Error::store)?;
        report.sent += 1;
      }
      Err(e) => {
        report.failed += 1;
        tracing::warn!(
          campaign_id,
          contact_id = contact.id,
          error = %e,
          "send failed, contact left unsent"
        );
      }
    }

    tokio::time::sleep(config.send_delay).await;
  }

  tracing::info!(
    campaign_id,
    attempted = report.attempted,
    sent = report.sent,
    failed = report.failed,
    "send batch complete"
  );
  Ok(report)
}

// ─── Letter batch ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RenderedLetter {
  pub contact_id: i64,
  pub recipient:  String,
  pub body:       String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LetterReport {
  pub generated: usize,
  pub letters:   Vec<RenderedLetter>,
}

fn letter_recipient(contact: &CampaignContact) -> String {
  match (contact.first_name.as_str(), contact.last_name.as_str()) {
    ("", "") => contact.owner_name.clone(),
    (first, "") => first.to_owned(),
    (first, last) => format!("{first} {last}"),
  }
}

/// Render a letter for every contact without an email address and flip its
/// `letter_generated` flag.
pub async fn generate_campaign_letters<S>(
  store: &S,
  campaign_id: i64,
) -> Result<LetterReport>
where
  S: CampaignStore,
{
  let campaign = store
    .get_campaign(campaign_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::CampaignNotFound(campaign_id))?;

  let candidates = store
    .letter_candidates(campaign_id)
    .await
    .map_err(Error::store)?;

  let mut report = LetterReport::default();
  for contact in &candidates {
    let offer = OfferAmount::compute(contact.assessed_value, campaign.offer_percentage);
    let body = render_letter(contact, &offer);
    store
      .mark_letter_generated(contact.id)
      .await
      .map_err(Error::store)?;
    report.letters.push(RenderedLetter {
      contact_id: contact.id,
      recipient:  letter_recipient(contact),
      body,
    });
  }
  report.generated = report.letters.len();

  tracing::info!(
    campaign_id,
    generated = report.generated,
    "letter batch complete"
  );
  Ok(report)
}
