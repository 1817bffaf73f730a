// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::digest::Digest;

pub const DEFAULT_FROM: &str = "OSHA Monitor <alerts@localhost>";

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} missing"))
}

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// SMTP_HOST, SMTP_USER, SMTP_PASS and DIGEST_TO are required;
    /// DIGEST_FROM defaults to a local sender.
    pub fn from_env() -> Result<Self> {
        let host = required_env("SMTP_HOST")?;
        let user = required_env("SMTP_USER")?;
        let pass = required_env("SMTP_PASS")?;
        let to_addr = required_env("DIGEST_TO")?;
        let from_addr = std::env::var("DIGEST_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string());

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .with_context(|| format!("invalid SMTP_HOST {host}"))?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid DIGEST_FROM")?;
        let to = to_addr.parse().context("invalid DIGEST_TO")?;

        Ok(Self { mailer, from, to })
    }

    pub async fn send_digest(&self, digest: &Digest) -> Result<()> {
        let msg = build_message(self.from.clone(), self.to.clone(), digest)?;
        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(target: "digest", count = digest.count, to = %self.to, "digest sent");
        Ok(())
    }
}

/// Multipart/alternative message carrying both bodies.
pub fn build_message(from: Mailbox, to: Mailbox, digest: &Digest) -> Result<Message> {
    Message::builder()
        .from(from)
        .to(to)
        .subject(digest.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            digest.text.clone(),
            digest.html.clone(),
        ))
        .context("build email")
}
