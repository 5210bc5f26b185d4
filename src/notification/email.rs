use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use log::{debug, info};

use crate::{config::EmailConfig, UserInput};

/// Text of the confirmation mail, contains the input verbatim
pub fn email_body(input: &UserInput) -> String {
    format!("User entered: {input}")
}

pub fn build_message(config: &EmailConfig, input: &UserInput) -> anyhow::Result<Message> {
    let from: Mailbox = config
        .from
        .parse()
        .with_context(|| format!("Invalid from email address {:?}", config.from))?;
    let to: Mailbox = config
        .to
        .parse()
        .with_context(|| format!("Invalid to email address {:?}", config.to))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(config.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email_body(input))
        .context("Failed to build email message")
}

pub struct Email<'a> {
    config: &'a EmailConfig,
}

impl<'a> Email<'a> {
    pub fn new(config: &'a EmailConfig) -> Self {
        Self { config }
    }

    /// Sends the confirmation over an implicit TLS session, one attempt only
    pub fn send(&self, input: &UserInput) -> anyhow::Result<()> {
        let message = build_message(self.config, input)?;

        debug!(
            "Connecting to {}:{} as {:?}",
            self.config.smtp_host, self.config.smtp_port, self.config.username
        );
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose().to_string(),
        );
        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .context("Failed to create SMTP transport")?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        mailer
            .send(&message)
            .context("Failed to send email via SMTP")?;
        info!("Email sent to {}", self.config.to);
        Ok(())
    }
}
