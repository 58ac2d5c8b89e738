//! Outgoing mail. Delivery is left to infrastructure; the shipped mailer
//! writes each message to the log.

use async_trait::async_trait;

use crate::models::{Event, User};
use crate::utils::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> AppResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> AppResult<()> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "Outgoing mail (logged, not delivered)"
        );
        Ok(())
    }
}

/// Sends `mail`, logging instead of failing the request when delivery breaks.
pub async fn send_or_log(mailer: &dyn Mailer, mail: OutgoingMail) {
    let to = mail.to.clone();
    let subject = mail.subject.clone();
    if let Err(e) = mailer.send(mail).await {
        tracing::warn!(error = %e, to = %to, subject = %subject, "Mail delivery failed");
    }
}

pub fn activation_mail(user: &User, link: &str) -> OutgoingMail {
    OutgoingMail {
        to: user.email.clone(),
        subject: "Activate your account".to_string(),
        body: format!(
            "Hi {},\n\nPlease activate your account by visiting:\n{link}\n",
            user.username
        ),
    }
}

pub fn password_reset_mail(user: &User, link: &str) -> OutgoingMail {
    OutgoingMail {
        to: user.email.clone(),
        subject: "Reset your password".to_string(),
        body: format!(
            "Hi {},\n\nYou asked to reset your password. Choose a new one here:\n{link}\n\n\
             If you did not ask for this, ignore this message.\n",
            user.username
        ),
    }
}

pub fn rsvp_confirmation_mail(user: &User, event: &Event) -> OutgoingMail {
    OutgoingMail {
        to: user.email.clone(),
        subject: format!("RSVP confirmed: {}", event.name),
        body: format!(
            "Hi {},\n\nYou are attending {} on {} at {} in {}.\n",
            user.username,
            event.name,
            event.date.format("%B %d, %Y"),
            event.time.format("%I:%M %p"),
            event.location
        ),
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every message so tests can follow links out of them.
    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<OutgoingMail> {
            self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
        }

        /// The first path under `prefix` found in the last mail sent to `to`.
        pub fn last_link_to(&self, to: &str, prefix: &str) -> Option<String> {
            self.sent()
                .iter()
                .rev()
                .find(|mail| mail.to == to)
                .and_then(|mail| {
                    let start = mail.body.find(prefix)?;
                    let rest = &mail.body[start..];
                    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                    Some(rest[..end].to_string())
                })
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutgoingMail) -> AppResult<()> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(mail);
            }
            Ok(())
        }
    }
}
