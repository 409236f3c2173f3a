//! Outbound transport for inventory notifications.
//!
//! # Responsibility
//! - Describe one outbound message independently of the wire protocol.
//! - Deliver it over SMTP with a fresh session per send.
//!
//! # Invariants
//! - Sender and recipient are fixed per transport instance.
//! - `SmtpMailer` never reuses a connection across `deliver` calls.

use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Binary attachment carried by an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Protocol-neutral notification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub subject: String,
    pub body: String,
    pub attachment: MessageAttachment,
}

/// Constant parts of every notification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSettings {
    pub subject: String,
    pub attachment_name: String,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            subject: "Inventory Updated".to_string(),
            attachment_name: "inventory.xlsx".to_string(),
        }
    }
}

/// Transport-layer failure.
#[derive(Debug)]
pub enum TransportError {
    Address(AddressError),
    InvalidHeader(String),
    Compose(lettre::error::Error),
    Smtp(lettre::transport::smtp::Error),
    /// Failure reported by a non-SMTP transport.
    Rejected(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Address(err) => write!(f, "invalid mailbox: {err}"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Compose(err) => write!(f, "cannot compose message: {err}"),
            Self::Smtp(err) => write!(f, "smtp error: {err}"),
            Self::Rejected(message) => write!(f, "transport rejected message: {message}"),
        }
    }
}

impl Error for TransportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Address(err) => Some(err),
            Self::Compose(err) => Some(err),
            Self::Smtp(err) => Some(err),
            Self::InvalidHeader(_) | Self::Rejected(_) => None,
        }
    }
}

impl From<AddressError> for TransportError {
    fn from(value: AddressError) -> Self {
        Self::Address(value)
    }
}

impl From<lettre::error::Error> for TransportError {
    fn from(value: lettre::error::Error) -> Self {
        Self::Compose(value)
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(value: lettre::transport::smtp::Error) -> Self {
        Self::Smtp(value)
    }
}

/// Delivery seam used by notifier workers.
///
/// Shared across worker threads; one call is one independent session.
pub trait NotificationTransport: Send + Sync {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError>;
}

/// SMTP connection and addressing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    /// Implicit-TLS port; 465 unless configured otherwise.
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: String,
    pub recipient: String,
    pub timeout: Duration,
}

/// SMTP transport backed by `lettre`.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn open_session(&self) -> Result<SmtpTransport, TransportError> {
        let mut builder = SmtpTransport::relay(&self.settings.host)?
            .port(self.settings.port)
            .timeout(Some(self.settings.timeout));
        if let Some(password) = &self.settings.password {
            let username = self
                .settings
                .username
                .clone()
                .unwrap_or_else(|| self.settings.sender.clone());
            builder = builder.credentials(Credentials::new(username, password.clone()));
        }
        Ok(builder.build())
    }
}

impl NotificationTransport for SmtpMailer {
    fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let email = build_email(&self.settings, message)?;
        let session = self.open_session()?;
        let response = session.send(&email)?;
        debug!(
            "event=smtp_send module=notify status=ok code={}",
            response.code()
        );
        Ok(())
    }
}

/// Builds the MIME message: plain-text body plus one binary attachment.
pub fn build_email(
    settings: &SmtpSettings,
    message: &OutboundMessage,
) -> Result<Message, TransportError> {
    let from: Mailbox = settings.sender.parse()?;
    let to: Mailbox = settings.recipient.parse()?;
    let content_type = ContentType::parse(&message.attachment.content_type)
        .map_err(|err| TransportError::InvalidHeader(err.to_string()))?;

    let attachment = Attachment::new(message.attachment.filename.clone())
        .body(message.attachment.bytes.clone(), content_type);
    let email = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(message.body.clone()))
                .singlepart(attachment),
        )?;
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{build_email, MessageAttachment, OutboundMessage, SmtpSettings, TransportError};
    use crate::notify::export::XLSX_CONTENT_TYPE;
    use std::time::Duration;

    fn settings(sender: &str) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 465,
            username: None,
            password: None,
            sender: sender.to_string(),
            recipient: "stockroom@example.com".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    fn message() -> OutboundMessage {
        OutboundMessage {
            subject: "Inventory Updated".to_string(),
            body: "bolt changed".to_string(),
            attachment: MessageAttachment {
                filename: "inventory.xlsx".to_string(),
                content_type: XLSX_CONTENT_TYPE.to_string(),
                bytes: b"PK\x03\x04fake".to_vec(),
            },
        }
    }

    #[test]
    fn email_carries_subject_and_attachment() {
        let email = build_email(&settings("tracker@example.com"), &message()).unwrap();
        let formatted = String::from_utf8_lossy(&email.formatted()).into_owned();

        assert!(formatted.contains("Subject: Inventory Updated"));
        assert!(formatted.contains("inventory.xlsx"));
        assert!(formatted.contains("spreadsheetml.sheet"));
        assert!(formatted.contains("To: stockroom@example.com"));
    }

    #[test]
    fn invalid_sender_is_rejected_before_sending() {
        let err = build_email(&settings("not an address"), &message()).unwrap_err();
        assert!(matches!(err, TransportError::Address(_)));
    }
}
