use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::transport::{MailTransport, OutboundMail, TransportFailure};
use crate::config::MailConfig;

pub const SENT_MESSAGE: &str =
    "Bedankt voor uw bericht! We nemen zo snel mogelijk contact met u op.";

/// Fields posted by the public contact form. Absent fields arrive as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactSubmission {
    fn fields(&self) -> [&str; 5] {
        [
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.subject.as_str(),
            self.message.as_str(),
        ]
    }
}

/// Rejections raised before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Vul alstublieft alle velden in.")]
    MissingFields,
    #[error("Vul alstublieft een geldig e-mailadres in.")]
    MalformedEmail,
}

/// Transport failures, grouped by what the visitor should be told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryFailure {
    #[error("Het bericht kon niet worden verzonden door een probleem met de mailserver. Probeer het later opnieuw of neem telefonisch contact met ons op.")]
    AuthFailure,
    #[error("De mailserver is op dit moment niet bereikbaar. Probeer het later opnieuw.")]
    ConnectionRefused,
    #[error("Het bericht kon niet worden verzonden omdat de mailinstellingen ongeldig zijn. Neem telefonisch contact met ons op.")]
    InvalidCredentialsMessage,
    #[error("Er is iets misgegaan bij het verzenden van uw bericht. Probeer het later opnieuw.")]
    GenericFailure,
}

impl DeliveryFailure {
    pub fn classify(failure: &TransportFailure) -> Self {
        match (failure.code.as_deref(), failure.response_code) {
            (Some("EAUTH"), _) | (_, Some(535)) => Self::AuthFailure,
            (Some("ECONNREFUSED"), _) => Self::ConnectionRefused,
            _ if failure.detail.contains("Invalid login") => Self::InvalidCredentialsMessage,
            _ => Self::GenericFailure,
        }
    }
}

/// Everything that can go wrong with a contact submission. `Display` is the
/// visitor-facing text; technical detail never appears in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Delivery(#[from] DeliveryFailure),
}

/// Fixed sender and recipient of contact messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
}

impl Envelope {
    pub fn from_config(config: &MailConfig) -> Self {
        Self {
            from_name: config.from_name.clone(),
            from_address: config.from_address.clone(),
            to: config.to_address.clone(),
        }
    }
}

/// Validates contact submissions and hands them to the mail transport.
pub struct ContactDispatcher<T> {
    transport: Arc<T>,
    envelope: Envelope,
}

impl<T: MailTransport> ContactDispatcher<T> {
    pub fn new(transport: Arc<T>, envelope: Envelope) -> Self {
        Self {
            transport,
            envelope,
        }
    }

    pub async fn submit(&self, submission: &ContactSubmission) -> Result<(), ContactError> {
        validate(submission)?;

        let mail = compose(&self.envelope, submission);
        match self.transport.send(mail).await {
            Ok(()) => {
                info!(reply_to = %submission.email, "contact message sent");
                Ok(())
            }
            Err(failure) => {
                let kind = DeliveryFailure::classify(&failure);
                error!(
                    ?kind,
                    code = ?failure.code,
                    response_code = ?failure.response_code,
                    detail = %failure.detail,
                    "contact message delivery failed"
                );
                Err(kind.into())
            }
        }
    }
}

pub fn validate(submission: &ContactSubmission) -> Result<(), ValidationError> {
    if submission
        .fields()
        .iter()
        .any(|value| value.trim().is_empty())
    {
        return Err(ValidationError::MissingFields);
    }

    if !is_valid_email(submission.email.trim()) {
        return Err(ValidationError::MalformedEmail);
    }

    Ok(())
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the domain
/// with at least one character on each side.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len())
}

pub fn compose(envelope: &Envelope, submission: &ContactSubmission) -> OutboundMail {
    let mut text = String::new();
    let _ = writeln!(text, "Nieuw bericht via het contactformulier");
    let _ = writeln!(text);
    let _ = writeln!(text, "Naam: {}", submission.name.trim());
    let _ = writeln!(text, "E-mail: {}", submission.email.trim());
    let _ = writeln!(text, "Telefoon: {}", submission.phone.trim());
    let _ = writeln!(text, "Onderwerp: {}", submission.subject.trim());
    let _ = writeln!(text);
    let _ = writeln!(text, "Bericht:");
    let _ = write!(text, "{}", submission.message.trim());

    OutboundMail {
        from_name: envelope.from_name.clone(),
        from_address: envelope.from_address.clone(),
        to: envelope.to.clone(),
        reply_to: submission.email.trim().to_string(),
        subject: format!("Contactformulier: {}", submission.subject.trim()),
        text,
    }
}
