use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::config::MailConfig;

/// A fully composed contact message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMail {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

/// Why the transport could not deliver a message, as reported by the transport.
///
/// `code` follows the usual mailer error codes (`EAUTH`, `ECONNREFUSED`, ...),
/// `response_code` carries an SMTP-style reply code when one is known.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct TransportFailure {
    pub code: Option<String>,
    pub response_code: Option<u16>,
    pub detail: String,
}

impl TransportFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            code: None,
            response_code: None,
            detail: detail.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_response_code(mut self, response_code: u16) -> Self {
        self.response_code = Some(response_code);
        self
    }
}

/// Outbound mail capability. The caller waits until delivery succeeds or fails.
pub trait MailTransport: Send + Sync + 'static {
    fn send(
        &self,
        mail: OutboundMail,
    ) -> impl Future<Output = Result<(), TransportFailure>> + Send;
}

/// Development transport: records the message in the log and reports success.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    async fn send(&self, mail: OutboundMail) -> Result<(), TransportFailure> {
        info!(
            to = %mail.to,
            reply_to = %mail.reply_to,
            subject = %mail.subject,
            "mail relay not configured, contact message logged only"
        );
        Ok(())
    }
}

/// Delivers mail by posting it as JSON to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct RelayTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RelayTransport {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportFailure> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportFailure::new(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    fn map_request_error(err: reqwest::Error) -> TransportFailure {
        let failure = TransportFailure::new(err.to_string());
        if err.is_connect() {
            failure.with_code("ECONNREFUSED")
        } else if err.is_timeout() {
            failure.with_code("ETIMEDOUT")
        } else {
            failure
        }
    }
}

impl MailTransport for RelayTransport {
    async fn send(&self, mail: OutboundMail) -> Result<(), TransportFailure> {
        let mut request = self.client.post(&self.endpoint).json(&mail);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(Self::map_request_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let failure = TransportFailure::new(format!("relay answered {status}: {body}"))
            .with_response_code(status.as_u16());
        Err(match status.as_u16() {
            401 | 403 => failure.with_code("EAUTH"),
            _ => failure,
        })
    }
}

/// The transport chosen from configuration at startup.
#[derive(Debug, Clone)]
pub enum ConfiguredTransport {
    Log(LogTransport),
    Relay(RelayTransport),
}

impl ConfiguredTransport {
    pub fn from_config(config: &MailConfig) -> Result<Self, TransportFailure> {
        match &config.relay_url {
            Some(url) => Ok(Self::Relay(RelayTransport::new(
                url.clone(),
                config.api_key.clone(),
                config.timeout,
            )?)),
            None => Ok(Self::Log(LogTransport)),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Log(_) => "log",
            Self::Relay(_) => "relay",
        }
    }
}

impl MailTransport for ConfiguredTransport {
    async fn send(&self, mail: OutboundMail) -> Result<(), TransportFailure> {
        match self {
            Self::Log(transport) => transport.send(mail).await,
            Self::Relay(transport) => transport.send(mail).await,
        }
    }
}
