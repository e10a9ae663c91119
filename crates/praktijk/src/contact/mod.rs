//! Public contact form: validation, message composition and delivery.

pub mod dispatcher;
pub mod transport;

pub use dispatcher::{
    compose, is_valid_email, validate, ContactDispatcher, ContactError, ContactSubmission,
    DeliveryFailure, Envelope, ValidationError, SENT_MESSAGE,
};
pub use transport::{
    ConfiguredTransport, LogTransport, MailTransport, OutboundMail, RelayTransport,
    TransportFailure,
};
