//! Email delivery adapters.
//!
//! `HttpEmailSender` posts JSON to a transactional email provider;
//! `LoggingEmailSender` only logs and is wired when no provider is configured.

mod http_sender;
mod logging_sender;

pub use http_sender::{HttpEmailConfig, HttpEmailSender};
pub use logging_sender::LoggingEmailSender;
