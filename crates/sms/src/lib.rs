//! Carrier SMS integration.
//!
//! This crate provides the outbound message path for sitestock:
//! - **Gateway** (`gateway`) - the delivery capability behind a trait,
//!   with an HTTP implementation for the carrier's messaging API and a
//!   disabled stand-in for credential-less deployments
//! - **Dispatcher** (`dispatcher`) - best-effort fan-out to one or many
//!   recipients, collecting per-recipient outcomes without ever failing
//!   the overall operation
//!
//! # Delivery semantics
//!
//! One recipient's failure never prevents attempting the others, nothing
//! here retries, and the aggregate call never errors: callers get a
//! [`dispatcher::DeliveryOutcome`] per recipient and summarize it for the
//! end user. Payloads beyond the transport's practical size limit are
//! truncated with a visible ellipsis rather than rejected.

pub mod dispatcher;
pub mod gateway;

pub use dispatcher::{
    DeliveryOutcome, DeliverySummary, NotificationDispatcher, MAX_MESSAGE_CHARS,
};
pub use gateway::{DeliveryError, DisabledGateway, HttpSmsGateway, SmsGateway};
