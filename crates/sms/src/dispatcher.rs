use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, warn};

use sitestock_core::domain::stakeholder::Address;

use crate::gateway::{DeliveryError, SmsGateway};

/// Practical payload limit of the transport. Longer messages are truncated
/// with a visible ellipsis rather than failing the send.
pub const MAX_MESSAGE_CHARS: usize = 300;
const ELLIPSIS: &str = "...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub address: Address,
    pub result: Result<(), DeliveryError>,
}

/// Aggregate view of one fan-out, used only to word the cosmetic suffix on
/// the user-facing reply; the committed mutation never depends on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliverySummary {
    Delivered,
    Partial,
    Failed,
    /// No recipients, or the delivery capability is unavailable.
    Skipped,
}

impl DeliverySummary {
    pub fn from_outcomes(outcomes: &[DeliveryOutcome]) -> Self {
        if outcomes.is_empty() {
            return Self::Skipped;
        }
        if outcomes.iter().all(|o| o.result == Err(DeliveryError::Unavailable)) {
            return Self::Skipped;
        }

        let delivered = outcomes.iter().filter(|o| o.result.is_ok()).count();
        if delivered == outcomes.len() {
            Self::Delivered
        } else if delivered == 0 {
            Self::Failed
        } else {
            Self::Partial
        }
    }

    pub fn response_suffix(self) -> Option<&'static str> {
        match self {
            Self::Delivered => Some("Stakeholders notified."),
            Self::Partial => Some("Some stakeholders could not be notified."),
            Self::Failed => Some("Stakeholder notification failed."),
            Self::Skipped => None,
        }
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    gateway: Arc<dyn SmsGateway>,
}

impl NotificationDispatcher {
    pub fn new(gateway: Arc<dyn SmsGateway>) -> Self {
        Self { gateway }
    }

    /// Best-effort fan-out: every recipient is attempted exactly once,
    /// failures are logged and collected, the aggregate never errors.
    pub async fn notify(&self, recipients: &[Address], message: &str) -> Vec<DeliveryOutcome> {
        let message = truncate_for_transport(message);
        let mut outcomes = Vec::with_capacity(recipients.len());

        for address in recipients {
            let result = self.gateway.send(address, &message).await;
            match &result {
                Ok(()) => {
                    debug!(
                        event_name = "egress.sms.delivered",
                        recipient = %address,
                        "message delivered"
                    );
                }
                Err(error) => {
                    warn!(
                        event_name = "egress.sms.delivery_failed",
                        recipient = %address,
                        error = %error,
                        "message delivery failed; continuing fan-out"
                    );
                }
            }
            outcomes.push(DeliveryOutcome { address: address.clone(), result });
        }

        outcomes
    }
}

pub fn truncate_for_transport(message: &str) -> Cow<'_, str> {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return Cow::Borrowed(message);
    }

    let keep = MAX_MESSAGE_CHARS - ELLIPSIS.chars().count();
    let mut truncated: String = message.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use sitestock_core::domain::stakeholder::Address;

    use super::{
        truncate_for_transport, DeliverySummary, NotificationDispatcher, MAX_MESSAGE_CHARS,
    };
    use crate::gateway::{DeliveryError, DisabledGateway, SmsGateway};

    /// Fails every address in `failing`; records what was actually sent.
    struct ScriptedGateway {
        failing: Vec<Address>,
        sent: Mutex<Vec<(Address, String)>>,
    }

    impl ScriptedGateway {
        fn failing(failing: Vec<Address>) -> Self {
            Self { failing, sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl SmsGateway for ScriptedGateway {
        async fn send(&self, to: &Address, message: &str) -> Result<(), DeliveryError> {
            self.sent.lock().await.push((to.clone(), message.to_string()));
            if self.failing.contains(to) {
                Err(DeliveryError::Request("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn addresses(count: usize) -> Vec<Address> {
        (0..count).map(|n| Address(format!("+25570000000{n}"))).collect()
    }

    #[tokio::test]
    async fn one_failure_never_stops_the_fan_out() {
        let recipients = addresses(3);
        let gateway = Arc::new(ScriptedGateway::failing(vec![recipients[1].clone()]));
        let dispatcher = NotificationDispatcher::new(gateway.clone());

        let outcomes = dispatcher.notify(&recipients, "stock update").await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_ok());
        assert_eq!(gateway.sent.lock().await.len(), 3, "every recipient must be attempted");
        assert_eq!(DeliverySummary::from_outcomes(&outcomes), DeliverySummary::Partial);
    }

    #[tokio::test]
    async fn all_successes_summarize_as_delivered() {
        let recipients = addresses(2);
        let dispatcher =
            NotificationDispatcher::new(Arc::new(ScriptedGateway::failing(Vec::new())));

        let outcomes = dispatcher.notify(&recipients, "stock update").await;

        assert_eq!(DeliverySummary::from_outcomes(&outcomes), DeliverySummary::Delivered);
        assert_eq!(
            DeliverySummary::from_outcomes(&outcomes).response_suffix(),
            Some("Stakeholders notified.")
        );
    }

    #[tokio::test]
    async fn all_failures_summarize_as_failed() {
        let recipients = addresses(2);
        let dispatcher =
            NotificationDispatcher::new(Arc::new(ScriptedGateway::failing(addresses(2))));

        let outcomes = dispatcher.notify(&recipients, "stock update").await;

        assert_eq!(DeliverySummary::from_outcomes(&outcomes), DeliverySummary::Failed);
    }

    #[tokio::test]
    async fn no_recipients_summarize_as_skipped() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(ScriptedGateway::failing(Vec::new())));
        let outcomes = dispatcher.notify(&[], "stock update").await;

        assert!(outcomes.is_empty());
        assert_eq!(DeliverySummary::from_outcomes(&outcomes), DeliverySummary::Skipped);
        assert_eq!(DeliverySummary::from_outcomes(&outcomes).response_suffix(), None);
    }

    #[tokio::test]
    async fn unavailable_capability_summarizes_as_skipped() {
        let dispatcher = NotificationDispatcher::new(Arc::new(DisabledGateway));
        let outcomes = dispatcher.notify(&addresses(2), "stock update").await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(DeliverySummary::from_outcomes(&outcomes), DeliverySummary::Skipped);
    }

    #[tokio::test]
    async fn long_messages_are_truncated_before_sending() {
        let gateway = Arc::new(ScriptedGateway::failing(Vec::new()));
        let dispatcher = NotificationDispatcher::new(gateway.clone());
        let long_message = "x".repeat(MAX_MESSAGE_CHARS + 50);

        dispatcher.notify(&addresses(1), &long_message).await;

        let sent = gateway.sent.lock().await;
        let delivered = &sent[0].1;
        assert_eq!(delivered.chars().count(), MAX_MESSAGE_CHARS);
        assert!(delivered.ends_with("..."));
    }

    #[test]
    fn truncation_leaves_short_messages_untouched() {
        let message = "Cement: 40 bags in stock";
        assert_eq!(truncate_for_transport(message), message);
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        // Multi-byte characters must not be split mid-codepoint.
        let message = "ð".repeat(MAX_MESSAGE_CHARS + 1);
        let truncated = truncate_for_transport(&message);
        assert_eq!(truncated.chars().count(), MAX_MESSAGE_CHARS);
        assert!(truncated.ends_with("..."));
    }
}
