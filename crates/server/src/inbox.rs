//! Free-text message path: inbound stock questions are answered by the
//! oracle relay against a read-only inventory snapshot, then replied to
//! the sender over the same gateway. Never mutates inventory.

use std::sync::Arc;

use tracing::{info, warn};

use sitestock_core::domain::stakeholder::Address;
use sitestock_db::repositories::MaterialRepository;
use sitestock_oracle::relay::AnswerRelay;
use sitestock_sms::dispatcher::NotificationDispatcher;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboxOutcome {
    Acknowledged,
    BadRequest,
}

pub struct InboxService {
    materials: Arc<dyn MaterialRepository>,
    relay: AnswerRelay,
    dispatcher: NotificationDispatcher,
}

impl InboxService {
    pub fn new(
        materials: Arc<dyn MaterialRepository>,
        relay: AnswerRelay,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self { materials, relay, dispatcher }
    }

    pub async fn handle(
        &self,
        sender: Option<&str>,
        text: Option<&str>,
        message_id: Option<&str>,
    ) -> InboxOutcome {
        let message_id = message_id.unwrap_or("unknown");

        let (Some(sender), Some(text)) = (
            sender.filter(|s| !s.trim().is_empty()),
            text.filter(|t| !t.trim().is_empty()),
        ) else {
            warn!(
                event_name = "ingress.sms.incomplete_payload",
                message_id = %message_id,
                "inbound message missing sender or text"
            );
            return InboxOutcome::BadRequest;
        };

        info!(
            event_name = "ingress.sms.message_received",
            message_id = %message_id,
            sender = %sender,
            "inbound stock question received"
        );

        // A failed snapshot read still gets an answer: the relay words its
        // reply from whatever context it is given.
        let snapshot = match self.materials.list().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    event_name = "ingress.sms.snapshot_failed",
                    message_id = %message_id,
                    error = %error,
                    "could not load inventory snapshot for the oracle"
                );
                Vec::new()
            }
        };

        let answer = self.relay.answer(text, &snapshot).await;
        let outcomes = self.dispatcher.notify(&[Address(sender.to_string())], &answer).await;

        if outcomes.iter().any(|outcome| outcome.result.is_err()) {
            warn!(
                event_name = "ingress.sms.reply_failed",
                message_id = %message_id,
                sender = %sender,
                "could not deliver the oracle's answer"
            );
        }

        InboxOutcome::Acknowledged
    }
}
