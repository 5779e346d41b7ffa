//! Orchestration around the pure dialog engine: snapshot the inventory,
//! decode the accumulated input, commit mutating branches through the
//! store, fan out notifications exactly once, and frame the reply with the
//! carrier's `CON `/`END ` markers. A catch-all guarantees the transport
//! always gets a response.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use sitestock_core::dialog::{decode, engine::StockCommand, level, screens, Decision};
use sitestock_core::domain::stakeholder::Address;
use sitestock_core::errors::StockError;
use sitestock_db::repositories::{MaterialRepository, RepositoryError, StakeholderRepository};
use sitestock_sms::dispatcher::{DeliverySummary, NotificationDispatcher};

pub struct DialogService {
    materials: Arc<dyn MaterialRepository>,
    stakeholders: Arc<dyn StakeholderRepository>,
    dispatcher: NotificationDispatcher,
}

impl DialogService {
    pub fn new(
        materials: Arc<dyn MaterialRepository>,
        stakeholders: Arc<dyn StakeholderRepository>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self { materials, stakeholders, dispatcher }
    }

    /// Produces the full wire reply for one carrier callback. Never fails:
    /// storage faults and anything unexpected become a generic `END`
    /// screen, with the detail kept in the operational log.
    pub async fn respond(&self, session_id: &str, caller: &str, raw_input: &str) -> String {
        let correlation_id = if session_id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            session_id.to_string()
        };

        info!(
            event_name = "ingress.ussd.request_received",
            correlation_id = %correlation_id,
            caller = %caller,
            input_level = level(raw_input),
            "ussd callback received"
        );

        let reply = match self.evaluate(caller, raw_input, &correlation_id).await {
            Ok(reply) => reply,
            Err(error) => {
                error!(
                    event_name = "ingress.ussd.request_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "dialog evaluation failed; returning generic terminal screen"
                );
                terminal(screens::INTERNAL_ERROR)
            }
        };

        info!(
            event_name = "ingress.ussd.response_sent",
            correlation_id = %correlation_id,
            terminal = reply.starts_with(screens::END_PREFIX),
            "ussd response produced"
        );
        reply
    }

    async fn evaluate(
        &self,
        caller: &str,
        raw_input: &str,
        correlation_id: &str,
    ) -> Result<String, RepositoryError> {
        let snapshot = self.materials.list().await?;

        match decode(raw_input, &snapshot) {
            Decision::Prompt(text) => Ok(format!("{}{text}", screens::CONTINUE_PREFIX)),
            Decision::Terminal(text) => Ok(terminal(&text)),
            Decision::Commit(command) => Ok(self.commit(caller, command, correlation_id).await),
        }
    }

    /// Applies the decoded delta through the store's atomic commit and
    /// words the terminal screen from the outcome. Notification happens
    /// only after a successful commit, and only once.
    async fn commit(&self, caller: &str, command: StockCommand, correlation_id: &str) -> String {
        let delta = command.action.signed_delta(command.quantity);

        match self.materials.apply_delta(command.material.id, delta).await {
            Ok(new_quantity) => {
                info!(
                    event_name = "inventory.delta_committed",
                    correlation_id = %correlation_id,
                    material_id = command.material.id.0,
                    delta,
                    new_quantity,
                    "stock delta committed"
                );

                let mut reply = screens::commit_confirmation(&command, new_quantity);
                if let Some(suffix) =
                    self.notify_stakeholders(caller, &command, new_quantity, correlation_id).await
                {
                    reply.push(' ');
                    reply.push_str(suffix);
                }
                self.confirm_to_caller(caller, &command, new_quantity).await;
                terminal(&reply)
            }
            Err(StockError::Insufficient { available, .. }) => {
                terminal(&screens::insufficient_stock(&command, available))
            }
            Err(StockError::NotFound(_)) => terminal(screens::INVALID_MATERIAL),
            Err(StockError::Storage(detail)) => {
                error!(
                    event_name = "inventory.delta_failed",
                    correlation_id = %correlation_id,
                    material_id = command.material.id.0,
                    error = %detail,
                    "stock delta commit failed; skipping notification"
                );
                terminal(screens::UPDATE_FAILED)
            }
        }
    }

    async fn notify_stakeholders(
        &self,
        caller: &str,
        command: &StockCommand,
        new_quantity: i64,
        correlation_id: &str,
    ) -> Option<&'static str> {
        let addresses = match self.stakeholders.list_addresses().await {
            Ok(addresses) => addresses,
            Err(error) => {
                warn!(
                    event_name = "notify.stakeholder_lookup_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "could not load stakeholder addresses"
                );
                return DeliverySummary::Failed.response_suffix();
            }
        };

        if addresses.is_empty() {
            return None;
        }

        let message = screens::stakeholder_alert(command, caller, new_quantity);
        let outcomes = self.dispatcher.notify(&addresses, &message).await;
        DeliverySummary::from_outcomes(&outcomes).response_suffix()
    }

    async fn confirm_to_caller(&self, caller: &str, command: &StockCommand, new_quantity: i64) {
        if caller.is_empty() {
            return;
        }
        let message = screens::caller_confirmation(command, new_quantity);
        // Best-effort; the dispatcher already logs failures.
        let _ = self.dispatcher.notify(&[Address(caller.to_string())], &message).await;
    }
}

fn terminal(text: &str) -> String {
    format!("{}{text}", screens::END_PREFIX)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use sitestock_core::domain::material::{Material, MaterialId};
    use sitestock_core::domain::stakeholder::Address;
    use sitestock_db::repositories::{
        InMemoryMaterialRepository, InMemoryStakeholderRepository, MaterialRepository,
    };
    use sitestock_sms::dispatcher::NotificationDispatcher;
    use sitestock_sms::gateway::{DeliveryError, SmsGateway};

    use super::DialogService;

    const CALLER: &str = "+255756584341";

    struct ScriptedGateway {
        failing: Vec<Address>,
        sent: Mutex<Vec<(Address, String)>>,
    }

    impl ScriptedGateway {
        fn reliable() -> Self {
            Self { failing: Vec::new(), sent: Mutex::new(Vec::new()) }
        }

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

    fn cement(quantity: i64) -> Material {
        Material {
            id: MaterialId(1),
            name: "Cement".to_string(),
            unit: "bags".to_string(),
            quantity,
        }
    }

    struct Harness {
        service: DialogService,
        materials: Arc<InMemoryMaterialRepository>,
        gateway: Arc<ScriptedGateway>,
    }

    fn harness(
        materials: Vec<Material>,
        stakeholders: Vec<Address>,
        gateway: ScriptedGateway,
    ) -> Harness {
        let materials = Arc::new(InMemoryMaterialRepository::with_materials(materials));
        let gateway = Arc::new(gateway);
        let service = DialogService::new(
            materials.clone(),
            Arc::new(InMemoryStakeholderRepository::with_addresses(stakeholders)),
            NotificationDispatcher::new(gateway.clone()),
        );
        Harness { service, materials, gateway }
    }

    #[tokio::test]
    async fn recording_a_receipt_walks_the_full_menu_and_commits() {
        let h = harness(vec![cement(40)], Vec::new(), ScriptedGateway::reliable());

        let menu = h.service.respond("sess-1", CALLER, "").await;
        assert_eq!(
            menu,
            "CON Welcome to SiteStock\n1. Record Material Received\n2. Check Stock Level\n3. Record Material Used"
        );

        let list = h.service.respond("sess-1", CALLER, "1").await;
        assert_eq!(list, "CON Select Material Received:\n1. Cement");

        let prompt = h.service.respond("sess-1", CALLER, "1*1").await;
        assert_eq!(prompt, "CON Enter quantity of Cement (bags) RECEIVED:");

        let reply = h.service.respond("sess-1", CALLER, "1*1*10").await;
        assert!(reply.starts_with("END 10 bags of Cement recorded"), "got: {reply}");

        let stored = h.materials.get(MaterialId(1)).await.expect("get").expect("present");
        assert_eq!(stored.quantity, 50);
    }

    #[tokio::test]
    async fn over_usage_reports_the_shortfall_and_leaves_stock_alone() {
        let h = harness(vec![cement(5)], Vec::new(), ScriptedGateway::reliable());

        let reply = h.service.respond("sess-2", CALLER, "3*1*10").await;
        assert_eq!(reply, "END Cannot use 10 bags. Only 5 available.");

        let stored = h.materials.get(MaterialId(1)).await.expect("get").expect("present");
        assert_eq!(stored.quantity, 5);
        assert!(h.gateway.sent.lock().await.is_empty(), "rejected commits must not notify");
    }

    #[tokio::test]
    async fn checking_stock_mutates_nothing_and_notifies_nobody() {
        let h = harness(vec![cement(40)], vec![Address("+255711111111".into())], ScriptedGateway::reliable());

        let reply = h.service.respond("sess-3", CALLER, "2*1").await;
        assert_eq!(reply, "END Cement: 40 bags in stock");

        let stored = h.materials.get(MaterialId(1)).await.expect("get").expect("present");
        assert_eq!(stored.quantity, 40);
        assert!(h.gateway.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_action_terminates_with_the_invalid_choice_screen() {
        let h = harness(vec![cement(40)], Vec::new(), ScriptedGateway::reliable());

        let reply = h.service.respond("sess-4", CALLER, "9").await;
        assert_eq!(reply, "END Invalid choice. Please try again.");

        let stored = h.materials.get(MaterialId(1)).await.expect("get").expect("present");
        assert_eq!(stored.quantity, 40);
    }

    #[tokio::test]
    async fn partial_delivery_is_reported_but_the_commit_stands() {
        let stakeholders = vec![
            Address("+255711111111".to_string()),
            Address("+255722222222".to_string()),
            Address("+255733333333".to_string()),
        ];
        let h = harness(
            vec![cement(40)],
            stakeholders.clone(),
            ScriptedGateway::failing(vec![stakeholders[1].clone()]),
        );

        let reply = h.service.respond("sess-5", CALLER, "1*1*10").await;
        assert!(reply.starts_with("END 10 bags of Cement recorded"), "got: {reply}");
        assert!(reply.contains("Some stakeholders could not be notified."), "got: {reply}");

        let stored = h.materials.get(MaterialId(1)).await.expect("get").expect("present");
        assert_eq!(stored.quantity, 50, "delivery failures must not undo the commit");

        // Three stakeholder attempts plus the caller confirmation.
        let sent = h.gateway.sent.lock().await;
        assert_eq!(sent.len(), 4);
        assert!(sent[0].1.starts_with("RECEIVED: 10 bags of Cement"));
        assert_eq!(sent[3].0, Address(CALLER.to_string()));
    }

    #[tokio::test]
    async fn no_stakeholders_means_no_suffix_and_no_broadcast() {
        let h = harness(vec![cement(40)], Vec::new(), ScriptedGateway::reliable());

        let reply = h.service.respond("sess-6", CALLER, "1*1*10").await;
        assert!(reply.starts_with("END 10 bags of Cement recorded as RECEIVED."), "got: {reply}");
        assert!(!reply.contains("notified"), "got: {reply}");

        // Only the caller confirmation goes out.
        let sent = h.gateway.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Address(CALLER.to_string()));
    }

    #[tokio::test]
    async fn usage_commit_reports_the_remaining_quantity_to_stakeholders() {
        let stakeholders = vec![Address("+255711111111".to_string())];
        let h = harness(vec![cement(40)], stakeholders, ScriptedGateway::reliable());

        let reply = h.service.respond("sess-7", CALLER, "3*1*8").await;
        assert_eq!(
            reply,
            "END 8 bags of Cement recorded as USED. Remaining: 32 bags. Stakeholders notified."
        );

        let sent = h.gateway.sent.lock().await;
        assert!(sent[0].1.contains("Remaining: 32"), "broadcast: {}", sent[0].1);
    }
}
