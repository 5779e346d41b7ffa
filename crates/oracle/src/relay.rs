use std::sync::Arc;

use tracing::warn;

use sitestock_core::domain::material::Material;

use crate::llm::LlmClient;

/// Returned whenever the oracle is unavailable or produces no usable
/// content. The reply flow never surfaces oracle failures any other way.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't process that request right now.";

/// Bound on the stock-context block so an oversized inventory cannot blow
/// up the prompt.
const MAX_CONTEXT_LINES: usize = 50;

pub struct AnswerRelay {
    client: Arc<dyn LlmClient>,
}

impl AnswerRelay {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Answers a free-text stock question against a read-only snapshot.
    /// Always returns displayable text; never an error.
    pub async fn answer(&self, query: &str, snapshot: &[Material]) -> String {
        let prompt = build_prompt(query, snapshot);

        match self.client.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(event_name = "oracle.empty_completion", "oracle returned no content");
                FALLBACK_ANSWER.to_string()
            }
            Err(error) => {
                warn!(
                    event_name = "oracle.completion_failed",
                    error = %error,
                    "oracle call failed; using fallback answer"
                );
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}

pub fn build_prompt(query: &str, snapshot: &[Material]) -> String {
    let mut prompt = String::from("Context:\nCurrent Stock Levels:\n");

    if snapshot.is_empty() {
        prompt.push_str("No materials on record.\n");
    } else {
        for material in snapshot.iter().take(MAX_CONTEXT_LINES) {
            prompt.push_str(&format!(
                "- {}: {} {}\n",
                material.name, material.quantity, material.unit
            ));
        }
        if snapshot.len() > MAX_CONTEXT_LINES {
            prompt.push_str(&format!(
                "(and {} more materials not shown)\n",
                snapshot.len() - MAX_CONTEXT_LINES
            ));
        }
    }

    prompt.push_str(
        "\nStock Level Definitions:\n\
         - Below Stock: Quantity < 50\n\
         - Sufficient Stock: Quantity >= 50\n\
         - High Stock: Quantity > 100\n",
    );
    prompt.push_str("\nUser Query:\n");
    prompt.push_str(query);
    prompt.push_str(
        "\n\n---\nBased ONLY on the provided context, stock level definitions, and user query, \
         answer the query concisely.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use sitestock_core::domain::material::{Material, MaterialId};

    use super::{build_prompt, AnswerRelay, FALLBACK_ANSWER, MAX_CONTEXT_LINES};
    use crate::llm::{DisabledLlmClient, LlmClient};

    struct ScriptedClient {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => bail!("{message}"),
            }
        }
    }

    fn snapshot() -> Vec<Material> {
        vec![
            Material {
                id: MaterialId(1),
                name: "Cement".to_string(),
                unit: "bags".to_string(),
                quantity: 40,
            },
            Material {
                id: MaterialId(2),
                name: "Sand".to_string(),
                unit: "tonnes".to_string(),
                quantity: 120,
            },
        ]
    }

    #[test]
    fn prompt_carries_context_definitions_and_the_verbatim_query() {
        let prompt = build_prompt("Is cement running low?", &snapshot());

        assert!(prompt.contains("- Cement: 40 bags"));
        assert!(prompt.contains("- Sand: 120 tonnes"));
        assert!(prompt.contains("Below Stock: Quantity < 50"));
        assert!(prompt.contains("User Query:\nIs cement running low?"));
        assert!(prompt.contains("Based ONLY on the provided context"));
    }

    #[test]
    fn prompt_caps_the_context_block() {
        let oversized: Vec<Material> = (0..(MAX_CONTEXT_LINES as i64 + 20))
            .map(|n| Material {
                id: MaterialId(n),
                name: format!("Material {n}"),
                unit: "units".to_string(),
                quantity: n,
            })
            .collect();

        let prompt = build_prompt("anything", &oversized);
        let lines = prompt.lines().filter(|line| line.starts_with("- ")).count();
        assert_eq!(lines, MAX_CONTEXT_LINES);
        assert!(prompt.contains("20 more materials not shown"));
    }

    #[tokio::test]
    async fn oracle_text_is_returned_verbatim() {
        let relay = AnswerRelay::new(Arc::new(ScriptedClient {
            reply: Ok("Cement is below stock at 40 bags.".to_string()),
        }));

        let answer = relay.answer("Is cement running low?", &snapshot()).await;
        assert_eq!(answer, "Cement is below stock at 40 bags.");
    }

    #[tokio::test]
    async fn oracle_failure_yields_the_fallback() {
        let relay =
            AnswerRelay::new(Arc::new(ScriptedClient { reply: Err("timeout".to_string()) }));

        let answer = relay.answer("Is cement running low?", &snapshot()).await;
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn blank_completion_yields_the_fallback() {
        let relay = AnswerRelay::new(Arc::new(ScriptedClient { reply: Ok("   ".to_string()) }));

        let answer = relay.answer("Is cement running low?", &snapshot()).await;
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn disabled_client_yields_the_fallback() {
        let relay = AnswerRelay::new(Arc::new(DisabledLlmClient));
        let answer = relay.answer("Is cement running low?", &snapshot()).await;
        assert_eq!(answer, FALLBACK_ANSWER);
    }
}
