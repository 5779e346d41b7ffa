use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::dialog::DialogService;
use crate::inbox::{InboxOutcome, InboxService};

#[derive(Clone)]
pub struct AppState {
    pub dialog: Arc<DialogService>,
    pub inbox: Arc<InboxService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(ussd_callback))
        .route("/incoming-messages", post(incoming_message))
        .with_state(state)
}

/// Carrier USSD callback payload. The gateway posts the full accumulated
/// input on every round trip; `session_id` is used for logging only.
#[derive(Debug, Default, Deserialize)]
pub struct UssdCallback {
    #[serde(rename = "sessionId", default)]
    pub session_id: String,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: String,
    #[serde(default)]
    pub text: String,
}

pub async fn ussd_callback(
    State(state): State<AppState>,
    Form(callback): Form<UssdCallback>,
) -> String {
    state.dialog.respond(&callback.session_id, &callback.phone_number, &callback.text).await
}

/// Inbound SMS payload. `id` is the carrier's message id, logging only.
#[derive(Debug, Default, Deserialize)]
pub struct IncomingMessage {
    pub from: Option<String>,
    pub text: Option<String>,
    pub id: Option<String>,
}

pub async fn incoming_message(
    State(state): State<AppState>,
    Form(message): Form<IncomingMessage>,
) -> StatusCode {
    let outcome = state
        .inbox
        .handle(message.from.as_deref(), message.text.as_deref(), message.id.as_deref())
        .await;

    match outcome {
        InboxOutcome::Acknowledged => StatusCode::OK,
        InboxOutcome::BadRequest => StatusCode::BAD_REQUEST,
    }
}
