//! REST API endpoint handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sage_rag::conversation::{ConversationController, ConversationSnapshot, SubmitOutcome};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub controller: ConversationController,
}

/// GET /api/state: full conversation snapshot.
pub async fn get_state(State(app): State<AppState>) -> Json<ConversationSnapshot> {
    Json(app.controller.snapshot())
}

/// Request body for POST /api/chat.
#[derive(Serialize, Deserialize, Debug)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/chat: submit a question.
///
/// Waits for the turn to settle and returns the resulting snapshot with 200.
/// Blank messages return 204 without touching the conversation; a message
/// sent while another turn is pending returns 409 with the current snapshot.
///
/// The turn runs on its own task, so it still settles if the client
/// disconnects first.
pub async fn post_chat(State(app): State<AppState>, Json(body): Json<ChatRequest>) -> Response {
    let controller = app.controller.clone();
    let turn = tokio::spawn(async move { controller.submit_query(&body.message).await });
    let outcome = match turn.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Chat turn task failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match outcome {
        SubmitOutcome::Ignored => StatusCode::NO_CONTENT.into_response(),
        SubmitOutcome::Busy => {
            (StatusCode::CONFLICT, Json(app.controller.snapshot())).into_response()
        }
        SubmitOutcome::Answered(_) | SubmitOutcome::Failed(_) => {
            Json(app.controller.snapshot()).into_response()
        }
    }
}
