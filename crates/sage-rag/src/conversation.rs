//! Conversation controller: one turn at a time through the RAG pipeline.
//!
//! # Architecture
//!
//! ```text
//! submit_query ──▶ retriever::select ──▶ prompt::build ──▶ TextGenerator
//!       │                                                      │
//!       └──writes──▶ Arc<Mutex<ConversationState>> ◀──writes───┘
//!                              ▲
//!                              └──reads── snapshot() (presentation layer)
//! ```
//!
//! The state lock is taken twice per turn: once to check the guards and
//! enter `Pending`, and once to record the outcome. It is never held across
//! the generation await, and the guard check and the `Pending` transition
//! happen under the same acquisition, so two submissions cannot both be in
//! flight.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::client::TextGenerator;
use crate::corpus::Corpus;
use crate::error::GenerationError;
use crate::{prompt, retriever};

/// User-visible message recorded when a turn fails.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

// ── Turns ─────────────────────────────────────────────────────────────

/// Author of a [`Turn`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the conversation history.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

// ── State machine ─────────────────────────────────────────────────────

/// Where the controller is in the turn lifecycle.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    /// Ready for a submission.
    #[default]
    Idle,
    /// A generation call is in flight.
    Pending,
    /// The last turn failed. Cleared by the next accepted submission.
    Errored,
}

/// Result of a call to [`ConversationController::submit_query`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank input. Nothing changed.
    Ignored,
    /// A turn was already pending. Nothing changed.
    Busy,
    /// The turn completed and the reply was appended to history.
    Answered(String),
    /// The generation call failed. Only the user turn was appended.
    Failed(GenerationError),
}

impl SubmitOutcome {
    /// Whether the submission entered `Pending` (answered or failed).
    pub fn accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Answered(_) | SubmitOutcome::Failed(_))
    }
}

/// Fails a turn whose future is dropped before the generator settles.
struct PendingTurn<'a> {
    state: &'a Mutex<ConversationState>,
    settled: bool,
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut s = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if s.state == TurnState::Pending {
            warn!("Turn dropped before generation settled");
            s.input.clear();
            s.last_error = Some(GENERIC_ERROR_MESSAGE.to_string());
            s.state = TurnState::Errored;
        }
    }
}

#[derive(Default)]
struct ConversationState {
    state: TurnState,
    history: Vec<Turn>,
    last_error: Option<String>,
    input: String,
}

/// Serializable view of the conversation for a presentation layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConversationSnapshot {
    pub state: TurnState,
    pub history: Vec<Turn>,
    pub last_error: Option<String>,
    pub input: String,
}

// ── Controller ────────────────────────────────────────────────────────

/// Drives turns through retrieval, augmentation and generation, and owns
/// the conversation history.
///
/// Cheap to clone; clones share the same conversation.
#[derive(Clone)]
pub struct ConversationController {
    corpus: Arc<Corpus>,
    generator: Arc<dyn TextGenerator>,
    state: Arc<Mutex<ConversationState>>,
}

impl ConversationController {
    /// Start an idle conversation with empty history.
    pub fn new(corpus: Arc<Corpus>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            corpus,
            generator,
            state: Arc::new(Mutex::new(ConversationState::default())),
        }
    }

    /// Poisoned locks are recovered: every write leaves the state consistent.
    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run one turn for `text`.
    ///
    /// Blank text is ignored and a submission while another turn is pending
    /// is rejected; neither changes any state. Otherwise the user turn is
    /// appended immediately, the pipeline runs to completion, and the input
    /// buffer is cleared once the turn settles. Dropping the returned future
    /// mid-turn settles it as a failure.
    pub async fn submit_query(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return SubmitOutcome::Ignored;
        }

        {
            let mut s = self.lock();
            if s.state == TurnState::Pending {
                debug!("Rejecting submission while a turn is pending");
                return SubmitOutcome::Busy;
            }
            s.history.push(Turn::user(text));
            s.last_error = None;
            s.state = TurnState::Pending;
        }
        let mut turn = PendingTurn {
            state: &self.state,
            settled: false,
        };

        let prompt = {
            let passages = retriever::select(text, &self.corpus);
            info!(
                "Turn started: {} of {} passage(s) matched",
                passages.len(),
                self.corpus.len()
            );
            prompt::build(text, &passages, &self.corpus)
        };

        let result = self.generator.generate(&prompt).await;
        turn.settled = true;

        let mut s = self.lock();
        s.input.clear();
        match result {
            Ok(reply) => {
                info!("Turn answered: {} chars", reply.len());
                s.history.push(Turn::assistant(reply.clone()));
                s.state = TurnState::Idle;
                SubmitOutcome::Answered(reply)
            }
            Err(err) => {
                error!("Generation failed: {err}");
                s.last_error = Some(GENERIC_ERROR_MESSAGE.to_string());
                s.state = TurnState::Errored;
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Replace the pending input buffer.
    pub fn set_input(&self, text: impl Into<String>) {
        self.lock().input = text.into();
    }

    /// Submit whatever is in the input buffer.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let text = self.lock().input.clone();
        self.submit_query(&text).await
    }

    pub fn state(&self) -> TurnState {
        self.lock().state
    }

    pub fn history(&self) -> Vec<Turn> {
        self.lock().history.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Current state, full history, last error and input buffer.
    pub fn snapshot(&self) -> ConversationSnapshot {
        let s = self.lock();
        ConversationSnapshot {
            state: s.state,
            history: s.history.clone(),
            last_error: s.last_error.clone(),
            input: s.input.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{GenerationFuture, NO_RESPONSE_FALLBACK};
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    /// Replies from a fixed script and records every prompt it sees.
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<String, GenerationError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate<'a>(&'a self, prompt: &'a str) -> GenerationFuture<'a> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("default reply".to_string()));
            Box::pin(async move { next })
        }
    }

    /// Blocks inside `generate` until released.
    #[derive(Default)]
    struct GatedGenerator {
        started: Notify,
        release: Notify,
    }

    impl TextGenerator for GatedGenerator {
        fn generate<'a>(&'a self, _prompt: &'a str) -> GenerationFuture<'a> {
            Box::pin(async move {
                self.started.notify_one();
                self.release.notified().await;
                Ok("released".to_string())
            })
        }
    }

    fn server_error() -> GenerationError {
        GenerationError::Status {
            status: 500,
            body: "boom".into(),
        }
    }

    fn controller_with(generator: Arc<dyn TextGenerator>) -> ConversationController {
        ConversationController::new(Arc::new(Corpus::builtin()), generator)
    }

    #[test]
    fn starts_idle_and_empty() {
        let controller = controller_with(ScriptedGenerator::new(vec![]));
        let snap = controller.snapshot();
        assert_eq!(snap.state, TurnState::Idle);
        assert!(snap.history.is_empty());
        assert!(snap.last_error.is_none());
        assert!(snap.input.is_empty());
    }

    #[tokio::test]
    async fn successful_turn_appends_user_then_assistant() {
        let generator = ScriptedGenerator::new(vec![Ok("Merit first.".into())]);
        let controller = controller_with(generator.clone());

        let outcome = controller.submit_query("meritocracy").await;
        assert!(matches!(outcome, SubmitOutcome::Answered(ref t) if t == "Merit first."));

        assert_eq!(controller.state(), TurnState::Idle);
        assert_eq!(
            controller.history(),
            vec![Turn::user("meritocracy"), Turn::assistant("Merit first.")]
        );
    }

    #[tokio::test]
    async fn prompt_uses_retrieved_passage() {
        let generator = ScriptedGenerator::new(vec![Ok("ok".into())]);
        let controller = controller_with(generator.clone());
        controller.submit_query("meritocracy").await;

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        let corpus = Corpus::builtin();
        assert!(prompts[0].contains(&corpus.passages()[1].text));
        assert!(!prompts[0].contains(&corpus.passages()[0].text));
        assert!(!prompts[0].contains("\n---\n"));
    }

    #[tokio::test]
    async fn unmatched_query_prompt_contains_whole_corpus() {
        let generator = ScriptedGenerator::new(vec![Ok("ok".into())]);
        let controller = controller_with(generator.clone());
        controller.submit_query("xyzzy").await;

        let prompt = &generator.prompts()[0];
        for passage in Corpus::builtin().iter() {
            assert!(prompt.contains(&passage.text));
        }
        assert_eq!(prompt.matches("\n---\n").count(), 3);
    }

    #[tokio::test]
    async fn n_successes_give_two_n_turns() {
        let generator = ScriptedGenerator::new(vec![]);
        let controller = controller_with(generator);
        for i in 0..5 {
            let outcome = controller.submit_query(&format!("question {i}")).await;
            assert!(outcome.accepted());
        }
        let history = controller.history();
        assert_eq!(history.len(), 10);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
    }

    #[tokio::test]
    async fn failure_records_generic_error_and_only_user_turn() {
        let generator = ScriptedGenerator::new(vec![Err(server_error())]);
        let controller = controller_with(generator);

        let outcome = controller.submit_query("trade").await;
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(GenerationError::Status { status: 500, .. })
        ));

        let snap = controller.snapshot();
        assert_eq!(snap.state, TurnState::Errored);
        assert_eq!(snap.history, vec![Turn::user("trade")]);
        assert_eq!(snap.last_error.as_deref(), Some(GENERIC_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn next_submission_clears_error() {
        let generator = ScriptedGenerator::new(vec![Err(server_error()), Ok("recovered".into())]);
        let controller = controller_with(generator);

        controller.submit_query("first").await;
        assert_eq!(controller.state(), TurnState::Errored);

        let outcome = controller.submit_query("second").await;
        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        assert_eq!(controller.state(), TurnState::Idle);
        assert!(controller.last_error().is_none());
        assert_eq!(controller.history().len(), 3);
    }

    #[tokio::test]
    async fn fallback_reply_is_a_normal_turn() {
        let generator = ScriptedGenerator::new(vec![Ok(NO_RESPONSE_FALLBACK.into())]);
        let controller = controller_with(generator);

        controller.submit_query("foreign policy").await;
        assert_eq!(controller.state(), TurnState::Idle);
        assert_eq!(
            controller.history().last(),
            Some(&Turn::assistant(NO_RESPONSE_FALLBACK))
        );
    }

    #[tokio::test]
    async fn blank_submission_is_ignored() {
        let generator = ScriptedGenerator::new(vec![]);
        let controller = controller_with(generator.clone());

        assert!(matches!(
            controller.submit_query("").await,
            SubmitOutcome::Ignored
        ));
        assert!(matches!(
            controller.submit_query("   \n\t").await,
            SubmitOutcome::Ignored
        ));
        assert!(controller.history().is_empty());
        assert_eq!(controller.state(), TurnState::Idle);
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn blank_submission_keeps_error_state() {
        let generator = ScriptedGenerator::new(vec![Err(server_error())]);
        let controller = controller_with(generator);
        controller.submit_query("fail").await;

        controller.submit_query(" ").await;
        assert_eq!(controller.state(), TurnState::Errored);
        assert_eq!(
            controller.last_error().as_deref(),
            Some(GENERIC_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn submission_while_pending_is_rejected() {
        let generator = Arc::new(GatedGenerator::default());
        let controller = controller_with(generator.clone());

        let background = controller.clone();
        let first = tokio::spawn(async move { background.submit_query("first").await });

        generator.started.notified().await;
        assert_eq!(controller.state(), TurnState::Pending);

        let second = controller.submit_query("second").await;
        assert!(matches!(second, SubmitOutcome::Busy));
        assert_eq!(controller.history(), vec![Turn::user("first")]);

        generator.release.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Answered(ref t) if t == "released"));
        assert_eq!(controller.state(), TurnState::Idle);
        assert_eq!(controller.history().len(), 2);
    }

    #[tokio::test]
    async fn user_turn_visible_before_generation_completes() {
        let generator = Arc::new(GatedGenerator::default());
        let controller = controller_with(generator.clone());

        let background = controller.clone();
        let task = tokio::spawn(async move { background.submit_query("early").await });

        generator.started.notified().await;
        let snap = controller.snapshot();
        assert_eq!(snap.history, vec![Turn::user("early")]);
        assert_eq!(snap.state, TurnState::Pending);

        generator.release.notify_one();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn input_buffer_cleared_after_success() {
        let generator = ScriptedGenerator::new(vec![Ok("reply".into())]);
        let controller = controller_with(generator);

        controller.set_input("governance");
        assert_eq!(controller.snapshot().input, "governance");

        let outcome = controller.submit_input().await;
        assert!(outcome.accepted());
        assert_eq!(controller.history()[0], Turn::user("governance"));
        assert!(controller.snapshot().input.is_empty());
    }

    #[tokio::test]
    async fn input_buffer_cleared_after_failure() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::Request(
            "connection refused".into(),
        ))]);
        let controller = controller_with(generator);

        controller.set_input("governance");
        controller.submit_input().await;
        assert!(controller.snapshot().input.is_empty());
        assert_eq!(controller.state(), TurnState::Errored);
    }

    #[tokio::test]
    async fn blank_input_buffer_is_ignored() {
        let generator = ScriptedGenerator::new(vec![]);
        let controller = controller_with(generator);
        controller.set_input("  ");
        assert!(matches!(
            controller.submit_input().await,
            SubmitOutcome::Ignored
        ));
    }

    #[test]
    fn snapshot_serializes_lowercase() {
        let snap = ConversationSnapshot {
            state: TurnState::Errored,
            history: vec![Turn::user("q"), Turn::assistant("a")],
            last_error: Some(GENERIC_ERROR_MESSAGE.into()),
            input: String::new(),
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["state"], "errored");
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][1]["role"], "assistant");
        assert_eq!(json["last_error"], GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn outcome_accepted() {
        assert!(!SubmitOutcome::Ignored.accepted());
        assert!(!SubmitOutcome::Busy.accepted());
        assert!(SubmitOutcome::Answered("x".into()).accepted());
        assert!(SubmitOutcome::Failed(server_error()).accepted());
    }

    /// Never settles on its first call; answers every later one.
    #[derive(Default)]
    struct StallOnceGenerator {
        stalled: std::sync::atomic::AtomicBool,
    }

    impl TextGenerator for StallOnceGenerator {
        fn generate<'a>(&'a self, _prompt: &'a str) -> GenerationFuture<'a> {
            if self.stalled.swap(true, std::sync::atomic::Ordering::SeqCst) {
                Box::pin(async { Ok("second answer".to_string()) })
            } else {
                Box::pin(std::future::pending())
            }
        }
    }

    #[tokio::test]
    async fn dropped_turn_settles_as_errored() {
        let controller = controller_with(Arc::new(StallOnceGenerator::default()));

        controller.set_input("first");
        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            controller.submit_input(),
        )
        .await;
        assert!(timed_out.is_err());

        let snap = controller.snapshot();
        assert_eq!(snap.state, TurnState::Errored);
        assert_eq!(snap.last_error.as_deref(), Some(GENERIC_ERROR_MESSAGE));
        assert_eq!(snap.history, vec![Turn::user("first")]);
        assert!(snap.input.is_empty());

        let outcome = controller.submit_query("second").await;
        assert!(matches!(outcome, SubmitOutcome::Answered(ref t) if t == "second answer"));
        assert_eq!(controller.state(), TurnState::Idle);
        assert_eq!(controller.history().len(), 3);
    }
}
