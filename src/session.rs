//! Session state machine
//!
//! Drives a session through the funnel: intake, board pattern check, market
//! simulation, evidence re-check. Every transition follows the same shape:
//! validate preconditions, generate content, then commit the derived rows
//! and the session patch in one store transaction. A failure anywhere
//! persists nothing, so callers can simply retry.
//!
//! Every entry point is scoped to an owner: a session that belongs to a
//! different account behaves exactly like a missing one.
//!
//! The stage column is monotonic. Transitions that already ran are detected
//! from their derived rows and become no-ops, never a second generation.

use crate::db::{SessionPatch, SessionStore, TransitionBatch};
use crate::error::Error;
use crate::generator::ContentGenerator;
use crate::types::{
    AdvisorFeedbackEntry, BoardFeedback, IdeaProfile, MarketPersona, NextAction, Phase,
    SessionView, Stage, ValidationSession,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(30);

/// The three generative transitions, used to key the in-flight guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Transition {
    PatternCheck,
    MarketSim,
    EvidenceCheck,
}

pub struct SessionEngine {
    store: Arc<dyn SessionStore>,
    generator: ContentGenerator,
    transition_timeout: Duration,
    in_flight: Mutex<HashSet<(String, Transition)>>,
}

/// Releases the in-flight slot when the transition finishes, however it
/// finishes.
struct InFlightGuard<'a> {
    engine: &'a SessionEngine,
    key: (String, Transition),
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self
            .engine
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        set.remove(&self.key);
    }
}

impl SessionEngine {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            generator: ContentGenerator::new(),
            transition_timeout: DEFAULT_TRANSITION_TIMEOUT,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Swap the generator (tests use a zero "thinking" delay).
    pub fn with_generator(mut self, generator: ContentGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transition_timeout = timeout;
        self
    }

    /// Intake: validate the profile and persist a fresh session.
    pub fn create_session(
        &self,
        owner_id: &str,
        idea: &IdeaProfile,
    ) -> Result<ValidationSession, Error> {
        idea.validate()?;
        let session = self.store.create_session(owner_id, idea)?;
        info!(session_id = %session.id, idea = %idea.name, "session created");
        Ok(session)
    }

    pub fn sessions(&self, owner_id: &str) -> Result<Vec<ValidationSession>, Error> {
        self.store.list_sessions(owner_id)
    }

    /// Assemble the full read model for one of the owner's sessions.
    pub fn view(&self, owner_id: &str, session_id: &str) -> Result<SessionView, Error> {
        let session = self
            .store
            .get_session(session_id)?
            .filter(|s| s.owner_id == owner_id)
            .ok_or_else(|| Error::NotFound(session_id.to_string()))?;

        let mut pattern_feedback = Vec::new();
        let mut evidence_feedback = Vec::new();
        for entry in self.store.get_feedback(session_id)? {
            match entry.phase {
                Phase::PatternCheck => pattern_feedback.push(entry),
                Phase::EvidenceCheck => evidence_feedback.push(entry),
            }
        }

        Ok(SessionView {
            personas: self.store.get_personas(session_id)?,
            actions: self.store.get_actions(session_id)?,
            session,
            pattern_feedback,
            evidence_feedback,
        })
    }

    /// Run the board pattern check if it has not run yet.
    ///
    /// Idempotent: an existing pattern-check batch short-circuits, so
    /// revisiting a session never regenerates feedback or actions.
    pub async fn ensure_pattern_check(
        &self,
        owner_id: &str,
        session_id: &str,
    ) -> Result<SessionView, Error> {
        let view = self.view(owner_id, session_id)?;
        if view.has_pattern_check() {
            return Ok(view);
        }

        let _guard = self.acquire(session_id, Transition::PatternCheck)?;
        // Re-check under the guard in case another call just finished.
        let view = self.view(owner_id, session_id)?;
        if view.has_pattern_check() {
            return Ok(view);
        }

        let session = view.session;
        self.bounded(async {
            let board = self.generator.board_feedback(&session.idea).await;
            let actions = self.generator.next_actions(&session.idea);

            let batch = TransitionBatch {
                feedback: feedback_rows(session_id, Phase::PatternCheck, &board),
                actions: action_rows(session_id, &actions),
                ..Default::default()
            };
            self.store
                .apply_transition(session_id, &batch, &board_patch(&session, Stage::PatternCheck, &board))?;

            info!(
                session_id,
                score = board.average_score,
                "pattern check complete"
            );
            Ok(())
        })
        .await?;

        self.view(owner_id, session_id)
    }

    /// Generate the three market personas if they do not exist yet.
    ///
    /// Requires a completed pattern check; idempotent once personas exist.
    pub async fn run_market_sim(
        &self,
        owner_id: &str,
        session_id: &str,
    ) -> Result<SessionView, Error> {
        let view = self.view(owner_id, session_id)?;
        if !view.has_pattern_check() {
            return Err(Error::Validation(
                "run the board pattern check before simulating the market".into(),
            ));
        }
        if view.has_market_sim() {
            return Ok(view);
        }

        let _guard = self.acquire(session_id, Transition::MarketSim)?;
        let view = self.view(owner_id, session_id)?;
        if view.has_market_sim() {
            return Ok(view);
        }

        let session = view.session;
        self.bounded(async {
            let sketches = self.generator.market_personas(&session.idea).await;
            let now = Utc::now();
            let personas: Vec<MarketPersona> = sketches
                .into_iter()
                .map(|p| MarketPersona {
                    id: uuid::Uuid::new_v4().to_string(),
                    session_id: session_id.to_string(),
                    persona_name: p.persona_name,
                    persona_description: p.persona_description,
                    reaction_quote: p.reaction_quote,
                    willingness_to_buy: p.willingness_to_buy,
                    created_at: now,
                })
                .collect();

            let batch = TransitionBatch {
                personas,
                ..Default::default()
            };
            let patch = SessionPatch {
                stage: Some(session.stage.max(Stage::MarketSim)),
                ..Default::default()
            };
            self.store.apply_transition(session_id, &batch, &patch)?;

            info!(session_id, "market simulation complete");
            Ok(())
        })
        .await?;

        self.view(owner_id, session_id)
    }

    /// Re-score the board against submitted evidence.
    ///
    /// Requires the market simulation to have run and more than 20
    /// characters of trimmed evidence. Runs at most once per session.
    pub async fn submit_evidence(
        &self,
        owner_id: &str,
        session_id: &str,
        evidence: &str,
    ) -> Result<SessionView, Error> {
        if evidence.trim().len() <= 20 {
            return Err(Error::Validation(
                "evidence must be longer than 20 characters".into(),
            ));
        }

        let view = self.view(owner_id, session_id)?;
        if !view.has_market_sim() {
            return Err(Error::Validation(
                "run the market simulation before submitting evidence".into(),
            ));
        }
        if view.has_evidence_check() {
            return Err(Error::Validation(
                "evidence has already been submitted for this session".into(),
            ));
        }

        let _guard = self.acquire(session_id, Transition::EvidenceCheck)?;
        let view = self.view(owner_id, session_id)?;
        if view.has_evidence_check() {
            return Err(Error::Validation(
                "evidence has already been submitted for this session".into(),
            ));
        }

        let session = view.session;
        let prior: Vec<_> = view
            .pattern_feedback
            .iter()
            .map(|entry| crate::types::FeedbackSketch {
                advisor_type: entry.advisor_type,
                score: entry.score,
                diagnosis: entry.diagnosis.clone(),
                prescription: entry.prescription.clone(),
            })
            .collect();

        self.bounded(async {
            let board = self
                .generator
                .evidence_review(&session.idea, evidence, &prior)
                .await;

            let batch = TransitionBatch {
                feedback: feedback_rows(session_id, Phase::EvidenceCheck, &board),
                ..Default::default()
            };
            self.store
                .apply_transition(session_id, &batch, &board_patch(&session, Stage::EvidenceCheck, &board))?;

            info!(
                session_id,
                score = board.average_score,
                "evidence review complete"
            );
            Ok(())
        })
        .await?;

        self.view(owner_id, session_id)
    }

    /// Mark one of the owner's checklist items done or undone.
    pub fn toggle_action(
        &self,
        owner_id: &str,
        action_id: &str,
        is_completed: bool,
    ) -> Result<(), Error> {
        let action = self
            .store
            .get_action(action_id)?
            .ok_or_else(|| Error::NotFound(action_id.to_string()))?;
        let owned = self
            .store
            .get_session(&action.session_id)?
            .map(|s| s.owner_id == owner_id)
            .unwrap_or(false);
        if !owned {
            // Indistinguishable from a missing action on purpose.
            return Err(Error::NotFound(action_id.to_string()));
        }
        self.store.update_action(action_id, is_completed)
    }

    fn acquire(&self, session_id: &str, transition: Transition) -> Result<InFlightGuard<'_>, Error> {
        let key = (session_id.to_string(), transition);
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(key.clone()) {
            return Err(Error::Conflict(session_id.to_string()));
        }
        Ok(InFlightGuard { engine: self, key })
    }

    async fn bounded<F>(&self, fut: F) -> Result<(), Error>
    where
        F: std::future::Future<Output = Result<(), Error>>,
    {
        tokio::time::timeout(self.transition_timeout, fut)
            .await
            .map_err(|_| Error::Timeout(self.transition_timeout))?
    }
}

/// Patch carrying a board result, never moving the stage back.
fn board_patch(session: &ValidationSession, target: Stage, board: &BoardFeedback) -> SessionPatch {
    SessionPatch {
        stage: Some(session.stage.max(target)),
        board_score: Some(board.average_score),
        last_verdict: Some(board.verdict.clone()),
    }
}

fn feedback_rows(
    session_id: &str,
    phase: Phase,
    board: &BoardFeedback,
) -> Vec<AdvisorFeedbackEntry> {
    let now = Utc::now();
    board
        .feedback
        .iter()
        .map(|sketch| AdvisorFeedbackEntry {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            advisor_type: sketch.advisor_type,
            phase,
            score: sketch.score,
            diagnosis: sketch.diagnosis.clone(),
            prescription: sketch.prescription.clone(),
            created_at: now,
        })
        .collect()
}

fn action_rows(session_id: &str, actions: &[String]) -> Vec<NextAction> {
    let now = Utc::now();
    actions
        .iter()
        .enumerate()
        .map(|(i, text)| NextAction {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            action_text: text.clone(),
            is_completed: false,
            order_index: i as u32,
            created_at: now,
        })
        .collect()
}
