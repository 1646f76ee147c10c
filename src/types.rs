//! Core types for the founderboard validation funnel
//!
//! A session walks a fixed four-step funnel. The stage only ever moves
//! forward; per-phase advisor feedback is append-only so the UI can show
//! old-vs-new score deltas after an evidence resubmission.

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The idea being validated. Captured once at intake, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaProfile {
    pub name: String,
    pub description: String,
    pub target_audience: String,
}

impl IdeaProfile {
    /// Intake preconditions: non-empty name, a description longer than 20
    /// characters and an audience longer than 10 (whitespace-trimmed).
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("idea name must not be empty".into()));
        }
        if self.description.trim().len() <= 20 {
            return Err(Error::Validation(
                "idea description must be longer than 20 characters".into(),
            ));
        }
        if self.target_audience.trim().len() <= 10 {
            return Err(Error::Validation(
                "target audience must be longer than 10 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Position in the validation funnel. Ordering matters: stage transitions
/// are monotonic and compare by this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Intake,
    PatternCheck,
    MarketSim,
    EvidenceCheck,
    Completed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Intake => "intake",
            Stage::PatternCheck => "pattern_check",
            Stage::MarketSim => "market_sim",
            Stage::EvidenceCheck => "evidence_check",
            Stage::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Stage> {
        match s {
            "intake" => Some(Stage::Intake),
            "pattern_check" => Some(Stage::PatternCheck),
            "market_sim" => Some(Stage::MarketSim),
            "evidence_check" => Some(Stage::EvidenceCheck),
            "completed" => Some(Stage::Completed),
            _ => None,
        }
    }
}

/// One of the five fixed feedback angles on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorType {
    Operator,
    Growth,
    Finance,
    Product,
    Skeptic,
}

/// All advisors, in the order feedback is generated and displayed.
pub const ADVISORS: [AdvisorType; 5] = [
    AdvisorType::Operator,
    AdvisorType::Growth,
    AdvisorType::Finance,
    AdvisorType::Product,
    AdvisorType::Skeptic,
];

impl AdvisorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisorType::Operator => "operator",
            AdvisorType::Growth => "growth",
            AdvisorType::Finance => "finance",
            AdvisorType::Product => "product",
            AdvisorType::Skeptic => "skeptic",
        }
    }

    pub fn parse(s: &str) -> Option<AdvisorType> {
        match s {
            "operator" => Some(AdvisorType::Operator),
            "growth" => Some(AdvisorType::Growth),
            "finance" => Some(AdvisorType::Finance),
            "product" => Some(AdvisorType::Product),
            "skeptic" => Some(AdvisorType::Skeptic),
            _ => None,
        }
    }
}

/// Which batch of advisor feedback a score belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PatternCheck,
    EvidenceCheck,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PatternCheck => "pattern_check",
            Phase::EvidenceCheck => "evidence_check",
        }
    }

    pub fn parse(s: &str) -> Option<Phase> {
        match s {
            "pattern_check" => Some(Phase::PatternCheck),
            "evidence_check" => Some(Phase::EvidenceCheck),
            _ => None,
        }
    }
}

/// A validation session: one idea, one funnel walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSession {
    pub id: String,
    pub owner_id: String,
    pub idea: IdeaProfile,
    pub stage: Stage,
    pub board_score: f64,
    pub last_verdict: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One advisor's take on the idea for one phase. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorFeedbackEntry {
    pub id: String,
    pub session_id: String,
    pub advisor_type: AdvisorType,
    pub phase: Phase,
    pub score: f64,
    pub diagnosis: String,
    pub prescription: String,
    pub created_at: DateTime<Utc>,
}

/// A synthetic potential customer produced by the market simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPersona {
    pub id: String,
    pub session_id: String,
    pub persona_name: String,
    pub persona_description: String,
    pub reaction_quote: String,
    pub willingness_to_buy: u32,
    pub created_at: DateTime<Utc>,
}

/// A checklist item derived at pattern-check time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextAction {
    pub id: String,
    pub session_id: String,
    pub action_text: String,
    pub is_completed: bool,
    pub order_index: u32,
    pub created_at: DateTime<Utc>,
}

/// Generated feedback before it is persisted (no id / session binding yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSketch {
    pub advisor_type: AdvisorType,
    pub score: f64,
    pub diagnosis: String,
    pub prescription: String,
}

/// A generated persona before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaSketch {
    pub persona_name: String,
    pub persona_description: String,
    pub reaction_quote: String,
    pub willingness_to_buy: u32,
}

/// Output of a full board pass: five sketches plus the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardFeedback {
    pub feedback: Vec<FeedbackSketch>,
    pub average_score: f64,
    pub verdict: String,
}

/// Everything the session screen needs, assembled in one read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session: ValidationSession,
    pub pattern_feedback: Vec<AdvisorFeedbackEntry>,
    pub evidence_feedback: Vec<AdvisorFeedbackEntry>,
    pub personas: Vec<MarketPersona>,
    pub actions: Vec<NextAction>,
}

impl SessionView {
    /// The most advanced feedback batch wins the "current" slot; the older
    /// batch stays available for before/after comparison.
    pub fn current_feedback(&self) -> &[AdvisorFeedbackEntry] {
        if self.evidence_feedback.is_empty() {
            &self.pattern_feedback
        } else {
            &self.evidence_feedback
        }
    }

    pub fn has_pattern_check(&self) -> bool {
        !self.pattern_feedback.is_empty()
    }

    pub fn has_market_sim(&self) -> bool {
        !self.personas.is_empty()
    }

    pub fn has_evidence_check(&self) -> bool {
        !self.evidence_feedback.is_empty()
    }
}

/// An account known to the identity gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
