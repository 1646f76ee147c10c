//! Evidence re-scoring policy
//!
//! Turns a freeform evidence submission into score deltas over the prior
//! pattern-check batch. Submitting evidence always buys at least +0.5 over
//! the prior score; stronger signals in the text can push the fresh draw
//! above that floor. Everything caps at 10, which means an advisor already
//! near the ceiling only inches up (see DESIGN.md on the ceiling effect).

use crate::generator::{round1, seeded_score, ScorePhase};
use crate::hash::text_hash;
use crate::templates::{evidence_verdict, CONCERN_PHRASES, IMPROVEMENT_PHRASES};
use crate::types::{BoardFeedback, FeedbackSketch, IdeaProfile};

/// Keywords whose presence marks the evidence as grounded in real people.
const USER_KEYWORDS: [&str; 5] = ["user", "customer", "person", "people", "interview"];

/// Crude signals extracted from the evidence text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceSignals {
    /// More than 100 characters of evidence.
    pub substantial: bool,
    /// Contains at least one digit.
    pub has_numbers: bool,
    /// Mentions users, customers, people or interviews.
    pub mentions_users: bool,
}

impl EvidenceSignals {
    pub fn extract(evidence: &str) -> Self {
        let lower = evidence.to_lowercase();
        Self {
            substantial: evidence.len() > 100,
            has_numbers: evidence.chars().any(|c| c.is_ascii_digit()),
            mentions_users: USER_KEYWORDS.iter().any(|kw| lower.contains(kw)),
        }
    }

    /// Additive score bonus: 0.3 / 0.4 / 0.3 per signal.
    pub fn bonus(&self) -> f64 {
        let mut bonus = 0.0;
        if self.substantial {
            bonus += 0.3;
        }
        if self.has_numbers {
            bonus += 0.4;
        }
        if self.mentions_users {
            bonus += 0.3;
        }
        bonus
    }
}

/// Re-score the prior batch against new evidence.
///
/// Per advisor: a fresh evidence-phase draw plus the signal bonus, floored
/// at `prior + 0.5` and capped at 10. The diagnosis is rewritten as
/// improvement phrase + first clause of the prior diagnosis + concern
/// phrase; the prescription carries over unchanged.
pub fn review_evidence(
    profile: &IdeaProfile,
    evidence: &str,
    prior: &[FeedbackSketch],
) -> BoardFeedback {
    let signals = EvidenceSignals::extract(evidence);
    let bonus = signals.bonus();

    let feedback: Vec<FeedbackSketch> = prior
        .iter()
        .map(|prev| {
            let fresh = seeded_score(profile, prev.advisor_type, ScorePhase::Evidence);
            let score = (fresh + bonus).max(prev.score + 0.5).min(10.0);

            let h = text_hash(&format!(
                "{}{}evidence",
                profile.name,
                prev.advisor_type.as_str()
            ));
            let improvement = IMPROVEMENT_PHRASES[h as usize % IMPROVEMENT_PHRASES.len()];
            let concern = CONCERN_PHRASES[(h as usize + 1) % CONCERN_PHRASES.len()];
            let first_clause = prev.diagnosis.split('.').next().unwrap_or("");

            FeedbackSketch {
                advisor_type: prev.advisor_type,
                score: round1(score),
                diagnosis: format!("{improvement} {first_clause}, {concern}"),
                prescription: prev.prescription.clone(),
            }
        })
        .collect();

    let average_score = round1(
        feedback.iter().map(|f| f.score).sum::<f64>() / feedback.len().max(1) as f64,
    );
    let verdict = evidence_verdict(average_score).to_string();

    BoardFeedback {
        feedback,
        average_score,
        verdict,
    }
}
