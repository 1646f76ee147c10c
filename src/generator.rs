//! Deterministic content generator
//!
//! Turns an idea profile into display-ready board feedback, market personas
//! and next actions without any external call. Everything is derived from
//! [`text_hash`] so the same idea always gets the same board.
//!
//! Board and market passes simulate a short "the board is thinking" delay.
//! That pause is a UX contract, not a performance artifact: it runs on the
//! async runtime and never blocks other work. Tests construct the generator
//! with a zero delay.

use crate::hash::text_hash;
use crate::templates::{
    self, advisor_templates, fill, market_segments, quality_label, ACTION_POOL,
};
use crate::types::{AdvisorType, BoardFeedback, FeedbackSketch, IdeaProfile, PersonaSketch, ADVISORS};
use std::time::Duration;

/// Seed phase for score derivation. Distinguishes the initial board pass
/// from the evidence re-score so the two draws are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorePhase {
    Initial,
    Evidence,
}

impl ScorePhase {
    fn tag(self) -> &'static str {
        match self {
            ScorePhase::Initial => "initial",
            ScorePhase::Evidence => "evidence",
        }
    }
}

/// Round to one decimal place for storage and display.
pub fn round1(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

/// Deterministic per-advisor score.
///
/// The initial draw lands in `[4.0, 8.9)`. The evidence draw adds a fixed
/// +1 plus a hash-derived improvement in `[0, 1.9)`, capped at 10. Returned
/// unrounded; callers round with [`round1`] for presentation.
pub fn seeded_score(profile: &IdeaProfile, advisor: AdvisorType, phase: ScorePhase) -> f64 {
    let h = text_hash(&format!(
        "{}{}{}{}",
        profile.name,
        profile.description,
        advisor.as_str(),
        phase.tag()
    ));
    let base = (h % 50) as f64 / 10.0 + 4.0;

    match phase {
        ScorePhase::Initial => base,
        ScorePhase::Evidence => {
            let improvement = (h % 20) as f64 / 10.0;
            (base + improvement + 1.0).min(10.0)
        }
    }
}

/// Produces all generated content. Construct once and inject wherever the
/// session engine needs it; the delay is the only piece of configuration.
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    thinking_delay: Duration,
}

impl Default for ContentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentGenerator {
    /// Production generator with the standard two-second thinking pause.
    pub fn new() -> Self {
        Self {
            thinking_delay: Duration::from_secs(2),
        }
    }

    /// Generator with a custom (usually zero) delay.
    pub fn with_delay(thinking_delay: Duration) -> Self {
        Self { thinking_delay }
    }

    async fn think(&self) {
        if !self.thinking_delay.is_zero() {
            tokio::time::sleep(self.thinking_delay).await;
        }
    }

    /// Full board pass: one entry per advisor, in fixed advisor order, plus
    /// the rounded average and a threshold verdict.
    pub async fn board_feedback(&self, profile: &IdeaProfile) -> BoardFeedback {
        self.think().await;

        let mut feedback = Vec::with_capacity(ADVISORS.len());
        for advisor in ADVISORS {
            let score = seeded_score(profile, advisor, ScorePhase::Initial);
            let quality = quality_label(score);
            let pool = advisor_templates(advisor);

            let diag_idx = text_hash(&format!("{}{}diag", profile.name, advisor.as_str()))
                as usize
                % pool.diagnoses.len();
            let presc_idx = text_hash(&format!("{}{}presc", profile.name, advisor.as_str()))
                as usize
                % pool.prescriptions.len();

            let diagnosis = fill(
                &fill(
                    &fill(pool.diagnoses[diag_idx], "{quality}", quality),
                    "{idea}",
                    &profile.name,
                ),
                "{audience}",
                &profile.target_audience,
            );
            let prescription = fill(
                &fill(pool.prescriptions[presc_idx], "{idea}", &profile.name),
                "{audience}",
                &profile.target_audience,
            );

            feedback.push(FeedbackSketch {
                advisor_type: advisor,
                score: round1(score),
                diagnosis,
                prescription,
            });
        }

        let average_score = round1(
            feedback.iter().map(|f| f.score).sum::<f64>() / feedback.len() as f64,
        );
        let verdict = templates::pattern_verdict(average_score).to_string();

        BoardFeedback {
            feedback,
            average_score,
            verdict,
        }
    }

    /// Exactly three personas, one per market segment. Variant indices and
    /// the willingness value are all derived from one idea-level hash plus a
    /// per-slot stride.
    pub async fn market_personas(&self, profile: &IdeaProfile) -> Vec<PersonaSketch> {
        self.think().await;

        let h = text_hash(&format!("{}{}", profile.name, profile.description));
        let segments = market_segments();

        let mut personas = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let i = i as u32;
            let name_idx = ((h + i) % segment.names.len() as u32) as usize;
            let desc_idx = ((h + i * 2) % segment.descriptions.len() as u32) as usize;
            let reaction_idx = ((h + i * 3) % segment.reactions.len() as u32) as usize;

            let (min, max) = segment.willingness_range;
            let willingness = min + (h + i * 10) % (max - min);

            personas.push(PersonaSketch {
                persona_name: segment.names[name_idx].to_string(),
                persona_description: segment.descriptions[desc_idx].to_string(),
                reaction_quote: fill(segment.reactions[reaction_idx], "{idea}", &profile.name),
                willingness_to_buy: willingness,
            });
        }

        personas
    }

    /// Evidence-phase board pass: the re-scoring policy applied to the prior
    /// batch, behind the same thinking pause as the other passes.
    pub async fn evidence_review(
        &self,
        profile: &IdeaProfile,
        evidence: &str,
        prior: &[FeedbackSketch],
    ) -> BoardFeedback {
        self.think().await;
        crate::rescore::review_evidence(profile, evidence, prior)
    }

    /// Five distinct actions from the fixed pool, hash-plus-stride selected.
    ///
    /// The offset advances every iteration, not only on insert, so the
    /// picker terminates even when the stride collides; a pool smaller than
    /// five just yields the whole pool.
    pub fn next_actions(&self, profile: &IdeaProfile) -> Vec<String> {
        let pool = &ACTION_POOL;
        let want = pool.len().min(5);
        let h = text_hash(&format!("{}{}", profile.name, profile.description)) as u64;

        let mut picked: Vec<usize> = Vec::with_capacity(want);
        let mut offset: u64 = 0;
        while picked.len() < want {
            let idx = ((h + offset * 7) % pool.len() as u64) as usize;
            if !picked.contains(&idx) {
                picked.push(idx);
            }
            offset += 1;
        }

        picked.into_iter().map(|i| pool[i].to_string()).collect()
    }
}
