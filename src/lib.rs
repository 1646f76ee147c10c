//! founderboard - Simulated Board of Advisors
//!
//! A validation funnel for founder ideas: describe an idea, get it scored
//! by a five-advisor board, watch three market personas react, then come
//! back with real-world evidence and get re-scored.
//!
//! All generated content is deterministic: scores, diagnoses, personas and
//! checklists derive from a text hash of the idea itself, so the same idea
//! always gets the same board. No models, no network calls.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use founderboard::{ContentGenerator, IdeaProfile, SessionEngine, SqliteStore};
//! use std::sync::Arc;
//!
//! let store = SqliteStore::open(&db_path)?;
//! let engine = SessionEngine::new(Arc::new(store));
//!
//! let session = engine.create_session(&user.id, &idea)?;
//! let view = engine.ensure_pattern_check(&user.id, &session.id).await?;   // board scores
//! let view = engine.run_market_sim(&user.id, &session.id).await?;         // personas
//! let view = engine.submit_evidence(&user.id, &session.id, evidence).await?; // re-score
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    CLI / caller                   │
//! └───────────────────────┬──────────────────────────┘
//!                         ▼
//! ┌──────────────────────────────────────────────────┐
//! │   SessionEngine — staged funnel state machine     │
//! │   intake → pattern_check → market_sim → evidence  │
//! └───────┬──────────────────────────────┬───────────┘
//!         ▼                              ▼
//! ┌──────────────────┐      ┌───────────────────────┐
//! │ ContentGenerator │      │ SessionStore (SQLite) │
//! │ hash → templates │      │ sessions + feedback   │
//! └──────────────────┘      └───────────────────────┘
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod generator;
pub mod hash;
pub mod rescore;
pub mod session;
pub mod templates;
pub mod types;

// Core types
pub use db::{init_db, SessionPatch, SessionStore, SqliteStore, TransitionBatch};
pub use error::Error;
pub use session::SessionEngine;
pub use types::*;

// Deterministic content generation
pub use generator::{round1, seeded_score, ContentGenerator, ScorePhase};
pub use rescore::{review_evidence, EvidenceSignals};

// Identity
pub use auth::{IdentityGateway, SqliteIdentity};
