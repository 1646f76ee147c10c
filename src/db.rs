//! Persistence gateway for sessions and their derived rows
//!
//! SQLite, single file, zero network dependencies. The narrow contract the
//! state machine consumes is the [`SessionStore`] trait; the production
//! implementation wraps one `rusqlite` connection behind a mutex. There is
//! no global client: the application entry point opens the store and
//! injects it into whatever needs it.
//!
//! A funnel transition writes derived rows (feedback, personas, actions)
//! plus a session patch. [`SessionStore::apply_transition`] commits them in
//! one transaction so a failure never leaves the derived rows without the
//! matching stage and score.

use crate::error::Error;
use crate::types::{
    AdvisorFeedbackEntry, AdvisorType, IdeaProfile, MarketPersona, NextAction, Phase, Stage,
    ValidationSession,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Mutex;

/// Initialize the database with schema
pub fn init_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {:?}", path))?;

    conn.execute_batch(SCHEMA)?;

    Ok(conn)
}

const SCHEMA: &str = r#"
-- Sessions: one idea, one funnel walk
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    idea_name TEXT NOT NULL,
    idea_description TEXT NOT NULL,
    target_audience TEXT NOT NULL,
    current_stage TEXT NOT NULL DEFAULT 'intake',
    board_score REAL NOT NULL DEFAULT 0,
    last_verdict TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_owner ON sessions(owner_id);
CREATE INDEX IF NOT EXISTS idx_sessions_updated ON sessions(updated_at);

-- Advisor feedback: append-only, two batches of five per session
CREATE TABLE IF NOT EXISTS advisor_feedback (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    advisor_type TEXT NOT NULL,
    phase TEXT NOT NULL,
    score REAL NOT NULL,
    diagnosis TEXT NOT NULL,
    prescription TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(session_id, phase, advisor_type)
);

CREATE INDEX IF NOT EXISTS idx_feedback_session ON advisor_feedback(session_id);

-- Market personas: exactly three per session, generated once
CREATE TABLE IF NOT EXISTS market_personas (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    persona_name TEXT NOT NULL,
    persona_description TEXT NOT NULL,
    reaction_quote TEXT NOT NULL,
    willingness_to_buy INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_personas_session ON market_personas(session_id);

-- Next actions: five per session, only is_completed ever changes
CREATE TABLE IF NOT EXISTS next_actions (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    action_text TEXT NOT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    order_index INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_actions_session ON next_actions(session_id);

-- Accounts and login tokens (identity gateway)
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_digest TEXT NOT NULL,
    salt TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS auth_tokens (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL
);
"#;

/// Partial update applied to a session. Unset fields keep their persisted
/// values; `updated_at` is stamped on every call.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub stage: Option<Stage>,
    pub board_score: Option<f64>,
    pub last_verdict: Option<String>,
}

/// The derived rows one funnel transition produces. Empty collections are
/// skipped, so a pure session patch is a transition with an empty batch.
#[derive(Debug, Clone, Default)]
pub struct TransitionBatch {
    pub feedback: Vec<AdvisorFeedbackEntry>,
    pub personas: Vec<MarketPersona>,
    pub actions: Vec<NextAction>,
}

/// The persistence contract the session state machine consumes.
pub trait SessionStore: Send + Sync {
    fn create_session(&self, owner_id: &str, idea: &IdeaProfile)
        -> Result<ValidationSession, Error>;
    fn get_session(&self, id: &str) -> Result<Option<ValidationSession>, Error>;
    fn list_sessions(&self, owner_id: &str) -> Result<Vec<ValidationSession>, Error>;

    /// Atomically insert a transition's derived rows and patch the session.
    /// On any failure nothing is persisted and the call can be retried.
    fn apply_transition(
        &self,
        session_id: &str,
        batch: &TransitionBatch,
        patch: &SessionPatch,
    ) -> Result<(), Error>;
    fn update_action(&self, id: &str, is_completed: bool) -> Result<(), Error>;

    fn get_feedback(&self, session_id: &str) -> Result<Vec<AdvisorFeedbackEntry>, Error>;
    fn get_personas(&self, session_id: &str) -> Result<Vec<MarketPersona>, Error>;
    fn get_actions(&self, session_id: &str) -> Result<Vec<NextAction>, Error>;
    fn get_action(&self, id: &str) -> Result<Option<NextAction>, Error>;
}

/// SQLite-backed store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = init_db(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Wrap an already-open connection (tests).
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Poisoning only happens if a holder panicked; the connection itself
        // is still usable for the remaining operations.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_timestamp(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<ValidationSession> {
    let stage_raw: String = row.get(5)?;
    let stage = Stage::parse(&stage_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown stage '{stage_raw}'").into(),
        )
    })?;
    let created_raw: String = row.get(8)?;
    let updated_raw: String = row.get(9)?;

    Ok(ValidationSession {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        idea: IdeaProfile {
            name: row.get(2)?,
            description: row.get(3)?,
            target_audience: row.get(4)?,
        },
        stage,
        board_score: row.get(6)?,
        last_verdict: row.get(7)?,
        created_at: parse_timestamp(&created_raw, 8)?,
        updated_at: parse_timestamp(&updated_raw, 9)?,
    })
}

fn action_from_row(row: &Row<'_>) -> rusqlite::Result<NextAction> {
    let created_raw: String = row.get(5)?;
    let completed: i32 = row.get(3)?;
    Ok(NextAction {
        id: row.get(0)?,
        session_id: row.get(1)?,
        action_text: row.get(2)?,
        is_completed: completed != 0,
        order_index: row.get(4)?,
        created_at: parse_timestamp(&created_raw, 5)?,
    })
}

const SESSION_COLUMNS: &str = "id, owner_id, idea_name, idea_description, target_audience, \
     current_stage, board_score, last_verdict, created_at, updated_at";

const ACTION_COLUMNS: &str = "id, session_id, action_text, is_completed, order_index, created_at";

fn insert_feedback_rows(conn: &Connection, entries: &[AdvisorFeedbackEntry]) -> Result<(), Error> {
    for entry in entries {
        conn.execute(
            r#"
            INSERT INTO advisor_feedback (id, session_id, advisor_type, phase, score,
                                          diagnosis, prescription, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                entry.id,
                entry.session_id,
                entry.advisor_type.as_str(),
                entry.phase.as_str(),
                entry.score,
                entry.diagnosis,
                entry.prescription,
                entry.created_at.to_rfc3339(),
            ],
        )?;
    }
    Ok(())
}

fn insert_persona_rows(conn: &Connection, entries: &[MarketPersona]) -> Result<(), Error> {
    for entry in entries {
        conn.execute(
            r#"
            INSERT INTO market_personas (id, session_id, persona_name, persona_description,
                                         reaction_quote, willingness_to_buy, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.id,
                entry.session_id,
                entry.persona_name,
                entry.persona_description,
                entry.reaction_quote,
                entry.willingness_to_buy,
                entry.created_at.to_rfc3339(),
            ],
        )?;
    }
    Ok(())
}

fn insert_action_rows(conn: &Connection, entries: &[NextAction]) -> Result<(), Error> {
    for entry in entries {
        conn.execute(
            r#"
            INSERT INTO next_actions (id, session_id, action_text, is_completed,
                                      order_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                entry.id,
                entry.session_id,
                entry.action_text,
                entry.is_completed as i32,
                entry.order_index,
                entry.created_at.to_rfc3339(),
            ],
        )?;
    }
    Ok(())
}

impl SessionStore for SqliteStore {
    fn create_session(
        &self,
        owner_id: &str,
        idea: &IdeaProfile,
    ) -> Result<ValidationSession, Error> {
        let now = Utc::now();
        let session = ValidationSession {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            idea: idea.clone(),
            stage: Stage::Intake,
            board_score: 0.0,
            last_verdict: String::new(),
            created_at: now,
            updated_at: now,
        };

        self.lock().execute(
            r#"
            INSERT INTO sessions (id, owner_id, idea_name, idea_description, target_audience,
                                  current_stage, board_score, last_verdict, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                session.id,
                session.owner_id,
                session.idea.name,
                session.idea.description,
                session.idea.target_audience,
                session.stage.as_str(),
                session.board_score,
                session.last_verdict,
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(session)
    }

    fn get_session(&self, id: &str) -> Result<Option<ValidationSession>, Error> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map([id], session_from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    fn list_sessions(&self, owner_id: &str) -> Result<Vec<ValidationSession>, Error> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE owner_id = ?1 ORDER BY updated_at DESC"
        ))?;
        let sessions = stmt
            .query_map([owner_id], session_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    fn apply_transition(
        &self,
        session_id: &str,
        batch: &TransitionBatch,
        patch: &SessionPatch,
    ) -> Result<(), Error> {
        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;

        insert_feedback_rows(&tx, &batch.feedback)?;
        insert_persona_rows(&tx, &batch.personas)?;
        insert_action_rows(&tx, &batch.actions)?;

        let changed = tx.execute(
            r#"
            UPDATE sessions
            SET current_stage = COALESCE(?2, current_stage),
                board_score   = COALESCE(?3, board_score),
                last_verdict  = COALESCE(?4, last_verdict),
                updated_at    = ?5
            WHERE id = ?1
            "#,
            params![
                session_id,
                patch.stage.map(|s| s.as_str()),
                patch.board_score,
                patch.last_verdict.as_deref(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            // Dropping the open transaction rolls the inserts back.
            return Err(Error::NotFound(session_id.to_string()));
        }

        tx.commit()?;
        Ok(())
    }

    fn update_action(&self, id: &str, is_completed: bool) -> Result<(), Error> {
        let changed = self.lock().execute(
            "UPDATE next_actions SET is_completed = ?2 WHERE id = ?1",
            params![id, is_completed as i32],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_feedback(&self, session_id: &str) -> Result<Vec<AdvisorFeedbackEntry>, Error> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, session_id, advisor_type, phase, score, diagnosis, prescription, created_at
            FROM advisor_feedback WHERE session_id = ?1 ORDER BY rowid
            "#,
        )?;
        let entries = stmt
            .query_map([session_id], |row| {
                let advisor_raw: String = row.get(2)?;
                let phase_raw: String = row.get(3)?;
                let created_raw: String = row.get(7)?;
                let advisor_type = AdvisorType::parse(&advisor_raw).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        format!("unknown advisor '{advisor_raw}'").into(),
                    )
                })?;
                let phase = Phase::parse(&phase_raw).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        format!("unknown phase '{phase_raw}'").into(),
                    )
                })?;
                Ok(AdvisorFeedbackEntry {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    advisor_type,
                    phase,
                    score: row.get(4)?,
                    diagnosis: row.get(5)?,
                    prescription: row.get(6)?,
                    created_at: parse_timestamp(&created_raw, 7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn get_personas(&self, session_id: &str) -> Result<Vec<MarketPersona>, Error> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, session_id, persona_name, persona_description, reaction_quote,
                   willingness_to_buy, created_at
            FROM market_personas WHERE session_id = ?1 ORDER BY rowid
            "#,
        )?;
        let personas = stmt
            .query_map([session_id], |row| {
                let created_raw: String = row.get(6)?;
                Ok(MarketPersona {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    persona_name: row.get(2)?,
                    persona_description: row.get(3)?,
                    reaction_quote: row.get(4)?,
                    willingness_to_buy: row.get(5)?,
                    created_at: parse_timestamp(&created_raw, 6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(personas)
    }

    fn get_actions(&self, session_id: &str) -> Result<Vec<NextAction>, Error> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACTION_COLUMNS} FROM next_actions WHERE session_id = ?1 ORDER BY order_index"
        ))?;
        let actions = stmt
            .query_map([session_id], action_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(actions)
    }

    fn get_action(&self, id: &str) -> Result<Option<NextAction>, Error> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACTION_COLUMNS} FROM next_actions WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map([id], action_from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        (store, dir)
    }

    fn test_idea() -> IdeaProfile {
        IdeaProfile {
            name: "TaskFlow Pro".into(),
            description: "A smart task management app for busy teams".into(),
            target_audience: "Remote workers everywhere".into(),
        }
    }

    fn feedback_entry(session_id: &str, advisor: AdvisorType, phase: Phase) -> AdvisorFeedbackEntry {
        AdvisorFeedbackEntry {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            advisor_type: advisor,
            phase,
            score: 6.5,
            diagnosis: "Diagnosis.".into(),
            prescription: "Prescription.".into(),
            created_at: Utc::now(),
        }
    }

    fn feedback_batch(session_id: &str, phase: Phase) -> TransitionBatch {
        TransitionBatch {
            feedback: crate::types::ADVISORS
                .iter()
                .map(|&a| feedback_entry(session_id, a, phase))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_init_db_creates_tables() {
        let dir = tempdir().unwrap();
        let conn = init_db(&dir.path().join("test.db")).unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        for table in [
            "sessions",
            "advisor_feedback",
            "market_personas",
            "next_actions",
            "users",
            "auth_tokens",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_create_and_get_session() {
        let (store, _dir) = setup_store();
        let created = store.create_session("owner-1", &test_idea()).unwrap();
        assert_eq!(created.stage, Stage::Intake);
        assert_eq!(created.board_score, 0.0);
        assert_eq!(created.last_verdict, "");

        let fetched = store.get_session(&created.id).unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.idea, test_idea());
    }

    #[test]
    fn test_get_session_not_found_returns_none() {
        let (store, _dir) = setup_store();
        assert!(store.get_session("nope").unwrap().is_none());
    }

    #[test]
    fn test_patch_and_timestamp() {
        let (store, _dir) = setup_store();
        let created = store.create_session("owner-1", &test_idea()).unwrap();

        store
            .apply_transition(
                &created.id,
                &TransitionBatch::default(),
                &SessionPatch {
                    stage: Some(Stage::PatternCheck),
                    board_score: Some(6.4),
                    last_verdict: Some("Promising concept.".into()),
                },
            )
            .unwrap();

        let fetched = store.get_session(&created.id).unwrap().unwrap();
        assert_eq!(fetched.stage, Stage::PatternCheck);
        assert_eq!(fetched.board_score, 6.4);
        assert_eq!(fetched.last_verdict, "Promising concept.");
        assert!(fetched.updated_at >= created.updated_at);

        // Partial patch leaves other fields alone.
        store
            .apply_transition(
                &created.id,
                &TransitionBatch::default(),
                &SessionPatch {
                    stage: Some(Stage::MarketSim),
                    ..Default::default()
                },
            )
            .unwrap();
        let fetched = store.get_session(&created.id).unwrap().unwrap();
        assert_eq!(fetched.stage, Stage::MarketSim);
        assert_eq!(fetched.board_score, 6.4);
    }

    #[test]
    fn test_transition_against_missing_session_is_not_found() {
        let (store, _dir) = setup_store();
        let err = store
            .apply_transition("ghost", &TransitionBatch::default(), &SessionPatch::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_missing_session_rolls_back_derived_rows() {
        let (store, _dir) = setup_store();
        let batch = feedback_batch("ghost", Phase::PatternCheck);
        let err = store
            .apply_transition("ghost", &batch, &SessionPatch::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(store.get_feedback("ghost").unwrap().is_empty());
    }

    #[test]
    fn test_list_sessions_ordered_by_updated_desc() {
        let (store, _dir) = setup_store();
        let a = store.create_session("owner-1", &test_idea()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = store.create_session("owner-1", &test_idea()).unwrap();
        store.create_session("someone-else", &test_idea()).unwrap();

        let sessions = store.list_sessions("owner-1").unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, b.id);
        assert_eq!(sessions[1].id, a.id);

        // Touching the older session moves it to the front.
        std::thread::sleep(std::time::Duration::from_millis(5));
        store
            .apply_transition(&a.id, &TransitionBatch::default(), &SessionPatch::default())
            .unwrap();
        let sessions = store.list_sessions("owner-1").unwrap();
        assert_eq!(sessions[0].id, a.id);
    }

    #[test]
    fn test_transition_commits_rows_and_patch_together() {
        let (store, _dir) = setup_store();
        let session = store.create_session("owner-1", &test_idea()).unwrap();

        let batch = feedback_batch(&session.id, Phase::PatternCheck);
        store
            .apply_transition(
                &session.id,
                &batch,
                &SessionPatch {
                    stage: Some(Stage::PatternCheck),
                    board_score: Some(6.5),
                    last_verdict: Some("Promising concept.".into()),
                },
            )
            .unwrap();

        let fetched = store.get_feedback(&session.id).unwrap();
        assert_eq!(fetched.len(), 5);
        // Insertion order preserved.
        for (got, want) in fetched.iter().zip(&batch.feedback) {
            assert_eq!(got.advisor_type, want.advisor_type);
            assert_eq!(got.phase, Phase::PatternCheck);
        }
        let fetched = store.get_session(&session.id).unwrap().unwrap();
        assert_eq!(fetched.stage, Stage::PatternCheck);
        assert_eq!(fetched.board_score, 6.5);
    }

    #[test]
    fn test_duplicate_phase_batch_rolls_back_entirely() {
        let (store, _dir) = setup_store();
        let session = store.create_session("owner-1", &test_idea()).unwrap();

        store
            .apply_transition(
                &session.id,
                &feedback_batch(&session.id, Phase::PatternCheck),
                &SessionPatch {
                    stage: Some(Stage::PatternCheck),
                    board_score: Some(6.5),
                    ..Default::default()
                },
            )
            .unwrap();

        // A second pattern-check batch violates the per-phase uniqueness.
        let err = store
            .apply_transition(
                &session.id,
                &feedback_batch(&session.id, Phase::PatternCheck),
                &SessionPatch {
                    stage: Some(Stage::MarketSim),
                    board_score: Some(9.9),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));

        // Neither the rows nor the patch of the failed call landed.
        assert_eq!(store.get_feedback(&session.id).unwrap().len(), 5);
        let fetched = store.get_session(&session.id).unwrap().unwrap();
        assert_eq!(fetched.stage, Stage::PatternCheck);
        assert_eq!(fetched.board_score, 6.5);
    }

    #[test]
    fn test_evidence_batch_appends_not_overwrites() {
        let (store, _dir) = setup_store();
        let session = store.create_session("owner-1", &test_idea()).unwrap();

        store
            .apply_transition(
                &session.id,
                &feedback_batch(&session.id, Phase::PatternCheck),
                &SessionPatch::default(),
            )
            .unwrap();
        store
            .apply_transition(
                &session.id,
                &feedback_batch(&session.id, Phase::EvidenceCheck),
                &SessionPatch::default(),
            )
            .unwrap();

        let all = store.get_feedback(&session.id).unwrap();
        assert_eq!(all.len(), 10);
        assert_eq!(
            all.iter().filter(|f| f.phase == Phase::PatternCheck).count(),
            5
        );
    }

    #[test]
    fn test_actions_ordered_and_toggle_round_trip() {
        let (store, _dir) = setup_store();
        let session = store.create_session("owner-1", &test_idea()).unwrap();

        let actions: Vec<NextAction> = (0..5u32)
            .rev() // insert out of order to exercise the sort
            .map(|i| NextAction {
                id: format!("action-{i}"),
                session_id: session.id.clone(),
                action_text: format!("Action {i}"),
                is_completed: false,
                order_index: i,
                created_at: Utc::now(),
            })
            .collect();
        store
            .apply_transition(
                &session.id,
                &TransitionBatch {
                    actions,
                    ..Default::default()
                },
                &SessionPatch::default(),
            )
            .unwrap();

        let fetched = store.get_actions(&session.id).unwrap();
        assert_eq!(fetched.len(), 5);
        let order: Vec<u32> = fetched.iter().map(|a| a.order_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);

        store.update_action("action-2", true).unwrap();
        let fetched = store.get_actions(&session.id).unwrap();
        assert!(fetched.iter().find(|a| a.id == "action-2").unwrap().is_completed);

        store.update_action("action-2", false).unwrap();
        let fetched = store.get_actions(&session.id).unwrap();
        assert!(!fetched.iter().find(|a| a.id == "action-2").unwrap().is_completed);
    }

    #[test]
    fn test_get_action_by_id() {
        let (store, _dir) = setup_store();
        let session = store.create_session("owner-1", &test_idea()).unwrap();
        store
            .apply_transition(
                &session.id,
                &TransitionBatch {
                    actions: vec![NextAction {
                        id: "action-0".into(),
                        session_id: session.id.clone(),
                        action_text: "Action".into(),
                        is_completed: false,
                        order_index: 0,
                        created_at: Utc::now(),
                    }],
                    ..Default::default()
                },
                &SessionPatch::default(),
            )
            .unwrap();

        let action = store.get_action("action-0").unwrap().unwrap();
        assert_eq!(action.session_id, session.id);
        assert!(store.get_action("nope").unwrap().is_none());
    }

    #[test]
    fn test_personas_round_trip() {
        let (store, _dir) = setup_store();
        let session = store.create_session("owner-1", &test_idea()).unwrap();

        let personas: Vec<MarketPersona> = (0..3)
            .map(|i| MarketPersona {
                id: format!("persona-{i}"),
                session_id: session.id.clone(),
                persona_name: format!("Persona {i}"),
                persona_description: "Busy professional".into(),
                reaction_quote: "Sounds interesting".into(),
                willingness_to_buy: 50 + i,
                created_at: Utc::now(),
            })
            .collect();
        store
            .apply_transition(
                &session.id,
                &TransitionBatch {
                    personas,
                    ..Default::default()
                },
                &SessionPatch::default(),
            )
            .unwrap();

        let fetched = store.get_personas(&session.id).unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(fetched[0].persona_name, "Persona 0");
        assert_eq!(fetched[2].willingness_to_buy, 52);
    }
}
