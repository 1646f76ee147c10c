//! Identity gateway: accounts and login tokens
//!
//! Minimal email/password auth backed by the same SQLite file as the rest
//! of the data. Passwords are stored as salted SHA-256 digests; a login
//! hands back an opaque token that later calls present. The application
//! layer only sees the [`IdentityGateway`] trait, so tests can swap in a
//! stub user without touching credential storage.

use crate::db::init_db;
use crate::error::Error;
use crate::types::User;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;

/// The authentication contract the application layer consumes.
pub trait IdentityGateway: Send + Sync {
    /// Create an account and return the signed-in user plus a fresh token.
    fn sign_up(&self, email: &str, password: &str) -> Result<(User, String), Error>;
    /// Verify credentials and mint a new token.
    fn sign_in(&self, email: &str, password: &str) -> Result<(User, String), Error>;
    /// Invalidate a token. Unknown tokens are a no-op.
    fn sign_out(&self, token: &str) -> Result<(), Error>;
    /// Resolve a token to its user, or `None` if the token is not live.
    fn current_user(&self, token: &str) -> Result<Option<User>, Error>;
}

/// SQLite-backed identity gateway.
pub struct SqliteIdentity {
    conn: Mutex<Connection>,
}

fn digest_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn fresh_salt() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn fresh_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl SqliteIdentity {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = init_db(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mint_token(conn: &Connection, user_id: &str) -> Result<String, Error> {
        let token = fresh_token();
        conn.execute(
            "INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, Utc::now().to_rfc3339()],
        )?;
        Ok(token)
    }
}

impl IdentityGateway for SqliteIdentity {
    fn sign_up(&self, email: &str, password: &str) -> Result<(User, String), Error> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::Validation("a valid email address is required".into()));
        }
        if password.len() < 8 {
            return Err(Error::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        let conn = self.lock();
        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                [&email],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(Error::Auth(format!("account already exists for {email}")));
        }

        let salt = fresh_salt();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO users (id, email, password_digest, salt, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.email,
                digest_password(password, &salt),
                salt,
                user.created_at.to_rfc3339(),
            ],
        )?;

        let token = Self::mint_token(&conn, &user.id)?;
        Ok((user, token))
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<(User, String), Error> {
        let email = email.trim().to_lowercase();
        let conn = self.lock();

        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT id, password_digest, salt, created_at FROM users WHERE email = ?1",
                [&email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        // Same error for unknown email and bad password.
        let (id, stored_digest, salt, created_raw) =
            row.ok_or_else(|| Error::Auth("invalid email or password".into()))?;
        if digest_password(password, &salt) != stored_digest {
            return Err(Error::Auth("invalid email or password".into()));
        }

        let created_at = DateTime::parse_from_rfc3339(&created_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Auth(format!("corrupt account record: {e}")))?;
        let user = User {
            id,
            email,
            created_at,
        };
        let token = Self::mint_token(&conn, &user.id)?;
        Ok((user, token))
    }

    fn sign_out(&self, token: &str) -> Result<(), Error> {
        self.lock()
            .execute("DELETE FROM auth_tokens WHERE token = ?1", [token])?;
        Ok(())
    }

    fn current_user(&self, token: &str) -> Result<Option<User>, Error> {
        let conn = self.lock();
        let row: Option<(String, String, String)> = conn
            .query_row(
                "SELECT u.id, u.email, u.created_at \
                 FROM auth_tokens t JOIN users u ON u.id = t.user_id \
                 WHERE t.token = ?1",
                [token],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            Some((id, email, created_raw)) => {
                let created_at = DateTime::parse_from_rfc3339(&created_raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| Error::Auth(format!("corrupt account record: {e}")))?;
                Ok(Some(User {
                    id,
                    email,
                    created_at,
                }))
            }
            None => Ok(None),
        }
    }
}
