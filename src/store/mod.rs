//! User Storage
//! Mission: Persist user accounts in SQLite behind one injected handle

use crate::auth::password::hash_password;
use crate::models::{NewUser, User, UserPatch, UserRole};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Store-level failure, classified so the API layer can map it onto the
/// error taxonomy without inspecting driver text.
#[derive(Debug)]
pub enum StoreError {
    DuplicateEmail,
    NotFound,
    NoFieldsToUpdate,
    Database(rusqlite::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateEmail => write!(f, "email already registered"),
            StoreError::NotFound => write!(f, "user not found"),
            StoreError::NoFieldsToUpdate => write!(f, "no fields to update"),
            StoreError::Database(err) => write!(f, "database error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, _) = &err {
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Database(err)
    }
}

/// SQLite-backed user store.
///
/// The connection is opened exactly once at process start and shared behind
/// a mutex; `busy_timeout` bounds how long any statement may wait on a lock.
#[derive(Clone)]
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    pub fn new(db_path: &str, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(db_path).context("open user db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        conn.busy_timeout(busy_timeout)
            .context("set db busy timeout")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                full_name TEXT,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                phone_number TEXT,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )",
            [],
        )
        .context("create users table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Seed an initial admin account when none exists yet.
    pub async fn seed_default_admin(&self, email: &str, password: &str) -> Result<()> {
        let conn = self.conn.lock().await;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'ADMIN' AND deleted_at IS NULL",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count > 0 {
            return Ok(());
        }

        let password_hash = hash_password(password)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO users (id, name, full_name, email, password_hash, phone_number,
                                role, created_at, updated_at, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL)",
            params![
                Uuid::new_v4().to_string(),
                "Administrator",
                Option::<String>::None,
                email,
                password_hash,
                Option::<String>::None,
                UserRole::Admin.as_str(),
                now,
                now,
            ],
        )
        .context("Failed to insert admin user")?;

        info!(email, "🔐 Default admin account created");
        warn!("⚠️  Change the default admin password before exposing this service");

        Ok(())
    }

    /// Insert a new user. Email uniqueness is enforced by the store.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let conn = self.conn.lock().await;

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO users (id, name, full_name, email, password_hash, phone_number,
                                role, created_at, updated_at, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL)",
            params![
                id.to_string(),
                new_user.name,
                new_user.full_name,
                new_user.email,
                new_user.password_hash,
                new_user.phone_number,
                new_user.role.as_str(),
                now,
                now,
            ],
        )?;

        info!(user_id = %id, role = new_user.role.as_str(), "✅ Created user");

        Self::fetch_user(&conn, id)
    }

    /// Get a non-deleted user by id.
    pub async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
        let conn = self.conn.lock().await;
        Self::fetch_user(&conn, id)
    }

    /// Get a non-deleted user by email, for login.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, name, full_name, email, password_hash, phone_number,
                    role, created_at, updated_at, deleted_at
             FROM users WHERE email = ?1 AND deleted_at IS NULL",
        )?;

        match stmt.query_row(params![email], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// List all non-deleted users.
    pub async fn get_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, name, full_name, email, password_hash, phone_number,
                    role, created_at, updated_at, deleted_at
             FROM users WHERE deleted_at IS NULL ORDER BY created_at",
        )?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Apply a partial update. Only fields that are present and non-empty
    /// are written; `updated_at` is always refreshed. Last writer wins.
    pub async fn update_user(&self, id: Uuid, patch: &UserPatch) -> Result<User, StoreError> {
        let conn = self.conn.lock().await;

        let mut set_parts: Vec<String> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        let fields = [
            ("name", &patch.name),
            ("full_name", &patch.full_name),
            ("email", &patch.email),
            ("phone_number", &patch.phone_number),
        ];
        for (column, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                args.push(value.to_string());
                set_parts.push(format!("{} = ?{}", column, args.len()));
            }
        }

        if set_parts.is_empty() {
            return Err(StoreError::NoFieldsToUpdate);
        }

        args.push(Utc::now().to_rfc3339());
        set_parts.push(format!("updated_at = ?{}", args.len()));

        args.push(id.to_string());
        let sql = format!(
            "UPDATE users SET {} WHERE id = ?{} AND deleted_at IS NULL",
            set_parts.join(", "),
            args.len()
        );

        let affected = conn.execute(&sql, params_from_iter(args.iter()))?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        Self::fetch_user(&conn, id)
    }

    /// Soft-delete: stamp `deleted_at`, keep the row.
    pub async fn soft_delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;

        let affected = conn.execute(
            "UPDATE users SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![Utc::now().to_rfc3339(), id.to_string()],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        info!(user_id = %id, "🗑️  Soft-deleted user");
        Ok(())
    }

    fn fetch_user(conn: &Connection, id: Uuid) -> Result<User, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT id, name, full_name, email, password_hash, phone_number,
                    role, created_at, updated_at, deleted_at
             FROM users WHERE id = ?1 AND deleted_at IS NULL",
        )?;

        match stmt.query_row(params![id.to_string()], Self::row_to_user) {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let id: String = row.get(0)?;
        let id = Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let role: String = row.get(6)?;

        Ok(User {
            id,
            name: row.get(1)?,
            full_name: row.get(2)?,
            email: row.get(3)?,
            password_hash: row.get(4)?,
            phone_number: row.get(5)?,
            role: UserRole::from_str(&role).unwrap_or(UserRole::User),
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
            deleted_at: row.get(9)?,
        })
    }
}
