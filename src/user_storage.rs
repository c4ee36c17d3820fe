use crate::storage::{ensure_dir, JsonFile};
use crate::user_models::{Session, User};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::path::Path;
use tokio::sync::RwLock;

const USERS_FILE: &str = "users.json";
const SESSIONS_FILE: &str = "sessions.json";

pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

pub struct UserStorage {
    users: RwLock<Vec<User>>,
    sessions: RwLock<Vec<Session>>,
    users_file: JsonFile,
    sessions_file: JsonFile,
    session_ttl: Duration,
}

impl UserStorage {
    pub fn open(data_dir: &Path) -> Result<Self> {
        ensure_dir(data_dir)?;
        let users_file = JsonFile::in_dir(data_dir, USERS_FILE);
        let sessions_file = JsonFile::in_dir(data_dir, SESSIONS_FILE);

        Ok(Self {
            users: RwLock::new(users_file.load().context("Failed to load users")?),
            sessions: RwLock::new(sessions_file.load().context("Failed to load sessions")?),
            users_file,
            sessions_file,
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            sessions: RwLock::new(Vec::new()),
            users_file: JsonFile::memory(),
            sessions_file: JsonFile::memory(),
            session_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Stores a new user. Returns `None` when the username is already taken;
    /// the check and the insert happen under one write lock.
    pub async fn create_user(&self, user: User) -> Result<Option<User>> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == user.username) {
            return Ok(None);
        }

        users.push(user.clone());
        self.users_file.save(&users)?;
        Ok(Some(user))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    pub async fn username_taken(&self, username: &str) -> bool {
        let users = self.users.read().await;
        users.iter().any(|u| u.username == username)
    }

    fn is_live(&self, session: &Session) -> bool {
        Utc::now() - session.created_at < self.session_ttl
    }

    /// Issues a session and drops every expired one while the lock is held.
    pub async fn start_session(&self, user: &User) -> Result<Session> {
        let session = Session::new(user);
        let mut sessions = self.sessions.write().await;
        sessions.retain(|s| self.is_live(s));
        sessions.push(session.clone());
        self.sessions_file.save(&sessions)?;
        Ok(session)
    }

    /// Expired sessions are treated as unknown.
    pub async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .find(|s| s.token == token && self.is_live(s))
            .cloned())
    }

    /// Drops the session; unknown tokens are ignored.
    pub async fn end_session(&self, token: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.token != token);

        if sessions.len() != before {
            self.sessions_file.save(&sessions)?;
        }
        Ok(())
    }
}
