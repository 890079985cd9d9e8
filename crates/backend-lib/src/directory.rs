// ============================
// sessiongate-lib/src/directory.rs
// ============================
//! User directory abstraction with an in-memory, optionally file-backed implementation.
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sessiongate_common::UserJson;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::password;

/// Errors raised by a user directory backend
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("no user found for this email")]
    NotFound,

    #[error("invalid reset token")]
    InvalidResetToken,

    #[error("directory backend unavailable: {0}")]
    Unavailable(String),
}

/// A registered user, the principal resolved by every auth scheme
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    password_hash: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Pending password reset token, consumed by the next password update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reset_token: Option<String>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

impl User {
    /// Create a user, hashing `password` with scrypt
    pub fn new(email: impl Into<String>, password: &str) -> anyhow::Result<Self> {
        let hash = password::hash_password(password)?;
        Ok(Self::with_password_hash(email, hash))
    }

    /// Create a user from an already computed PHC hash
    pub fn with_password_hash(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
            reset_token: None,
        }
    }

    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    /// Check a candidate password against the stored hash
    pub fn verify_password(&self, candidate: &str) -> bool {
        if self.password_hash.is_empty() {
            return false;
        }
        password::verify_password(&self.password_hash, candidate)
    }

    /// Human readable name, falling back to the email
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (None, None) => self.email.clone(),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (Some(first), Some(last)) => format!("{first} {last}"),
        }
    }

    pub fn to_json(&self) -> UserJson {
        UserJson {
            id: self.id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}

/// Trait for user directory backends
pub trait UserDirectory: Send + Sync {
    /// All users whose email equals `email`, in directory order
    fn find_by_email(&self, email: &str) -> Result<Vec<User>, DirectoryError>;

    /// The user with the given id
    fn find_by_id(&self, id: &str) -> Option<User>;

    /// Every user, in directory order
    fn all(&self) -> Vec<User>;

    /// Register a new user; emails are unique
    fn insert(&self, user: User) -> Result<(), DirectoryError>;

    /// Record `token` as the pending reset token of the user registered under `email`
    fn set_reset_token(&self, email: &str, token: &str) -> Result<User, DirectoryError>;

    /// Replace the password hash when `reset_token` is the pending token; the token is single-use
    fn update_password(
        &self,
        email: &str,
        reset_token: &str,
        password_hash: String,
    ) -> Result<User, DirectoryError>;

    fn count(&self) -> usize {
        self.all().len()
    }
}

/// In-memory directory, mirrored to a JSON file when opened from a path
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<User>>,
    path: Option<PathBuf>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory pre-populated with `users`
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
            path: None,
        }
    }

    /// Load users from `path` if it exists and save back to it on every insert
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let path = path.as_ref().to_path_buf();
        let users = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };
        tracing::info!(path = %path.display(), users = users.len(), "user directory loaded");
        Ok(Self {
            users: RwLock::new(users),
            path: Some(path),
        })
    }

    /// Apply `change` to the user registered under `email`, rolling back if the save fails
    fn modify(
        &self,
        email: &str,
        change: impl FnOnce(&mut User) -> Result<(), DirectoryError>,
    ) -> Result<User, DirectoryError> {
        let mut users = self.users.write();
        let index = users
            .iter()
            .position(|u| u.email == email)
            .ok_or(DirectoryError::NotFound)?;
        let previous = users[index].clone();
        change(&mut users[index])?;
        users[index].updated_at = Utc::now();
        if let Err(err) = self.save(&users) {
            users[index] = previous;
            return Err(err);
        }
        Ok(users[index].clone())
    }

    fn save(&self, users: &[User]) -> Result<(), DirectoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(users)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_email(&self, email: &str) -> Result<Vec<User>, DirectoryError> {
        Ok(self
            .users
            .read()
            .iter()
            .filter(|u| u.email == email)
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &str) -> Option<User> {
        self.users.read().iter().find(|u| u.id == id).cloned()
    }

    fn all(&self) -> Vec<User> {
        self.users.read().clone()
    }

    fn insert(&self, user: User) -> Result<(), DirectoryError> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == user.email) {
            return Err(DirectoryError::DuplicateEmail);
        }
        users.push(user);
        if let Err(err) = self.save(&users) {
            users.pop();
            return Err(err);
        }
        Ok(())
    }

    fn set_reset_token(&self, email: &str, token: &str) -> Result<User, DirectoryError> {
        self.modify(email, |user| {
            user.reset_token = Some(token.to_string());
            Ok(())
        })
    }

    fn update_password(
        &self,
        email: &str,
        reset_token: &str,
        password_hash: String,
    ) -> Result<User, DirectoryError> {
        self.modify(email, |user| {
            if reset_token.is_empty() || user.reset_token.as_deref() != Some(reset_token) {
                return Err(DirectoryError::InvalidResetToken);
            }
            user.password_hash = password_hash;
            user.reset_token = None;
            Ok(())
        })
    }

    fn count(&self) -> usize {
        self.users.read().len()
    }
}
