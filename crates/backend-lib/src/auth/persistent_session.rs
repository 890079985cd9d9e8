// ============================
// crates/backend-lib/src/auth/persistent_session.rs
// ============================
/** Persistent session storage with encryption
This module lets sessions survive server restarts. `SessionManager` writes
every created or destroyed session through a `SessionPersistence` backend and
reads from it when a token is missing from memory. */
use super::session::SessionRecord;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use parking_lot::Mutex;
use rand::{rngs::OsRng, RngCore};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, warn};

const KEY_FILE: &str = "session_key";
const SESSIONS_FILE: &str = "sessions.dat";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Errors raised by a persistence backend
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("encryption error: {0}")]
    Crypto(String),

    #[error("invalid session file: {0}")]
    Corrupt(String),
}

/// Durable mirror of the session store
pub trait SessionPersistence: Send + Sync {
    /// Store or replace `record`
    fn save(&self, record: &SessionRecord) -> Result<(), PersistenceError>;

    /// Fetch the record for `token`, if one was saved
    fn load(&self, token: &str) -> Result<Option<SessionRecord>, PersistenceError>;

    /// Delete the record for `token`; returns whether one existed
    fn remove(&self, token: &str) -> Result<bool, PersistenceError>;

    /// Keep only the records `keep` accepts; returns how many were deleted
    fn retain(&self, keep: &dyn Fn(&SessionRecord) -> bool) -> Result<usize, PersistenceError>;
}

/// Sessions kept in one AES-256-GCM encrypted file.
///
/// Layout of `sessions.dat`: a 12 byte nonce followed by the ciphertext of a
/// JSON map from token to `SessionRecord`. The key lives next to it in
/// `session_key` and is generated on first use.
pub struct FileSessionPersistence {
    storage_path: PathBuf,
    encryption_key: [u8; KEY_LEN],
    // serializes read-modify-write cycles on the sessions file
    lock: Mutex<()>,
}

impl FileSessionPersistence {
    /** Open (or initialize) a session directory
    # Arguments
    * `storage_path` - Directory holding `session_key` and `sessions.dat` */
    pub fn open<P: AsRef<Path>>(storage_path: P) -> Result<Self, PersistenceError> {
        let storage_path = storage_path.as_ref().to_path_buf();
        fs::create_dir_all(&storage_path)?;

        let key_path = storage_path.join(KEY_FILE);
        let encryption_key = if key_path.exists() {
            let key_data = fs::read(&key_path)?;
            if key_data.len() != KEY_LEN {
                return Err(PersistenceError::Corrupt(
                    "invalid encryption key length".to_string(),
                ));
            }
            let mut key = [0u8; KEY_LEN];
            key.copy_from_slice(&key_data);
            key
        } else {
            let mut key = [0u8; KEY_LEN];
            OsRng.fill_bytes(&mut key);
            fs::write(&key_path, key)?;
            info!(path = %key_path.display(), "generated new session encryption key");
            key
        };

        let persistence = Self {
            storage_path,
            encryption_key,
            lock: Mutex::new(()),
        };
        // fail at startup rather than on the first request
        let count = persistence.read_all()?.len();
        info!(
            path = %persistence.storage_path.display(),
            sessions = count,
            "session persistence opened"
        );
        Ok(persistence)
    }

    fn sessions_file(&self) -> PathBuf {
        self.storage_path.join(SESSIONS_FILE)
    }

    fn cipher(&self) -> Result<Aes256Gcm, PersistenceError> {
        Aes256Gcm::new_from_slice(&self.encryption_key)
            .map_err(|err| PersistenceError::Crypto(err.to_string()))
    }

    fn read_all(&self) -> Result<HashMap<String, SessionRecord>, PersistenceError> {
        let path = self.sessions_file();
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let combined = fs::read(&path)?;
        if combined.len() < NONCE_LEN {
            return Err(PersistenceError::Corrupt("file shorter than nonce".to_string()));
        }
        let (nonce_bytes, encrypted_data) = combined.split_at(NONCE_LEN);

        let decrypted = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce_bytes), encrypted_data)
            .map_err(|err| {
                warn!(path = %path.display(), "failed to decrypt sessions file");
                PersistenceError::Crypto(err.to_string())
            })?;

        Ok(serde_json::from_slice(&decrypted)?)
    }

    fn write_all(&self, sessions: &HashMap<String, SessionRecord>) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec(sessions)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let encrypted = self
            .cipher()?
            .encrypt(Nonce::from_slice(&nonce_bytes), json.as_slice())
            .map_err(|err| PersistenceError::Crypto(err.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + encrypted.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&encrypted);

        let path = self.sessions_file();
        let tmp = path.with_extension("dat.tmp");
        fs::write(&tmp, combined)?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

impl SessionPersistence for FileSessionPersistence {
    fn save(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock();
        let mut sessions = self.read_all()?;
        sessions.insert(record.token.clone(), record.clone());
        self.write_all(&sessions)
    }

    fn load(&self, token: &str) -> Result<Option<SessionRecord>, PersistenceError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(token))
    }

    fn remove(&self, token: &str) -> Result<bool, PersistenceError> {
        let _guard = self.lock.lock();
        let mut sessions = self.read_all()?;
        if sessions.remove(token).is_none() {
            return Ok(false);
        }
        self.write_all(&sessions)?;
        Ok(true)
    }

    fn retain(&self, keep: &dyn Fn(&SessionRecord) -> bool) -> Result<usize, PersistenceError> {
        let _guard = self.lock.lock();
        let mut sessions = self.read_all()?;
        let before = sessions.len();
        sessions.retain(|_, record| keep(record));
        let removed = before - sessions.len();
        if removed > 0 {
            self.write_all(&sessions)?;
        }
        Ok(removed)
    }
}
