//! services/client/src/adapters/storage.rs
//!
//! Persisted session storage. Implements the `SessionStorage` port from the
//! `core` crate with a small JSON file holding two fixed keys, `token` and
//! `user`, so a session survives a restart of the client.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use pdf_portal_core::domain::{Session, User};
use pdf_portal_core::ports::{PortError, PortResult, SessionStorage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

//=========================================================================================
// "Impure" Storage Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    id: String,
    email: String,
    name: String,
    #[serde(default)]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl StoredUser {
    fn from_domain(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }

    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// File-backed Storage
//=========================================================================================

/// Stores the session in a JSON file. Writes go to a sibling temp file that is
/// then renamed over the original.
pub struct FileSessionStorage {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> PortResult<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(io_error(&self.path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => Err(PortError::Unexpected(format!(
                "Session file {} is not a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialized).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))?;
        debug!(path = %self.path.display(), "Session file written.");
        Ok(())
    }

    fn update<F>(&self, apply: F) -> PortResult<()>
    where
        F: FnOnce(&mut Map<String, Value>) -> PortResult<()>,
    {
        let _guard = self.lock.lock();
        // An unreadable file is replaced rather than blocking every write.
        let mut entries = self.read_entries().unwrap_or_default();
        apply(&mut entries)?;
        self.write_entries(&entries)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> PortError {
    PortError::Unexpected(format!("{}: {}", path.display(), e))
}

/// The user is kept as a serialized JSON string under its key.
fn encode_user(user: &User) -> PortResult<Value> {
    serde_json::to_string(&StoredUser::from_domain(user))
        .map(Value::String)
        .map_err(|e| PortError::Unexpected(e.to_string()))
}

/// The user entry is always a JSON document serialized into a string.
fn decode_user(value: &Value) -> PortResult<User> {
    let raw = value.as_str().ok_or_else(|| {
        PortError::Unexpected("Stored user is not a serialized string".to_string())
    })?;
    let stored: StoredUser = serde_json::from_str(raw)
        .map_err(|e| PortError::Unexpected(format!("Stored user is unreadable: {}", e)))?;
    Ok(stored.to_domain())
}

impl SessionStorage for FileSessionStorage {
    fn token(&self) -> PortResult<Option<String>> {
        let _guard = self.lock.lock();
        let entries = self.read_entries()?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn user(&self) -> PortResult<Option<User>> {
        let _guard = self.lock.lock();
        let entries = self.read_entries()?;
        entries.get(USER_KEY).map(decode_user).transpose()
    }

    fn store(&self, session: &Session) -> PortResult<()> {
        let user = encode_user(&session.user)?;
        self.update(|entries| {
            entries.insert(TOKEN_KEY.to_string(), Value::String(session.token.clone()));
            entries.insert(USER_KEY.to_string(), user);
            Ok(())
        })
    }

    fn store_user(&self, user: &User) -> PortResult<()> {
        let user = encode_user(user)?;
        self.update(|entries| {
            entries.insert(USER_KEY.to_string(), user);
            Ok(())
        })
    }

    fn clear(&self) -> PortResult<()> {
        self.update(|entries| {
            entries.remove(TOKEN_KEY);
            entries.remove(USER_KEY);
            Ok(())
        })
    }
}

//=========================================================================================
// In-memory Storage
//=========================================================================================

/// Keeps the session for the lifetime of the process only.
#[derive(Default)]
pub struct MemorySessionStorage {
    session: Mutex<(Option<String>, Option<User>)>,
}

impl SessionStorage for MemorySessionStorage {
    fn token(&self) -> PortResult<Option<String>> {
        Ok(self.session.lock().0.clone())
    }

    fn user(&self) -> PortResult<Option<User>> {
        Ok(self.session.lock().1.clone())
    }

    fn store(&self, session: &Session) -> PortResult<()> {
        *self.session.lock() = (Some(session.token.clone()), Some(session.user.clone()));
        Ok(())
    }

    fn store_user(&self, user: &User) -> PortResult<()> {
        self.session.lock().1 = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        *self.session.lock() = (None, None);
        Ok(())
    }
}
