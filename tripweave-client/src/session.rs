//! Login session shared by every component.
//!
//! [`SessionContext`] is a cheap, cloneable read handle. The only way to change
//! who is logged in is through [`SessionStore::login`] and
//! [`SessionStore::logout`], which also persist the state to disk.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tripweave_core::UserId;

/// Persisted login state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub is_logged_in: bool,
    pub current_user_id: Option<UserId>,
}

impl SessionState {
    pub fn logged_in(user_id: UserId) -> Self {
        Self {
            is_logged_in: true,
            current_user_id: Some(user_id),
        }
    }

    /// The authenticated user, if both flags agree.
    pub fn user_id(&self) -> Option<UserId> {
        if self.is_logged_in {
            self.current_user_id
        } else {
            None
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("User is not logged in")]
    Unauthenticated,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Read handle onto the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A standalone context already logged in as `user_id`.
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState::logged_in(user_id))),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.inner.read().user_id()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }

    pub fn require_user(&self) -> Result<UserId, SessionError> {
        self.user_id().ok_or(SessionError::Unauthenticated)
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.read().clone()
    }

    fn replace(&self, state: SessionState) {
        *self.inner.write() = state;
    }
}

/// Owner of the session: the single place where login state changes.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    context: SessionContext,
}

impl SessionStore {
    /// Open the store backed by `path`, restoring any saved session.
    pub fn open(path: &Path) -> Result<Self, SessionError> {
        let state = load(path)?.unwrap_or_default();
        tracing::debug!(path = %path.display(), logged_in = state.is_logged_in, "session restored");
        let context = SessionContext::default();
        context.replace(state);
        Ok(Self {
            path: Some(path.to_path_buf()),
            context,
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            context: SessionContext::anonymous(),
        }
    }

    pub fn context(&self) -> SessionContext {
        self.context.clone()
    }

    pub fn login(&self, user_id: UserId) -> Result<(), SessionError> {
        let state = SessionState::logged_in(user_id);
        self.persist(&state)?;
        self.context.replace(state);
        tracing::info!(user_id = %user_id, "logged in");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        let state = SessionState::default();
        self.persist(&state)?;
        self.context.replace(state);
        tracing::info!("logged out");
        Ok(())
    }

    fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        match &self.path {
            Some(path) => save(path, state),
            None => Ok(()),
        }
    }
}

pub fn load(path: &Path) -> Result<Option<SessionState>, SessionError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    let state = serde_json::from_str::<SessionState>(&contents)?;
    Ok(Some(state))
}

pub fn save(path: &Path, state: &SessionState) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(state)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripweave_core::EntityIdType;

    #[test]
    fn user_id_requires_logged_in_flag() {
        let state = SessionState {
            is_logged_in: false,
            current_user_id: Some(UserId::new(5)),
        };
        assert_eq!(state.user_id(), None);
        assert_eq!(SessionState::logged_in(UserId::new(5)).user_id(), Some(UserId::new(5)));
    }

    #[test]
    fn login_is_visible_through_every_handle() {
        let store = SessionStore::in_memory();
        let first = store.context();
        let second = first.clone();
        assert!(matches!(first.require_user(), Err(SessionError::Unauthenticated)));

        store.login(UserId::new(7)).unwrap();
        assert_eq!(second.user_id(), Some(UserId::new(7)));

        store.logout().unwrap();
        assert!(!first.is_authenticated());
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::open(&path).unwrap();
        assert!(!store.context().is_authenticated());
        store.login(UserId::new(42)).unwrap();

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.context().user_id(), Some(UserId::new(42)));

        reopened.logout().unwrap();
        assert_eq!(load(&path).unwrap(), Some(SessionState::default()));
    }

    #[test]
    fn corrupt_session_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(SessionStore::open(&path), Err(SessionError::Serde(_))));
    }
}
