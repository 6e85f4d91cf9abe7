//! Process-wide session authority.
//!
//! The [`SessionStore`] owns the single authentication flag of this process.
//! It restores the flag from a [`SessionStorage`] backend once, flips it on
//! login/logout, and broadcasts every transition through its [`Notifier`]
//! before the triggering call returns.
//!
//! Transitions are serialized: a `logout()` racing a `login()` produces two
//! broadcasts in call order, so the last event any subscriber sees matches
//! the final state.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::credentials::{is_well_formed, CredentialValidator};
use crate::error::AuthError;
use crate::gate::Destination;
use crate::notifier::{Notifier, Subscription};
use crate::storage::SessionStorage;

/// Key under which the authentication flag is persisted.
pub const DEFAULT_SESSION_KEY: &str = "crm.session.authenticated";

const AUTHENTICATED_VALUE: &str = "true";

/// Authentication status of this process.
///
/// `resolved == false` means the persisted flag has not been checked yet;
/// gates must wait rather than redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Session {
    pub authenticated: bool,
    pub resolved: bool,
}

impl Session {
    pub const UNRESOLVED: Session = Session {
        authenticated: false,
        resolved: false,
    };

    fn resolved(authenticated: bool) -> Self {
        Self {
            authenticated,
            resolved: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionChange {
    Restored,
    LoggedIn,
    LoggedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionEvent {
    pub session: Session,
    pub change: SessionChange,
}

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    validator: Arc<dyn CredentialValidator>,
    key: String,
    state: RwLock<Session>,
    transitions: Mutex<()>,
    notifier: Notifier<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, validator: Arc<dyn CredentialValidator>) -> Self {
        Self::with_key(storage, validator, DEFAULT_SESSION_KEY)
    }

    pub fn with_key(
        storage: Arc<dyn SessionStorage>,
        validator: Arc<dyn CredentialValidator>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            validator,
            key: key.into(),
            state: RwLock::new(Session::UNRESOLVED),
            transitions: Mutex::new(()),
            notifier: Notifier::new(),
        }
    }

    /// Current snapshot. Never blocks on storage.
    pub fn session(&self) -> Session {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    /// Resolve the session from storage.
    ///
    /// Only the first call reads storage; once the session is resolved (by a
    /// restore, login or logout) the cached snapshot is returned. A storage
    /// failure resolves the session as unauthenticated.
    pub async fn restore(&self) -> Session {
        let _transition = self.transitions.lock().await;

        let current = self.session();
        if current.resolved {
            return current;
        }

        let authenticated = match self.storage.get(&self.key).await {
            Ok(value) => value.as_deref() == Some(AUTHENTICATED_VALUE),
            Err(e) => {
                tracing::warn!(error = %e, "Session storage unreadable, treating as signed out");
                false
            }
        };

        tracing::debug!(authenticated, "Session restored");
        self.commit(Session::resolved(authenticated), SessionChange::Restored)
    }

    /// Authenticate and persist the flag.
    ///
    /// Blank fields or a rejecting validator yield
    /// [`AuthError::InvalidCredentials`] without touching the session. A
    /// failed write yields [`AuthError::StorageUnavailable`] and the session
    /// stays as it was.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        if !is_well_formed(identifier, secret) {
            tracing::warn!("Login rejected: blank identifier or secret");
            return Err(AuthError::InvalidCredentials);
        }

        if !self.validator.validate(identifier, secret) {
            tracing::warn!(identifier = %identifier, "Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let _transition = self.transitions.lock().await;

        self.storage
            .set(&self.key, AUTHENTICATED_VALUE)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to persist session flag");
                AuthError::StorageUnavailable(e)
            })?;

        tracing::info!(identifier = %identifier, "User logged in successfully");
        Ok(self.commit(Session::resolved(true), SessionChange::LoggedIn))
    }

    /// Sign out. Returns where the caller should navigate next.
    ///
    /// The in-memory session is cleared even if the persisted flag cannot be
    /// removed.
    pub async fn logout(&self) -> Destination {
        let _transition = self.transitions.lock().await;

        if let Err(e) = self.storage.remove(&self.key).await {
            tracing::error!(error = %e, "Failed to clear persisted session flag");
        }

        tracing::info!("User logged out");
        self.commit(Session::resolved(false), SessionChange::LoggedOut);
        Destination::Login
    }

    fn commit(&self, session: Session, change: SessionChange) -> Session {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = session;
        self.notifier.publish(&SessionEvent { session, change });
        session
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .field("session", &self.session())
            .finish()
    }
}
