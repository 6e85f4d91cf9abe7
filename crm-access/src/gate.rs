//! Access gate in front of every protected view.
//!
//! ```text
//!  Unknown ──mount──► Checking ──┬── signed in ──► Authenticated ◄─┐
//!                                │                      │ logout    │ login
//!                                │                      ▼           │
//!                                └── signed out ──► Redirecting(Login)
//!                                                       │ complete_redirect
//!                                                       ▼
//!                                                 Unauthenticated
//! ```
//!
//! While `Unknown` or `Checking` the gate only ever yields
//! [`GateView::Waiting`]. A redirect is pending until the caller completes it
//! with [`AccessGate::complete_redirect`]; a login that lands first cancels
//! it and the gate goes back to `Authenticated`.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::notifier::Subscription;
use crate::session::{Session, SessionStore};

/// Logical navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Login,
    ProtectedRoot,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => "/login",
            Destination::ProtectedRoot => "/dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unknown,
    Checking,
    Authenticated,
    Unauthenticated,
    Redirecting(Destination),
}

/// What the host should do with the requested view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Neutral loading indicator. Neither content nor redirect.
    Waiting,
    /// Render the requested view.
    Render,
    Redirect(Destination),
}

#[derive(Debug)]
struct GateInner {
    state: GateState,
    pending: Option<CancellationToken>,
}

impl GateInner {
    fn apply(&mut self, session: Session) {
        if !session.resolved {
            self.state = GateState::Checking;
            return;
        }

        if session.authenticated {
            if let Some(token) = self.pending.take() {
                token.cancel();
                tracing::debug!("Pending login redirect cancelled");
            }
            self.state = GateState::Authenticated;
            return;
        }

        if matches!(self.state, GateState::Redirecting(_)) && self.pending.is_some() {
            return;
        }

        tracing::debug!(destination = Destination::Login.path(), "Redirecting to login");
        self.state = GateState::Redirecting(Destination::Login);
        self.pending = Some(CancellationToken::new());
    }

    fn view(&self) -> GateView {
        match self.state {
            GateState::Unknown | GateState::Checking => GateView::Waiting,
            GateState::Authenticated => GateView::Render,
            GateState::Unauthenticated => GateView::Redirect(Destination::Login),
            GateState::Redirecting(destination) => GateView::Redirect(destination),
        }
    }
}

pub struct AccessGate {
    store: Arc<SessionStore>,
    inner: Arc<Mutex<GateInner>>,
    _subscription: Subscription,
}

impl AccessGate {
    pub fn new(store: Arc<SessionStore>) -> Self {
        let inner = Arc::new(Mutex::new(GateInner {
            state: GateState::Unknown,
            pending: None,
        }));

        let subscription = {
            let inner = inner.clone();
            store.subscribe(move |event| {
                let mut inner = lock(&inner);
                // Not mounted yet: the first mount decides.
                if inner.state != GateState::Unknown {
                    inner.apply(event.session);
                }
            })
        };

        Self {
            store,
            inner,
            _subscription: subscription,
        }
    }

    pub fn state(&self) -> GateState {
        lock(&self.inner).state
    }

    pub fn view(&self) -> GateView {
        lock(&self.inner).view()
    }

    /// Mount a protected view: enter `Checking`, resolve the session and
    /// settle on render or redirect.
    pub async fn mount(&self) -> GateView {
        {
            let mut inner = lock(&self.inner);
            if inner.state == GateState::Unknown {
                inner.state = GateState::Checking;
            }
        }

        self.store.restore().await;

        // A transition may have committed since restore returned; apply the
        // current snapshot, not the restored one.
        let mut inner = lock(&self.inner);
        inner.apply(self.store.session());
        inner.view()
    }

    /// Token cancelled when the pending redirect becomes moot.
    pub fn pending_redirect(&self) -> Option<CancellationToken> {
        lock(&self.inner).pending.clone()
    }

    /// Finish the pending redirect.
    ///
    /// Returns the destination only if a redirect is still pending; `None`
    /// means it was cancelled (or never issued) and the caller must not
    /// navigate. A completed redirect leaves the gate `Unauthenticated` until
    /// the next mount or session change.
    pub fn complete_redirect(&self) -> Option<Destination> {
        let mut inner = lock(&self.inner);
        match (inner.state, inner.pending.take()) {
            (GateState::Redirecting(destination), Some(token)) if !token.is_cancelled() => {
                inner.state = GateState::Unauthenticated;
                Some(destination)
            }
            _ => None,
        }
    }

    /// Decision for the login view itself: an authenticated user is sent to
    /// the protected root, everyone else gets the form.
    pub fn login_view(&self) -> GateView {
        if self.store.session().authenticated {
            GateView::Redirect(Destination::ProtectedRoot)
        } else {
            GateView::Render
        }
    }
}

fn lock(inner: &Mutex<GateInner>) -> MutexGuard<'_, GateInner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("state", &self.state())
            .finish()
    }
}
