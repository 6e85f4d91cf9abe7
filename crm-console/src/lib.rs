pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod startup;

use crm_access::{AccessGate, ProfileTemplate, SessionStore, Subscription, TenancyRegistry};
use std::sync::Arc;

/// Shared application state: the session authority, the gate mounted in
/// front of protected routes, and the office registry bound to the session.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub gate: Arc<AccessGate>,
    pub tenancy: Arc<TenancyRegistry>,
    _tenancy_binding: Arc<Subscription>,
}

impl AppState {
    pub fn new(
        session: Arc<SessionStore>,
        tenancy: Arc<TenancyRegistry>,
        profile: ProfileTemplate,
    ) -> Self {
        let gate = Arc::new(AccessGate::new(session.clone()));
        let binding = tenancy.follow_session(&session, profile);

        Self {
            session,
            gate,
            tenancy,
            _tenancy_binding: Arc::new(binding),
        }
    }
}
