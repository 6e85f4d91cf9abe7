//! crm-access: the session and tenancy core behind every protected CRM view.
//!
//! Wiring is explicit: build a [`SessionStore`] over a [`SessionStorage`]
//! backend and a [`CredentialValidator`], hand an `Arc` of it to each
//! [`AccessGate`], and bind a [`TenancyRegistry`] to it with
//! [`TenancyRegistry::follow_session`].

pub mod credentials;
pub mod error;
pub mod gate;
pub mod models;
pub mod notifier;
pub mod session;
pub mod storage;
pub mod tenancy;

pub use credentials::{AllowListValidator, CredentialValidator, NonEmptyValidator};
pub use error::{AuthError, ConfigError, ScopeError};
pub use gate::{AccessGate, Destination, GateState, GateView};
pub use models::{AccessLevel, AccessProfile, Office, OfficeId, ProfileTemplate};
pub use notifier::{Notifier, Subscription};
pub use session::{Session, SessionChange, SessionEvent, SessionStore, DEFAULT_SESSION_KEY};
pub use storage::{FileStorage, MemoryStorage, RedisStorage, SessionStorage, StorageError};
pub use tenancy::{TenancyEvent, TenancyRegistry};
