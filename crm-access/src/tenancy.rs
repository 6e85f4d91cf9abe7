//! Office (tenant scope) registry.
//!
//! Holds the static, ordered office list, the profile of the signed-in user
//! and which office their data operations currently apply to. The chosen
//! office lives only as long as the profile: every login starts from the
//! profile template's default.

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{ConfigError, ScopeError};
use crate::models::{AccessProfile, Office, OfficeId, ProfileTemplate};
use crate::notifier::{Notifier, Subscription};
use crate::session::{SessionChange, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenancyEvent {
    ProfileAttached(Office),
    ProfileCleared,
    OfficeSwitched { from: OfficeId, to: Office },
}

pub struct TenancyRegistry {
    offices: Vec<Office>,
    profile: RwLock<Option<AccessProfile>>,
    notifier: Notifier<TenancyEvent>,
}

impl TenancyRegistry {
    /// Build the registry over a non-empty list of uniquely identified offices.
    pub fn new(offices: Vec<Office>) -> Result<Self, ConfigError> {
        if offices.is_empty() {
            return Err(ConfigError::NoOffices);
        }

        let mut seen = HashSet::new();
        for office in &offices {
            if !seen.insert(office.id.clone()) {
                return Err(ConfigError::DuplicateOffice(office.id.to_string()));
            }
        }

        Ok(Self {
            offices,
            profile: RwLock::new(None),
            notifier: Notifier::new(),
        })
    }

    pub fn list_offices(&self) -> &[Office] {
        &self.offices
    }

    pub fn find_office(&self, office_id: &str) -> Option<&Office> {
        self.offices.iter().find(|o| o.id.as_str() == office_id)
    }

    fn default_office(&self) -> &Office {
        // Non-empty by construction.
        &self.offices[0]
    }

    /// Active office, or the first configured one when nothing is selected.
    pub fn current_office(&self) -> Office {
        self.read_profile()
            .as_ref()
            .and_then(|p| self.find_office(p.current_office_id.as_str()))
            .unwrap_or_else(|| self.default_office())
            .clone()
    }

    pub fn profile(&self) -> Option<AccessProfile> {
        self.read_profile().clone()
    }

    /// Whether the office switcher should be shown at all.
    pub fn can_switch_offices(&self) -> bool {
        self.read_profile()
            .as_ref()
            .is_some_and(|p| p.multi_office_access)
    }

    /// Install the profile of a freshly authenticated session.
    ///
    /// A profile naming an unconfigured office is pointed at the first office.
    pub fn attach_profile(&self, mut profile: AccessProfile) -> Office {
        let office = match self.find_office(profile.current_office_id.as_str()) {
            Some(office) => office.clone(),
            None => {
                let fallback = self.default_office().clone();
                tracing::warn!(
                    office_id = %profile.current_office_id,
                    fallback = %fallback.id,
                    "Profile names an unknown office, using default"
                );
                profile.current_office_id = fallback.id.clone();
                fallback
            }
        };

        tracing::info!(
            access_level = %profile.access_level,
            office_id = %office.id,
            multi_office_access = profile.multi_office_access,
            "Access profile attached"
        );
        *self.write_profile() = Some(profile);
        self.notifier
            .publish(&TenancyEvent::ProfileAttached(office.clone()));
        office
    }

    pub fn clear_profile(&self) {
        let had_profile = self.write_profile().take().is_some();
        if had_profile {
            tracing::info!("Access profile cleared");
            self.notifier.publish(&TenancyEvent::ProfileCleared);
        }
    }

    /// Change the active office.
    ///
    /// Rejected with [`ScopeError::UnknownOffice`] for ids that are not
    /// configured and with [`ScopeError::Forbidden`] when there is no profile
    /// or it lacks multi-office access. Rejections leave the state untouched.
    pub fn switch_office(&self, office_id: &str) -> Result<Office, ScopeError> {
        let Some(target) = self.find_office(office_id) else {
            tracing::warn!(office_id = %office_id, "Office switch rejected: unknown office");
            return Err(ScopeError::UnknownOffice(office_id.to_string()));
        };

        let from = {
            let mut guard = self.write_profile();
            let profile = match guard.as_mut() {
                Some(profile) if profile.multi_office_access => profile,
                _ => {
                    tracing::warn!(office_id = %office_id, "Office switch rejected: forbidden");
                    return Err(ScopeError::Forbidden);
                }
            };
            std::mem::replace(&mut profile.current_office_id, target.id.clone())
        };

        tracing::info!(from = %from, to = %target.id, "Switched office");
        self.notifier.publish(&TenancyEvent::OfficeSwitched {
            from,
            to: target.clone(),
        });
        Ok(target.clone())
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TenancyEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    /// Keep the profile in step with `store`: a fresh profile from `template`
    /// on every sign-in, none after sign-out.
    ///
    /// The binding lasts as long as the returned [`Subscription`].
    pub fn follow_session(
        self: &Arc<Self>,
        store: &SessionStore,
        template: ProfileTemplate,
    ) -> Subscription {
        if store.session().authenticated {
            self.attach_profile(template.mint(&self.default_office().id));
        }

        let registry = Arc::downgrade(self);
        store.subscribe(move |event| {
            let Some(registry) = registry.upgrade() else {
                return;
            };

            match event.change {
                SessionChange::LoggedIn => {
                    registry.attach_profile(template.mint(&registry.default_office().id));
                }
                SessionChange::Restored if event.session.authenticated => {
                    registry.attach_profile(template.mint(&registry.default_office().id));
                }
                SessionChange::Restored => {}
                SessionChange::LoggedOut => registry.clear_profile(),
            }
        })
    }

    fn read_profile(&self) -> RwLockReadGuard<'_, Option<AccessProfile>> {
        self.profile.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_profile(&self) -> RwLockWriteGuard<'_, Option<AccessProfile>> {
        self.profile.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for TenancyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenancyRegistry")
            .field("offices", &self.offices.len())
            .field("profile", &self.profile())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccessLevel;

    fn offices() -> Vec<Office> {
        vec![
            Office::new("1", "Head Office", "Montreal"),
            Office::new("2", "Quebec Branch", "Quebec City"),
            Office::new("3", "Ontario Branch", "Toronto"),
        ]
    }

    fn profile(office: &str, multi: bool) -> AccessProfile {
        AccessProfile {
            access_level: AccessLevel::OfficeManager,
            current_office_id: OfficeId::new(office),
            multi_office_access: multi,
        }
    }

    #[test]
    fn test_rejects_empty_configuration() {
        assert_eq!(
            TenancyRegistry::new(vec![]).unwrap_err(),
            ConfigError::NoOffices
        );
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let mut list = offices();
        list.push(Office::new("2", "Duplicate", "Laval"));
        assert_eq!(
            TenancyRegistry::new(list).unwrap_err(),
            ConfigError::DuplicateOffice("2".to_string())
        );
    }

    #[test]
    fn test_defaults_to_first_office() {
        let registry = TenancyRegistry::new(offices()).unwrap();
        assert_eq!(registry.current_office().city, "Montreal");
        assert!(!registry.can_switch_offices());
    }

    #[test]
    fn test_list_order_is_stable() {
        let registry = TenancyRegistry::new(offices()).unwrap();
        let first: Vec<_> = registry.list_offices().iter().map(|o| o.id.clone()).collect();
        let second: Vec<_> = registry.list_offices().iter().map(|o| o.id.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(first[0].as_str(), "1");
    }

    #[test]
    fn test_attach_repoints_unknown_office() {
        let registry = TenancyRegistry::new(offices()).unwrap();
        let office = registry.attach_profile(profile("99", true));
        assert_eq!(office.id.as_str(), "1");
        assert_eq!(registry.profile().unwrap().current_office_id.as_str(), "1");
    }

    #[test]
    fn test_switch_with_multi_office_access() {
        let registry = TenancyRegistry::new(offices()).unwrap();
        registry.attach_profile(profile("1", true));

        let office = registry.switch_office("3").unwrap();

        assert_eq!(office.city, "Toronto");
        assert_eq!(registry.current_office().id.as_str(), "3");
    }

    #[test]
    fn test_switch_without_profile_is_forbidden() {
        let registry = TenancyRegistry::new(offices()).unwrap();
        assert_eq!(registry.switch_office("2"), Err(ScopeError::Forbidden));
        assert_eq!(registry.current_office().id.as_str(), "1");
    }

    #[test]
    fn test_clear_profile_broadcasts_once() {
        let registry = TenancyRegistry::new(offices()).unwrap();
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let _sub = {
            let events = events.clone();
            registry.subscribe(move |e| events.lock().unwrap().push(e.clone()))
        };

        registry.attach_profile(profile("2", false));
        registry.clear_profile();
        registry.clear_profile();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], TenancyEvent::ProfileCleared);
    }
}
