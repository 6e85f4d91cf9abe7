//! Authorization attributes attached to an authenticated session.

use serde::{Deserialize, Serialize};

use super::OfficeId;

/// Role of the signed-in user within the agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    SuperAdmin,
    OfficeManager,
    Recruiter,
    Collaborator,
}

impl AccessLevel {
    /// Display label used by the dashboard chrome.
    pub fn label(&self) -> &'static str {
        match self {
            AccessLevel::SuperAdmin => "Super Admin",
            AccessLevel::OfficeManager => "Office Manager",
            AccessLevel::Recruiter => "Recruiter",
            AccessLevel::Collaborator => "Collaborator",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Profile of the current authenticated session.
///
/// `current_office_id` always names a configured office while the profile is
/// held by a `TenancyRegistry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessProfile {
    pub access_level: AccessLevel,
    pub current_office_id: OfficeId,
    pub multi_office_access: bool,
}

/// Blueprint for the profile minted each time a session authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTemplate {
    pub access_level: AccessLevel,
    #[serde(default)]
    pub multi_office_access: bool,
    /// Office selected on login. Falls back to the first configured office.
    #[serde(default)]
    pub default_office_id: Option<OfficeId>,
}

impl ProfileTemplate {
    pub fn mint(&self, fallback_office: &OfficeId) -> AccessProfile {
        AccessProfile {
            access_level: self.access_level,
            current_office_id: self
                .default_office_id
                .clone()
                .unwrap_or_else(|| fallback_office.clone()),
            multi_office_access: self.multi_office_access,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_level_serde_names() {
        let level: AccessLevel = serde_json::from_str("\"office_manager\"").unwrap();
        assert_eq!(level, AccessLevel::OfficeManager);
        assert_eq!(
            serde_json::to_string(&AccessLevel::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
    }

    #[test]
    fn test_mint_uses_fallback_office() {
        let template = ProfileTemplate {
            access_level: AccessLevel::Recruiter,
            multi_office_access: false,
            default_office_id: None,
        };
        let profile = template.mint(&OfficeId::new("1"));
        assert_eq!(profile.current_office_id.as_str(), "1");
        assert!(!profile.multi_office_access);
    }

    #[test]
    fn test_mint_prefers_default_office() {
        let template = ProfileTemplate {
            access_level: AccessLevel::SuperAdmin,
            multi_office_access: true,
            default_office_id: Some(OfficeId::new("2")),
        };
        let profile = template.mint(&OfficeId::new("1"));
        assert_eq!(profile.current_office_id.as_str(), "2");
        assert_eq!(profile.access_level.label(), "Super Admin");
    }
}
