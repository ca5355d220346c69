use crate::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role carried in every token.
///
/// Wire names match the tokens already issued in the field: the platform
/// admin role is `ADMIN`, with `SUPER_ADMIN` and `PLATFORM_ADMIN` accepted
/// when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "STUDENT")]
    Student,
    #[serde(rename = "COLLEGE_ADMIN")]
    CollegeAdmin,
    #[serde(rename = "ADMIN", alias = "SUPER_ADMIN", alias = "PLATFORM_ADMIN")]
    PlatformAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::CollegeAdmin => "COLLEGE_ADMIN",
            Role::PlatformAdmin => "ADMIN",
        }
    }

    /// Whether identities with this role must carry a college id.
    pub fn is_tenant_bound(&self) -> bool {
        !matches!(self, Role::PlatformAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(value: &str) -> AuthzResult<Self> {
        match value {
            "STUDENT" => Ok(Role::Student),
            "COLLEGE_ADMIN" => Ok(Role::CollegeAdmin),
            "ADMIN" | "SUPER_ADMIN" | "PLATFORM_ADMIN" => Ok(Role::PlatformAdmin),
            other => Err(AuthzError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::PlatformAdmin).expect("serialize"),
            "\"ADMIN\""
        );
        assert_eq!(
            serde_json::to_string(&Role::CollegeAdmin).expect("serialize"),
            "\"COLLEGE_ADMIN\""
        );
    }

    #[test]
    fn accepts_platform_admin_aliases() {
        for raw in ["\"ADMIN\"", "\"SUPER_ADMIN\"", "\"PLATFORM_ADMIN\""] {
            let role: Role = serde_json::from_str(raw).expect("deserialize");
            assert_eq!(role, Role::PlatformAdmin);
        }
        assert_eq!("SUPER_ADMIN".parse::<Role>().expect("parse"), Role::PlatformAdmin);
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(serde_json::from_str::<Role>("\"JANITOR\"").is_err());
        assert!(matches!(
            "JANITOR".parse::<Role>(),
            Err(AuthzError::UnknownRole(_))
        ));
    }

    #[test]
    fn only_platform_admin_is_unbound() {
        assert!(Role::Student.is_tenant_bound());
        assert!(Role::CollegeAdmin.is_tenant_bound());
        assert!(!Role::PlatformAdmin.is_tenant_bound());
    }
}
