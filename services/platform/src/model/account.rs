//! Account records for the three principal kinds.
//!
//! Records carry the bcrypt hash and never derive `Serialize`; handlers
//! return the matching `*View` instead.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone)]
pub struct PlatformAdmin {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// College admin. Rows migrated from the old per-college `Admin` table keep
/// `legacy = true`; they log in and are listed like any other admin.
#[derive(Debug, Clone)]
pub struct CollegeAdmin {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub college_id: String,
    pub created_at: DateTime<Utc>,
    pub legacy: bool,
}

#[derive(Debug, Clone)]
pub struct Student {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub college_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAdminView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&PlatformAdmin> for PlatformAdminView {
    fn from(admin: &PlatformAdmin) -> Self {
        Self {
            id: admin.id.clone(),
            email: admin.email.clone(),
            name: admin.name.clone(),
            created_at: admin.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollegeAdminView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub college_id: String,
    pub created_at: DateTime<Utc>,
    pub legacy: bool,
}

impl From<&CollegeAdmin> for CollegeAdminView {
    fn from(admin: &CollegeAdmin) -> Self {
        Self {
            id: admin.id.clone(),
            email: admin.email.clone(),
            name: admin.name.clone(),
            college_id: admin.college_id.clone(),
            created_at: admin.created_at,
            legacy: admin.legacy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub college_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Student> for StudentView {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            email: student.email.clone(),
            name: student.name.clone(),
            college_id: student.college_id.clone(),
            created_at: student.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentActivityCounts {
    pub assessment_attempts: u64,
    pub progress: u64,
}
