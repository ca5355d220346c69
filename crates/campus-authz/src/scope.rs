//! Tenant-scoping policy.
//!
//! Maps an identity and a resource kind to the row filter every store call
//! must apply. This is the only place that knows which role sees which rows;
//! handlers and stores only consume the resulting [`Scope`].
use crate::{Identity, Role};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    College,
    PlatformAdmin,
    CollegeAdmin,
    Student,
    Assessment,
    Question,
    Attempt,
    Progress,
}

/// Row filter handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every row of the kind.
    Unscoped,
    /// Rows owned by one college.
    College { college_id: String },
    /// Rows owned by one student (who belongs to `college_id`).
    Owner {
        student_id: String,
        college_id: String,
    },
}

impl Scope {
    pub fn college_id(&self) -> Option<&str> {
        match self {
            Scope::Unscoped => None,
            Scope::College { college_id } | Scope::Owner { college_id, .. } => Some(college_id),
        }
    }

    pub fn owner_id(&self) -> Option<&str> {
        match self {
            Scope::Owner { student_id, .. } => Some(student_id),
            _ => None,
        }
    }

    /// Whether a row belonging to `college_id` (and no particular student)
    /// is visible.
    pub fn admits_college(&self, college_id: &str) -> bool {
        self.college_id().is_none_or(|scoped| scoped == college_id)
    }

    /// Whether a row owned by `student_id` in `college_id` is visible.
    pub fn admits_owner(&self, student_id: &str, college_id: &str) -> bool {
        self.admits_college(college_id) && self.owner_id().is_none_or(|owner| owner == student_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{role} may not access {kind:?}")]
pub struct ScopeDenied {
    pub role: Role,
    pub kind: ResourceKind,
}

/// Decide the row filter for `identity` reading or writing rows of `kind`.
///
/// Tenant-bound roles without a college id are always denied.
pub fn scope_query(identity: &Identity, kind: ResourceKind) -> Result<Scope, ScopeDenied> {
    let denied = || ScopeDenied {
        role: identity.role,
        kind,
    };
    if identity.role == Role::PlatformAdmin {
        return Ok(Scope::Unscoped);
    }
    let college_id = identity
        .college_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(denied)?;
    match (identity.role, kind) {
        (_, ResourceKind::College | ResourceKind::PlatformAdmin) => Err(denied()),
        (
            Role::CollegeAdmin,
            ResourceKind::CollegeAdmin
            | ResourceKind::Student
            | ResourceKind::Assessment
            | ResourceKind::Question
            | ResourceKind::Attempt
            | ResourceKind::Progress,
        ) => Ok(Scope::College { college_id }),
        (Role::Student, ResourceKind::Assessment | ResourceKind::Question) => {
            Ok(Scope::College { college_id })
        }
        (
            Role::Student,
            ResourceKind::Student | ResourceKind::Attempt | ResourceKind::Progress,
        ) => Ok(Scope::Owner {
            student_id: identity.id.clone(),
            college_id,
        }),
        (Role::Student, ResourceKind::CollegeAdmin) => Err(denied()),
        (Role::PlatformAdmin, _) => Ok(Scope::Unscoped),
    }
}
