use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A tenant. Names are globally unique and matched exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct College {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CollegeSummary {
    pub id: String,
    pub name: String,
}

impl From<&College> for CollegeSummary {
    fn from(college: &College) -> Self {
        Self {
            id: college.id.clone(),
            name: college.name.clone(),
        }
    }
}
