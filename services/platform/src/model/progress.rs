use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TopicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicStatus::NotStarted => "not_started",
            TopicStatus::InProgress => "in_progress",
            TopicStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(TopicStatus::NotStarted),
            "in_progress" => Some(TopicStatus::InProgress),
            "completed" => Some(TopicStatus::Completed),
            _ => None,
        }
    }
}

/// One student's standing on one curriculum topic. Unique per
/// `(student_id, topic)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub id: String,
    pub student_id: String,
    pub topic: String,
    pub status: TopicStatus,
    pub progress: u8,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for an upsert on `(student_id, topic)`.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub student_id: String,
    pub topic: String,
    pub status: TopicStatus,
    pub progress: u8,
}
