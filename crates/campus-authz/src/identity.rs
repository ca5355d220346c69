use crate::Role;
use serde::{Deserialize, Serialize};

/// The authenticated caller, as decoded from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub college_id: Option<String>,
}
