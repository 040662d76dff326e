use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Role-change body with the role left unparsed, so an unknown role is a
/// 400 rather than a body rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoleChange {
    #[serde(default)]
    pub target_user_id: String,
    #[serde(default)]
    pub new_role: String,
}
