//! User profile model (the authorization record).

use serde::{Deserialize, Serialize};

/// Minimal authorization record stored at `users/{uid}`.
///
/// The document's existence is one arm of the authorization check.
/// Writes are merge-writes: fields not listed here must survive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Email address of the account
    #[serde(default)]
    pub email: Option<String>,
    /// Last login timestamp (RFC3339); empty for admin-provisioned docs
    #[serde(default)]
    pub last_login: String,
}
