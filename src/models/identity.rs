//! Authenticated identity as resolved by the external provider.

/// An authenticated user, as known to the identity provider.
///
/// The core only ever reads this; it is created by the provider and
/// adopted by the session gate once authorization succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Opaque unique user ID (the OIDC `sub` claim)
    pub uid: String,
    /// Display name shown on the leaderboard
    pub display_name: String,
    /// Email address; present only when the provider verified it
    pub email: Option<String>,
    /// Profile picture URL
    pub photo_url: Option<String>,
}
