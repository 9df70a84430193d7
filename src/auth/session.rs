use serde::{Deserialize, Serialize};

/// Signed-in user as derived from the identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable subject identifier; the API keys images by it
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Credentials every API call needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserProfile,
    pub access_token: String,
}

impl Session {
    /// Both halves must be present for the session to count.
    pub fn is_usable(&self) -> bool {
        !self.user.user_id.is_empty() && !self.access_token.is_empty()
    }
}

/// Source of the current session. The engine asks on every operation and
/// never caches the answer.
pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<Session>;
}
