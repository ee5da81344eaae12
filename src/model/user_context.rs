use crate::model::User;
use serde::{Deserialize, Serialize};

/// Identity of the caller, extracted from request headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub user_name: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }

    /// Create a default user context for development/testing
    pub fn default_user() -> Self {
        Self::new("dev-user", "developer")
    }

    pub fn as_user(&self) -> User {
        User::new(self.user_id.clone(), self.user_name.clone())
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::default_user()
    }
}
