use serde::{Deserialize, Serialize};

use crate::users::User;

/// Request body for the login callback.
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
