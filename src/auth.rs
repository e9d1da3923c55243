use crate::errors::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// permissive on purpose: one @, no whitespace, a dot in the domain
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// The caller on whose behalf a service operation runs. Resolved by the
/// hosting layer; the service only checks the flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
}

impl Identity {
    pub fn admin(user_id: &str, email: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            is_admin: true,
        }
    }

    pub fn member(user_id: &str, email: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            is_admin: false,
        }
    }
}

/// Admin-only operations refuse non-admin callers before touching the store.
pub fn require_admin(identity: &Identity) -> AppResult<()> {
    if identity.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User '{}' is not an administrator",
            identity.email
        )))
    }
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(AppError::Policy(format!("Invalid email address: '{}'", email)))
    }
}
