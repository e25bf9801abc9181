/*
 * Responsibility
 * - /auth の request/response DTO
 * - token と register は同じ credentials 形式を受け取る
 */
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_LEN: usize = 30;
pub const PASSWORD_MIN_LEN: usize = 5;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Login only needs both fields present.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }

    pub fn validate_registration(&self) -> Result<(), &'static str> {
        self.validate()?;
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.trim().is_empty() {
        return Err("username cannot be empty");
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err("username must be <= 30 chars");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err("password must be >= 5 chars");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
