use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{ValidateEmail, ValidateUrl};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(DomainError::validation("theme", "must be 'light' or 'dark'")),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) theme: Theme,
    pub(crate) is_staff: bool,
    pub(crate) is_superuser: bool,
    pub(crate) joined_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        let password_len = self.password.chars().count();
        if !(8..=128).contains(&password_len) {
            return Err(DomainError::validation("password", "must be 8..128 chars"));
        }
        Ok(Self {
            username,
            email,
            password: self.password,
            avatar: normalize_avatar(self.avatar)?,
            bio: normalize_bio(self.bio),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(DomainError::validation("username", "must be 1..64 chars"));
        }

        if self.password.is_empty() {
            return Err(DomainError::validation("password", "must not be empty"));
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

/// Profile changes requested by a client. `None` leaves a field untouched;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateUserRequest {
    pub(crate) username: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) avatar: Option<Option<String>>,
    pub(crate) bio: Option<Option<String>>,
    pub(crate) theme: Option<Theme>,
}

impl UpdateUserRequest {
    /// Full replacement requires the same mandatory fields as registration.
    pub(crate) fn require_full(&self) -> Result<(), DomainError> {
        if self.username.is_none() {
            return Err(DomainError::validation("username", "this field is required"));
        }
        if self.email.is_none() {
            return Err(DomainError::validation("email", "this field is required"));
        }
        Ok(())
    }

    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            username: self.username.as_deref().map(normalize_username).transpose()?,
            email: self.email.as_deref().map(normalize_email).transpose()?,
            avatar: self.avatar.map(normalize_avatar).transpose()?,
            bio: self.bio.map(normalize_bio),
            theme: self.theme,
        })
    }
}

pub(crate) fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 64 {
        return Err(DomainError::validation("username", "must be 3..64 chars"));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(DomainError::validation(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(username.to_string())
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::validation("email", "must be a valid email"));
    }
    Ok(email)
}

fn normalize_avatar(avatar: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(avatar) = avatar else {
        return Ok(None);
    };
    let avatar = avatar.trim().to_string();
    if avatar.is_empty() {
        return Ok(None);
    }
    if !avatar.validate_url() {
        return Err(DomainError::validation("avatar", "must be a valid URL"));
    }
    Ok(Some(avatar))
}

fn normalize_bio(bio: Option<String>) -> Option<String> {
    bio.map(|bio| bio.trim().to_string())
        .filter(|bio| !bio.is_empty())
}
