use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

use super::errors::UserError;

// ============================================================================
// User Value Objects
// ============================================================================
//
// Self-validating immutable values. Construction is the only place invariants
// are checked; once a value exists it is known to be well-formed.
//
// ============================================================================

/// Unique user identifier, textual round-trip via `parse`/`Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, UserError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| UserError::InvalidIdentifier(value.to_string()))
    }

    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Email address, normalized to trimmed lowercase.
///
/// Invariants: valid syntax, total length <= 254, local part <= 64.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserError> {
        let normalized = value.as_ref().trim().to_lowercase();

        if !normalized.validate_email() {
            return Err(UserError::InvalidEmail(format!(
                "invalid email format: {normalized}"
            )));
        }
        if normalized.len() > 254 {
            return Err(UserError::InvalidEmail(
                "email address is too long".to_string(),
            ));
        }
        let email = Self(normalized);
        if email.local_part().len() > 64 {
            return Err(UserError::InvalidEmail(
                "email local part is too long".to_string(),
            ));
        }

        Ok(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the `@`. Validation guarantees the separator is present.
    pub fn local_part(&self) -> &str {
        let at = self.0.find('@').unwrap_or(self.0.len());
        &self.0[..at]
    }

    /// Part after the `@`.
    pub fn domain(&self) -> &str {
        match self.0.find('@') {
            Some(at) => &self.0[at + 1..],
            None => "",
        }
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Email {
    type Error = UserError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

static NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{M}\s\-'.]+$").expect("name pattern is valid"));

/// Display name, trimmed. Length in [2, 255]; letters, marks, spaces,
/// hyphens, apostrophes and periods only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserError> {
        let trimmed = value.as_ref().trim().to_string();

        let length = trimmed.chars().count();
        if length < 2 {
            return Err(UserError::InvalidName(
                "name must be at least 2 characters long".to_string(),
            ));
        }
        if length > 255 {
            return Err(UserError::InvalidName(
                "name cannot exceed 255 characters".to_string(),
            ));
        }
        if !NAME_CHARS.is_match(&trimmed) {
            return Err(UserError::InvalidName(format!(
                "name contains invalid characters: {trimmed}"
            )));
        }

        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Token before the first space.
    pub fn first_name(&self) -> &str {
        self.0.split(' ').next().unwrap_or("")
    }

    /// Everything after the first space, joined back together.
    pub fn last_name(&self) -> String {
        let mut parts = self.0.split(' ');
        parts.next();
        parts.collect::<Vec<_>>().join(" ")
    }

    /// Uppercase first letter of each token.
    pub fn initials(&self) -> String {
        self.0
            .split(' ')
            .filter(|word| !word.is_empty())
            .filter_map(|word| word.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserName {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
