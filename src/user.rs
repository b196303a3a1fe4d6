//! The user record and the input shape callers build it from.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A persisted user record. This is exactly what one element of the snapshot
/// array looks like on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque id, set by the caller at creation and never changed.
    pub id: String,
    /// Display name, never empty.
    pub name: String,
    /// Email address, unique across live users (exact match).
    pub email: String,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Set at creation and refreshed on every update.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record with both timestamps set to `now`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replacement record for an update: new name/email, original id and
    /// `created_at`, `updated_at` bumped to `now`.
    #[must_use]
    pub fn replaced_with(&self, input: UserInput, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id.clone(),
            name: input.name,
            email: input.email,
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// Desired display name.
    pub name: String,
    /// Desired email address.
    pub email: String,
}

impl UserInput {
    /// Shorthand constructor.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Reject blank names and emails that don't look like `local@domain.tld`.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Invalid("name is required".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(Error::Invalid(format!(
                "email {:?} is not a valid address",
                self.email
            )));
        }
        Ok(())
    }
}

/// Shape check only; no DNS, no normalisation.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$").ok()
        })
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}
