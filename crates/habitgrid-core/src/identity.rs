//! Caller identity.
//!
//! Every accessor call runs on behalf of exactly one user. The identity is
//! resolved at the boundary (CLI flag or environment) and threaded through
//! the storage layer, which checks record ownership against it.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// The authenticated caller of an accessor operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: String,
}

impl Identity {
    /// Create an identity from a known user id.
    ///
    /// # Errors
    /// Returns `Unauthenticated` if the id is empty.
    pub fn new(user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(CoreError::Unauthenticated);
        }
        Ok(Self { user_id })
    }

    /// Resolve an identity from an optional user id, failing when absent.
    ///
    /// # Errors
    /// Returns `Unauthenticated` if no id is supplied.
    pub fn resolve(user_id: Option<String>) -> Result<Self> {
        match user_id {
            Some(id) => Self::new(id),
            None => Err(CoreError::Unauthenticated),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
