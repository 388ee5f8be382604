//! Marketplace roles and the typed caller identity.
//!
//! The role name constants must match the values stored in `users.role` and
//! embedded in access tokens.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_AGENCY: &str = "agency";

/// The two kinds of marketplace participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Agency,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => ROLE_CLIENT,
            Role::Agency => ROLE_AGENCY,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_CLIENT => Ok(Role::Client),
            ROLE_AGENCY => Ok(Role::Agency),
            other => Err(CoreError::Unauthorized(format!("Unknown role '{other}'"))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Verified identity of whoever issued the current request or socket event.
///
/// Produced once at the authentication boundary and passed explicitly into
/// every workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub role: Role,
}

impl Caller {
    pub fn client(user_id: DbId) -> Self {
        Self {
            user_id,
            role: Role::Client,
        }
    }

    pub fn agency(user_id: DbId) -> Self {
        Self {
            user_id,
            role: Role::Agency,
        }
    }

    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }

    pub fn is_agency(&self) -> bool {
        self.role == Role::Agency
    }

    /// Reject with `Forbidden` unless the caller is a client.
    pub fn require_client(&self) -> Result<(), CoreError> {
        if self.is_client() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Client role required".into()))
        }
    }

    /// Reject with `Forbidden` unless the caller is an agency.
    pub fn require_agency(&self) -> Result<(), CoreError> {
        if self.is_agency() {
            Ok(())
        } else {
            Err(CoreError::Forbidden("Agency role required".into()))
        }
    }
}
