use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role held by a principal.
///
/// The set is closed: handlers never compare role names as strings, they go
/// through [`Role`] and the permission table in [`crate::permissions`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform-wide administrator. Not bound to a tenant; may manage tenants
    /// and impersonate them.
    SuperAdmin,
    /// Administrator of a single organization.
    Admin,
    /// Clinical author.
    Doctor,
    /// Read-mostly support staff.
    Staff,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Doctor, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Staff => "staff",
        }
    }

    /// Whether this is the platform-level role.
    pub fn is_platform(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
