use serde::{Deserialize, Serialize};

use clinidoc_core::{PrincipalId, TenantId};

use crate::Role;

/// Stored principal (employee account) as the directory returns it.
///
/// Accounts are deactivated, never deleted, so `active` is the only lifecycle
/// switch the auth layer observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub id: PrincipalId,
    /// `None` for platform-level principals.
    pub home_tenant_id: Option<TenantId>,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
    pub secondary_role: Option<Role>,
    pub active: bool,
}

impl PrincipalRecord {
    /// Whether `role` is one this principal may act as.
    pub fn holds(&self, role: Role) -> bool {
        self.role == role || self.secondary_role == Some(role)
    }

    pub fn profile(&self) -> PrincipalProfile {
        PrincipalProfile {
            id: self.id,
            home_tenant_id: self.home_tenant_id,
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            secondary_role: self.secondary_role,
            active: self.active,
        }
    }
}

/// Outward-facing view of a principal. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalProfile {
    pub id: PrincipalId,
    pub home_tenant_id: Option<TenantId>,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub secondary_role: Option<Role>,
    pub active: bool,
}
