use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clinidoc_core::{PrincipalId, TenantId};

use crate::{PrincipalRecord, Role};

/// The authorization content of a session, before an expiry is stamped.
///
/// Immutable: every "change" (role switch, impersonation) builds a new grant
/// and a new token.
///
/// # Invariants
/// - `active_role` is either `role` or `secondary_role`.
/// - `impersonated_tenant_id` is only set when `role` is the platform role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    principal_id: PrincipalId,
    home_tenant_id: Option<TenantId>,
    role: Role,
    secondary_role: Option<Role>,
    active_role: Role,
    impersonated_tenant_id: Option<TenantId>,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("active role is neither the primary nor the secondary role")]
    ActiveRoleNotHeld,

    #[error("only the platform role may impersonate a tenant")]
    ImpersonationRequiresPlatformRole,
}

impl SessionGrant {
    pub fn new(
        principal_id: PrincipalId,
        home_tenant_id: Option<TenantId>,
        role: Role,
        secondary_role: Option<Role>,
        active_role: Role,
        impersonated_tenant_id: Option<TenantId>,
    ) -> Result<Self, ClaimsError> {
        let grant = Self {
            principal_id,
            home_tenant_id,
            role,
            secondary_role,
            active_role,
            impersonated_tenant_id,
        };
        grant.validate()?;
        Ok(grant)
    }

    /// Fresh session for a principal: primary role active, no impersonation.
    pub fn for_principal(principal: &PrincipalRecord) -> Self {
        Self {
            principal_id: principal.id,
            home_tenant_id: principal.home_tenant_id,
            role: principal.role,
            secondary_role: principal.secondary_role,
            active_role: principal.role,
            impersonated_tenant_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ClaimsError> {
        if self.active_role != self.role && Some(self.active_role) != self.secondary_role {
            return Err(ClaimsError::ActiveRoleNotHeld);
        }
        if self.impersonated_tenant_id.is_some() && !self.role.is_platform() {
            return Err(ClaimsError::ImpersonationRequiresPlatformRole);
        }
        Ok(())
    }

    pub fn with_active_role(&self, active_role: Role) -> Result<Self, ClaimsError> {
        let next = Self {
            active_role,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    pub fn impersonating(&self, tenant_id: TenantId) -> Result<Self, ClaimsError> {
        let next = Self {
            impersonated_tenant_id: Some(tenant_id),
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    pub fn without_impersonation(&self) -> Self {
        Self {
            impersonated_tenant_id: None,
            ..self.clone()
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn home_tenant_id(&self) -> Option<TenantId> {
        self.home_tenant_id
    }

    /// Primary role.
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn secondary_role(&self) -> Option<Role> {
        self.secondary_role
    }

    pub fn active_role(&self) -> Role {
        self.active_role
    }

    pub fn impersonated_tenant_id(&self) -> Option<TenantId> {
        self.impersonated_tenant_id
    }

    pub fn is_impersonating(&self) -> bool {
        self.impersonated_tenant_id.is_some()
    }

    /// Tenant enforced for this session: the impersonated tenant if set,
    /// otherwise the home tenant. All tenant-scoped work keys off this.
    pub fn effective_tenant(&self) -> Option<TenantId> {
        self.impersonated_tenant_id.or(self.home_tenant_id)
    }
}

/// Verified session claims: a grant plus its absolute expiry.
///
/// Only the token codec stamps expiries, so a `Claims` value outside this
/// crate has always come from `issue` or a successful `verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(flatten)]
    grant: SessionGrant,
    expires_at_epoch_ms: i64,
}

impl Claims {
    pub(crate) fn stamped(grant: SessionGrant, expires_at_epoch_ms: i64) -> Self {
        Self {
            grant,
            expires_at_epoch_ms,
        }
    }

    pub fn grant(&self) -> &SessionGrant {
        &self.grant
    }

    pub fn into_grant(self) -> SessionGrant {
        self.grant
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.grant.principal_id
    }

    pub fn active_role(&self) -> Role {
        self.grant.active_role
    }

    pub fn effective_tenant(&self) -> Option<TenantId> {
        self.grant.effective_tenant()
    }

    pub fn expires_at_epoch_ms(&self) -> i64 {
        self.expires_at_epoch_ms
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expires_at_epoch_ms)
    }

    pub(crate) fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at_epoch_ms > now.timestamp_millis()
    }
}
