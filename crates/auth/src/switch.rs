//! Session re-issuance: tenant impersonation and active-role switching.
//!
//! Claims are never edited. Each operation re-reads the principal from the
//! directory, re-derives the grant from that record and signs a new token.
//! The previous token stays valid until its own expiry.

use std::sync::Arc;

use crate::{
    AuthError, Claims, ForbiddenReason, IssuedToken, PrincipalDirectory, PrincipalRecord, Role,
    SessionGrant, TenantDirectory, TokenCodec,
};

#[derive(Clone)]
pub struct SessionController {
    principals: Arc<dyn PrincipalDirectory>,
    tenants: Arc<dyn TenantDirectory>,
    codec: Arc<TokenCodec>,
}

impl SessionController {
    pub fn new(
        principals: Arc<dyn PrincipalDirectory>,
        tenants: Arc<dyn TenantDirectory>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            principals,
            tenants,
            codec,
        }
    }

    /// Enter another tenant's context. Platform principals only; the target
    /// must exist and be active.
    pub async fn switch_tenant(&self, claims: &Claims, tenant_code: &str) -> Result<IssuedToken, AuthError> {
        let tenant_code = tenant_code.trim();
        if tenant_code.is_empty() {
            return Err(AuthError::bad_request("target tenant code is required"));
        }

        let principal = self.current_principal(claims).await?;
        if !principal.role.is_platform() {
            return Err(ForbiddenReason::NotPlatformPrincipal.into());
        }

        let tenant = self
            .tenants
            .find_tenant_by_code(tenant_code)
            .await?
            .ok_or(AuthError::NotFound("organization"))?;
        if !tenant.active {
            return Err(ForbiddenReason::TenantInactive.into());
        }

        let grant = rederive(&principal, claims)
            .impersonating(tenant.id)
            .map_err(|e| AuthError::internal(e.to_string()))?;
        let issued = self.codec.issue(grant)?;

        tracing::info!(
            principal_id = %principal.id,
            tenant_id = %tenant.id,
            tenant_code = tenant.code,
            "impersonation started"
        );
        Ok(issued)
    }

    /// Leave an impersonated tenant. Platform principals only.
    pub async fn clear_impersonation(&self, claims: &Claims) -> Result<IssuedToken, AuthError> {
        let principal = self.current_principal(claims).await?;
        if !principal.role.is_platform() {
            return Err(ForbiddenReason::NotPlatformPrincipal.into());
        }

        let grant = rederive(&principal, claims).without_impersonation();
        let issued = self.codec.issue(grant)?;

        tracing::info!(
            principal_id = %principal.id,
            previous_tenant_id = ?claims.grant().impersonated_tenant_id(),
            "impersonation cleared"
        );
        Ok(issued)
    }

    /// Make `target` the active role. It must be the principal's primary or
    /// secondary role *as currently stored*; anything else is refused.
    pub async fn switch_role(&self, claims: &Claims, target: &str) -> Result<IssuedToken, AuthError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(AuthError::bad_request("target role is required"));
        }
        let target: Role = target
            .parse()
            .map_err(|_| AuthError::Forbidden(ForbiddenReason::IneligibleRole))?;

        let principal = self.current_principal(claims).await?;
        if !principal.holds(target) {
            tracing::info!(principal_id = %principal.id, target = %target, "role switch refused");
            return Err(ForbiddenReason::IneligibleRole.into());
        }

        let grant = rederive(&principal, claims)
            .with_active_role(target)
            .map_err(|e| AuthError::internal(e.to_string()))?;
        let issued = self.codec.issue(grant)?;

        tracing::info!(principal_id = %principal.id, active_role = %target, "active role switched");
        Ok(issued)
    }

    async fn current_principal(&self, claims: &Claims) -> Result<PrincipalRecord, AuthError> {
        let principal = self
            .principals
            .find_by_id(claims.principal_id())
            .await?
            .ok_or(AuthError::NotFound("principal"))?;
        if !principal.active {
            return Err(ForbiddenReason::PrincipalInactive.into());
        }
        Ok(principal)
    }
}

/// Rebuild a grant from the stored principal, carrying over session state
/// (active role, impersonation) only where the record still permits it.
fn rederive(principal: &PrincipalRecord, claims: &Claims) -> SessionGrant {
    let previous = claims.grant();

    let base = SessionGrant::for_principal(principal);
    let base = match base.with_active_role(previous.active_role()) {
        Ok(grant) => grant,
        Err(_) => base,
    };

    match previous.impersonated_tenant_id() {
        Some(tenant_id) => match base.impersonating(tenant_id) {
            Ok(grant) => grant,
            Err(_) => base,
        },
        None => base,
    }
}
