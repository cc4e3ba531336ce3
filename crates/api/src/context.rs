use clinidoc_auth::{Claims, Role};
use clinidoc_core::{PrincipalId, TenantId};

/// Verified session for a request.
///
/// Inserted by the guard; handlers behind it can rely on it being present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    claims: Claims,
}

impl SessionContext {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.claims.principal_id()
    }

    pub fn active_role(&self) -> Role {
        self.claims.active_role()
    }

    /// Tenant whose data the request acts on; `None` for a platform
    /// administrator outside any tenant.
    pub fn effective_tenant(&self) -> Option<TenantId> {
        self.claims.effective_tenant()
    }
}
