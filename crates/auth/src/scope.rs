//! Tenant scoping policy.
//!
//! Every read or write of a tenant-owned resource resolves the owning tenant
//! first and asks this module before touching the record. A refusal is always
//! the same generic `access denied`, whether the record lives in another
//! tenant or does not exist at all.

use clinidoc_core::{NoteId, PatientId, TenantId, VisitId};

use crate::{AuthError, Claims, ForbiddenReason, TenantResolver};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TenantAccess {
    Allow,
    Deny,
}

impl TenantAccess {
    pub fn is_allowed(self) -> bool {
        matches!(self, TenantAccess::Allow)
    }

    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            TenantAccess::Allow => Ok(()),
            TenantAccess::Deny => Err(ForbiddenReason::AccessDenied.into()),
        }
    }
}

/// Access to a tenant-owned (clinical) resource.
///
/// Allowed iff the resource's tenant is the caller's effective tenant. A
/// platform principal outside any impersonation has no effective tenant for
/// clinical data and is always denied.
pub fn authorize_tenant_access(claims: &Claims, resource_tenant_id: TenantId) -> TenantAccess {
    let grant = claims.grant();
    if grant.role().is_platform() && !grant.is_impersonating() {
        tracing::warn!(
            principal_id = %grant.principal_id(),
            resource_tenant_id = %resource_tenant_id,
            "platform principal must impersonate before touching tenant data"
        );
        return TenantAccess::Deny;
    }

    match grant.effective_tenant() {
        Some(effective) if effective == resource_tenant_id => TenantAccess::Allow,
        effective => {
            tracing::warn!(
                principal_id = %grant.principal_id(),
                effective_tenant_id = ?effective,
                resource_tenant_id = %resource_tenant_id,
                "cross-tenant access denied"
            );
            TenantAccess::Deny
        }
    }
}

/// Access to a tenant as an administrative object (listing, settings).
///
/// Platform principals outside impersonation may administer any tenant;
/// everyone else falls back to [`authorize_tenant_access`].
pub fn authorize_tenant_administration(claims: &Claims, tenant_id: TenantId) -> TenantAccess {
    let grant = claims.grant();
    if grant.role().is_platform() && !grant.is_impersonating() {
        return TenantAccess::Allow;
    }
    authorize_tenant_access(claims, tenant_id)
}

/// A tenant-owned resource, named by id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Organization(TenantId),
    Patient(PatientId),
    Visit(VisitId),
    Note(NoteId),
}

/// Walk `Note → Visit → Patient → Tenant`. Any missing link yields `None`.
pub async fn resolve_owning_tenant(
    resolver: &dyn TenantResolver,
    resource: ResourceRef,
) -> Result<Option<TenantId>, AuthError> {
    let patient = match resource {
        ResourceRef::Organization(tenant_id) => return Ok(Some(tenant_id)),
        ResourceRef::Patient(patient_id) => Some(patient_id),
        ResourceRef::Visit(visit_id) => resolver.visit_patient(visit_id).await?,
        ResourceRef::Note(note_id) => match resolver.note_visit(note_id).await? {
            Some(visit_id) => resolver.visit_patient(visit_id).await?,
            None => None,
        },
    };

    match patient {
        Some(patient_id) => Ok(resolver.patient_tenant(patient_id).await?),
        None => Ok(None),
    }
}

/// Resolve `resource`'s tenant and apply [`authorize_tenant_access`].
///
/// Returns the owning tenant on success. Unresolvable resources fail closed
/// with the same error as out-of-tenant ones.
pub async fn authorize_resource(
    claims: &Claims,
    resolver: &dyn TenantResolver,
    resource: ResourceRef,
) -> Result<TenantId, AuthError> {
    let Some(owner) = resolve_owning_tenant(resolver, resource).await? else {
        tracing::debug!(?resource, "resource ownership unresolved; denying");
        return Err(ForbiddenReason::AccessDenied.into());
    };
    authorize_tenant_access(claims, owner).into_result()?;
    Ok(owner)
}
