use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use clinidoc_auth::{NewTenant, PrincipalDirectory, PrincipalRecord, Role, Tenant, TenantDirectory};
use clinidoc_core::{DomainError, DomainResult, PrincipalId, TenantId};

use crate::store::PrincipalStore;

/// In-memory principal and tenant directory for tests/dev.
///
/// The record counter is bumped under the write lock, which gives the same
/// no-duplicate guarantee a row-level `UPDATE ... RETURNING` gives in SQL.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    principals: RwLock<HashMap<PrincipalId, PrincipalRecord>>,
    tenants: RwLock<HashMap<TenantId, Tenant>>,
}

fn poisoned() -> DomainError {
    DomainError::unavailable("directory lock poisoned")
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a principal. Usernames are unique within a home tenant (and among
    /// platform principals).
    pub fn insert_principal(&self, record: PrincipalRecord) -> DomainResult<()> {
        let mut map = self.principals.write().map_err(|_| poisoned())?;
        let taken = map
            .values()
            .any(|p| p.home_tenant_id == record.home_tenant_id && p.username == record.username);
        if taken {
            return Err(DomainError::conflict(format!(
                "username '{}' already exists",
                record.username
            )));
        }
        map.insert(record.id, record);
        Ok(())
    }

    pub fn set_principal_active(&self, id: PrincipalId, active: bool) -> DomainResult<()> {
        self.update_principal(id, |p| p.active = active)
    }

    pub fn set_principal_roles(&self, id: PrincipalId, role: Role, secondary_role: Option<Role>) -> DomainResult<()> {
        self.update_principal(id, |p| {
            p.role = role;
            p.secondary_role = secondary_role;
        })
    }

    pub fn set_tenant_active(&self, id: TenantId, active: bool) -> DomainResult<()> {
        let mut map = self.tenants.write().map_err(|_| poisoned())?;
        let tenant = map.get_mut(&id).ok_or(DomainError::NotFound)?;
        tenant.active = active;
        Ok(())
    }

    fn update_principal(&self, id: PrincipalId, f: impl FnOnce(&mut PrincipalRecord)) -> DomainResult<()> {
        let mut map = self.principals.write().map_err(|_| poisoned())?;
        let record = map.get_mut(&id).ok_or(DomainError::NotFound)?;
        f(record);
        Ok(())
    }
}

#[async_trait]
impl PrincipalStore for InMemoryDirectory {
    async fn insert_principal(&self, record: PrincipalRecord) -> DomainResult<()> {
        InMemoryDirectory::insert_principal(self, record)
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryDirectory {
    async fn find_by_username(
        &self,
        home_tenant_id: Option<TenantId>,
        username: &str,
    ) -> DomainResult<Option<PrincipalRecord>> {
        let map = self.principals.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .find(|p| p.home_tenant_id == home_tenant_id && p.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> DomainResult<Option<PrincipalRecord>> {
        let map = self.principals.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }
}

#[async_trait]
impl TenantDirectory for InMemoryDirectory {
    async fn find_tenant(&self, id: TenantId) -> DomainResult<Option<Tenant>> {
        let map = self.tenants.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_tenant_by_code(&self, code: &str) -> DomainResult<Option<Tenant>> {
        let map = self.tenants.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|t| t.matches_code(code)).cloned())
    }

    async fn list_tenants(&self) -> DomainResult<Vec<Tenant>> {
        let map = self.tenants.read().map_err(|_| poisoned())?;
        let mut tenants: Vec<Tenant> = map.values().cloned().collect();
        tenants.sort_by_key(|t| t.code);
        Ok(tenants)
    }

    async fn create_tenant(&self, new: NewTenant) -> DomainResult<Tenant> {
        new.validate()?;
        let mut map = self.tenants.write().map_err(|_| poisoned())?;
        if let Some(existing) = map.values().find(|t| new.collides_with(t)) {
            return Err(DomainError::conflict(format!(
                "organization code {} / '{}' already in use",
                existing.code, existing.short_code
            )));
        }
        let tenant = new.into_tenant(TenantId::new());
        map.insert(tenant.id, tenant.clone());
        tracing::info!(tenant_id = %tenant.id, code = tenant.code, "organization created");
        Ok(tenant)
    }

    async fn next_record_number(&self, id: TenantId) -> DomainResult<u64> {
        let mut map = self.tenants.write().map_err(|_| poisoned())?;
        let tenant = map.get_mut(&id).ok_or(DomainError::NotFound)?;
        tenant.record_counter += 1;
        Ok(tenant.record_counter)
    }
}
