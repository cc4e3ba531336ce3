//! Service wiring for the API process.
//!
//! Handlers and auth services only see the stores through trait objects, so
//! the in-memory stores and the Postgres adapter are interchangeable.

use std::sync::Arc;

use clinidoc_auth::{
    AuthConfig, AuthError, LoginService, PrincipalDirectory, PrincipalRecord, Role, SessionController,
    TenantDirectory, TenantResolver, TokenCodec, password,
};
use clinidoc_core::{DomainError, PrincipalId};
use clinidoc_infra::{ClinicalStore, InMemoryClinicalIndex, InMemoryDirectory, PrincipalStore};

pub struct AppServices {
    pub principals: Arc<dyn PrincipalDirectory>,
    pub principal_store: Arc<dyn PrincipalStore>,
    pub tenants: Arc<dyn TenantDirectory>,
    pub resolver: Arc<dyn TenantResolver>,
    pub clinical: Arc<dyn ClinicalStore>,
    pub codec: Arc<TokenCodec>,
    pub login: LoginService,
    pub sessions: SessionController,
}

/// Result of [`AppServices::bootstrap_admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    Created(PrincipalId),
    AlreadyPresent,
}

impl AppServices {
    pub fn new<D, C>(config: &AuthConfig, directory: Arc<D>, clinical: Arc<C>) -> Self
    where
        D: PrincipalDirectory + PrincipalStore + TenantDirectory + 'static,
        C: ClinicalStore + TenantResolver + 'static,
    {
        let codec = Arc::new(TokenCodec::new(config));
        let principals: Arc<dyn PrincipalDirectory> = directory.clone();
        let tenants: Arc<dyn TenantDirectory> = directory.clone();
        let login = LoginService::new(principals.clone(), tenants.clone(), codec.clone());
        let sessions = SessionController::new(principals.clone(), tenants.clone(), codec.clone());

        Self {
            principals,
            principal_store: directory,
            tenants,
            resolver: clinical.clone(),
            clinical,
            codec,
            login,
            sessions,
        }
    }

    /// Empty stores.
    pub fn in_memory(config: &AuthConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryDirectory::new()),
            Arc::new(InMemoryClinicalIndex::new()),
        )
    }

    /// Create a platform administrator (no home tenant) unless one with the
    /// same username already exists.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<Bootstrap, AuthError> {
        if self.principals.find_by_username(None, username).await?.is_some() {
            tracing::info!(username, "bootstrap administrator already exists; skipping");
            return Ok(Bootstrap::AlreadyPresent);
        }

        let record = PrincipalRecord {
            id: PrincipalId::new(),
            home_tenant_id: None,
            username: username.to_string(),
            full_name: "Platform Administrator".to_string(),
            password_hash: password::hash_password(password, None).await?,
            role: Role::SuperAdmin,
            secondary_role: None,
            active: true,
        };
        let id = record.id;

        match self.principal_store.insert_principal(record).await {
            Ok(()) => {
                tracing::info!(principal_id = %id, username, "bootstrap administrator created");
                Ok(Bootstrap::Created(id))
            }
            // Lost a race with another process bootstrapping the same name.
            Err(DomainError::Conflict(_)) => {
                tracing::info!(username, "bootstrap administrator already exists; skipping");
                Ok(Bootstrap::AlreadyPresent)
            }
            Err(e) => Err(e.into()),
        }
    }
}
