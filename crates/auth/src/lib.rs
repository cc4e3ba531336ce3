//! `clinidoc-auth`: authentication, authorization and tenant isolation.
//!
//! This crate is intentionally decoupled from HTTP and storage: the API layer
//! hands it header values and request claims, and storage adapters implement
//! the traits in [`directory`].

pub mod authorize;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod login;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod scope;
pub mod switch;
pub mod tenant;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use authorize::{authorize_request, bearer_token};
pub use claims::{Claims, ClaimsError, SessionGrant};
pub use config::{AuthConfig, ConfigError, Environment};
pub use credentials::CredentialVerifier;
pub use directory::{PrincipalDirectory, TenantDirectory, TenantResolver};
pub use error::{AuthError, ForbiddenReason};
pub use login::{LoginOutcome, LoginRequest, LoginService};
pub use permissions::{Action, actions_for, has_permission, literal_has_permission};
pub use principal::{PrincipalProfile, PrincipalRecord};
pub use roles::Role;
pub use scope::{
    ResourceRef, TenantAccess, authorize_resource, authorize_tenant_access,
    authorize_tenant_administration, resolve_owning_tenant,
};
pub use switch::SessionController;
pub use tenant::{NewTenant, Tenant};
pub use token::{IssuedToken, TokenCodec};
