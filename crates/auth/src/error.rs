//! Failure taxonomy of the authentication/authorization boundary.
//!
//! Every variant is terminal for the current request. `code()` is the
//! machine-stable reason the transport layer hands back to callers.

use thiserror::Error;

use clinidoc_core::DomainError;

/// Why an authenticated caller was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// Tenant scoping refusal. Deliberately generic: it must not reveal
    /// whether the resource exists in another tenant.
    #[error("access denied")]
    AccessDenied,

    #[error("only platform administrators may change tenant context")]
    NotPlatformPrincipal,

    #[error("role is not assigned to this account")]
    IneligibleRole,

    #[error("organization is inactive")]
    TenantInactive,

    #[error("account is deactivated")]
    PrincipalInactive,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("authentication required")]
    AuthenticationRequired,

    /// Unknown principal, unknown/inactive tenant or wrong secret. Never says which.
    #[error("invalid credentials")]
    AuthenticationFailed,

    #[error("account deactivated")]
    AccountDeactivated,

    /// Malformed, tampered or expired token, collapsed into one outcome.
    #[error("invalid or expired token")]
    TokenInvalid,

    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::BadRequest(_) => "bad_request",
            AuthError::AuthenticationRequired => "authentication_required",
            AuthError::AuthenticationFailed => "authentication_failed",
            AuthError::AccountDeactivated => "account_deactivated",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::NotFound(_) => "not_found",
            AuthError::Conflict(_) => "conflict",
            AuthError::Internal(_) => "internal_error",
        }
    }
}

impl From<ForbiddenReason> for AuthError {
    fn from(value: ForbiddenReason) -> Self {
        AuthError::Forbidden(value)
    }
}

impl From<DomainError> for AuthError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => AuthError::BadRequest(msg),
            DomainError::NotFound => AuthError::NotFound("record"),
            DomainError::Conflict(msg) => AuthError::Conflict(msg),
            DomainError::Unavailable(msg) => AuthError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AuthError::TokenInvalid.code(), "token_invalid");
        assert_eq!(AuthError::Forbidden(ForbiddenReason::AccessDenied).code(), "forbidden");
        assert_eq!(AuthError::AuthenticationFailed.code(), "authentication_failed");
    }

    #[test]
    fn access_denied_message_is_generic() {
        let msg = AuthError::from(ForbiddenReason::AccessDenied).to_string();
        assert_eq!(msg, "forbidden: access denied");
    }

    #[test]
    fn storage_failures_become_internal() {
        let err = AuthError::from(DomainError::unavailable("pool closed"));
        assert_eq!(err.code(), "internal_error");
    }
}
