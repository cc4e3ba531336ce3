use std::sync::Arc;

use clinidoc_core::TenantId;

use crate::{AuthError, PrincipalDirectory, PrincipalRecord, password};

/// Checks a presented secret against a principal's stored hash.
///
/// Unknown username and wrong password are indistinguishable
/// (`AuthenticationFailed`). A deactivated account is reported as
/// `AccountDeactivated`, but only after the password has matched, so the
/// distinction is never visible to someone guessing usernames.
#[derive(Clone)]
pub struct CredentialVerifier {
    principals: Arc<dyn PrincipalDirectory>,
}

impl CredentialVerifier {
    pub fn new(principals: Arc<dyn PrincipalDirectory>) -> Self {
        Self { principals }
    }

    pub async fn verify(
        &self,
        home_tenant_id: Option<TenantId>,
        username: &str,
        plaintext: &str,
    ) -> Result<PrincipalRecord, AuthError> {
        let Some(principal) = self.principals.find_by_username(home_tenant_id, username).await? else {
            tracing::info!(username, reason = "unknown_principal", "login rejected");
            return Err(AuthError::AuthenticationFailed);
        };

        let matches = match password::verify_password(plaintext, &principal.password_hash).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(principal_id = %principal.id, error = %e, "stored credential unusable");
                false
            }
        };
        if !matches {
            tracing::info!(username, reason = "bad_secret", "login rejected");
            return Err(AuthError::AuthenticationFailed);
        }

        if !principal.active {
            tracing::info!(principal_id = %principal.id, reason = "deactivated", "login rejected");
            return Err(AuthError::AccountDeactivated);
        }

        Ok(principal)
    }
}
