use std::sync::Arc;

use crate::{
    AuthError, CredentialVerifier, IssuedToken, PrincipalDirectory, PrincipalProfile, SessionGrant,
    Tenant, TenantDirectory, TokenCodec,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Numeric code or short identifier. Required for everyone except
    /// platform administrators.
    pub tenant_code: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: PrincipalProfile,
    pub tenant: Option<Tenant>,
    pub token: IssuedToken,
}

/// Credentials in, signed session out.
#[derive(Clone)]
pub struct LoginService {
    tenants: Arc<dyn TenantDirectory>,
    verifier: CredentialVerifier,
    codec: Arc<TokenCodec>,
}

impl LoginService {
    pub fn new(
        principals: Arc<dyn PrincipalDirectory>,
        tenants: Arc<dyn TenantDirectory>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            tenants,
            verifier: CredentialVerifier::new(principals),
            codec,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, AuthError> {
        if request.username.trim().is_empty() {
            return Err(AuthError::bad_request("username is required"));
        }
        if request.password.is_empty() {
            return Err(AuthError::bad_request("password is required"));
        }

        let tenant_code = request
            .tenant_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let tenant = match tenant_code {
            Some(code) => {
                let tenant = self.tenants.find_tenant_by_code(code).await?;
                match tenant {
                    Some(t) if t.active => Some(t),
                    Some(_) => {
                        tracing::info!(tenant_code = code, reason = "tenant_inactive", "login rejected");
                        return Err(AuthError::AuthenticationFailed);
                    }
                    None => {
                        tracing::info!(tenant_code = code, reason = "unknown_tenant", "login rejected");
                        return Err(AuthError::AuthenticationFailed);
                    }
                }
            }
            None => None,
        };

        let (principal, tenant) = match tenant {
            Some(t) => match self.verifier.verify(Some(t.id), &request.username, &request.password).await {
                Ok(principal) => (principal, Some(t)),
                // Platform principals have no home tenant; a code they send is ignored.
                Err(AuthError::AuthenticationFailed) => {
                    let principal = self.verifier.verify(None, &request.username, &request.password).await?;
                    if !principal.role.is_platform() {
                        return Err(AuthError::AuthenticationFailed);
                    }
                    (principal, None)
                }
                Err(e) => return Err(e),
            },
            None => (
                self.verifier.verify(None, &request.username, &request.password).await?,
                None,
            ),
        };

        // Without a tenant code only platform principals may sign in.
        if tenant.is_none() && !principal.role.is_platform() {
            tracing::info!(principal_id = %principal.id, reason = "tenant_required", "login rejected");
            return Err(AuthError::AuthenticationFailed);
        }

        let token = self.codec.issue(SessionGrant::for_principal(&principal))?;
        tracing::info!(
            principal_id = %principal.id,
            tenant_id = ?principal.home_tenant_id,
            role = %principal.role,
            "login succeeded"
        );

        Ok(LoginOutcome {
            principal: principal.profile(),
            tenant,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::test_support::StubDirectory;
    use crate::{AuthConfig, Role, password};

    struct Fixture {
        dir: Arc<StubDirectory>,
        codec: Arc<TokenCodec>,
        service: LoginService,
    }

    fn fixture() -> Fixture {
        let dir = Arc::new(StubDirectory::default());
        let codec = Arc::new(TokenCodec::new(&AuthConfig::new("login-secret", Duration::hours(24))));
        let service = LoginService::new(dir.clone(), dir.clone(), codec.clone());
        Fixture { dir, codec, service }
    }

    async fn with_password(f: &Fixture, record: &crate::PrincipalRecord, pw: &str) {
        let hash = password::hash_password(pw, Some(4)).await.unwrap();
        f.dir.set_password_hash(record.id, hash);
    }

    fn request(code: Option<&str>, username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            tenant_code: code.map(str::to_string),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn doctor_logs_in_with_tenant_code() {
        let f = fixture();
        let tenant = f.dir.add_tenant(1002, "mercy", true);
        let doctor = f.dir.add_principal(Some(tenant.id), "dr.smith", Role::Doctor, None);
        with_password(&f, &doctor, "correct horse").await;

        let outcome = f.service.login(request(Some("1002"), "dr.smith", "correct horse")).await.unwrap();
        let claims = f.codec.verify(&outcome.token.token).unwrap();
        assert_eq!(claims.active_role(), Role::Doctor);
        assert_eq!(claims.grant().impersonated_tenant_id(), None);
        assert_eq!(claims.effective_tenant(), Some(tenant.id));
        assert_eq!(outcome.tenant.map(|t| t.id), Some(tenant.id));
        assert_eq!(outcome.principal.username, "dr.smith");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let f = fixture();
        let tenant = f.dir.add_tenant(1002, "mercy", true);
        let doctor = f.dir.add_principal(Some(tenant.id), "dr.smith", Role::Doctor, None);
        with_password(&f, &doctor, "correct horse").await;

        let wrong = f.service.login(request(Some("1002"), "dr.smith", "nope")).await.unwrap_err();
        let unknown = f.service.login(request(Some("1002"), "dr.nobody", "nope")).await.unwrap_err();
        let bad_tenant = f.service.login(request(Some("7777"), "dr.smith", "correct horse")).await.unwrap_err();
        assert_eq!(wrong, AuthError::AuthenticationFailed);
        assert_eq!(unknown, AuthError::AuthenticationFailed);
        assert_eq!(bad_tenant, AuthError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn username_match_is_case_sensitive() {
        let f = fixture();
        let tenant = f.dir.add_tenant(1002, "mercy", true);
        let doctor = f.dir.add_principal(Some(tenant.id), "dr.smith", Role::Doctor, None);
        with_password(&f, &doctor, "pw").await;

        let err = f.service.login(request(Some("1002"), "Dr.Smith", "pw")).await.unwrap_err();
        assert_eq!(err, AuthError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn deactivated_account_is_reported_after_password_matches() {
        let f = fixture();
        let tenant = f.dir.add_tenant(1002, "mercy", true);
        let doctor = f.dir.add_principal(Some(tenant.id), "dr.smith", Role::Doctor, None);
        with_password(&f, &doctor, "pw").await;
        f.dir.deactivate(doctor.id);

        let err = f.service.login(request(Some("1002"), "dr.smith", "pw")).await.unwrap_err();
        assert_eq!(err, AuthError::AccountDeactivated);

        let err = f.service.login(request(Some("1002"), "dr.smith", "guess")).await.unwrap_err();
        assert_eq!(err, AuthError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn inactive_tenant_blocks_login() {
        let f = fixture();
        let tenant = f.dir.add_tenant(1005, "shut", false);
        let staff = f.dir.add_principal(Some(tenant.id), "sam", Role::Staff, None);
        with_password(&f, &staff, "pw").await;

        let err = f.service.login(request(Some("shut"), "sam", "pw")).await.unwrap_err();
        assert_eq!(err, AuthError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn platform_admin_logs_in_without_tenant() {
        let f = fixture();
        let admin = f.dir.add_principal(None, "root", Role::SuperAdmin, None);
        with_password(&f, &admin, "pw").await;

        let outcome = f.service.login(request(None, "root", "pw")).await.unwrap();
        assert!(outcome.tenant.is_none());
        assert_eq!(outcome.token.claims.effective_tenant(), None);
        assert_eq!(outcome.token.claims.active_role(), Role::SuperAdmin);
    }

    #[tokio::test]
    async fn platform_admin_may_send_a_tenant_code() {
        let f = fixture();
        f.dir.add_tenant(1002, "mercy", true);
        let admin = f.dir.add_principal(None, "root", Role::SuperAdmin, None);
        with_password(&f, &admin, "pw").await;

        let outcome = f.service.login(request(Some("1002"), "root", "pw")).await.unwrap();
        assert!(outcome.tenant.is_none());
        assert_eq!(outcome.token.claims.effective_tenant(), None);
        assert_eq!(outcome.token.claims.active_role(), Role::SuperAdmin);

        let err = f.service.login(request(Some("1002"), "root", "nope")).await.unwrap_err();
        assert_eq!(err, AuthError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn tenant_code_does_not_admit_homeless_non_platform_principals() {
        let f = fixture();
        f.dir.add_tenant(1002, "mercy", true);
        let stray = f.dir.add_principal(None, "orphan", Role::Doctor, None);
        with_password(&f, &stray, "pw").await;

        let err = f.service.login(request(Some("1002"), "orphan", "pw")).await.unwrap_err();
        assert_eq!(err, AuthError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn tenant_code_required_for_non_platform_principals() {
        let f = fixture();
        let stray = f.dir.add_principal(None, "orphan", Role::Doctor, None);
        with_password(&f, &stray, "pw").await;

        let err = f.service.login(request(None, "orphan", "pw")).await.unwrap_err();
        assert_eq!(err, AuthError::AuthenticationFailed);
    }

    #[tokio::test]
    async fn missing_fields_are_bad_requests() {
        let f = fixture();
        let err = f.service.login(request(Some("1002"), " ", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::BadRequest(_)));
        let err = f.service.login(request(Some("1002"), "dr.smith", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::BadRequest(_)));
    }
}
