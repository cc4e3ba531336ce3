use crate::{Action, AuthError, Claims, ForbiddenReason, TokenCodec, has_permission};

const BEARER_SCHEME: &str = "bearer";

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization.ok_or(AuthError::AuthenticationRequired)?;
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::AuthenticationRequired)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::AuthenticationRequired);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::AuthenticationRequired);
    }
    Ok(token)
}

/// Gate decision for one request.
///
/// - No IO
/// - No side effects beyond the allow/reject outcome
///
/// Missing or malformed header → `AuthenticationRequired`; bad token →
/// `TokenInvalid`; active role lacking `required` → `Forbidden`.
pub fn authorize_request(
    codec: &TokenCodec,
    authorization: Option<&str>,
    required: Option<Action>,
) -> Result<Claims, AuthError> {
    let token = bearer_token(authorization)?;
    let claims = codec.verify(token)?;

    if let Some(action) = required {
        if !has_permission(Some(claims.active_role()), action) {
            tracing::info!(
                principal_id = %claims.principal_id(),
                active_role = %claims.active_role(),
                required = %action,
                "permission denied"
            );
            return Err(ForbiddenReason::InsufficientPermissions.into());
        }
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use clinidoc_core::{PrincipalId, TenantId};

    use super::*;
    use crate::{AuthConfig, Role, SessionGrant};

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::new("guard-secret", Duration::hours(1)))
    }

    fn token_for(codec: &TokenCodec, role: Role, secondary: Option<Role>, active: Role) -> String {
        let grant = SessionGrant::new(PrincipalId::new(), Some(TenantId::new()), role, secondary, active, None)
            .unwrap();
        codec.issue(grant).unwrap().token
    }

    #[test]
    fn missing_or_malformed_header_requires_authentication() {
        let codec = codec();
        for header in [None, Some(""), Some("Bearer"), Some("Bearer   "), Some("Basic abc"), Some("Token abc")] {
            assert_eq!(
                authorize_request(&codec, header, None).unwrap_err(),
                AuthError::AuthenticationRequired,
                "{header:?}"
            );
        }
    }

    #[test]
    fn bad_token_is_invalid_not_missing() {
        let codec = codec();
        let err = authorize_request(&codec, Some("Bearer abc.def"), None).unwrap_err();
        assert_eq!(err, AuthError::TokenInvalid);
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let codec = codec();
        let token = token_for(&codec, Role::Staff, None, Role::Staff);
        assert!(authorize_request(&codec, Some(&format!("bearer {token}")), None).is_ok());
    }

    #[test]
    fn permission_checked_against_active_role() {
        let codec = codec();
        let header = format!(
            "Bearer {}",
            token_for(&codec, Role::Staff, Some(Role::Doctor), Role::Staff)
        );

        let claims = authorize_request(&codec, Some(&header), Some(Action::NoteRead)).unwrap();
        assert_eq!(claims.active_role(), Role::Staff);

        // Secondary role would allow it, but it is not active.
        let err = authorize_request(&codec, Some(&header), Some(Action::NoteWrite)).unwrap_err();
        assert_eq!(err, AuthError::Forbidden(ForbiddenReason::InsufficientPermissions));

        let doctor = format!(
            "Bearer {}",
            token_for(&codec, Role::Staff, Some(Role::Doctor), Role::Doctor)
        );
        assert!(authorize_request(&codec, Some(&doctor), Some(Action::NoteWrite)).is_ok());
    }
}
