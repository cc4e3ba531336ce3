use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use clinidoc_auth::AuthError;
use clinidoc_core::DomainError;

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    let status = match &err {
        AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
        AuthError::AuthenticationRequired
        | AuthError::AuthenticationFailed
        | AuthError::AccountDeactivated
        | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::NotFound(_) => StatusCode::NOT_FOUND,
        AuthError::Conflict(_) => StatusCode::CONFLICT,
        AuthError::Internal(msg) => {
            tracing::error!(error = %msg, "request failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, err.code(), "internal error");
        }
    };
    json_error(status, err.code(), err.to_string())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    auth_error_to_response(AuthError::from(err))
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use clinidoc_auth::ForbiddenReason;

    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (AuthError::bad_request("x"), StatusCode::BAD_REQUEST),
            (AuthError::AuthenticationRequired, StatusCode::UNAUTHORIZED),
            (AuthError::AuthenticationFailed, StatusCode::UNAUTHORIZED),
            (AuthError::AccountDeactivated, StatusCode::UNAUTHORIZED),
            (AuthError::TokenInvalid, StatusCode::UNAUTHORIZED),
            (ForbiddenReason::AccessDenied.into(), StatusCode::FORBIDDEN),
            (AuthError::NotFound("tenant"), StatusCode::NOT_FOUND),
            (AuthError::Conflict("dup".into()), StatusCode::CONFLICT),
            (AuthError::internal("db down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(auth_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn domain_not_found_maps_to_404() {
        assert_eq!(
            domain_error_to_response(DomainError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }
}
