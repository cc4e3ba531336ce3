use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use clinidoc_auth::{Action, TokenCodec, authorize_request};

use crate::app::errors::auth_error_to_response;
use crate::context::SessionContext;

/// Per-route guard configuration: the codec plus the action the route needs
/// (`None` = any authenticated session).
#[derive(Clone)]
pub struct GuardState {
    pub codec: Arc<TokenCodec>,
    pub required: Option<Action>,
}

impl GuardState {
    pub fn new(codec: Arc<TokenCodec>, required: Option<Action>) -> Self {
        Self { codec, required }
    }
}

pub async fn auth_middleware(
    State(state): State<GuardState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = match authorize_request(
        &state.codec,
        authorization_header(req.headers()),
        state.required,
    ) {
        Ok(claims) => claims,
        Err(e) => return auth_error_to_response(e),
    };

    req.extensions_mut().insert(SessionContext::new(claims));
    next.run(req).await
}

/// Raw `Authorization` value; non-ASCII values count as absent.
fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}
