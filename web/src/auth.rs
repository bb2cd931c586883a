//! HTTP basic-auth gate.
//!
//! Installed as a route layer on the todo routes with
//! `axum::middleware::from_fn_with_state`. Credentials are checked against
//! the [`CredentialStore`](todo_svc_auth::CredentialStore) held in
//! [`AppState`].

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

macro_rules! realm {
    () => {
        "todo-api"
    };
}

/// Realm advertised in the `WWW-Authenticate` challenge.
pub const REALM: &str = realm!();

const CHALLENGE: &str = concat!("Basic realm=\"", realm!(), "\"");

/// Username of the caller that passed the basic-auth gate.
///
/// Available to handlers as `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Reject the request with 401 unless it carries valid basic credentials.
///
/// The 401 carries a `WWW-Authenticate` challenge whether the header was
/// missing, malformed or simply wrong.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some((username, password)) = basic_credentials(req.headers()) else {
        tracing::debug!("Missing or malformed basic credentials");
        return challenge();
    };

    if !state.credentials.verify(&username, &password) {
        tracing::info!(user = %username, "Rejected basic credentials");
        return challenge();
    }

    tracing::Span::current().record("user", username.as_str());
    req.extensions_mut().insert(AuthenticatedUser(username));

    next.run(req).await
}

/// Decode `Authorization: Basic <base64(user:pass)>`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

fn challenge() -> Response {
    let mut response = AppError::unauthorized("Unauthorized").into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(CHALLENGE),
    );
    response
}
