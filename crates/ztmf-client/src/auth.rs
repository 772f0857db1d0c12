//! Session loading: who is signed in, and with what role.
//!
//! The JWT is only decoded, never verified. The backend checks it on every
//! request; the client just needs the email to look up the profile.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tracing::{debug, warn};

use ztmf_core::model::User;

use crate::ZtmfClient;
use crate::error::ZtmfError;

/// Claims read from the bearer token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload of a JWT. A leading `Bearer ` is accepted.
///
/// # Errors
///
/// Returns `ZtmfError::Token` if the token is not three dot-separated parts
/// with a base64url JSON payload.
pub fn decode_claims(token: &str) -> Result<Claims, ZtmfError> {
    let jwt = token.trim();
    let jwt = jwt.strip_prefix("Bearer ").unwrap_or(jwt).trim();

    let parts: Vec<&str> = jwt.split('.').collect();
    let [_, payload, _] = parts.as_slice() else {
        return Err(ZtmfError::Token(format!(
            "expected 3 token segments, found {}",
            parts.len()
        )));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ZtmfError::Token(format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| ZtmfError::Token(format!("payload is not JSON: {e}")))
}

/// Result of loading the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub ok: bool,
    pub user: User,
}

impl AuthState {
    pub fn signed_out() -> Self {
        Self {
            ok: false,
            user: User::empty(),
        }
    }
}

/// Resolve the signed-in user. Never fails: any problem is logged and
/// reported as a signed-out state.
pub async fn load_auth(client: &ZtmfClient) -> AuthState {
    match current_user(client).await {
        Ok(user) => {
            debug!(email = %user.email, admin = user.is_admin(), "session loaded");
            AuthState { ok: true, user }
        }
        Err(err) => {
            warn!(error = %err, "could not load session");
            AuthState::signed_out()
        }
    }
}

async fn current_user(client: &ZtmfClient) -> Result<User, ZtmfError> {
    let bearer = client.whoami().await?;
    let claims = decode_claims(&bearer)?;
    if claims.email.is_empty() {
        return Err(ZtmfError::Token("token has no email claim".to_owned()));
    }
    client.user_by_email(&claims.email).await
}
