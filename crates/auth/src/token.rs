//! Signed, self-contained session tokens.
//!
//! Wire form: `base64url(json claims) "." base64url(hmac-sha256(secret, first segment))`,
//! both segments unpadded. Verification needs nothing but the secret and a
//! clock, so there is no server-side session state to consult (and nothing to
//! revoke early: a token stays valid until its own expiry).

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{AuthConfig, AuthError, Claims, SessionGrant};

type HmacSha256 = Hmac<Sha256>;

const SEPARATOR: char = '.';

/// Internal rejection cause. Logged for operators, never returned: callers
/// only ever see [`AuthError::TokenInvalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Malformed,
    BadSignature,
    InvalidClaims,
    Expired,
}

/// A freshly issued token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and verifies session tokens with a server-held HMAC key.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
    validity: Duration,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.signing_secret().to_vec(),
            validity: config.token_validity(),
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn issue(&self, grant: SessionGrant) -> Result<IssuedToken, AuthError> {
        self.issue_at(grant, Utc::now())
    }

    /// Stamp `now + validity` onto `grant`, serialize and sign.
    pub fn issue_at(&self, grant: SessionGrant, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        grant
            .validate()
            .map_err(|e| AuthError::internal(format!("refusing to sign invalid grant: {e}")))?;

        let expires_at = now
            .checked_add_signed(self.validity)
            .ok_or_else(|| AuthError::internal("token expiry out of range"))?;
        let claims = Claims::stamped(grant, expires_at.timestamp_millis());

        let json = serde_json::to_vec(&claims)
            .map_err(|e| AuthError::internal(format!("claims serialization failed: {e}")))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));

        Ok(IssuedToken {
            token: format!("{payload}{SEPARATOR}{signature}"),
            claims,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        self.check(token, now).map_err(|rejection| {
            tracing::debug!(?rejection, "session token rejected");
            AuthError::TokenInvalid
        })
    }

    fn check(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, Rejection> {
        let (payload, signature) = split(token).ok_or(Rejection::Malformed)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| Rejection::Malformed)?;

        // Signature first: nothing from the payload is trusted until it matches.
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Rejection::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| Rejection::Malformed)?;
        let claims: Claims = serde_json::from_slice(&json).map_err(|_| Rejection::Malformed)?;

        claims.grant().validate().map_err(|_| Rejection::InvalidClaims)?;

        if !claims.is_live_at(now) {
            return Err(Rejection::Expired);
        }

        Ok(claims)
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC is defined for keys of any length, including empty.
        <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"))
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"<redacted>")
            .field("validity", &self.validity)
            .finish()
    }
}

/// Exactly one separator, both halves non-empty.
fn split(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.split(SEPARATOR);
    let payload = parts.next()?;
    let signature = parts.next()?;
    if parts.next().is_some() || payload.is_empty() || signature.is_empty() {
        return None;
    }
    Some((payload, signature))
}
