//! Signed bearer tokens
//!
//! Format: `base64url(payload).base64url(HMAC-SHA256(base64url(payload)))`,
//! payload `{ "sub", "ver", "iat", "exp" }`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use stayhub_storage::TOKEN_SECRET_SIZE;
use tracing::debug;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime: 24 hours
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Longest configurable token lifetime: one year
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id
    pub sub: String,
    /// Credential token version at issue time
    pub ver: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Why a token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token expired")]
    Expired,
}

/// Signs and validates tokens with a process-wide secret
pub struct TokenSigner {
    secret: Zeroizing<[u8; TOKEN_SECRET_SIZE]>,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: Zeroizing<[u8; TOKEN_SECRET_SIZE]>, ttl_secs: i64) -> Self {
        Self { secret, ttl_secs }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length; a fixed 32-byte key cannot fail
        match HmacSha256::new_from_slice(&self.secret[..]) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC key length is unrestricted"),
        }
    }

    /// Issue a token for `user_id` at credential version `version`
    pub fn issue(&self, user_id: &str, version: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        self.sign(&TokenClaims {
            sub: user_id.to_string(),
            ver: version,
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        })
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &TokenClaims) -> String {
        // Serializing a struct of strings and integers cannot fail
        let payload = serde_json::to_vec(claims).unwrap_or_default();
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac();
        mac.update(payload_b64.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", payload_b64, signature_b64)
    }

    /// Verify signature and expiry. Version checks happen against the store.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        if signature_b64.contains('.') {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac();
        mac.update(payload_b64.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            debug!("[Auth] Invalid token signature");
            return Err(TokenError::BadSignature);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        let now = chrono::Utc::now().timestamp();
        if now > claims.exp {
            debug!("[Auth] Token expired at {}, now is {}", claims.exp, now);
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
