use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

/// Lifetime of a mock session token.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims
///
/// Payload signed into every token the mock backend issues at login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (sub): the numeric id of the user the token was issued to.
    pub sub: i64,
    /// Role code at issue time (`ADMIN`, `USER`, ...).
    pub role: String,
    pub username: String,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// TokenCodec
///
/// Issues and verifies the HS256 tokens handed out by the mock login endpoint.
/// Shared by the fixture handlers through the mock database.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// issue
    ///
    /// Signs a token for the given user, valid for 24 hours.
    pub fn issue(&self, user_id: i64, username: &str, role: &str) -> Option<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            username: username.to_string(),
            exp: (now + TOKEN_TTL_SECS) as usize,
            iat: now as usize,
        };

        match encode(&Header::default(), &claims, &self.encoding) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::error!("Failed to sign mock token: {}", e);
                None
            }
        }
    }

    /// verify
    ///
    /// Decodes a token and validates signature and expiry. Any failure yields `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("Rejected expired token"),
                    _ => tracing::debug!("Rejected malformed token: {}", e),
                }
                None
            }
        }
    }
}

/// BearerToken
///
/// Raw bearer credential of a mock server request, if any. The mock handlers decide what a
/// missing or invalid token means, so extraction itself never rejects.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(BearerToken(token))
    }
}
