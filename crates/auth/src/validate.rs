//! Access-token validation against the provider's published keys.

use std::{
    str::FromStr,
    time::{Duration, Instant},
};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header, jwk::JwkSet};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::types::OauthToken;

/// How long a fetched key set is trusted before re-fetching. The provider
/// does not advertise a key lifetime, so a conservative fixed TTL is used.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct Claims {
    #[allow(dead_code)]
    exp: i64,
}

/// Verifies the access token's signature and expiry.
///
/// No claim is trusted before the signature checks out against the JWKS.
pub struct TokenValidator {
    jwks_endpoint: String,
    http: reqwest::Client,
    cache: Mutex<Option<(JwkSet, Instant)>>,
}

impl TokenValidator {
    pub fn new(jwks_endpoint: String) -> Self {
        Self {
            jwks_endpoint,
            http: reqwest::Client::new(),
            cache: Mutex::new(None),
        }
    }

    /// Closed boolean: any parse, fetch, signature, or expiry failure simply
    /// means "not valid" — there is no partial validity.
    pub async fn is_valid(&self, token: &OauthToken) -> bool {
        match self.check(&token.access_token).await {
            Ok(()) => true,
            Err(e) => {
                debug!("access token rejected: {e:#}");
                false
            },
        }
    }

    async fn check(&self, access_token: &str) -> anyhow::Result<()> {
        let header = decode_header(access_token)?;
        let jwks = self.keys().await?;

        let jwk = match &header.kid {
            Some(kid) => jwks
                .find(kid)
                .ok_or_else(|| anyhow::anyhow!("no key with kid {kid} in the provider JWKS"))?,
            None => jwks
                .keys
                .first()
                .ok_or_else(|| anyhow::anyhow!("provider JWKS is empty"))?,
        };

        let key = DecodingKey::from_jwk(jwk)?;

        // The verification algorithm is the one the provider's key
        // advertises; the unverified token header only fills in when the key
        // does not name one.
        let alg = match jwk.common.key_algorithm {
            Some(key_alg) => Algorithm::from_str(&key_alg.to_string())?,
            None => header.alg,
        };
        let mut validation = Validation::new(alg);
        validation.validate_aud = false;

        // Verifies the signature and the `exp` claim in one pass.
        decode::<Claims>(access_token, &key, &validation)?;
        Ok(())
    }

    /// The provider key set, re-fetched once the cached copy ages out.
    async fn keys(&self) -> anyhow::Result<JwkSet> {
        let mut cache = self.cache.lock().await;
        if let Some((jwks, fetched_at)) = cache.as_ref()
            && fetched_at.elapsed() < JWKS_CACHE_TTL
        {
            return Ok(jwks.clone());
        }

        let jwks: JwkSet = self
            .http
            .get(&self.jwks_endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(keys = jwks.keys.len(), "fetched provider JWKS");

        *cache = Some((jwks.clone(), Instant::now()));
        Ok(jwks)
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    use super::*;

    const SECRET: &[u8] = b"unit-test-signing-secret";

    fn jwks_body(secret: &[u8]) -> String {
        serde_json::json!({
            "keys": [{
                "kty": "oct",
                "kid": "test-key",
                "alg": "HS256",
                "k": URL_SAFE_NO_PAD.encode(secret),
            }]
        })
        .to_string()
    }

    fn signed_token(exp: i64, secret: &[u8]) -> OauthToken {
        let header = Header {
            kid: Some("test-key".into()),
            ..Header::new(Algorithm::HS256)
        };
        let claims = serde_json::json!({ "exp": exp, "sub": "user-1" });
        let access_token =
            encode(&header, &claims, &EncodingKey::from_secret(secret)).unwrap();

        OauthToken {
            access_token,
            auth_method: "MAGIC_LINK".into(),
            expires_in: 3600,
            id_token: "id".into(),
            refresh_token: "refresh".into(),
        }
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    #[tokio::test]
    async fn test_unexpired_token_with_good_signature_is_valid() {
        let mut server = mockito::Server::new_async().await;
        let jwks = server
            .mock("GET", "/jwks")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(jwks_body(SECRET))
            .create_async()
            .await;

        let validator = TokenValidator::new(format!("{}/jwks", server.url()));
        assert!(validator.is_valid(&signed_token(now() + 3600, SECRET)).await);
        jwks.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jwks")
            .with_status(200)
            .with_body(jwks_body(SECRET))
            .create_async()
            .await;

        let validator = TokenValidator::new(format!("{}/jwks", server.url()));
        assert!(!validator.is_valid(&signed_token(now() - 3600, SECRET)).await);
    }

    #[tokio::test]
    async fn test_tampered_signature_is_invalid_even_if_unexpired() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jwks")
            .with_status(200)
            .with_body(jwks_body(SECRET))
            .create_async()
            .await;

        let validator = TokenValidator::new(format!("{}/jwks", server.url()));
        let forged = signed_token(now() + 3600, b"some-other-secret");
        assert!(!validator.is_valid(&forged).await);
    }

    #[tokio::test]
    async fn test_header_algorithm_cannot_override_provider_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jwks")
            .with_status(200)
            .with_body(jwks_body(SECRET))
            .create_async()
            .await;

        // The provider key advertises HS256; a token claiming HS384 in its
        // own header must not be verified under HS384.
        let header = Header {
            kid: Some("test-key".into()),
            ..Header::new(Algorithm::HS384)
        };
        let claims = serde_json::json!({ "exp": now() + 3600, "sub": "user-1" });
        let mut token = signed_token(now() + 3600, SECRET);
        token.access_token =
            encode(&header, &claims, &EncodingKey::from_secret(SECRET)).unwrap();

        let validator = TokenValidator::new(format!("{}/jwks", server.url()));
        assert!(!validator.is_valid(&token).await);
    }

    #[tokio::test]
    async fn test_unparseable_token_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jwks")
            .with_status(200)
            .with_body(jwks_body(SECRET))
            .create_async()
            .await;

        let validator = TokenValidator::new(format!("{}/jwks", server.url()));
        let mut token = signed_token(now() + 3600, SECRET);
        token.access_token = "not-a-jwt".into();
        assert!(!validator.is_valid(&token).await);
    }

    #[tokio::test]
    async fn test_jwks_fetch_failure_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/jwks")
            .with_status(502)
            .create_async()
            .await;

        let validator = TokenValidator::new(format!("{}/jwks", server.url()));
        assert!(!validator.is_valid(&signed_token(now() + 3600, SECRET)).await);
    }

    #[tokio::test]
    async fn test_jwks_is_cached_across_checks() {
        let mut server = mockito::Server::new_async().await;
        let jwks = server
            .mock("GET", "/jwks")
            .with_status(200)
            .with_body(jwks_body(SECRET))
            .expect(1)
            .create_async()
            .await;

        let validator = TokenValidator::new(format!("{}/jwks", server.url()));
        let token = signed_token(now() + 3600, SECRET);
        assert!(validator.is_valid(&token).await);
        assert!(validator.is_valid(&token).await);
        jwks.assert_async().await;
    }
}
