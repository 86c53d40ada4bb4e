use serde::{Deserialize, Serialize};

/// Identity provider configuration.
///
/// Compile-time defaults point at the hosted provider; every field can be
/// overridden through a `STRATO_*` environment variable, which replaces the
/// build-time variable injection the platform used historically.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Public client key identifying this CLI to the provider.
    pub api_key: String,
    /// Authorization page the browser is sent to.
    pub auth_endpoint: String,
    /// Backend API base; the code exchange lives under it.
    pub backend_endpoint: String,
    /// Token API base; refresh grants are posted under it.
    pub token_endpoint: String,
    /// Published public signing keys for access-token verification.
    pub jwks_endpoint: String,
    /// Fixed local port the provider redirects back to.
    pub callback_port: u16,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: "unknown".into(),
            auth_endpoint: "https://id.strato.dev/app".into(),
            backend_endpoint: "https://id.strato.dev/api/v0".into(),
            token_endpoint: "https://id.strato.dev/api/v0/token".into(),
            jwks_endpoint: "https://id.strato.dev/api/v0/token/jwks".into(),
            callback_port: 8395,
        }
    }
}

impl ProviderConfig {
    /// Defaults with any `STRATO_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("STRATO_IDENTITY_API_KEY") {
            config.api_key = v;
        }
        if let Ok(v) = std::env::var("STRATO_AUTH_ENDPOINT") {
            config.auth_endpoint = v;
        }
        if let Ok(v) = std::env::var("STRATO_BACKEND_ENDPOINT") {
            config.backend_endpoint = v;
        }
        if let Ok(v) = std::env::var("STRATO_TOKEN_ENDPOINT") {
            config.token_endpoint = v;
        }
        if let Ok(v) = std::env::var("STRATO_JWKS_ENDPOINT") {
            config.jwks_endpoint = v;
        }
        if let Some(port) = std::env::var("STRATO_CALLBACK_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.callback_port = port;
        }
        config
    }

    /// Redirect target registered with the provider. Must match the port the
    /// local listener binds, exactly.
    pub fn redirect_url(&self) -> String {
        format!("http://localhost:{}", self.callback_port)
    }
}

/// The persisted identity credential.
///
/// Fully replaced on every successful exchange or refresh, never merged.
/// `expires_in` is advisory only; actual expiry is decided by the signed
/// `exp` claim inside `access_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OauthToken {
    pub access_token: String,
    pub auth_method: String,
    pub expires_in: i64,
    pub id_token: String,
    pub refresh_token: String,
}

/// PKCE verifier/challenge pair. In-memory only, consumed by exactly one
/// code exchange.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: String,
    pub challenge: String,
}

/// Everything a login attempt needs before the browser round trip.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub url: String,
    pub state: String,
    pub pkce: PkceChallenge,
}

/// Parameters captured from the provider redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub challenge_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_token_serde_field_names() {
        let token = OauthToken {
            access_token: "a".into(),
            auth_method: "MAGIC_LINK".into(),
            expires_in: 3600,
            id_token: "i".into(),
            refresh_token: "r".into(),
        };

        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["auth_method"], "MAGIC_LINK");
        assert_eq!(json["expires_in"], 3600);
        assert_eq!(json["id_token"], "i");
        assert_eq!(json["refresh_token"], "r");

        let back: OauthToken = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_redirect_url_uses_callback_port() {
        let config = ProviderConfig {
            callback_port: 8395,
            ..ProviderConfig::default()
        };
        assert_eq!(config.redirect_url(), "http://localhost:8395");
    }
}
