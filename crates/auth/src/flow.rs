//! Login and token lifecycle orchestration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{
    browser,
    callback_server::CallbackServer,
    error::AuthError,
    pkce::{generate_pkce_challenge, generate_state},
    storage::TokenStore,
    types::{AuthRequest, CallbackParams, OauthToken, ProviderConfig},
    validate::TokenValidator,
};

/// Bounded wait for the browser redirect before a login attempt fails.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    code_verifier: &'a str,
    authorization_code: &'a str,
    challenge_id: i64,
    redirect_url: &'a str,
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    oauth_token: OauthToken,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

/// The provider-facing half of authentication: authorization URL building,
/// code exchange, refresh grants.
pub struct AuthFlow {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl AuthFlow {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Generate PKCE material and build the authorization URL. Pure; no
    /// network call.
    pub fn start(&self) -> Result<AuthRequest, AuthError> {
        let pkce = generate_pkce_challenge();
        let state = generate_state();

        let mut url = Url::parse(&self.config.auth_endpoint)
            .map_err(|e| AuthError::Config(format!("invalid auth endpoint: {e}")))?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.config.api_key)
            .append_pair("redirect_url", &self.config.redirect_url())
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce.challenge)
            .append_pair("type", "EMAIL")
            .append_pair("auth_method", "MAGIC_LINK");

        Ok(AuthRequest {
            url: url.into(),
            state,
            pkce,
        })
    }

    /// Exchange a one-time authorization code, bound to the PKCE verifier
    /// that started the flow, for a token triple.
    ///
    /// Authorization codes are single-use, so a failed exchange is never
    /// retried blindly.
    pub async fn exchange(
        &self,
        params: &CallbackParams,
        code_verifier: &str,
    ) -> Result<OauthToken, AuthError> {
        let redirect_url = self.config.redirect_url();
        let response = self
            .http
            .post(format!("{}/verify/get_identity", self.config.backend_endpoint))
            .query(&[("oauth_token", "true")])
            .header("API_KEY_ID", &self.config.api_key)
            .json(&TokenExchangeRequest {
                code_verifier,
                authorization_code: &params.code,
                challenge_id: params.challenge_id,
                redirect_url: &redirect_url,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ExchangeFailed {
                status: status.as_u16(),
            });
        }

        let body: TokenExchangeResponse = response
            .json()
            .await
            .map_err(AuthError::MalformedResponse)?;
        Ok(body.oauth_token)
    }

    /// Mint a new token triple from a stored refresh token.
    pub async fn refresh(&self, token: &OauthToken) -> Result<OauthToken, AuthError> {
        let response = self
            .http
            .post(format!("{}/{}", self.config.token_endpoint, self.config.api_key))
            .header("API_KEY_ID", &self.config.api_key)
            .json(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token: &token.refresh_token,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AuthError::InvalidRefreshToken);
        }
        if status.is_server_error() {
            return Err(AuthError::ProviderInternalError);
        }

        response.json().await.map_err(AuthError::MalformedResponse)
    }
}

/// Ties the flow, the credential store, and the validator together into the
/// two operations the rest of the CLI uses.
pub struct Authenticator {
    flow: AuthFlow,
    store: TokenStore,
    validator: TokenValidator,
}

impl Authenticator {
    pub fn new(config: ProviderConfig) -> Result<Self, AuthError> {
        let store = TokenStore::new()?;
        let validator = TokenValidator::new(config.jwks_endpoint.clone());
        Ok(Self::with_parts(AuthFlow::new(config), store, validator))
    }

    /// Assemble from explicit parts; the seam tests use to redirect storage
    /// and provider endpoints.
    pub fn with_parts(flow: AuthFlow, store: TokenStore, validator: TokenValidator) -> Self {
        Self {
            flow,
            store,
            validator,
        }
    }

    /// Full interactive round trip to the identity provider:
    /// PKCE → browser → redirect capture → code exchange → persist.
    ///
    /// Blocks until the redirect arrives, the bounded wait elapses, or the
    /// user hits Ctrl-C.
    pub async fn login(&self) -> Result<OauthToken, AuthError> {
        let request = self.flow.start()?;

        println!("{}", request.url);
        if browser::open_in_browser(&request.url) {
            info!("waiting for the login to finish in the browser");
        } else {
            println!("Could not open a browser. Please visit the URL above to log in.");
        }

        let params =
            CallbackServer::wait_for_redirect(self.flow.config().callback_port, LOGIN_TIMEOUT)
                .await?;

        let token = self.flow.exchange(&params, &request.pkce.verifier).await?;
        self.store.save(&token)?;
        info!("login complete, credential persisted");
        Ok(token)
    }

    /// Return a usable token, refreshing and re-persisting it if the stored
    /// access token no longer validates.
    ///
    /// The stored credential is read, never mutated in place; a successful
    /// refresh fully replaces it.
    pub async fn get_token(&self) -> Result<OauthToken, AuthError> {
        let token = self.store.load()?;

        if self.validator.is_valid(&token).await {
            return Ok(token);
        }

        debug!("stored access token is expired or invalid, refreshing");
        let refreshed = self.flow.refresh(&token).await?;
        self.store.save(&refreshed)?;
        Ok(refreshed)
    }

    /// Delete the persisted credential.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear()
    }
}
