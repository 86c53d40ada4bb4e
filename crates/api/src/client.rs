use serde::{Serialize, de::DeserializeOwned};
use strato_auth::OauthToken;
use tracing::debug;

/// Production API base. Overridable via `STRATO_API_ENDPOINT`.
pub const DEFAULT_API_ENDPOINT: &str = "https://app.strato.dev";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("platform returned status {status} for {resource}")]
    Status { status: u16, resource: String },

    #[error("malformed response for {resource}")]
    Decode {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Authenticated client for the platform's `/_api/` surface.
///
/// Holds the bearer access token for the lifetime of one command; tokens are
/// never refreshed here — callers obtain a valid one up front.
pub struct ApiClient {
    http: reqwest::Client,
    base_endpoint: String,
    access_token: String,
}

impl ApiClient {
    pub fn new(base_endpoint: String, token: &OauthToken) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_endpoint,
            access_token: token.access_token.clone(),
        }
    }

    /// Client for the default endpoint, honoring `STRATO_API_ENDPOINT`.
    pub fn from_env(token: &OauthToken) -> Self {
        let base = std::env::var("STRATO_API_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_API_ENDPOINT.to_string());
        Self::new(base, token)
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/_api/{}", self.base_endpoint, resource)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.resource_url(resource))
            .query(&[("utm_source", "cli")])
            .query(query)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::decode(resource, response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .post(self.resource_url(resource))
            .query(&[("utm_source", "cli")])
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        Self::decode(resource, response).await
    }

    pub(crate) async fn put_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .put(self.resource_url(resource))
            .query(&[("utm_source", "cli")])
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        Self::decode(resource, response).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(
        &self,
        resource: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .delete(self.resource_url(resource))
            .query(&[("utm_source", "cli")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::decode(resource, response).await
    }

    async fn decode<T: DeserializeOwned>(
        resource: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        debug!(resource, status = status.as_u16(), "platform response");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                resource: resource.to_string(),
            });
        }

        response.json().await.map_err(|source| ApiError::Decode {
            resource: resource.to_string(),
            source,
        })
    }
}
