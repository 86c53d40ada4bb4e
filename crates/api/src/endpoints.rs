use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, ApiError};

/// Starter handler installed into a freshly created endpoint.
const STARTER_CODE: &str = "def get():
    return {\"response\": \"hi get\"}


def post():
    return {\"response\": \"hi post\"}
";

/// A remote endpoint record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub create_date: String,
    pub project_id: String,
    #[serde(default)]
    pub code: String,
}

/// Mutable endpoint fields for an update call.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateEndpointRequest {
    pub name: String,
    pub methods: Vec<String>,
    pub code: String,
}

#[derive(Serialize)]
struct CreateEndpointRequest<'a> {
    name: &'a str,
    methods: Vec<String>,
    code: &'a str,
    project_id: &'a str,
    uri: String,
}

#[derive(Deserialize)]
struct EndpointsEnvelope {
    endpoints: Vec<Endpoint>,
}

#[derive(Deserialize)]
struct EndpointEnvelope {
    endpoint: Endpoint,
}

#[derive(Debug, Deserialize)]
pub struct RemoveEndpointResponse {
    pub id: String,
    #[serde(default)]
    pub success: bool,
}

impl ApiClient {
    pub async fn list_endpoints(&self) -> Result<Vec<Endpoint>, ApiError> {
        let envelope: EndpointsEnvelope = self.get_json("_endpoint", &[]).await?;
        Ok(envelope.endpoints)
    }

    pub async fn create_endpoint(
        &self,
        name: &str,
        project_id: &str,
    ) -> Result<Endpoint, ApiError> {
        let envelope: EndpointEnvelope = self
            .post_json(
                "_endpoint",
                &CreateEndpointRequest {
                    name,
                    methods: Vec::new(),
                    code: STARTER_CODE,
                    project_id,
                    uri: format!("/{name}"),
                },
            )
            .await?;
        Ok(envelope.endpoint)
    }

    pub async fn update_endpoint(
        &self,
        endpoint_id: &str,
        request: &UpdateEndpointRequest,
    ) -> Result<Endpoint, ApiError> {
        let envelope: EndpointEnvelope = self
            .put_json(&format!("_endpoint/{endpoint_id}"), request)
            .await?;
        Ok(envelope.endpoint)
    }

    pub async fn remove_endpoint(
        &self,
        endpoint_id: &str,
    ) -> Result<RemoveEndpointResponse, ApiError> {
        self.delete_json(&format!("_endpoint/{endpoint_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use strato_auth::OauthToken;

    use super::*;

    fn client(server: &mockito::Server) -> ApiClient {
        ApiClient::new(
            server.url(),
            &OauthToken {
                access_token: "access".into(),
                auth_method: "MAGIC_LINK".into(),
                expires_in: 3600,
                id_token: "id".into(),
                refresh_token: "refresh".into(),
            },
        )
    }

    fn endpoint_json(id: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "methods": ["GET"],
            "uri": format!("/{name}"),
            "archived": false,
            "create_date": "2021-06-01",
            "project_id": "p1",
            "code": "def get():\n    return {}\n",
        })
    }

    #[tokio::test]
    async fn test_create_endpoint_seeds_starter_code() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/_api/_endpoint")
            .match_query(mockito::Matcher::Any)
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "name": "hello",
                "project_id": "p1",
                "uri": "/hello",
            })))
            .with_status(200)
            .with_body(serde_json::json!({"endpoint": endpoint_json("e1", "hello")}).to_string())
            .create_async()
            .await;

        let endpoint = client(&server).create_endpoint("hello", "p1").await.unwrap();
        assert_eq!(endpoint.id, "e1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_endpoint_puts_to_resource_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/_api/_endpoint/e1")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(serde_json::json!({"endpoint": endpoint_json("e1", "renamed")}).to_string())
            .create_async()
            .await;

        let endpoint = client(&server)
            .update_endpoint(
                "e1",
                &UpdateEndpointRequest {
                    name: "renamed".into(),
                    methods: vec!["GET".into()],
                    code: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(endpoint.name, "renamed");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remove_endpoint_deletes_resource() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/_api/_endpoint/e1")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": "e1", "success": true}"#)
            .create_async()
            .await;

        let response = client(&server).remove_endpoint("e1").await.unwrap();
        assert!(response.success);
        assert_eq!(response.id, "e1");
    }
}
