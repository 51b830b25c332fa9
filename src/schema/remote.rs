use crate::error::{MirrorError, Result};
use crate::schema::introspection::{IntrospectionResponse, INTROSPECTION_QUERY};
use crate::schema::model::SchemaModel;
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;

/// Client for fetching a live schema over GraphQL introspection.
///
/// # Example
///
/// ```no_run
/// use gqlmirror::schema::RemoteSchema;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let remote = RemoteSchema::new("https://api.example.com/graphql".to_string())?;
/// let schema = remote.fetch().await?;
/// # Ok(())
/// # }
/// ```
pub struct RemoteSchema {
    endpoint: String,
    headers: BTreeMap<String, String>,
    client: Client,
}

impl RemoteSchema {
    /// Create a new introspection client
    ///
    /// # Arguments
    ///
    /// * `endpoint` - GraphQL endpoint URL (e.g., "https://api.example.com/graphql")
    pub fn new(endpoint: String) -> Result<Self> {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(MirrorError::Config(format!(
                "Schema URL '{}' must be a valid URL (http:// or https://)",
                endpoint
            )));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            endpoint,
            headers: BTreeMap::new(),
            client,
        })
    }

    /// Add request headers (e.g., `Authorization`)
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Run the introspection query and convert the result
    ///
    /// # API Endpoint
    ///
    /// `POST {endpoint}` with body `{"query": INTROSPECTION_QUERY, "operationName": "IntrospectionQuery"}`
    pub async fn fetch(&self) -> Result<SchemaModel> {
        tracing::debug!("Introspecting {}", self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&serde_json::json!({
            "query": INTROSPECTION_QUERY,
            "operationName": "IntrospectionQuery",
        }));
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        self.handle_response_error(&response)?;

        let body: IntrospectionResponse = response
            .json()
            .await
            .map_err(|e| MirrorError::Introspection(format!("Failed to parse response: {}", e)))?;

        let introspection = body.into_schema()?;
        tracing::debug!("Received {} types from {}", introspection.types.len(), self.endpoint);

        SchemaModel::from_introspection(&introspection)
    }

    fn handle_response_error(&self, response: &reqwest::Response) -> Result<()> {
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MirrorError::Unauthorized(format!(
                "{} rejected the introspection request",
                self.endpoint
            ))),
            status => Err(MirrorError::Introspection(format!(
                "Introspection request failed with status {}",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode as HttpStatus;
    use axum::routing::post;
    use axum::Router;

    /// Serve `/graphql` answering every request with `status`
    async fn endpoint_with_status(status: HttpStatus) -> String {
        let app = Router::new().route("/graphql", post(move || async move { (status, "{}") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/graphql", addr)
    }

    #[test]
    fn test_remote_schema_creation() {
        let remote = RemoteSchema::new("https://school.example.com/graphql".to_string()).unwrap();
        assert_eq!(remote.endpoint, "https://school.example.com/graphql");
        assert!(remote.headers.is_empty());
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        assert!(RemoteSchema::new("school.example.com".to_string()).is_err());
    }

    #[test]
    fn test_with_headers() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer token".to_string());
        let remote = RemoteSchema::new("http://localhost:4000/graphql".to_string())
            .unwrap()
            .with_headers(headers);
        assert_eq!(remote.headers.get("Authorization").map(String::as_str), Some("Bearer token"));
    }

    #[tokio::test]
    async fn test_unauthorized_status_maps_to_unauthorized() {
        let endpoint = endpoint_with_status(HttpStatus::UNAUTHORIZED).await;
        let err = RemoteSchema::new(endpoint).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, MirrorError::Unauthorized(_)), "got {:?}", err);

        let endpoint = endpoint_with_status(HttpStatus::FORBIDDEN).await;
        let err = RemoteSchema::new(endpoint).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, MirrorError::Unauthorized(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_server_error_maps_to_introspection_error() {
        let endpoint = endpoint_with_status(HttpStatus::INTERNAL_SERVER_ERROR).await;
        let err = RemoteSchema::new(endpoint).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, MirrorError::Introspection(_)), "got {:?}", err);
        assert!(err.to_string().contains("500"));
    }
}
