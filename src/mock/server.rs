use super::MockSchema;
use crate::error::{MirrorError, Result};
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

/// HTTP routes for the mock: `/graphql` (POST queries, GET playground) and `/health`
pub fn router(mock: MockSchema) -> Router {
    Router::new()
        .route("/graphql", get(graphql_playground).post(graphql_handler))
        .route("/health", get(health_check))
        .with_state(mock)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped
pub async fn serve(mock: MockSchema, bind: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| MirrorError::Config(format!("Invalid bind address '{}:{}': {}", bind, port, e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        MirrorError::Server(format!("Failed to bind to {}: {}. Port may be in use.", addr, e))
    })?;

    tracing::info!("🚀 Mock GraphQL server running on http://{}", addr);
    tracing::info!("📊 Playground: http://{}/graphql", addr);

    axum::serve(listener, router(mock))
        .await
        .map_err(|e| MirrorError::Server(format!("Server error: {}", e)))
}

async fn graphql_handler(State(mock): State<MockSchema>, request: GraphQLRequest) -> GraphQLResponse {
    mock.schema().execute(request.into_inner()).await.into()
}

async fn graphql_playground() -> Html<String> {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_sdl;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let model = load_sdl("enum Gender { FEMALE MALE } type Query { gender: Gender! }").unwrap();
        router(MockSchema::build(&model).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_post_query() {
        let request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"query":"query G { gender }","operationName":"G"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["gender"], "FEMALE");
    }

    #[tokio::test]
    async fn test_playground() {
        let response = app()
            .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
