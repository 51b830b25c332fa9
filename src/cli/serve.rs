use gqlmirror::error::Result;
use gqlmirror::mock::{self, MockSchema};

/// Run the serve command to start the mock GraphQL server
pub async fn run(config_path: String, port: Option<u16>) -> Result<()> {
    tracing::info!("📖 Loading configuration from {}", config_path);
    let config = gqlmirror::config::load_config(&config_path)?;

    // Use provided port or default from config
    let server_port = port.unwrap_or(config.server.port);

    let schema = super::load_schema(&config.schema).await?;

    tracing::info!("🔧 Building mock schema for {} types...", schema.types.len());
    let mock = MockSchema::build(&schema)?;
    tracing::info!("✅ Schema built successfully");
    tracing::info!("💡 Press Ctrl+C to stop the server");

    mock::serve(mock, &config.server.bind, server_port).await
}
