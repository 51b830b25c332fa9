use gqlmirror::error::Result;
use gqlmirror::schema::{print_sdl, RemoteSchema};
use std::fs;

/// Run the pull command: introspect an endpoint and save its SDL
pub async fn run(url: String, headers: Vec<String>, output: Option<String>) -> Result<()> {
    let headers = super::parse_headers(&headers)?;

    tracing::info!("🔍 Introspecting {}...", url);
    let schema = RemoteSchema::new(url)?.with_headers(headers).fetch().await?;
    let sdl = print_sdl(&schema);

    if let Some(output_path) = output {
        fs::write(&output_path, &sdl)?;
        tracing::info!("📝 Saved schema with {} types to {}", schema.types.len(), output_path);
    } else {
        print!("{}", sdl);
    }

    Ok(())
}
