use gqlmirror::config::{save_config, MirrorConfig};
use gqlmirror::error::{MirrorError, Result};
use std::path::Path;

/// Run the init command: write a starter configuration
///
/// An existing file is only replaced with `force`.
pub async fn run(output: Option<String>, force: bool) -> Result<()> {
    let config = MirrorConfig::example();

    if let Some(output_path) = output {
        if Path::new(&output_path).exists() && !force {
            return Err(MirrorError::Config(format!(
                "'{}' already exists; pass --force to overwrite it",
                output_path
            )));
        }
        save_config(&config, &output_path)?;
        tracing::info!("📝 Generated example configuration: {}", output_path);
        tracing::info!("");
        tracing::info!("💡 Next steps:");
        tracing::info!("   1. Point [schema] at your SDL file or endpoint");
        tracing::info!("   2. Put your .graphql operations under {}", config.documents.join(", "));
        tracing::info!("   3. Run 'gqlmirror generate --config {}'", output_path);
    } else {
        let toml_string = toml::to_string_pretty(&config)?;
        println!("{}", toml_string);
        tracing::info!("💡 Tip: Add --output <file> to save to a file instead of stdout");
    }

    Ok(())
}
