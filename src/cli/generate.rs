use gqlmirror::check::check_outputs;
use gqlmirror::codegen::{generate_all, write_all};
use gqlmirror::documents::validate_documents;
use gqlmirror::error::{MirrorError, Result};

/// Run the generate command
///
/// With `check`, nothing is written; stale or missing outputs are an error.
pub async fn run(config_path: String, check: bool) -> Result<()> {
    let (config, schema, documents) = super::load_project(&config_path).await?;

    validate_documents(&schema, &documents)?;

    tracing::info!("🔧 Generating {} output(s)...", config.output.len());
    let files = generate_all(&config, &schema, &documents)?;

    if !check {
        write_all(&files)?;
        tracing::info!("✨ Generated {} file(s)", files.len());
        return Ok(());
    }

    let stale = check_outputs(&files)?;
    if stale.is_empty() {
        tracing::info!("✅ All {} output(s) are up to date", files.len());
        return Ok(());
    }

    for output in &stale {
        tracing::warn!("   • {}", output);
    }
    Err(MirrorError::Codegen(format!(
        "{} output(s) are out of date; run 'gqlmirror generate'",
        stale.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::fixture::write_project;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_check_fails_until_outputs_are_written() {
        let dir = TempDir::new().unwrap();
        let config = write_project(dir.path());

        let err = run(config.clone(), true).await.unwrap_err();
        assert!(matches!(err, MirrorError::Codegen(_)));
        assert!(err.to_string().contains("2 output(s) are out of date"));
        assert!(!dir.path().join("generated").exists());

        run(config.clone(), false).await.unwrap();
        run(config, true).await.unwrap();
        assert!(fs::read_to_string(dir.path().join("generated/graphql.rs"))
            .unwrap()
            .contains("pub mod get_student {"));
    }

    #[tokio::test]
    async fn test_check_fails_on_edited_output() {
        let dir = TempDir::new().unwrap();
        let config = write_project(dir.path());
        run(config.clone(), false).await.unwrap();

        let ts = dir.path().join("generated/graphql.ts");
        let edited = fs::read_to_string(&ts).unwrap().replace("yearGroup", "year_group");
        fs::write(&ts, edited).unwrap();

        let err = run(config, true).await.unwrap_err();
        assert!(err.to_string().contains("1 output(s) are out of date"));
    }
}
