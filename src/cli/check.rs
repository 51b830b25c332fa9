use gqlmirror::check::{diff_schemas, roundtrip_all};
use gqlmirror::documents::document_problems;
use gqlmirror::error::{MirrorError, Result};
use gqlmirror::mock::MockSchema;
use gqlmirror::schema::{load_sdl_file, RemoteSchema};

/// Run the check command: validation, mock round trip and optional drift
pub async fn run(config_path: String, against: Option<String>) -> Result<()> {
    let (config, schema, documents) = super::load_project(&config_path).await?;
    let mut failures = Vec::new();

    // 1. Operations against the schema
    let problems = document_problems(&schema, &documents);
    if problems.is_empty() {
        tracing::info!("✅ {} operation(s) valid", documents.operations.len());
    } else {
        for problem in &problems {
            tracing::warn!("   • {}", problem);
        }
        failures.push(format!("{} document problem(s)", problems.len()));
    }

    // 2. Round trip through the mock; invalid documents would only repeat step 1
    if problems.is_empty() {
        let mock = MockSchema::build(&schema)?;
        let rejected = roundtrip_all(&mock, &schema, &documents).await;
        if rejected.is_empty() {
            tracing::info!("✅ Every operation round-tripped through the mock");
        } else {
            for failure in &rejected {
                tracing::warn!("   • {}", failure);
            }
            failures.push(format!("{} round trip failure(s)", rejected.len()));
        }
    }

    // 3. Drift against another schema
    if let Some(against) = against {
        let live = if against.starts_with("http://") || against.starts_with("https://") {
            tracing::info!("🔍 Introspecting {} for drift", against);
            RemoteSchema::new(against)?
                .with_headers(config.schema.headers.clone())
                .fetch()
                .await?
        } else {
            load_sdl_file(&against)?
        };

        let report = diff_schemas(&schema, &live);
        if report.is_clean() {
            tracing::info!("✅ No schema drift");
        } else {
            for line in report.to_string().lines() {
                tracing::warn!("   • {}", line);
            }
            failures.push(format!("{} schema change(s)", report.changes.len()));
        }
    }

    if failures.is_empty() {
        tracing::info!("🎯 All checks passed");
        Ok(())
    } else {
        Err(MirrorError::CheckFailed(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::fixture::{write_project, SCHEMA};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clean_project_passes() {
        let dir = TempDir::new().unwrap();
        let config = write_project(dir.path());
        let same = dir.path().join("schema.graphql").to_str().unwrap().to_string();

        run(config, Some(same)).await.unwrap();
    }

    #[tokio::test]
    async fn test_drift_fails_the_check() {
        let dir = TempDir::new().unwrap();
        let config = write_project(dir.path());
        let live = dir.path().join("live.graphql");
        fs::write(&live, SCHEMA.replace("  yearGroup: Int!\n", "")).unwrap();

        let err = run(config, Some(live.to_str().unwrap().to_string())).await.unwrap_err();
        match err {
            MirrorError::CheckFailed(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].contains("schema change"));
            }
            other => panic!("expected CheckFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_operation_fails_the_check() {
        let dir = TempDir::new().unwrap();
        let config = write_project(dir.path());
        fs::write(
            dir.path().join("operations/broken.graphql"),
            "query Broken { student(id: \"1\") { nickname } }\n",
        )
        .unwrap();

        let err = run(config, None).await.unwrap_err();
        assert!(matches!(err, MirrorError::CheckFailed(_)));
        assert!(err.to_string().contains("document problem"));
    }
}
