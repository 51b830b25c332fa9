pub mod check;
pub mod generate;
pub mod init;
pub mod pull;
pub mod serve;

use gqlmirror::config::{MirrorConfig, SchemaSource};
use gqlmirror::documents::DocumentSet;
use gqlmirror::error::{MirrorError, Result};
use gqlmirror::schema::{load_sdl_file, RemoteSchema, SchemaModel};
use std::collections::BTreeMap;

/// Load the schema from whichever source the config names
pub async fn load_schema(source: &SchemaSource) -> Result<SchemaModel> {
    match (&source.path, &source.url) {
        (Some(path), _) => {
            tracing::info!("📖 Reading schema from {}", path);
            load_sdl_file(path)
        }
        (None, Some(url)) => {
            tracing::info!("🔍 Introspecting schema at {}", url);
            RemoteSchema::new(url.clone())?
                .with_headers(source.headers.clone())
                .fetch()
                .await
        }
        (None, None) => Err(MirrorError::Config("schema: one of 'path' or 'url' is required".to_string())),
    }
}

/// Load the config, its schema and its operation documents
pub async fn load_project(config_path: &str) -> Result<(MirrorConfig, SchemaModel, DocumentSet)> {
    tracing::info!("📖 Loading configuration from {}", config_path);
    let config = gqlmirror::config::load_config(config_path)?;

    let schema = load_schema(&config.schema).await?;
    let documents = DocumentSet::load(&config.documents)?;

    tracing::info!(
        "✅ Schema has {} types; {} operations and {} fragments loaded",
        schema.types.len(),
        documents.operations.len(),
        documents.fragments.len()
    );

    Ok((config, schema, documents))
}

/// Parse repeated `--header Name=Value` arguments
pub fn parse_headers(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|header| {
            let (name, value) = header
                .split_once('=')
                .ok_or_else(|| MirrorError::Config(format!("Header '{}' must have the form Name=Value", header)))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(MirrorError::Config(format!("Header '{}' has an empty name", header)));
            }
            Ok((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// A small on-disk project for exercising the commands
#[cfg(test)]
pub(crate) mod fixture {
    use std::fs;
    use std::path::Path;

    pub const SCHEMA: &str = r#"
type Student {
  id: ID!
  name: String
  yearGroup: Int!
}

type Query {
  student(id: ID!): Student
}
"#;

    /// Write schema, one operation and a config under `dir`; returns the config path
    pub fn write_project(dir: &Path) -> String {
        let operations = dir.join("operations");
        fs::create_dir_all(&operations).unwrap();
        fs::write(dir.join("schema.graphql"), SCHEMA).unwrap();
        fs::write(
            operations.join("student.graphql"),
            "query GetStudent($id: ID!) { student(id: $id) { id name yearGroup } }\n",
        )
        .unwrap();

        let root = dir.display();
        let config = format!(
            r#"documents = ['{root}/operations']

[schema]
path = '{root}/schema.graphql'

[[output]]
path = '{root}/generated/graphql.ts'
target = "typescript"

[[output]]
path = '{root}/generated/graphql.rs'
target = "rust"
"#
        );
        let config_path = dir.join("gqlmirror.toml");
        fs::write(&config_path, config).unwrap();
        config_path.to_str().unwrap().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&[
            "Authorization=Bearer abc=def".to_string(),
            " X-Tenant = school-42 ".to_string(),
        ])
        .unwrap();
        assert_eq!(headers["Authorization"], "Bearer abc=def");
        assert_eq!(headers["X-Tenant"], "school-42");

        assert!(parse_headers(&["Authorization".to_string()]).is_err());
        assert!(parse_headers(&["=value".to_string()]).is_err());
    }
}
