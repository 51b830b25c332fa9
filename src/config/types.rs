use crate::codegen::naming::is_graphql_name;
use crate::codegen::Target;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Files or directories holding `.graphql` operation documents
    #[serde(default)]
    pub documents: Vec<String>,

    pub schema: SchemaSource,

    /// Per-target host types for scalars, overriding the defaults
    #[serde(default)]
    pub scalars: ScalarOverrides,

    pub output: Vec<OutputConfig>,

    /// Mock server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the schema comes from: a local SDL file or a live endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Extra HTTP headers sent with the introspection query
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalarOverrides {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub typescript: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rust: BTreeMap<String, String>,
}

impl ScalarOverrides {
    pub fn for_target(&self, target: Target) -> &BTreeMap<String, String> {
        match target {
            Target::TypeScript => &self.typescript,
            Target::Rust => &self.rust,
        }
    }
}

/// One generated file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,

    pub target: Target,

    /// TypeScript only: string-literal unions instead of `enum`
    #[serde(default)]
    pub enums_as_types: bool,

    /// TypeScript only: nullable fields are required keys
    #[serde(default)]
    pub avoid_optionals: bool,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the mock server to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface to bind the mock server to
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

fn default_port() -> u16 {
    4000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl MirrorConfig {
    /// Starter configuration written by `init`
    pub fn example() -> Self {
        Self {
            documents: vec!["graphql/operations".to_string()],
            schema: SchemaSource {
                path: Some("graphql/schema.graphql".to_string()),
                url: None,
                headers: BTreeMap::new(),
            },
            scalars: ScalarOverrides::default(),
            output: vec![
                OutputConfig {
                    path: "generated/graphql.ts".to_string(),
                    target: Target::TypeScript,
                    enums_as_types: false,
                    avoid_optionals: false,
                },
                OutputConfig {
                    path: "generated/graphql.rs".to_string(),
                    target: Target::Rust,
                    enums_as_types: false,
                    avoid_optionals: false,
                },
            ],
            server: ServerConfig::default(),
        }
    }

    /// Validate the configuration, reporting every problem at once
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        match (&self.schema.path, &self.schema.url) {
            (Some(_), Some(_)) => problems.push("schema: set either 'path' or 'url', not both".to_string()),
            (None, None) => problems.push("schema: one of 'path' or 'url' is required".to_string()),
            (None, Some(url)) if !url.starts_with("http://") && !url.starts_with("https://") => {
                problems.push(format!("schema: url '{}' must start with http:// or https://", url));
            }
            _ => {}
        }
        if self.schema.path.is_some() && !self.schema.headers.is_empty() {
            problems.push("schema: headers only apply to 'url'".to_string());
        }

        if self.output.is_empty() {
            problems.push("at least one [[output]] is required".to_string());
        }
        let mut paths = HashSet::new();
        for output in &self.output {
            if output.path.trim().is_empty() {
                problems.push("output: path must not be empty".to_string());
            } else if !paths.insert(output.path.as_str()) {
                problems.push(format!("output: path '{}' is listed more than once", output.path));
            }
            if output.target == Target::Rust && (output.enums_as_types || output.avoid_optionals) {
                problems.push(format!(
                    "output '{}': enums_as_types and avoid_optionals only apply to typescript",
                    output.path
                ));
            }
        }

        for (target, overrides) in [
            (Target::TypeScript, &self.scalars.typescript),
            (Target::Rust, &self.scalars.rust),
        ] {
            for (scalar, host) in overrides {
                if !is_graphql_name(scalar) {
                    problems.push(format!("scalars.{}: '{}' is not a valid GraphQL name", target, scalar));
                }
                if host.trim().is_empty() {
                    problems.push(format!("scalars.{}: '{}' maps to an empty type", target, scalar));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_is_valid() {
        assert!(MirrorConfig::example().validate().is_ok());
    }

    #[test]
    fn test_schema_source_must_be_exclusive() {
        let mut config = MirrorConfig::example();
        config.schema.url = Some("https://api.example.com/graphql".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.contains("not both"));

        config.schema.path = None;
        assert!(config.validate().is_ok());

        config.schema.url = None;
        assert!(config.validate().unwrap_err().contains("is required"));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = MirrorConfig::example();
        config.schema.path = None;
        config.schema.url = Some("api.example.com".to_string());
        assert!(config.validate().unwrap_err().contains("must start with http"));
    }

    #[test]
    fn test_duplicate_output_paths() {
        let mut config = MirrorConfig::example();
        config.output[1].path = config.output[0].path.clone();
        config.output[1].target = Target::TypeScript;
        assert!(config.validate().unwrap_err().contains("more than once"));
    }

    #[test]
    fn test_scalar_override_names() {
        let mut config = MirrorConfig::example();
        config.scalars.rust.insert("Big-Decimal".to_string(), "f64".to_string());
        assert!(config.validate().unwrap_err().contains("not a valid GraphQL name"));
    }

    #[test]
    fn test_all_problems_reported() {
        let mut config = MirrorConfig::example();
        config.schema.path = None;
        config.output.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.lines().count(), 2);
    }
}
