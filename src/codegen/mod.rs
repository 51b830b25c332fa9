/// Typed client generation
///
/// A [`Generator`] turns a validated schema plus document set into the text of
/// one output file. Generators are pure: the same inputs always yield the same
/// bytes, which is what `generate --check` relies on.

pub mod naming;
pub mod rust;
pub mod selection;
pub mod typescript;

pub use rust::RustGenerator;
pub use typescript::TypeScriptGenerator;

use crate::config::{MirrorConfig, OutputConfig};
use crate::documents::DocumentSet;
use crate::error::{MirrorError, Result};
use crate::schema::{ScalarTable, SchemaModel, TypeDefKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// First line of every generated file
pub const GENERATED_HEADER: &str = "Generated by gqlmirror. Do not edit by hand.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    TypeScript,
    Rust,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::TypeScript => write!(f, "typescript"),
            Target::Rust => write!(f, "rust"),
        }
    }
}

/// Everything a generator reads
pub struct CodegenContext<'a> {
    pub schema: &'a SchemaModel,
    pub documents: &'a DocumentSet,
    pub scalars: ScalarTable,
}

impl<'a> CodegenContext<'a> {
    pub fn new(
        schema: &'a SchemaModel,
        documents: &'a DocumentSet,
        target: Target,
        overrides: &BTreeMap<String, String>,
    ) -> Self {
        let scalar_names = schema
            .types
            .values()
            .filter(|t| matches!(t.kind, TypeDefKind::Scalar))
            .map(|t| t.name.as_str());
        Self {
            schema,
            documents,
            scalars: ScalarTable::resolve(target, scalar_names, overrides),
        }
    }
}

pub trait Generator {
    fn generate(&self, ctx: &CodegenContext) -> Result<String>;
}

/// Generator configured for one `[[output]]` entry
pub fn generator_for(output: &OutputConfig) -> Box<dyn Generator> {
    match output.target {
        Target::TypeScript => Box::new(TypeScriptGenerator {
            enums_as_types: output.enums_as_types,
            avoid_optionals: output.avoid_optionals,
        }),
        Target::Rust => Box::new(RustGenerator),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub target: Target,
    pub contents: String,
}

/// Generate every configured output in memory
pub fn generate_all(config: &MirrorConfig, schema: &SchemaModel, documents: &DocumentSet) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::with_capacity(config.output.len());

    for output in &config.output {
        let generator = generator_for(output);
        let ctx = CodegenContext::new(schema, documents, output.target, config.scalars.for_target(output.target));
        let contents = generator.generate(&ctx)?;

        tracing::debug!("Generated {} bytes of {} for {}", contents.len(), output.target, output.path);
        files.push(GeneratedFile {
            path: PathBuf::from(&output.path),
            target: output.target,
            contents,
        });
    }

    Ok(files)
}

/// Write generated files, creating parent directories as needed
pub fn write_all(files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        write_file(&file.path, &file.contents)?;
        tracing::info!("📝 Wrote {} ({})", file.path.display(), file.target);
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            MirrorError::Codegen(format!("Failed to create directory '{}': {}", parent.display(), e))
        })?;
    }
    fs::write(path, contents)
        .map_err(|e| MirrorError::Codegen(format!("Failed to write '{}': {}", path.display(), e)))
}

/// Render a description and deprecation reason as comment lines
///
/// Returns the lines without comment markers; each target wraps them in its
/// own doc comment syntax.
pub(crate) fn doc_lines(description: Option<&str>, deprecation: Option<&str>, deprecated_tag: &str) -> Vec<String> {
    let mut lines: Vec<String> = description
        .map(|d| d.lines().map(|l| l.trim_end().to_string()).collect())
        .unwrap_or_default();
    if let Some(reason) = deprecation {
        lines.push(format!("{} {}", deprecated_tag, reason).trim_end().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_serde_names() {
        let target: Target = serde_json::from_str("\"typescript\"").unwrap();
        assert_eq!(target, Target::TypeScript);
        assert_eq!(serde_json::to_string(&Target::Rust).unwrap(), "\"rust\"");
        assert_eq!(Target::TypeScript.to_string(), "typescript");
    }

    #[test]
    fn test_doc_lines() {
        assert!(doc_lines(None, None, "@deprecated").is_empty());
        assert_eq!(
            doc_lines(Some("Line one\nLine two"), Some("Use other"), "@deprecated"),
            vec!["Line one", "Line two", "@deprecated Use other"]
        );
    }
}
