/// Scalar mapping table
///
/// Each GraphQL scalar resolves to exactly one host type per target. The table
/// is built once per generation run from the defaults below plus any
/// configured overrides and is never consulted for anything else.

use crate::codegen::Target;
use std::collections::BTreeMap;

/// Host type used for custom scalars the table does not know
pub fn fallback(target: Target) -> &'static str {
    match target {
        Target::TypeScript => "any",
        Target::Rust => "serde_json::Value",
    }
}

/// Default mapping for built-in and well-known custom scalars
///
/// Date and time scalars stay strings on both targets: parsing them is the
/// caller's business.
pub fn default_mapping(target: Target, scalar: &str) -> Option<&'static str> {
    let mapped = match (target, scalar) {
        (Target::TypeScript, "ID" | "String" | "Date" | "DateTime" | "Time") => "string",
        (Target::TypeScript, "Boolean") => "boolean",
        (Target::TypeScript, "Int" | "Float" | "Long" | "BigDecimal") => "number",
        (Target::TypeScript, "Object") => "any",

        (Target::Rust, "ID" | "String" | "Date" | "DateTime" | "Time") => "String",
        (Target::Rust, "Boolean") => "bool",
        (Target::Rust, "Int") => "i32",
        (Target::Rust, "Float" | "BigDecimal") => "f64",
        (Target::Rust, "Long") => "i64",
        (Target::Rust, "Object") => "serde_json::Value",

        _ => return None,
    };
    Some(mapped)
}

/// Resolved scalar table for one target
#[derive(Debug, Clone)]
pub struct ScalarTable {
    target: Target,
    entries: BTreeMap<String, String>,
}

impl ScalarTable {
    /// Build the table for every scalar in `scalars`
    ///
    /// Overrides win over defaults; scalars with neither get the target's
    /// fallback type and a warning.
    pub fn resolve<'a>(
        target: Target,
        scalars: impl IntoIterator<Item = &'a str>,
        overrides: &BTreeMap<String, String>,
    ) -> Self {
        let mut entries = BTreeMap::new();
        for scalar in scalars {
            let host = match overrides.get(scalar) {
                Some(host) => host.clone(),
                None => match default_mapping(target, scalar) {
                    Some(host) => host.to_string(),
                    None => {
                        tracing::warn!(
                            "No {} mapping for custom scalar '{}', using '{}'",
                            target,
                            scalar,
                            fallback(target)
                        );
                        fallback(target).to_string()
                    }
                },
            };
            entries.insert(scalar.to_string(), host);
        }
        Self { target, entries }
    }

    /// Host type for a scalar; unknown names map to the fallback
    pub fn get(&self, scalar: &str) -> &str {
        self.entries
            .get(scalar)
            .map(String::as_str)
            .unwrap_or_else(|| fallback(self.target))
    }
}

/// Scalars whose TypeScript `number` mapping can silently lose precision
pub fn is_lossy_number(scalar: &str, host: &str) -> bool {
    host == "number" && matches!(scalar, "Long" | "BigDecimal")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typescript_defaults() {
        assert_eq!(default_mapping(Target::TypeScript, "Long"), Some("number"));
        assert_eq!(default_mapping(Target::TypeScript, "DateTime"), Some("string"));
        assert_eq!(default_mapping(Target::TypeScript, "Boolean"), Some("boolean"));
        assert_eq!(default_mapping(Target::TypeScript, "Upload"), None);
    }

    #[test]
    fn test_rust_defaults() {
        assert_eq!(default_mapping(Target::Rust, "Long"), Some("i64"));
        assert_eq!(default_mapping(Target::Rust, "Int"), Some("i32"));
        assert_eq!(default_mapping(Target::Rust, "Object"), Some("serde_json::Value"));
    }

    #[test]
    fn test_override_wins() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Long".to_string(), "string".to_string());
        let table = ScalarTable::resolve(Target::TypeScript, ["Long", "Int"], &overrides);
        assert_eq!(table.get("Long"), "string");
        assert_eq!(table.get("Int"), "number");
    }

    #[test]
    fn test_unknown_scalar_falls_back() {
        let table = ScalarTable::resolve(Target::Rust, ["Upload"], &BTreeMap::new());
        assert_eq!(table.get("Upload"), "serde_json::Value");
        assert_eq!(table.get("NeverSeen"), "serde_json::Value");
    }

    #[test]
    fn test_lossy_numbers() {
        assert!(is_lossy_number("Long", "number"));
        assert!(!is_lossy_number("Long", "string"));
        assert!(!is_lossy_number("Int", "number"));
    }
}
