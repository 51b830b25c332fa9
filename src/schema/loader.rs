/// SDL to `SchemaModel` conversion
///
/// Parsing is delegated to the async-graphql parser; this module only maps
/// its service document onto the model, merging `extend` definitions into
/// the type they extend.

use crate::error::{MirrorError, Result};
use crate::schema::model::{
    EnumValueDef, FieldDef, InputValueDef, ObjectDef, SchemaModel, TypeDef, TypeDefKind, TypeRef,
};

use async_graphql_parser::types::{
    ConstDirective, FieldDefinition, InputValueDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql_parser::Positioned;
use async_graphql_value::ConstValue;
use std::path::Path;

/// Parse SDL text into a validated schema model
pub fn load_sdl(source: &str) -> Result<SchemaModel> {
    let document = async_graphql_parser::parse_schema(source)
        .map_err(|e| MirrorError::SchemaParse(e.to_string()))?;

    let mut schema = SchemaModel::new();
    let mut explicit_roots = false;

    for definition in document.definitions {
        match definition {
            TypeSystemDefinition::Schema(def) => {
                let def = def.node;
                explicit_roots = true;
                if let Some(query) = def.query {
                    schema.query_type = query.node.to_string();
                }
                if let Some(mutation) = def.mutation {
                    schema.mutation_type = Some(mutation.node.to_string());
                }
                if let Some(subscription) = def.subscription {
                    schema.subscription_type = Some(subscription.node.to_string());
                }
            }
            TypeSystemDefinition::Type(def) => {
                let def = def.node;
                let name = def.name.node.to_string();
                let kind = convert_kind(def.kind);

                if def.extend {
                    let Some(existing) = schema.types.get_mut(&name) else {
                        return Err(MirrorError::SchemaParse(format!(
                            "cannot extend undefined type '{}'",
                            name
                        )));
                    };
                    merge_extension(existing, kind)?;
                    continue;
                }

                if let Some(existing) = schema.types.get(&name) {
                    if !existing.is_builtin() {
                        return Err(MirrorError::SchemaParse(format!("type '{}' is defined twice", name)));
                    }
                    // Redeclaring a built-in scalar is a no-op
                    continue;
                }

                schema.types.insert(
                    name.clone(),
                    TypeDef {
                        name,
                        description: def.description.map(|d| d.node),
                        kind,
                    },
                );
            }
            TypeSystemDefinition::Directive(def) => {
                tracing::debug!("Ignoring directive definition @{}", def.node.name.node);
            }
        }
    }

    if !explicit_roots {
        if schema.types.contains_key("Mutation") {
            schema.mutation_type = Some("Mutation".to_string());
        }
        if schema.types.contains_key("Subscription") {
            schema.subscription_type = Some("Subscription".to_string());
        }
    }

    schema.validate()?;

    tracing::debug!(
        "Loaded schema with {} types (query root: {})",
        schema.types.len(),
        schema.query_type
    );

    Ok(schema)
}

/// Read and parse an SDL file
pub fn load_sdl_file(path: impl AsRef<Path>) -> Result<SchemaModel> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| {
        MirrorError::Config(format!("Failed to read schema file '{}': {}", path.display(), e))
    })?;
    load_sdl(&source)
}

/// Parse a GraphQL literal stored as text (a default value) back into a value
pub fn parse_literal(literal: &str) -> Option<ConstValue> {
    let source = format!("query ($v: Int = {}) {{ __typename }}", literal);
    let document = async_graphql_parser::parse_query(source).ok()?;
    let (_, operation) = document.operations.iter().next()?;
    let variable = operation.node.variable_definitions.first()?;
    variable.node.default_value.as_ref().map(|d| d.node.clone())
}

fn convert_kind(kind: TypeKind) -> TypeDefKind {
    match kind {
        TypeKind::Scalar => TypeDefKind::Scalar,
        TypeKind::Object(obj) => TypeDefKind::Object(ObjectDef {
            implements: obj.implements.into_iter().map(|n| n.node.to_string()).collect(),
            fields: obj.fields.into_iter().map(convert_field).collect(),
        }),
        TypeKind::Interface(iface) => TypeDefKind::Interface(ObjectDef {
            implements: iface.implements.into_iter().map(|n| n.node.to_string()).collect(),
            fields: iface.fields.into_iter().map(convert_field).collect(),
        }),
        TypeKind::Union(union) => {
            TypeDefKind::Union(union.members.into_iter().map(|n| n.node.to_string()).collect())
        }
        TypeKind::Enum(en) => TypeDefKind::Enum(
            en.values
                .into_iter()
                .map(|v| {
                    let v = v.node;
                    EnumValueDef {
                        name: v.value.node.to_string(),
                        description: v.description.map(|d| d.node),
                        deprecation: deprecation_reason(&v.directives),
                    }
                })
                .collect(),
        ),
        TypeKind::InputObject(input) => {
            TypeDefKind::InputObject(input.fields.into_iter().map(convert_input_value).collect())
        }
    }
}

fn convert_field(field: Positioned<FieldDefinition>) -> FieldDef {
    let field = field.node;
    FieldDef {
        name: field.name.node.to_string(),
        description: field.description.map(|d| d.node),
        args: field.arguments.into_iter().map(convert_input_value).collect(),
        ty: TypeRef::from_ast(&field.ty.node),
        deprecation: deprecation_reason(&field.directives),
    }
}

fn convert_input_value(value: Positioned<InputValueDefinition>) -> InputValueDef {
    let value = value.node;
    InputValueDef {
        name: value.name.node.to_string(),
        description: value.description.map(|d| d.node),
        ty: TypeRef::from_ast(&value.ty.node),
        default_value: value.default_value.map(|v| v.node.to_string()),
    }
}

/// `@deprecated` yields its reason, or the GraphQL default reason when none is given
fn deprecation_reason(directives: &[Positioned<ConstDirective>]) -> Option<String> {
    let directive = directives.iter().find(|d| d.node.name.node.as_str() == "deprecated")?;
    let reason = directive
        .node
        .arguments
        .iter()
        .find(|(name, _)| name.node.as_str() == "reason")
        .and_then(|(_, value)| match &value.node {
            ConstValue::String(s) => Some(s.clone()),
            _ => None,
        });
    Some(reason.unwrap_or_else(|| "No longer supported".to_string()))
}

fn merge_extension(existing: &mut TypeDef, extension: TypeDefKind) -> Result<()> {
    match (&mut existing.kind, extension) {
        (TypeDefKind::Object(obj), TypeDefKind::Object(ext))
        | (TypeDefKind::Interface(obj), TypeDefKind::Interface(ext)) => {
            obj.implements.extend(ext.implements);
            obj.fields.extend(ext.fields);
        }
        (TypeDefKind::Union(members), TypeDefKind::Union(ext)) => members.extend(ext),
        (TypeDefKind::Enum(values), TypeDefKind::Enum(ext)) => values.extend(ext),
        (TypeDefKind::InputObject(fields), TypeDefKind::InputObject(ext)) => fields.extend(ext),
        (TypeDefKind::Scalar, TypeDefKind::Scalar) => {}
        (kind, ext) => {
            return Err(MirrorError::SchemaParse(format!(
                "cannot extend {} '{}' with a {} definition",
                kind.label(),
                existing.name,
                ext.label()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDL: &str = r#"
        "A learner enrolled at a school"
        type Student {
            id: ID!
            name: String
            gender: Gender!
            guardians: [Guardian!]!
            legacyCode: String @deprecated(reason: "Use code")
        }

        type Guardian {
            id: ID!
        }

        enum Gender {
            FEMALE
            MALE
        }

        input StudentFilter {
            search: String
            limit: Int = 20
        }

        type Query {
            students(filter: StudentFilter): [Student!]!
        }

        extend type Query {
            student(id: ID!): Student
        }
    "#;

    #[test]
    fn test_load_basic_schema() {
        let schema = load_sdl(SDL).expect("schema should load");

        let student = schema.get("Student").unwrap();
        assert_eq!(student.description.as_deref(), Some("A learner enrolled at a school"));

        let guardians = schema.field("Student", "guardians").unwrap();
        assert_eq!(guardians.ty.to_string(), "[Guardian!]!");

        let name = schema.field("Student", "name").unwrap();
        assert!(!name.ty.is_non_null());

        let legacy = schema.field("Student", "legacyCode").unwrap();
        assert_eq!(legacy.deprecation.as_deref(), Some("Use code"));
    }

    #[test]
    fn test_extend_type_merges_fields() {
        let schema = load_sdl(SDL).unwrap();
        assert!(schema.field("Query", "students").is_some());
        assert!(schema.field("Query", "student").is_some());
    }

    #[test]
    fn test_default_values_are_kept() {
        let schema = load_sdl(SDL).unwrap();
        let fields = schema.input_fields("StudentFilter").unwrap();
        assert_eq!(fields[1].default_value.as_deref(), Some("20"));
        assert!(!fields[1].is_required());
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("20"), Some(ConstValue::Number(20.into())));
        assert_eq!(parse_literal("ACTIVE"), Some(ConstValue::Enum(async_graphql_value::Name::new("ACTIVE"))));
        assert_eq!(parse_literal("\"x\""), Some(ConstValue::String("x".to_string())));
        assert_eq!(parse_literal("{"), None);
    }

    #[test]
    fn test_explicit_schema_block() {
        let schema = load_sdl(
            r#"
            schema { query: RootQuery mutation: RootMutation }
            type RootQuery { ping: Boolean }
            type RootMutation { touch: Boolean }
            "#,
        )
        .unwrap();
        assert_eq!(schema.query_type, "RootQuery");
        assert_eq!(schema.mutation_type.as_deref(), Some("RootMutation"));
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let result = load_sdl("type Query { a: Int } type Query { b: Int }");
        assert!(result.is_err());
    }

    #[test]
    fn test_syntax_error() {
        let result = load_sdl("type Query {");
        assert!(matches!(result, Err(MirrorError::SchemaParse(_))));
    }
}
