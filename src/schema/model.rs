/// In-memory mirror of a GraphQL type system
///
/// Every loader (SDL, introspection) produces a `SchemaModel`, and every
/// generator, checker and the mock server consume one. Field and type order
/// follows the source so that output stays stable between runs.

use crate::error::{MirrorError, Result};
use indexmap::IndexMap;
use std::fmt;

pub const BUILTIN_SCALARS: &[&str] = &["ID", "String", "Boolean", "Int", "Float"];

/// A reference to a type, preserving nullability and list-ness
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// Name of the innermost named type
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// The type with one outer non-null wrapper removed
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.nullable(), TypeRef::List(_))
    }

    pub fn from_ast(ty: &async_graphql_parser::types::Type) -> Self {
        use async_graphql_parser::types::BaseType;

        let base = match &ty.base {
            BaseType::Named(name) => TypeRef::Named(name.to_string()),
            BaseType::List(inner) => TypeRef::list(TypeRef::from_ast(inner)),
        };
        if ty.nullable {
            base
        } else {
            TypeRef::non_null(base)
        }
    }

    /// The same reference as a printable `graphql_parser` type
    pub fn to_parser_type(&self) -> graphql_parser::schema::Type<'static, String> {
        use graphql_parser::schema::Type;

        match self {
            TypeRef::Named(name) => Type::NamedType(name.clone()),
            TypeRef::List(inner) => Type::ListType(Box::new(inner.to_parser_type())),
            TypeRef::NonNull(inner) => Type::NonNullType(Box::new(inner.to_parser_type())),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    /// Default value in GraphQL literal syntax
    pub default_value: Option<String>,
}

impl InputValueDef {
    /// Non-null without a default: callers must always supply it
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub args: Vec<InputValueDef>,
    pub ty: TypeRef,
    pub deprecation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDef {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectDef {
    pub implements: Vec<String>,
    pub fields: Vec<FieldDef>,
}

impl ObjectDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    Scalar,
    Object(ObjectDef),
    Interface(ObjectDef),
    Union(Vec<String>),
    Enum(Vec<EnumValueDef>),
    InputObject(Vec<InputValueDef>),
}

impl TypeDefKind {
    pub fn label(&self) -> &'static str {
        match self {
            TypeDefKind::Scalar => "scalar",
            TypeDefKind::Object(_) => "type",
            TypeDefKind::Interface(_) => "interface",
            TypeDefKind::Union(_) => "union",
            TypeDefKind::Enum(_) => "enum",
            TypeDefKind::InputObject(_) => "input",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub description: Option<String>,
    pub kind: TypeDefKind,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, kind: TypeDefKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
        }
    }

    /// Fields of an object or interface type
    pub fn object(&self) -> Option<&ObjectDef> {
        match &self.kind {
            TypeDefKind::Object(obj) | TypeDefKind::Interface(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, TypeDefKind::Scalar) && BUILTIN_SCALARS.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }

    /// Suffix used for generated result type names (`GetStudentsQuery`)
    pub fn suffix(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }
}

/// A complete schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaModel {
    pub query_type: String,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    pub types: IndexMap<String, TypeDef>,
}

impl Default for SchemaModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaModel {
    /// Create an empty schema holding only the built-in scalars
    pub fn new() -> Self {
        let mut types = IndexMap::new();
        for name in BUILTIN_SCALARS {
            types.insert(name.to_string(), TypeDef::new(*name, TypeDefKind::Scalar));
        }
        Self {
            query_type: "Query".to_string(),
            mutation_type: None,
            subscription_type: None,
            types,
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        self.get(type_name)?.object()?.field(field_name)
    }

    pub fn root_type(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => Some(self.query_type.as_str()),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn is_abstract(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|t| &t.kind),
            Some(TypeDefKind::Interface(_)) | Some(TypeDefKind::Union(_))
        )
    }

    pub fn is_leaf(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|t| &t.kind),
            Some(TypeDefKind::Scalar) | Some(TypeDefKind::Enum(_))
        )
    }

    pub fn is_composite(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|t| &t.kind),
            Some(TypeDefKind::Object(_)) | Some(TypeDefKind::Interface(_)) | Some(TypeDefKind::Union(_))
        )
    }

    pub fn is_input_type(&self, name: &str) -> bool {
        matches!(
            self.get(name).map(|t| &t.kind),
            Some(TypeDefKind::Scalar) | Some(TypeDefKind::Enum(_)) | Some(TypeDefKind::InputObject(_))
        )
    }

    pub fn is_enum(&self, name: &str) -> bool {
        matches!(self.get(name).map(|t| &t.kind), Some(TypeDefKind::Enum(_)))
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        matches!(self.get(name).map(|t| &t.kind), Some(TypeDefKind::Scalar))
    }

    /// Concrete object types a value of `name` may have at runtime
    pub fn possible_types(&self, name: &str) -> Vec<&str> {
        match self.get(name).map(|t| &t.kind) {
            Some(TypeDefKind::Object(_)) => vec![self.types[name].name.as_str()],
            Some(TypeDefKind::Union(members)) => members.iter().map(String::as_str).collect(),
            Some(TypeDefKind::Interface(_)) => self
                .types
                .values()
                .filter(|t| match &t.kind {
                    TypeDefKind::Object(obj) => obj.implements.iter().any(|i| i == name),
                    _ => false,
                })
                .map(|t| t.name.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether a fragment on `condition` applies to an object of type `concrete`
    pub fn type_applies(&self, condition: &str, concrete: &str) -> bool {
        condition == concrete || self.possible_types(condition).contains(&concrete)
    }

    pub fn enum_values(&self, name: &str) -> Option<&[EnumValueDef]> {
        match &self.get(name)?.kind {
            TypeDefKind::Enum(values) => Some(values),
            _ => None,
        }
    }

    pub fn input_fields(&self, name: &str) -> Option<&[InputValueDef]> {
        match &self.get(name)?.kind {
            TypeDefKind::InputObject(fields) => Some(fields),
            _ => None,
        }
    }

    /// All types sorted by name, built-ins included
    pub fn sorted_types(&self) -> Vec<&TypeDef> {
        let mut types: Vec<&TypeDef> = self.types.values().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }

    pub fn custom_scalars(&self) -> Vec<&str> {
        self.sorted_types()
            .into_iter()
            .filter(|t| matches!(t.kind, TypeDefKind::Scalar) && !t.is_builtin())
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Check structural consistency, reporting every problem found
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        let roots = [
            ("query", Some(&self.query_type)),
            ("mutation", self.mutation_type.as_ref()),
            ("subscription", self.subscription_type.as_ref()),
        ];
        for (label, root) in roots {
            if let Some(root) = root {
                match self.get(root).map(|t| &t.kind) {
                    Some(TypeDefKind::Object(_)) => {}
                    Some(_) => problems.push(format!("{} root '{}' is not an object type", label, root)),
                    None => problems.push(format!("{} root type '{}' is not defined", label, root)),
                }
            }
        }

        for ty in self.types.values() {
            match &ty.kind {
                TypeDefKind::Object(obj) | TypeDefKind::Interface(obj) => {
                    for field in &obj.fields {
                        let target = field.ty.named_type();
                        match self.get(target) {
                            None => problems.push(format!(
                                "{}.{} refers to unknown type '{}'",
                                ty.name, field.name, target
                            )),
                            Some(t) if matches!(t.kind, TypeDefKind::InputObject(_)) => problems.push(format!(
                                "{}.{} has input type '{}' in output position",
                                ty.name, field.name, target
                            )),
                            Some(_) => {}
                        }
                        for arg in &field.args {
                            self.check_input_ref(&format!("{}.{}({})", ty.name, field.name, arg.name), &arg.ty, &mut problems);
                        }
                    }
                    for iface in &obj.implements {
                        let Some(iface_def) = self.get(iface) else {
                            problems.push(format!("{} implements unknown interface '{}'", ty.name, iface));
                            continue;
                        };
                        let TypeDefKind::Interface(iface_obj) = &iface_def.kind else {
                            problems.push(format!("{} implements non-interface '{}'", ty.name, iface));
                            continue;
                        };
                        for required in &iface_obj.fields {
                            if obj.field(&required.name).is_none() {
                                problems.push(format!(
                                    "{} is missing field '{}' required by interface {}",
                                    ty.name, required.name, iface
                                ));
                            }
                        }
                    }
                }
                TypeDefKind::Union(members) => {
                    for member in members {
                        if !matches!(self.get(member).map(|t| &t.kind), Some(TypeDefKind::Object(_))) {
                            problems.push(format!("union {} member '{}' is not an object type", ty.name, member));
                        }
                    }
                }
                TypeDefKind::InputObject(fields) => {
                    for field in fields {
                        self.check_input_ref(&format!("{}.{}", ty.name, field.name), &field.ty, &mut problems);
                    }
                }
                TypeDefKind::Enum(values) if values.is_empty() => {
                    problems.push(format!("enum {} has no values", ty.name));
                }
                _ => {}
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(MirrorError::InvalidSchema(problems))
        }
    }

    fn check_input_ref(&self, location: &str, ty: &TypeRef, problems: &mut Vec<String>) {
        let target = ty.named_type();
        if self.get(target).is_none() {
            problems.push(format!("{} refers to unknown type '{}'", location, target));
        } else if !self.is_input_type(target) {
            problems.push(format!("{} has output type '{}' in input position", location, target));
        }
    }
}
