/// Deterministic SDL printer
///
/// Used to snapshot a live schema fetched by introspection so later runs can
/// diff against it. The model is rebuilt as a `graphql_parser` schema
/// document and printed through its formatter. Types print alphabetically;
/// fields keep source order.

use crate::schema::loader::parse_literal;
use crate::schema::model::{EnumValueDef, FieldDef, InputValueDef, SchemaModel, TypeDef, TypeDefKind};
use async_graphql_value::ConstValue;
use graphql_parser::schema::{
    Definition, Directive, Document, EnumType, EnumValue, Field, InputObjectType, InputValue, InterfaceType,
    ObjectType, ScalarType, SchemaDefinition, TypeDefinition, UnionType, Value,
};
use graphql_parser::Pos;
use std::collections::BTreeMap;

const NOWHERE: Pos = Pos { line: 0, column: 0 };

pub fn print_sdl(schema: &SchemaModel) -> String {
    let mut definitions = Vec::new();

    if !roots_match_names(schema) {
        definitions.push(Definition::SchemaDefinition(SchemaDefinition {
            position: NOWHERE,
            directives: Vec::new(),
            query: Some(schema.query_type.clone()),
            mutation: schema.mutation_type.clone(),
            subscription: schema.subscription_type.clone(),
        }));
    }

    definitions.extend(
        schema
            .sorted_types()
            .into_iter()
            .filter(|t| !t.is_builtin())
            .map(|t| Definition::TypeDefinition(type_definition(t))),
    );

    Document::<'static, String> { definitions }.to_string()
}

/// Whether reloading without a `schema` block infers the same roots
///
/// Without the block the query root is `Query`, and `Mutation` and
/// `Subscription` become roots whenever types with those names exist.
fn roots_match_names(schema: &SchemaModel) -> bool {
    schema.query_type == "Query"
        && schema.mutation_type.as_deref() == schema.get("Mutation").map(|_| "Mutation")
        && schema.subscription_type.as_deref() == schema.get("Subscription").map(|_| "Subscription")
}

fn type_definition(ty: &TypeDef) -> TypeDefinition<'static, String> {
    let name = ty.name.clone();
    let description = ty.description.clone();

    match &ty.kind {
        TypeDefKind::Scalar => {
            let mut scalar = ScalarType::new(name);
            scalar.description = description;
            TypeDefinition::Scalar(scalar)
        }
        TypeDefKind::Object(obj) => {
            let mut object = ObjectType::new(name);
            object.description = description;
            object.implements_interfaces = obj.implements.clone();
            object.fields = obj.fields.iter().map(field).collect();
            TypeDefinition::Object(object)
        }
        TypeDefKind::Interface(obj) => {
            let mut interface = InterfaceType::new(name);
            interface.description = description;
            interface.implements_interfaces = obj.implements.clone();
            interface.fields = obj.fields.iter().map(field).collect();
            TypeDefinition::Interface(interface)
        }
        TypeDefKind::Union(members) => {
            let mut union = UnionType::new(name);
            union.description = description;
            union.types = members.clone();
            TypeDefinition::Union(union)
        }
        TypeDefKind::Enum(values) => {
            let mut enum_type = EnumType::new(name);
            enum_type.description = description;
            enum_type.values = values.iter().map(enum_value).collect();
            TypeDefinition::Enum(enum_type)
        }
        TypeDefKind::InputObject(fields) => {
            let mut input = InputObjectType::new(name);
            input.description = description;
            input.fields = fields.iter().map(input_value).collect();
            TypeDefinition::InputObject(input)
        }
    }
}

fn field(def: &FieldDef) -> Field<'static, String> {
    Field {
        position: NOWHERE,
        description: def.description.clone(),
        name: def.name.clone(),
        arguments: def.args.iter().map(input_value).collect(),
        field_type: def.ty.to_parser_type(),
        directives: deprecated(def.deprecation.as_deref()),
    }
}

fn enum_value(def: &EnumValueDef) -> EnumValue<'static, String> {
    let mut value = EnumValue::new(def.name.clone());
    value.description = def.description.clone();
    value.directives = deprecated(def.deprecation.as_deref());
    value
}

fn input_value(def: &InputValueDef) -> InputValue<'static, String> {
    let default_value = def.default_value.as_deref().and_then(|literal| match parse_literal(literal) {
        Some(value) => Some(const_value(&value)),
        None => {
            tracing::warn!("Dropping unparseable default '{}' for '{}'", literal, def.name);
            None
        }
    });

    InputValue {
        position: NOWHERE,
        description: def.description.clone(),
        name: def.name.clone(),
        value_type: def.ty.to_parser_type(),
        default_value,
        directives: Vec::new(),
    }
}

fn deprecated(reason: Option<&str>) -> Vec<Directive<'static, String>> {
    reason
        .map(|reason| Directive {
            position: NOWHERE,
            name: "deprecated".to_string(),
            arguments: vec![("reason".to_string(), Value::String(reason.to_string()))],
        })
        .into_iter()
        .collect()
}

/// Convert a parsed constant into a printable AST value
fn const_value(value: &ConstValue) -> Value<'static, String> {
    match value {
        ConstValue::Null => Value::Null,
        ConstValue::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Value::Int(i.into()),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        ConstValue::String(s) => Value::String(s.clone()),
        ConstValue::Boolean(b) => Value::Boolean(*b),
        ConstValue::Binary(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ConstValue::Enum(name) => Value::Enum(name.to_string()),
        ConstValue::List(items) => Value::List(items.iter().map(const_value).collect()),
        ConstValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), const_value(value)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}
