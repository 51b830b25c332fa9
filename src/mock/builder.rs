/// Dynamic schema construction
///
/// Mirrors every type of a [`SchemaModel`] into an async-graphql dynamic
/// schema so real GraphQL validation and variable coercion run against it.
/// Subscription roots are left out: the mock only answers queries and
/// mutations.

use super::resolver::Placeholder;
use super::scalars::custom_scalar;
use crate::error::{MirrorError, Result};
use crate::schema::{parse_literal, EnumValueDef, FieldDef, InputValueDef, ObjectDef, SchemaModel, TypeDefKind, TypeRef};
use async_graphql::dynamic::{
    self, Enum, EnumItem, Field, FieldFuture, InputObject, InputValue, Interface, InterfaceField, Object, Schema,
    Union,
};

pub fn build_schema(model: &SchemaModel) -> Result<Schema> {
    let mut builder = Schema::build(model.query_type.as_str(), model.mutation_type.as_deref(), None);

    for ty in model.types.values() {
        if ty.is_builtin() {
            continue;
        }
        if model.subscription_type.as_deref() == Some(ty.name.as_str()) {
            tracing::debug!("Skipping subscription root '{}' in mock schema", ty.name);
            continue;
        }

        let description = ty.description.as_deref();
        builder = match &ty.kind {
            TypeDefKind::Scalar => builder.register(custom_scalar(&ty.name, description)),
            TypeDefKind::Object(obj) => builder.register(object_type(model, &ty.name, description, obj)),
            TypeDefKind::Interface(obj) => builder.register(interface_type(&ty.name, description, obj)),
            TypeDefKind::Union(members) => {
                let union = members
                    .iter()
                    .fold(Union::new(&ty.name), |union, member| union.possible_type(member));
                builder.register(with_description(union, description, Union::description))
            }
            TypeDefKind::Enum(values) => builder.register(enum_type(&ty.name, description, values)),
            TypeDefKind::InputObject(fields) => {
                let input = fields
                    .iter()
                    .fold(InputObject::new(&ty.name), |input, field| input.field(input_value(field)));
                builder.register(with_description(input, description, InputObject::description))
            }
        };
    }

    builder
        .finish()
        .map_err(|e| MirrorError::Server(format!("Failed to build mock schema: {}", e)))
}

fn object_type(model: &SchemaModel, name: &str, description: Option<&str>, obj: &ObjectDef) -> Object {
    let mut object = with_description(Object::new(name), description, Object::description);
    for interface in &obj.implements {
        object = object.implement(interface);
    }
    for field in &obj.fields {
        object = object.field(field_with_placeholder(model, field));
    }
    object
}

fn field_with_placeholder(model: &SchemaModel, def: &FieldDef) -> Field {
    let placeholder = Placeholder::for_type(model, &def.ty);
    let mut field = Field::new(&def.name, dynamic_type(&def.ty), move |_ctx| {
        let value = placeholder.to_field_value();
        FieldFuture::new(async move { Ok(value) })
    });
    if let Some(desc) = &def.description {
        field = field.description(desc);
    }
    def.args
        .iter()
        .fold(field, |field, arg| field.argument(input_value(arg)))
}

fn interface_type(name: &str, description: Option<&str>, obj: &ObjectDef) -> Interface {
    let mut interface = with_description(Interface::new(name), description, Interface::description);
    for parent in &obj.implements {
        interface = interface.implement(parent);
    }
    for def in &obj.fields {
        let field = def.args.iter().fold(
            InterfaceField::new(&def.name, dynamic_type(&def.ty)),
            |field, arg| field.argument(input_value(arg)),
        );
        interface = interface.field(field);
    }
    interface
}

fn enum_type(name: &str, description: Option<&str>, values: &[EnumValueDef]) -> Enum {
    values.iter().fold(
        with_description(Enum::new(name), description, Enum::description),
        |e, value| {
            let item = EnumItem::new(&value.name);
            e.item(with_description(item, value.description.as_deref(), EnumItem::description))
        },
    )
}

fn input_value(def: &InputValueDef) -> InputValue {
    let mut value = InputValue::new(&def.name, dynamic_type(&def.ty));
    if let Some(desc) = &def.description {
        value = value.description(desc);
    }
    match def.default_value.as_deref().map(|d| (d, parse_literal(d))) {
        Some((_, Some(default))) => value.default_value(default),
        Some((literal, None)) => {
            tracing::warn!("Ignoring unparseable default '{}' for '{}'", literal, def.name);
            value
        }
        None => value,
    }
}

fn with_description<T>(item: T, description: Option<&str>, describe: impl FnOnce(T, String) -> T) -> T {
    match description {
        Some(desc) => describe(item, desc.to_string()),
        None => item,
    }
}

pub fn dynamic_type(ty: &TypeRef) -> dynamic::TypeRef {
    match ty {
        TypeRef::Named(name) => dynamic::TypeRef::named(name.clone()),
        TypeRef::List(inner) => dynamic::TypeRef::List(Box::new(dynamic_type(inner))),
        TypeRef::NonNull(inner) => dynamic::TypeRef::NonNull(Box::new(dynamic_type(inner))),
    }
}
