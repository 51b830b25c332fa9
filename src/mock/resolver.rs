/// Placeholder values returned by mock resolvers
///
/// The mock answers every field with the smallest value its type allows:
/// null when nullable, an empty list, the first enum value, an empty object
/// for object types and the first possible type for abstract ones.

use crate::schema::{SchemaModel, TypeRef};
use async_graphql::dynamic::FieldValue;
use async_graphql::{Name, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Placeholder {
    Null,
    EmptyList,
    Value(Value),
    Object,
    /// Object of the named concrete type
    Abstract(String),
}

impl Placeholder {
    /// Placeholder for a field of type `ty`
    pub fn for_type(schema: &SchemaModel, ty: &TypeRef) -> Self {
        let TypeRef::NonNull(inner) = ty else {
            return Placeholder::Null;
        };
        match inner.as_ref() {
            TypeRef::List(_) => Placeholder::EmptyList,
            TypeRef::NonNull(nested) => Placeholder::for_type(schema, nested),
            TypeRef::Named(name) => {
                if let Some(values) = schema.enum_values(name) {
                    return match values.first() {
                        Some(first) => Placeholder::Value(Value::Enum(Name::new(&first.name))),
                        None => Placeholder::Null,
                    };
                }
                if schema.is_scalar(name) {
                    return Placeholder::Value(scalar_value(name));
                }
                if schema.is_abstract(name) {
                    let mut possible = schema.possible_types(name);
                    possible.sort_unstable();
                    return match possible.first() {
                        Some(first) => Placeholder::Abstract(first.to_string()),
                        None => Placeholder::Null,
                    };
                }
                Placeholder::Object
            }
        }
    }

    pub fn to_field_value<'a>(&self) -> Option<FieldValue<'a>> {
        match self {
            Placeholder::Null => None,
            Placeholder::EmptyList => Some(FieldValue::list(Vec::<FieldValue>::new())),
            Placeholder::Value(value) => Some(FieldValue::value(value.clone())),
            Placeholder::Object => Some(FieldValue::owned_any(())),
            Placeholder::Abstract(type_name) => Some(FieldValue::owned_any(()).with_type(type_name.clone())),
        }
    }
}

/// Output value for a scalar
pub fn scalar_value(name: &str) -> Value {
    match name {
        "ID" => Value::String("1".to_string()),
        "Int" | "Long" | "Float" | "BigDecimal" => Value::Number(0.into()),
        "Boolean" => Value::Boolean(false),
        "Date" => Value::String("1970-01-01".to_string()),
        "DateTime" => Value::String("1970-01-01T00:00:00Z".to_string()),
        "Time" => Value::String("00:00:00".to_string()),
        "Object" => Value::Object(Default::default()),
        _ => Value::String(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_sdl;

    fn schema() -> SchemaModel {
        load_sdl(
            r#"
            enum Gender { FEMALE MALE }
            type Student { id: ID! }
            type Staff { id: ID! }
            union Member = Student | Staff
            type Query { a: Int }
            "#,
        )
        .unwrap()
    }

    fn nn(name: &str) -> TypeRef {
        TypeRef::non_null(TypeRef::named(name))
    }

    #[test]
    fn test_nullable_fields_are_null() {
        assert_eq!(Placeholder::for_type(&schema(), &TypeRef::named("Student")), Placeholder::Null);
    }

    #[test]
    fn test_non_null_placeholders() {
        let schema = schema();
        assert_eq!(
            Placeholder::for_type(&schema, &nn("Gender")),
            Placeholder::Value(Value::Enum(Name::new("FEMALE")))
        );
        assert_eq!(Placeholder::for_type(&schema, &nn("Student")), Placeholder::Object);
        assert_eq!(Placeholder::for_type(&schema, &nn("Member")), Placeholder::Abstract("Staff".to_string()));
        assert_eq!(
            Placeholder::for_type(&schema, &TypeRef::non_null(TypeRef::list(nn("Student")))),
            Placeholder::EmptyList
        );
        assert_eq!(
            Placeholder::for_type(&schema, &nn("ID")),
            Placeholder::Value(Value::String("1".to_string()))
        );
    }
}
