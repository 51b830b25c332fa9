/// Introspection response model and conversion into `SchemaModel`

use crate::error::{MirrorError, Result};
use crate::schema::model::{
    EnumValueDef, FieldDef, InputValueDef, ObjectDef, SchemaModel, TypeDef, TypeDefKind, TypeRef,
};
use serde::Deserialize;

/// Standard introspection query, seven levels of type wrapping deep
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
pub struct IntrospectionResponse {
    pub data: Option<IntrospectionData>,
    #[serde(default)]
    pub errors: Vec<ResponseError>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct IntrospectionData {
    #[serde(rename = "__schema")]
    pub schema: IntrospectionSchema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    pub query_type: NamedRef,
    pub mutation_type: Option<NamedRef>,
    pub subscription_type: Option<NamedRef>,
    pub types: Vec<FullType>,
}

#[derive(Debug, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntrospectionKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullType {
    pub kind: IntrospectionKind,
    pub name: String,
    pub description: Option<String>,
    pub fields: Option<Vec<IntrospectionField>>,
    pub input_fields: Option<Vec<IntrospectionInputValue>>,
    pub interfaces: Option<Vec<IntrospectionTypeRef>>,
    pub enum_values: Option<Vec<IntrospectionEnumValue>>,
    pub possible_types: Option<Vec<IntrospectionTypeRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionField {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    pub ty: IntrospectionTypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: IntrospectionTypeRef,
    pub default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEnumValue {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionTypeRef {
    pub kind: IntrospectionKind,
    pub name: Option<String>,
    pub of_type: Option<Box<IntrospectionTypeRef>>,
}

impl IntrospectionTypeRef {
    fn to_type_ref(&self) -> Result<TypeRef> {
        match self.kind {
            IntrospectionKind::NonNull => Ok(TypeRef::non_null(self.inner()?.to_type_ref()?)),
            IntrospectionKind::List => Ok(TypeRef::list(self.inner()?.to_type_ref()?)),
            _ => self
                .name
                .clone()
                .map(TypeRef::Named)
                .ok_or_else(|| MirrorError::Introspection("named type reference without a name".to_string())),
        }
    }

    fn inner(&self) -> Result<&IntrospectionTypeRef> {
        self.of_type.as_deref().ok_or_else(|| {
            MirrorError::Introspection(format!("{:?} type reference without ofType", self.kind))
        })
    }
}

impl IntrospectionResponse {
    /// Unwrap the schema, turning GraphQL errors into an introspection error
    pub fn into_schema(self) -> Result<IntrospectionSchema> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(MirrorError::Introspection(messages.join("; ")));
        }
        self.data
            .map(|d| d.schema)
            .ok_or_else(|| MirrorError::Introspection("response has no data".to_string()))
    }
}

fn convert_input_values(values: &[IntrospectionInputValue]) -> Result<Vec<InputValueDef>> {
    values
        .iter()
        .map(|v| {
            Ok(InputValueDef {
                name: v.name.clone(),
                description: v.description.clone(),
                ty: v.ty.to_type_ref()?,
                default_value: v.default_value.clone(),
            })
        })
        .collect()
}

fn convert_object(full: &FullType) -> Result<ObjectDef> {
    let fields = full
        .fields
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|f| {
            Ok(FieldDef {
                name: f.name.clone(),
                description: f.description.clone(),
                args: convert_input_values(&f.args)?,
                ty: f.ty.to_type_ref()?,
                deprecation: deprecation(f.is_deprecated, &f.deprecation_reason),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let implements = full
        .interfaces
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|i| i.name.clone())
        .collect();

    Ok(ObjectDef { implements, fields })
}

fn deprecation(is_deprecated: bool, reason: &Option<String>) -> Option<String> {
    is_deprecated.then(|| reason.clone().unwrap_or_else(|| "No longer supported".to_string()))
}

impl SchemaModel {
    /// Convert an introspection result, skipping `__` meta types
    pub fn from_introspection(introspection: &IntrospectionSchema) -> Result<SchemaModel> {
        let mut schema = SchemaModel::new();
        schema.query_type = introspection.query_type.name.clone();
        schema.mutation_type = introspection.mutation_type.as_ref().map(|n| n.name.clone());
        schema.subscription_type = introspection.subscription_type.as_ref().map(|n| n.name.clone());

        for full in &introspection.types {
            if full.name.starts_with("__") {
                continue;
            }

            let kind = match full.kind {
                IntrospectionKind::Scalar => TypeDefKind::Scalar,
                IntrospectionKind::Object => TypeDefKind::Object(convert_object(full)?),
                IntrospectionKind::Interface => TypeDefKind::Interface(convert_object(full)?),
                IntrospectionKind::Union => TypeDefKind::Union(
                    full.possible_types
                        .as_deref()
                        .unwrap_or_default()
                        .iter()
                        .filter_map(|t| t.name.clone())
                        .collect(),
                ),
                IntrospectionKind::Enum => TypeDefKind::Enum(
                    full.enum_values
                        .as_deref()
                        .unwrap_or_default()
                        .iter()
                        .map(|v| EnumValueDef {
                            name: v.name.clone(),
                            description: v.description.clone(),
                            deprecation: deprecation(v.is_deprecated, &v.deprecation_reason),
                        })
                        .collect(),
                ),
                IntrospectionKind::InputObject => {
                    TypeDefKind::InputObject(convert_input_values(full.input_fields.as_deref().unwrap_or_default())?)
                }
                IntrospectionKind::List | IntrospectionKind::NonNull => {
                    return Err(MirrorError::Introspection(format!(
                        "type '{}' has wrapper kind {:?}",
                        full.name, full.kind
                    )));
                }
            };

            schema.types.insert(
                full.name.clone(),
                TypeDef {
                    name: full.name.clone(),
                    description: full.description.clone(),
                    kind,
                },
            );
        }

        schema.validate()?;
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "data": {
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
                "subscriptionType": null,
                "types": [
                    {
                        "kind": "OBJECT",
                        "name": "Query",
                        "description": null,
                        "fields": [
                            {
                                "name": "students",
                                "description": null,
                                "args": [
                                    {
                                        "name": "first",
                                        "description": null,
                                        "type": { "kind": "SCALAR", "name": "Int", "ofType": null },
                                        "defaultValue": "10"
                                    }
                                ],
                                "type": {
                                    "kind": "NON_NULL",
                                    "name": null,
                                    "ofType": {
                                        "kind": "LIST",
                                        "name": null,
                                        "ofType": {
                                            "kind": "NON_NULL",
                                            "name": null,
                                            "ofType": { "kind": "OBJECT", "name": "Student", "ofType": null }
                                        }
                                    }
                                },
                                "isDeprecated": false,
                                "deprecationReason": null
                            }
                        ],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    },
                    {
                        "kind": "OBJECT",
                        "name": "Student",
                        "description": "A learner",
                        "fields": [
                            {
                                "name": "gender",
                                "description": null,
                                "args": [],
                                "type": { "kind": "ENUM", "name": "Gender", "ofType": null },
                                "isDeprecated": true,
                                "deprecationReason": "Moved to profile"
                            }
                        ],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    },
                    {
                        "kind": "ENUM",
                        "name": "Gender",
                        "description": null,
                        "fields": null,
                        "inputFields": null,
                        "interfaces": null,
                        "enumValues": [
                            { "name": "FEMALE", "description": null, "isDeprecated": false, "deprecationReason": null },
                            { "name": "MALE", "description": null, "isDeprecated": false, "deprecationReason": null }
                        ],
                        "possibleTypes": null
                    },
                    {
                        "kind": "OBJECT",
                        "name": "__Schema",
                        "description": null,
                        "fields": [],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn test_convert_introspection() {
        let response: IntrospectionResponse = serde_json::from_str(RESPONSE).unwrap();
        let schema = SchemaModel::from_introspection(&response.into_schema().unwrap()).unwrap();

        assert!(schema.get("__Schema").is_none());
        assert_eq!(schema.field("Query", "students").unwrap().ty.to_string(), "[Student!]!");
        assert_eq!(
            schema.field("Query", "students").unwrap().args[0].default_value.as_deref(),
            Some("10")
        );
        assert_eq!(
            schema.field("Student", "gender").unwrap().deprecation.as_deref(),
            Some("Moved to profile")
        );
        let values: Vec<&str> = schema.enum_values("Gender").unwrap().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(values, vec!["FEMALE", "MALE"]);
    }

    #[test]
    fn test_errors_are_surfaced() {
        let response: IntrospectionResponse =
            serde_json::from_str(r#"{ "data": null, "errors": [{ "message": "introspection disabled" }] }"#).unwrap();
        let err = response.into_schema().unwrap_err();
        assert!(err.to_string().contains("introspection disabled"));
    }
}
