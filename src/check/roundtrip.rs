/// Round trip of every operation through the mock server
///
/// Each operation is printed exactly as a generated client sends it, paired
/// with a minimal variables object, and executed against the mock. Any
/// validation or coercion error means the mirror and the schema disagree.

use crate::documents::printer::print_operation;
use crate::documents::{DocumentSet, OperationDoc};
use crate::mock::MockSchema;
use crate::schema::{OperationKind, SchemaModel, TypeRef};
use serde_json::{json, Map, Value};
use std::fmt;

/// Input objects nest at most this deep when sampling
const MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct RoundTripFailure {
    pub operation: String,
    pub variables: Value,
    pub errors: Vec<String>,
}

impl fmt::Display for RoundTripFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (variables {}): {}", self.operation, self.variables, self.errors.join("; "))
    }
}

/// Minimal valid variables: required variables only, with required input fields
pub fn sample_variables(op: &OperationDoc, schema: &SchemaModel) -> Value {
    let mut variables = Map::new();
    for var in op.variables.iter().filter(|v| v.is_required()) {
        variables.insert(var.name.clone(), sample_input(schema, &var.ty, 0));
    }
    Value::Object(variables)
}

fn sample_input(schema: &SchemaModel, ty: &TypeRef, depth: usize) -> Value {
    match ty {
        TypeRef::NonNull(inner) => sample_input(schema, inner, depth),
        TypeRef::List(inner) => json!([sample_input(schema, inner, depth)]),
        TypeRef::Named(name) => {
            if let Some(values) = schema.enum_values(name) {
                return values.first().map_or(Value::Null, |v| json!(v.name));
            }
            if let Some(fields) = schema.input_fields(name) {
                if depth >= MAX_DEPTH {
                    return Value::Null;
                }
                let object: Map<String, Value> = fields
                    .iter()
                    .filter(|f| f.is_required())
                    .map(|f| (f.name.clone(), sample_input(schema, &f.ty, depth + 1)))
                    .collect();
                return Value::Object(object);
            }
            sample_scalar(name)
        }
    }
}

/// Input value accepted by a scalar's mock validator
pub fn sample_scalar(name: &str) -> Value {
    match name {
        "ID" => json!("1"),
        "Int" | "Long" => json!(1),
        "Float" | "BigDecimal" => json!(1.5),
        "Boolean" => json!(true),
        "Date" => json!("2024-01-15"),
        "DateTime" => json!("2024-01-15T08:00:00Z"),
        "Time" => json!("08:00:00"),
        "Object" => json!({}),
        _ => json!("sample"),
    }
}

/// Send every query and mutation through the mock, returning the failures
///
/// Subscriptions are skipped: the mock has no streaming transport.
pub async fn roundtrip_all(mock: &MockSchema, schema: &SchemaModel, documents: &DocumentSet) -> Vec<RoundTripFailure> {
    let mut failures = Vec::new();

    for op in &documents.operations {
        if op.kind == OperationKind::Subscription {
            tracing::debug!("Skipping subscription {} in round trip", op.name);
            continue;
        }

        let query = print_operation(op, documents);
        let variables = sample_variables(op, schema);
        let response = mock.execute(&query, Some(&op.name), variables.clone()).await;

        if response.is_ok() {
            tracing::debug!("✓ {} round-tripped", op.name);
        } else {
            tracing::warn!("✗ {} rejected by mock: {}", op.name, response.errors.join("; "));
            failures.push(RoundTripFailure {
                operation: op.name.clone(),
                variables,
                errors: response.errors,
            });
        }
    }

    failures
}
