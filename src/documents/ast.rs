/// graphql-js style AST literal for an operation
///
/// TypeScript clients pass this object to their transport instead of a query
/// string. Empty argument, directive and variable lists are omitted, matching
/// what graphql-js produces after stripping locations.

use crate::documents::{ArgValue, DirectiveUse, DocumentSet, OperationDoc, Selection};
use crate::schema::TypeRef;
use serde_json::{json, Map, Value};

/// Build the `Document` node for an operation and the fragments it uses
pub fn document_ast(op: &OperationDoc, documents: &DocumentSet) -> Value {
    let mut definitions = vec![operation_node(op)];
    for fragment in documents.fragments_used(op) {
        let mut node = Map::new();
        node.insert("kind".into(), json!("FragmentDefinition"));
        node.insert("name".into(), name_node(&fragment.name));
        node.insert(
            "typeCondition".into(),
            json!({ "kind": "NamedType", "name": name_node(&fragment.type_condition) }),
        );
        insert_directives(&mut node, &fragment.directives);
        node.insert("selectionSet".into(), selection_set_node(&fragment.selection_set));
        definitions.push(Value::Object(node));
    }

    json!({ "kind": "Document", "definitions": definitions })
}

fn operation_node(op: &OperationDoc) -> Value {
    let mut node = Map::new();
    node.insert("kind".into(), json!("OperationDefinition"));
    node.insert("operation".into(), json!(op.kind.keyword()));
    node.insert("name".into(), name_node(&op.name));
    if !op.variables.is_empty() {
        let variables: Vec<Value> = op
            .variables
            .iter()
            .map(|v| {
                let mut var = Map::new();
                var.insert("kind".into(), json!("VariableDefinition"));
                var.insert("variable".into(), variable_node(&v.name));
                var.insert("type".into(), type_node(&v.ty));
                if let Some(default) = &v.default_value {
                    var.insert("defaultValue".into(), value_node(default));
                }
                Value::Object(var)
            })
            .collect();
        node.insert("variableDefinitions".into(), Value::Array(variables));
    }
    insert_directives(&mut node, &op.directives);
    node.insert("selectionSet".into(), selection_set_node(&op.selection_set));
    Value::Object(node)
}

fn selection_set_node(selections: &[Selection]) -> Value {
    let selections: Vec<Value> = selections.iter().map(selection_node).collect();
    json!({ "kind": "SelectionSet", "selections": selections })
}

fn selection_node(selection: &Selection) -> Value {
    let mut node = Map::new();
    match selection {
        Selection::Field(field) => {
            node.insert("kind".into(), json!("Field"));
            if let Some(alias) = &field.alias {
                node.insert("alias".into(), name_node(alias));
            }
            node.insert("name".into(), name_node(&field.name));
            insert_arguments(&mut node, "arguments", &field.arguments);
            insert_directives(&mut node, &field.directives);
            if !field.selection_set.is_empty() {
                node.insert("selectionSet".into(), selection_set_node(&field.selection_set));
            }
        }
        Selection::FragmentSpread { name, directives } => {
            node.insert("kind".into(), json!("FragmentSpread"));
            node.insert("name".into(), name_node(name));
            insert_directives(&mut node, directives);
        }
        Selection::InlineFragment {
            type_condition,
            directives,
            selection_set,
        } => {
            node.insert("kind".into(), json!("InlineFragment"));
            if let Some(on) = type_condition {
                node.insert("typeCondition".into(), json!({ "kind": "NamedType", "name": name_node(on) }));
            }
            insert_directives(&mut node, directives);
            node.insert("selectionSet".into(), selection_set_node(selection_set));
        }
    }
    Value::Object(node)
}

fn insert_arguments(node: &mut Map<String, Value>, key: &str, arguments: &[(String, ArgValue)]) {
    if arguments.is_empty() {
        return;
    }
    let args: Vec<Value> = arguments
        .iter()
        .map(|(name, value)| json!({ "kind": "Argument", "name": name_node(name), "value": value_node(value) }))
        .collect();
    node.insert(key.to_string(), Value::Array(args));
}

fn insert_directives(node: &mut Map<String, Value>, directives: &[DirectiveUse]) {
    if directives.is_empty() {
        return;
    }
    let nodes: Vec<Value> = directives
        .iter()
        .map(|d| {
            let mut directive = Map::new();
            directive.insert("kind".into(), json!("Directive"));
            directive.insert("name".into(), name_node(&d.name));
            insert_arguments(&mut directive, "arguments", &d.arguments);
            Value::Object(directive)
        })
        .collect();
    node.insert("directives".into(), Value::Array(nodes));
}

fn name_node(name: &str) -> Value {
    json!({ "kind": "Name", "value": name })
}

fn variable_node(name: &str) -> Value {
    json!({ "kind": "Variable", "name": name_node(name) })
}

fn type_node(ty: &TypeRef) -> Value {
    match ty {
        TypeRef::Named(name) => json!({ "kind": "NamedType", "name": name_node(name) }),
        TypeRef::List(inner) => json!({ "kind": "ListType", "type": type_node(inner) }),
        TypeRef::NonNull(inner) => json!({ "kind": "NonNullType", "type": type_node(inner) }),
    }
}

fn value_node(value: &ArgValue) -> Value {
    match value {
        ArgValue::Variable(name) => variable_node(name),
        ArgValue::Null => json!({ "kind": "NullValue" }),
        ArgValue::Int(n) => json!({ "kind": "IntValue", "value": n }),
        ArgValue::Float(n) => json!({ "kind": "FloatValue", "value": n }),
        ArgValue::String(s) => json!({ "kind": "StringValue", "value": s }),
        ArgValue::Boolean(b) => json!({ "kind": "BooleanValue", "value": b }),
        ArgValue::Enum(e) => json!({ "kind": "EnumValue", "value": e }),
        ArgValue::List(items) => {
            let values: Vec<Value> = items.iter().map(value_node).collect();
            json!({ "kind": "ListValue", "values": values })
        }
        ArgValue::Object(fields) => {
            let fields: Vec<Value> = fields
                .iter()
                .map(|(name, value)| json!({ "kind": "ObjectField", "name": name_node(name), "value": value_node(value) }))
                .collect();
            json!({ "kind": "ObjectValue", "fields": fields })
        }
    }
}
