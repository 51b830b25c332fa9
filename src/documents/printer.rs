/// Canonical query text for the wire
///
/// An operation is rebuilt as a `graphql_parser` query document, followed by
/// every fragment it reaches, and printed through its formatter: two-space
/// indented, one selection per line. The same input always prints the same
/// text, which keeps generated `QUERY` constants stable.

use crate::codegen::selection::TYPENAME;
use crate::documents::{ArgValue, DirectiveUse, DocumentSet, FragmentDoc, OperationDoc, Selection, VariableDef};
use crate::schema::{OperationKind, SchemaModel};
use graphql_parser::query::{
    Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment, Mutation,
    OperationDefinition, Query, SelectionSet, Subscription, TypeCondition, Value, VariableDefinition,
};
use graphql_parser::query::Selection as AstSelection;
use graphql_parser::Pos;

const NOWHERE: Pos = Pos { line: 0, column: 0 };

/// Print an operation and the fragments it uses
pub fn print_operation(op: &OperationDoc, documents: &DocumentSet) -> String {
    Printer { schema: None }.document(op, documents).to_string()
}

/// Print an operation, adding `__typename` to selections on abstract types
///
/// Deserializers that dispatch on the concrete type need the discriminator
/// even when the document author did not ask for it.
pub fn print_operation_with_typename(op: &OperationDoc, documents: &DocumentSet, schema: &SchemaModel) -> String {
    Printer { schema: Some(schema) }.document(op, documents).to_string()
}

struct Printer<'a> {
    schema: Option<&'a SchemaModel>,
}

impl Printer<'_> {
    fn document(&self, op: &OperationDoc, documents: &DocumentSet) -> Document<'static, String> {
        let mut definitions = vec![Definition::Operation(self.operation(op))];
        definitions.extend(
            documents
                .fragments_used(op)
                .into_iter()
                .map(|fragment| Definition::Fragment(self.fragment(fragment))),
        );
        Document { definitions }
    }

    fn operation(&self, op: &OperationDoc) -> OperationDefinition<'static, String> {
        let root = self.schema.and_then(|s| s.root_type(op.kind));
        let name = Some(op.name.clone());
        let variable_definitions = op.variables.iter().map(variable).collect();
        let directives = directives(&op.directives);
        let selection_set = self.selection_set(&op.selection_set, root);

        match op.kind {
            OperationKind::Query => OperationDefinition::Query(Query {
                position: NOWHERE,
                name,
                variable_definitions,
                directives,
                selection_set,
            }),
            OperationKind::Mutation => OperationDefinition::Mutation(Mutation {
                position: NOWHERE,
                name,
                variable_definitions,
                directives,
                selection_set,
            }),
            OperationKind::Subscription => OperationDefinition::Subscription(Subscription {
                position: NOWHERE,
                name,
                variable_definitions,
                directives,
                selection_set,
            }),
        }
    }

    fn fragment(&self, fragment: &FragmentDoc) -> FragmentDefinition<'static, String> {
        FragmentDefinition {
            position: NOWHERE,
            name: fragment.name.clone(),
            type_condition: TypeCondition::On(fragment.type_condition.clone()),
            directives: directives(&fragment.directives),
            selection_set: self.selection_set(&fragment.selection_set, Some(&fragment.type_condition)),
        }
    }

    fn selection_set(&self, selections: &[Selection], parent: Option<&str>) -> SelectionSet<'static, String> {
        let mut items = Vec::with_capacity(selections.len() + 1);

        if self.needs_typename(selections, parent) {
            items.push(AstSelection::Field(field(TYPENAME.to_string())));
        }

        for selection in selections {
            items.push(match selection {
                Selection::Field(selected) => {
                    let child = self.child_type(parent, &selected.name);
                    AstSelection::Field(Field {
                        alias: selected.alias.clone(),
                        arguments: arguments(&selected.arguments),
                        directives: directives(&selected.directives),
                        selection_set: self.selection_set(&selected.selection_set, child.as_deref()),
                        ..field(selected.name.clone())
                    })
                }
                Selection::FragmentSpread { name, directives: used } => AstSelection::FragmentSpread(FragmentSpread {
                    position: NOWHERE,
                    fragment_name: name.clone(),
                    directives: directives(used),
                }),
                Selection::InlineFragment {
                    type_condition,
                    directives: used,
                    selection_set,
                } => AstSelection::InlineFragment(InlineFragment {
                    position: NOWHERE,
                    type_condition: type_condition.clone().map(TypeCondition::On),
                    directives: directives(used),
                    selection_set: self.selection_set(selection_set, type_condition.as_deref().or(parent)),
                }),
            });
        }

        SelectionSet {
            span: (NOWHERE, NOWHERE),
            items,
        }
    }

    fn needs_typename(&self, selections: &[Selection], parent: Option<&str>) -> bool {
        let (Some(schema), Some(parent)) = (self.schema, parent) else {
            return false;
        };
        !selections.is_empty()
            && schema.is_abstract(parent)
            && !selections
                .iter()
                .any(|s| matches!(s, Selection::Field(f) if f.name == TYPENAME && f.alias.is_none()))
    }

    fn child_type(&self, parent: Option<&str>, field: &str) -> Option<String> {
        let schema = self.schema?;
        Some(schema.field(parent?, field)?.ty.named_type().to_string())
    }
}

/// A bare leaf field
fn field(name: String) -> Field<'static, String> {
    Field {
        position: NOWHERE,
        alias: None,
        name,
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: SelectionSet {
            span: (NOWHERE, NOWHERE),
            items: Vec::new(),
        },
    }
}

fn variable(def: &VariableDef) -> VariableDefinition<'static, String> {
    VariableDefinition {
        position: NOWHERE,
        name: def.name.clone(),
        var_type: def.ty.to_parser_type(),
        default_value: def.default_value.as_ref().map(value),
    }
}

fn directives(used: &[DirectiveUse]) -> Vec<Directive<'static, String>> {
    used.iter()
        .map(|directive| Directive {
            position: NOWHERE,
            name: directive.name.clone(),
            arguments: arguments(&directive.arguments),
        })
        .collect()
}

fn arguments(args: &[(String, ArgValue)]) -> Vec<(String, Value<'static, String>)> {
    args.iter().map(|(name, arg)| (name.clone(), value(arg))).collect()
}

fn value(arg: &ArgValue) -> Value<'static, String> {
    match arg {
        ArgValue::Variable(name) => Value::Variable(name.clone()),
        ArgValue::Null => Value::Null,
        // Both come from parsed literals, so one of the parses succeeds
        ArgValue::Int(text) | ArgValue::Float(text) => match text.parse::<i32>() {
            Ok(int) => Value::Int(int.into()),
            Err(_) => text.parse::<f64>().map_or(Value::Null, Value::Float),
        },
        ArgValue::String(s) => Value::String(s.clone()),
        ArgValue::Boolean(b) => Value::Boolean(*b),
        ArgValue::Enum(e) => Value::Enum(e.clone()),
        ArgValue::List(items) => Value::List(items.iter().map(value).collect()),
        ArgValue::Object(fields) => Value::Object(fields.iter().map(|(name, v)| (name.clone(), value(v))).collect()),
    }
}
