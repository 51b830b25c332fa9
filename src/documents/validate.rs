/// Operation/schema consistency checks
///
/// Every problem is collected rather than stopping at the first one, so a
/// single run reports the whole drift between documents and schema.

use crate::documents::{DocumentSet, OperationDoc, Selection};
use crate::error::{MirrorError, Result};
use crate::schema::{SchemaModel, TypeDefKind};
use std::collections::BTreeSet;

/// Validate all documents, failing with every problem found
pub fn validate_documents(schema: &SchemaModel, documents: &DocumentSet) -> Result<()> {
    let problems = document_problems(schema, documents);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(MirrorError::InvalidDocuments(problems))
    }
}

/// Collect validation problems as human-readable lines
pub fn document_problems(schema: &SchemaModel, documents: &DocumentSet) -> Vec<String> {
    let mut problems = Vec::new();

    for fragment in documents.fragments.values() {
        let location = format!("fragment {}", fragment.name);
        if !schema.is_composite(&fragment.type_condition) {
            problems.push(format!(
                "{}: type condition '{}' is not an object, interface or union",
                location, fragment.type_condition
            ));
            continue;
        }
        check_selections(
            schema,
            documents,
            &fragment.type_condition,
            &fragment.selection_set,
            &location,
            &mut problems,
        );
    }

    for op in &documents.operations {
        check_operation(schema, documents, op, &mut problems);
    }

    problems
}

fn check_operation(schema: &SchemaModel, documents: &DocumentSet, op: &OperationDoc, problems: &mut Vec<String>) {
    let location = format!("{} {}", op.kind.keyword(), op.name);

    let Some(root) = schema.root_type(op.kind) else {
        problems.push(format!("{}: schema has no {} root type", location, op.kind.keyword()));
        return;
    };

    let mut declared = BTreeSet::new();
    for variable in &op.variables {
        if !declared.insert(variable.name.clone()) {
            problems.push(format!("{}: variable ${} is declared twice", location, variable.name));
        }
        let type_name = variable.ty.named_type();
        if schema.get(type_name).is_none() {
            problems.push(format!("{}: variable ${} has unknown type '{}'", location, variable.name, type_name));
        } else if !schema.is_input_type(type_name) {
            problems.push(format!(
                "{}: variable ${} has non-input type '{}'",
                location, variable.name, type_name
            ));
        }
    }

    let used = documents.variables_used(op);
    for name in used.difference(&declared) {
        problems.push(format!("{}: variable ${} is used but not declared", location, name));
    }
    for name in declared.difference(&used) {
        problems.push(format!("{}: variable ${} is declared but never used", location, name));
    }

    check_selections(schema, documents, root, &op.selection_set, &location, problems);
}

fn check_selections(
    schema: &SchemaModel,
    documents: &DocumentSet,
    parent: &str,
    selections: &[Selection],
    location: &str,
    problems: &mut Vec<String>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                if field.name == "__typename" {
                    if !field.selection_set.is_empty() {
                        problems.push(format!("{}: __typename cannot have a selection set", location));
                    }
                    continue;
                }

                let Some(def) = schema.field(parent, &field.name) else {
                    let hint = match schema.get(parent).map(|t| &t.kind) {
                        Some(TypeDefKind::Union(_)) => " (select union members through fragments)",
                        _ => "",
                    };
                    problems.push(format!(
                        "{}: type '{}' has no field '{}'{}",
                        location, parent, field.name, hint
                    ));
                    continue;
                };

                for (arg_name, _) in &field.arguments {
                    if !def.args.iter().any(|a| &a.name == arg_name) {
                        problems.push(format!(
                            "{}: field '{}.{}' has no argument '{}'",
                            location, parent, field.name, arg_name
                        ));
                    }
                }
                for arg in def.args.iter().filter(|a| a.is_required()) {
                    if !field.arguments.iter().any(|(name, _)| name == &arg.name) {
                        problems.push(format!(
                            "{}: field '{}.{}' is missing required argument '{}'",
                            location, parent, field.name, arg.name
                        ));
                    }
                }

                let target = def.ty.named_type();
                let field_location = format!("{}.{}", location, field.response_key());
                if schema.is_leaf(target) {
                    if !field.selection_set.is_empty() {
                        problems.push(format!(
                            "{}: leaf field of type '{}' cannot have a selection set",
                            field_location, target
                        ));
                    }
                } else if field.selection_set.is_empty() {
                    problems.push(format!(
                        "{}: field of type '{}' needs a selection set",
                        field_location, target
                    ));
                } else {
                    check_selections(schema, documents, target, &field.selection_set, &field_location, problems);
                }
            }
            Selection::FragmentSpread { name, .. } => {
                if documents.fragment(name).is_none() {
                    problems.push(format!("{}: unknown fragment '{}'", location, name));
                }
            }
            Selection::InlineFragment {
                type_condition,
                selection_set,
                ..
            } => {
                let on = type_condition.as_deref().unwrap_or(parent);
                if !schema.is_composite(on) {
                    problems.push(format!(
                        "{}: inline fragment on '{}' which is not an object, interface or union",
                        location, on
                    ));
                    continue;
                }
                check_selections(schema, documents, on, selection_set, location, problems);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_sdl;

    const SDL: &str = r#"
        type Student { id: ID! name: String guardians: [Guardian!]! }
        type Guardian { id: ID! phone: String }
        type Staff { id: ID! }
        union Member = Student | Staff
        input StudentFilter { search: String }
        type Query {
            students(filter: StudentFilter, first: Int): [Student!]!
            student(id: ID!): Student
            members: [Member!]!
        }
    "#;

    fn problems(doc: &str) -> Vec<String> {
        let schema = load_sdl(SDL).unwrap();
        let documents = DocumentSet::parse(doc, "test.graphql").unwrap();
        document_problems(&schema, &documents)
    }

    #[test]
    fn test_valid_document() {
        let found = problems(
            r#"
            query GetStudent($id: ID!) {
                student(id: $id) { id ...Contact }
                members { __typename ... on Student { name } ... on Staff { id } }
            }
            fragment Contact on Student { guardians { phone } }
            "#,
        );
        assert!(found.is_empty(), "unexpected problems: {:?}", found);
    }

    #[test]
    fn test_undeclared_and_orphaned_variables() {
        let found = problems("query Q($unused: Int) { student(id: $id) { id } }");
        assert!(found.iter().any(|p| p.contains("$id is used but not declared")));
        assert!(found.iter().any(|p| p.contains("$unused is declared but never used")));
    }

    #[test]
    fn test_variables_used_through_fragments_count() {
        let found = problems(
            r#"
            query Q($id: ID!) { ...Root }
            fragment Root on Query { student(id: $id) { id } }
            "#,
        );
        assert!(found.is_empty(), "unexpected problems: {:?}", found);
    }

    #[test]
    fn test_missing_required_argument() {
        let found = problems("query Q { student { id } }");
        assert!(found.iter().any(|p| p.contains("missing required argument 'id'")));
    }

    #[test]
    fn test_unknown_field_and_argument() {
        let found = problems("query Q { students(page: 2) { id grade } }");
        assert!(found.iter().any(|p| p.contains("has no argument 'page'")));
        assert!(found.iter().any(|p| p.contains("has no field 'grade'")));
    }

    #[test]
    fn test_selection_shape_errors() {
        let found = problems("query Q { students { id { x } guardians } }");
        assert!(found.iter().any(|p| p.contains("cannot have a selection set")));
        assert!(found.iter().any(|p| p.contains("needs a selection set")));
    }

    #[test]
    fn test_unknown_fragment_and_output_variable_type() {
        let found = problems("query Q($s: Student) { students { ...Missing } }");
        assert!(found.iter().any(|p| p.contains("unknown fragment 'Missing'")));
        assert!(found.iter().any(|p| p.contains("non-input type 'Student'")));
    }

    #[test]
    fn test_validate_documents_error() {
        let schema = load_sdl(SDL).unwrap();
        let documents = DocumentSet::parse("query Q { nope }", "test.graphql").unwrap();
        assert!(matches!(
            validate_documents(&schema, &documents),
            Err(MirrorError::InvalidDocuments(_))
        ));
    }
}
