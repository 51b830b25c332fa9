use crate::documents::{
    scan_selections, ArgValue, DirectiveUse, FieldSelection, FragmentDoc, OperationDoc, Selection,
    VariableDef,
};
use crate::error::{MirrorError, Result};
use crate::schema::{OperationKind, TypeRef};

use async_graphql_parser::types::{
    Directive, DocumentOperations, OperationDefinition, OperationType,
    Selection as AstSelection, SelectionSet,
};
use async_graphql_parser::Positioned;
use async_graphql_value::{ConstValue, Value};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Appended to every file so that fragment-only files parse as executable documents
const FRAGMENT_HOST: &str = "GqlmirrorFragmentHost__";

/// All operations and fragments of a project
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    pub operations: Vec<OperationDoc>,
    pub fragments: IndexMap<String, FragmentDoc>,
}

impl DocumentSet {
    /// Load every `.graphql`/`.gql` file under the given files or directories
    ///
    /// Files are visited in sorted path order so that the operation order,
    /// and therefore generated output, does not depend on the filesystem.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut files = Vec::new();
        for path in paths {
            collect_files(path.as_ref(), &mut files)?;
        }
        files.sort();
        files.dedup();

        let mut set = DocumentSet::default();
        for file in &files {
            let source = std::fs::read_to_string(file)?;
            let parsed = DocumentSet::parse(&source, &file.display().to_string())?;
            set.merge(parsed)?;
        }

        tracing::debug!(
            "Loaded {} operations and {} fragments from {} files",
            set.operations.len(),
            set.fragments.len(),
            files.len()
        );

        Ok(set)
    }

    /// Parse one executable document
    pub fn parse(source: &str, label: &str) -> Result<Self> {
        let hosted = format!("{}\nquery {} {{ __typename }}\n", source, FRAGMENT_HOST);
        let document = match async_graphql_parser::parse_query(&hosted) {
            Ok(document) => document,
            Err(hosted_err) => {
                // Report the error against the untouched source
                let message = match async_graphql_parser::parse_query(source) {
                    Err(e) => e.to_string(),
                    Ok(_) => format!("operations must be named ({})", hosted_err),
                };
                return Err(MirrorError::DocumentParse {
                    file: label.to_string(),
                    message,
                });
            }
        };

        let mut operations: Vec<(usize, usize, OperationDoc)> = Vec::new();
        match document.operations {
            DocumentOperations::Single(_) => {
                return Err(MirrorError::DocumentParse {
                    file: label.to_string(),
                    message: "operations must be named".to_string(),
                });
            }
            DocumentOperations::Multiple(ops) => {
                for (name, op) in ops {
                    if name.as_str() == FRAGMENT_HOST {
                        continue;
                    }
                    let (line, column) = (op.pos.line, op.pos.column);
                    operations.push((line, column, convert_operation(name.to_string(), op.node, label)));
                }
            }
        }
        operations.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut fragments: Vec<(usize, usize, FragmentDoc)> = document
            .fragments
            .into_iter()
            .map(|(name, fragment)| {
                let (line, column) = (fragment.pos.line, fragment.pos.column);
                let fragment = fragment.node;
                let doc = FragmentDoc {
                    name: name.to_string(),
                    type_condition: fragment.type_condition.node.on.node.to_string(),
                    directives: convert_directives(&fragment.directives),
                    selection_set: convert_selection_set(fragment.selection_set.node),
                    source: label.to_string(),
                };
                (line, column, doc)
            })
            .collect();
        fragments.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        Ok(DocumentSet {
            operations: operations.into_iter().map(|(_, _, op)| op).collect(),
            fragments: fragments.into_iter().map(|(_, _, f)| (f.name.clone(), f)).collect(),
        })
    }

    /// Merge another set, rejecting duplicate operation or fragment names
    pub fn merge(&mut self, other: DocumentSet) -> Result<()> {
        for op in other.operations {
            if let Some(existing) = self.operation(&op.name) {
                return Err(MirrorError::InvalidDocuments(vec![format!(
                    "operation '{}' is defined in both {} and {}",
                    op.name, existing.source, op.source
                )]));
            }
            self.operations.push(op);
        }
        for (name, fragment) in other.fragments {
            if let Some(existing) = self.fragments.get(&name) {
                return Err(MirrorError::InvalidDocuments(vec![format!(
                    "fragment '{}' is defined in both {} and {}",
                    name, existing.source, fragment.source
                )]));
            }
            self.fragments.insert(name, fragment);
        }
        Ok(())
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDoc> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn fragment(&self, name: &str) -> Option<&FragmentDoc> {
        self.fragments.get(name)
    }

    /// Fragments reachable from an operation, in order of first use
    ///
    /// Unknown fragment names are skipped; the validator reports them.
    pub fn fragments_used(&self, op: &OperationDoc) -> Vec<&FragmentDoc> {
        let mut order: Vec<&FragmentDoc> = Vec::new();
        let mut pending = direct_fragments(&op.selection_set);
        pending.reverse();

        while let Some(name) = pending.pop() {
            if order.iter().any(|f| f.name == name) {
                continue;
            }
            let Some(fragment) = self.fragment(&name) else {
                continue;
            };
            order.push(fragment);
            let mut nested = direct_fragments(&fragment.selection_set);
            nested.reverse();
            pending.extend(nested);
        }

        order
    }

    /// Variables referenced by an operation, its directives and its fragments
    pub fn variables_used(&self, op: &OperationDoc) -> BTreeSet<String> {
        let mut variables = BTreeSet::new();
        let mut ignored = BTreeSet::new();
        scan_selections(&op.selection_set, &mut ignored, &mut variables);
        for directive in &op.directives {
            for (_, value) in &directive.arguments {
                value.collect_variables(&mut variables);
            }
        }
        for fragment in self.fragments_used(op) {
            scan_selections(&fragment.selection_set, &mut ignored, &mut variables);
        }
        variables
    }
}

/// Fragment spreads in source order, descending into fields and inline fragments
fn direct_fragments(selections: &[Selection]) -> Vec<String> {
    let mut names = Vec::new();
    for selection in selections {
        match selection {
            Selection::Field(field) => names.extend(direct_fragments(&field.selection_set)),
            Selection::FragmentSpread { name, .. } => names.push(name.clone()),
            Selection::InlineFragment { selection_set, .. } => names.extend(direct_fragments(selection_set)),
        }
    }
    names
}

fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            collect_files(&entry?.path(), files)?;
        }
    } else if path.is_file() {
        if matches!(path.extension().and_then(|e| e.to_str()), Some("graphql" | "gql")) {
            files.push(path.to_path_buf());
        }
    } else {
        return Err(MirrorError::Config(format!(
            "Document path '{}' does not exist",
            path.display()
        )));
    }
    Ok(())
}

fn convert_operation(name: String, op: OperationDefinition, label: &str) -> OperationDoc {
    let kind = match op.ty {
        OperationType::Query => OperationKind::Query,
        OperationType::Mutation => OperationKind::Mutation,
        OperationType::Subscription => OperationKind::Subscription,
    };

    let variables = op
        .variable_definitions
        .into_iter()
        .map(|v| {
            let v = v.node;
            VariableDef {
                name: v.name.node.to_string(),
                ty: TypeRef::from_ast(&v.var_type.node),
                default_value: v.default_value.map(|d| convert_const(d.node)),
            }
        })
        .collect();

    OperationDoc {
        name,
        kind,
        variables,
        directives: convert_directives(&op.directives),
        selection_set: convert_selection_set(op.selection_set.node),
        source: label.to_string(),
    }
}

fn convert_selection_set(set: SelectionSet) -> Vec<Selection> {
    set.items
        .into_iter()
        .map(|item| match item.node {
            AstSelection::Field(field) => {
                let field = field.node;
                Selection::Field(FieldSelection {
                    alias: field.alias.map(|a| a.node.to_string()),
                    name: field.name.node.to_string(),
                    arguments: field
                        .arguments
                        .into_iter()
                        .map(|(name, value)| (name.node.to_string(), convert_value(value.node)))
                        .collect(),
                    directives: convert_directives(&field.directives),
                    selection_set: convert_selection_set(field.selection_set.node),
                })
            }
            AstSelection::FragmentSpread(spread) => {
                let spread = spread.node;
                Selection::FragmentSpread {
                    name: spread.fragment_name.node.to_string(),
                    directives: convert_directives(&spread.directives),
                }
            }
            AstSelection::InlineFragment(inline) => {
                let inline = inline.node;
                Selection::InlineFragment {
                    type_condition: inline.type_condition.map(|c| c.node.on.node.to_string()),
                    directives: convert_directives(&inline.directives),
                    selection_set: convert_selection_set(inline.selection_set.node),
                }
            }
        })
        .collect()
}

fn convert_directives(directives: &[Positioned<Directive>]) -> Vec<DirectiveUse> {
    directives
        .iter()
        .map(|d| DirectiveUse {
            name: d.node.name.node.to_string(),
            arguments: d
                .node
                .arguments
                .iter()
                .map(|(name, value)| (name.node.to_string(), convert_value(value.node.clone())))
                .collect(),
        })
        .collect()
}

fn number_value(n: &async_graphql_value::Number) -> ArgValue {
    if n.is_f64() {
        ArgValue::Float(n.to_string())
    } else {
        ArgValue::Int(n.to_string())
    }
}

fn convert_value(value: Value) -> ArgValue {
    match value {
        Value::Variable(name) => ArgValue::Variable(name.to_string()),
        Value::Null => ArgValue::Null,
        Value::Number(n) => number_value(&n),
        Value::String(s) => ArgValue::String(s),
        Value::Boolean(b) => ArgValue::Boolean(b),
        Value::Binary(bytes) => ArgValue::String(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Enum(name) => ArgValue::Enum(name.to_string()),
        Value::List(items) => ArgValue::List(items.into_iter().map(convert_value).collect()),
        Value::Object(fields) => ArgValue::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), convert_value(value)))
                .collect(),
        ),
    }
}

fn convert_const(value: ConstValue) -> ArgValue {
    match value {
        ConstValue::Null => ArgValue::Null,
        ConstValue::Number(n) => number_value(&n),
        ConstValue::String(s) => ArgValue::String(s),
        ConstValue::Boolean(b) => ArgValue::Boolean(b),
        ConstValue::Binary(bytes) => ArgValue::String(String::from_utf8_lossy(&bytes).into_owned()),
        ConstValue::Enum(name) => ArgValue::Enum(name.to_string()),
        ConstValue::List(items) => ArgValue::List(items.into_iter().map(convert_const).collect()),
        ConstValue::Object(fields) => ArgValue::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), convert_const(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        query GetStudents($filter: StudentFilter, $first: Int = 20) {
            students(filter: $filter, first: $first) {
                ...StudentCore
                classroom: homeroom { name }
            }
        }

        mutation MarkAttendance($input: AttendanceInput!) {
            attendance_mark(input: $input) { id status }
        }

        fragment StudentCore on Student {
            id
            name
            ...StudentGuardians
        }

        fragment StudentGuardians on Student {
            guardians { id }
        }
    "#;

    #[test]
    fn test_parse_operations_in_source_order() {
        let set = DocumentSet::parse(DOC, "inline.graphql").unwrap();
        let names: Vec<&str> = set.operations.iter().map(|op| op.name.as_str()).collect();
        assert_eq!(names, vec!["GetStudents", "MarkAttendance"]);
        assert_eq!(set.operations[1].kind, OperationKind::Mutation);
        assert_eq!(set.fragments.len(), 2);
    }

    #[test]
    fn test_variables_and_defaults() {
        let set = DocumentSet::parse(DOC, "inline.graphql").unwrap();
        let op = set.operation("GetStudents").unwrap();
        assert_eq!(op.variables.len(), 2);
        assert_eq!(op.variables[1].default_value, Some(ArgValue::Int("20".to_string())));
        assert!(!op.variables[0].is_required());
    }

    #[test]
    fn test_fragments_used_is_transitive() {
        let set = DocumentSet::parse(DOC, "inline.graphql").unwrap();
        let op = set.operation("GetStudents").unwrap();
        let used: Vec<&str> = set.fragments_used(op).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(used, vec!["StudentCore", "StudentGuardians"]);

        let mark = set.operation("MarkAttendance").unwrap();
        assert!(set.fragments_used(mark).is_empty());
    }

    #[test]
    fn test_alias_is_response_key() {
        let set = DocumentSet::parse(DOC, "inline.graphql").unwrap();
        let op = set.operation("GetStudents").unwrap();
        let Selection::Field(students) = &op.selection_set[0] else {
            panic!("expected field");
        };
        let Selection::Field(homeroom) = &students.selection_set[1] else {
            panic!("expected field");
        };
        assert_eq!(homeroom.response_key(), "classroom");
        assert_eq!(homeroom.name, "homeroom");
    }

    #[test]
    fn test_fragment_only_file() {
        let set = DocumentSet::parse("fragment Core on Student { id }", "frag.graphql").unwrap();
        assert!(set.operations.is_empty());
        assert!(set.fragment("Core").is_some());
    }

    #[test]
    fn test_anonymous_operation_rejected() {
        let result = DocumentSet::parse("{ students { id } }", "anon.graphql");
        assert!(matches!(result, Err(MirrorError::DocumentParse { .. })));
    }

    #[test]
    fn test_merge_rejects_duplicates() {
        let mut set = DocumentSet::parse("query A { a }", "one.graphql").unwrap();
        let other = DocumentSet::parse("query A { b }", "two.graphql").unwrap();
        assert!(set.merge(other).is_err());
    }
}
