/// Executable documents: named operations and fragments
///
/// Documents are parsed once, converted into the owned types below and never
/// mutated afterwards. Generators, the validator and the printers all walk
/// these types rather than the parser AST.

pub mod ast;
mod loader;
pub mod printer;
mod validate;

pub use loader::DocumentSet;
pub use validate::{document_problems, validate_documents};

use crate::schema::{OperationKind, TypeRef};
use std::collections::BTreeSet;
use std::fmt;

/// Argument or default value as written in a document
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Variable(String),
    Null,
    Int(String),
    Float(String),
    String(String),
    Boolean(bool),
    Enum(String),
    List(Vec<ArgValue>),
    Object(Vec<(String, ArgValue)>),
}

impl ArgValue {
    /// Collect every variable referenced inside this value
    pub fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            ArgValue::Variable(name) => {
                out.insert(name.clone());
            }
            ArgValue::List(items) => items.iter().for_each(|v| v.collect_variables(out)),
            ArgValue::Object(fields) => fields.iter().for_each(|(_, v)| v.collect_variables(out)),
            _ => {}
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Variable(name) => write!(f, "${}", name),
            ArgValue::Null => write!(f, "null"),
            ArgValue::Int(n) | ArgValue::Float(n) => write!(f, "{}", n),
            ArgValue::String(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
            ArgValue::Boolean(b) => write!(f, "{}", b),
            ArgValue::Enum(e) => write!(f, "{}", e),
            ArgValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ArgValue::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveUse {
    pub name: String,
    pub arguments: Vec<(String, ArgValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    pub alias: Option<String>,
    pub name: String,
    pub arguments: Vec<(String, ArgValue)>,
    pub directives: Vec<DirectiveUse>,
    pub selection_set: Vec<Selection>,
}

impl FieldSelection {
    /// Key under which the field appears in the response
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// `@include`/`@skip` make a field possibly absent from the response
    pub fn is_conditional(&self) -> bool {
        self.directives.iter().any(|d| d.name == "include" || d.name == "skip")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(FieldSelection),
    FragmentSpread {
        name: String,
        directives: Vec<DirectiveUse>,
    },
    InlineFragment {
        type_condition: Option<String>,
        directives: Vec<DirectiveUse>,
        selection_set: Vec<Selection>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<ArgValue>,
}

impl VariableDef {
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationDoc {
    pub name: String,
    pub kind: OperationKind,
    pub variables: Vec<VariableDef>,
    pub directives: Vec<DirectiveUse>,
    pub selection_set: Vec<Selection>,
    /// File the operation was read from
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDoc {
    pub name: String,
    pub type_condition: String,
    pub directives: Vec<DirectiveUse>,
    pub selection_set: Vec<Selection>,
    pub source: String,
}

/// Walk a selection set, collecting fragment names and variable references
pub(crate) fn scan_selections(
    selections: &[Selection],
    fragments: &mut BTreeSet<String>,
    variables: &mut BTreeSet<String>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                for (_, value) in &field.arguments {
                    value.collect_variables(variables);
                }
                scan_directives(&field.directives, variables);
                scan_selections(&field.selection_set, fragments, variables);
            }
            Selection::FragmentSpread { name, directives } => {
                fragments.insert(name.clone());
                scan_directives(directives, variables);
            }
            Selection::InlineFragment {
                directives,
                selection_set,
                ..
            } => {
                scan_directives(directives, variables);
                scan_selections(selection_set, fragments, variables);
            }
        }
    }
}

fn scan_directives(directives: &[DirectiveUse], variables: &mut BTreeSet<String>) {
    for directive in directives {
        for (_, value) in &directive.arguments {
            value.collect_variables(variables);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_value_display() {
        let value = ArgValue::Object(vec![
            ("status".to_string(), ArgValue::Enum("PRESENT".to_string())),
            ("ids".to_string(), ArgValue::List(vec![ArgValue::Variable("id".to_string()), ArgValue::Int("3".to_string())])),
            ("note".to_string(), ArgValue::String("late \"bus\"".to_string())),
        ]);
        assert_eq!(value.to_string(), r#"{status: PRESENT, ids: [$id, 3], note: "late \"bus\""}"#);
    }

    #[test]
    fn test_collect_variables_nested() {
        let value = ArgValue::List(vec![ArgValue::Object(vec![(
            "a".to_string(),
            ArgValue::Variable("term".to_string()),
        )])]);
        let mut vars = BTreeSet::new();
        value.collect_variables(&mut vars);
        assert!(vars.contains("term"));
    }
}
