/// Resolution of selection sets into result shapes
///
/// Both generators describe operation results the same way: fields merged by
/// response key, fragments flattened into the concrete type they apply to,
/// and abstract fields split into one variant per possible object type.

use crate::documents::{DocumentSet, FragmentDoc, OperationDoc, Selection};
use crate::error::{MirrorError, Result};
use crate::schema::{SchemaModel, TypeRef};
use indexmap::IndexMap;

pub const TYPENAME: &str = "__typename";

#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    /// Key in the response (alias or field name)
    pub key: String,
    /// Schema field name
    pub name: String,
    pub ty: TypeRef,
    /// Only present when an `@include`/`@skip` condition holds
    pub conditional: bool,
    pub shape: Shape,
}

impl FieldShape {
    pub fn is_typename(&self) -> bool {
        self.name == TYPENAME
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectShape {
    pub type_name: String,
    pub fields: Vec<FieldShape>,
}

impl ObjectShape {
    /// Whether `__typename` was selected explicitly
    pub fn selects_typename(&self) -> bool {
        self.fields.iter().any(|f| f.is_typename() && f.key == TYPENAME)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Leaf,
    Object(ObjectShape),
    /// One variant per possible object type, sorted by type name
    Abstract {
        type_name: String,
        variants: Vec<ObjectShape>,
    },
}

struct Group {
    name: String,
    conditional: bool,
    selections: Vec<Selection>,
}

pub struct ShapeResolver<'a> {
    schema: &'a SchemaModel,
    documents: &'a DocumentSet,
}

impl<'a> ShapeResolver<'a> {
    pub fn new(schema: &'a SchemaModel, documents: &'a DocumentSet) -> Self {
        Self { schema, documents }
    }

    /// Shape of an operation's `data` object
    pub fn operation(&self, op: &OperationDoc) -> Result<ObjectShape> {
        let root = self.schema.root_type(op.kind).ok_or_else(|| {
            MirrorError::Codegen(format!(
                "operation '{}' needs a {} root type the schema does not define",
                op.name,
                op.kind.keyword()
            ))
        })?;
        Ok(self.object(root, &op.selection_set))
    }

    /// Shape of a fragment on its type condition
    pub fn fragment(&self, fragment: &FragmentDoc) -> Shape {
        self.composite(&fragment.type_condition, &fragment.selection_set)
    }

    fn composite(&self, type_name: &str, selections: &[Selection]) -> Shape {
        if self.schema.is_abstract(type_name) {
            let mut possible = self.schema.possible_types(type_name);
            possible.sort_unstable();
            Shape::Abstract {
                type_name: type_name.to_string(),
                variants: possible.into_iter().map(|p| self.object(p, selections)).collect(),
            }
        } else {
            Shape::Object(self.object(type_name, selections))
        }
    }

    fn object(&self, concrete: &str, selections: &[Selection]) -> ObjectShape {
        let mut groups: IndexMap<String, Group> = IndexMap::new();
        let mut visited = Vec::new();
        self.collect(concrete, selections, false, &mut groups, &mut visited);

        let fields = groups
            .into_iter()
            .filter_map(|(key, group)| self.field(concrete, key, group))
            .collect();

        ObjectShape {
            type_name: concrete.to_string(),
            fields,
        }
    }

    fn field(&self, concrete: &str, key: String, group: Group) -> Option<FieldShape> {
        if group.name == TYPENAME {
            return Some(FieldShape {
                key,
                name: group.name,
                ty: TypeRef::non_null(TypeRef::named("String")),
                conditional: group.conditional,
                shape: Shape::Leaf,
            });
        }

        // Unknown fields are reported by validation; skip them here
        let def = self.schema.field(concrete, &group.name)?;
        let target = def.ty.named_type();
        let shape = if self.schema.is_leaf(target) {
            Shape::Leaf
        } else {
            self.composite(target, &group.selections)
        };

        Some(FieldShape {
            key,
            name: group.name,
            ty: def.ty.clone(),
            conditional: group.conditional,
            shape,
        })
    }

    fn collect(
        &self,
        concrete: &str,
        selections: &[Selection],
        conditional: bool,
        groups: &mut IndexMap<String, Group>,
        visited: &mut Vec<String>,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    let field_conditional = conditional || field.is_conditional();
                    let group = groups.entry(field.response_key().to_string()).or_insert_with(|| Group {
                        name: field.name.clone(),
                        conditional: field_conditional,
                        selections: Vec::new(),
                    });
                    group.conditional &= field_conditional;
                    group.selections.extend(field.selection_set.iter().cloned());
                }
                Selection::FragmentSpread { name, directives } => {
                    let Some(fragment) = self.documents.fragment(name) else {
                        continue;
                    };
                    if visited.contains(name) || !self.schema.type_applies(&fragment.type_condition, concrete) {
                        continue;
                    }
                    visited.push(name.clone());
                    let spread_conditional = conditional || has_condition(directives);
                    self.collect(concrete, &fragment.selection_set, spread_conditional, groups, visited);
                    visited.pop();
                }
                Selection::InlineFragment {
                    type_condition,
                    directives,
                    selection_set,
                } => {
                    let applies = type_condition
                        .as_deref()
                        .map_or(true, |on| self.schema.type_applies(on, concrete));
                    if applies {
                        let inline_conditional = conditional || has_condition(directives);
                        self.collect(concrete, selection_set, inline_conditional, groups, visited);
                    }
                }
            }
        }
    }
}

fn has_condition(directives: &[crate::documents::DirectiveUse]) -> bool {
    directives.iter().any(|d| d.name == "include" || d.name == "skip")
}
