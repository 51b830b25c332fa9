/// Schema drift between a committed snapshot and a live schema
///
/// Every change the generated mirror would notice is reported: types, enum
/// values, fields, arguments, input fields, union members and roots.
/// Changes are classified the way schema review tools do, so a report can
/// separate what breaks existing clients from what merely extends the API.

use crate::schema::{InputValueDef, ObjectDef, SchemaModel, TypeDef, TypeDefKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Existing clients may fail
    Breaking,
    /// Existing clients keep working but may see values they do not handle
    Dangerous,
    Safe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Breaking => write!(f, "breaking"),
            Severity::Dangerous => write!(f, "dangerous"),
            Severity::Safe => write!(f, "safe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftChange {
    RootChanged {
        operation: &'static str,
        expected: Option<String>,
        actual: Option<String>,
    },
    TypeAdded {
        name: String,
        kind: &'static str,
    },
    TypeRemoved {
        name: String,
        kind: &'static str,
    },
    KindChanged {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    EnumValueAdded {
        enum_name: String,
        value: String,
    },
    EnumValueRemoved {
        enum_name: String,
        value: String,
    },
    UnionMemberAdded {
        union_name: String,
        member: String,
    },
    UnionMemberRemoved {
        union_name: String,
        member: String,
    },
    InterfaceAdded {
        type_name: String,
        interface: String,
    },
    InterfaceRemoved {
        type_name: String,
        interface: String,
    },
    FieldAdded {
        type_name: String,
        field: String,
    },
    FieldRemoved {
        type_name: String,
        field: String,
    },
    FieldTypeChanged {
        type_name: String,
        field: String,
        expected: String,
        actual: String,
    },
    /// `location` is `Type.field(arg)` for arguments or `Input.field` for input fields
    InputAdded {
        location: String,
        required: bool,
    },
    InputRemoved {
        location: String,
    },
    InputTypeChanged {
        location: String,
        expected: String,
        actual: String,
    },
    DefaultChanged {
        location: String,
        expected: Option<String>,
        actual: Option<String>,
    },
}

impl DriftChange {
    pub fn severity(&self) -> Severity {
        match self {
            DriftChange::RootChanged { .. }
            | DriftChange::TypeRemoved { .. }
            | DriftChange::KindChanged { .. }
            | DriftChange::EnumValueRemoved { .. }
            | DriftChange::UnionMemberRemoved { .. }
            | DriftChange::InterfaceRemoved { .. }
            | DriftChange::FieldRemoved { .. }
            | DriftChange::FieldTypeChanged { .. }
            | DriftChange::InputRemoved { .. }
            | DriftChange::InputTypeChanged { .. }
            | DriftChange::InputAdded { required: true, .. } => Severity::Breaking,
            DriftChange::EnumValueAdded { .. }
            | DriftChange::UnionMemberAdded { .. }
            | DriftChange::InterfaceAdded { .. }
            | DriftChange::DefaultChanged { .. } => Severity::Dangerous,
            DriftChange::TypeAdded { .. } | DriftChange::FieldAdded { .. } | DriftChange::InputAdded { .. } => {
                Severity::Safe
            }
        }
    }
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("(none)")
}

impl fmt::Display for DriftChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftChange::RootChanged {
                operation,
                expected,
                actual,
            } => write!(
                f,
                "{} root changed from {} to {}",
                operation,
                or_none(expected),
                or_none(actual)
            ),
            DriftChange::TypeAdded { name, kind } => write!(f, "{} {} added", kind, name),
            DriftChange::TypeRemoved { name, kind } => write!(f, "{} {} removed", kind, name),
            DriftChange::KindChanged { name, expected, actual } => {
                write!(f, "{} changed from {} to {}", name, expected, actual)
            }
            DriftChange::EnumValueAdded { enum_name, value } => write!(f, "enum {}: value {} added", enum_name, value),
            DriftChange::EnumValueRemoved { enum_name, value } => {
                write!(f, "enum {}: value {} removed", enum_name, value)
            }
            DriftChange::UnionMemberAdded { union_name, member } => {
                write!(f, "union {}: member {} added", union_name, member)
            }
            DriftChange::UnionMemberRemoved { union_name, member } => {
                write!(f, "union {}: member {} removed", union_name, member)
            }
            DriftChange::InterfaceAdded { type_name, interface } => {
                write!(f, "{} now implements {}", type_name, interface)
            }
            DriftChange::InterfaceRemoved { type_name, interface } => {
                write!(f, "{} no longer implements {}", type_name, interface)
            }
            DriftChange::FieldAdded { type_name, field } => write!(f, "{}.{} added", type_name, field),
            DriftChange::FieldRemoved { type_name, field } => write!(f, "{}.{} removed", type_name, field),
            DriftChange::FieldTypeChanged {
                type_name,
                field,
                expected,
                actual,
            } => write!(f, "{}.{}: type changed from {} to {}", type_name, field, expected, actual),
            DriftChange::InputAdded { location, required } => {
                let which = if *required { "required" } else { "optional" };
                write!(f, "{}: {} input added", location, which)
            }
            DriftChange::InputRemoved { location } => write!(f, "{}: input removed", location),
            DriftChange::InputTypeChanged {
                location,
                expected,
                actual,
            } => write!(f, "{}: type changed from {} to {}", location, expected, actual),
            DriftChange::DefaultChanged {
                location,
                expected,
                actual,
            } => write!(
                f,
                "{}: default changed from {} to {}",
                location,
                or_none(expected),
                or_none(actual)
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    pub changes: Vec<DriftChange>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn has_breaking(&self) -> bool {
        self.changes.iter().any(|c| c.severity() == Severity::Breaking)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.changes.iter().filter(|c| c.severity() == severity).count()
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for change in &self.changes {
            writeln!(f, "[{}] {}", change.severity(), change)?;
        }
        Ok(())
    }
}

/// Compare the schema the mirror was generated from with the current one
pub fn diff_schemas(expected: &SchemaModel, actual: &SchemaModel) -> DriftReport {
    let mut changes = Vec::new();

    let roots = [
        ("query", Some(expected.query_type.clone()), Some(actual.query_type.clone())),
        ("mutation", expected.mutation_type.clone(), actual.mutation_type.clone()),
        ("subscription", expected.subscription_type.clone(), actual.subscription_type.clone()),
    ];
    for (operation, expected, actual) in roots {
        if expected != actual {
            changes.push(DriftChange::RootChanged {
                operation,
                expected,
                actual,
            });
        }
    }

    for old in expected.sorted_types() {
        if old.is_builtin() {
            continue;
        }
        match actual.get(&old.name) {
            None => changes.push(DriftChange::TypeRemoved {
                name: old.name.clone(),
                kind: old.kind.label(),
            }),
            Some(new) => diff_type(old, new, &mut changes),
        }
    }

    for new in actual.sorted_types() {
        if !new.is_builtin() && expected.get(&new.name).is_none() {
            changes.push(DriftChange::TypeAdded {
                name: new.name.clone(),
                kind: new.kind.label(),
            });
        }
    }

    DriftReport { changes }
}

fn diff_type(old: &TypeDef, new: &TypeDef, changes: &mut Vec<DriftChange>) {
    let name = &old.name;
    match (&old.kind, &new.kind) {
        (TypeDefKind::Scalar, TypeDefKind::Scalar) => {}
        (TypeDefKind::Enum(old_values), TypeDefKind::Enum(new_values)) => {
            let old_names: Vec<&str> = old_values.iter().map(|v| v.name.as_str()).collect();
            let new_names: Vec<&str> = new_values.iter().map(|v| v.name.as_str()).collect();
            for removed in old_names.iter().filter(|v| !new_names.contains(v)) {
                changes.push(DriftChange::EnumValueRemoved {
                    enum_name: name.clone(),
                    value: removed.to_string(),
                });
            }
            for added in new_names.iter().filter(|v| !old_names.contains(v)) {
                changes.push(DriftChange::EnumValueAdded {
                    enum_name: name.clone(),
                    value: added.to_string(),
                });
            }
        }
        (TypeDefKind::Union(old_members), TypeDefKind::Union(new_members)) => {
            for removed in old_members.iter().filter(|m| !new_members.contains(m)) {
                changes.push(DriftChange::UnionMemberRemoved {
                    union_name: name.clone(),
                    member: removed.clone(),
                });
            }
            for added in new_members.iter().filter(|m| !old_members.contains(m)) {
                changes.push(DriftChange::UnionMemberAdded {
                    union_name: name.clone(),
                    member: added.clone(),
                });
            }
        }
        (TypeDefKind::Object(old_obj), TypeDefKind::Object(new_obj))
        | (TypeDefKind::Interface(old_obj), TypeDefKind::Interface(new_obj)) => {
            diff_object(name, old_obj, new_obj, changes);
        }
        (TypeDefKind::InputObject(old_fields), TypeDefKind::InputObject(new_fields)) => {
            diff_inputs(name, old_fields, new_fields, changes);
        }
        (old_kind, new_kind) => changes.push(DriftChange::KindChanged {
            name: name.clone(),
            expected: old_kind.label(),
            actual: new_kind.label(),
        }),
    }
}

fn diff_object(name: &str, old: &ObjectDef, new: &ObjectDef, changes: &mut Vec<DriftChange>) {
    for interface in old.implements.iter().filter(|i| !new.implements.contains(i)) {
        changes.push(DriftChange::InterfaceRemoved {
            type_name: name.to_string(),
            interface: interface.clone(),
        });
    }
    for interface in new.implements.iter().filter(|i| !old.implements.contains(i)) {
        changes.push(DriftChange::InterfaceAdded {
            type_name: name.to_string(),
            interface: interface.clone(),
        });
    }

    for old_field in &old.fields {
        let Some(new_field) = new.field(&old_field.name) else {
            changes.push(DriftChange::FieldRemoved {
                type_name: name.to_string(),
                field: old_field.name.clone(),
            });
            continue;
        };
        if old_field.ty != new_field.ty {
            changes.push(DriftChange::FieldTypeChanged {
                type_name: name.to_string(),
                field: old_field.name.clone(),
                expected: old_field.ty.to_string(),
                actual: new_field.ty.to_string(),
            });
        }
        let location = format!("{}.{}", name, old_field.name);
        diff_inputs(&location, &old_field.args, &new_field.args, changes);
    }

    for new_field in new.fields.iter().filter(|f| old.field(&f.name).is_none()) {
        changes.push(DriftChange::FieldAdded {
            type_name: name.to_string(),
            field: new_field.name.clone(),
        });
    }
}

/// Arguments of a field or fields of an input object
fn diff_inputs(owner: &str, old: &[InputValueDef], new: &[InputValueDef], changes: &mut Vec<DriftChange>) {
    let location = |input: &str| {
        if owner.contains('.') {
            format!("{}({})", owner, input)
        } else {
            format!("{}.{}", owner, input)
        }
    };

    for old_input in old {
        let Some(new_input) = new.iter().find(|i| i.name == old_input.name) else {
            changes.push(DriftChange::InputRemoved {
                location: location(&old_input.name),
            });
            continue;
        };
        if old_input.ty != new_input.ty {
            changes.push(DriftChange::InputTypeChanged {
                location: location(&old_input.name),
                expected: old_input.ty.to_string(),
                actual: new_input.ty.to_string(),
            });
        } else if old_input.default_value != new_input.default_value {
            changes.push(DriftChange::DefaultChanged {
                location: location(&old_input.name),
                expected: old_input.default_value.clone(),
                actual: new_input.default_value.clone(),
            });
        }
    }

    for new_input in new.iter().filter(|n| !old.iter().any(|o| o.name == n.name)) {
        changes.push(DriftChange::InputAdded {
            location: location(&new_input.name),
            required: new_input.is_required(),
        });
    }
}
