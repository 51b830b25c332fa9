/// Rust output
///
/// Produces a single module in the shape `graphql_client` users expect:
/// scalar aliases, serde enums and input structs at the top level, then one
/// submodule per operation with `OPERATION_NAME`, `QUERY`, `Variables` and a
/// `ResponseData` tree. Schema object types are not emitted; responses are
/// typed by what each operation selects.

use super::naming::{dedupe, enum_member_names, rust_field_name, rust_ident, to_pascal_case};
use super::selection::{FieldShape, ObjectShape, Shape, ShapeResolver, TYPENAME};
use super::{doc_lines, CodegenContext, Generator, GENERATED_HEADER};
use crate::documents::printer::print_operation_with_typename;
use crate::documents::OperationDoc;
use crate::error::Result;
use crate::schema::{EnumValueDef, InputValueDef, TypeDef, TypeDefKind, TypeRef, BUILTIN_SCALARS};
use std::collections::HashSet;
use std::fmt::Write;

/// Type names visible in every operation module besides the schema's own
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Variables",
    "ResponseData",
    "Option",
    "Vec",
    "Box",
    "String",
    "Serialize",
    "Deserialize",
];

const PREAMBLE: &str = "// Include with `mod <name>;` so the attributes below apply to the whole module.
#![allow(clippy::all, dead_code, deprecated, non_camel_case_types, non_snake_case)]

use serde::{Deserialize, Serialize};
";

#[derive(Debug, Clone, Copy, Default)]
pub struct RustGenerator;

impl Generator for RustGenerator {
    fn generate(&self, ctx: &CodegenContext) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "// {}", GENERATED_HEADER);
        out.push_str(PREAMBLE);

        self.scalar_aliases(&mut out, ctx);
        for ty in ctx.schema.sorted_types() {
            match &ty.kind {
                TypeDefKind::Enum(values) => enum_type(&mut out, ty, values),
                TypeDefKind::InputObject(fields) => self.input_struct(&mut out, ctx, ty, fields),
                _ => {}
            }
        }

        let resolver = ShapeResolver::new(ctx.schema, ctx.documents);
        let mut modules = HashSet::new();
        for op in &ctx.documents.operations {
            let module = dedupe(&mut modules, rust_field_name(&op.name));
            self.operation_module(&mut out, ctx, &resolver, op, &module)?;
        }

        Ok(out)
    }
}

impl RustGenerator {
    /// `ID` and custom scalars get aliases; other built-ins map directly
    fn scalar_aliases(&self, out: &mut String, ctx: &CodegenContext) {
        for name in std::iter::once("ID").chain(ctx.schema.custom_scalars()) {
            out.push('\n');
            let description = ctx.schema.get(name).and_then(|t| t.description.as_deref());
            write_doc(out, "", &doc_lines(description, None, "Deprecated:"));
            let _ = writeln!(out, "pub type {} = {};", name, ctx.scalars.get(name));
        }
    }

    fn input_struct(&self, out: &mut String, ctx: &CodegenContext, ty: &TypeDef, fields: &[InputValueDef]) {
        out.push('\n');
        write_doc(out, "", &doc_lines(ty.description.as_deref(), None, "Deprecated:"));
        out.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
        let _ = writeln!(out, "pub struct {} {{", ty.name);

        let mut seen = HashSet::new();
        for field in fields {
            write_doc(out, "    ", &doc_lines(field.description.as_deref(), None, "Deprecated:"));
            let boxed = !field.ty.is_list() && input_reaches(ctx, field.ty.named_type(), &ty.name, &mut Vec::new());
            let mut named = leaf_type(ctx, field.ty.named_type());
            if boxed {
                named = format!("Box<{}>", named);
            }
            self.input_field(out, &mut seen, &field.name, &field.ty, field.is_required(), &named);
        }
        out.push_str("}\n");
    }

    fn input_field(
        &self,
        out: &mut String,
        seen: &mut HashSet<String>,
        name: &str,
        ty: &TypeRef,
        required: bool,
        named: &str,
    ) {
        let ident = dedupe(seen, rust_field_name(name));
        if required {
            let _ = writeln!(out, "    #[serde(rename = \"{}\")]", name);
            let _ = writeln!(out, "    pub {}: {},", ident, wrap_non_null(ty, named));
        } else {
            let _ = writeln!(
                out,
                "    #[serde(rename = \"{}\", skip_serializing_if = \"Option::is_none\")]",
                name
            );
            let _ = writeln!(out, "    pub {}: Option<{}>,", ident, wrap_non_null(ty.nullable(), named));
        }
    }

    fn operation_module(
        &self,
        out: &mut String,
        ctx: &CodegenContext,
        resolver: &ShapeResolver,
        op: &OperationDoc,
        module: &str,
    ) -> Result<()> {
        let query = print_operation_with_typename(op, ctx.documents, ctx.schema);
        let hashes = "#".repeat(raw_string_hashes(&query));

        out.push('\n');
        let _ = writeln!(out, "pub mod {} {{", module);
        out.push_str("    use super::*;\n\n");
        let _ = writeln!(out, "    pub const OPERATION_NAME: &str = \"{}\";", op.name);
        let _ = writeln!(out, "    pub const QUERY: &str = r{}\"{}\"{};", hashes, query, hashes);

        out.push('\n');
        out.push_str("    #[derive(Debug, Clone, PartialEq, Serialize)]\n");
        if op.variables.is_empty() {
            out.push_str("    pub struct Variables;\n");
        } else {
            let mut body = String::new();
            let mut seen = HashSet::new();
            for var in &op.variables {
                let named = leaf_type(ctx, var.ty.named_type());
                self.input_field(&mut body, &mut seen, &var.name, &var.ty, var.is_required(), &named);
            }
            out.push_str("    pub struct Variables {\n");
            out.push_str(&indent(&body));
            out.push_str("    }\n");
        }

        let shape = resolver.operation(op)?;
        let mut used = reserved_type_names(ctx);
        let mut defs = Vec::new();
        self.response_struct(ctx, "ResponseData", &to_pascal_case(&op.name), &shape, false, &mut used, &mut defs);
        for def in defs {
            out.push('\n');
            out.push_str(&indent(&def));
        }

        out.push_str("}\n");
        Ok(())
    }

    /// Emit a response struct and, after it, every type its fields need
    #[allow(clippy::too_many_arguments)]
    fn response_struct(
        &self,
        ctx: &CodegenContext,
        name: &str,
        prefix: &str,
        obj: &ObjectShape,
        in_variant: bool,
        used: &mut HashSet<String>,
        defs: &mut Vec<String>,
    ) {
        let mut body = String::new();
        let mut children = Vec::new();
        let mut seen = HashSet::new();

        for field in &obj.fields {
            // The tag is consumed by the enclosing enum
            if in_variant && field.key == TYPENAME {
                continue;
            }
            let ident = dedupe(&mut seen, rust_field_name(&field.key));
            let named = self.field_type_name(ctx, prefix, field, used, &mut children);
            let mut rendered = wrap(&field.ty, &named);
            if field.conditional {
                if field.ty.is_non_null() {
                    rendered = format!("Option<{}>", rendered);
                }
                let _ = writeln!(body, "    #[serde(rename = \"{}\", default)]", field.key);
            } else {
                let _ = writeln!(body, "    #[serde(rename = \"{}\")]", field.key);
            }
            let _ = writeln!(body, "    pub {}: {},", ident, rendered);
        }

        let mut def = String::from("#[derive(Debug, Clone, PartialEq, Deserialize)]\n");
        if body.is_empty() {
            let _ = writeln!(def, "pub struct {} {{}}", name);
        } else {
            let _ = writeln!(def, "pub struct {} {{", name);
            def.push_str(&body);
            def.push_str("}\n");
        }
        defs.push(def);

        for child in children {
            match child {
                Child::Struct { name, obj } => self.response_struct(ctx, &name, &name, &obj, false, used, defs),
                Child::Enum { name, variants } => self.response_enum(ctx, &name, &variants, used, defs),
            }
        }
    }

    fn field_type_name(
        &self,
        ctx: &CodegenContext,
        prefix: &str,
        field: &FieldShape,
        used: &mut HashSet<String>,
        children: &mut Vec<Child>,
    ) -> String {
        match &field.shape {
            Shape::Leaf if field.is_typename() => "String".to_string(),
            Shape::Leaf => leaf_type(ctx, field.ty.named_type()),
            Shape::Object(obj) => {
                let name = dedupe(used, format!("{}{}", prefix, to_pascal_case(&field.key)));
                children.push(Child::Struct {
                    name: name.clone(),
                    obj: obj.clone(),
                });
                name
            }
            Shape::Abstract { variants, .. } => {
                let name = dedupe(used, format!("{}{}", prefix, to_pascal_case(&field.key)));
                children.push(Child::Enum {
                    name: name.clone(),
                    variants: variants.clone(),
                });
                name
            }
        }
    }

    fn response_enum(
        &self,
        ctx: &CodegenContext,
        name: &str,
        variants: &[ObjectShape],
        used: &mut HashSet<String>,
        defs: &mut Vec<String>,
    ) {
        let mut def = String::from("#[derive(Debug, Clone, PartialEq, Deserialize)]\n");
        def.push_str("#[serde(tag = \"__typename\")]\n");
        let _ = writeln!(def, "pub enum {} {{", name);

        let mut variant_names = HashSet::new();
        let mut structs = Vec::new();
        for variant in variants {
            let ident = dedupe(&mut variant_names, rust_ident(&variant.type_name));
            let struct_name = dedupe(used, format!("{}On{}", name, variant.type_name));
            if ident != variant.type_name {
                let _ = writeln!(def, "    #[serde(rename = \"{}\")]", variant.type_name);
            }
            let _ = writeln!(def, "    {}({}),", ident, struct_name);
            structs.push((struct_name, variant));
        }
        let fallback = dedupe(&mut variant_names, "Unknown".to_string());
        def.push_str("    #[serde(other)]\n");
        let _ = writeln!(def, "    {},", fallback);
        def.push_str("}\n");
        defs.push(def);

        for (struct_name, variant) in structs {
            self.response_struct(ctx, &struct_name, &struct_name, variant, true, used, defs);
        }
    }
}

enum Child {
    Struct { name: String, obj: ObjectShape },
    Enum { name: String, variants: Vec<ObjectShape> },
}

fn enum_type(out: &mut String, ty: &TypeDef, values: &[EnumValueDef]) {
    let members: Vec<String> = enum_member_names(values.iter().map(|v| v.name.as_str()))
        .into_iter()
        .map(|m| rust_ident(&m))
        .collect();

    out.push('\n');
    write_doc(out, "", &doc_lines(ty.description.as_deref(), None, "Deprecated:"));
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n");
    let _ = writeln!(out, "pub enum {} {{", ty.name);
    for (value, member) in values.iter().zip(&members) {
        write_doc(out, "    ", &doc_lines(value.description.as_deref(), None, "Deprecated:"));
        if let Some(reason) = &value.deprecation {
            let _ = writeln!(out, "    #[deprecated(note = {:?})]", reason);
        }
        let _ = writeln!(out, "    #[serde(rename = \"{}\")]", value.name);
        let _ = writeln!(out, "    {},", member);
    }
    out.push_str("}\n\n");

    let all: Vec<String> = members.iter().map(|m| format!("{}::{}", ty.name, m)).collect();
    let _ = writeln!(out, "impl {} {{", ty.name);
    let _ = writeln!(out, "    pub const ALL: &'static [{}] = &[{}];", ty.name, all.join(", "));
    out.push('\n');
    out.push_str("    pub fn as_str(&self) -> &'static str {\n");
    out.push_str("        match *self {\n");
    for (value, member) in values.iter().zip(&members) {
        let _ = writeln!(out, "            {}::{} => \"{}\",", ty.name, member, value.name);
    }
    out.push_str("        }\n    }\n}\n");
}

/// Names a response type must not take inside an operation module
///
/// Scalar aliases, enums and input structs are glob-imported from the
/// parent, so a response struct with the same name would shadow them.
fn reserved_type_names(ctx: &CodegenContext) -> HashSet<String> {
    let mut names: HashSet<String> = RESERVED_TYPE_NAMES.iter().map(|n| n.to_string()).collect();
    names.insert("ID".to_string());
    names.extend(ctx.schema.custom_scalars().into_iter().map(str::to_string));
    names.extend(
        ctx.schema
            .types
            .values()
            .filter(|t| matches!(t.kind, TypeDefKind::Enum(_) | TypeDefKind::InputObject(_)))
            .map(|t| t.name.clone()),
    );
    names
}

/// Rust type for a named leaf or input type
fn leaf_type(ctx: &CodegenContext, name: &str) -> String {
    if ctx.schema.is_scalar(name) && BUILTIN_SCALARS.contains(&name) && name != "ID" {
        ctx.scalars.get(name).to_string()
    } else {
        name.to_string()
    }
}

fn wrap(ty: &TypeRef, named: &str) -> String {
    match ty {
        TypeRef::NonNull(inner) => wrap_non_null(inner, named),
        _ => format!("Option<{}>", wrap_non_null(ty, named)),
    }
}

fn wrap_non_null(ty: &TypeRef, named: &str) -> String {
    match ty {
        TypeRef::NonNull(inner) => wrap_non_null(inner, named),
        TypeRef::List(inner) => format!("Vec<{}>", wrap(inner, named)),
        TypeRef::Named(_) => named.to_string(),
    }
}

/// Whether input type `from` contains `target` without a list in between
fn input_reaches(ctx: &CodegenContext, from: &str, target: &str, visited: &mut Vec<String>) -> bool {
    if from == target {
        return true;
    }
    if visited.iter().any(|v| v == from) {
        return false;
    }
    visited.push(from.to_string());
    ctx.schema.input_fields(from).is_some_and(|fields| {
        fields
            .iter()
            .filter(|f| !f.ty.is_list())
            .any(|f| input_reaches(ctx, f.ty.named_type(), target, visited))
    })
}

/// Smallest number of `#` that keeps `text` intact inside a raw string
fn raw_string_hashes(text: &str) -> usize {
    let mut longest = 0;
    for (i, _) in text.match_indices('"') {
        let run = text[i + 1..].chars().take_while(|&c| c == '#').count();
        longest = longest.max(run);
    }
    longest + 1
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| if l.is_empty() { "\n".to_string() } else { format!("    {}\n", l) })
        .collect()
}

fn write_doc(out: &mut String, indent: &str, lines: &[String]) {
    for line in lines {
        if line.is_empty() {
            let _ = writeln!(out, "{}///", indent);
        } else {
            let _ = writeln!(out, "{}/// {}", indent, line);
        }
    }
}
