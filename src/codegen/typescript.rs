/// TypeScript output
///
/// Follows the conventions of the graphql-codegen `typescript`,
/// `typescript-operations` and `typed-document-node` plugins so the generated
/// module can replace theirs without touching call sites.

use super::naming::{enum_member_names, to_pascal_case};
use super::selection::{ObjectShape, Shape, ShapeResolver};
use super::{doc_lines, CodegenContext, Generator, GENERATED_HEADER};
use crate::documents::ast::document_ast;
use crate::documents::{FragmentDoc, OperationDoc, VariableDef};
use crate::error::Result;
use crate::schema::scalars::is_lossy_number;
use crate::schema::{EnumValueDef, InputValueDef, ObjectDef, TypeDef, TypeDefKind, TypeRef, BUILTIN_SCALARS};
use std::fmt::Write;

const IMPORT: &str = "import { TypedDocumentNode as DocumentNode } from '@graphql-typed-document-node/core';";

const HELPERS: &str = "export type Maybe<T> = T | null;
export type InputMaybe<T> = Maybe<T>;
export type Exact<T extends { [key: string]: unknown }> = { [K in keyof T]: T[K] };
";

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptGenerator {
    /// Emit enums as string-literal unions instead of `enum` declarations
    pub enums_as_types: bool,
    /// Nullable fields are `name: Maybe<T>` rather than `name?: Maybe<T>`
    pub avoid_optionals: bool,
}

#[derive(Clone, Copy)]
enum Side {
    Input,
    Output,
}

impl Side {
    fn key(self) -> &'static str {
        match self {
            Side::Input => "input",
            Side::Output => "output",
        }
    }
}

impl Generator for TypeScriptGenerator {
    fn generate(&self, ctx: &CodegenContext) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "// {}", GENERATED_HEADER);
        if !ctx.documents.operations.is_empty() {
            let _ = writeln!(out, "{}", IMPORT);
        }
        out.push_str(HELPERS);
        self.scalars(&mut out, ctx);

        for ty in ctx.schema.sorted_types() {
            match &ty.kind {
                TypeDefKind::Scalar => {}
                TypeDefKind::Enum(values) => self.enum_type(&mut out, ty, values),
                TypeDefKind::Object(obj) => {
                    self.object_type(&mut out, ctx, ty, obj, true);
                    self.args_types(&mut out, ctx, ty, obj);
                }
                TypeDefKind::Interface(obj) => {
                    self.object_type(&mut out, ctx, ty, obj, false);
                    self.args_types(&mut out, ctx, ty, obj);
                }
                TypeDefKind::Union(members) => {
                    out.push('\n');
                    write_doc(&mut out, "", &doc_lines(ty.description.as_deref(), None, "@deprecated"));
                    let members = if members.is_empty() { "never".to_string() } else { members.join(" | ") };
                    let _ = writeln!(out, "export type {} = {};", ty.name, members);
                }
                TypeDefKind::InputObject(fields) => {
                    out.push('\n');
                    write_doc(&mut out, "", &doc_lines(ty.description.as_deref(), None, "@deprecated"));
                    let _ = writeln!(out, "export type {} = {{", ty.name);
                    for field in fields {
                        self.input_value(&mut out, ctx, field);
                    }
                    out.push_str("};\n");
                }
            }
        }

        let resolver = ShapeResolver::new(ctx.schema, ctx.documents);
        for fragment in ctx.documents.fragments.values() {
            self.fragment(&mut out, ctx, &resolver, fragment);
        }
        for op in &ctx.documents.operations {
            self.operation(&mut out, ctx, &resolver, op)?;
        }

        Ok(out)
    }
}

impl TypeScriptGenerator {
    fn scalars(&self, out: &mut String, ctx: &CodegenContext) {
        out.push_str("/** All built-in and custom scalars, mapped to their actual values */\n");
        out.push_str("export type Scalars = {\n");

        let custom = ctx.schema.custom_scalars();
        for name in BUILTIN_SCALARS.iter().copied().chain(custom) {
            let host = ctx.scalars.get(name);
            let mut lines = doc_lines(
                ctx.schema.get(name).and_then(|t| t.description.as_deref()),
                None,
                "@deprecated",
            );
            if is_lossy_number(name, host) {
                lines.push("Serialized as a JS number: values beyond 2^53 lose precision".to_string());
            }
            write_doc(out, "  ", &lines);
            let _ = writeln!(out, "  {}: {{ input: {}; output: {}; }}", name, host, host);
        }
        out.push_str("};\n");
    }

    fn enum_type(&self, out: &mut String, ty: &TypeDef, values: &[EnumValueDef]) {
        out.push('\n');
        write_doc(out, "", &doc_lines(ty.description.as_deref(), None, "@deprecated"));

        if self.enums_as_types {
            let _ = write!(out, "export type {} =", ty.name);
            if values.is_empty() {
                out.push_str(" never");
            }
            for value in values {
                let _ = write!(out, "\n  | '{}'", value.name);
            }
            out.push_str(";\n");
            return;
        }

        let _ = writeln!(out, "export enum {} {{", ty.name);
        let members = enum_member_names(values.iter().map(|v| v.name.as_str()));
        for (i, (value, member)) in values.iter().zip(&members).enumerate() {
            write_doc(
                out,
                "  ",
                &doc_lines(value.description.as_deref(), value.deprecation.as_deref(), "@deprecated"),
            );
            let separator = if i + 1 < values.len() { "," } else { "" };
            let _ = writeln!(out, "  {} = '{}'{}", member, value.name, separator);
        }
        out.push_str("}\n");
    }

    fn object_type(&self, out: &mut String, ctx: &CodegenContext, ty: &TypeDef, obj: &ObjectDef, concrete: bool) {
        out.push('\n');
        write_doc(out, "", &doc_lines(ty.description.as_deref(), None, "@deprecated"));
        let _ = writeln!(out, "export type {} = {{", ty.name);
        if concrete {
            let _ = writeln!(out, "  __typename?: '{}';", ty.name);
        }
        for field in &obj.fields {
            write_doc(
                out,
                "  ",
                &doc_lines(field.description.as_deref(), field.deprecation.as_deref(), "@deprecated"),
            );
            let optional = !field.ty.is_non_null() && !self.avoid_optionals;
            let _ = writeln!(
                out,
                "  {}{}: {};",
                field.name,
                if optional { "?" } else { "" },
                schema_type(ctx, &field.ty, Side::Output)
            );
        }
        out.push_str("};\n");
    }

    fn args_types(&self, out: &mut String, ctx: &CodegenContext, ty: &TypeDef, obj: &ObjectDef) {
        for field in obj.fields.iter().filter(|f| !f.args.is_empty()) {
            out.push('\n');
            let _ = writeln!(out, "export type {}{}Args = {{", ty.name, to_pascal_case(&field.name));
            for arg in &field.args {
                self.input_value(out, ctx, arg);
            }
            out.push_str("};\n");
        }
    }

    fn input_value(&self, out: &mut String, ctx: &CodegenContext, value: &InputValueDef) {
        write_doc(out, "  ", &doc_lines(value.description.as_deref(), None, "@deprecated"));
        let (optional, rendered) = self.input_type(ctx, &value.ty, value.is_required());
        let _ = writeln!(out, "  {}{}: {};", value.name, if optional { "?" } else { "" }, rendered);
    }

    /// Input position type: required values are bare, the rest `InputMaybe`
    fn input_type(&self, ctx: &CodegenContext, ty: &TypeRef, required: bool) -> (bool, String) {
        if required {
            (false, bare_schema_type(ctx, ty, Side::Input))
        } else {
            (
                !self.avoid_optionals,
                format!("InputMaybe<{}>", bare_schema_type(ctx, ty.nullable(), Side::Input)),
            )
        }
    }

    fn variable(&self, out: &mut String, ctx: &CodegenContext, var: &VariableDef) {
        let (optional, rendered) = self.input_type(ctx, &var.ty, var.is_required());
        let _ = writeln!(out, "  {}{}: {};", var.name, if optional { "?" } else { "" }, rendered);
    }

    fn fragment(&self, out: &mut String, ctx: &CodegenContext, resolver: &ShapeResolver, fragment: &FragmentDoc) {
        let rendered = match resolver.fragment(fragment) {
            Shape::Object(obj) => self.object_literal(ctx, &obj),
            Shape::Abstract { variants, .. } => self.variants(ctx, &variants, false),
            Shape::Leaf => "never".to_string(),
        };
        out.push('\n');
        let _ = writeln!(out, "export type {}Fragment = {};", fragment.name, rendered);
    }

    fn operation(
        &self,
        out: &mut String,
        ctx: &CodegenContext,
        resolver: &ShapeResolver,
        op: &OperationDoc,
    ) -> Result<()> {
        let type_name = format!("{}{}", op.name, op.kind.suffix());

        out.push('\n');
        if op.variables.is_empty() {
            let _ = writeln!(out, "export type {}Variables = Exact<{{ [key: string]: never; }}>;", type_name);
        } else {
            let _ = writeln!(out, "export type {}Variables = Exact<{{", type_name);
            for var in &op.variables {
                self.variable(out, ctx, var);
            }
            out.push_str("}>;\n");
        }

        let shape = resolver.operation(op)?;
        out.push('\n');
        let _ = writeln!(out, "export type {} = {};", type_name, self.object_literal(ctx, &shape));

        let ast = serde_json::to_string(&document_ast(op, ctx.documents))?;
        out.push('\n');
        let _ = writeln!(
            out,
            "export const {}Document = {} as unknown as DocumentNode<{}, {}Variables>;",
            op.name, ast, type_name, type_name
        );
        Ok(())
    }

    fn object_literal(&self, ctx: &CodegenContext, obj: &ObjectShape) -> String {
        let mut parts = Vec::with_capacity(obj.fields.len() + 1);
        if !obj.selects_typename() {
            parts.push(format!("__typename?: '{}'", obj.type_name));
        }
        for field in &obj.fields {
            if field.is_typename() {
                let marker = if field.conditional { "?" } else { "" };
                parts.push(format!("{}{}: '{}'", field.key, marker, obj.type_name));
                continue;
            }
            let optional = field.conditional || (!field.ty.is_non_null() && !self.avoid_optionals);
            parts.push(format!(
                "{}{}: {}",
                field.key,
                if optional { "?" } else { "" },
                self.result_type(ctx, &field.ty, &field.shape)
            ));
        }
        format!("{{ {} }}", parts.join(", "))
    }

    fn result_type(&self, ctx: &CodegenContext, ty: &TypeRef, shape: &Shape) -> String {
        match ty {
            TypeRef::NonNull(inner) => self.bare_result_type(ctx, inner, shape),
            _ => format!("{} | null", self.bare_result_type(ctx, ty, shape)),
        }
    }

    fn bare_result_type(&self, ctx: &CodegenContext, ty: &TypeRef, shape: &Shape) -> String {
        match ty {
            TypeRef::NonNull(inner) => self.bare_result_type(ctx, inner, shape),
            TypeRef::List(inner) => format!("Array<{}>", self.result_type(ctx, inner, shape)),
            TypeRef::Named(name) => match shape {
                Shape::Leaf if ctx.schema.is_enum(name) => name.clone(),
                Shape::Leaf => ctx.scalars.get(name).to_string(),
                Shape::Object(obj) => self.object_literal(ctx, obj),
                Shape::Abstract { variants, .. } => self.variants(ctx, variants, true),
            },
        }
    }

    fn variants(&self, ctx: &CodegenContext, variants: &[ObjectShape], parenthesize: bool) -> String {
        match variants {
            [] => "never".to_string(),
            [single] => self.object_literal(ctx, single),
            _ => {
                let joined = variants
                    .iter()
                    .map(|v| self.object_literal(ctx, v))
                    .collect::<Vec<_>>()
                    .join(" | ");
                if parenthesize {
                    format!("({})", joined)
                } else {
                    joined
                }
            }
        }
    }
}

/// Schema type reference as used in type declarations
fn schema_type(ctx: &CodegenContext, ty: &TypeRef, side: Side) -> String {
    match ty {
        TypeRef::NonNull(inner) => bare_schema_type(ctx, inner, side),
        _ => {
            let wrapper = match side {
                Side::Input => "InputMaybe",
                Side::Output => "Maybe",
            };
            format!("{}<{}>", wrapper, bare_schema_type(ctx, ty, side))
        }
    }
}

fn bare_schema_type(ctx: &CodegenContext, ty: &TypeRef, side: Side) -> String {
    match ty {
        TypeRef::NonNull(inner) => bare_schema_type(ctx, inner, side),
        TypeRef::List(inner) => format!("Array<{}>", schema_type(ctx, inner, side)),
        TypeRef::Named(name) if ctx.schema.is_scalar(name) => format!("Scalars['{}']['{}']", name, side.key()),
        TypeRef::Named(name) => name.clone(),
    }
}

fn write_doc(out: &mut String, indent: &str, lines: &[String]) {
    let escaped: Vec<String> = lines.iter().map(|l| l.replace("*/", "*\\/")).collect();
    match escaped.as_slice() {
        [] => {}
        [line] => {
            let _ = writeln!(out, "{}/** {} */", indent, line);
        }
        _ => {
            let _ = writeln!(out, "{}/**", indent);
            for line in &escaped {
                if line.is_empty() {
                    let _ = writeln!(out, "{} *", indent);
                } else {
                    let _ = writeln!(out, "{} * {}", indent, line);
                }
            }
            let _ = writeln!(out, "{} */", indent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Target;
    use crate::documents::DocumentSet;
    use crate::schema::load_sdl;
    use std::collections::BTreeMap;

    const SDL: &str = r#"
        scalar Long
        scalar Date

        enum Gender { FEMALE MALE }
        enum EmploymentType { FULL_TIME PART_TIME @deprecated(reason: "Use FULL_TIME") }

        interface Person { id: ID! name: String }

        "A pupil"
        type Student implements Person {
            id: ID!
            name: String
            gender: Gender!
            birthDate: Date
            guardians: [Guardian!]!
        }
        type Guardian { name: String! phone: String }
        type Staff implements Person { id: ID! name: String employment: EmploymentType salary: Long }
        union Member = Student | Staff

        input StudentFilter { search: String gender: Gender limit: Int = 20 }

        type Query {
            students(filter: StudentFilter, first: Int!): [Student!]!
            members: [Member!]!
        }
    "#;

    const DOCS: &str = r#"
        query GetStudents($filter: StudentFilter, $first: Int!) {
            students(filter: $filter, first: $first) { ...StudentCore guardians { name } }
        }
        query Members { members { ... on Student { id } ... on Staff { salary } } }
        fragment StudentCore on Student { id pupilName: name gender }
    "#;

    fn generate(generator: TypeScriptGenerator) -> String {
        let schema = load_sdl(SDL).unwrap();
        let documents = DocumentSet::parse(DOCS, "ops.graphql").unwrap();
        let ctx = CodegenContext::new(&schema, &documents, Target::TypeScript, &BTreeMap::new());
        generator.generate(&ctx).unwrap()
    }

    #[test]
    fn test_header_and_helpers() {
        let out = generate(TypeScriptGenerator::default());
        assert!(out.starts_with("// Generated by gqlmirror"));
        assert!(out.contains(IMPORT));
        assert!(out.contains("export type Maybe<T> = T | null;"));
        assert!(out.contains("  Long: { input: number; output: number; }"));
        assert!(out.contains("  Date: { input: string; output: string; }"));
        assert!(out.contains("values beyond 2^53 lose precision"));
    }

    #[test]
    fn test_enum_declarations() {
        let out = generate(TypeScriptGenerator::default());
        assert!(out.contains("export enum Gender {\n  Female = 'FEMALE',\n  Male = 'MALE'\n}"));
        assert!(out.contains("  /** @deprecated Use FULL_TIME */\n  PartTime = 'PART_TIME'\n"));

        let out = generate(TypeScriptGenerator {
            enums_as_types: true,
            ..Default::default()
        });
        assert!(out.contains("export type Gender =\n  | 'FEMALE'\n  | 'MALE';"));
    }

    #[test]
    fn test_object_and_input_types() {
        let out = generate(TypeScriptGenerator::default());
        assert!(out.contains("/** A pupil */\nexport type Student = {\n  __typename?: 'Student';\n  id: Scalars['ID']['output'];\n  name?: Maybe<Scalars['String']['output']>;\n  gender: Gender;\n"));
        assert!(out.contains("  guardians: Array<Guardian>;"));
        assert!(out.contains("export type Member = Student | Staff;"));
        assert!(out.contains("export type StudentFilter = {\n  search?: InputMaybe<Scalars['String']['input']>;"));
        assert!(out.contains("  limit?: InputMaybe<Scalars['Int']['input']>;"));
        assert!(out.contains("export type QueryStudentsArgs = {\n  filter?: InputMaybe<StudentFilter>;\n  first: Scalars['Int']['input'];\n};"));
    }

    #[test]
    fn test_avoid_optionals() {
        let out = generate(TypeScriptGenerator {
            avoid_optionals: true,
            ..Default::default()
        });
        assert!(out.contains("  name: Maybe<Scalars['String']['output']>;"));
        assert!(out.contains("  search: InputMaybe<Scalars['String']['input']>;"));
    }

    #[test]
    fn test_operation_types() {
        let out = generate(TypeScriptGenerator::default());
        assert!(out.contains(
            "export type GetStudentsQueryVariables = Exact<{\n  filter?: InputMaybe<StudentFilter>;\n  first: Scalars['Int']['input'];\n}>;"
        ));
        assert!(out.contains(
            "export type GetStudentsQuery = { __typename?: 'Query', students: Array<{ __typename?: 'Student', id: string, pupilName?: string | null, gender: Gender, guardians: Array<{ __typename?: 'Guardian', name: string }> }> };"
        ));
        assert!(out.contains("export type MembersQueryVariables = Exact<{ [key: string]: never; }>;"));
        assert!(out.contains(
            "members: Array<({ __typename?: 'Staff', salary?: number | null } | { __typename?: 'Student', id: string })>"
        ));
        assert!(out.contains(
            "export type StudentCoreFragment = { __typename?: 'Student', id: string, pupilName?: string | null, gender: Gender };"
        ));
    }

    #[test]
    fn test_document_constant() {
        let out = generate(TypeScriptGenerator::default());
        let line = out
            .lines()
            .find(|l| l.starts_with("export const GetStudentsDocument = "))
            .unwrap();
        assert!(line.ends_with(" as unknown as DocumentNode<GetStudentsQuery, GetStudentsQueryVariables>;"));
        assert!(line.contains(r#"{"kind":"Document","definitions":[{"kind":"OperationDefinition","operation":"query""#));
        assert!(line.contains(r#""kind":"FragmentDefinition""#));
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(generate(TypeScriptGenerator::default()), generate(TypeScriptGenerator::default()));
    }
}
