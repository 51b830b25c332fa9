/// Schema loading and the scalar mapping table
///
/// This module turns SDL files or a live endpoint into a `SchemaModel`, the
/// single source every generator, checker and the mock server read from.

mod introspection;
mod loader;
mod model;
mod remote;
pub mod scalars;
mod sdl;

pub use introspection::{IntrospectionResponse, IntrospectionSchema, INTROSPECTION_QUERY};
pub use loader::{load_sdl, load_sdl_file, parse_literal};
pub use model::{
    EnumValueDef, FieldDef, InputValueDef, ObjectDef, OperationKind, SchemaModel, TypeDef, TypeDefKind,
    TypeRef, BUILTIN_SCALARS,
};
pub use remote::RemoteSchema;
pub use scalars::ScalarTable;
pub use sdl::print_sdl;
