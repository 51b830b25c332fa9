pub mod check;
pub mod codegen;
pub mod config;
pub mod documents;
pub mod error;
pub mod mock;
pub mod schema;

// Re-export commonly used types
pub use codegen::{generate_all, GeneratedFile, Target};
pub use config::{MirrorConfig, OutputConfig, ServerConfig};
pub use documents::DocumentSet;
pub use error::{MirrorError, Result};
pub use mock::MockSchema;
pub use schema::{RemoteSchema, SchemaModel};
