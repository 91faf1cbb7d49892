pub mod api;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod ir;
pub mod runtime;
pub mod syntax;
pub mod types;

// Re-exports: short `crate::X` paths for the front end
pub use config::project;
pub use syntax::lexeme;
pub use syntax::lexer;
pub use syntax::parser;
pub use syntax::span;

// Re-export public API: `cuda2rs::generate_file()` etc.
pub use api::*;
