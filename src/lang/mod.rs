pub mod ast;
pub mod context;
pub mod error;
pub mod eval;
pub mod functions;
pub mod kind;
pub mod parse;
pub mod runtime;
pub mod value;
pub mod variables;
