//! arbor evaluates programs handed to it as JSON-encoded syntax trees
//!
//! The interesting parts live in [`lang`]: [`lang::parse`] turns a JSON document into a
//! [`lang::ast::Program`], and [`lang::eval`] walks it against a [`lang::context::Context`].
//! [`lang::runtime::Runtime`] ties both together for one run.

pub mod lang;
