use std::path::Path;

use log::{debug, info};

use crate::lang::ast::Program;
use crate::lang::context::{Context, Limits};
use crate::lang::error::Error;
use crate::lang::eval::execute_program;
use crate::lang::parse::{parse, parse_named};
use crate::lang::value::Value;

/// Outcome of one run
///
/// Parse and evaluation failures are kept apart so callers (eg. the CLI) can report them
/// differently.
#[derive(Debug, PartialEq)]
pub enum RunResult {
    /// Value of the program's return statement, if it had one
    Ok(Option<Value>),
    ParseErr(Error),
    EvalErr(Error),
}

pub struct Runtime {
    limits: Limits,
}

impl Runtime {
    /// Create a new `Runtime` instance
    ///
    /// Every run gets a fresh [`Context`] built from `limits`, so nothing leaks between programs.
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn run(&self, program: &Program) -> RunResult {
        let mut ctx = Context::new(self.limits);
        match execute_program(program, &mut ctx) {
            Ok(v) => {
                info!("program finished");
                RunResult::Ok(v)
            }
            Err(e) => RunResult::EvalErr(e),
        }
    }

    /// Parse and run a JSON document
    pub fn run_str(&self, input: &str) -> RunResult {
        match parse(input) {
            Ok(program) => self.run(&program),
            Err(e) => RunResult::ParseErr(e),
        }
    }

    /// Parse and run a JSON document read from `file`
    ///
    /// Parse errors carry `file` as their location.
    pub fn run_source(&self, input: &str, file: &Path) -> RunResult {
        debug!("parsing {}", file.display());
        match parse_named(input, file) {
            Ok(program) => self.run(&program),
            Err(e) => RunResult::ParseErr(e),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

#[test]
fn test_run_str() {
    use crate::lang::error::ErrorKind;

    let rt = Runtime::default();
    assert_eq!(
        rt.run_str(r#"{"program": {"return": {"expression": {"number": 42}}}}"#),
        RunResult::Ok(Some(Value::from(42)))
    );
    assert_eq!(
        rt.run_str(r#"{"program": {"if": {"expression": {"boolean": false}, "return": {"number": 1}}}}"#),
        RunResult::Ok(None)
    );

    match rt.run_str(r#"{"program": "#) {
        RunResult::ParseErr(e) => assert_eq!(e.kind, ErrorKind::InvalidSyntax),
        r => panic!("Expected parse error, got {:?}", r),
    }

    match rt.run_str(r#"{"program": {"return": {"variable_access": {"name": "nope"}}}}"#) {
        RunResult::EvalErr(e) => assert_eq!(e.kind, ErrorKind::UndefinedVariable),
        r => panic!("Expected eval error, got {:?}", r),
    }
}

#[test]
fn test_runs_are_isolated() {
    let rt = Runtime::default();
    let define = r#"{"program": {
        "function_definition": {"name": "f", "statement": {"return": {"number": 1}}},
        "return": {"function_call": {"name": "f"}}
    }}"#;
    let call = r#"{"program": {"return": {"function_call": {"name": "f"}}}}"#;

    assert_eq!(rt.run_str(define), RunResult::Ok(Some(Value::from(1))));
    match rt.run_str(call) {
        RunResult::EvalErr(_) => (),
        r => panic!("Function leaked between runs: {:?}", r),
    }
}
