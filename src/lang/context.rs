use crate::lang::functions::{Functions, TableId};
use crate::lang::value::Value;
use crate::lang::variables::{ScopeId, Variables};

/// Default ceiling on nested user function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// Resource limits for one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub max_call_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Everything one interpretation run owns
///
/// `scope` and `table` name the frame currently executing. They start at the roots and move for
/// the duration of each function call.
pub struct Context {
    pub variables: Variables<Value>,
    pub functions: Functions,
    pub scope: ScopeId,
    pub table: TableId,
    pub depth: usize,
    pub limits: Limits,
}

impl Context {
    pub fn new(limits: Limits) -> Self {
        let variables = Variables::new();
        let functions = Functions::new();
        let scope = variables.root();
        let table = functions.root();

        Self {
            variables,
            functions,
            scope,
            table,
            depth: 0,
            limits,
        }
    }

    pub fn root_scope(&self) -> ScopeId {
        self.variables.root()
    }

    pub fn root_table(&self) -> TableId {
        self.functions.root()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}
