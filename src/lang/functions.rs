use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::lang::ast::{Identifier, Statement};
use crate::lang::variables::ScopeId;

/// Index of a table inside a [`Functions`] arena
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TableId(usize);

/// A user-defined function
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: Rc<[Statement]>,
    /// Scope in effect where the function was defined
    pub scope: ScopeId,
    /// Table in effect where the function was defined
    pub table: TableId,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.0.as_str()).collect();
        write!(f, "{}({})", self.name, params.join(", "))
    }
}

struct FunctionTable {
    inner: BTreeMap<Identifier, Function>,
    parent: Option<TableId>,
}

/// Arena of chained function tables
///
/// Same discipline as [`crate::lang::variables::Variables`]: one root table for the run, child
/// tables pushed per call and released with [`Functions::truncate`].
pub struct Functions {
    tables: Vec<FunctionTable>,
}

impl Functions {
    pub fn new() -> Self {
        Functions {
            tables: vec![FunctionTable {
                inner: BTreeMap::default(),
                parent: None,
            }],
        }
    }

    pub fn root(&self) -> TableId {
        TableId(0)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn push_table(&mut self, parent: TableId) -> TableId {
        assert!(parent.0 < self.tables.len());
        self.tables.push(FunctionTable {
            inner: BTreeMap::default(),
            parent: Some(parent),
        });

        TableId(self.tables.len() - 1)
    }

    pub fn truncate(&mut self, len: usize) {
        assert!(len >= 1, "root function table must outlive the run");
        self.tables.truncate(len);
    }

    /// Register `name` in `table`, replacing any earlier definition
    pub fn define(
        &mut self,
        table: TableId,
        name: Identifier,
        parameters: Vec<Identifier>,
        body: Rc<[Statement]>,
        scope: ScopeId,
    ) {
        let func = Function {
            name: name.clone(),
            parameters,
            body,
            scope,
            table,
        };

        if let Some(old) = self.tables[table.0].inner.insert(name, func) {
            debug!("redefined function {}", old);
        }
    }

    pub fn lookup(&self, table: TableId, name: &Identifier) -> Option<&Function> {
        let mut cur = Some(table);
        while let Some(id) = cur {
            let table = &self.tables[id.0];
            if let Some(func) = table.inner.get(name) {
                return Some(func);
            }
            cur = table.parent;
        }

        None
    }

    pub fn call_arity(&self, table: TableId, name: &Identifier) -> Option<usize> {
        self.lookup(table, name).map(Function::arity)
    }
}

impl Default for Functions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn params(names: &[&str]) -> Vec<Identifier> {
    names.iter().map(|n| Identifier::from(*n)).collect()
}

#[cfg(test)]
fn body() -> Rc<[Statement]> {
    use crate::lang::ast::Expression;
    use crate::lang::value::Value;

    Rc::from(vec![Statement::Return(Expression::Literal(Value::from(0)))])
}

#[test]
fn test_define_and_lookup() {
    use crate::lang::variables::Variables;

    let vars: Variables<()> = Variables::new();
    let mut funcs = Functions::new();
    let root = funcs.root();

    funcs.define(
        root,
        Identifier::from("add"),
        params(&["a", "b"]),
        body(),
        vars.root(),
    );

    let f = funcs.lookup(root, &Identifier::from("add")).unwrap();
    assert_eq!(f.to_string(), "add(a, b)");
    assert_eq!(f.scope, vars.root());
    assert_eq!(funcs.call_arity(root, &Identifier::from("add")), Some(2));
    assert_eq!(funcs.call_arity(root, &Identifier::from("sub")), None);
}

#[test]
fn test_redefine() {
    use crate::lang::variables::Variables;

    let vars: Variables<()> = Variables::new();
    let mut funcs = Functions::new();
    let root = funcs.root();
    let body = body();

    funcs.define(root, Identifier::from("f"), params(&["a"]), body.clone(), vars.root());
    funcs.define(root, Identifier::from("f"), params(&[]), body, vars.root());

    assert_eq!(funcs.call_arity(root, &Identifier::from("f")), Some(0));
}

#[test]
fn test_nested_tables() {
    use crate::lang::variables::Variables;

    let vars: Variables<()> = Variables::new();
    let mut funcs = Functions::new();
    let root = funcs.root();
    let len = funcs.len();
    let body = body();

    funcs.define(root, Identifier::from("outer"), params(&[]), body.clone(), vars.root());
    let child = funcs.push_table(root);
    funcs.define(child, Identifier::from("inner"), params(&["x"]), body, vars.root());

    assert!(funcs.lookup(child, &Identifier::from("outer")).is_some());
    assert!(funcs.lookup(child, &Identifier::from("inner")).is_some());
    assert!(funcs.lookup(root, &Identifier::from("inner")).is_none());

    funcs.truncate(len);
    assert_eq!(funcs.len(), 1);
}
