//! Syntax tree handed to the evaluator
//!
//! Child counts are not validated when the tree is built. A node keeps every child the front end
//! saw (eg. all operator markers of a built-in function) so the evaluator can report exactly which
//! constraint a malformed tree violated. Tags that have no meaning in a given position are kept as
//! `Invalid` variants for the same reason.

use std::fmt;
use std::rc::Rc;

use crate::lang::kind::NodeKind;
use crate::lang::value::Value;

#[derive(Debug, PartialEq, Hash, PartialOrd, Ord, Eq, Clone)]
pub struct Identifier(pub String);

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier(s.to_string())
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    /// `==`
    Equality,
    /// `+`
    Plus,
    /// `-`
    Minus,
}

impl Operator {
    pub fn op_str(&self) -> &str {
        match self {
            Operator::Equality => "==",
            Operator::Plus => "+",
            Operator::Minus => "-",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct BuiltInFunction {
    pub operators: Vec<Operator>,
    pub operands: Vec<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionCall {
    pub name: Option<Identifier>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(Value),
    VariableAccess(Option<Identifier>),
    FunctionCall(FunctionCall),
    BuiltInFunction(BuiltInFunction),
    /// Raw parameter token, returned as is
    Parameter(Value),
    /// Wrapper with zero or several expression tags
    Malformed(usize),
    /// Tag that is not an expression
    Invalid(NodeKind),
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDefinition {
    pub name: Option<Identifier>,
    pub parameters: Vec<Identifier>,
    pub body: Rc<[Statement]>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct If {
    pub conditions: Vec<Expression>,
    pub body: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum DeclaredValue {
    Literal(Value),
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct VariableDeclaration {
    pub name: Option<Identifier>,
    pub value: Option<DeclaredValue>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    FunctionDefinition(FunctionDefinition),
    If(If),
    Return(Expression),
    VariableDeclaration(VariableDeclaration),
    Expression(Expression),
    /// Wrapper with zero or several statement tags
    Malformed(usize),
    /// Tag that is not a statement
    Invalid(NodeKind),
}

/// Top level of a program
///
/// Only a subset of statements may appear here; anything else is kept as `Invalid` and rejected
/// when executed.
#[derive(Debug, PartialEq, Clone)]
pub enum ProgramItem {
    FunctionDefinition(FunctionDefinition),
    Return(Expression),
    If(If),
    Invalid(NodeKind),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub items: Vec<ProgramItem>,
}
