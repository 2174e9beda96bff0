use std::convert::TryFrom;
use std::fmt;

use lazy_static::lazy_static;

use crate::fail;
use crate::lang::error::{Error, Result};

/// Every tag the JSON front end recognizes
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NodeKind {
    Program,
    Return,
    If,
    Statement,
    Expression,
    VariableDeclaration,
    VariableAccess,
    FunctionDefinition,
    FunctionCall,
    BuiltInFunction,
    Parameter,
    Number,
    String,
    Boolean,
    Name,
    Value,
    Equality,
    Plus,
    Minus,
}

impl NodeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::Return => "return",
            NodeKind::If => "if",
            NodeKind::Statement => "statement",
            NodeKind::Expression => "expression",
            NodeKind::VariableDeclaration => "variable_declaration",
            NodeKind::VariableAccess => "variable_access",
            NodeKind::FunctionDefinition => "function_definition",
            NodeKind::FunctionCall => "function_call",
            NodeKind::BuiltInFunction => "built_in_function",
            NodeKind::Parameter => "parameter",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Boolean => "boolean",
            NodeKind::Name => "name",
            NodeKind::Value => "value",
            NodeKind::Equality => "equality",
            NodeKind::Plus => "plus",
            NodeKind::Minus => "minus",
        }
    }
}

impl TryFrom<&str> for NodeKind {
    type Error = Error;

    fn try_from(tag: &str) -> Result<Self> {
        match NODE_KINDS.iter().find(|k| k.tag() == tag) {
            Some(k) => Ok(*k),
            None => fail!(InvalidSyntax, "Unknown node type '{}'", tag),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

lazy_static! {
    pub static ref NODE_KINDS: Vec<NodeKind> = vec![
        NodeKind::Program,
        NodeKind::Return,
        NodeKind::If,
        NodeKind::Statement,
        NodeKind::Expression,
        NodeKind::VariableDeclaration,
        NodeKind::VariableAccess,
        NodeKind::FunctionDefinition,
        NodeKind::FunctionCall,
        NodeKind::BuiltInFunction,
        NodeKind::Parameter,
        NodeKind::Number,
        NodeKind::String,
        NodeKind::Boolean,
        NodeKind::Name,
        NodeKind::Value,
        NodeKind::Equality,
        NodeKind::Plus,
        NodeKind::Minus,
    ];
}

#[test]
fn test_tags_unique() {
    let mut tags: Vec<&str> = NODE_KINDS.iter().map(|k| k.tag()).collect();
    tags.sort_unstable();
    tags.dedup();
    assert_eq!(tags.len(), NODE_KINDS.len());
}

#[test]
fn test_tag_roundtrip() {
    for kind in &*NODE_KINDS {
        assert_eq!(NodeKind::try_from(kind.tag()).unwrap(), *kind);
    }

    assert!(NodeKind::try_from("while").is_err());
}
