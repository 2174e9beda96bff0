//! JSON front end
//!
//! A program is a JSON document in which every node is an object mapping a tag to its payload, eg.
//! `{"program": {"return": {"expression": {"number": 42}}}}`. Sibling children of the same kind
//! can be written as repeated keys or as an array under one key. Both keep document order, which
//! matters for statements, parameters and operands.
//!
//! `serde_json::Value` would collapse repeated keys, so the document is first read into a
//! [`RawNode`] that keeps every map entry, then lowered into the [`ast`](crate::lang::ast).

use std::convert::TryFrom;
use std::fmt;
use std::path::Path;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::fail;
use crate::lang::ast::*;
use crate::lang::error::{Error, ErrorKind, Result};
use crate::lang::kind::NodeKind;
use crate::lang::value::{Number, Value};

#[derive(Debug, PartialEq)]
enum RawNode {
    Null,
    Scalar(Value),
    List(Vec<RawNode>),
    /// Entries in document order, duplicates kept
    Map(Vec<(String, RawNode)>),
}

struct RawNodeVisitor;

impl<'de> Visitor<'de> for RawNodeVisitor {
    type Value = RawNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a syntax tree node")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<RawNode, E> {
        Ok(RawNode::Null)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> std::result::Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Boolean(b)))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> std::result::Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Number(Number::Integer(i))))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> std::result::Result<RawNode, E> {
        match i64::try_from(u) {
            Ok(i) => Ok(RawNode::Scalar(Value::Number(Number::Integer(i)))),
            Err(_) => Err(E::custom(format!("integer {} is out of range", u))),
        }
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> std::result::Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::Number(Number::Float(f))))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> std::result::Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::String(s.to_string())))
    }

    fn visit_string<E: de::Error>(self, s: String) -> std::result::Result<RawNode, E> {
        Ok(RawNode::Scalar(Value::String(s)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<RawNode, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }

        Ok(RawNode::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawNode, A::Error> {
        let mut entries = Vec::new();
        while let Some(entry) = map.next_entry::<String, RawNode>()? {
            entries.push(entry);
        }

        Ok(RawNode::Map(entries))
    }
}

impl<'de> Deserialize<'de> for RawNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(RawNodeVisitor)
    }
}

fn is_operator(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Equality | NodeKind::Plus | NodeKind::Minus)
}

/// Children of a structural node, with arrays flattened into repeated entries
fn children(node: &RawNode, parent: NodeKind) -> Result<Vec<(NodeKind, &RawNode)>> {
    let entries = match node {
        RawNode::Map(entries) => entries,
        _ => fail!(InvalidSyntax, "'{}' node must be an object", parent),
    };

    let mut ret = Vec::with_capacity(entries.len());
    for (tag, payload) in entries {
        let kind = NodeKind::try_from(tag.as_str())?;
        match payload {
            // An empty array would make an operator tag disappear
            RawNode::List(items) if items.is_empty() && is_operator(kind) => fail!(
                InvalidSyntax,
                "Operator '{}' in '{}' has an empty array payload",
                kind,
                parent
            ),
            RawNode::List(items) => ret.extend(items.iter().map(|item| (kind, item))),
            p => ret.push((kind, p)),
        }
    }

    Ok(ret)
}

fn lower_scalar(node: &RawNode, kind: NodeKind) -> Result<Value> {
    let val = match (kind, node) {
        (NodeKind::Number, RawNode::Scalar(v @ Value::Number(_)))
        | (NodeKind::String, RawNode::Scalar(v @ Value::String(_)))
        | (NodeKind::Boolean, RawNode::Scalar(v @ Value::Boolean(_)))
        | (NodeKind::Value, RawNode::Scalar(v))
        | (NodeKind::Parameter, RawNode::Scalar(v)) => v.clone(),
        _ => fail!(
            InvalidSyntax,
            "'{}' node has a payload of the wrong type",
            kind
        ),
    };

    Ok(val)
}

fn lower_name(node: &RawNode) -> Result<Identifier> {
    match node {
        RawNode::Scalar(Value::String(s)) => Ok(Identifier(s.clone())),
        _ => fail!(InvalidSyntax, "'name' must be a string"),
    }
}

/// Record a name attribute, rejecting a second one
fn set_name(slot: &mut Option<Identifier>, node: &RawNode, parent: NodeKind) -> Result<()> {
    if slot.is_some() {
        fail!(InvalidSyntax, "'{}' node has more than one name", parent);
    }
    *slot = Some(lower_name(node)?);

    Ok(())
}

/// Lower the payload of an `expression` wrapper (or anything used in its place)
fn lower_expression(node: &RawNode) -> Result<Expression> {
    let nodes = children(node, NodeKind::Expression)?;
    let (kind, payload) = match nodes.as_slice() {
        [child] => *child,
        c => return Ok(Expression::Malformed(c.len())),
    };

    let expr = match kind {
        NodeKind::Expression => lower_expression(payload)?,
        NodeKind::Number | NodeKind::String | NodeKind::Boolean => {
            Expression::Literal(lower_scalar(payload, kind)?)
        }
        NodeKind::Parameter => Expression::Parameter(lower_scalar(payload, kind)?),
        NodeKind::VariableAccess => {
            let mut name = None;
            for (kind, child) in children(payload, NodeKind::VariableAccess)? {
                match kind {
                    NodeKind::Name => set_name(&mut name, child, NodeKind::VariableAccess)?,
                    k => fail!(InvalidSyntax, "Unexpected '{}' node in variable_access", k),
                }
            }

            Expression::VariableAccess(name)
        }
        NodeKind::FunctionCall => Expression::FunctionCall(lower_function_call(payload)?),
        NodeKind::BuiltInFunction => {
            Expression::BuiltInFunction(lower_built_in_function(payload)?)
        }
        k => Expression::Invalid(k),
    };

    Ok(expr)
}

fn lower_function_call(node: &RawNode) -> Result<FunctionCall> {
    let mut name = None;
    let mut arguments = Vec::new();

    for (kind, child) in children(node, NodeKind::FunctionCall)? {
        match kind {
            NodeKind::Name => set_name(&mut name, child, NodeKind::FunctionCall)?,
            NodeKind::Expression => arguments.push(lower_expression(child)?),
            k => fail!(InvalidSyntax, "Unexpected '{}' node in function_call", k),
        }
    }

    Ok(FunctionCall { name, arguments })
}

fn lower_built_in_function(node: &RawNode) -> Result<BuiltInFunction> {
    let mut operators = Vec::new();
    let mut operands = Vec::new();

    for (kind, child) in children(node, NodeKind::BuiltInFunction)? {
        match kind {
            // Operator payloads carry no information
            NodeKind::Equality => operators.push(Operator::Equality),
            NodeKind::Plus => operators.push(Operator::Plus),
            NodeKind::Minus => operators.push(Operator::Minus),
            NodeKind::Expression => operands.push(lower_expression(child)?),
            k => fail!(InvalidSyntax, "Unexpected '{}' node in built_in_function", k),
        }
    }

    Ok(BuiltInFunction {
        operators,
        operands,
    })
}

fn lower_function_definition(node: &RawNode) -> Result<FunctionDefinition> {
    let mut name = None;
    let mut parameters = Vec::new();
    let mut body = Vec::new();

    for (kind, child) in children(node, NodeKind::FunctionDefinition)? {
        match kind {
            NodeKind::Name => set_name(&mut name, child, NodeKind::FunctionDefinition)?,
            NodeKind::Parameter => match child {
                RawNode::Scalar(Value::String(p)) => parameters.push(Identifier(p.clone())),
                _ => fail!(InvalidSyntax, "Function parameter must be a string"),
            },
            k => body.push(lower_statement_kind(k, child)?),
        }
    }

    Ok(FunctionDefinition {
        name,
        parameters,
        body: body.into(),
    })
}

fn lower_if(node: &RawNode) -> Result<If> {
    let mut conditions = Vec::new();
    let mut body = Vec::new();

    for (kind, child) in children(node, NodeKind::If)? {
        match kind {
            NodeKind::Expression => conditions.push(lower_expression(child)?),
            k => body.push(lower_statement_kind(k, child)?),
        }
    }

    Ok(If { conditions, body })
}

fn lower_variable_declaration(node: &RawNode) -> Result<VariableDeclaration> {
    let mut name = None;
    let mut value = None;

    for (kind, child) in children(node, NodeKind::VariableDeclaration)? {
        let val = match kind {
            NodeKind::Name => {
                set_name(&mut name, child, NodeKind::VariableDeclaration)?;
                continue;
            }
            NodeKind::Value => DeclaredValue::Literal(lower_scalar(child, kind)?),
            NodeKind::Expression => DeclaredValue::Expression(lower_expression(child)?),
            k => fail!(InvalidSyntax, "Unexpected '{}' node in variable_declaration", k),
        };

        if value.is_some() {
            fail!(InvalidSyntax, "'variable_declaration' node has more than one value");
        }
        value = Some(val);
    }

    Ok(VariableDeclaration { name, value })
}

/// Lower a statement given its tag
///
/// Accepts both the `statement` wrapper and bare statement tags.
fn lower_statement_kind(kind: NodeKind, node: &RawNode) -> Result<Statement> {
    let stmt = match kind {
        NodeKind::Statement => {
            let nodes = children(node, NodeKind::Statement)?;
            match nodes.as_slice() {
                [(k, child)] => lower_statement_kind(*k, child)?,
                c => Statement::Malformed(c.len()),
            }
        }
        NodeKind::FunctionDefinition => {
            Statement::FunctionDefinition(lower_function_definition(node)?)
        }
        NodeKind::If => Statement::If(lower_if(node)?),
        NodeKind::Return => Statement::Return(lower_expression(node)?),
        NodeKind::VariableDeclaration => {
            Statement::VariableDeclaration(lower_variable_declaration(node)?)
        }
        NodeKind::Expression => Statement::Expression(lower_expression(node)?),
        k => Statement::Invalid(k),
    };

    Ok(stmt)
}

fn lower_program(node: &RawNode) -> Result<Program> {
    let mut items = Vec::new();

    for (kind, child) in children(node, NodeKind::Program)? {
        let item = match kind {
            NodeKind::FunctionDefinition => {
                ProgramItem::FunctionDefinition(lower_function_definition(child)?)
            }
            NodeKind::Return => ProgramItem::Return(lower_expression(child)?),
            NodeKind::If => ProgramItem::If(lower_if(child)?),
            k => ProgramItem::Invalid(k),
        };
        items.push(item);
    }

    Ok(Program { items })
}

fn lower_root(root: &RawNode) -> Result<Program> {
    let entries = match root {
        RawNode::Map(entries) => entries,
        _ => fail!(InvalidSyntax, "Expected program start token"),
    };

    match entries.as_slice() {
        [(tag, program)] if tag.as_str() == NodeKind::Program.tag() => lower_program(program),
        [(tag, _)] => fail!(
            InvalidSyntax,
            "Expected program start token, found '{}'",
            tag
        ),
        e => fail!(
            InvalidSyntax,
            "Expected a single program node, found {} top-level nodes",
            e.len()
        ),
    }
}

fn json_error(e: serde_json::Error) -> Error {
    Error::new(ErrorKind::InvalidSyntax, e.to_string())
}

/// Parse a JSON document into a program
pub fn parse(input: &str) -> Result<Program> {
    let root: RawNode = serde_json::from_str(input).map_err(json_error)?;
    lower_root(&root)
}

/// Like [`parse`], but errors carry `file` as their location
///
/// JSON syntax errors report the line serde found them on. Tree shape errors name only the
/// file, since the raw tree holds no positions.
pub fn parse_named(input: &str, file: &Path) -> Result<Program> {
    let root: RawNode = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => {
            let line = e.line();
            return Err(json_error(e).with_location(file, Some(line)));
        }
    };

    lower_root(&root).map_err(|e| e.with_location(file, None))
}

#[cfg(test)]
fn num(i: i64) -> Expression {
    Expression::Literal(Value::from(i))
}

#[test]
fn test_return_literal() {
    let prog = parse(r#"{"program": {"return": {"expression": {"number": 42}}}}"#).unwrap();
    assert_eq!(
        prog,
        Program {
            items: vec![ProgramItem::Return(num(42))]
        }
    );

    let prog = parse(r#"{"program": {"return": {"string": "hi"}}}"#).unwrap();
    assert_eq!(
        prog.items,
        vec![ProgramItem::Return(Expression::Literal(Value::from("hi")))]
    );
}

#[test]
fn test_repeated_keys_keep_order() {
    let with_array = parse(
        r#"{"program": {"return": {"expression": {"built_in_function": {
            "minus": null,
            "expression": [{"number": 10}, {"number": 4}]
        }}}}}"#,
    )
    .unwrap();

    let with_repeats = parse(
        r#"{"program": {"return": {"expression": {"built_in_function": {
            "expression": {"number": 10},
            "minus": {},
            "expression": {"number": 4}
        }}}}}"#,
    )
    .unwrap();

    let expected = Program {
        items: vec![ProgramItem::Return(Expression::BuiltInFunction(
            BuiltInFunction {
                operators: vec![Operator::Minus],
                operands: vec![num(10), num(4)],
            },
        ))],
    };

    assert_eq!(with_array, expected);
    assert_eq!(with_repeats, expected);
}

#[test]
fn test_function_definition() {
    let prog = parse(
        r#"{"program": {
            "function_definition": {
                "name": "add",
                "parameter": "a",
                "parameter": "b",
                "statement": {"return": {"expression": {"built_in_function": {
                    "plus": null,
                    "expression": [
                        {"variable_access": {"name": "a"}},
                        {"variable_access": {"name": "b"}}
                    ]
                }}}}
            },
            "return": {"expression": {"function_call": {
                "name": "add",
                "expression": [{"number": 3}, {"number": 4}]
            }}}
        }}"#,
    )
    .unwrap();

    let add = FunctionDefinition {
        name: Some(Identifier::from("add")),
        parameters: vec![Identifier::from("a"), Identifier::from("b")],
        body: vec![Statement::Return(Expression::BuiltInFunction(
            BuiltInFunction {
                operators: vec![Operator::Plus],
                operands: vec![
                    Expression::VariableAccess(Some(Identifier::from("a"))),
                    Expression::VariableAccess(Some(Identifier::from("b"))),
                ],
            },
        ))]
        .into(),
    };
    let call = Expression::FunctionCall(FunctionCall {
        name: Some(Identifier::from("add")),
        arguments: vec![num(3), num(4)],
    });

    assert_eq!(
        prog.items,
        vec![
            ProgramItem::FunctionDefinition(add),
            ProgramItem::Return(call)
        ]
    );
}

#[test]
fn test_statements() {
    let prog = parse(
        r#"{"program": {"if": {
            "expression": {"boolean": true},
            "statement": [
                {"variable_declaration": {"name": "x", "value": 1.5}},
                {"variable_declaration": {"name": "y", "expression": {"number": 2}}},
                {"expression": {"function_call": {"name": "log"}}},
                {"statement": {"return": {"expression": {"variable_access": {"name": "x"}}}}}
            ],
            "return": {"number": 0}
        }}}"#,
    )
    .unwrap();

    let expected = If {
        conditions: vec![Expression::Literal(Value::from(true))],
        body: vec![
            Statement::VariableDeclaration(VariableDeclaration {
                name: Some(Identifier::from("x")),
                value: Some(DeclaredValue::Literal(Value::from(1.5))),
            }),
            Statement::VariableDeclaration(VariableDeclaration {
                name: Some(Identifier::from("y")),
                value: Some(DeclaredValue::Expression(num(2))),
            }),
            Statement::Expression(Expression::FunctionCall(FunctionCall {
                name: Some(Identifier::from("log")),
                arguments: vec![],
            })),
            Statement::Return(Expression::VariableAccess(Some(Identifier::from("x")))),
            Statement::Return(num(0)),
        ],
    };

    assert_eq!(prog.items, vec![ProgramItem::If(expected)]);
}

#[test]
fn test_out_of_grammar_shapes_are_kept() {
    let prog = parse(
        r#"{"program": {
            "variable_access": {"name": "x"},
            "return": {"expression": {"if": {}}},
            "return": {"expression": {"number": 1, "string": "two"}},
            "function_definition": {"statement": {}}
        }}"#,
    )
    .unwrap();

    assert_eq!(
        prog.items,
        vec![
            ProgramItem::Invalid(NodeKind::VariableAccess),
            ProgramItem::Return(Expression::Invalid(NodeKind::If)),
            ProgramItem::Return(Expression::Malformed(2)),
            ProgramItem::FunctionDefinition(FunctionDefinition {
                name: None,
                parameters: vec![],
                body: vec![Statement::Malformed(0)].into(),
            }),
        ]
    );
}

#[test]
fn test_parse_errors() {
    let tests = vec![
        r#"{"program": "#,
        r#"[1, 2]"#,
        r#"{"return": {"number": 1}}"#,
        r#"{"program": {}, "program": {}}"#,
        r#"{"program": {"return": {"number": "42"}}}"#,
        r#"{"program": {"return": {"unknown_tag": 1}}}"#,
        r#"{"program": {"function_definition": {"name": 3}}}"#,
        r#"{"program": {"function_definition": {"name": "a", "name": "b"}}}"#,
        r#"{"program": {"return": {"built_in_function": {"plus": null, "name": "x"}}}}"#,
        r#"{"program": 5}"#,
    ];

    for input in tests {
        match parse(input) {
            Err(e) => assert_eq!(e.kind, ErrorKind::InvalidSyntax, "{}", input),
            Ok(_) => panic!("Parse succeeded when should have failed: {}", input),
        }
    }
}

#[test]
fn test_parse_named_location() {
    let err = parse_named("{\n\"program\": x\n}", Path::new("broken.json")).unwrap_err();
    let loc = err.location.expect("JSON errors carry a location");
    assert_eq!(loc.file, Path::new("broken.json"));
    assert_eq!(loc.line, Some(2));

    let err = parse_named(r#"{"return": {}}"#, Path::new("wrong.json")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    assert_eq!(err.location.unwrap().line, None);
}

#[test]
fn test_tree_errors_have_no_line() {
    let input = "{\"program\": {\n\"return\": {\n\"expression\": {\n\"built_in_function\": {\n\"whilex\": null\n}}}}}";
    let err = parse_named(input, Path::new("p.json")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "InvalidSyntax: Unknown node type 'whilex'\nFile p.json"
    );
}

#[test]
fn test_integer_out_of_range() {
    let input = r#"{"program": {"return": {"number": 18446744073709551615}}}"#;
    let err = parse_named(input, Path::new("big.json")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    assert!(err.details.contains("out of range"), "{}", err.details);
    assert_eq!(err.location.unwrap().line, Some(1));

    let prog = parse(r#"{"program": {"return": {"number": 9223372036854775807}}}"#).unwrap();
    assert_eq!(prog.items, vec![ProgramItem::Return(num(i64::MAX))]);
}

#[test]
fn test_empty_operator_array() {
    let input = r#"{"program": {"return": {"built_in_function": {
        "plus": [],
        "minus": null,
        "expression": [{"number": 5}, {"number": 2}]
    }}}}"#;
    let err = parse(input).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    assert_eq!(
        err.details,
        "Operator 'plus' in 'built_in_function' has an empty array payload"
    );

    // Empty arrays elsewhere still mean no children
    let input = r#"{"program": {"return": {"function_call": {"name": "f", "expression": []}}}}"#;
    let prog = parse(input).unwrap();
    assert_eq!(
        prog.items,
        vec![ProgramItem::Return(Expression::FunctionCall(FunctionCall {
            name: Some(Identifier::from("f")),
            arguments: vec![],
        }))]
    );
}
