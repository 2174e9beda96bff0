//! Tree-walking evaluator
//!
//! Every entry point takes the [`Context`] of the current run explicitly. Errors are returned, never
//! panicked, and abort the enclosing node before any later sibling is evaluated.

use log::{debug, trace};

use crate::fail;
use crate::lang::ast::*;
use crate::lang::context::Context;
use crate::lang::error::Result;
use crate::lang::value::Value;

/// Grow the native stack if a deeply nested tree is about to exhaust it
#[inline]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available
    const RED_ZONE: usize = 100 * 1024;

    /// Stack space to allocate when growing
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

fn call_name(call: &FunctionCall) -> &str {
    call.name.as_ref().map_or("<unnamed>", |n| n.0.as_str())
}

fn eval_builtin(builtin: &BuiltInFunction, ctx: &mut Context) -> Result<Value> {
    let op = match builtin.operators.as_slice() {
        [op] => *op,
        [] => fail!(InvalidSyntax, "Expected '+', '-', or '=='"),
        ops => fail!(
            InvalidSyntax,
            "Expected only one operator for built-in function, found {}",
            ops.len()
        ),
    };

    let (lhs, rhs) = match builtin.operands.as_slice() {
        [lhs, rhs] => (lhs, rhs),
        operands => fail!(
            InvalidSyntax,
            "Expected exactly two parameters for binary operation '{}', found {}",
            op.op_str(),
            operands.len()
        ),
    };

    let lhs_val = evaluate(lhs, ctx)?;
    let rhs_val = evaluate(rhs, ctx)?;

    match op {
        Operator::Equality => Ok(Value::Boolean(lhs_val == rhs_val)),
        Operator::Plus => match (lhs_val, rhs_val) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l.checked_add(r)?)),
            (Value::String(l), Value::String(r)) => Ok(Value::String(format!("{}{}", l, r))),
            (l, r) => fail!(
                InvalidCalculation,
                "Cannot add types '{}' and '{}'",
                l.type_str(),
                r.type_str()
            ),
        },
        Operator::Minus => {
            let l = lhs_val.as_number()?;
            let r = rhs_val.as_number()?;

            Ok(Value::Number(l.checked_sub(r)?))
        }
    }
}

fn eval_expr(expr: &Expression, ctx: &mut Context) -> Result<Value> {
    match expr {
        Expression::Literal(v) => Ok(v.clone()),
        Expression::VariableAccess(name) => {
            let name = match name {
                Some(n) => n,
                None => fail!(InvalidSyntax, "Attempt to access variable with no name"),
            };

            match ctx.variables.get(ctx.scope, name) {
                Some(v) => Ok(v.clone()),
                None => match ctx.variables.owner(ctx.scope) {
                    Some(func) => fail!(
                        UndefinedVariable,
                        "Attempt to access undefined variable '{}' in function '{}'",
                        name,
                        func
                    ),
                    None => fail!(
                        UndefinedVariable,
                        "Attempt to access undefined variable '{}'",
                        name
                    ),
                },
            }
        }
        Expression::FunctionCall(call) => match execute_function_call(call, ctx)? {
            Some(v) => Ok(v),
            None => fail!(
                InvalidCalculation,
                "Function '{}' produced no value",
                call_name(call)
            ),
        },
        Expression::BuiltInFunction(builtin) => eval_builtin(builtin, ctx),
        Expression::Parameter(raw) => Ok(raw.clone()),
        Expression::Malformed(n) => fail!(
            InvalidSyntax,
            "Expression must contain exactly one node, found {}",
            n
        ),
        Expression::Invalid(kind) => fail!(
            InvalidSyntax,
            "Expression contained invalid node type '{}'",
            kind
        ),
    }
}

/// Evaluate an expression to a value
pub fn evaluate(expr: &Expression, ctx: &mut Context) -> Result<Value> {
    ensure_sufficient_stack(|| eval_expr(expr, ctx))
}

/// Run a whole program against `ctx`
///
/// Returns the value of the first top-level return, or `None` if the program never returns.
pub fn execute_program(program: &Program, ctx: &mut Context) -> Result<Option<Value>> {
    debug!("executing program with {} top-level nodes", program.items.len());

    for item in &program.items {
        match item {
            ProgramItem::FunctionDefinition(def) => execute_function_definition(def, ctx)?,
            ProgramItem::Return(expr) => return evaluate(expr, ctx).map(Some),
            ProgramItem::If(node) => {
                if let Some(v) = execute_if(node, ctx)? {
                    return Ok(Some(v));
                }
            }
            ProgramItem::Invalid(kind) => fail!(
                InvalidSyntax,
                "Undefined node '{}' in abstract syntax tree",
                kind
            ),
        }
    }

    Ok(None)
}

fn exec_statement(stmt: &Statement, ctx: &mut Context) -> Result<Option<Value>> {
    match stmt {
        Statement::FunctionDefinition(def) => {
            execute_function_definition(def, ctx)?;
            Ok(None)
        }
        Statement::If(node) => execute_if(node, ctx),
        Statement::Return(expr) => evaluate(expr, ctx).map(Some),
        Statement::VariableDeclaration(decl) => {
            execute_variable_declaration(decl, ctx)?;
            Ok(None)
        }
        Statement::Expression(expr) => {
            // Calls are allowed to produce nothing when run for effect
            if let Expression::FunctionCall(call) = expr {
                execute_function_call(call, ctx)?;
            } else {
                evaluate(expr, ctx)?;
            }

            Ok(None)
        }
        Statement::Malformed(n) => fail!(
            InvalidSyntax,
            "Statement must contain exactly one node, found {}",
            n
        ),
        Statement::Invalid(kind) => fail!(
            InvalidSyntax,
            "Statement contained invalid node type '{}'",
            kind
        ),
    }
}

/// Execute one statement
///
/// `Some` means a return statement fired and the enclosing sequence must stop.
pub fn execute_statement(stmt: &Statement, ctx: &mut Context) -> Result<Option<Value>> {
    ensure_sufficient_stack(|| exec_statement(stmt, ctx))
}

/// Execute statements in order until one of them returns
pub fn execute_block(stmts: &[Statement], ctx: &mut Context) -> Result<Option<Value>> {
    for stmt in stmts {
        if let Some(v) = execute_statement(stmt, ctx)? {
            return Ok(Some(v));
        }
    }

    Ok(None)
}

pub fn execute_if(node: &If, ctx: &mut Context) -> Result<Option<Value>> {
    let cond = match node.conditions.as_slice() {
        [cond] => cond,
        [] => fail!(InvalidSyntax, "If statement has no expression"),
        _ => fail!(InvalidSyntax, "If statement has more than one expression"),
    };

    if node.body.is_empty() {
        fail!(InvalidSyntax, "If statement has no statements");
    }

    if evaluate(cond, ctx)?.is_truthy() {
        execute_block(&node.body, ctx)
    } else {
        Ok(None)
    }
}

pub fn execute_variable_declaration(decl: &VariableDeclaration, ctx: &mut Context) -> Result<()> {
    let name = match &decl.name {
        Some(n) => n,
        None => fail!(InvalidSyntax, "Defined variable with no name"),
    };

    let val = match &decl.value {
        Some(DeclaredValue::Literal(v)) => v.clone(),
        Some(DeclaredValue::Expression(expr)) => evaluate(expr, ctx)?,
        None => fail!(InvalidSyntax, "Defined variable '{}' with no value", name),
    };

    trace!("set {} = {}", name, val.short_display());
    ctx.variables.insert(ctx.scope, name.clone(), val);

    Ok(())
}

/// Register a function in the function table of the current frame
pub fn execute_function_definition(def: &FunctionDefinition, ctx: &mut Context) -> Result<()> {
    let name = match &def.name {
        Some(n) => n,
        None => fail!(InvalidSyntax, "Defined function with no name for identifier"),
    };

    if def.body.is_empty() {
        fail!(InvalidSyntax, "Defined function '{}' with no statements", name);
    }

    ctx.functions.define(
        ctx.table,
        name.clone(),
        def.parameters.clone(),
        def.body.clone(),
        ctx.scope,
    );
    debug!("defined function {} ({} parameters)", name, def.parameters.len());

    Ok(())
}

/// Call a user function
///
/// Arguments are evaluated in the caller's frame. The body then runs in a fresh scope chained to
/// the scope the function was defined in, which is released again when the call finishes.
/// Returns `None` if the body never reaches a return statement.
pub fn execute_function_call(call: &FunctionCall, ctx: &mut Context) -> Result<Option<Value>> {
    let name = match &call.name {
        Some(n) => n,
        None => fail!(InvalidSyntax, "Called function with no name"),
    };

    let func = match ctx.functions.lookup(ctx.table, name) {
        Some(f) => f.clone(),
        None => fail!(UndefinedFunction, "Function '{}' is not defined", name),
    };

    if call.arguments.len() != func.arity() {
        fail!(
            ArityMismatch,
            "Function '{}' expects {} arguments, got {}",
            name,
            func.arity(),
            call.arguments.len()
        );
    }

    if ctx.depth >= ctx.limits.max_call_depth {
        fail!(
            StackOverflow,
            "Maximum call depth of {} exceeded calling '{}'",
            ctx.limits.max_call_depth,
            name
        );
    }

    let mut args = Vec::with_capacity(call.arguments.len());
    for arg in &call.arguments {
        args.push(evaluate(arg, ctx)?);
    }

    // Save the caller's frame
    let caller_scope = ctx.scope;
    let caller_table = ctx.table;
    let scopes_len = ctx.variables.len();
    let tables_len = ctx.functions.len();

    let scope = ctx.variables.push_scope(func.scope, Some(func.name.clone()));
    let table = ctx.functions.push_table(func.table);
    for (param, arg) in func.parameters.iter().zip(args) {
        ctx.variables.insert(scope, param.clone(), arg);
    }

    ctx.scope = scope;
    ctx.table = table;
    ctx.depth += 1;
    trace!("call {} (depth {})", func, ctx.depth);

    let ret = execute_block(&func.body, ctx);

    ctx.depth -= 1;
    ctx.scope = caller_scope;
    ctx.table = caller_table;
    ctx.variables.truncate(scopes_len);
    ctx.functions.truncate(tables_len);

    if let Ok(v) = &ret {
        trace!(
            "{} returned {}",
            name,
            v.as_ref().map_or("nothing".to_string(), |v| v.short_display())
        );
    }

    ret
}

#[cfg(test)]
fn num(i: i64) -> Expression {
    Expression::Literal(Value::from(i))
}

#[cfg(test)]
fn string(s: &str) -> Expression {
    Expression::Literal(Value::from(s))
}

#[cfg(test)]
fn binop(op: Operator, lhs: Expression, rhs: Expression) -> Expression {
    Expression::BuiltInFunction(BuiltInFunction {
        operators: vec![op],
        operands: vec![lhs, rhs],
    })
}

#[cfg(test)]
fn var(name: &str) -> Expression {
    Expression::VariableAccess(Some(Identifier::from(name)))
}

#[cfg(test)]
fn call(name: &str, arguments: Vec<Expression>) -> Expression {
    Expression::FunctionCall(FunctionCall {
        name: Some(Identifier::from(name)),
        arguments,
    })
}

#[cfg(test)]
fn define(name: &str, params: &[&str], body: Vec<Statement>) -> FunctionDefinition {
    FunctionDefinition {
        name: Some(Identifier::from(name)),
        parameters: params.iter().map(|p| Identifier::from(*p)).collect(),
        body: body.into(),
    }
}

#[cfg(test)]
fn declare(name: &str, expr: Expression) -> Statement {
    Statement::VariableDeclaration(VariableDeclaration {
        name: Some(Identifier::from(name)),
        value: Some(DeclaredValue::Expression(expr)),
    })
}

#[test]
fn test_literals() {
    let tests = vec![
        (num(42), Value::from(42)),
        (num(-7), Value::from(-7)),
        (Expression::Literal(Value::from(2.5)), Value::from(2.5)),
        (string("hello"), Value::from("hello")),
        (Expression::Literal(Value::from(true)), Value::from(true)),
        (Expression::Parameter(Value::from("raw")), Value::from("raw")),
    ];

    for (expr, expected) in tests {
        let mut ctx = Context::default();
        assert_eq!(evaluate(&expr, &mut ctx).unwrap(), expected);
    }
}

#[test]
fn test_builtins() {
    let tests = vec![
        (binop(Operator::Plus, num(3), num(4)), Value::from(7)),
        (binop(Operator::Minus, num(3), num(4)), Value::from(-1)),
        (binop(Operator::Equality, num(3), num(3)), Value::from(true)),
        (binop(Operator::Equality, num(3), num(4)), Value::from(false)),
        (
            binop(Operator::Plus, string("one"), string("two")),
            Value::from("onetwo"),
        ),
        (
            binop(Operator::Equality, string("1"), num(1)),
            Value::from(false),
        ),
        (
            binop(
                Operator::Plus,
                binop(Operator::Plus, num(1), num(2)),
                binop(Operator::Minus, num(10), num(4)),
            ),
            Value::from(9),
        ),
        (
            binop(
                Operator::Plus,
                num(1),
                Expression::Literal(Value::from(0.5)),
            ),
            Value::from(1.5),
        ),
    ];

    for (expr, expected) in tests {
        let mut ctx = Context::default();
        assert_eq!(evaluate(&expr, &mut ctx).unwrap(), expected);
    }
}

#[test]
fn test_builtin_errors() {
    use crate::lang::error::ErrorKind;

    let tests = vec![
        (
            binop(Operator::Minus, string("x"), string("y")),
            ErrorKind::InvalidCalculation,
        ),
        (
            binop(Operator::Plus, string("x"), num(1)),
            ErrorKind::InvalidCalculation,
        ),
        (
            binop(Operator::Minus, Expression::Literal(Value::from(true)), num(1)),
            ErrorKind::InvalidCalculation,
        ),
        (
            binop(Operator::Plus, num(i64::MAX), num(1)),
            ErrorKind::InvalidCalculation,
        ),
        (
            Expression::BuiltInFunction(BuiltInFunction {
                operators: vec![],
                operands: vec![num(1), num(2)],
            }),
            ErrorKind::InvalidSyntax,
        ),
        (
            Expression::BuiltInFunction(BuiltInFunction {
                operators: vec![Operator::Plus, Operator::Minus],
                operands: vec![num(1), num(2)],
            }),
            ErrorKind::InvalidSyntax,
        ),
        (
            Expression::BuiltInFunction(BuiltInFunction {
                operators: vec![Operator::Plus],
                operands: vec![num(1), num(2), num(3)],
            }),
            ErrorKind::InvalidSyntax,
        ),
        (
            Expression::BuiltInFunction(BuiltInFunction {
                operators: vec![Operator::Plus],
                operands: vec![num(1)],
            }),
            ErrorKind::InvalidSyntax,
        ),
        (
            Expression::Invalid(crate::lang::kind::NodeKind::Return),
            ErrorKind::InvalidSyntax,
        ),
        (Expression::Malformed(2), ErrorKind::InvalidSyntax),
    ];

    for (expr, kind) in tests {
        let mut ctx = Context::default();
        let err = evaluate(&expr, &mut ctx).unwrap_err();
        assert_eq!(err.kind, kind, "{}", err);
    }
}

#[test]
fn test_operand_error_stops_evaluation() {
    use crate::lang::error::ErrorKind;

    // The undefined call on the right must never be reached
    let expr = binop(Operator::Plus, var("missing"), call("nope", vec![]));
    let mut ctx = Context::default();
    let err = evaluate(&expr, &mut ctx).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
}

#[test]
fn test_variable_access() {
    use crate::lang::error::ErrorKind;

    let mut ctx = Context::default();
    let root = ctx.root_scope();
    ctx.variables.insert(root, Identifier::from("x"), Value::from(5));

    assert_eq!(evaluate(&var("x"), &mut ctx).unwrap(), Value::from(5));
    assert_eq!(
        evaluate(&var("y"), &mut ctx).unwrap_err().kind,
        ErrorKind::UndefinedVariable
    );
    assert_eq!(
        evaluate(&Expression::VariableAccess(None), &mut ctx)
            .unwrap_err()
            .kind,
        ErrorKind::InvalidSyntax
    );
}

#[test]
fn test_function_call() {
    use crate::lang::error::ErrorKind;

    let mut ctx = Context::default();
    let add = define(
        "add",
        &["a", "b"],
        vec![Statement::Return(binop(Operator::Plus, var("a"), var("b")))],
    );
    execute_function_definition(&add, &mut ctx).unwrap();

    assert_eq!(
        evaluate(&call("add", vec![num(3), num(4)]), &mut ctx).unwrap(),
        Value::from(7)
    );

    let err = evaluate(&call("add", vec![num(3)]), &mut ctx).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
    assert_eq!(err.details, "Function 'add' expects 2 arguments, got 1");

    let err = evaluate(&call("sub", vec![num(3)]), &mut ctx).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedFunction);

    let nameless = Expression::FunctionCall(FunctionCall {
        name: None,
        arguments: vec![],
    });
    let err = evaluate(&nameless, &mut ctx).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);

    // Frames are released after every call, successful or not
    assert_eq!(ctx.variables.len(), 1);
    assert_eq!(ctx.functions.len(), 1);
    assert_eq!(ctx.depth, 0);
    assert_eq!(ctx.scope, ctx.root_scope());
}

#[test]
fn test_function_definition_errors() {
    use crate::lang::error::ErrorKind;

    let mut ctx = Context::default();

    let nameless = FunctionDefinition {
        name: None,
        parameters: vec![],
        body: vec![Statement::Return(num(1))].into(),
    };
    assert_eq!(
        execute_function_definition(&nameless, &mut ctx)
            .unwrap_err()
            .kind,
        ErrorKind::InvalidSyntax
    );

    let empty = define("f", &[], vec![]);
    assert_eq!(
        execute_function_definition(&empty, &mut ctx)
            .unwrap_err()
            .kind,
        ErrorKind::InvalidSyntax
    );
    assert!(ctx
        .functions
        .lookup(ctx.root_table(), &Identifier::from("f"))
        .is_none());
}

#[test]
fn test_redefinition() {
    let mut ctx = Context::default();
    execute_function_definition(&define("f", &[], vec![Statement::Return(num(1))]), &mut ctx)
        .unwrap();
    execute_function_definition(&define("f", &[], vec![Statement::Return(num(2))]), &mut ctx)
        .unwrap();

    assert_eq!(
        evaluate(&call("f", vec![]), &mut ctx).unwrap(),
        Value::from(2)
    );
}

#[test]
fn test_early_return() {
    use crate::lang::error::ErrorKind;

    let mut ctx = Context::default();
    let f = define(
        "f",
        &[],
        vec![
            Statement::Return(num(1)),
            // Never executed, would fail if it were
            Statement::Return(var("undefined")),
        ],
    );
    execute_function_definition(&f, &mut ctx).unwrap();
    assert_eq!(evaluate(&call("f", vec![]), &mut ctx).unwrap(), Value::from(1));

    let g = define(
        "g",
        &["x"],
        vec![
            Statement::If(If {
                conditions: vec![binop(Operator::Equality, var("x"), num(0))],
                body: vec![Statement::Return(string("zero"))],
            }),
            Statement::Return(string("nonzero")),
        ],
    );
    execute_function_definition(&g, &mut ctx).unwrap();
    assert_eq!(
        evaluate(&call("g", vec![num(0)]), &mut ctx).unwrap(),
        Value::from("zero")
    );
    assert_eq!(
        evaluate(&call("g", vec![num(3)]), &mut ctx).unwrap(),
        Value::from("nonzero")
    );

    let procedure = define("p", &[], vec![declare("unused", num(1))]);
    execute_function_definition(&procedure, &mut ctx).unwrap();
    assert_eq!(
        execute_function_call(
            &FunctionCall {
                name: Some(Identifier::from("p")),
                arguments: vec![],
            },
            &mut ctx
        )
        .unwrap(),
        None
    );
    assert_eq!(
        evaluate(&call("p", vec![]), &mut ctx).unwrap_err().kind,
        ErrorKind::InvalidCalculation
    );
}

#[test]
fn test_if() {
    use crate::lang::error::ErrorKind;

    let mut ctx = Context::default();
    let node = If {
        conditions: vec![Expression::Literal(Value::from(false))],
        body: vec![
            declare("x", num(1)),
            // Would fail if executed
            Statement::Expression(var("undefined")),
        ],
    };
    assert_eq!(execute_if(&node, &mut ctx).unwrap(), None);
    assert!(ctx
        .variables
        .get(ctx.root_scope(), &Identifier::from("x"))
        .is_none());

    let node = If {
        conditions: vec![Expression::Literal(Value::from(true))],
        body: vec![declare("x", num(1)), declare("y", var("x"))],
    };
    assert_eq!(execute_if(&node, &mut ctx).unwrap(), None);
    assert_eq!(
        ctx.variables.get(ctx.root_scope(), &Identifier::from("y")),
        Some(&Value::from(1))
    );

    let no_cond = If {
        conditions: vec![],
        body: vec![Statement::Return(num(1))],
    };
    let err = execute_if(&no_cond, &mut ctx).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    assert_eq!(err.details, "If statement has no expression");

    let no_body = If {
        conditions: vec![Expression::Literal(Value::from(true))],
        body: vec![],
    };
    let err = execute_if(&no_body, &mut ctx).unwrap_err();
    assert_eq!(err.details, "If statement has no statements");
}

#[test]
fn test_call_scope_does_not_leak() {
    use crate::lang::error::ErrorKind;

    let mut ctx = Context::default();
    let root = ctx.root_scope();
    ctx.variables.insert(root, Identifier::from("x"), Value::from(1));

    // Shadows `x` locally and reads the global through the scope chain
    let f = define(
        "f",
        &[],
        vec![
            declare("x", num(100)),
            declare("local", num(5)),
            Statement::Return(var("x")),
        ],
    );
    execute_function_definition(&f, &mut ctx).unwrap();
    assert_eq!(evaluate(&call("f", vec![]), &mut ctx).unwrap(), Value::from(100));

    assert_eq!(evaluate(&var("x"), &mut ctx).unwrap(), Value::from(1));
    assert_eq!(
        evaluate(&var("local"), &mut ctx).unwrap_err().kind,
        ErrorKind::UndefinedVariable
    );

    // Parameters are not visible to the caller either
    let g = define("g", &["p"], vec![Statement::Return(var("x"))]);
    execute_function_definition(&g, &mut ctx).unwrap();
    assert_eq!(evaluate(&call("g", vec![num(9)]), &mut ctx).unwrap(), Value::from(1));
    assert_eq!(
        evaluate(&var("p"), &mut ctx).unwrap_err().kind,
        ErrorKind::UndefinedVariable
    );
}

#[test]
fn test_nested_definitions() {
    use crate::lang::error::ErrorKind;

    let mut ctx = Context::default();
    let outer = define(
        "outer",
        &["n"],
        vec![
            Statement::FunctionDefinition(define(
                "inner",
                &[],
                vec![Statement::Return(binop(Operator::Plus, var("n"), num(1)))],
            )),
            Statement::Return(call("inner", vec![])),
        ],
    );
    execute_function_definition(&outer, &mut ctx).unwrap();

    assert_eq!(
        evaluate(&call("outer", vec![num(41)]), &mut ctx).unwrap(),
        Value::from(42)
    );
    assert_eq!(
        evaluate(&call("inner", vec![]), &mut ctx).unwrap_err().kind,
        ErrorKind::UndefinedFunction
    );
}

#[test]
fn test_recursion_limit() {
    use crate::lang::context::Limits;
    use crate::lang::error::ErrorKind;

    let mut ctx = Context::new(Limits { max_call_depth: 16 });
    let forever = define("forever", &[], vec![Statement::Return(call("forever", vec![]))]);
    execute_function_definition(&forever, &mut ctx).unwrap();

    let err = evaluate(&call("forever", vec![]), &mut ctx).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StackOverflow);
    assert_eq!(ctx.depth, 0);
    assert_eq!(ctx.variables.len(), 1);
}

#[test]
fn test_recursion() {
    let mut ctx = Context::default();

    // countdown(n) = if n == 0 { return "done" } return countdown(n - 1)
    let countdown = define(
        "countdown",
        &["n"],
        vec![
            Statement::If(If {
                conditions: vec![binop(Operator::Equality, var("n"), num(0))],
                body: vec![Statement::Return(string("done"))],
            }),
            Statement::Return(call(
                "countdown",
                vec![binop(Operator::Minus, var("n"), num(1))],
            )),
        ],
    );
    execute_function_definition(&countdown, &mut ctx).unwrap();

    assert_eq!(
        evaluate(&call("countdown", vec![num(200)]), &mut ctx).unwrap(),
        Value::from("done")
    );
}

#[test]
fn test_program() {
    use crate::lang::error::ErrorKind;
    use crate::lang::kind::NodeKind;

    let program = Program {
        items: vec![ProgramItem::Return(num(42))],
    };
    let mut ctx = Context::default();
    assert_eq!(
        execute_program(&program, &mut ctx).unwrap(),
        Some(Value::from(42))
    );

    let program = Program {
        items: vec![
            ProgramItem::FunctionDefinition(define(
                "add",
                &["a", "b"],
                vec![Statement::Return(binop(Operator::Plus, var("a"), var("b")))],
            )),
            ProgramItem::Return(call("add", vec![num(3), num(4)])),
            ProgramItem::Return(num(0)),
        ],
    };
    let mut ctx = Context::default();
    assert_eq!(
        execute_program(&program, &mut ctx).unwrap(),
        Some(Value::from(7))
    );

    let program = Program {
        items: vec![
            ProgramItem::If(If {
                conditions: vec![Expression::Literal(Value::from(false))],
                body: vec![Statement::Return(num(1))],
            }),
            ProgramItem::If(If {
                conditions: vec![Expression::Literal(Value::from(true))],
                body: vec![Statement::Return(num(2))],
            }),
        ],
    };
    let mut ctx = Context::default();
    assert_eq!(
        execute_program(&program, &mut ctx).unwrap(),
        Some(Value::from(2))
    );

    let program = Program { items: vec![] };
    let mut ctx = Context::default();
    assert_eq!(execute_program(&program, &mut ctx).unwrap(), None);

    let program = Program {
        items: vec![ProgramItem::Invalid(NodeKind::VariableDeclaration)],
    };
    let mut ctx = Context::default();
    assert_eq!(
        execute_program(&program, &mut ctx).unwrap_err().kind,
        ErrorKind::InvalidSyntax
    );
}
