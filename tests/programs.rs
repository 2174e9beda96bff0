use std::path::Path;

use pretty_assertions::assert_eq;

use arbor::lang::context::Limits;
use arbor::lang::error::ErrorKind;
use arbor::lang::runtime::{RunResult, Runtime};
use arbor::lang::value::Value;

const ADD: &str = r#"
    "function_definition": {
        "name": "add",
        "parameter": ["a", "b"],
        "statement": {"return": {"expression": {"built_in_function": {
            "plus": null,
            "expression": [
                {"variable_access": {"name": "a"}},
                {"variable_access": {"name": "b"}}
            ]
        }}}}
    }
"#;

fn run(prog: &str) -> RunResult {
    Runtime::default().run_str(prog)
}

fn value(prog: &str) -> Value {
    match run(prog) {
        RunResult::Ok(Some(v)) => v,
        r => panic!("Expected a value, got {:?}", r),
    }
}

fn eval_error(prog: &str) -> ErrorKind {
    match run(prog) {
        RunResult::EvalErr(e) => e.kind,
        r => panic!("Expected an evaluation error, got {:?}", r),
    }
}

#[test]
fn test_return_number() {
    assert_eq!(
        value(r#"{"program": {"return": {"expression": {"number": 42}}}}"#),
        Value::from(42)
    );
}

#[test]
fn test_call_add() {
    let prog = format!(
        r#"{{"program": {{
            {},
            "return": {{"expression": {{"function_call": {{
                "name": "add",
                "expression": [{{"number": 3}}, {{"number": 4}}]
            }}}}}}
        }}}}"#,
        ADD
    );

    assert_eq!(value(&prog), Value::from(7));
}

#[test]
fn test_call_add_wrong_arity() {
    let prog = format!(
        r#"{{"program": {{
            {},
            "return": {{"expression": {{"function_call": {{
                "name": "add",
                "expression": {{"number": 3}}
            }}}}}}
        }}}}"#,
        ADD
    );

    match run(&prog) {
        RunResult::EvalErr(e) => {
            assert_eq!(e.kind, ErrorKind::ArityMismatch);
            assert_eq!(
                e.to_string(),
                "ArityMismatch: Function 'add' expects 2 arguments, got 1"
            );
        }
        r => panic!("Expected arity mismatch, got {:?}", r),
    }
}

#[test]
fn test_minus_strings() {
    let prog = r#"{"program": {"return": {"expression": {"built_in_function": {
        "minus": null,
        "expression": [{"string": "x"}, {"string": "y"}]
    }}}}}"#;

    assert_eq!(eval_error(prog), ErrorKind::InvalidCalculation);
}

#[test]
fn test_float_overflow() {
    let prog = r#"{"program": {"return": {"expression": {"built_in_function": {
        "plus": null,
        "expression": [{"number": 1e308}, {"number": 1e308}]
    }}}}}"#;

    assert_eq!(eval_error(prog), ErrorKind::InvalidCalculation);
}

#[test]
fn test_out_of_range_integer() {
    let prog = r#"{"program": {"return": {"number": 18446744073709551615}}}"#;
    match run(prog) {
        RunResult::ParseErr(e) => assert_eq!(e.kind, ErrorKind::InvalidSyntax),
        r => panic!("Expected a parse error, got {:?}", r),
    }
}

#[test]
fn test_string_concat() {
    let prog = r#"{"program": {"return": {"expression": {"built_in_function": {
        "plus": null,
        "expression": [{"string": "one"}, {"string": "two"}]
    }}}}}"#;

    assert_eq!(value(prog), Value::from("onetwo"));
}

#[test]
fn test_equality() {
    let tests = vec![
        (r#"{"number": 3}, {"number": 3}"#, true),
        (r#"{"number": 3}, {"number": 3.0}"#, true),
        (r#"{"number": 3}, {"number": 4}"#, false),
        (
            r#"{"number": 9007199254740993}, {"number": 9007199254740992.0}"#,
            false,
        ),
        (r#"{"string": "a"}, {"string": "a"}"#, true),
        (r#"{"string": "3"}, {"number": 3}"#, false),
        (r#"{"boolean": true}, {"boolean": true}"#, true),
        (r#"{"boolean": true}, {"number": 1}"#, false),
    ];

    for (operands, expected) in tests {
        let prog = format!(
            r#"{{"program": {{"return": {{"built_in_function": {{
                "equality": null,
                "expression": [{}]
            }}}}}}}}"#,
            operands
        );
        assert_eq!(value(&prog), Value::from(expected), "{}", operands);
    }
}

#[test]
fn test_undefined_function() {
    let prog = r#"{"program": {"return": {"function_call": {"name": "nope"}}}}"#;
    assert_eq!(eval_error(prog), ErrorKind::UndefinedFunction);
}

#[test]
fn test_undefined_variable() {
    let prog = r#"{"program": {
        "function_definition": {
            "name": "f",
            "statement": {"return": {"variable_access": {"name": "missing"}}}
        },
        "return": {"function_call": {"name": "f"}}
    }}"#;
    match run(prog) {
        RunResult::EvalErr(e) => {
            assert_eq!(e.kind, ErrorKind::UndefinedVariable);
            assert_eq!(
                e.details,
                "Attempt to access undefined variable 'missing' in function 'f'"
            );
        }
        r => panic!("Expected undefined variable, got {:?}", r),
    }
}

#[test]
fn test_redefinition() {
    let prog = r#"{"program": {
        "function_definition": {"name": "f", "statement": {"return": {"number": 1}}},
        "function_definition": {"name": "f", "statement": {"return": {"number": 2}}},
        "return": {"function_call": {"name": "f"}}
    }}"#;
    assert_eq!(value(prog), Value::from(2));
}

#[test]
fn test_conditionals() {
    let prog = r#"{"program": {
        "function_definition": {
            "name": "sign",
            "parameter": "n",
            "statement": [
                {"if": {
                    "expression": {"built_in_function": {
                        "equality": null,
                        "expression": [{"variable_access": {"name": "n"}}, {"number": 0}]
                    }},
                    "statement": {"return": {"string": "zero"}}
                }},
                {"return": {"string": "nonzero"}}
            ]
        },
        "return": {"built_in_function": {
            "plus": null,
            "expression": [
                {"function_call": {"name": "sign", "expression": {"number": 0}}},
                {"function_call": {"name": "sign", "expression": {"number": 5}}}
            ]
        }}
    }}"#;
    assert_eq!(value(prog), Value::from("zerononzero"));
}

#[test]
fn test_false_condition_runs_nothing() {
    let prog = r#"{"program": {
        "if": {
            "expression": {"boolean": false},
            "statement": {"return": {"variable_access": {"name": "never"}}}
        },
        "return": {"number": 1}
    }}"#;
    assert_eq!(value(prog), Value::from(1));
}

#[test]
fn test_variable_declarations() {
    let prog = r#"{"program": {
        "function_definition": {
            "name": "f",
            "parameter": "x",
            "statement": [
                {"variable_declaration": {"name": "y", "value": 10}},
                {"variable_declaration": {"name": "z", "expression": {"built_in_function": {
                    "minus": null,
                    "expression": [
                        {"variable_access": {"name": "y"}},
                        {"variable_access": {"name": "x"}}
                    ]
                }}}},
                {"return": {"variable_access": {"name": "z"}}}
            ]
        },
        "return": {"function_call": {"name": "f", "expression": {"number": 3}}}
    }}"#;
    assert_eq!(value(prog), Value::from(7));
}

#[test]
fn test_procedure_call_statement() {
    let prog = r#"{"program": {
        "function_definition": {
            "name": "noop",
            "statement": {"variable_declaration": {"name": "x", "value": 1}}
        },
        "function_definition": {
            "name": "main",
            "statement": [
                {"expression": {"function_call": {"name": "noop"}}},
                {"return": {"string": "ok"}}
            ]
        },
        "return": {"function_call": {"name": "main"}}
    }}"#;
    assert_eq!(value(prog), Value::from("ok"));
}

#[test]
fn test_runaway_recursion() {
    let prog = r#"{"program": {
        "function_definition": {
            "name": "loop",
            "statement": {"return": {"function_call": {"name": "loop"}}}
        },
        "return": {"function_call": {"name": "loop"}}
    }}"#;

    let rt = Runtime::new(Limits { max_call_depth: 64 });
    match rt.run_str(prog) {
        RunResult::EvalErr(e) => assert_eq!(e.kind, ErrorKind::StackOverflow),
        r => panic!("Expected stack overflow, got {:?}", r),
    }
}

#[test]
fn test_invalid_program_child() {
    let prog = r#"{"program": {"variable_declaration": {"name": "x", "value": 1}}}"#;
    assert_eq!(eval_error(prog), ErrorKind::InvalidSyntax);
}

#[test]
fn test_unknown_tag_location() {
    let prog = r#"{"program": {
        "function_definition": {
            "name": "f",
            "statement": {
                "whilex": {"boolean": true}
            }
        }
    }}"#;

    match Runtime::default().run_source(prog, Path::new("p.json")) {
        RunResult::ParseErr(e) => {
            assert_eq!(
                e.to_string(),
                "InvalidSyntax: Unknown node type 'whilex'\nFile p.json"
            );
        }
        r => panic!("Expected a parse error, got {:?}", r),
    }
}

#[test]
fn test_error_stops_program() {
    // The failing definition must abort before the return is reached
    let prog = r#"{"program": {
        "function_definition": {"parameter": "a", "statement": {"return": {"number": 1}}},
        "return": {"number": 2}
    }}"#;
    assert_eq!(eval_error(prog), ErrorKind::InvalidSyntax);
}
