use std::fmt;

use crate::fail;
use crate::lang::error::Result;

/// Numbers keep integer precision until they meet a float
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(i) => *i == 0,
            Number::Float(f) => *f == 0.0,
        }
    }

    pub fn checked_add(self, rhs: Number) -> Result<Number> {
        match (self, rhs) {
            (Number::Integer(l), Number::Integer(r)) => match l.checked_add(r) {
                Some(res) => Ok(Number::Integer(res)),
                None => fail!(InvalidCalculation, "{} + {} overflows", l, r),
            },
            (l, r) => finite(l.as_f64() + r.as_f64(), || format!("{} + {} overflows", l, r)),
        }
    }

    pub fn checked_sub(self, rhs: Number) -> Result<Number> {
        match (self, rhs) {
            (Number::Integer(l), Number::Integer(r)) => match l.checked_sub(r) {
                Some(res) => Ok(Number::Integer(res)),
                None => fail!(InvalidCalculation, "{} - {} overflows", l, r),
            },
            (l, r) => finite(l.as_f64() - r.as_f64(), || format!("{} - {} overflows", l, r)),
        }
    }
}

fn finite<F: FnOnce() -> String>(res: f64, details: F) -> Result<Number> {
    if !res.is_finite() {
        fail!(InvalidCalculation, "{}", details());
    }

    Ok(Number::Float(res))
}

/// Exact comparison: an integer only equals a float holding the same whole number
fn int_eq_float(i: i64, f: f64) -> bool {
    // i64::MIN is exactly representable, i64::MAX is not
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;

    f.is_finite() && f.fract() == 0.0 && f >= LOWER && f < UPPER && f as i64 == i
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(l), Number::Integer(r)) => l == r,
            (Number::Float(l), Number::Float(r)) => l == r,
            (Number::Integer(i), Number::Float(f)) | (Number::Float(f), Number::Integer(i)) => {
                int_eq_float(*i, *f)
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(Number),
    String(String),
    Boolean(bool),
}

impl Value {
    pub fn type_str(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
        }
    }

    /// Rendering used inside error messages, where strings need quotes
    pub fn short_display(&self) -> String {
        match self {
            Value::String(s) => format!("\"{}\"", s),
            v => format!("{}", v),
        }
    }

    pub fn as_number(&self) -> Result<Number> {
        match self {
            Value::Number(n) => Ok(*n),
            v => fail!(
                InvalidCalculation,
                "Expected number, got {} '{}'",
                v.type_str(),
                v.short_display()
            ),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Integer(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => {
                write!(f, "{}", if *b { "true" } else { "false" })
            }
        }
    }
}

#[test]
fn test_number_arith() {
    let two = Number::Integer(2);
    let half = Number::Float(0.5);

    assert_eq!(two.checked_add(Number::Integer(3)).unwrap(), Number::Integer(5));
    assert_eq!(two.checked_sub(Number::Integer(3)).unwrap(), Number::Integer(-1));
    assert_eq!(two.checked_add(half).unwrap(), Number::Float(2.5));
    assert_eq!(half.checked_sub(two).unwrap(), Number::Float(-1.5));

    assert!(Number::Integer(i64::MAX)
        .checked_add(Number::Integer(1))
        .is_err());
    assert!(Number::Integer(i64::MIN)
        .checked_sub(Number::Integer(1))
        .is_err());
}

#[test]
fn test_float_overflow() {
    use crate::lang::error::ErrorKind;

    let big = Number::Float(1e308);
    let err = big.checked_add(big).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCalculation);

    let err = Number::Float(-1e308).checked_sub(big).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCalculation);

    assert_eq!(
        big.checked_sub(Number::Integer(1)).unwrap(),
        Number::Float(1e308)
    );
}

#[test]
fn test_mixed_equality_is_exact() {
    let tests = vec![
        (Number::Integer(3), Number::Float(3.0), true),
        (Number::Integer(3), Number::Float(3.5), false),
        (Number::Integer(9_007_199_254_740_993), Number::Float(9_007_199_254_740_992.0), false),
        (Number::Integer(9_007_199_254_740_992), Number::Float(9_007_199_254_740_992.0), true),
        (Number::Integer(i64::MAX), Number::Float(9_223_372_036_854_775_808.0), false),
        (Number::Integer(i64::MIN), Number::Float(-9_223_372_036_854_775_808.0), true),
        (Number::Integer(0), Number::Float(f64::NAN), false),
        (Number::Integer(0), Number::Float(-0.0), true),
    ];

    for (int, float, expected) in tests {
        assert_eq!(int == float, expected, "{:?} == {:?}", int, float);
        assert_eq!(float == int, expected, "{:?} == {:?}", float, int);
    }
}

#[test]
fn test_value_equality() {
    assert_eq!(Value::from(1), Value::from(1.0));
    assert_ne!(Value::from(1), Value::from("1"));
    assert_ne!(Value::from(true), Value::from(1));
    assert_eq!(Value::from("abc"), Value::from("abc"));
}

#[test]
fn test_truthy() {
    assert!(Value::from(true).is_truthy());
    assert!(!Value::from(false).is_truthy());
    assert!(Value::from(3).is_truthy());
    assert!(!Value::from(0).is_truthy());
    assert!(!Value::from(0.0).is_truthy());
    assert!(Value::from("x").is_truthy());
    assert!(!Value::from("").is_truthy());
}

#[test]
fn test_display() {
    assert_eq!(Value::from(42).to_string(), "42");
    assert_eq!(Value::from(7.5).to_string(), "7.5");
    assert_eq!(Value::from("str").to_string(), "str");
    assert_eq!(Value::from("str").short_display(), "\"str\"");
    assert_eq!(Value::from(false).to_string(), "false");
}
