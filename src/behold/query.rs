//! # Operator Registry
//!
//! ORM-style key suffixes let a caller express a field plus a comparison in
//! one flat name: `count__gt` means "field `count`, greater-than". This
//! module owns the fixed suffix table, the pure key parser, and operator
//! evaluation over dynamic values. Parsing is kept independent of evaluation
//! so filters can be registered without touching any state.

use std::cmp::Ordering;

use serde_json::Value;

use crate::item::display_value;

/// Comparison operator encoded by a key suffix. Keys without a recognized
/// suffix compare with [`Op::Eq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
    In,
}

// Most specific first: `__lte`/`__gte` before their two-letter spellings.
const SUFFIXES: [(&str, Op); 8] = [
    ("__lte", Op::Le),
    ("__gte", Op::Ge),
    ("__lt", Op::Lt),
    ("__le", Op::Le),
    ("__gt", Op::Gt),
    ("__ge", Op::Ge),
    ("__ne", Op::Ne),
    ("__in", Op::In),
];

/// Split a flat criterion key into its operator and true field name.
///
/// The field name is the portion before the first `__`; a key with no
/// matching suffix passes through unchanged under equality.
pub fn parse_key(key: &str) -> (Op, &str) {
    for (suffix, op) in SUFFIXES {
        if key.ends_with(suffix) {
            let field = key.split("__").next().unwrap_or(key);
            return (op, field);
        }
    }
    (Op::Eq, key)
}

impl Op {
    /// Apply the operator to a current value and a criterion value.
    ///
    /// Numbers compare as f64, strings lexically, booleans as false < true.
    /// `In` expects an array criterion. Operand shapes that do not admit the
    /// requested comparison evaluate to false rather than erroring.
    pub fn eval(self, current: &Value, criterion: &Value) -> bool {
        match self {
            Op::Eq => current == criterion,
            Op::Ne => current != criterion,
            Op::In => criterion
                .as_array()
                .is_some_and(|options| options.contains(current)),
            Op::Lt => compare(current, criterion) == Some(Ordering::Less),
            Op::Le => matches!(
                compare(current, criterion),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Op::Gt => compare(current, criterion) == Some(Ordering::Greater),
            Op::Ge => matches!(
                compare(current, criterion),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

/// Evaluate against an extracted display string instead of a raw value.
///
/// Value filters run post-extraction, so both sides are compared in their
/// display-string form; `In` checks the string against the display form of
/// each criterion element.
pub fn eval_text(op: Op, current: &str, criterion: &Value) -> bool {
    match op {
        Op::In => criterion
            .as_array()
            .is_some_and(|options| options.iter().any(|opt| display_value(opt) == current)),
        _ => {
            let criterion = Value::String(display_value(criterion));
            op.eval(&Value::String(current.to_string()), &criterion)
        }
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
