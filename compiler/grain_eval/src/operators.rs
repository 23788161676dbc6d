//! Binary operator implementations for the evaluator.
//!
//! Operands are already evaluated and known not to be failures. Every error
//! is a failure value: type errors are `#failure.shape_mismatch`, overflow
//! and division by zero are `#failure.arithmetic`. `and`/`or` short-circuit
//! in the interpreter and only reach here with two booleans.

use std::cmp::Ordering;

use grain_ir::BinaryOp;
use grain_value::failure::{arithmetic, shape_mismatch};
use grain_value::Value;

/// Checked integer operation; `None` from the op is an overflow.
#[inline]
fn checked_arith(result: Option<i64>, op: BinaryOp) -> Value {
    result.map_or_else(
        || arithmetic(format!("integer overflow in `{}`", op.as_symbol())).into_value(),
        Value::Int,
    )
}

/// Checked integer division or remainder with a zero guard.
#[inline]
fn checked_div(b: i64, op: BinaryOp, f: impl FnOnce() -> Option<i64>) -> Value {
    if b == 0 {
        division_by_zero(op)
    } else {
        checked_arith(f(), op)
    }
}

fn division_by_zero(op: BinaryOp) -> Value {
    let what = if op == BinaryOp::Rem {
        "remainder"
    } else {
        "division"
    };
    arithmetic(format!("{what} by zero")).into_value()
}

fn invalid_for(kind: &str, op: BinaryOp) -> Value {
    shape_mismatch(format!("operator `{}` is not defined for {kind}", op.as_symbol())).into_value()
}

/// Evaluate a binary operation on two evaluated operands.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> Value {
    match op {
        BinaryOp::Eq => return Value::Bool(values_equal(left, right)),
        BinaryOp::NotEq => return Value::Bool(!values_equal(left, right)),
        _ => {}
    }
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, *b, op),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            match (left.as_float(), right.as_float()) {
                (Some(a), Some(b)) => eval_float_binary(a, b, op),
                _ => type_mismatch(left, right, op),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(*a, *b, op),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(a, b, op),
        _ => type_mismatch(left, right, op),
    }
}

/// Equality across kinds. Ints and floats compare numerically.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(_), Value::Float(_)) | (Value::Float(_), Value::Int(_)) => {
            left.as_float().partial_cmp(&right.as_float()) == Some(Ordering::Equal)
        }
        _ => left == right,
    }
}

fn type_mismatch(left: &Value, right: &Value, op: BinaryOp) -> Value {
    shape_mismatch(format!(
        "operator `{}` cannot combine {} and {}",
        op.as_symbol(),
        left.kind_name(),
        right.kind_name()
    ))
    .into_value()
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> Value {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), op),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), op),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), op),
        BinaryOp::Div => checked_div(b, op, || a.checked_div(b)),
        BinaryOp::Rem => checked_div(b, op, || a.checked_rem(b)),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        _ => invalid_for("integers", op),
    }
}

fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> Value {
    match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => division_by_zero(op),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Rem => Value::Float(a % b),
        BinaryOp::Lt => Value::Bool(a.partial_cmp(&b) == Some(Ordering::Less)),
        BinaryOp::LtEq => Value::Bool(matches!(
            a.partial_cmp(&b),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(a.partial_cmp(&b) == Some(Ordering::Greater)),
        BinaryOp::GtEq => Value::Bool(matches!(
            a.partial_cmp(&b),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        _ => invalid_for("numbers", op),
    }
}

fn eval_bool_binary(a: bool, b: bool, op: BinaryOp) -> Value {
    match op {
        BinaryOp::And => Value::Bool(a && b),
        BinaryOp::Or => Value::Bool(a || b),
        _ => invalid_for("booleans", op),
    }
}

fn eval_string_binary(a: &str, b: &str, op: BinaryOp) -> Value {
    match op {
        BinaryOp::Add => Value::string(format!("{a}{b}")),
        // Lexicographic comparison
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        _ => invalid_for("strings", op),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grain_value::{Failure, TagRef};

    fn kind_of(v: &Value) -> Option<TagRef> {
        Failure::from_value(v).map(|f| f.kind)
    }

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(
            evaluate_binary(&Value::Int(7), &Value::Int(2), BinaryOp::Add),
            Value::Int(9)
        );
        assert_eq!(
            evaluate_binary(&Value::Int(7), &Value::Int(2), BinaryOp::Div),
            Value::Int(3)
        );
        assert_eq!(
            evaluate_binary(&Value::Int(7), &Value::Int(2), BinaryOp::Rem),
            Value::Int(1)
        );
    }

    #[test]
    fn test_division_by_zero_is_arithmetic_failure() {
        let v = evaluate_binary(&Value::Int(1), &Value::Int(0), BinaryOp::Div);
        assert_eq!(kind_of(&v), Some(TagRef::ARITHMETIC));
        let v = evaluate_binary(&Value::Float(1.0), &Value::Int(0), BinaryOp::Rem);
        assert_eq!(kind_of(&v), Some(TagRef::ARITHMETIC));
    }

    #[test]
    fn test_overflow_is_arithmetic_failure() {
        let v = evaluate_binary(&Value::Int(i64::MAX), &Value::Int(1), BinaryOp::Add);
        assert_eq!(kind_of(&v), Some(TagRef::ARITHMETIC));
        let v = evaluate_binary(&Value::Int(i64::MIN), &Value::Int(-1), BinaryOp::Div);
        assert_eq!(kind_of(&v), Some(TagRef::ARITHMETIC));
    }

    #[test]
    fn test_mixed_numbers_widen() {
        assert_eq!(
            evaluate_binary(&Value::Int(1), &Value::Float(0.5), BinaryOp::Add),
            Value::Float(1.5)
        );
        assert_eq!(
            evaluate_binary(&Value::Int(2), &Value::Float(2.0), BinaryOp::Eq),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_equality_across_kinds() {
        assert_eq!(
            evaluate_binary(&Value::string("a"), &Value::Int(1), BinaryOp::Eq),
            Value::Bool(false)
        );
        assert_eq!(
            evaluate_binary(&Value::Tag(TagRef::THREAD), &Value::Tag(TagRef::THREAD), BinaryOp::NotEq),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            evaluate_binary(&Value::string("ab"), &Value::string("c"), BinaryOp::Add),
            Value::string("abc")
        );
        assert_eq!(
            evaluate_binary(&Value::string("a"), &Value::string("b"), BinaryOp::Lt),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_type_error_is_shape_mismatch() {
        let v = evaluate_binary(&Value::string("a"), &Value::Int(1), BinaryOp::Add);
        assert_eq!(kind_of(&v), Some(TagRef::SHAPE_MISMATCH));
        let v = evaluate_binary(&Value::Bool(true), &Value::Bool(false), BinaryOp::Lt);
        assert_eq!(kind_of(&v), Some(TagRef::SHAPE_MISMATCH));
    }
}
