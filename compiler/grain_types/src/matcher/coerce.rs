//! Per-field coercion: tag constraint, then value constraint.
//!
//! Assignment strength: exact kind 2, coerced 1 (int widening, scalar
//! wrap/unwrap, tag-by-value), unconstrained 0, plus `1 + depth` of a
//! checked tag constraint.

use grain_ir::{MatchMode, ScalarType};
use grain_value::errors::unknown_shape;
use grain_value::{EvalError, Field, TagRef, Value};

use super::{DefaultEvaluator, MatchOutcome, Matcher, MismatchReason};
use crate::shapes::{Constraint, FieldSpec};

/// A value accepted by a field spec.
pub(super) struct Coerced {
    pub value: Value,
    /// Annotation tag for the output field.
    pub tag: Option<TagRef>,
    pub strength: u32,
}

/// Why a value was rejected.
pub(super) struct Problem {
    pub reason: MismatchReason,
    pub message: String,
}

impl Problem {
    fn mismatch(message: String) -> Self {
        Problem {
            reason: MismatchReason::NoMatch,
            message,
        }
    }
}

impl Matcher<'_> {
    pub(super) fn coerce(
        &self,
        field: &Field,
        spec: &FieldSpec,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<Result<Coerced, Problem>, EvalError> {
        let mut coerced = Coerced {
            value: field.value.clone(),
            tag: field.tag,
            strength: 0,
        };
        if let Some(required) = spec.tag {
            if let Err(problem) = self.check_tag(field, required, spec, &mut coerced) {
                return Ok(Err(problem));
            }
        }
        Ok(self
            .check_constraint(&spec.constraint, coerced.value, defaults)?
            .map(|(value, strength)| Coerced {
                value,
                tag: coerced.tag,
                strength: coerced.strength + strength,
            }))
    }

    fn check_tag(
        &self,
        field: &Field,
        required: TagRef,
        spec: &FieldSpec,
        coerced: &mut Coerced,
    ) -> Result<(), Problem> {
        let tags = self.program.tags();
        let bonus = 1 + tags.depth(required);
        if let Some(carried) = field.carried_tag() {
            if tags.is_same_or_descendant(carried, required) {
                coerced.strength += bonus;
                return Ok(());
            }
            return Err(Problem::mismatch(format!(
                "tag {} is not {}",
                self.program.render_tag(carried),
                self.program.render_tag(required)
            )));
        }
        if !field.value.is_scalar() {
            return Err(Problem::mismatch(format!(
                "expected a tag under {}, got {}",
                self.program.render_tag(required),
                field.value.kind_name()
            )));
        }
        match tags.child_by_value(required, &field.value, self.policy) {
            Ok(Some(found)) => {
                // Tag-typed fields take the tag as their value; others keep
                // the scalar and carry the tag as an annotation.
                if matches!(
                    spec.constraint,
                    Constraint::Any | Constraint::Scalar(ScalarType::Tag)
                ) {
                    coerced.value = Value::Tag(found);
                } else {
                    coerced.tag = Some(found);
                }
                coerced.strength += bonus;
                Ok(())
            }
            Ok(None) => Err(Problem::mismatch(format!(
                "{} is not the value of any tag under {}",
                self.program.render(&field.value),
                self.program.render_tag(required)
            ))),
            Err(ambiguity) => Err(Problem {
                reason: MismatchReason::TagAmbiguous,
                message: format!(
                    "{} tags under {} share the value {}",
                    ambiguity.candidates.len(),
                    self.program.render_tag(required),
                    self.program.render(&field.value)
                ),
            }),
        }
    }

    fn check_constraint(
        &self,
        constraint: &Constraint,
        value: Value,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<Result<(Value, u32), Problem>, EvalError> {
        match constraint {
            Constraint::Any => Ok(Ok((value, 0))),
            Constraint::Scalar(kind) => Ok(match coerce_scalar(&value, *kind) {
                Some(accepted) => Ok(accepted),
                None => Err(Problem::mismatch(format!(
                    "expected {}, got {}",
                    kind.name(),
                    value.kind_name()
                ))),
            }),
            Constraint::Shape(id) => {
                let shape = self
                    .program
                    .shape(*id)
                    .ok_or_else(|| unknown_shape(&format!("{id:?}")))?;
                let strength = if matches!(value, Value::Structure(_)) { 2 } else { 1 };
                Ok(
                    match self.match_value(&value, shape, MatchMode::Strict, defaults)? {
                        MatchOutcome::Matched(m) => Ok((Value::Structure(m.value), strength)),
                        MatchOutcome::Failed(f) => Err(Problem {
                            reason: f.reason,
                            message: f.message,
                        }),
                    },
                )
            }
            Constraint::Union(members) => Ok(
                match self.match_union(&value, members, MatchMode::Strict, defaults)? {
                    MatchOutcome::Matched(m) => Ok((Value::Structure(m.value), 1)),
                    MatchOutcome::Failed(f) => Err(Problem {
                        reason: f.reason,
                        message: f.message,
                    }),
                },
            ),
        }
    }
}

/// Accept `value` as `kind`, returning the stored value and its strength.
pub(super) fn coerce_scalar(value: &Value, kind: ScalarType) -> Option<(Value, u32)> {
    let exact = matches!(
        (kind, value),
        (ScalarType::Int, Value::Int(_))
            | (ScalarType::Float, Value::Float(_))
            | (ScalarType::Number, Value::Int(_) | Value::Float(_))
            | (ScalarType::Bool, Value::Bool(_))
            | (ScalarType::Str, Value::Str(_))
            | (ScalarType::Tag, Value::Tag(_))
            | (ScalarType::Function, Value::Function(_))
    );
    if exact {
        return Some((value.clone(), 2));
    }
    match (kind, value) {
        (ScalarType::Float, Value::Int(_)) => value.as_float().map(|x| (Value::Float(x), 1)),
        (_, Value::Structure(s)) => {
            let inner = s.single()?;
            if matches!(inner, Value::Structure(_)) {
                return None;
            }
            coerce_scalar(inner, kind).map(|(v, _)| (v, 1))
        }
        _ => None,
    }
}
