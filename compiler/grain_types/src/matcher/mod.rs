//! Structural matcher and morpher.
//!
//! `Matcher::match_structure` binds a shape's field specs to an input
//! structure in four ordered passes:
//!
//! 1. **Name**: specs bind input fields with the identical name.
//! 2. **Tag**: tag-constrained specs bind the unused input field whose tag is
//!    the constraint or a descendant; the deepest candidate wins and a tie is
//!    ambiguous.
//! 3. **Position**: remaining specs, in declaration order, bind the remaining
//!    unnamed input fields in structural order.
//! 4. **Defaults**: unbound specs evaluate their default with the bound
//!    fields as input; unbound required specs fail the match.
//!
//! Strict mode drops unused input fields; weak mode appends them verbatim.
//! A failed match is data (`MatchFailure`), never an `Err`. `Err` is reserved
//! for evaluator-internal errors raised while evaluating defaults.

mod coerce;
mod specificity;

use grain_ir::{ExprId, MatchMode, Name, ShapeId, StringLookup};
use grain_value::errors::{internal, unknown_shape};
use grain_value::{EvalError, EvalResult, Failure, Field, Structure, TagRef, Value};

use crate::program::Program;
use crate::shapes::{FieldSpec, Shape};
use crate::tags::TagValuePolicy;

pub use specificity::{select_best, Selection, Specificity};

/// Evaluates default expressions during pass 4.
///
/// The interpreter implements this; `expr` indexes the arena of the module
/// that owns `shape`.
pub trait DefaultEvaluator {
    fn eval_default(&mut self, shape: &Shape, expr: ExprId, bound: &Structure) -> EvalResult;
}

/// Default evaluator for contexts that have no interpreter.
///
/// Any default expression it is asked to run is an internal error.
pub struct NoDefaults;

impl DefaultEvaluator for NoDefaults {
    fn eval_default(&mut self, _shape: &Shape, expr: ExprId, _bound: &Structure) -> EvalResult {
        Err(internal(format!(
            "default expression {expr:?} evaluated without an interpreter"
        )))
    }
}

/// Why a match failed. Ordered by severity.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum MismatchReason {
    NoMatch,
    /// Tag pass or union tie.
    Ambiguous,
    /// Tag-by-value lookup found several tags.
    TagAmbiguous,
}

/// Problem with one field spec.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FieldDetail {
    pub field: Option<Name>,
    /// Index of the spec in the shape.
    pub position: usize,
    pub problem: String,
}

/// A structured match failure.
#[derive(Clone, PartialEq, Debug)]
pub struct MatchFailure {
    pub reason: MismatchReason,
    pub message: String,
    /// Fields bound before the failure, in declaration order.
    pub partial: Structure,
    pub details: Vec<FieldDetail>,
}

impl MatchFailure {
    /// Convert into a failure value.
    pub fn into_failure(self) -> Failure {
        let kind = match self.reason {
            MismatchReason::TagAmbiguous => TagRef::TAG_AMBIGUOUS,
            MismatchReason::NoMatch | MismatchReason::Ambiguous => TagRef::SHAPE_MISMATCH,
        };
        let errors = self
            .details
            .into_iter()
            .map(|d| Field::new(d.field, None, Value::string(d.problem)))
            .collect();
        Failure::new(kind, self.message)
            .with_partial(self.partial)
            .with_errors(errors)
    }
}

/// A successful morph.
#[derive(Clone, PartialEq, Debug)]
pub struct Morphed {
    pub value: Structure,
    pub score: Specificity,
    /// Input index each output field was bound from; `None` for defaults.
    pub origins: Vec<Option<usize>>,
}

impl Morphed {
    /// Output position of the field bound from input field `input`.
    pub fn output_of(&self, input: usize) -> Option<usize> {
        self.origins.iter().position(|o| *o == Some(input))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum MatchOutcome {
    Matched(Morphed),
    Failed(MatchFailure),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    /// Morphed structure as a value, or the failure value.
    pub fn into_value(self) -> Value {
        match self {
            MatchOutcome::Matched(m) => Value::Structure(m.value),
            MatchOutcome::Failed(f) => f.into_failure().into_value(),
        }
    }
}

/// Per-match bookkeeping.
struct MatchState<'a> {
    input: &'a Structure,
    used: Vec<bool>,
    bound: Vec<Option<Field>>,
    origin: Vec<Option<usize>>,
    failed: Vec<bool>,
    score: Specificity,
    details: Vec<FieldDetail>,
    reason: MismatchReason,
}

impl MatchState<'_> {
    fn open(&self, spec: usize) -> bool {
        self.bound[spec].is_none() && !self.failed[spec]
    }

    fn bound_structure(&self) -> Structure {
        self.bound.iter().flatten().cloned().collect()
    }

    fn fail(&mut self, spec: usize, field: Option<Name>, reason: MismatchReason, problem: String) {
        self.failed[spec] = true;
        self.reason = self.reason.max(reason);
        self.details.push(FieldDetail {
            field,
            position: spec,
            problem,
        });
    }
}

/// Shape matcher over a sealed program.
#[derive(Copy, Clone)]
pub struct Matcher<'p> {
    program: &'p Program,
    policy: TagValuePolicy,
}

impl<'p> Matcher<'p> {
    pub fn new(program: &'p Program, policy: TagValuePolicy) -> Self {
        Matcher { program, policy }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Match a value, auto-wrapping scalars.
    pub fn match_value(
        &self,
        value: &Value,
        shape: &Shape,
        mode: MatchMode,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<MatchOutcome, EvalError> {
        match value {
            Value::Structure(s) => self.match_structure(s, shape, mode, defaults),
            scalar => {
                self.match_structure(&Structure::wrap(scalar.clone()), shape, mode, defaults)
            }
        }
    }

    /// Run the four passes of `shape` against `input`.
    #[tracing::instrument(level = "trace", skip_all, fields(shape = self.shape_label(shape)))]
    pub fn match_structure(
        &self,
        input: &Structure,
        shape: &Shape,
        mode: MatchMode,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<MatchOutcome, EvalError> {
        let specs = &shape.fields;
        let mut state = MatchState {
            input,
            used: vec![false; input.len()],
            bound: vec![None; specs.len()],
            origin: vec![None; specs.len()],
            failed: vec![false; specs.len()],
            score: Specificity::default(),
            details: Vec::new(),
            reason: MismatchReason::NoMatch,
        };

        self.name_pass(&mut state, specs, defaults)?;
        self.tag_pass(&mut state, specs, defaults)?;
        self.positional_pass(&mut state, specs, defaults)?;
        self.default_pass(&mut state, shape, defaults)?;

        if !state.details.is_empty() {
            let first = &state.details[0];
            let subject = match first.field {
                Some(name) => format!("field `{}`", self.program.name(name)),
                None => format!("field #{}", first.position),
            };
            let message = format!(
                "structure does not match {}: {subject}: {}",
                self.shape_label(shape),
                first.problem
            );
            tracing::trace!(%message, "match failed");
            return Ok(MatchOutcome::Failed(MatchFailure {
                reason: state.reason,
                message,
                partial: state.bound_structure(),
                details: state.details,
            }));
        }

        let mut fields = Vec::with_capacity(specs.len());
        let mut origins = Vec::with_capacity(specs.len());
        for (field, origin) in state.bound.into_iter().zip(state.origin) {
            if let Some(field) = field {
                fields.push(field);
                origins.push(origin);
            }
        }
        if mode == MatchMode::Weak {
            for (ii, (field, used)) in input.fields().iter().zip(&state.used).enumerate() {
                if !used {
                    fields.push(field.clone());
                    origins.push(Some(ii));
                }
            }
        }
        tracing::trace!(score = ?state.score, "matched");
        Ok(MatchOutcome::Matched(Morphed {
            value: Structure::new(fields),
            score: state.score,
            origins,
        }))
    }

    fn name_pass(
        &self,
        state: &mut MatchState<'_>,
        specs: &[FieldSpec],
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<(), EvalError> {
        for (si, spec) in specs.iter().enumerate() {
            let Some(name) = spec.name else { continue };
            let found = state
                .input
                .fields()
                .iter()
                .enumerate()
                .position(|(i, f)| !state.used[i] && f.name == Some(name));
            if let Some(ii) = found {
                state.used[ii] = true;
                if self.bind(state, si, spec, ii, defaults)? {
                    state.score.named += 1;
                }
            }
        }
        Ok(())
    }

    fn tag_pass(
        &self,
        state: &mut MatchState<'_>,
        specs: &[FieldSpec],
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<(), EvalError> {
        let tags = self.program.tags();
        for (si, spec) in specs.iter().enumerate() {
            let Some(required) = spec.tag else { continue };
            if !state.open(si) {
                continue;
            }
            let mut best: Option<(u32, usize)> = None;
            let mut tied = false;
            for (ii, field) in state.input.fields().iter().enumerate() {
                if state.used[ii] {
                    continue;
                }
                let Some(carried) = field.carried_tag() else { continue };
                if !tags.is_same_or_descendant(carried, required) {
                    continue;
                }
                let depth = tags.depth(carried);
                match best {
                    Some((d, _)) if depth < d => {}
                    Some((d, _)) if depth == d => tied = true,
                    _ => {
                        best = Some((depth, ii));
                        tied = false;
                    }
                }
            }
            match best {
                Some(_) if tied => {
                    let problem = format!(
                        "several fields carry a tag under {} at the same depth",
                        self.program.render_tag(required)
                    );
                    state.fail(si, spec.name, MismatchReason::Ambiguous, problem);
                }
                Some((_, ii)) => {
                    state.used[ii] = true;
                    self.bind(state, si, spec, ii, defaults)?;
                }
                None => {}
            }
        }
        Ok(())
    }

    fn positional_pass(
        &self,
        state: &mut MatchState<'_>,
        specs: &[FieldSpec],
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<(), EvalError> {
        let mut cursor = 0;
        for (si, spec) in specs.iter().enumerate() {
            if !state.open(si) {
                continue;
            }
            let next = (cursor..state.input.len()).find(|&i| !state.used[i]);
            let Some(ii) = next else { break };
            cursor = ii + 1;
            state.used[ii] = true;
            if self.bind(state, si, spec, ii, defaults)? {
                state.score.positional += 1;
            }
        }
        Ok(())
    }

    fn default_pass(
        &self,
        state: &mut MatchState<'_>,
        shape: &Shape,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<(), EvalError> {
        for (si, spec) in shape.fields.iter().enumerate() {
            if !state.open(si) {
                continue;
            }
            if let Some(expr) = spec.default {
                let bound = state.bound_structure();
                let value = defaults.eval_default(shape, expr, &bound)?;
                if let Some(failure) = Failure::from_value(&value) {
                    let problem = format!("default failed: {}", failure.message);
                    state.fail(si, spec.name, MismatchReason::NoMatch, problem);
                } else {
                    state.bound[si] = Some(Field::new(spec.name, None, value));
                }
            } else if spec.required {
                state.fail(
                    si,
                    spec.name,
                    MismatchReason::NoMatch,
                    "missing required field".to_string(),
                );
            }
        }
        Ok(())
    }

    /// Coerce input field `ii` into spec `si`. Returns whether it bound.
    fn bind(
        &self,
        state: &mut MatchState<'_>,
        si: usize,
        spec: &FieldSpec,
        ii: usize,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<bool, EvalError> {
        let input = state.input;
        let field = &input.fields()[ii];
        match self.coerce(field, spec, defaults)? {
            Ok(coerced) => {
                state.score.strength += coerced.strength;
                if spec.tag.is_some() {
                    state.score.tagged += 1;
                }
                let name = spec.name;
                state.bound[si] = Some(Field::new(name, coerced.tag, coerced.value));
                state.origin[si] = Some(ii);
                Ok(true)
            }
            Err(problem) => {
                state.fail(si, spec.name, problem.reason, problem.message);
                Ok(false)
            }
        }
    }

    /// Match against every member of a union and keep the unique best.
    pub fn match_union(
        &self,
        value: &Value,
        members: &[ShapeId],
        mode: MatchMode,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<MatchOutcome, EvalError> {
        let mut matched = Vec::new();
        let mut details = Vec::new();
        for (position, id) in members.iter().enumerate() {
            let shape = self
                .program
                .shape(*id)
                .ok_or_else(|| unknown_shape(&format!("{id:?}")))?;
            match self.match_value(value, shape, mode, defaults)? {
                MatchOutcome::Matched(m) => {
                    let score = m.score;
                    matched.push((m, score));
                }
                MatchOutcome::Failed(f) => details.push(FieldDetail {
                    field: (!shape.is_anonymous()).then_some(shape.name),
                    position,
                    problem: f.message,
                }),
            }
        }
        let labels = members
            .iter()
            .filter_map(|id| self.program.shape(*id))
            .map(|s| self.shape_label(s))
            .collect::<Vec<_>>()
            .join(" | ");
        Ok(match select_best(matched) {
            Selection::Unique(m, _) => MatchOutcome::Matched(m),
            Selection::None => MatchOutcome::Failed(MatchFailure {
                reason: MismatchReason::NoMatch,
                message: format!("no member of {labels} matches"),
                partial: Structure::empty(),
                details,
            }),
            Selection::Ambiguous(tied) => MatchOutcome::Failed(MatchFailure {
                reason: MismatchReason::Ambiguous,
                message: format!(
                    "{} members of {labels} match equally well",
                    tied.len()
                ),
                partial: Structure::empty(),
                details,
            }),
        })
    }

    fn shape_label(&self, shape: &Shape) -> String {
        if shape.is_anonymous() {
            "parameter shape".to_string()
        } else {
            format!("`{}`", self.program.interner().lookup(shape.name))
        }
    }
}
