//! Dispatch resolver.
//!
//! Picks the overload of a function name that best matches an argument.
//!
//! # Candidate order
//!
//! The argument's driving tag (the first field carrying a tag) names the
//! module that declared it. That module's overloads are scored first; only
//! when none of them match are the overloads visible from the caller (the
//! caller, its dependencies, then core) scored. Within a group the strict
//! maximum by `Specificity` wins, a tie at the top is ambiguous, and a group
//! with no match falls through to the next.
//!
//! # Parent dispatch
//!
//! A parent request masks the tag on one argument field to a named ancestor
//! before scoring and admits only overloads that constrain some field to
//! that ancestor or one of its ancestors. The selected overload receives the
//! argument with the original tag restored on the field that was masked.
//!
//! # Memoization
//!
//! A decision is memoized only when no candidate needed a field default to
//! be scored. Defaults may read the module and application layers, so a
//! decision that depended on one can change while the signature does not.
//!
//! Resolution failures are `Failure` values; `Err` is reserved for internal
//! errors raised while evaluating field defaults.

mod cache;

use smallvec::SmallVec;

use grain_ir::{ExprId, MatchMode, ModuleId, Name};
use grain_types::{
    select_best, DefaultEvaluator, FunctionOverload, MatchOutcome, Matcher, Morphed, OverloadId,
    Program, Selection, Shape, Specificity, StructSig, TagValuePolicy,
};
use grain_value::errors::unknown_shape;
use grain_value::failure::{dispatch_ambiguous, dispatch_not_found};
use grain_value::{EvalError, EvalResult, Failure, Field, Structure, TagRef, Value};

pub use cache::DispatchCache;
use cache::CacheKey;

/// Re-dispatch with `field`'s tag masked to `ancestor`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParentMask {
    pub field: Name,
    pub ancestor: TagRef,
}

/// One call to resolve.
#[derive(Copy, Clone, Debug)]
pub struct DispatchRequest<'a> {
    /// Module the call is made from.
    pub caller: ModuleId,
    pub name: Name,
    /// Auto-wrapped argument.
    pub argument: &'a Structure,
    pub mask: Option<ParentMask>,
}

/// The selected overload and the argument morphed into its parameter shape.
#[derive(Clone, PartialEq, Debug)]
pub struct Resolved {
    pub overload: OverloadId,
    pub argument: Structure,
    pub score: Specificity,
}

/// Tag swap undone after a parent dispatch.
#[derive(Copy, Clone)]
struct Restore {
    /// Input position of the masked field.
    index: usize,
    original: TagRef,
    masked: TagRef,
}

/// Records whether scoring evaluated any field default.
struct ObservedDefaults<'d> {
    inner: &'d mut dyn DefaultEvaluator,
    evaluated: bool,
}

impl DefaultEvaluator for ObservedDefaults<'_> {
    fn eval_default(&mut self, shape: &Shape, expr: ExprId, bound: &Structure) -> EvalResult {
        self.evaluated = true;
        self.inner.eval_default(shape, expr, bound)
    }
}

/// Overload resolution over a sealed program.
#[derive(Copy, Clone)]
pub struct Resolver<'p> {
    program: &'p Program,
    matcher: Matcher<'p>,
}

impl<'p> Resolver<'p> {
    pub fn new(program: &'p Program, policy: TagValuePolicy) -> Self {
        Resolver {
            program,
            matcher: Matcher::new(program, policy),
        }
    }

    /// Resolve `request`, consulting and updating `cache`.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(function = self.program.name(request.name))
    )]
    pub fn resolve(
        &self,
        request: &DispatchRequest<'_>,
        cache: &mut DispatchCache,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<Result<Resolved, Failure>, EvalError> {
        let (argument, restore) = match request.mask {
            Some(mask) => match self.mask_argument(request.argument, mask) {
                Ok(masked) => masked,
                Err(failure) => return Ok(Err(failure)),
            },
            None => (request.argument.clone(), None),
        };

        let key = cache.is_enabled().then(|| CacheKey {
            module: request.caller,
            name: request.name,
            mask: request.mask.map(|m| (m.field, m.ancestor)),
            signature: StructSig::of(request.argument),
        });
        if let Some(key) = &key {
            if let Some(id) = cache.get(key) {
                if let Some(morphed) = self.rematch(id, &argument, defaults)? {
                    tracing::trace!(overload = ?id, "dispatch cache hit");
                    return Ok(Ok(finish(id, morphed, restore)));
                }
                cache.remove(key);
            }
        }

        let mut observed = ObservedDefaults {
            inner: defaults,
            evaluated: false,
        };
        let mut rejections: Vec<String> = Vec::new();
        for group in self.candidate_groups(request, &argument) {
            let mut matched = Vec::new();
            for overload in group {
                if let Some(reason) = self.prefilter(overload, &argument, request.mask) {
                    rejections.push(reason);
                    continue;
                }
                let shape = self
                    .program
                    .shape(overload.param)
                    .ok_or_else(|| unknown_shape(&format!("{:?}", overload.param)))?;
                match self.matcher.match_structure(
                    &argument,
                    shape,
                    MatchMode::Strict,
                    &mut observed,
                )? {
                    MatchOutcome::Matched(m) => {
                        let score = m.score;
                        matched.push(((overload.id, m), score));
                    }
                    MatchOutcome::Failed(f) => rejections.push(f.message),
                }
            }
            match select_best(matched) {
                Selection::None => {}
                Selection::Unique((overload, morphed), score) => {
                    tracing::debug!(?overload, ?score, "resolved");
                    match key {
                        Some(key) if !observed.evaluated => cache.insert(key, overload),
                        Some(_) => tracing::trace!("decision read a default, not memoized"),
                        None => {}
                    }
                    return Ok(Ok(finish(overload, morphed, restore)));
                }
                Selection::Ambiguous(tied) => {
                    tracing::debug!(candidates = tied.len(), "ambiguous dispatch");
                    return Ok(Err(self.ambiguous(request, &tied)));
                }
            }
        }
        Ok(Err(self.not_found(request, rejections)))
    }

    /// Origin-module overloads first, then everything visible from the caller.
    fn candidate_groups(
        &self,
        request: &DispatchRequest<'_>,
        argument: &Structure,
    ) -> SmallVec<[Vec<&'p FunctionOverload>; 2]> {
        let visible = self
            .program
            .symbols(request.caller)
            .lookup_overloads(request.name);
        let origin = argument
            .first_tagged()
            .map(|(_, tag)| self.program.tags().canonical(tag).module);
        let mut groups = SmallVec::new();
        match origin.and_then(|m| self.program.module(m)) {
            Some(symbols) => {
                let first: Vec<_> = symbols.local_overloads(request.name).collect();
                let rest: Vec<_> = visible
                    .into_iter()
                    .filter(|o| o.module() != symbols.id)
                    .collect();
                if !first.is_empty() {
                    groups.push(first);
                }
                groups.push(rest);
            }
            None => groups.push(visible),
        }
        groups
    }

    /// Cheap rejection before matching. Returns the reason when rejected.
    fn prefilter(
        &self,
        overload: &FunctionOverload,
        argument: &Structure,
        mask: Option<ParentMask>,
    ) -> Option<String> {
        if !overload.key.admits(argument) {
            return Some(format!(
                "needs at least {} fields, got {}",
                overload.key.mandatory,
                argument.len()
            ));
        }
        let mask = mask?;
        let constrains = self.program.shape(overload.param).is_some_and(|shape| {
            shape.fields.iter().any(|spec| {
                spec.tag
                    .is_some_and(|c| self.program.tags().is_same_or_descendant(mask.ancestor, c))
            })
        });
        (!constrains).then(|| {
            format!(
                "does not constrain a field to {} or an ancestor",
                self.program.render_tag(mask.ancestor)
            )
        })
    }

    fn mask_argument(
        &self,
        argument: &Structure,
        mask: ParentMask,
    ) -> Result<(Structure, Option<Restore>), Failure> {
        let field_name = self.program.name(mask.field);
        let Some(index) = argument.position(mask.field) else {
            return Err(dispatch_not_found(format!(
                "parent dispatch: argument has no field `{field_name}`"
            )));
        };
        let field = &argument.fields()[index];
        let Some(original) = field.carried_tag() else {
            return Err(dispatch_not_found(format!(
                "parent dispatch: field `{field_name}` carries no tag"
            )));
        };
        let tags = self.program.tags();
        if !tags.is_same_or_descendant(original, mask.ancestor) {
            return Err(dispatch_not_found(format!(
                "parent dispatch: {} is not under {}",
                self.program.render_tag(original),
                self.program.render_tag(mask.ancestor)
            )));
        }
        let masked = match field.value {
            Value::Tag(_) => field.with_value(Value::Tag(mask.ancestor)),
            _ => Field::new(field.name, Some(mask.ancestor), field.value.clone()),
        };
        let restore = Restore {
            index,
            original,
            masked: mask.ancestor,
        };
        Ok((argument.replace_at(index, masked), Some(restore)))
    }

    /// Re-morph against a cached choice. `None` when it no longer matches.
    fn rematch(
        &self,
        id: OverloadId,
        argument: &Structure,
        defaults: &mut dyn DefaultEvaluator,
    ) -> Result<Option<Morphed>, EvalError> {
        let Some(shape) = self
            .program
            .overload(id)
            .and_then(|o| self.program.shape(o.param))
        else {
            return Ok(None);
        };
        Ok(
            match self
                .matcher
                .match_structure(argument, shape, MatchMode::Strict, defaults)?
            {
                MatchOutcome::Matched(m) => Some(m),
                MatchOutcome::Failed(_) => None,
            },
        )
    }

    fn not_found(&self, request: &DispatchRequest<'_>, rejections: Vec<String>) -> Failure {
        let message = format!(
            "no overload of `{}` accepts {}",
            self.program.name(request.name),
            self.program.render(&Value::Structure(request.argument.clone()))
        );
        let errors = Structure::from_values(rejections.into_iter().map(Value::string));
        dispatch_not_found(message)
            .with_partial(request.argument.clone())
            .with_errors(errors)
    }

    fn ambiguous(&self, request: &DispatchRequest<'_>, tied: &[(OverloadId, Morphed)]) -> Failure {
        let message = format!(
            "call to `{}` is ambiguous: {} overloads match equally well",
            self.program.name(request.name),
            tied.len()
        );
        let errors = Structure::from_values(
            tied.iter()
                .map(|(id, _)| {
                    Value::string(format!("{}#{}", self.program.name(request.name), id.index))
                }),
        );
        dispatch_ambiguous(message)
            .with_partial(request.argument.clone())
            .with_errors(errors)
    }
}

/// Build the result, putting the original tag back on the field the masked
/// input field was bound to.
fn finish(overload: OverloadId, morphed: Morphed, restore: Option<Restore>) -> Resolved {
    let mut argument = morphed.value.clone();
    if let Some(restore) = restore {
        let target = morphed
            .output_of(restore.index)
            .and_then(|i| argument.fields().get(i).map(|f| (i, f)));
        let unmasked = target.and_then(|(i, field)| match &field.value {
            Value::Tag(t) if *t == restore.masked => {
                Some((i, field.with_value(Value::Tag(restore.original))))
            }
            _ if field.tag == Some(restore.masked) => Some((
                i,
                Field::new(field.name, Some(restore.original), field.value.clone()),
            )),
            _ => None,
        });
        if let Some((index, field)) = unmasked {
            argument = argument.replace_at(index, field);
        }
    }
    Resolved {
        overload,
        argument,
        score: morphed.score,
    }
}
