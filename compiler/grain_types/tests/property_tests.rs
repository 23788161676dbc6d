//! Property-based tests for the structural matcher.
//!
//! Random structures are matched against a fixed set of shapes and checked
//! for the strict/weak containment laws and for tie handling in selection.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use grain_ir::{ExprArena, MatchMode, ScalarType, ShapeId, SharedArena, SharedInterner};
use grain_types::{
    select_best, Constraint, FieldSpec, MatchOutcome, Matcher, NoDefaults, Program, ProgramBuilder,
    Selection, Specificity, TagValuePolicy,
};
use grain_value::{Field, Structure, Value};
use proptest::prelude::*;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

struct Setup {
    program: Program,
    interner: SharedInterner,
    shapes: Vec<ShapeId>,
}

fn setup() -> Setup {
    let interner = SharedInterner::new();
    let mut builder = ProgramBuilder::new(interner.clone());
    let module = builder
        .add_module(interner.intern("props"), &[], SharedArena::new(ExprArena::new()))
        .unwrap();
    let n = |s: &str| interner.intern(s);
    let mut m = builder.module(module).unwrap();
    let shapes = vec![
        m.add_shape(
            n("pair"),
            vec![
                FieldSpec::named(n("a"), Constraint::Scalar(ScalarType::Int)),
                FieldSpec::named(n("b"), Constraint::Any),
            ],
        )
        .unwrap(),
        m.add_shape(
            n("loose"),
            vec![
                FieldSpec::named(n("c"), Constraint::Any).optional(),
                FieldSpec::positional(Constraint::Any).optional(),
            ],
        )
        .unwrap(),
        m.add_shape(
            n("numbers"),
            vec![
                FieldSpec::named(n("a"), Constraint::Scalar(ScalarType::Float)),
                FieldSpec::positional(Constraint::Scalar(ScalarType::Int)),
                FieldSpec::named(n("e"), Constraint::Scalar(ScalarType::Bool)).optional(),
            ],
        )
        .unwrap(),
    ];
    drop(m);
    Setup {
        program: builder.finish(),
        interner,
        shapes,
    }
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        (-1.0e6..1.0e6f64).prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
        "[a-z]{0,4}".prop_map(|s| Value::string(s)),
    ]
}

/// Fields as (name index or none, value).
fn fields_strategy() -> impl Strategy<Value = Vec<(Option<usize>, Value)>> {
    prop::collection::vec(
        (prop::option::of(0..NAMES.len()), value_strategy()),
        0..7,
    )
}

fn build(setup: &Setup, raw: &[(Option<usize>, Value)]) -> Structure {
    raw.iter()
        .map(|(name, value)| {
            Field::new(
                name.map(|i| setup.interner.intern(NAMES[i])),
                None,
                value.clone(),
            )
        })
        .collect()
}

fn run(setup: &Setup, input: &Structure, shape: ShapeId, mode: MatchMode) -> MatchOutcome {
    let shape = setup.program.shape(shape).unwrap();
    Matcher::new(&setup.program, TagValuePolicy::Strict)
        .match_structure(input, shape, mode, &mut NoDefaults)
        .unwrap()
}

fn specificity_strategy() -> impl Strategy<Value = Specificity> {
    (0..3u32, 0..3u32, 0..4u32, 0..3u32).prop_map(|(named, tagged, strength, positional)| {
        Specificity {
            named,
            tagged,
            strength,
            positional,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn strict_result_only_has_spec_fields(raw in fields_strategy(), which in 0..3usize) {
        let setup = setup();
        let shape_id = setup.shapes[which];
        let input = build(&setup, &raw);
        if let MatchOutcome::Matched(m) = run(&setup, &input, shape_id, MatchMode::Strict) {
            let shape = setup.program.shape(shape_id).unwrap();
            prop_assert!(m.value.len() <= shape.fields.len());
            for field in m.value.fields() {
                if let Some(name) = field.name {
                    prop_assert!(shape.field(name).is_some());
                }
            }
            let unnamed_specs = shape.fields.iter().filter(|f| f.name.is_none()).count();
            prop_assert!(m.value.unnamed().count() <= unnamed_specs);
        }
    }

    #[test]
    fn weak_result_contains_strict_result(raw in fields_strategy(), which in 0..3usize) {
        let setup = setup();
        let shape_id = setup.shapes[which];
        let input = build(&setup, &raw);
        let strict = run(&setup, &input, shape_id, MatchMode::Strict);
        let weak = run(&setup, &input, shape_id, MatchMode::Weak);
        prop_assert_eq!(strict.is_match(), weak.is_match());
        if let (MatchOutcome::Matched(s), MatchOutcome::Matched(w)) = (strict, weak) {
            prop_assert_eq!(s.score, w.score);
            prop_assert!(w.value.len() >= s.value.len());
            prop_assert_eq!(&w.value.fields()[..s.value.len()], s.value.fields());
        }
    }

    #[test]
    fn weak_keeps_every_input_field(raw in fields_strategy()) {
        let setup = setup();
        let input = build(&setup, &raw);
        // `loose` has only optional unconstrained specs, so it always matches
        // and every input field is either bound or carried over.
        let MatchOutcome::Matched(w) = run(&setup, &input, setup.shapes[1], MatchMode::Weak) else {
            return Err(TestCaseError::fail("optional-only shape must match"));
        };
        prop_assert_eq!(w.value.len(), input.len());
        for field in input.fields() {
            prop_assert!(w.value.fields().iter().any(|f| f.value == field.value));
        }
    }

    #[test]
    fn selection_never_breaks_ties(scores in prop::collection::vec(specificity_strategy(), 0..8)) {
        let candidates: Vec<(usize, Specificity)> = scores.iter().copied().enumerate().collect();
        let top = scores.iter().max().copied();
        let top_count = scores.iter().filter(|s| Some(**s) == top).count();
        match select_best(candidates) {
            Selection::None => prop_assert!(scores.is_empty()),
            Selection::Unique(index, score) => {
                prop_assert_eq!(top_count, 1);
                prop_assert_eq!(Some(score), top);
                prop_assert_eq!(Some(scores[index]), top);
            }
            Selection::Ambiguous(tied) => {
                prop_assert!(top_count > 1);
                prop_assert_eq!(tied.len(), top_count);
                for index in tied {
                    prop_assert_eq!(Some(scores[index]), top);
                }
            }
        }
    }

    #[test]
    fn specificity_order_is_total(a in specificity_strategy(), b in specificity_strategy()) {
        let forward = a.cmp(&b);
        prop_assert_eq!(forward.reverse(), b.cmp(&a));
        prop_assert_eq!(forward == std::cmp::Ordering::Equal, a == b);
    }
}
