//! End-to-end tests: source text in, printed value out, through the full
//! lex -> parse -> expand -> eval pipeline (including the bootstrap stdlib).

use pretty_assertions::assert_eq;

use lambdatron::{print, EvalError, Interpreter, LambdatronError, Value};

fn eval(interp: &mut Interpreter, source: &str) -> Value {
    interp.evaluate(source).into_result().unwrap_or_else(|e| {
        panic!("evaluating `{source}` failed: {e}");
    })
}

fn eval_err(interp: &mut Interpreter, source: &str) -> LambdatronError {
    interp
        .evaluate(source)
        .into_result()
        .expect_err("expected an error")
}

fn printed(interp: &mut Interpreter, source: &str) -> String {
    let value = eval(interp, source);
    print::pr_str(&value, interp.context()).unwrap()
}

// ============================================
// assoc on maps and vectors
// ============================================

#[test]
fn assoc_on_empty_map_builds_a_map() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(.assoc {} 1 true 2 false)"), "{1 true, 2 false}");
}

#[test]
fn assoc_past_vector_end_is_out_of_bounds() {
    let mut interp = Interpreter::new();
    let err = eval_err(&mut interp, "(.assoc [10 20 30] 4 99)");
    assert!(matches!(
        err,
        LambdatronError::Eval(EvalError::OutOfBounds { index: 4, len: 3 })
    ));
}

// ============================================
// recursive functions and arity dispatch
// ============================================

#[test]
fn recursive_factorial_via_self_name() {
    let mut interp = Interpreter::new();
    let result = eval(
        &mut interp,
        "((fn fact [n] (if (zero? n) 1 (* n (fact (dec n))))) 5)",
    );
    assert_eq!(result, Value::Int(120));
}

// ============================================
// loop/recur trampolines without growing the host stack
// ============================================

#[test]
fn loop_recur_counts_a_million_without_overflowing() {
    let mut interp = Interpreter::new();
    let result = eval(
        &mut interp,
        "(loop [n 1000000 acc 0] (if (zero? n) acc (recur (dec n) (inc acc))))",
    );
    assert_eq!(result, Value::Int(1000000));
}

// ============================================
// lazy sequences
// ============================================

#[test]
fn take_of_an_infinite_iterate_is_bounded() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(take 5 (iterate inc 0))"), "(0 1 2 3 4)");
}

#[test]
fn cycle_repeats_a_finite_collection_forever() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(take 5 (cycle [1 2]))"), "(1 2 1 2 1)");
}

#[test]
fn repeat_with_a_count_stops() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(repeat 3 :x)"), "(:x :x :x)");
}

#[test]
fn remove_filters_lazily() {
    let mut interp = Interpreter::new();
    assert_eq!(
        printed(&mut interp, "(take 3 (remove zero? (iterate inc 0)))"),
        "(1 2 3)"
    );
}

#[test]
fn interleave_zips_two_collections() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(interleave [1 2 3] [:a :b :c])"), "(1 :a 2 :b 3 :c)");
}

#[test]
fn interpose_inserts_a_separator() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(interpose :- [1 2 3])"), "(1 :- 2 :- 3)");
}

#[test]
fn list_star_splices_a_trailing_collection() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(list* 1 2 [3 4])"), "(1 2 3 4)");
}

// ============================================
// let / binding vectors
// ============================================

#[test]
fn let_bindings_see_earlier_bindings() {
    let mut interp = Interpreter::new();
    let result = eval(&mut interp, "(let [x 10 y (+ x 1)] (+ x y))");
    assert_eq!(result, Value::Int(21));
}

#[test]
fn let_rejects_an_odd_length_binding_vector() {
    let mut interp = Interpreter::new();
    let err = eval_err(&mut interp, "(let [x])");
    assert!(matches!(err, LambdatronError::Eval(EvalError::BindingMismatch)));
}

// ============================================
// macros from the bootstrap stdlib
// ============================================

#[test]
fn defn_defines_a_named_function() {
    let mut interp = Interpreter::new();
    eval(&mut interp, "(defn square [x] (* x x))");
    assert_eq!(eval(&mut interp, "(square 7)"), Value::Int(49));
}

#[test]
fn when_runs_body_only_if_test_is_truthy() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(when false 1 2 3)"), Value::Nil);
    assert_eq!(eval(&mut interp, "(when true 1 2 3)"), Value::Int(3));
}

#[test]
fn thread_first_rewrites_each_step_as_the_first_argument() {
    let mut interp = Interpreter::new();
    assert_eq!(eval(&mut interp, "(-> 1 (+ 2) (* 3))"), Value::Int(9));
}
