//! Reader-macro round trips: `'`, `` ` ``/`~`/`~@`, `@`, and `#(...)`,
//! exercised end to end through [`Interpreter::evaluate`] rather than by
//! inspecting the expanded form directly (see `expand.rs`'s own unit tests
//! for that).

use pretty_assertions::assert_eq;

use lambdatron::{print, Interpreter};

fn printed(interp: &mut Interpreter, source: &str) -> String {
    let value = interp.evaluate(source).into_result().unwrap_or_else(|e| {
        panic!("evaluating `{source}` failed: {e}");
    });
    print::pr_str(&value, interp.context()).unwrap()
}

#[test]
fn quote_suppresses_evaluation() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "'(1 2 3)"), "(1 2 3)");
}

#[test]
fn syntax_quote_unquote_splices_a_live_value_into_a_list() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "`(1 2 ~(+ 1 2))"), "(1 2 3)");
}

#[test]
fn syntax_quote_unquote_splicing_spreads_into_a_vector() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "`[1 ~@[2 3] 4]"), "[1 2 3 4]");
}

#[test]
fn deref_forwards_to_var_dereference() {
    let mut interp = Interpreter::new();
    interp.evaluate("(def x 5)").into_result().unwrap();
    assert_eq!(printed(&mut interp, "@(var x)"), "5");
}

#[test]
fn anonymous_fn_literal_with_one_placeholder() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(#(+ % 1) 5)"), "6");
}

#[test]
fn anonymous_fn_literal_with_numbered_placeholders() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(#(+ %1 %2) 1 2)"), "3");
}

#[test]
fn anonymous_fn_literal_with_variadic_placeholder() {
    let mut interp = Interpreter::new();
    assert_eq!(printed(&mut interp, "(#(apply + %&) 1 2 3)"), "6");
}
