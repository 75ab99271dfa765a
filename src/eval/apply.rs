//! Function and macro application: arity selection, parameter binding, and
//! the `recur` trampoline (§4.4, §4.5, §9).

use std::rc::Rc;

use crate::context::Context;
use crate::error::EvalError;
use crate::value::{Arity, Lambda, Value};

use super::interpreter::eval_body;
use super::EvalOutcome;

/// Picks the arity matching `argc` (§4.4, §8): the unique exact fixed-arity
/// match if one exists, else the variadic arity with the largest fixed
/// count that is still `<= argc`.
fn select_arity(lambda: &Lambda, argc: usize) -> Result<&Arity, EvalError> {
    if let Some(a) = lambda
        .arities
        .iter()
        .find(|a| a.variadic.is_none() && a.fixed_count() == argc)
    {
        return Ok(a);
    }
    if let Some(a) = lambda
        .arities
        .iter()
        .filter(|a| a.variadic.is_some() && a.fixed_count() <= argc)
        .max_by_key(|a| a.fixed_count())
    {
        return Ok(a);
    }
    Err(EvalError::arity(describe_arities(lambda), argc))
}

fn describe_arities(lambda: &Lambda) -> String {
    lambda
        .arities
        .iter()
        .map(|a| {
            if a.variadic.is_some() {
                format!("at least {}", a.fixed_count())
            } else {
                a.fixed_count().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Binds a freshly-called arity's parameters from the original call-site
/// arguments: the variadic tail (if any) is collected into a seq.
fn bind_initial(arity: &Arity, args: &[Value], ctx: &Context) {
    for (param, value) in arity.params.iter().zip(args.iter()) {
        ctx.bind(*param, value.clone());
    }
    if let Some(rest) = arity.variadic {
        let tail = args[arity.params.len()..].to_vec();
        ctx.bind(rest, Value::Seq(crate::value::Seq::from_vec(tail)));
    }
}

/// Binds parameters from a `recur` sentinel: the variadic slot (if any) is
/// the last recur argument taken as-is, already whatever collection the
/// caller built (§4.5).
fn bind_recur(arity: &Arity, args: &[Value], ctx: &Context) {
    for (param, value) in arity.params.iter().zip(args.iter()) {
        ctx.bind(*param, value.clone());
    }
    if let Some(rest) = arity.variadic {
        ctx.bind(rest, args[arity.params.len()].clone());
    }
}

/// Applies `lambda` to `args`, trampolining `recur` sentinels returned from
/// the body in O(1) host stack (§5, §8). `self_value` is the `Value`
/// wrapper (`Function` or `Macro`) bound under the lambda's self-name, if
/// it has one.
pub fn apply_lambda(
    lambda: &Rc<Lambda>,
    self_value: Value,
    args: &[Value],
    ctx: &Context,
) -> EvalOutcome {
    let arity = match select_arity(lambda, args.len()) {
        Ok(a) => a,
        Err(e) => return EvalOutcome::Failure(e),
    };

    let call_ctx = lambda.captured.child();
    if let Some(name) = lambda.self_name {
        call_ctx.bind(name, self_value.clone());
    }
    bind_initial(arity, args, &call_ctx);
    let mut outcome = eval_body(&arity.body, &call_ctx);

    loop {
        match outcome {
            EvalOutcome::Recur(new_args) => {
                let expected = arity.params.len() + if arity.variadic.is_some() { 1 } else { 0 };
                if new_args.len() != expected {
                    return EvalOutcome::Failure(EvalError::RecurArityMismatch {
                        expected,
                        actual: new_args.len(),
                    });
                }
                let call_ctx = lambda.captured.child();
                if let Some(name) = lambda.self_name {
                    call_ctx.bind(name, self_value.clone());
                }
                bind_recur(arity, &new_args, &call_ctx);
                outcome = eval_body(&arity.body, &call_ctx);
            }
            other => return other,
        }
    }
}
