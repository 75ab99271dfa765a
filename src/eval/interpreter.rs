//! The evaluator core (§4.4): form dispatch, implicit-`do` body evaluation,
//! lazy-seq forcing, and the public [`Interpreter`] facade.

use std::rc::Rc;

use crate::bootstrap;
use crate::context::Context;
use crate::error::{EvalError, LambdatronError, ReadError};
use crate::expand;
use crate::lexer;
use crate::parser;
use crate::value::{PersistentMap, Seq, SeqNode, Value};

use super::apply;
use super::builtins;
use super::special_forms;
use super::EvalOutcome;

/// Evaluates `form` in `ctx` (§4.4's dispatch table).
pub fn eval_form(form: &Value, ctx: &Context) -> EvalOutcome {
    match form {
        Value::Symbol(sym) => EvalOutcome::from_result(ctx.resolve(*sym)),
        Value::Vector(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                match eval_form(item, ctx) {
                    EvalOutcome::Success(v) => out.push(v),
                    EvalOutcome::Failure(e) => return EvalOutcome::Failure(e),
                    EvalOutcome::Recur(_) => return EvalOutcome::Failure(EvalError::RecurMisuse),
                }
            }
            EvalOutcome::Success(Value::vector(out))
        }
        Value::Map(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (k, v) in map.iter() {
                let key = match eval_form(k, ctx) {
                    EvalOutcome::Success(v) => v,
                    EvalOutcome::Failure(e) => return EvalOutcome::Failure(e),
                    EvalOutcome::Recur(_) => return EvalOutcome::Failure(EvalError::RecurMisuse),
                };
                let value = match eval_form(v, ctx) {
                    EvalOutcome::Success(v) => v,
                    EvalOutcome::Failure(e) => return EvalOutcome::Failure(e),
                    EvalOutcome::Recur(_) => return EvalOutcome::Failure(EvalError::RecurMisuse),
                };
                pairs.push((key, value));
            }
            EvalOutcome::Success(Value::Map(PersistentMap::from_pairs(pairs)))
        }
        Value::Seq(seq) => eval_seq_form(seq, ctx),
        atom => EvalOutcome::Success(atom.clone()),
    }
}

fn eval_seq_form(seq: &Seq, ctx: &Context) -> EvalOutcome {
    if seq.is_known_empty() {
        return EvalOutcome::Success(Value::Seq(Seq::empty()));
    }
    let elems = seq.to_vec_realized();
    let head_value = match eval_form(&elems[0], ctx) {
        EvalOutcome::Success(v) => v,
        EvalOutcome::Failure(e) => return EvalOutcome::Failure(e),
        EvalOutcome::Recur(_) => return EvalOutcome::Failure(EvalError::RecurMisuse),
    };
    let tail = &elems[1..];

    match head_value {
        Value::Special(tag) => special_forms::dispatch(tag, tail, ctx),
        Value::Macro(lambda) => {
            let expansion = match apply::apply_lambda(&lambda, Value::Macro(lambda.clone()), tail, ctx) {
                EvalOutcome::Success(v) => v,
                other => return other,
            };
            eval_form(&expansion, ctx)
        }
        Value::Function(lambda) => {
            let args = match eval_args(tail, ctx) {
                Ok(a) => a,
                Err(outcome) => return outcome,
            };
            apply::apply_lambda(&lambda, Value::Function(lambda.clone()), &args, ctx)
        }
        Value::BuiltIn(builtin) => {
            let args = match eval_args(tail, ctx) {
                Ok(a) => a,
                Err(outcome) => return outcome,
            };
            (builtin.func)(&args, ctx)
        }
        other => EvalOutcome::Failure(EvalError::NotEvalable(other.type_name())),
    }
}

pub(crate) fn eval_args(forms: &[Value], ctx: &Context) -> Result<Vec<Value>, EvalOutcome> {
    let mut out = Vec::with_capacity(forms.len());
    for form in forms {
        match eval_form(form, ctx) {
            EvalOutcome::Success(v) => out.push(v),
            EvalOutcome::Failure(e) => return Err(EvalOutcome::Failure(e)),
            EvalOutcome::Recur(_) => return Err(EvalOutcome::Failure(EvalError::RecurMisuse)),
        }
    }
    Ok(out)
}

/// Evaluates `body` as an implicit `do` (§4.5): every form but the last is
/// evaluated for effect only; the last form's outcome (including a `Recur`
/// sentinel, legal only here) is returned as-is.
pub(crate) fn eval_body(body: &[Value], ctx: &Context) -> EvalOutcome {
    if body.is_empty() {
        return EvalOutcome::Success(Value::Nil);
    }
    for form in &body[..body.len() - 1] {
        match eval_form(form, ctx) {
            EvalOutcome::Success(_) => {}
            EvalOutcome::Failure(e) => return EvalOutcome::Failure(e),
            EvalOutcome::Recur(_) => return EvalOutcome::Failure(EvalError::RecurMisuse),
        }
    }
    eval_form(&body[body.len() - 1], ctx)
}

/// Invokes a zero-argument callable (a `lazy-seq` thunk), per §4.7.
fn call_thunk(thunk: &Value, ctx: &Context) -> Result<Value, EvalError> {
    match thunk {
        Value::Function(lambda) => {
            apply::apply_lambda(lambda, Value::Function(lambda.clone()), &[], ctx).into_result()
        }
        Value::BuiltIn(b) => (b.func)(&[], ctx).into_result(),
        other => Err(EvalError::NotEvalable(other.type_name())),
    }
}

/// Forces exactly one seq node to weak-head-normal form and returns its
/// `(head, tail)`, or `None` for the empty seq (§4.7).
pub fn force_step(seq: &Seq, ctx: &Context) -> Result<Option<(Value, Seq)>, EvalError> {
    match seq {
        Seq::Empty => Ok(None),
        Seq::Node(node) => match &**node {
            SeqNode::Cons(h, t) => Ok(Some((h.clone(), t.clone()))),
            SeqNode::Lazy(cell) => {
                let needs_force = matches!(&*cell.borrow(), crate::value::LazyState::Unforced { .. });
                if needs_force {
                    let (thunk, thunk_ctx) = match &*cell.borrow() {
                        crate::value::LazyState::Unforced { thunk, ctx } => {
                            (thunk.clone(), ctx.clone())
                        }
                        crate::value::LazyState::Forced(_) => unreachable!(),
                    };
                    let result = call_thunk(&thunk, &thunk_ctx)?;
                    let forced = match result {
                        Value::Nil => Seq::Empty,
                        Value::Seq(s) => s,
                        other => Seq::cons(other, Seq::Empty),
                    };
                    *cell.borrow_mut() = crate::value::LazyState::Forced(forced);
                }
                match &*cell.borrow() {
                    crate::value::LazyState::Forced(inner) => force_step(inner, ctx),
                    crate::value::LazyState::Unforced { .. } => unreachable!(),
                }
            }
        },
    }
}

/// Fully realizes `seq` into a `Vec`, forcing every lazy node along the way.
/// Callers that only need part of a (possibly infinite) seq should use
/// [`force_step`] directly instead.
pub fn force_to_vec(seq: &Seq, ctx: &Context) -> Result<Vec<Value>, EvalError> {
    let mut out = Vec::new();
    let mut cur = seq.clone();
    while let Some((h, t)) = force_step(&cur, ctx)? {
        out.push(h);
        cur = t;
    }
    Ok(out)
}

/// Forcing-aware structural equality (§3, §4.7): unlike [`Value`]'s
/// `PartialEq`, this will force lazy seqs element-by-element rather than
/// conservatively treating them as unequal.
pub fn values_equal(a: &Value, b: &Value, ctx: &Context) -> Result<bool, EvalError> {
    match (a, b) {
        (Value::Seq(sa), Value::Seq(sb)) => {
            let (step_a, step_b) = (force_step(sa, ctx)?, force_step(sb, ctx)?);
            match (step_a, step_b) {
                (None, None) => Ok(true),
                (Some((ha, ta)), Some((hb, tb))) => {
                    Ok(values_equal(&ha, &hb, ctx)? && values_equal(&Value::Seq(ta), &Value::Seq(tb), ctx)?)
                }
                _ => Ok(false),
            }
        }
        (Value::Vector(va), Value::Vector(vb)) => {
            if va.len() != vb.len() {
                return Ok(false);
            }
            for (x, y) in va.iter().zip(vb.iter()) {
                if !values_equal(x, y, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Value::Map(ma), Value::Map(mb)) => {
            if ma.len() != mb.len() {
                return Ok(false);
            }
            for (k, v) in ma.iter() {
                match mb.get(k) {
                    Some(v2) if values_equal(v, v2, ctx)? => {}
                    _ => return Ok(false),
                }
            }
            Ok(true)
        }
        _ => Ok(*a == *b),
    }
}

/// `apply`'s "coll" argument flattening (§4.5): `Nil`, a seq, a vector, or
/// a map (flattened to `[k v]` pairs) forced fully into a `Vec`.
pub(crate) fn flatten_apply_coll(coll: &Value, ctx: &Context) -> Result<Vec<Value>, EvalError> {
    match coll {
        Value::Nil => Ok(Vec::new()),
        Value::Seq(s) => force_to_vec(s, ctx),
        Value::Vector(items) => Ok((**items).clone()),
        Value::Map(map) => Ok(map
            .iter()
            .map(|(k, v)| Value::vector(vec![k.clone(), v.clone()]))
            .collect()),
        other => Err(EvalError::invalid_argument(
            "apply",
            format!("last argument must be a collection, got {}", other.type_name()),
        )),
    }
}

/// What `Interpreter::evaluate` returns (§6): read failures and eval
/// failures are surfaced as distinct, typed outcomes rather than folded
/// into one variant.
#[derive(Debug, Clone)]
pub enum EvalResult {
    Success(Value),
    ReadFailure(ReadError),
    EvalFailure(EvalError),
}

impl EvalResult {
    /// Converts to a single `Result` via [`LambdatronError`], for callers
    /// (the CLI driver) that want one error type.
    pub fn into_result(self) -> Result<Value, LambdatronError> {
        match self {
            EvalResult::Success(v) => Ok(v),
            EvalResult::ReadFailure(e) => Err(LambdatronError::Read(e)),
            EvalResult::EvalFailure(e) => Err(LambdatronError::Eval(e)),
        }
    }
}

/// Configuration for a fresh [`Interpreter`] (§2.1's ambient-stack
/// addition): whether to run the embedded bootstrap stdlib, which
/// namespace to start in, and where `println`-family output goes.
pub struct InterpreterOptions {
    pub default_namespace: String,
    pub run_bootstrap: bool,
    pub write_output: Rc<dyn Fn(&str)>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        InterpreterOptions {
            default_namespace: "user".to_string(),
            run_bootstrap: true,
            write_output: Rc::new(|s: &str| print!("{s}")),
        }
    }
}

impl std::fmt::Debug for InterpreterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpreterOptions")
            .field("default_namespace", &self.default_namespace)
            .field("run_bootstrap", &self.run_bootstrap)
            .finish()
    }
}

/// The embeddable evaluator facade (§6): owns a root [`Context`] and runs
/// source text through lex -> parse -> expand -> eval.
pub struct Interpreter {
    ctx: Context,
    options_namespace: String,
    write_output: Rc<dyn Fn(&str)>,
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("options_namespace", &self.options_namespace)
            .finish()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates a fresh interpreter with the default options, running
    /// bootstrap immediately. Panics if bootstrap itself fails to parse or
    /// evaluate, per §6's "fatal at bootstrap" rule.
    pub fn new() -> Self {
        Self::with_options(InterpreterOptions::default())
    }

    /// Creates a fresh interpreter with `options`.
    pub fn with_options(options: InterpreterOptions) -> Self {
        let ctx = Context::new_root_with_output(&options.default_namespace, options.write_output.clone());
        builtins::register_all(&ctx);
        let mut interp = Interpreter {
            ctx,
            options_namespace: options.default_namespace.clone(),
            write_output: options.write_output,
        };
        if options.run_bootstrap {
            interp.run_bootstrap();
        }
        interp
    }

    fn run_bootstrap(&mut self) {
        match self.evaluate(bootstrap::SOURCE) {
            EvalResult::Success(_) => {}
            EvalResult::ReadFailure(e) => panic!("bootstrap failed to read: {e}"),
            EvalResult::EvalFailure(e) => panic!("bootstrap failed to evaluate: {e}"),
        }
    }

    /// Discards all namespace/Var state and rebuilds a fresh interpreter in
    /// place, re-running bootstrap.
    pub fn reset(&mut self) {
        let ctx = Context::new_root_with_output(&self.options_namespace, self.write_output.clone());
        builtins::register_all(&ctx);
        self.ctx = ctx;
        self.run_bootstrap();
    }

    /// Reads, expands, and evaluates every top-level form in `text`,
    /// returning the value of the last one.
    pub fn evaluate(&mut self, text: &str) -> EvalResult {
        let tokens = match lexer::tokenize(text) {
            Ok(t) => t,
            Err(e) => return EvalResult::ReadFailure(e),
        };
        let forms = {
            let root = self.ctx.root();
            let mut interner = root.interner.borrow_mut();
            match parser::parse_all(&tokens, &mut interner) {
                Ok(f) => f,
                Err(e) => return EvalResult::ReadFailure(e),
            }
        };

        let mut last = Value::Nil;
        for form in &forms {
            let expanded = match expand::expand(form, &self.ctx) {
                Ok(v) => v,
                Err(e) => return EvalResult::ReadFailure(e),
            };
            match eval_form(&expanded, &self.ctx).into_result() {
                Ok(v) => last = v,
                Err(e) => return EvalResult::EvalFailure(e),
            }
        }
        EvalResult::Success(last)
    }

    /// The current namespace, as the root context exposes it.
    pub fn current_namespace_name(&self) -> String {
        let id = self.ctx.current_namespace().name;
        self.ctx.resolve_name(id)
    }

    /// Exposes the root context, e.g. for a REPL driver that wants to
    /// resolve Vars or intern symbols directly.
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms_self_evaluate() {
        let ctx = Context::new_root("user");
        assert_eq!(eval_form(&Value::Int(5), &ctx).into_result().unwrap(), Value::Int(5));
        assert_eq!(eval_form(&Value::Nil, &ctx).into_result().unwrap(), Value::Nil);
    }

    #[test]
    fn empty_seq_evaluates_to_empty_seq() {
        let ctx = Context::new_root("user");
        let form = Value::Seq(Seq::empty());
        match eval_form(&form, &ctx).into_result().unwrap() {
            Value::Seq(s) => assert!(s.is_known_empty()),
            _ => panic!("expected a seq"),
        }
    }

    #[test]
    fn unresolved_symbol_is_an_error() {
        let ctx = Context::new_root("user");
        let sym = crate::value::Symbol::unqualified(ctx.intern("nope"));
        let outcome = eval_form(&Value::Symbol(sym), &ctx);
        assert!(matches!(outcome, EvalOutcome::Failure(EvalError::InvalidSymbol(_))));
    }

    #[test]
    fn recur_outside_tail_position_is_misuse() {
        let ctx = Context::new_root("user");
        let recur = Value::Seq(Seq::from_vec(vec![Value::Special(crate::value::SpecialForm::Recur)]));
        let vector_with_recur = Value::vector(vec![recur]);
        let outcome = eval_form(&vector_with_recur, &ctx);
        assert!(matches!(outcome, EvalOutcome::Failure(EvalError::RecurMisuse)));
    }
}
