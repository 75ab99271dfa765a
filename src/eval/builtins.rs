//! Host builtin registry (§6): the primitives registered by stable,
//! dot-prefixed name (`.cons`, `.assoc`, ...) plus the small set of bare
//! operators (`+`, `=`, `zero?`, ...) the bootstrap stdlib and user code
//! build on.

use std::rc::Rc;

use crate::context::Context;
use crate::error::EvalError;
use crate::print;
use crate::value::{Builtin, PersistentMap, Seq, Symbol, Value};

use super::{force_to_vec, values_equal};
use super::EvalOutcome;

type Fallible<T> = Result<T, EvalError>;

/// Registers every host builtin into `ctx`'s current namespace.
pub fn register_all(ctx: &Context) {
    reg(ctx, ".cons", builtin_cons);
    reg(ctx, ".assoc", builtin_assoc);
    reg(ctx, ".dissoc", builtin_dissoc);
    reg(ctx, ".get", builtin_get);
    reg(ctx, ".count", builtin_count);
    reg(ctx, ".first", builtin_first);
    reg(ctx, ".rest", builtin_rest);
    reg(ctx, ".conj", builtin_conj);
    reg(ctx, ".lazy-seq", builtin_lazy_seq);
    reg(ctx, ".deref", builtin_deref);
    reg(ctx, ".list", builtin_list);
    reg(ctx, ".concat", builtin_concat);
    reg(ctx, ".vec", builtin_vec);
    reg(ctx, ".hash-map", builtin_hash_map);
    reg(ctx, ".seq", builtin_seq);

    reg(ctx, "zero?", builtin_zero_p);
    reg(ctx, "inc", builtin_inc);
    reg(ctx, "dec", builtin_dec);
    reg(ctx, "+", builtin_add);
    reg(ctx, "-", builtin_sub);
    reg(ctx, "*", builtin_mul);
    reg(ctx, "/", builtin_div);
    reg(ctx, "=", builtin_eq);
    reg(ctx, "<", builtin_lt);
    reg(ctx, ">", builtin_gt);
    reg(ctx, "<=", builtin_le);
    reg(ctx, ">=", builtin_ge);
    reg(ctx, "print", builtin_print);
    reg(ctx, "println", builtin_println);
    reg(ctx, "str", builtin_str);
    reg(ctx, "not", builtin_not);
}

fn reg(ctx: &Context, name: &'static str, func: fn(&[Value], &Context) -> EvalOutcome) {
    let id = ctx.intern(name);
    let builtin = Value::BuiltIn(Rc::new(Builtin { name, func }));
    ctx.def(Symbol::unqualified(id), Some(builtin))
        .expect("builtin names are always unqualified");
}

fn arity(expected: impl std::fmt::Display, actual: usize) -> EvalOutcome {
    EvalOutcome::Failure(EvalError::arity(expected.to_string(), actual))
}

fn invalid(name: &'static str, message: impl Into<String>) -> EvalOutcome {
    EvalOutcome::Failure(EvalError::invalid_argument(name, message))
}

/// Realizes a collection-shaped value into an owned `Vec`, the way `.rest`,
/// `.concat`, and friends need (`Nil` as empty, a seq fully forced, a
/// vector cloned).
fn realize(v: &Value, ctx: &Context) -> Fallible<Vec<Value>> {
    match v {
        Value::Nil => Ok(Vec::new()),
        Value::Seq(s) => Ok(force_to_vec(s, ctx)?),
        Value::Vector(items) => Ok((**items).clone()),
        other => Err(EvalError::invalid_argument(
            "(seq operation)",
            format!("expected a seq, vector, or nil, got {}", other.type_name()),
        )),
    }
}

/// Coerces `v` to a `Seq` without forcing it, so consing onto an unforced
/// lazy tail (`(.cons x (lazy-seq ...))`) preserves its laziness.
fn to_seq(v: &Value) -> Fallible<Seq> {
    match v {
        Value::Seq(s) => Ok(s.clone()),
        Value::Nil => Ok(Seq::Empty),
        Value::Vector(items) => Ok(Seq::from_vec((**items).clone())),
        other => Err(EvalError::invalid_argument(
            "(seq operation)",
            format!("expected a seq, vector, or nil, got {}", other.type_name()),
        )),
    }
}

// --- Collection primitives -------------------------------------------------

fn builtin_cons(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.len() != 2 {
        return arity(2, args.len());
    }
    match to_seq(&args[1]) {
        Ok(tail) => EvalOutcome::Success(Value::Seq(Seq::cons(args[0].clone(), tail))),
        Err(e) => EvalOutcome::Failure(e),
    }
}

fn builtin_assoc(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.is_empty() || (args.len() - 1) % 2 != 0 {
        return arity("an odd count (coll plus key/value pairs)", args.len());
    }
    let mut coll = args[0].clone();
    let mut i = 1;
    while i < args.len() {
        let key = &args[i];
        let value = &args[i + 1];
        coll = match assoc_one(&coll, key, value) {
            Ok(v) => v,
            Err(e) => return EvalOutcome::Failure(e),
        };
        i += 2;
    }
    EvalOutcome::Success(coll)
}

fn assoc_one(coll: &Value, key: &Value, value: &Value) -> Fallible<Value> {
    match coll {
        Value::Map(map) => Ok(Value::Map(map.assoc(key.clone(), value.clone()))),
        Value::Vector(items) => {
            let index = match key {
                Value::Int(i) if *i >= 0 => *i as usize,
                _ => {
                    return Err(EvalError::invalid_argument(
                        ".assoc",
                        "vector keys must be non-negative integers",
                    ))
                }
            };
            if index > items.len() {
                return Err(EvalError::OutOfBounds {
                    index: index as i64,
                    len: items.len(),
                });
            }
            let mut out = (**items).clone();
            if index == out.len() {
                out.push(value.clone());
            } else {
                out[index] = value.clone();
            }
            Ok(Value::vector(out))
        }
        Value::Nil => Ok(Value::Map(PersistentMap::new().assoc(key.clone(), value.clone()))),
        other => Err(EvalError::invalid_argument(
            ".assoc",
            format!("expected a map, vector, or nil, got {}", other.type_name()),
        )),
    }
}

fn builtin_dissoc(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.is_empty() {
        return arity("at least 1", args.len());
    }
    let map = match &args[0] {
        Value::Map(m) => m.clone(),
        Value::Nil => return EvalOutcome::Success(Value::Nil),
        other => return invalid(".dissoc", format!("expected a map, got {}", other.type_name())),
    };
    let mut result = map;
    for key in &args[1..] {
        result = result.dissoc(key);
    }
    EvalOutcome::Success(Value::Map(result))
}

fn builtin_get(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.len() < 2 || args.len() > 3 {
        return arity("2 or 3", args.len());
    }
    let default = args.get(2).cloned().unwrap_or(Value::Nil);
    let found = match (&args[0], &args[1]) {
        (Value::Map(map), key) => map.get(key).cloned(),
        (Value::Vector(items), Value::Int(i)) if *i >= 0 && (*i as usize) < items.len() => {
            Some(items[*i as usize].clone())
        }
        (Value::Vector(_), _) => None,
        (Value::Nil, _) => None,
        (other, _) => return invalid(".get", format!("cannot get from {}", other.type_name())),
    };
    EvalOutcome::Success(found.unwrap_or(default))
}

fn builtin_count(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    let n = match &args[0] {
        Value::Nil => 0,
        Value::Seq(s) => match force_to_vec(s, ctx) {
            Ok(v) => v.len(),
            Err(e) => return EvalOutcome::Failure(e),
        },
        Value::Vector(items) => items.len(),
        Value::Map(map) => map.len(),
        Value::Str(s) => s.chars().count(),
        other => return invalid(".count", format!("cannot count a {}", other.type_name())),
    };
    EvalOutcome::Success(Value::Int(n as i64))
}

fn builtin_first(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    match &args[0] {
        Value::Nil => EvalOutcome::Success(Value::Nil),
        Value::Seq(s) => match super::force_step(s, ctx) {
            Ok(Some((h, _))) => EvalOutcome::Success(h),
            Ok(None) => EvalOutcome::Success(Value::Nil),
            Err(e) => EvalOutcome::Failure(e),
        },
        Value::Vector(items) => EvalOutcome::Success(items.first().cloned().unwrap_or(Value::Nil)),
        other => invalid(".first", format!("expected a seq, vector, or nil, got {}", other.type_name())),
    }
}

fn builtin_rest(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    match &args[0] {
        Value::Nil => EvalOutcome::Success(Value::Seq(Seq::Empty)),
        Value::Seq(s) => match super::force_step(s, ctx) {
            Ok(Some((_, t))) => EvalOutcome::Success(Value::Seq(t)),
            Ok(None) => EvalOutcome::Success(Value::Seq(Seq::Empty)),
            Err(e) => EvalOutcome::Failure(e),
        },
        Value::Vector(items) => {
            let tail = if items.is_empty() { &[][..] } else { &items[1..] };
            EvalOutcome::Success(Value::Seq(Seq::from_vec(tail.to_vec())))
        }
        other => invalid(".rest", format!("expected a seq, vector, or nil, got {}", other.type_name())),
    }
}

fn builtin_conj(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.is_empty() {
        return arity("at least 1", args.len());
    }
    let mut coll = args[0].clone();
    for item in &args[1..] {
        coll = match conj_one(&coll, item) {
            Ok(v) => v,
            Err(e) => return EvalOutcome::Failure(e),
        };
    }
    EvalOutcome::Success(coll)
}

fn conj_one(coll: &Value, item: &Value) -> Fallible<Value> {
    match coll {
        Value::Nil => Ok(Value::Seq(Seq::cons(item.clone(), Seq::Empty))),
        Value::Seq(s) => Ok(Value::Seq(Seq::cons(item.clone(), s.clone()))),
        Value::Vector(items) => {
            let mut out = (**items).clone();
            out.push(item.clone());
            Ok(Value::vector(out))
        }
        Value::Map(map) => match item {
            Value::Vector(pair) if pair.len() == 2 => Ok(Value::Map(map.assoc(pair[0].clone(), pair[1].clone()))),
            other => Err(EvalError::invalid_argument(
                ".conj",
                format!("conjoining onto a map requires a [k v] pair, got {}", other.type_name()),
            )),
        },
        other => Err(EvalError::invalid_argument(
            ".conj",
            format!("cannot conj onto a {}", other.type_name()),
        )),
    }
}

fn builtin_lazy_seq(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    EvalOutcome::Success(Value::Seq(Seq::lazy(args[0].clone(), ctx.clone())))
}

fn builtin_deref(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    match &args[0] {
        Value::Var(var) => EvalOutcome::from_result(var.deref()),
        other => invalid(".deref", format!("cannot deref a {}", other.type_name())),
    }
}

fn builtin_list(args: &[Value], _ctx: &Context) -> EvalOutcome {
    EvalOutcome::Success(Value::Seq(Seq::from_vec(args.to_vec())))
}

fn builtin_concat(args: &[Value], ctx: &Context) -> EvalOutcome {
    let mut out = Vec::new();
    for a in args {
        match realize(a, ctx) {
            Ok(mut v) => out.append(&mut v),
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    EvalOutcome::Success(Value::Seq(Seq::from_vec(out)))
}

fn builtin_vec(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    match realize(&args[0], ctx) {
        Ok(v) => EvalOutcome::Success(Value::vector(v)),
        Err(e) => EvalOutcome::Failure(e),
    }
}

/// `seq` (§4.7): `nil` for an empty collection, otherwise a `Seq` exposing
/// at least one forced element. Lets bootstrap code tell "empty" apart from
/// "first element happens to be falsy".
fn builtin_seq(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    match &args[0] {
        Value::Nil => EvalOutcome::Success(Value::Nil),
        Value::Vector(items) => {
            if items.is_empty() {
                EvalOutcome::Success(Value::Nil)
            } else {
                EvalOutcome::Success(Value::Seq(Seq::from_vec((**items).clone())))
            }
        }
        Value::Seq(s) => match super::force_step(s, ctx) {
            Ok(Some((h, t))) => EvalOutcome::Success(Value::Seq(Seq::cons(h, t))),
            Ok(None) => EvalOutcome::Success(Value::Nil),
            Err(e) => EvalOutcome::Failure(e),
        },
        other => invalid(".seq", format!("expected a seq, vector, or nil, got {}", other.type_name())),
    }
}

fn builtin_hash_map(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.len() % 2 != 0 {
        return arity("an even count", args.len());
    }
    let mut pairs = Vec::with_capacity(args.len() / 2);
    let mut i = 0;
    while i < args.len() {
        pairs.push((args[i].clone(), args[i + 1].clone()));
        i += 2;
    }
    EvalOutcome::Success(Value::Map(PersistentMap::from_pairs(pairs)))
}

// --- Numeric tower (§4.8) ---------------------------------------------------

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn add2(a: &Value, b: &Value, name: &'static str) -> Fallible<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(match x.checked_add(*y) {
            Some(r) => Value::Int(r),
            None => Value::Float(*x as f64 + *y as f64),
        }),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(as_f64(a).unwrap() + as_f64(b).unwrap()))
        }
        _ => Err(not_a_number(name, a, b)),
    }
}

fn sub2(a: &Value, b: &Value, name: &'static str) -> Fallible<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(match x.checked_sub(*y) {
            Some(r) => Value::Int(r),
            None => Value::Float(*x as f64 - *y as f64),
        }),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(as_f64(a).unwrap() - as_f64(b).unwrap()))
        }
        _ => Err(not_a_number(name, a, b)),
    }
}

fn mul2(a: &Value, b: &Value, name: &'static str) -> Fallible<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(match x.checked_mul(*y) {
            Some(r) => Value::Int(r),
            None => Value::Float(*x as f64 * *y as f64),
        }),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(as_f64(a).unwrap() * as_f64(b).unwrap()))
        }
        _ => Err(not_a_number(name, a, b)),
    }
}

fn div2(a: &Value, b: &Value, name: &'static str) -> Fallible<Value> {
    match (a, b) {
        (Value::Int(_), Value::Int(0)) => Err(EvalError::ArithmeticError(format!(
            "'{name}' divide by zero"
        ))),
        (Value::Int(x), Value::Int(y)) => {
            if x % y == 0 {
                Ok(Value::Int(x / y))
            } else {
                Ok(Value::Float(*x as f64 / *y as f64))
            }
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            Ok(Value::Float(as_f64(a).unwrap() / as_f64(b).unwrap()))
        }
        _ => Err(not_a_number(name, a, b)),
    }
}

fn not_a_number(name: &'static str, a: &Value, b: &Value) -> EvalError {
    EvalError::ArithmeticError(format!(
        "'{name}' requires numbers, got {} and {}",
        a.type_name(),
        b.type_name()
    ))
}

fn builtin_add(args: &[Value], _ctx: &Context) -> EvalOutcome {
    let mut acc = Value::Int(0);
    for a in args {
        match add2(&acc, a, "+") {
            Ok(v) => acc = v,
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    EvalOutcome::Success(acc)
}

fn builtin_sub(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.is_empty() {
        return arity("at least 1", 0);
    }
    if args.len() == 1 {
        return match sub2(&Value::Int(0), &args[0], "-") {
            Ok(v) => EvalOutcome::Success(v),
            Err(e) => EvalOutcome::Failure(e),
        };
    }
    let mut acc = args[0].clone();
    for a in &args[1..] {
        match sub2(&acc, a, "-") {
            Ok(v) => acc = v,
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    EvalOutcome::Success(acc)
}

fn builtin_mul(args: &[Value], _ctx: &Context) -> EvalOutcome {
    let mut acc = Value::Int(1);
    for a in args {
        match mul2(&acc, a, "*") {
            Ok(v) => acc = v,
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    EvalOutcome::Success(acc)
}

fn builtin_div(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.is_empty() {
        return arity("at least 1", 0);
    }
    if args.len() == 1 {
        return match div2(&Value::Int(1), &args[0], "/") {
            Ok(v) => EvalOutcome::Success(v),
            Err(e) => EvalOutcome::Failure(e),
        };
    }
    let mut acc = args[0].clone();
    for a in &args[1..] {
        match div2(&acc, a, "/") {
            Ok(v) => acc = v,
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    EvalOutcome::Success(acc)
}

fn numeric_cmp(args: &[Value], name: &'static str, ok: impl Fn(f64, f64) -> bool) -> EvalOutcome {
    if args.is_empty() {
        return arity("at least 1", 0);
    }
    for pair in args.windows(2) {
        let (a, b) = (as_f64(&pair[0]), as_f64(&pair[1]));
        match (a, b) {
            (Some(a), Some(b)) => {
                if !ok(a, b) {
                    return EvalOutcome::Success(Value::Bool(false));
                }
            }
            _ => return EvalOutcome::Failure(not_a_number(name, &pair[0], &pair[1])),
        }
    }
    EvalOutcome::Success(Value::Bool(true))
}

fn builtin_lt(args: &[Value], _ctx: &Context) -> EvalOutcome {
    numeric_cmp(args, "<", |a, b| a < b)
}
fn builtin_gt(args: &[Value], _ctx: &Context) -> EvalOutcome {
    numeric_cmp(args, ">", |a, b| a > b)
}
fn builtin_le(args: &[Value], _ctx: &Context) -> EvalOutcome {
    numeric_cmp(args, "<=", |a, b| a <= b)
}
fn builtin_ge(args: &[Value], _ctx: &Context) -> EvalOutcome {
    numeric_cmp(args, ">=", |a, b| a >= b)
}

fn builtin_zero_p(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    match as_f64(&args[0]) {
        Some(n) => EvalOutcome::Success(Value::Bool(n == 0.0)),
        None => invalid("zero?", format!("expected a number, got {}", args[0].type_name())),
    }
}

fn builtin_inc(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    match add2(&args[0], &Value::Int(1), "inc") {
        Ok(v) => EvalOutcome::Success(v),
        Err(e) => EvalOutcome::Failure(e),
    }
}

fn builtin_dec(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    match sub2(&args[0], &Value::Int(1), "dec") {
        Ok(v) => EvalOutcome::Success(v),
        Err(e) => EvalOutcome::Failure(e),
    }
}

// --- Equality, output, misc -------------------------------------------------

fn builtin_eq(args: &[Value], ctx: &Context) -> EvalOutcome {
    if args.is_empty() {
        return arity("at least 1", 0);
    }
    for pair in args.windows(2) {
        match values_equal(&pair[0], &pair[1], ctx) {
            Ok(true) => {}
            Ok(false) => return EvalOutcome::Success(Value::Bool(false)),
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    EvalOutcome::Success(Value::Bool(true))
}

fn builtin_not(args: &[Value], _ctx: &Context) -> EvalOutcome {
    if args.len() != 1 {
        return arity(1, args.len());
    }
    EvalOutcome::Success(Value::Bool(!args[0].is_truthy()))
}

fn builtin_str(args: &[Value], ctx: &Context) -> EvalOutcome {
    let mut out = String::new();
    for a in args {
        match print::display_str(a, ctx) {
            Ok(s) => out.push_str(&s),
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    EvalOutcome::Success(Value::string(out))
}

fn builtin_print(args: &[Value], ctx: &Context) -> EvalOutcome {
    let mut parts = Vec::with_capacity(args.len());
    for a in args {
        match print::display_str(a, ctx) {
            Ok(s) => parts.push(s),
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    ctx.write_output(&parts.join(" "));
    EvalOutcome::Success(Value::Nil)
}

fn builtin_println(args: &[Value], ctx: &Context) -> EvalOutcome {
    let mut parts = Vec::with_capacity(args.len());
    for a in args {
        match print::display_str(a, ctx) {
            Ok(s) => parts.push(s),
            Err(e) => return EvalOutcome::Failure(e),
        }
    }
    ctx.write_output(&parts.join(" "));
    ctx.write_output("\n");
    EvalOutcome::Success(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_ctx() -> Context {
        let ctx = Context::new_root("user");
        register_all(&ctx);
        ctx
    }

    #[test]
    fn assoc_on_empty_map_builds_a_map() {
        let ctx = fresh_ctx();
        let result = builtin_assoc(
            &[Value::Map(PersistentMap::new()), Value::Int(1), Value::Bool(true)],
            &ctx,
        );
        match result.into_result().unwrap() {
            Value::Map(m) => assert_eq!(m.get(&Value::Int(1)), Some(&Value::Bool(true))),
            _ => panic!("expected a map"),
        }
    }

    #[test]
    fn assoc_past_vector_end_is_out_of_bounds() {
        let ctx = fresh_ctx();
        let v = Value::vector(vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
        let result = builtin_assoc(&[v, Value::Int(4), Value::Int(99)], &ctx);
        assert!(matches!(
            result.into_result(),
            Err(EvalError::OutOfBounds { index: 4, len: 3 })
        ));
    }

    #[test]
    fn arithmetic_promotes_to_float_on_mixed_operands() {
        let ctx = fresh_ctx();
        let result = builtin_add(&[Value::Int(1), Value::Float(2.5)], &ctx);
        assert_eq!(result.into_result().unwrap(), Value::Float(3.5));
    }

    #[test]
    fn integer_division_by_zero_is_an_error() {
        let ctx = fresh_ctx();
        let result = builtin_div(&[Value::Int(1), Value::Int(0)], &ctx);
        assert!(matches!(result.into_result(), Err(EvalError::ArithmeticError(_))));
    }

    #[test]
    fn equality_is_forcing_aware_across_seqs_and_vectors() {
        let ctx = fresh_ctx();
        let seq = Value::Seq(Seq::from_vec(vec![Value::Int(1), Value::Int(2)]));
        let other = Value::Seq(Seq::from_vec(vec![Value::Int(1), Value::Int(2)]));
        let result = builtin_eq(&[seq, other], &ctx);
        assert_eq!(result.into_result().unwrap(), Value::Bool(true));
    }
}
