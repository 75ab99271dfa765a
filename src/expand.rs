//! Reader-macro expansion (§4.3): a single pass over the parsed value tree
//! that resolves `syntax-quote`/`unquote`/`unquote-splicing`, forwards
//! `deref` to its host primitive, and lowers `#(...)` anonymous-function
//! literals. After this pass the only reader form left in the tree is
//! `quote` (dispatched directly by the evaluator as a special form).

use crate::context::Context;
use crate::error::ReadError;
use crate::parser::markers;
use crate::value::{Seq, SpecialForm, Symbol, Value};

/// Expands every reader-macro marker in `form`.
pub fn expand(form: &Value, ctx: &Context) -> Result<Value, ReadError> {
    match form {
        Value::Seq(seq) => expand_seq_form(seq, ctx),
        Value::Vector(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(expand(item, ctx)?);
            }
            Ok(Value::vector(out))
        }
        Value::Map(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (k, v) in map.iter() {
                pairs.push((expand(k, ctx)?, expand(v, ctx)?));
            }
            Ok(Value::Map(crate::value::PersistentMap::from_pairs(pairs)))
        }
        other => Ok(other.clone()),
    }
}

fn expand_seq_form(seq: &Seq, ctx: &Context) -> Result<Value, ReadError> {
    if seq.is_known_empty() {
        return Ok(Value::Seq(Seq::empty()));
    }
    let elems = seq.to_vec_realized();

    if let Value::Special(SpecialForm::Quote) = &elems[0] {
        return Ok(Value::Seq(Seq::from_vec(elems)));
    }
    if let Some(inner) = marker_arg(&elems, markers::SYNTAX_QUOTE, ctx) {
        return expand_sq(inner, 1, ctx);
    }
    if marker_arg(&elems, markers::UNQUOTE, ctx).is_some() {
        return Err(ReadError::UnquoteOutsideSyntaxQuote);
    }
    if marker_arg(&elems, markers::UNQUOTE_SPLICING, ctx).is_some() {
        return Err(ReadError::UnquoteOutsideSyntaxQuote);
    }
    if let Some(body) = marker_arg(&elems, markers::DEREF, ctx) {
        let expanded = expand(body, ctx)?;
        let deref_sym = Value::Symbol(Symbol::unqualified(ctx.intern(".deref")));
        return Ok(Value::Seq(Seq::from_vec(vec![deref_sym, expanded])));
    }
    if let Some(body) = marker_arg(&elems, markers::FN_LIT, ctx) {
        return expand_fn_lit(body, ctx);
    }

    let mut out = Vec::with_capacity(elems.len());
    for elem in elems {
        out.push(expand(&elem, ctx)?);
    }
    Ok(Value::Seq(Seq::from_vec(out)))
}

/// If `elems` is the 2-element marker list `(name arg)`, returns `arg`.
fn marker_arg<'a>(elems: &'a [Value], name: &str, ctx: &Context) -> Option<&'a Value> {
    if elems.len() != 2 {
        return None;
    }
    match &elems[0] {
        Value::Symbol(sym) if sym.ns.is_none() && ctx.resolve_name(sym.name) == name => {
            Some(&elems[1])
        }
        _ => None,
    }
}

fn is_marker(form: &Value, name: &str, ctx: &Context) -> Option<Value> {
    if let Value::Seq(seq) = form {
        if !seq.is_known_empty() {
            let elems = seq.to_vec_realized();
            if let Some(arg) = marker_arg(&elems, name, ctx) {
                return Some(arg.clone());
            }
        }
    }
    None
}

fn list_call(ctx: &Context, name: &str, args: Vec<Value>) -> Value {
    let mut elems = Vec::with_capacity(args.len() + 1);
    elems.push(Value::Symbol(Symbol::unqualified(ctx.intern(name))));
    elems.extend(args);
    Value::Seq(Seq::from_vec(elems))
}

fn quote_value(v: Value) -> Value {
    Value::Seq(Seq::from_vec(vec![Value::Special(SpecialForm::Quote), v]))
}

/// Expands the body of a `syntax-quote` at the given nesting `depth`
/// (§4.3). Produces ordinary, evaluable code: literal data is wrapped in
/// `quote`, and sequences are rebuilt via `.list`/`.concat`/`.vec` calls so
/// that `unquote`/`unquote-splicing` at `depth == 1` can substitute live
/// values when that code is later evaluated (typically inside a macro
/// body).
fn expand_sq(form: &Value, depth: usize, ctx: &Context) -> Result<Value, ReadError> {
    if let Some(inner) = is_marker(form, markers::UNQUOTE, ctx) {
        return if depth == 1 {
            expand(&inner, ctx)
        } else {
            Ok(list_call(
                ctx,
                ".list",
                vec![
                    quote_value(Value::Symbol(Symbol::unqualified(ctx.intern(markers::UNQUOTE)))),
                    expand_sq(&inner, depth - 1, ctx)?,
                ],
            ))
        };
    }
    if let Some(inner) = is_marker(form, markers::UNQUOTE_SPLICING, ctx) {
        return if depth == 1 {
            Err(ReadError::SpliceOutsideSequence)
        } else {
            Ok(list_call(
                ctx,
                ".list",
                vec![
                    quote_value(Value::Symbol(Symbol::unqualified(
                        ctx.intern(markers::UNQUOTE_SPLICING),
                    ))),
                    expand_sq(&inner, depth - 1, ctx)?,
                ],
            ))
        };
    }
    if let Some(inner) = is_marker(form, markers::SYNTAX_QUOTE, ctx) {
        return Ok(list_call(
            ctx,
            ".list",
            vec![
                quote_value(Value::Symbol(Symbol::unqualified(
                    ctx.intern(markers::SYNTAX_QUOTE),
                ))),
                expand_sq(&inner, depth + 1, ctx)?,
            ],
        ));
    }

    match form {
        Value::Seq(seq) => {
            if seq.is_known_empty() {
                return Ok(quote_value(Value::Seq(Seq::empty())));
            }
            expand_sq_elements(&seq.to_vec_realized(), depth, ctx)
        }
        Value::Vector(items) => {
            let built = expand_sq_elements(items, depth, ctx)?;
            Ok(list_call(ctx, ".vec", vec![built]))
        }
        Value::Map(map) => {
            let mut parts = Vec::with_capacity(map.len() * 2);
            for (k, v) in map.iter() {
                parts.push(expand_sq(k, depth, ctx)?);
                parts.push(expand_sq(v, depth, ctx)?);
            }
            Ok(list_call(ctx, ".hash-map", parts))
        }
        Value::Symbol(sym) => {
            let qualified = if sym.is_qualified() {
                *sym
            } else {
                Symbol::qualified(ctx.current_namespace().name, sym.name)
            };
            Ok(quote_value(Value::Symbol(qualified)))
        }
        other => Ok(quote_value(other.clone())),
    }
}

fn expand_sq_elements(elems: &[Value], depth: usize, ctx: &Context) -> Result<Value, ReadError> {
    let mut parts = Vec::with_capacity(elems.len());
    for elem in elems {
        if depth == 1 {
            if let Some(inner) = is_marker(elem, markers::UNQUOTE, ctx) {
                parts.push(list_call(ctx, ".list", vec![expand(&inner, ctx)?]));
                continue;
            }
            if let Some(inner) = is_marker(elem, markers::UNQUOTE_SPLICING, ctx) {
                parts.push(expand(&inner, ctx)?);
                continue;
            }
        }
        parts.push(list_call(ctx, ".list", vec![expand_sq(elem, depth, ctx)?]));
    }
    Ok(list_call(ctx, ".concat", parts))
}

/// Lowers `#(...)` (§4.3): scans `body` for `%`, `%1`, `%2`, ... and `%&`,
/// normalizes bare `%` to `%1`, and builds `(fn [%1 ... %&] body)`.
fn expand_fn_lit(body: &Value, ctx: &Context) -> Result<Value, ReadError> {
    let normalized = normalize_percent(body, ctx);
    let (max_index, variadic) = scan_placeholders(&normalized, ctx);

    let mut params = Vec::with_capacity(max_index + if variadic { 1 } else { 0 });
    for i in 1..=max_index {
        params.push(Value::Symbol(Symbol::unqualified(
            ctx.intern(&format!("%{i}")),
        )));
    }
    if variadic {
        params.push(Value::Symbol(Symbol::unqualified(ctx.intern("&"))));
        params.push(Value::Symbol(Symbol::unqualified(ctx.intern("%&"))));
    }

    let expanded_body = expand(&normalized, ctx)?;
    Ok(Value::Seq(Seq::from_vec(vec![
        Value::Special(SpecialForm::Fn),
        Value::vector(params),
        expanded_body,
    ])))
}

fn normalize_percent(form: &Value, ctx: &Context) -> Value {
    match form {
        Value::Symbol(sym) if sym.ns.is_none() && ctx.resolve_name(sym.name) == "%" => {
            Value::Symbol(Symbol::unqualified(ctx.intern("%1")))
        }
        Value::Seq(seq) => {
            Value::Seq(Seq::from_vec(
                seq.to_vec_realized()
                    .iter()
                    .map(|v| normalize_percent(v, ctx))
                    .collect(),
            ))
        }
        Value::Vector(items) => {
            Value::vector(items.iter().map(|v| normalize_percent(v, ctx)).collect())
        }
        Value::Map(map) => Value::Map(crate::value::PersistentMap::from_pairs(
            map.iter()
                .map(|(k, v)| (normalize_percent(k, ctx), normalize_percent(v, ctx)))
                .collect(),
        )),
        other => other.clone(),
    }
}

fn scan_placeholders(form: &Value, ctx: &Context) -> (usize, bool) {
    match form {
        Value::Symbol(sym) if sym.ns.is_none() => {
            let name = ctx.resolve_name(sym.name);
            if name == "%&" {
                (0, true)
            } else if let Some(digits) = name.strip_prefix('%') {
                match digits.parse::<usize>() {
                    Ok(n) => (n, false),
                    Err(_) => (0, false),
                }
            } else {
                (0, false)
            }
        }
        Value::Seq(seq) => fold_placeholders(seq.to_vec_realized().iter(), ctx),
        Value::Vector(items) => fold_placeholders(items.iter(), ctx),
        Value::Map(map) => {
            let mut acc = (0, false);
            for (k, v) in map.iter() {
                acc = merge(acc, scan_placeholders(k, ctx));
                acc = merge(acc, scan_placeholders(v, ctx));
            }
            acc
        }
        _ => (0, false),
    }
}

fn fold_placeholders<'a>(items: impl Iterator<Item = &'a Value>, ctx: &Context) -> (usize, bool) {
    items.fold((0, false), |acc, item| merge(acc, scan_placeholders(item, ctx)))
}

fn merge(a: (usize, bool), b: (usize, bool)) -> (usize, bool) {
    (a.0.max(b.0), a.1 || b.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::InternStore;
    use crate::lexer::tokenize;
    use crate::parser::parse_all;

    fn expand_source(src: &str) -> Value {
        let ctx = Context::new_root("user");
        let toks = tokenize(src).unwrap();
        let parsed = {
            let root = ctx.root();
            let mut interner = root.interner.borrow_mut();
            parse_all(&toks, &mut interner).unwrap()
        };
        expand(&parsed[0], &ctx).unwrap()
    }

    #[test]
    fn quote_is_left_untouched() {
        let v = expand_source("(quote (a b))");
        match v {
            Value::Seq(_) => {}
            _ => panic!("expected a seq"),
        }
    }

    #[test]
    fn deref_forwards_to_host_primitive() {
        let ctx = Context::new_root("user");
        let toks = tokenize("@x").unwrap();
        let parsed = {
            let root = ctx.root();
            let mut interner = root.interner.borrow_mut();
            parse_all(&toks, &mut interner).unwrap()
        };
        let expanded = expand(&parsed[0], &ctx).unwrap();
        match expanded {
            Value::Seq(seq) => {
                let elems = seq.to_vec_realized();
                assert_eq!(elems.len(), 2);
                match &elems[0] {
                    Value::Symbol(s) => assert_eq!(ctx.resolve_name(s.name), ".deref"),
                    _ => panic!("expected a symbol"),
                }
            }
            _ => panic!("expected a seq"),
        }
    }

    #[test]
    fn unquote_outside_syntax_quote_is_an_error() {
        let ctx = Context::new_root("user");
        let toks = tokenize("~x").unwrap();
        let parsed = {
            let root = ctx.root();
            let mut interner = root.interner.borrow_mut();
            parse_all(&toks, &mut interner).unwrap()
        };
        assert!(matches!(
            expand(&parsed[0], &ctx),
            Err(ReadError::UnquoteOutsideSyntaxQuote)
        ));
    }

    #[test]
    fn fn_lit_lowers_to_fn_with_numbered_params() {
        let v = expand_source("#(+ % 1)");
        match v {
            Value::Seq(seq) => {
                let elems = seq.to_vec_realized();
                assert_eq!(elems[0], Value::Special(SpecialForm::Fn));
                match &elems[1] {
                    Value::Vector(params) => assert_eq!(params.len(), 1),
                    _ => panic!("expected a param vector"),
                }
            }
            _ => panic!("expected a seq"),
        }
    }

    #[test]
    fn fn_lit_with_variadic_placeholder() {
        let v = expand_source("#(apply + %&)");
        match v {
            Value::Seq(seq) => {
                let elems = seq.to_vec_realized();
                match &elems[1] {
                    Value::Vector(params) => assert_eq!(params.len(), 2),
                    _ => panic!("expected a param vector"),
                }
            }
            _ => panic!("expected a seq"),
        }
    }
}
