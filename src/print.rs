//! Canonical value printing (§6).
//!
//! Two flavors, matching Clojure's own split: [`pr_str`] produces a
//! readable form (strings quoted and escaped, chars backslash-prefixed) fit
//! for `read` to round-trip; [`display_str`] is the human-facing form used
//! by `str`/`print`/`println` (strings unquoted, `nil` prints as `""`).
//! Both force lazy seqs as they print them, so both need a [`Context`].

use std::fmt::Write as _;

use crate::context::Context;
use crate::error::EvalError;
use crate::eval::force_step;
use crate::value::Value;

/// Canonical readable form.
pub fn pr_str(value: &Value, ctx: &Context) -> Result<String, EvalError> {
    let mut out = String::new();
    write_value(&mut out, value, ctx, true)?;
    Ok(out)
}

/// Human-facing form (`str`/`println`): strings unquoted, `nil` is the
/// empty string at the top level.
pub fn display_str(value: &Value, ctx: &Context) -> Result<String, EvalError> {
    if let Value::Nil = value {
        return Ok(String::new());
    }
    let mut out = String::new();
    write_value(&mut out, value, ctx, false)?;
    Ok(out)
}

fn write_value(out: &mut String, value: &Value, ctx: &Context, readable: bool) -> Result<(), EvalError> {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Value::Float(f) => {
            let _ = write!(out, "{f}");
        }
        Value::Char(c) => {
            if readable {
                out.push_str(&escape_char(*c));
            } else {
                out.push(*c);
            }
        }
        Value::Str(s) => {
            if readable {
                out.push('"');
                for c in s.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        other => out.push(other),
                    }
                }
                out.push('"');
            } else {
                out.push_str(s);
            }
        }
        Value::Symbol(sym) => write_sym_or_kw(out, sym.ns, sym.name, "", ctx),
        Value::Keyword(kw) => write_sym_or_kw(out, kw.ns, kw.name, ":", ctx),
        Value::Seq(seq) => {
            out.push('(');
            let mut first = true;
            let mut cur = seq.clone();
            while let Some((head, tail)) = force_step(&cur, ctx)? {
                if !first {
                    out.push(' ');
                }
                first = false;
                write_value(out, &head, ctx, readable)?;
                cur = tail;
            }
            out.push(')');
        }
        Value::Vector(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, item, ctx, readable)?;
            }
            out.push(']');
        }
        Value::Map(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, k, ctx, readable)?;
                out.push(' ');
                write_value(out, v, ctx, readable)?;
            }
            out.push('}');
        }
        Value::Var(var) => {
            let ns = ctx.resolve_name(var.namespace);
            let name = ctx.resolve_name(var.name);
            let _ = write!(out, "#'{ns}/{name}");
        }
        Value::Function(_) => out.push_str("#<function>"),
        Value::Macro(_) => out.push_str("#<macro>"),
        Value::Special(tag) => {
            let _ = write!(out, "#<special {}>", tag.name());
        }
        Value::BuiltIn(b) => {
            let _ = write!(out, "#<builtin {}>", b.name);
        }
    }
    Ok(())
}

fn write_sym_or_kw(out: &mut String, ns: Option<crate::intern::InternedId>, name: crate::intern::InternedId, prefix: &str, ctx: &Context) {
    out.push_str(prefix);
    if let Some(ns_id) = ns {
        out.push_str(&ctx.resolve_name(ns_id));
        out.push('/');
    }
    out.push_str(&ctx.resolve_name(name));
}

fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\newline".to_string(),
        ' ' => "\\space".to_string(),
        '\t' => "\\tab".to_string(),
        '\r' => "\\return".to_string(),
        other => format!("\\{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Seq;

    #[test]
    fn strings_are_quoted_in_readable_form_but_not_in_display_form() {
        let ctx = Context::new_root("user");
        let v = Value::string("hi\n");
        assert_eq!(pr_str(&v, &ctx).unwrap(), "\"hi\\n\"");
        assert_eq!(display_str(&v, &ctx).unwrap(), "hi\n");
    }

    #[test]
    fn nil_displays_as_empty_string() {
        let ctx = Context::new_root("user");
        assert_eq!(display_str(&Value::Nil, &ctx).unwrap(), "");
        assert_eq!(pr_str(&Value::Nil, &ctx).unwrap(), "nil");
    }

    #[test]
    fn seqs_print_space_separated_in_parens() {
        let ctx = Context::new_root("user");
        let v = Value::Seq(Seq::from_vec(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
        assert_eq!(pr_str(&v, &ctx).unwrap(), "(1 2 3)");
    }

    #[test]
    fn vectors_print_bracketed() {
        let ctx = Context::new_root("user");
        let v = Value::vector(vec![Value::Int(1), Value::Bool(true)]);
        assert_eq!(pr_str(&v, &ctx).unwrap(), "[1 true]");
    }
}
