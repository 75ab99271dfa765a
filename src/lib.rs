//! # Lambdatron
//!
//! Lambdatron is a tree-walking interpreter for a small Clojure-like Lisp:
//! reader macros and quasiquote, a persistent value model, lexically scoped
//! functions and macros, an explicit `loop`/`recur` trampoline, and lazy
//! sequences, embeddable as a library or driven from the `lbt` binary.
//!
//! ## Quick Start
//!
//! ```rust
//! use lambdatron::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! let result = interp.evaluate("(+ 1 2 3)").into_result().unwrap();
//! assert_eq!(format!("{result:?}"), "Int(6)");
//! ```
//!
//! ## Modules
//!
//! - [`lexer`]: tokenizes source text
//! - [`parser`]: builds forms from tokens, including reader macros
//!   (`'`, `` ` ``, `~`, `~@`, `@`, `#(...)`)
//! - [`expand`]: lowers syntax-quote and anonymous-fn-literal forms before
//!   evaluation
//! - [`value`]: the runtime value model
//! - [`context`]: lexical scope chains and the root session state
//! - [`namespace`]: namespaces and Vars
//! - [`eval`]: form dispatch, special forms, function application, lazy-seq
//!   forcing, and the host builtin registry
//! - [`print`]: canonical value printing
//! - [`error`]: reader and evaluation error types
//! - [`bootstrap`]: the stdlib written in Lambdatron itself

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod ast;
pub mod bootstrap;
pub mod context;
pub mod error;
pub mod eval;
pub mod expand;
pub mod intern;
pub mod lexer;
pub mod namespace;
pub mod parser;
pub mod print;
pub mod value;

pub use context::Context;
pub use error::{EvalError, LambdatronError, ReadError};
pub use eval::{EvalResult, Interpreter, InterpreterOptions};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_evaluate_runs_bootstrap_and_arithmetic() {
        let mut interp = Interpreter::new();
        let result = interp.evaluate("(+ 1 2 3)").into_result().unwrap();
        assert_eq!(result, Value::Int(6));
    }

    #[test]
    fn bootstrap_take_iterate_produces_a_lazy_range() {
        let mut interp = Interpreter::new();
        let result = interp
            .evaluate("(.first (.rest (take 5 (iterate inc 0))))")
            .into_result()
            .unwrap();
        assert_eq!(result, Value::Int(1));
    }
}
