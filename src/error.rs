//! Error types for Lambdatron.
//!
//! Two independent domains, matching the two phases that can fail:
//! [`ReadError`] for the lex/parse/reader-macro-expand pipeline, and
//! [`EvalError`] for everything the evaluator itself can reject. A
//! top-level [`LambdatronError`] wraps either for callers (like the CLI
//! driver) that want a single `Result` type.

use thiserror::Error;

use crate::ast::Span;

/// Errors produced while turning source text into an evaluator-ready value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    /// A character not recognized anywhere in the grammar (stray `#`
    /// without a following `(`, etc).
    #[error("unexpected character '{ch}'")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        span: Span,
    },

    /// A `\` escape in a string literal was followed by an unrecognized
    /// character (only `r n t " \` are legal).
    #[error("invalid escape sequence '\\{ch}'")]
    InvalidEscape {
        /// The character following the backslash.
        ch: char,
        span: Span,
    },

    /// A string literal was not closed before end of input.
    #[error("unterminated string literal")]
    NonTerminatedString { span: Span },

    /// A character literal (`\x`, `\newline`, ...) was not recognized.
    #[error("invalid character literal '\\{text}'")]
    InvalidCharLiteral {
        /// The text following the backslash.
        text: String,
        span: Span,
    },

    /// A list/vector/map closer didn't match its opener, e.g. `(foo]`.
    #[error("mismatched delimiter: expected '{expected}', found '{found}'")]
    MismatchedDelimiter {
        /// The closer that should have appeared.
        expected: char,
        /// The closer that actually appeared.
        found: char,
        span: Span,
    },

    /// End of input was reached in the middle of a form.
    #[error("unexpected end of input while reading a form")]
    UnfinishedForm,

    /// `{...}` had an odd number of forms, so keys and values don't pair up.
    #[error("map literal has an odd number of forms")]
    MapKVMismatch,

    /// An `(unquote ...)`/`(unquote-splicing ...)` form appeared outside of
    /// a `(syntax-quote ...)`.
    #[error("unquote used outside of syntax-quote")]
    UnquoteOutsideSyntaxQuote,

    /// `(unquote-splicing ...)` appeared somewhere other than inside a
    /// sequential form being built by syntax-quote.
    #[error("unquote-splicing used outside of a sequential form")]
    SpliceOutsideSequence,

    /// `#(...)` was nested inside another `#(...)`.
    #[error("nested #() anonymous function literals are not allowed")]
    NestedFnLiteral,
}

/// Errors produced while evaluating a read form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A function/macro was called with the wrong number of arguments.
    #[error("wrong number of arguments: expected {expected}, got {actual}")]
    Arity {
        /// Human-readable description of the arity that was expected (may
        /// describe a range, e.g. "at least 2").
        expected: String,
        /// Actual argument count supplied.
        actual: usize,
    },

    /// A built-in or special form rejected one of its arguments.
    #[error("invalid argument to {function}: {message}")]
    InvalidArgument {
        /// Name of the offending function/special form.
        function: String,
        /// Description of what was wrong.
        message: String,
    },

    /// A symbol didn't resolve to anything in scope.
    #[error("unable to resolve symbol: {0}")]
    InvalidSymbol(String),

    /// A qualified symbol (`ns/name`) was used with a namespace other than
    /// the current one in a position (`def`, `defmacro`) that requires them
    /// to match.
    #[error("can't def/defmacro qualified symbol '{0}' outside its own namespace")]
    QualifiedSymbolMisuse(String),

    /// A binding vector (`let`, `loop`) did not have an even number of
    /// forms.
    #[error("binding vector must have an even number of forms")]
    BindingMismatch,

    /// The head of a seq form was a value that cannot be invoked.
    #[error("value of type {0} is not evalable as a call")]
    NotEvalable(&'static str),

    /// `recur` was observed somewhere other than the tail position of the
    /// `fn`/`loop` that should trampoline it.
    #[error("recur used outside of a tail position")]
    RecurMisuse,

    /// Recur was called with a different number of arguments than the
    /// enclosing `loop`/`fn` arity has parameters.
    #[error("recur called with {actual} arguments, expected {expected}")]
    RecurArityMismatch {
        /// Number of bindings/parameters in the recur target.
        expected: usize,
        /// Number of arguments the recur sentinel actually carried.
        actual: usize,
    },

    /// Indexed access (vector index, etc.) fell outside the valid range.
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds {
        /// The index that was requested.
        index: i64,
        /// The length of the collection that was indexed.
        len: usize,
    },

    /// A numeric operation received an argument it can't operate on.
    #[error("arithmetic error: {0}")]
    ArithmeticError(String),

    /// A Var was dereferenced while still Unbound.
    #[error("unbound var: {0}")]
    UnboundVar(String),

    /// Catch-all for host/builtin failures that don't fit another variant.
    #[error("{0}")]
    RuntimeError(String),

    /// A `ReadError` surfaced while macro-expanding or re-reading a form
    /// produced by evaluation (e.g. `read-string`).
    #[error(transparent)]
    Read(#[from] ReadError),
}

impl EvalError {
    /// Shorthand for building an [`EvalError::Arity`]. `expected` may be an
    /// exact count or a description of several candidate arities (e.g. "at
    /// least 2", "2 or 3").
    pub fn arity(expected: impl Into<String>, actual: usize) -> Self {
        EvalError::Arity {
            expected: expected.into(),
            actual,
        }
    }

    /// Shorthand for building an [`EvalError::InvalidArgument`].
    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }
}

/// Top-level error type uniting both domains, for callers that just want a
/// single `Result` (the CLI driver, embedders that don't care which phase
/// failed).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LambdatronError {
    /// Reading (lex/parse/expand) the source failed.
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    /// Evaluating the read form failed.
    #[error("eval error: {0}")]
    Eval(#[from] EvalError),
}
