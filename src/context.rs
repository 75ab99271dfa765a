//! Evaluation contexts (§3, §4.4, §4.6): chained lexical-scope frames over a
//! root context that exposes the current namespace.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::EvalError;
use crate::intern::{InternStore, InternedId};
use crate::namespace::{Namespace, NamespaceTable, Var};
use crate::value::{Symbol, Value};

/// The interpreter-wide state a root context exposes: the intern store and
/// the namespace table. Shared by `Rc` so every `Context` in a session sees
/// the same store.
pub struct RootState {
    pub interner: RefCell<InternStore>,
    pub namespaces: NamespaceTable,
    /// Sink for `print`/`println`-family output (§6's `writeOutput` hook).
    /// A plain `fn` pointer can't capture this, so builtins reach it here.
    pub write_output: Rc<dyn Fn(&str)>,
}

impl std::fmt::Debug for RootState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootState")
            .field("interner", &self.interner)
            .field("namespaces", &self.namespaces)
            .finish()
    }
}

/// A single lexical-scope frame: a set of local bindings plus a parent to
/// fall back to.
#[derive(Debug)]
pub struct LexicalFrame {
    parent: Context,
    bindings: RefCell<HashMap<InternedId, Value>>,
}

/// Either the root (session-global, namespace-backed) context, or a
/// lexical-scope frame chained to a parent context.
#[derive(Debug, Clone)]
pub enum Context {
    /// The interpreter's session-global handle.
    Root(Rc<RootState>),
    /// A lexical scope introduced by `let`, `loop`, or function application.
    Lexical(Rc<LexicalFrame>),
}

impl Context {
    /// Creates a fresh root context with a single default namespace and a
    /// `print!`-based output sink.
    pub fn new_root(default_ns: &str) -> Self {
        Self::new_root_with_output(default_ns, Rc::new(|s: &str| print!("{s}")))
    }

    /// Creates a fresh root context with a single default namespace, writing
    /// `print`/`println` output through `write_output`.
    pub fn new_root_with_output(default_ns: &str, write_output: Rc<dyn Fn(&str)>) -> Self {
        let mut interner = InternStore::new();
        let namespaces = NamespaceTable::new(&mut interner, default_ns);
        Context::Root(Rc::new(RootState {
            interner: RefCell::new(interner),
            namespaces,
            write_output,
        }))
    }

    /// Writes `s` through this context's output sink.
    pub fn write_output(&self, s: &str) {
        (self.root().write_output)(s)
    }

    /// Creates a new lexical frame chained to `self`, with no bindings yet.
    pub fn child(&self) -> Context {
        Context::Lexical(Rc::new(LexicalFrame {
            parent: self.clone(),
            bindings: RefCell::new(HashMap::new()),
        }))
    }

    /// Binds `id` to `value` in this frame.
    ///
    /// Only meaningful on a `Lexical` context; binding directly into the
    /// root context is not supported (use `def` instead).
    pub fn bind(&self, id: InternedId, value: Value) {
        match self {
            Context::Lexical(frame) => {
                frame.bindings.borrow_mut().insert(id, value);
            }
            Context::Root(_) => {
                // Root contexts have no lexical frame to bind into; callers
                // that reach here are evaluating at top level and should
                // use `def`/`Namespace::intern_var` instead.
            }
        }
    }

    /// Walks up to the enclosing root context.
    pub fn root(&self) -> Rc<RootState> {
        match self {
            Context::Root(root) => root.clone(),
            Context::Lexical(frame) => frame.parent.root(),
        }
    }

    /// The current namespace, reached via the root context.
    pub fn current_namespace(&self) -> Rc<Namespace> {
        self.root().namespaces.current()
    }

    /// Interns a string through this context's shared intern store.
    pub fn intern(&self, s: &str) -> InternedId {
        self.root().interner.borrow_mut().intern(s)
    }

    /// Resolves an interned id back to its string.
    pub fn resolve_name(&self, id: InternedId) -> String {
        self.root()
            .interner
            .borrow()
            .resolve(id)
            .unwrap_or("<unknown>")
            .to_string()
    }

    fn find_target_namespace(&self, ns_id: InternedId) -> Option<Rc<Namespace>> {
        let root = self.root();
        if let Some(ns) = root.namespaces.get(ns_id) {
            return Some(ns);
        }
        let current = root.namespaces.current();
        current
            .resolve_alias(ns_id)
            .and_then(|target| root.namespaces.get(target))
    }

    /// Resolves a symbol to its value (§4.4): lexical frames first (for
    /// unqualified symbols), then the current namespace's own Vars, then
    /// referred Vars, then namespace aliases for qualified symbols.
    ///
    /// A Var with a Bound slot resolves to its value; an Unbound Var
    /// resolves to the Var itself (reified), matching the spec.
    pub fn resolve(&self, sym: Symbol) -> Result<Value, EvalError> {
        if let Some(ns_id) = sym.ns {
            let ns = self
                .find_target_namespace(ns_id)
                .ok_or_else(|| EvalError::InvalidSymbol(self.describe(sym)))?;
            let var = ns
                .resolve_unqualified(sym.name)
                .ok_or_else(|| EvalError::InvalidSymbol(self.describe(sym)))?;
            return Ok(Self::var_or_value(var));
        }

        if let Context::Lexical(frame) = self {
            if let Some(v) = frame.bindings.borrow().get(&sym.name) {
                return Ok(v.clone());
            }
            return frame.parent.resolve(sym);
        }

        let ns = self.current_namespace();
        let var = ns
            .resolve_unqualified(sym.name)
            .ok_or_else(|| EvalError::InvalidSymbol(self.describe(sym)))?;
        Ok(Self::var_or_value(var))
    }

    fn var_or_value(var: Rc<Var>) -> Value {
        if var.is_unbound() {
            Value::Var(var)
        } else {
            var.deref().expect("checked not unbound")
        }
    }

    /// Resolves a symbol to its Var without dereferencing (`(var sym)`).
    /// Lexical bindings are not Vars, so this never looks at lexical
    /// frames.
    pub fn resolve_var(&self, sym: Symbol) -> Result<Rc<Var>, EvalError> {
        let root = self.root();
        let ns = match sym.ns {
            Some(ns_id) => self
                .find_target_namespace(ns_id)
                .ok_or_else(|| EvalError::InvalidSymbol(self.describe(sym)))?,
            None => root.namespaces.current(),
        };
        ns.resolve_unqualified(sym.name)
            .ok_or_else(|| EvalError::InvalidSymbol(self.describe(sym)))
    }

    fn describe(&self, sym: Symbol) -> String {
        match sym.ns {
            Some(ns) => format!("{}/{}", self.resolve_name(ns), self.resolve_name(sym.name)),
            None => self.resolve_name(sym.name),
        }
    }

    /// Implements `def`/`defmacro`'s namespace rule: a qualified symbol must
    /// name the current namespace (§4.6, and the Open Question in §9
    /// resolved uniformly for both forms).
    pub fn def(&self, sym: Symbol, init: Option<Value>) -> Result<Rc<Var>, EvalError> {
        let current = self.current_namespace();
        if let Some(ns_id) = sym.ns {
            if ns_id != current.name {
                return Err(EvalError::QualifiedSymbolMisuse(self.describe(sym)));
            }
        }
        let var = current.intern_var(sym.name);
        match init {
            Some(value) => var.set_value(value),
            None => {
                if var.is_unbound() {
                    var.unbind();
                }
            }
        }
        Ok(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Symbol;

    #[test]
    fn lexical_lookup_falls_through_to_root() {
        let root = Context::new_root("user");
        let x = root.intern("x");
        root.current_namespace().intern_var(x).set_value(Value::Int(10));

        let child = root.child();
        child.bind(root.intern("y"), Value::Int(20));

        assert_eq!(
            child.resolve(Symbol::unqualified(x)).unwrap(),
            Value::Int(10)
        );
        assert_eq!(
            child
                .resolve(Symbol::unqualified(root.intern("y")))
                .unwrap(),
            Value::Int(20)
        );
    }

    #[test]
    fn inner_binding_shadows_outer() {
        let root = Context::new_root("user");
        let x = root.intern("x");
        let outer = root.child();
        outer.bind(x, Value::Int(1));
        let inner = outer.child();
        inner.bind(x, Value::Int(2));

        assert_eq!(inner.resolve(Symbol::unqualified(x)).unwrap(), Value::Int(2));
        assert_eq!(outer.resolve(Symbol::unqualified(x)).unwrap(), Value::Int(1));
    }

    #[test]
    fn unbound_var_resolves_to_itself() {
        let root = Context::new_root("user");
        let x = root.intern("x");
        root.current_namespace().intern_var(x);
        let resolved = root.resolve(Symbol::unqualified(x)).unwrap();
        assert!(matches!(resolved, Value::Var(_)));
    }

    #[test]
    fn def_rejects_mismatched_qualified_symbol() {
        let root = Context::new_root("user");
        let other_ns = root.intern("other");
        let name = root.intern("x");
        let sym = Symbol {
            ns: Some(other_ns),
            name,
        };
        assert!(root.def(sym, Some(Value::Int(1))).is_err());
    }
}
