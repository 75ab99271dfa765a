//! Namespaces and Vars (§4.6).
//!
//! A [`Namespace`] owns a table of [`Var`] cells by name, plus the alias and
//! referred-var tables used to resolve `alias/name` and bare names pulled in
//! from other namespaces. [`NamespaceTable`] owns every namespace created in
//! an interpreter session and tracks which one is "current".

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::EvalError;
use crate::intern::{InternStore, InternedId};
use crate::value::{PersistentMap, Value};

/// The contents of a [`Var`]'s slot.
#[derive(Debug, Clone)]
pub enum VarSlot {
    /// Declared (e.g. via `(def sym)` with no initializer) but never given
    /// a value.
    Unbound,
    /// Holds a value.
    Bound(Value),
}

/// A mutable, named binding cell.
///
/// Vars are never removed once created; `set_value` rebinds the slot in
/// place. Equality and identity are by `Rc` pointer, matching §3's
/// "identity-based" equality rule for Vars.
#[derive(Debug)]
pub struct Var {
    pub name: InternedId,
    pub namespace: InternedId,
    slot: RefCell<VarSlot>,
    metadata: RefCell<PersistentMap>,
}

impl Var {
    fn new(name: InternedId, namespace: InternedId) -> Rc<Self> {
        Rc::new(Var {
            name,
            namespace,
            slot: RefCell::new(VarSlot::Unbound),
            metadata: RefCell::new(PersistentMap::new()),
        })
    }

    /// Current slot contents.
    pub fn slot(&self) -> VarSlot {
        self.slot.borrow().clone()
    }

    /// True iff the Var has never been given a value (or was declared
    /// without an initializer).
    pub fn is_unbound(&self) -> bool {
        matches!(&*self.slot.borrow(), VarSlot::Unbound)
    }

    /// Dereferences the Var, failing if it is Unbound.
    pub fn deref(&self) -> Result<Value, EvalError> {
        match &*self.slot.borrow() {
            VarSlot::Bound(v) => Ok(v.clone()),
            VarSlot::Unbound => Err(EvalError::UnboundVar(self.name.raw().to_string())),
        }
    }

    /// Rebinds the slot. This is the only mutation path for a Var's value.
    pub fn set_value(&self, value: Value) {
        *self.slot.borrow_mut() = VarSlot::Bound(value);
    }

    /// Marks the slot Unbound again (used by `(def sym)` with no init,
    /// rebinding an already-existing Var).
    pub fn unbind(&self) {
        *self.slot.borrow_mut() = VarSlot::Unbound;
    }

    /// Current metadata map.
    pub fn metadata(&self) -> PersistentMap {
        self.metadata.borrow().clone()
    }

    /// Replaces the metadata map.
    pub fn set_metadata(&self, meta: PersistentMap) {
        *self.metadata.borrow_mut() = meta;
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// A named collection of Vars, plus namespace aliases and referred vars.
#[derive(Debug)]
pub struct Namespace {
    pub name: InternedId,
    vars: RefCell<HashMap<InternedId, Rc<Var>>>,
    aliases: RefCell<HashMap<InternedId, InternedId>>,
    referred: RefCell<HashMap<InternedId, Rc<Var>>>,
}

impl Namespace {
    fn new(name: InternedId) -> Rc<Self> {
        Rc::new(Namespace {
            name,
            vars: RefCell::new(HashMap::new()),
            aliases: RefCell::new(HashMap::new()),
            referred: RefCell::new(HashMap::new()),
        })
    }

    /// Looks up a Var defined directly in this namespace (not referred).
    pub fn own_var(&self, name: InternedId) -> Option<Rc<Var>> {
        self.vars.borrow().get(&name).cloned()
    }

    /// Looks up a Var referred into this namespace from elsewhere.
    pub fn referred_var(&self, name: InternedId) -> Option<Rc<Var>> {
        self.referred.borrow().get(&name).cloned()
    }

    /// Resolution order for an unqualified name within this namespace: its
    /// own Vars take precedence over referred ones.
    pub fn resolve_unqualified(&self, name: InternedId) -> Option<Rc<Var>> {
        self.own_var(name).or_else(|| self.referred_var(name))
    }

    /// Registers an alias `alias -> target_ns` visible from this namespace.
    pub fn add_alias(&self, alias: InternedId, target_ns: InternedId) {
        self.aliases.borrow_mut().insert(alias, target_ns);
    }

    /// Resolves an alias registered in this namespace.
    pub fn resolve_alias(&self, alias: InternedId) -> Option<InternedId> {
        self.aliases.borrow().get(&alias).copied()
    }

    /// Refers a Var from another namespace into this one under `local_name`.
    pub fn refer(&self, local_name: InternedId, var: Rc<Var>) {
        self.referred.borrow_mut().insert(local_name, var);
    }

    /// Interns/rebinds `name` into this namespace, as `(def name init)`
    /// does. Returns the (possibly pre-existing) Var.
    pub fn intern_var(&self, name: InternedId) -> Rc<Var> {
        if let Some(existing) = self.vars.borrow().get(&name) {
            return existing.clone();
        }
        let var = Var::new(name, self.name);
        self.vars.borrow_mut().insert(name, var.clone());
        var
    }

    /// Names of every Var directly interned in this namespace.
    pub fn var_names(&self) -> Vec<InternedId> {
        self.vars.borrow().keys().copied().collect()
    }
}

/// Owns every [`Namespace`] created during a session and tracks the current
/// one, as the root [`Context`](crate::context::Context) exposes.
#[derive(Debug)]
pub struct NamespaceTable {
    namespaces: RefCell<HashMap<InternedId, Rc<Namespace>>>,
    current: RefCell<InternedId>,
}

impl NamespaceTable {
    /// Creates a table with a single namespace (`user` by default) marked
    /// current.
    pub fn new(interner: &mut InternStore, default_ns: &str) -> Self {
        let name = interner.intern(default_ns);
        let table = NamespaceTable {
            namespaces: RefCell::new(HashMap::new()),
            current: RefCell::new(name),
        };
        table.get_or_create(name);
        table
    }

    /// Returns the namespace named `name`, creating it if necessary.
    pub fn get_or_create(&self, name: InternedId) -> Rc<Namespace> {
        if let Some(ns) = self.namespaces.borrow().get(&name) {
            return ns.clone();
        }
        let ns = Namespace::new(name);
        self.namespaces.borrow_mut().insert(name, ns.clone());
        ns
    }

    /// Returns the namespace named `name`, if it has been created.
    pub fn get(&self, name: InternedId) -> Option<Rc<Namespace>> {
        self.namespaces.borrow().get(&name).cloned()
    }

    /// The currently-active namespace.
    pub fn current(&self) -> Rc<Namespace> {
        self.get_or_create(*self.current.borrow())
    }

    /// Switches the current namespace, creating it if needed.
    pub fn set_current(&self, name: InternedId) {
        self.get_or_create(name);
        *self.current.borrow_mut() = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_a_var_twice_returns_the_same_cell() {
        let mut interner = InternStore::new();
        let ns_name = interner.intern("user");
        let ns = Namespace::new(ns_name);
        let sym = interner.intern("x");

        let v1 = ns.intern_var(sym);
        v1.set_value(Value::Int(1));
        let v2 = ns.intern_var(sym);
        assert!(Rc::ptr_eq(&v1, &v2));
        assert_eq!(v2.deref().unwrap(), Value::Int(1));
    }

    #[test]
    fn unbound_var_errors_on_deref() {
        let mut interner = InternStore::new();
        let ns = Namespace::new(interner.intern("user"));
        let var = ns.intern_var(interner.intern("y"));
        assert!(var.deref().is_err());
        assert!(var.is_unbound());
    }

    #[test]
    fn referred_vars_are_shadowed_by_own_vars() {
        let mut interner = InternStore::new();
        let ns_a = Namespace::new(interner.intern("a"));
        let ns_b = Namespace::new(interner.intern("b"));
        let name = interner.intern("shared");

        let var_a = ns_a.intern_var(name);
        var_a.set_value(Value::Int(1));
        ns_b.refer(name, var_a.clone());

        assert!(Rc::ptr_eq(&ns_b.resolve_unqualified(name).unwrap(), &var_a));

        let var_b = ns_b.intern_var(name);
        var_b.set_value(Value::Int(2));
        assert!(Rc::ptr_eq(&ns_b.resolve_unqualified(name).unwrap(), &var_b));
    }

    #[test]
    fn namespace_table_creates_on_demand() {
        let mut interner = InternStore::new();
        let table = NamespaceTable::new(&mut interner, "user");
        assert_eq!(interner.resolve(table.current().name), Some("user"));

        let other = interner.intern("other.ns");
        table.set_current(other);
        assert_eq!(interner.resolve(table.current().name), Some("other.ns"));
    }
}
