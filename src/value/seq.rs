//! Sequences (§3, §4.7): the persistent cons-like list and the lazy
//! sequence engine, unified behind one [`Seq`] type so the evaluator
//! traverses both the same way.
//!
//! Forcing a lazy node requires invoking its thunk, which means calling
//! back into the evaluator — so the actual forcing logic lives on
//! [`crate::eval::Interpreter`]; this module only owns the node states and
//! the parts of equality/printing that don't require forcing.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::Context;
use super::Value;

/// A persistent sequence: either empty, or a reference-counted node that is
/// either an eager cons cell or a (possibly still-unforced) lazy cell.
#[derive(Debug, Clone)]
pub enum Seq {
    /// The canonical empty seq.
    Empty,
    /// A non-empty node.
    Node(Rc<SeqNode>),
}

/// A single seq node.
#[derive(Debug)]
pub enum SeqNode {
    /// An eager cons cell: `head` followed by the rest of the seq.
    Cons(Value, Seq),
    /// A lazy cell, produced by `lazy-seq`. Forced at most once; see
    /// [`crate::eval::Interpreter::force`].
    Lazy(RefCell<LazyState>),
}

/// The state of a lazy seq node (§3, §4.7).
#[derive(Debug)]
pub enum LazyState {
    /// Not yet forced: holds the zero-argument thunk and the context it
    /// closed over when `lazy-seq` was evaluated.
    Unforced { thunk: Value, ctx: Context },
    /// Forced: memoizes the seq that replaces this node (`Empty` if the
    /// thunk produced nothing, otherwise a `Cons` node). The thunk itself
    /// is dropped once forced, so a forced chain does not keep its
    /// captured context alive any longer than necessary (§9).
    Forced(Seq),
}

impl Seq {
    /// The empty seq.
    pub fn empty() -> Self {
        Seq::Empty
    }

    /// Builds a single eager cons cell.
    pub fn cons(head: Value, tail: Seq) -> Self {
        Seq::Node(Rc::new(SeqNode::Cons(head, tail)))
    }

    /// Builds an unforced lazy node wrapping `thunk` (a zero-arg callable)
    /// captured in `ctx`.
    pub fn lazy(thunk: Value, ctx: Context) -> Self {
        Seq::Node(Rc::new(SeqNode::Lazy(RefCell::new(LazyState::Unforced {
            thunk,
            ctx,
        }))))
    }

    /// Builds an eager seq from a vector of values, in order.
    pub fn from_vec(values: Vec<Value>) -> Self {
        let mut seq = Seq::Empty;
        for v in values.into_iter().rev() {
            seq = Seq::cons(v, seq);
        }
        seq
    }

    /// True for the canonical empty seq. Does not force; an unforced lazy
    /// node is neither known-empty nor known-non-empty until forced.
    pub fn is_known_empty(&self) -> bool {
        matches!(self, Seq::Empty)
    }

    /// Attempts to view the seq as `(head, tail)` without forcing anything
    /// beyond already-memoized lazy nodes. Returns `None` for `Empty` or an
    /// unforced lazy node.
    pub fn try_uncons(&self) -> Option<(Value, Seq)> {
        match realized_peek(self) {
            Peek::Cons(h, t) => Some((h, t)),
            _ => None,
        }
    }

    /// Collects an already-fully-realized seq into a `Vec`. Stops (without
    /// error) at the first unforced node; callers that need every element
    /// forced should force explicitly via the evaluator first.
    pub fn to_vec_realized(&self) -> Vec<Value> {
        let mut out = Vec::new();
        let mut cur = self.clone();
        while let Some((h, t)) = cur.try_uncons() {
            out.push(h);
            cur = t;
        }
        out
    }
}

enum Peek {
    Empty,
    Cons(Value, Seq),
    Unknown,
}

fn realized_peek(seq: &Seq) -> Peek {
    match seq {
        Seq::Empty => Peek::Empty,
        Seq::Node(node) => match &**node {
            SeqNode::Cons(h, t) => Peek::Cons(h.clone(), t.clone()),
            SeqNode::Lazy(cell) => match &*cell.borrow() {
                LazyState::Forced(inner) => realized_peek(inner),
                LazyState::Unforced { .. } => Peek::Unknown,
            },
        },
    }
}

impl PartialEq for Seq {
    fn eq(&self, other: &Self) -> bool {
        match (realized_peek(self), realized_peek(other)) {
            (Peek::Empty, Peek::Empty) => true,
            (Peek::Cons(h1, t1), Peek::Cons(h2, t2)) => h1 == h2 && t1 == t2,
            // An unforced node can't be compared without an interpreter to
            // force it; conservatively unequal (§3.1).
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eager_seqs_compare_structurally() {
        let a = Seq::from_vec(vec![Value::Int(1), Value::Int(2)]);
        let b = Seq::from_vec(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_seq_has_no_uncons() {
        assert!(Seq::empty().try_uncons().is_none());
    }

    #[test]
    fn to_vec_realized_collects_eager_elements() {
        let s = Seq::from_vec(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(
            s.to_vec_realized(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn unforced_lazy_node_is_unknown_not_empty() {
        let root = Context::new_root("user");
        let lazy = Seq::lazy(Value::Nil, root);
        assert!(!lazy.is_known_empty());
        assert!(lazy.try_uncons().is_none());
    }
}
