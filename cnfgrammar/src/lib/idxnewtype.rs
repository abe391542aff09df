// This macro generates a struct which wraps a `usize` index, so that indexes into different
// tables of a grammar cannot be confused with one another.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! IdxNewtype {
    ($(#[$attr:meta])* $n: ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[cfg_attr(feature="serde", derive(Serialize, Deserialize))]
        pub struct $n(pub usize);

        impl From<$n> for usize {
            fn from(idx: $n) -> Self {
                idx.0
            }
        }

        impl From<usize> for $n {
            fn from(idx: usize) -> Self {
                $n(idx)
            }
        }

        impl std::fmt::Display for $n {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    }
}

IdxNewtype!(
    /// A type specifically for non-terminal indices.
    ///
    /// Non-terminals are numbered in the order in which a [`Grammar`](crate::Grammar) first
    /// encounters them: the start non-terminal is always `NIdx(0)`.
    NIdx);
IdxNewtype!(
    /// A type specifically for production indices (e.g. a grammar `<E> ::= <A> | <B>` has two
    /// productions for the single non-terminal `<E>`). Productions are numbered in declaration
    /// order.
    PIdx);
