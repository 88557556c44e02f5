//! The canonical expression tree.
//!
//! Every node kind owns its children exclusively; a tree is never shared or cyclic. Nodes carry
//! an optional [`StableId`] assigned by the canonicalization pass: a content hash of the node's
//! structure, so structurally identical subtrees always receive the same id.

pub mod call;
pub mod derivative;
pub mod expr;
pub mod literal;
pub mod power;
pub mod product;
pub mod relation;
pub mod sum;

pub use call::Call;
pub use derivative::Derivative;
pub use expr::Expr;
pub use literal::{Ident, Number};
pub use power::Power;
pub use product::Mul;
pub use relation::{RelOp, Relation};
pub use sum::Add;

use std::{fmt, num::ParseIntError, str::FromStr};

/// A content-derived identifier for a node.
///
/// Stable ids address nodes by their structure, not their position: recomputing the id of an
/// unchanged subtree always yields the same value, even across runs, and two structurally equal
/// subtrees share one id. They are used for addressing and diffing only, never for algebraic
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StableId(u32);

impl StableId {
    /// Creates a stable id from its raw hash value.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw hash value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Stable ids render as unpadded lowercase hex, the form used in markup attributes and selection
/// events.
impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for StableId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u32::from_str_radix(s, 16).map(Self)
    }
}
