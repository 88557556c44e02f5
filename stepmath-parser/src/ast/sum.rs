use super::{Expr, StableId};

/// Two or more terms added together, stored as one flat, ordered list.
///
/// Subtraction has no node of its own: `a - b` is stored as `a + (-1 · b)`, and the renderers
/// collapse the `-1` factor back into a minus sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Add {
    /// The terms of the sum, in source order.
    pub terms: Vec<Expr>,

    /// The content-derived id of this node, once assigned.
    pub id: Option<StableId>,
}
