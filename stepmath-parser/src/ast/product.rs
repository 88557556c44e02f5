use super::{Expr, StableId};

/// Two or more factors multiplied together, stored as one flat, ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mul {
    /// The factors of the product, in source order.
    pub factors: Vec<Expr>,

    /// The content-derived id of this node, once assigned.
    pub id: Option<StableId>,
}
