use super::{Expr, StableId};

/// The derivative of an expression with respect to a single variable, written `d/dx <expr>` in
/// source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivative {
    /// The name of the variable the derivative is taken with respect to.
    pub var: String,

    /// The expression being differentiated.
    pub arg: Box<Expr>,

    /// The content-derived id of this node, once assigned.
    pub id: Option<StableId>,
}
