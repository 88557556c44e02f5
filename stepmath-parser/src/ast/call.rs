use super::{Expr, StableId};

/// A function applied to a single argument, such as `sin(x)` or `f(x + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// The name of the function.
    pub func: String,

    /// The argument of the call.
    pub arg: Box<Expr>,

    /// The content-derived id of this node, once assigned.
    pub id: Option<StableId>,
}
