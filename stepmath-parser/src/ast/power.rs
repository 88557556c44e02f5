use super::{Expr, StableId};

/// A base raised to an exponent. The `^` operator is right-associative, so `x^2^3` parses as
/// `x^(2^3)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Power {
    /// The base of the power.
    pub base: Box<Expr>,

    /// The exponent of the power.
    pub exponent: Box<Expr>,

    /// The content-derived id of this node, once assigned.
    pub id: Option<StableId>,
}
