use super::{Expr, StableId};

/// The relational operator of a [`Relation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    /// Equality (`=`).
    Eq,

    /// Strictly less than (`<`).
    Lt,

    /// Less than or equal to (`<=`).
    Le,

    /// Strictly greater than (`>`).
    Gt,

    /// Greater than or equal to (`>=`).
    Ge,
}

impl RelOp {
    /// Returns the textual form of the operator, as written in source.
    pub fn as_str(self) -> &'static str {
        match self {
            RelOp::Eq => "=",
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        }
    }
}

/// Two sides compared by a relational operator.
///
/// An expression contains at most one relation, always at the root; relations never nest except
/// through explicit parentheses in a derivative argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// The relational operator.
    pub op: RelOp,

    /// The left-hand side of the relation.
    pub lhs: Box<Expr>,

    /// The right-hand side of the relation.
    pub rhs: Box<Expr>,

    /// The content-derived id of this node, once assigned.
    pub id: Option<StableId>,
}
