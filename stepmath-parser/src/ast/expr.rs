use super::{Add, Call, Derivative, Ident, Mul, Number, Power, RelOp, Relation, StableId};

/// Represents a complete expression tree, or any subtree of one.
///
/// The parser produces this type directly; every other component of the workspace (the
/// canonicalizer, the markup codecs, the rewrite engine) consumes and produces it as well.
/// Trees are immutable once built: an edit produces a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A variable or other named symbol, such as `x`.
    Ident(Ident),

    /// An integer literal, such as `42`.
    Number(Number),

    /// A base raised to an exponent, such as `x^2`.
    Power(Power),

    /// Two or more terms added together.
    Add(Add),

    /// Two or more factors multiplied together.
    Mul(Mul),

    /// A function applied to a single argument, such as `sin(x)`.
    Call(Call),

    /// Two sides compared by a relational operator, such as `x + 2 = 7`.
    Relation(Relation),

    /// The derivative of an expression with respect to a variable, such as `d/dx x^2`.
    Derivative(Derivative),
}

impl Expr {
    /// Creates an identifier node.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(Ident { name: name.into(), id: None })
    }

    /// Creates a number literal node.
    pub fn number(value: i64) -> Self {
        Self::Number(Number { value, id: None })
    }

    /// Creates a power node.
    pub fn power(base: Expr, exponent: Expr) -> Self {
        Self::Power(Power {
            base: Box::new(base),
            exponent: Box::new(exponent),
            id: None,
        })
    }

    /// Creates a sum node from the given terms.
    pub fn add(terms: Vec<Expr>) -> Self {
        Self::Add(Add { terms, id: None })
    }

    /// Creates a product node from the given factors.
    pub fn mul(factors: Vec<Expr>) -> Self {
        Self::Mul(Mul { factors, id: None })
    }

    /// Creates a function call node.
    pub fn call(func: impl Into<String>, arg: Expr) -> Self {
        Self::Call(Call {
            func: func.into(),
            arg: Box::new(arg),
            id: None,
        })
    }

    /// Creates a relation node.
    pub fn relation(op: RelOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Relation(Relation {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            id: None,
        })
    }

    /// Creates a derivative node.
    pub fn derivative(var: impl Into<String>, arg: Expr) -> Self {
        Self::Derivative(Derivative {
            var: var.into(),
            arg: Box::new(arg),
            id: None,
        })
    }

    /// Returns the stable id of this node, if one has been assigned.
    pub fn id(&self) -> Option<StableId> {
        match self {
            Expr::Ident(node) => node.id,
            Expr::Number(node) => node.id,
            Expr::Power(node) => node.id,
            Expr::Add(node) => node.id,
            Expr::Mul(node) => node.id,
            Expr::Call(node) => node.id,
            Expr::Relation(node) => node.id,
            Expr::Derivative(node) => node.id,
        }
    }

    /// Returns the direct children of this node, in order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Ident(_) | Expr::Number(_) => Vec::new(),
            Expr::Power(node) => vec![&node.base, &node.exponent],
            Expr::Add(node) => node.terms.iter().collect(),
            Expr::Mul(node) => node.factors.iter().collect(),
            Expr::Call(node) => vec![&node.arg],
            Expr::Relation(node) => vec![&node.lhs, &node.rhs],
            Expr::Derivative(node) => vec![&node.arg],
        }
    }

    /// Returns the value of this node if it is a number literal.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Expr::Number(node) => Some(node.value),
            _ => None,
        }
    }
}
