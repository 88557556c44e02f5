use super::StableId;

/// A variable or other named symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// The name of the symbol.
    pub name: String,

    /// The content-derived id of this node, once assigned.
    pub id: Option<StableId>,
}

/// An integer literal.
///
/// The tokenizer only produces non-negative literals; negative values arise from constant
/// folding in the rewrite engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    /// The value of the literal.
    pub value: i64,

    /// The content-derived id of this node, once assigned.
    pub id: Option<StableId>,
}
