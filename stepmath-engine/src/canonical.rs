//! Assigns content-derived stable ids to every node of a tree.
//!
//! A node's *canonical signature* is a deterministic, whitespace-free textual encoding of its
//! kind and its children's signatures (not their ids), e.g. `power(ident:x,number:2)`. The
//! stable id is the djb2 hash of that signature, so structurally identical subtrees always hash
//! to the same id, in any tree, on any platform.

use stepmath_parser::ast::{Expr, StableId};

/// Hashes a canonical signature with the djb2 string hash (32-bit, wrapping).
fn djb2(signature: &str) -> u32 {
    let mut hash: u32 = 5381;
    for byte in signature.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u32::from(byte));
    }
    hash
}

/// Returns the canonical signature of the given subtree.
pub fn canonical_signature(expr: &Expr) -> String {
    match expr {
        Expr::Ident(node) => format!("ident:{}", node.name),
        Expr::Number(node) => format!("number:{}", node.value),
        Expr::Power(node) => format!(
            "power({},{})",
            canonical_signature(&node.base),
            canonical_signature(&node.exponent),
        ),
        Expr::Add(node) => format!("add({})", join_signatures(&node.terms)),
        Expr::Mul(node) => format!("mul({})", join_signatures(&node.factors)),
        Expr::Call(node) => format!("call:{}({})", node.func, canonical_signature(&node.arg)),
        Expr::Relation(node) => format!(
            "rel:{}({},{})",
            relation_tag(node.op),
            canonical_signature(&node.lhs),
            canonical_signature(&node.rhs),
        ),
        Expr::Derivative(node) => format!(
            "diff(ident:{},{})",
            node.var,
            canonical_signature(&node.arg),
        ),
    }
}

fn join_signatures(children: &[Expr]) -> String {
    children
        .iter()
        .map(canonical_signature)
        .collect::<Vec<_>>()
        .join(",")
}

fn relation_tag(op: stepmath_parser::ast::RelOp) -> &'static str {
    use stepmath_parser::ast::RelOp;
    match op {
        RelOp::Eq => "eq",
        RelOp::Lt => "lt",
        RelOp::Le => "le",
        RelOp::Gt => "gt",
        RelOp::Ge => "ge",
    }
}

/// Assigns a stable id to every node of the tree, bottom-up, and returns the annotated tree.
///
/// Recomputing ids on an unchanged subtree always yields the same values; ids are purely a
/// function of structure. Nodes are annotated during construction of the returned tree, so the
/// input's identity semantics are unaffected.
pub fn canonicalize(expr: Expr) -> Expr {
    assign(expr).0
}

/// Annotates a subtree and returns it along with its canonical signature, letting parents build
/// their signatures without re-walking children.
fn assign(expr: Expr) -> (Expr, String) {
    match expr {
        Expr::Ident(mut node) => {
            let signature = format!("ident:{}", node.name);
            node.id = Some(StableId::new(djb2(&signature)));
            (Expr::Ident(node), signature)
        },
        Expr::Number(mut node) => {
            let signature = format!("number:{}", node.value);
            node.id = Some(StableId::new(djb2(&signature)));
            (Expr::Number(node), signature)
        },
        Expr::Power(mut node) => {
            let (base, base_sig) = assign(*node.base);
            let (exponent, exponent_sig) = assign(*node.exponent);
            node.base = Box::new(base);
            node.exponent = Box::new(exponent);
            let signature = format!("power({},{})", base_sig, exponent_sig);
            node.id = Some(StableId::new(djb2(&signature)));
            (Expr::Power(node), signature)
        },
        Expr::Add(mut node) => {
            let mut signatures = Vec::with_capacity(node.terms.len());
            node.terms = node
                .terms
                .into_iter()
                .map(|term| {
                    let (term, signature) = assign(term);
                    signatures.push(signature);
                    term
                })
                .collect();
            let signature = format!("add({})", signatures.join(","));
            node.id = Some(StableId::new(djb2(&signature)));
            (Expr::Add(node), signature)
        },
        Expr::Mul(mut node) => {
            let mut signatures = Vec::with_capacity(node.factors.len());
            node.factors = node
                .factors
                .into_iter()
                .map(|factor| {
                    let (factor, signature) = assign(factor);
                    signatures.push(signature);
                    factor
                })
                .collect();
            let signature = format!("mul({})", signatures.join(","));
            node.id = Some(StableId::new(djb2(&signature)));
            (Expr::Mul(node), signature)
        },
        Expr::Call(mut node) => {
            let (arg, arg_sig) = assign(*node.arg);
            node.arg = Box::new(arg);
            let signature = format!("call:{}({})", node.func, arg_sig);
            node.id = Some(StableId::new(djb2(&signature)));
            (Expr::Call(node), signature)
        },
        Expr::Relation(mut node) => {
            let (lhs, lhs_sig) = assign(*node.lhs);
            let (rhs, rhs_sig) = assign(*node.rhs);
            node.lhs = Box::new(lhs);
            node.rhs = Box::new(rhs);
            let signature = format!("rel:{}({},{})", relation_tag(node.op), lhs_sig, rhs_sig);
            node.id = Some(StableId::new(djb2(&signature)));
            (Expr::Relation(node), signature)
        },
        Expr::Derivative(mut node) => {
            let (arg, arg_sig) = assign(*node.arg);
            node.arg = Box::new(arg);
            let signature = format!("diff(ident:{},{})", node.var, arg_sig);
            node.id = Some(StableId::new(djb2(&signature)));
            (Expr::Derivative(node), signature)
        },
    }
}
