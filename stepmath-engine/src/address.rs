//! Resolves stable ids back to subtrees.
//!
//! Because ids are content-derived, structurally equal subtrees share one id; lookups resolve
//! ambiguity by taking the first match in pre-order. A missing id is a valid outcome, not an
//! error: a selection can go stale after an unrelated edit.

use stepmath_parser::ast::{Expr, StableId};

/// Returns the first node in pre-order whose stable id equals `id`.
pub fn find_node_by_id(tree: &Expr, id: StableId) -> Option<&Expr> {
    if tree.id() == Some(id) {
        return Some(tree);
    }
    tree.children()
        .into_iter()
        .find_map(|child| find_node_by_id(child, id))
}

/// Rebuilds the tree with `replacement` substituted for the first pre-order node whose stable id
/// equals `id`. Untouched branches are cloned as-is. If no node matches, the returned tree is an
/// unchanged copy of the original.
pub fn find_and_replace_by_id(tree: &Expr, id: StableId, replacement: &Expr) -> Expr {
    let mut done = false;
    replace(tree, id, replacement, &mut done)
}

fn replace(tree: &Expr, id: StableId, replacement: &Expr, done: &mut bool) -> Expr {
    if *done {
        return tree.clone();
    }
    if tree.id() == Some(id) {
        *done = true;
        return replacement.clone();
    }

    match tree {
        Expr::Ident(_) | Expr::Number(_) => tree.clone(),
        Expr::Power(node) => {
            let mut node = node.clone();
            node.base = Box::new(replace(&node.base, id, replacement, done));
            node.exponent = Box::new(replace(&node.exponent, id, replacement, done));
            Expr::Power(node)
        },
        Expr::Add(node) => {
            let mut node = node.clone();
            node.terms = node
                .terms
                .iter()
                .map(|term| replace(term, id, replacement, done))
                .collect();
            Expr::Add(node)
        },
        Expr::Mul(node) => {
            let mut node = node.clone();
            node.factors = node
                .factors
                .iter()
                .map(|factor| replace(factor, id, replacement, done))
                .collect();
            Expr::Mul(node)
        },
        Expr::Call(node) => {
            let mut node = node.clone();
            node.arg = Box::new(replace(&node.arg, id, replacement, done));
            Expr::Call(node)
        },
        Expr::Relation(node) => {
            let mut node = node.clone();
            node.lhs = Box::new(replace(&node.lhs, id, replacement, done));
            node.rhs = Box::new(replace(&node.rhs, id, replacement, done));
            Expr::Relation(node)
        },
        Expr::Derivative(node) => {
            let mut node = node.clone();
            node.arg = Box::new(replace(&node.arg, id, replacement, done));
            Expr::Derivative(node)
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::canonical::canonicalize;
    use pretty_assertions::assert_eq;
    use stepmath_parser::{parser::Parser, Notation};
    use super::*;

    fn parse_canonical(input: &str) -> Expr {
        canonicalize(Parser::new(input, Notation::Basic).parse_full().unwrap())
    }

    #[test]
    fn finds_a_nested_node() {
        let tree = parse_canonical("x + sin(y)^2");
        let target = canonicalize(Expr::call("sin", Expr::ident("y")));
        let found = find_node_by_id(&tree, target.id().unwrap()).unwrap();
        assert_eq!(found, &target);
    }

    #[test]
    fn missing_id_is_not_found() {
        let tree = parse_canonical("x + 1");
        let elsewhere = canonicalize(Expr::ident("q"));
        assert_eq!(find_node_by_id(&tree, elsewhere.id().unwrap()), None);
    }

    #[test]
    fn replaces_a_nested_node() {
        let tree = parse_canonical("x + sin(y)^2");
        let target = canonicalize(Expr::call("sin", Expr::ident("y")));
        let replacement = Expr::ident("s");

        let replaced = find_and_replace_by_id(&tree, target.id().unwrap(), &replacement);
        assert_eq!(replaced.to_string(), "x + s^2");
    }

    #[test]
    fn replaces_only_the_first_preorder_match() {
        let tree = parse_canonical("cos(x) + cos(x)");
        let target = canonicalize(Expr::call("cos", Expr::ident("x")));

        let replaced = find_and_replace_by_id(&tree, target.id().unwrap(), &Expr::ident("c"));
        assert_eq!(replaced.to_string(), "c + cos(x)");
    }

    #[test]
    fn missing_id_replaces_nothing() {
        let tree = parse_canonical("x + 1");
        let elsewhere = canonicalize(Expr::ident("q"));

        let replaced = find_and_replace_by_id(&tree, elsewhere.id().unwrap(), &Expr::number(9));
        assert_eq!(replaced, tree);
    }
}
