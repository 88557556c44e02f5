//! Applies algebraic operations to a subtree, optionally mirrored across a relation.
//!
//! An [`Operation`] arrives from outside the engine (the rewrite-options service or the display
//! layer), is applied once, and is discarded; only its effect survives as a new canonical tree.
//! The engine enforces structural rules only; it does not judge the mathematical soundness of
//! the operations it is given.

use crate::{
    address::{find_and_replace_by_id, find_node_by_id},
    canonical::canonicalize,
};
use stepmath_attrs::ErrorKind;
use stepmath_error::{Error, ErrorKind};
use stepmath_parser::ast::{Expr, StableId};

/// The kind of a rewrite operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Add the operand to the target.
    Add,

    /// Subtract the operand from the target.
    Subtract,

    /// Multiply the target by the operand.
    Multiply,

    /// Divide the target by the operand.
    Divide,

    /// Raise the target to the operand.
    Exponentiate,

    /// Apply a named function to the target.
    FunctionApply,

    /// Replace the target with the operand, restating it as an equal form. Identities are never
    /// mirrored: they rewrite one side, they do not transform a relation.
    RewriteIdentity,

    /// Replace the target with the operand.
    Substitute,
}

/// A single rewrite operation. Constructed externally, applied once, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// What the operation does.
    pub kind: OpKind,

    /// The operand, for every kind except [`OpKind::FunctionApply`].
    pub operand: Option<Expr>,

    /// The function name, for [`OpKind::FunctionApply`].
    pub func: Option<String>,
}

impl Operation {
    /// Creates an operation that carries an operand.
    pub fn with_operand(kind: OpKind, operand: Expr) -> Self {
        Self { kind, operand: Some(operand), func: None }
    }

    /// Creates a function-application operation.
    pub fn function_apply(func: impl Into<String>) -> Self {
        Self { kind: OpKind::FunctionApply, operand: None, func: Some(func.into()) }
    }

    /// Returns the operand, or a contract-violation error if it is missing.
    fn operand(&self) -> Result<&Expr, Error> {
        self.operand.as_ref().ok_or_else(|| {
            Error::new(vec![0..0], MissingOperand { kind: kind_name(self.kind) })
        })
    }

    /// Returns the function name, or a contract-violation error if it is missing.
    fn func(&self) -> Result<&str, Error> {
        self.func
            .as_deref()
            .ok_or_else(|| Error::new(vec![0..0], MissingFunctionName))
    }
}

fn kind_name(kind: OpKind) -> &'static str {
    match kind {
        OpKind::Add => "add",
        OpKind::Subtract => "subtract",
        OpKind::Multiply => "multiply",
        OpKind::Divide => "divide",
        OpKind::Exponentiate => "exponentiate",
        OpKind::FunctionApply => "functionApply",
        OpKind::RewriteIdentity => "rewriteIdentity",
        OpKind::Substitute => "substitute",
    }
}

/// Whether an operation applies to one side only, or symmetrically to both sides of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorMode {
    /// Apply the operation to the targeted subtree only.
    #[default]
    SingleSided,

    /// Apply the operation independently to both sides of a relation at the root of the tree.
    /// Without a relation at the root, this behaves like [`MirrorMode::SingleSided`].
    Mirrored,
}

/// An operation arrived without its operand.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("operation `{}` requires an operand", kind),
    labels = [""],
    help = "this is a bug in the caller: the operation was constructed without its operand",
)]
pub struct MissingOperand {
    /// The name of the operation kind.
    pub kind: &'static str,
}

/// A function-application operation arrived without a function name.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "operation `functionApply` requires a function name",
    labels = [""],
    help = "this is a bug in the caller: the operation was constructed without its function name",
)]
pub struct MissingFunctionName;

/// Applies `op` to the subtree addressed by `target`, returning the next canonical tree.
///
/// With [`MirrorMode::Mirrored`] and a relation at the root, the operation is instead applied to
/// both whole sides of the relation, except for identity rewrites, which always act on the
/// target alone. A stale `target` that no longer resolves leaves the tree unchanged.
pub fn apply_rewrite(
    root: &Expr,
    target: StableId,
    op: &Operation,
    mode: MirrorMode,
) -> Result<Expr, Error> {
    if op.kind != OpKind::RewriteIdentity && mode == MirrorMode::Mirrored {
        if let Expr::Relation(relation) = root {
            let lhs = apply_op((*relation.lhs).clone(), op)?;
            let rhs = apply_op((*relation.rhs).clone(), op)?;
            return Ok(canonicalize(Expr::relation(relation.op, lhs, rhs)));
        }
    }

    let Some(subtree) = find_node_by_id(root, target) else {
        return Ok(canonicalize(root.clone()));
    };

    let rewritten = apply_op(subtree.clone(), op)?;
    Ok(canonicalize(find_and_replace_by_id(root, target, &rewritten)))
}

/// Applies one operation to one expression.
fn apply_op(target: Expr, op: &Operation) -> Result<Expr, Error> {
    match op.kind {
        OpKind::Add => Ok(add_terms(target, op.operand()?.clone())),
        OpKind::Subtract => Ok(add_terms(target, negate(op.operand()?.clone()))),
        OpKind::Multiply => Ok(mul_factors(target, op.operand()?.clone())),
        OpKind::Divide => {
            let operand = op.operand()?.clone();
            match (numeric_value(&target), numeric_value(&operand)) {
                (Some(a), Some(b)) if b != 0 && a % b == 0 => Ok(Expr::number(a / b)),
                _ => Ok(mul_factors(target, Expr::power(operand, Expr::number(-1)))),
            }
        },
        OpKind::Exponentiate => Ok(Expr::power(target, op.operand()?.clone())),
        OpKind::FunctionApply => Ok(Expr::call(op.func()?, target)),
        OpKind::RewriteIdentity | OpKind::Substitute => Ok(op.operand()?.clone()),
    }
}

/// Negates an expression: a number literal flips its sign, anything else is wrapped in a
/// multiplication by `-1`.
fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Number(mut node) => {
            node.value = -node.value;
            node.id = None;
            Expr::Number(node)
        },
        other => Expr::mul(vec![Expr::number(-1), other]),
    }
}

/// Returns the numeric value of a purely numeric expression: a number literal, or a product
/// whose factors are all purely numeric. Overflow makes a term non-numeric rather than wrapping.
fn numeric_value(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Number(node) => Some(node.value),
        Expr::Mul(node) => node
            .factors
            .iter()
            .try_fold(1i64, |product, factor| {
                product.checked_mul(numeric_value(factor)?)
            }),
        _ => None,
    }
}

/// Adds two expressions: both term lists are flattened together, and all purely numeric terms
/// fold into at most one literal at the position of the first numeric term.
fn add_terms(target: Expr, operand: Expr) -> Expr {
    let mut terms = Vec::new();
    flatten_add_into(target, &mut terms);
    flatten_add_into(operand, &mut terms);
    fold_terms(terms)
}

fn flatten_add_into(expr: Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Add(node) => {
            for term in node.terms {
                flatten_add_into(term, out);
            }
        },
        other => out.push(other),
    }
}

fn fold_terms(terms: Vec<Expr>) -> Expr {
    let mut sum = 0i64;
    let mut numeric_at = None;
    for (i, term) in terms.iter().enumerate() {
        if let Some(value) = numeric_value(term) {
            match sum.checked_add(value) {
                Some(next) => {
                    sum = next;
                    if numeric_at.is_none() {
                        numeric_at = Some(i);
                    }
                },
                // give up folding rather than misfold on overflow
                None => return rebuild_sum(terms),
            }
        }
    }

    let Some(numeric_at) = numeric_at else {
        return rebuild_sum(terms);
    };

    let mut folded = Vec::with_capacity(terms.len());
    for (i, term) in terms.into_iter().enumerate() {
        if numeric_value(&term).is_some() {
            if i == numeric_at && sum != 0 {
                folded.push(Expr::number(sum));
            }
        } else {
            folded.push(term);
        }
    }
    rebuild_sum(folded)
}

fn rebuild_sum(mut terms: Vec<Expr>) -> Expr {
    match terms.len() {
        0 => Expr::number(0),
        1 => terms.swap_remove(0),
        _ => Expr::add(terms),
    }
}

/// Multiplies two expressions: both factor lists are flattened together, and literal number
/// factors fold into at most one literal at the position of the first numeric factor.
fn mul_factors(target: Expr, operand: Expr) -> Expr {
    let mut factors = Vec::new();
    flatten_mul_into(target, &mut factors);
    flatten_mul_into(operand, &mut factors);
    fold_factors(factors)
}

fn flatten_mul_into(expr: Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(node) => {
            for factor in node.factors {
                flatten_mul_into(factor, out);
            }
        },
        other => out.push(other),
    }
}

fn fold_factors(factors: Vec<Expr>) -> Expr {
    let mut product = 1i64;
    let mut numeric_at = None;
    for (i, factor) in factors.iter().enumerate() {
        if let Some(value) = factor.as_number() {
            match product.checked_mul(value) {
                Some(next) => {
                    product = next;
                    if numeric_at.is_none() {
                        numeric_at = Some(i);
                    }
                },
                None => return rebuild_product(factors),
            }
        }
    }

    let Some(numeric_at) = numeric_at else {
        return rebuild_product(factors);
    };

    if product == 0 {
        return Expr::number(0);
    }

    let mut folded = Vec::with_capacity(factors.len());
    for (i, factor) in factors.into_iter().enumerate() {
        if factor.as_number().is_some() {
            if i == numeric_at && product != 1 {
                folded.push(Expr::number(product));
            }
        } else {
            folded.push(factor);
        }
    }

    if folded.is_empty() {
        return Expr::number(product);
    }
    rebuild_product(folded)
}

fn rebuild_product(mut factors: Vec<Expr>) -> Expr {
    match factors.len() {
        0 => Expr::number(1),
        1 => factors.swap_remove(0),
        _ => Expr::mul(factors),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stepmath_parser::{parser::Parser, Notation};
    use super::*;

    fn parse_canonical(input: &str) -> Expr {
        canonicalize(Parser::new(input, Notation::Basic).parse_full().unwrap())
    }

    fn id_of(tree: &Expr, part: &str) -> StableId {
        let target = parse_canonical(part);
        find_node_by_id(tree, target.id().unwrap())
            .and_then(Expr::id)
            .unwrap()
    }

    #[test]
    fn mirrored_add_folds_both_sides() {
        let tree = parse_canonical("x + 2 = 7");
        let op = Operation::with_operand(OpKind::Add, Expr::number(3));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::Mirrored).unwrap();
        assert_eq!(next.to_string(), "x + 5 = 10");
    }

    #[test]
    fn mirrored_subtract_folds_both_sides() {
        let tree = parse_canonical("x + 2 = 7");
        let op = Operation::with_operand(OpKind::Subtract, Expr::number(2));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::Mirrored).unwrap();
        assert_eq!(next.to_string(), "x = 5");
    }

    #[test]
    fn identity_never_mirrors() {
        let tree = parse_canonical("x + 2 = 7");
        let lhs_id = id_of(&tree, "x + 2");
        let op = Operation::with_operand(
            OpKind::RewriteIdentity,
            parse_canonical("2 + x"),
        );

        let next = apply_rewrite(&tree, lhs_id, &op, MirrorMode::Mirrored).unwrap();
        assert_eq!(next.to_string(), "2 + x = 7");
    }

    #[test]
    fn identity_replaces_the_target_verbatim() {
        let tree = parse_canonical("x + 2 = 7");
        let op = Operation::with_operand(OpKind::RewriteIdentity, parse_canonical("x + 2"));

        // replacing the left side with itself leaves the rendering unchanged
        let lhs_id = id_of(&tree, "x + 2");
        let next = apply_rewrite(&tree, lhs_id, &op, MirrorMode::Mirrored).unwrap();
        assert_eq!(next.to_string(), "x + 2 = 7");
    }

    #[test]
    fn single_sided_add_targets_one_subtree() {
        let tree = parse_canonical("x + 2 = 7");
        let rhs_id = id_of(&tree, "7");
        let op = Operation::with_operand(OpKind::Add, Expr::number(3));

        let next = apply_rewrite(&tree, rhs_id, &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "x + 2 = 10");
    }

    #[test]
    fn mirroring_without_a_relation_falls_back_to_the_target() {
        let tree = parse_canonical("x + 2");
        let op = Operation::with_operand(OpKind::Add, Expr::number(3));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::Mirrored).unwrap();
        assert_eq!(next.to_string(), "x + 5");
    }

    #[test]
    fn stale_target_leaves_the_tree_unchanged() {
        let tree = parse_canonical("x + 2 = 7");
        let elsewhere = parse_canonical("q");
        let op = Operation::with_operand(OpKind::Add, Expr::number(3));

        let next = apply_rewrite(
            &tree,
            elsewhere.id().unwrap(),
            &op,
            MirrorMode::SingleSided,
        )
        .unwrap();
        assert_eq!(next, tree);
    }

    #[test]
    fn add_flattens_nested_sums() {
        let tree = parse_canonical("x + 1");
        let op = Operation::with_operand(
            OpKind::Add,
            parse_canonical("y + 2"),
        );

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "x + 3 + y");
    }

    #[test]
    fn sum_that_cancels_collapses_to_zero() {
        let tree = parse_canonical("2");
        let op = Operation::with_operand(OpKind::Subtract, Expr::number(2));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "0");
    }

    #[test]
    fn subtract_folds_parsed_negated_terms() {
        // `x - 2` stores the 2 behind a -1 factor; it still folds numerically
        let tree = parse_canonical("x - 2 = 7");
        let op = Operation::with_operand(OpKind::Add, Expr::number(2));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::Mirrored).unwrap();
        assert_eq!(next.to_string(), "x = 9");
    }

    #[test]
    fn subtract_wraps_symbolic_operands() {
        let tree = parse_canonical("y");
        let op = Operation::with_operand(OpKind::Subtract, Expr::ident("x"));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "y - x");
    }

    #[test]
    fn multiply_folds_literals() {
        let tree = parse_canonical("2x");
        let op = Operation::with_operand(OpKind::Multiply, Expr::number(3));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "6*x");
    }

    #[test]
    fn multiply_by_zero_collapses() {
        let tree = parse_canonical("2x");
        let op = Operation::with_operand(OpKind::Multiply, Expr::number(0));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "0");
    }

    #[test]
    fn divide_folds_exact_quotients() {
        let tree = parse_canonical("10");
        let op = Operation::with_operand(OpKind::Divide, Expr::number(2));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "5");
    }

    #[test]
    fn divide_lowers_to_a_reciprocal_power() {
        let tree = parse_canonical("x");
        let op = Operation::with_operand(OpKind::Divide, Expr::number(3));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "x*3^(-1)");
    }

    #[test]
    fn exponentiate_wraps_the_target() {
        let tree = parse_canonical("x + 1");
        let op = Operation::with_operand(OpKind::Exponentiate, Expr::number(2));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "(x + 1)^2");
    }

    #[test]
    fn function_apply_wraps_the_target() {
        let tree = parse_canonical("x");
        let op = Operation::function_apply("sin");

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "sin(x)");
    }

    #[test]
    fn mirrored_function_apply_wraps_both_sides() {
        let tree = parse_canonical("x = y");
        let op = Operation::function_apply("sin");

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::Mirrored).unwrap();
        assert_eq!(next.to_string(), "sin(x) = sin(y)");
    }

    #[test]
    fn substitute_replaces_the_target() {
        let tree = parse_canonical("sin(x)^2 + cos(x)^2");
        let target_id = id_of(&tree, "sin(x)^2");
        let op = Operation::with_operand(
            OpKind::Substitute,
            parse_canonical("1 - cos(x)^2"),
        );

        let next = apply_rewrite(&tree, target_id, &op, MirrorMode::SingleSided).unwrap();
        assert_eq!(next.to_string(), "1 - cos(x)^2 + cos(x)^2");
    }

    #[test]
    fn missing_operand_is_a_contract_violation() {
        let tree = parse_canonical("x");
        let op = Operation { kind: OpKind::Add, operand: None, func: None };

        let err = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap_err();
        assert_eq!(err.kind.message(), "operation `add` requires an operand");
    }

    #[test]
    fn missing_function_name_is_a_contract_violation() {
        let tree = parse_canonical("x");
        let op = Operation { kind: OpKind::FunctionApply, operand: None, func: None };

        let err = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::SingleSided).unwrap_err();
        assert_eq!(
            err.kind.message(),
            "operation `functionApply` requires a function name",
        );
    }

    #[test]
    fn rewritten_trees_are_recanonicalized() {
        let tree = parse_canonical("x + 2 = 7");
        let op = Operation::with_operand(OpKind::Add, Expr::number(3));

        let next = apply_rewrite(&tree, tree.id().unwrap(), &op, MirrorMode::Mirrored).unwrap();

        fn all_annotated(expr: &Expr) -> bool {
            expr.id().is_some() && expr.children().iter().all(|child| all_annotated(child))
        }
        assert!(all_annotated(&next));
    }
}
