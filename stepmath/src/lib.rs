//! The end-to-end pipeline of the algebra stepper.
//!
//! Text goes in; a canonical tree with content-derived node ids comes out, already rendered as
//! Content MathML (for persistence and the rewrite-options service) and Presentation MathML
//! (for the display layer). Selection ids resolve back into the tree, and applying a rewrite
//! operation produces the forms of the next derivation step.

pub mod error;
pub mod protocol;

pub use stepmath_engine::{
    apply_rewrite, canonical_signature, canonicalize, decode_content, encode_content,
    find_and_replace_by_id, find_node_by_id, render_presentation, MirrorMode, Operation, OpKind,
};
pub use stepmath_parser::{ast, parser::Parser, Notation};

use ast::{Expr, StableId};
use error::Error;

/// The two renderings of one parsed expression. The pair is always derived from a single tree in
/// a single pass, so the forms are mutually consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedForms {
    /// The Content MathML encoding of the tree.
    pub content_form: String,

    /// The Presentation MathML rendering of the tree, annotated with node ids.
    pub presentation_form: String,
}

/// A parse failure, reduced to what an editor caret needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// The one-line description of the failure.
    pub message: String,

    /// The byte offset into the input the failure points at; the input length for errors at the
    /// end of the input.
    pub index: usize,

    /// A short slice of the input starting at `index`, for diagnostics.
    pub near_text: String,
}

/// Parses input text into a canonical tree with every node id assigned.
pub fn parse_expression(input: &str, notation: Notation) -> Result<Expr, Error> {
    let expr = Parser::new(input, notation).parse_full()?;
    Ok(canonicalize(expr))
}

/// Renders both forms of an already-canonicalized tree.
pub fn forms_of(expr: &Expr) -> ParsedForms {
    ParsedForms {
        content_form: encode_content(expr),
        presentation_form: render_presentation(expr),
    }
}

/// Parses input text and renders both forms, reducing any failure to a caret-friendly value.
pub fn parse_to_forms(input: &str, notation: Notation) -> Result<ParsedForms, ParseFailure> {
    match Parser::new(input, notation).parse_full() {
        Ok(expr) => Ok(forms_of(&canonicalize(expr))),
        Err(err) => {
            let index = err.span.start.min(input.len());
            Err(ParseFailure {
                message: err.kind.message(),
                index,
                near_text: near_text(input, index),
            })
        },
    }
}

/// Applies a rewrite operation to the expression persisted as `content_form`, returning the
/// forms of the next step.
pub fn apply_rewrite_step(
    content_form: &str,
    selection: StableId,
    op: &Operation,
    mode: MirrorMode,
) -> Result<ParsedForms, Error> {
    let tree = canonicalize(decode_content(content_form)?);
    let next = apply_rewrite(&tree, selection, op, mode)?;
    Ok(forms_of(&next))
}

/// Returns a short slice of the input starting at `index`, for error context.
fn near_text(input: &str, index: usize) -> String {
    let start = index.min(input.len());
    input[start..].chars().take(16).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn forms_are_derived_from_one_tree() {
        let forms = parse_to_forms("x + 2 = 7", Notation::Basic).unwrap();
        assert!(forms.content_form.starts_with("<math"));
        assert!(forms.presentation_form.contains("data-node-id="));

        // the content form decodes back to the same structure the presentation was rendered from
        let decoded = canonicalize(decode_content(&forms.content_form).unwrap());
        assert_eq!(render_presentation(&decoded), forms.presentation_form);
    }

    #[test]
    fn parse_failure_points_at_end_of_input() {
        let failure = parse_to_forms("(a+b", Notation::Basic).unwrap_err();
        assert_eq!(failure.index, 4);
        assert_eq!(failure.near_text, "");
        assert_eq!(failure.message, "unclosed parenthesis");

        assert!(parse_to_forms("(a+b)", Notation::Basic).is_ok());
    }

    #[test]
    fn parse_failure_carries_near_text() {
        let failure = parse_to_forms("x + $y + a_long_tail_here", Notation::Basic).unwrap_err();
        assert_eq!(failure.index, 4);
        assert_eq!(failure.near_text, "$y + a_long_tail");
    }

    #[test]
    fn rewrite_step_produces_the_next_forms() {
        let forms = parse_to_forms("x + 2 = 7", Notation::Basic).unwrap();
        let tree = parse_expression("x + 2 = 7", Notation::Basic).unwrap();

        let op = Operation::with_operand(OpKind::Add, ast::Expr::number(3));
        let next = apply_rewrite_step(
            &forms.content_form,
            tree.id().expect("canonical trees are annotated"),
            &op,
            MirrorMode::Mirrored,
        )
        .unwrap();

        let expected = parse_to_forms("x + 5 = 10", Notation::Basic).unwrap();
        assert_eq!(next, expected);
    }

    #[test]
    fn identity_rewrite_keeps_both_sides() {
        let forms = parse_to_forms("x + 2 = 7", Notation::Basic).unwrap();
        let lhs = parse_expression("x + 2", Notation::Basic).unwrap();

        let op = Operation::with_operand(OpKind::RewriteIdentity, lhs.clone());
        let next = apply_rewrite_step(
            &forms.content_form,
            lhs.id().expect("canonical trees are annotated"),
            &op,
            MirrorMode::Mirrored,
        )
        .unwrap();

        assert_eq!(next, forms);
    }

    #[test]
    fn stale_selection_is_a_no_op() {
        let forms = parse_to_forms("x + 2 = 7", Notation::Basic).unwrap();
        let elsewhere = parse_expression("q", Notation::Basic).unwrap();

        let op = Operation::with_operand(OpKind::Add, ast::Expr::number(3));
        let next = apply_rewrite_step(
            &forms.content_form,
            elsewhere.id().expect("canonical trees are annotated"),
            &op,
            MirrorMode::SingleSided,
        )
        .unwrap();

        assert_eq!(next, forms);
    }
}
