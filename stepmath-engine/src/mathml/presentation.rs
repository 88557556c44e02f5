//! Renders a tree as Presentation MathML annotated with stable node ids.
//!
//! Every element that corresponds 1:1 to a node carries the node's id in a `data-node-id`
//! attribute, letting the display layer map a rendered region back to its subtree. Elements
//! introduced purely for layout (the parenthesis row around a power base, the factor group of a
//! sign-collapsed term) inherit the id of their nearest corresponding node. Operator glyphs
//! carry no id of their own; they belong to the annotated row around them.

use crate::mathml::{escape_text, MATHML_NS};
use stepmath_parser::ast::{Add, Expr, Mul, RelOp, StableId};

/// Renders the tree as a Presentation MathML document.
///
/// The tree is expected to be canonicalized; nodes without an id render without the annotation
/// attribute.
pub fn render_presentation(expr: &Expr) -> String {
    let mut out = String::new();
    out.push_str("<math xmlns=\"");
    out.push_str(MATHML_NS);
    out.push_str("\" display=\"block\">");
    render(expr, &mut out);
    out.push_str("</math>");
    out
}

/// Writes the ` data-node-id="…"` attribute for a node, or nothing if no id is assigned.
fn push_id_attr(out: &mut String, id: Option<StableId>) {
    if let Some(id) = id {
        out.push_str(" data-node-id=\"");
        out.push_str(&id.to_string());
        out.push('"');
    }
}

fn render(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Ident(node) => {
            out.push_str("<mi");
            push_id_attr(out, node.id);
            out.push('>');
            out.push_str(&escape_text(&node.name));
            out.push_str("</mi>");
        },
        Expr::Number(node) => {
            if node.value < 0 {
                out.push_str("<mrow");
                push_id_attr(out, node.id);
                out.push_str("><mo>-</mo><mn>");
                out.push_str(&node.value.unsigned_abs().to_string());
                out.push_str("</mn></mrow>");
            } else {
                out.push_str("<mn");
                push_id_attr(out, node.id);
                out.push('>');
                out.push_str(&node.value.to_string());
                out.push_str("</mn>");
            }
        },
        Expr::Power(node) => {
            out.push_str("<msup");
            push_id_attr(out, node.id);
            out.push('>');
            if power_base_needs_parens(&node.base) {
                // the wrapper row stands in for the base, so it inherits the base's id
                out.push_str("<mrow");
                push_id_attr(out, node.base.id());
                out.push_str("><mo>(</mo>");
                render(&node.base, out);
                out.push_str("<mo>)</mo></mrow>");
            } else {
                render(&node.base, out);
            }
            render(&node.exponent, out);
            out.push_str("</msup>");
        },
        Expr::Add(node) => render_sum(node, out),
        Expr::Mul(node) => {
            out.push_str("<mrow");
            push_id_attr(out, node.id);
            out.push('>');
            render_factors(&node.factors, out);
            out.push_str("</mrow>");
        },
        Expr::Call(node) => {
            out.push_str("<mrow");
            push_id_attr(out, node.id);
            out.push_str("><mi>");
            out.push_str(&escape_text(&node.func));
            out.push_str("</mi><mo>(</mo>");
            render(&node.arg, out);
            out.push_str("<mo>)</mo></mrow>");
        },
        Expr::Relation(node) => {
            out.push_str("<mrow");
            push_id_attr(out, node.id);
            out.push('>');
            render(&node.lhs, out);
            out.push_str("<mo>");
            out.push_str(relation_glyph(node.op));
            out.push_str("</mo>");
            render(&node.rhs, out);
            out.push_str("</mrow>");
        },
        Expr::Derivative(node) => {
            out.push_str("<mrow");
            push_id_attr(out, node.id);
            out.push_str("><mfrac><mi>d</mi><mrow><mi>d</mi><mi>");
            out.push_str(&escape_text(&node.var));
            out.push_str("</mi></mrow></mfrac><mo>(</mo>");
            render(&node.arg, out);
            out.push_str("<mo>)</mo></mrow>");
        },
    }
}

/// The display glyph for a relational operator, entity-escaped where the encoding requires it.
fn relation_glyph(op: RelOp) -> &'static str {
    match op {
        RelOp::Eq => "=",
        RelOp::Lt => "&lt;",
        RelOp::Le => "≤",
        RelOp::Gt => "&gt;",
        RelOp::Ge => "≥",
    }
}

/// A power base is wrapped in explicit parentheses when it is a sum, a relation, or a product
/// with more than one factor.
fn power_base_needs_parens(base: &Expr) -> bool {
    match base {
        Expr::Add(_) | Expr::Relation(_) => true,
        Expr::Mul(node) => node.factors.len() > 1,
        _ => false,
    }
}

/// Renders a sum, collapsing negative terms into subtraction: a literal negative number renders
/// as a minus followed by its magnitude, and a product with a leading `-1` factor renders as a
/// minus followed by the remaining factors.
fn render_sum(node: &Add, out: &mut String) {
    out.push_str("<mrow");
    push_id_attr(out, node.id);
    out.push('>');

    for (i, term) in node.terms.iter().enumerate() {
        let negated = negated_body(term);
        match (i == 0, negated.is_some()) {
            (true, false) => {},
            (true, true) => out.push_str("<mo>-</mo>"),
            (false, false) => out.push_str("<mo>+</mo>"),
            (false, true) => out.push_str("<mo>-</mo>"),
        }

        match negated {
            None => render(term, out),
            Some(NegatedBody::Magnitude(value, id)) => {
                out.push_str("<mn");
                push_id_attr(out, id);
                out.push('>');
                out.push_str(&value.to_string());
                out.push_str("</mn>");
            },
            Some(NegatedBody::Factors(mul)) => {
                // the group stands in for the whole negated product term
                out.push_str("<mrow");
                push_id_attr(out, mul.id);
                out.push('>');
                match &mul.factors[1..] {
                    [] => out.push_str("<mn>1</mn>"),
                    rest => render_factors(rest, out),
                }
                out.push_str("</mrow>");
            },
        }
    }

    out.push_str("</mrow>");
}

/// What a negated term renders as, once its sign has been absorbed into the separator.
enum NegatedBody<'a> {
    /// The magnitude of a negative number literal, with the literal's id.
    Magnitude(u64, Option<StableId>),

    /// A product whose leading `-1` factor is dropped.
    Factors(&'a Mul),
}

fn negated_body(term: &Expr) -> Option<NegatedBody<'_>> {
    match term {
        Expr::Number(node) if node.value < 0 => {
            Some(NegatedBody::Magnitude(node.value.unsigned_abs(), node.id))
        },
        Expr::Mul(node) if node.factors.first().and_then(Expr::as_number) == Some(-1) => {
            Some(NegatedBody::Factors(node))
        },
        _ => None,
    }
}

/// Renders factors joined by an explicit multiplication glyph. Sums, relations, and
/// negative-leading factors after the first are parenthesized for precedence.
fn render_factors(factors: &[Expr], out: &mut String) {
    for (i, factor) in factors.iter().enumerate() {
        if i > 0 {
            out.push_str("<mo>·</mo>");
        }
        let needs_parens = matches!(factor, Expr::Add(_) | Expr::Relation(_))
            || (i > 0 && starts_negative(factor));
        if needs_parens {
            out.push_str("<mrow");
            push_id_attr(out, factor.id());
            out.push_str("><mo>(</mo>");
            render(factor, out);
            out.push_str("<mo>)</mo></mrow>");
        } else {
            render(factor, out);
        }
    }
}

fn starts_negative(expr: &Expr) -> bool {
    match expr {
        Expr::Number(node) => node.value < 0,
        Expr::Mul(node) => node.factors.first().is_some_and(starts_negative),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::canonical::canonicalize;
    use pretty_assertions::assert_eq;
    use stepmath_parser::{parser::Parser, Notation};
    use super::*;

    fn render_str(input: &str) -> String {
        let expr = canonicalize(
            Parser::new(input, Notation::Basic).parse_full().unwrap(),
        );
        render_presentation(&expr)
    }

    /// Strips the annotation attributes so element shapes can be compared on their own.
    fn without_ids(markup: &str) -> String {
        let mut out = String::new();
        let mut rest = markup;
        while let Some(start) = rest.find(" data-node-id=\"") {
            out.push_str(&rest[..start]);
            let after = &rest[start + " data-node-id=\"".len()..];
            match after.find('"') {
                Some(end) => rest = &after[end + 1..],
                None => break,
            }
        }
        out.push_str(rest);
        out
    }

    #[test]
    fn annotates_every_structural_element() {
        let markup = render_str("x + 2");
        assert!(markup.contains("<mi data-node-id="));
        assert!(markup.contains("<mn data-node-id="));
        assert!(markup.contains("<mrow data-node-id="));
    }

    #[test]
    fn power_of_sum_base_is_parenthesized() {
        assert_eq!(
            without_ids(&render_str("(a+b)^2")),
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"block\">\
             <msup><mrow><mo>(</mo><mrow><mi>a</mi><mo>+</mo><mi>b</mi></mrow><mo>)</mo></mrow>\
             <mn>2</mn></msup></math>",
        );
    }

    #[test]
    fn power_of_product_base_is_parenthesized() {
        let markup = without_ids(&render_str("(2x)^2"));
        assert!(markup.contains("<mo>(</mo>"));
    }

    #[test]
    fn atom_base_is_bare() {
        assert_eq!(
            without_ids(&render_str("x^2")),
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"block\">\
             <msup><mi>x</mi><mn>2</mn></msup></math>",
        );
    }

    #[test]
    fn subtraction_renders_with_minus_glyph() {
        assert_eq!(
            without_ids(&render_str("a - b")),
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"block\">\
             <mrow><mi>a</mi><mo>-</mo><mrow><mi>b</mi></mrow></mrow></math>",
        );
    }

    #[test]
    fn negative_literal_term_collapses() {
        let expr = canonicalize(Expr::add(vec![Expr::ident("x"), Expr::number(-4)]));
        assert_eq!(
            without_ids(&render_presentation(&expr)),
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"block\">\
             <mrow><mi>x</mi><mo>-</mo><mn>4</mn></mrow></math>",
        );
    }

    #[test]
    fn lone_negated_one_substitutes_a_literal() {
        let expr = canonicalize(Expr::add(vec![
            Expr::ident("a"),
            Expr::mul(vec![Expr::number(-1)]),
        ]));
        let markup = without_ids(&render_presentation(&expr));
        assert!(markup.contains("<mo>-</mo><mrow><mn>1</mn></mrow>"));
    }

    #[test]
    fn factors_join_with_a_visible_glyph() {
        let markup = without_ids(&render_str("2x"));
        assert_eq!(
            markup,
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"block\">\
             <mrow><mn>2</mn><mo>·</mo><mi>x</mi></mrow></math>",
        );
    }

    #[test]
    fn relation_glyphs_are_escaped() {
        assert!(render_str("a < b").contains("<mo>&lt;</mo>"));
        assert!(render_str("a > b").contains("<mo>&gt;</mo>"));
        assert!(render_str("a <= b").contains("<mo>≤</mo>"));
        assert!(render_str("a >= b").contains("<mo>≥</mo>"));
        assert!(render_str("a = b").contains("<mo>=</mo>"));
    }

    #[test]
    fn derivative_renders_a_stacked_fraction() {
        let markup = without_ids(&render_str("d/dx(x^2)"));
        assert!(markup.contains("<mfrac><mi>d</mi><mrow><mi>d</mi><mi>x</mi></mrow></mfrac>"));
        assert!(markup.contains("<mo>(</mo>"));
    }

    #[test]
    fn call_renders_with_parenthesized_argument() {
        let markup = without_ids(&render_str("sin(x)"));
        assert_eq!(
            markup,
            "<math xmlns=\"http://www.w3.org/1998/Math/MathML\" display=\"block\">\
             <mrow><mi>sin</mi><mo>(</mo><mi>x</mi><mo>)</mo></mrow></math>",
        );
    }

    #[test]
    fn equal_subtrees_share_rendered_ids() {
        let markup = render_str("cos(x) + cos(x)");
        let first = markup.find("<mrow data-node-id=").map(|_| ());
        assert!(first.is_some());

        // both cos(x) rows carry the same id, by construction
        let ids: Vec<&str> = markup
            .match_indices("data-node-id=\"")
            .map(|(at, pat)| {
                let rest = &markup[at + pat.len()..];
                &rest[..rest.find('"').unwrap()]
            })
            .collect();
        let cos_ids: Vec<&&str> = ids
            .iter()
            .filter(|id| {
                markup
                    .match_indices(&format!("data-node-id=\"{}\"", id))
                    .count()
                    > 1
            })
            .collect();
        assert!(!cos_ids.is_empty());
    }

    #[test]
    fn base_paren_row_inherits_the_base_id() {
        let expr = canonicalize(
            Parser::new("(a+b)^2", Notation::Basic).parse_full().unwrap(),
        );
        let Expr::Power(power) = &expr else { panic!("expected a power") };
        let base_id = power.base.id().unwrap().to_string();
        let markup = render_presentation(&expr);
        assert!(markup.contains(&format!(
            "<mrow data-node-id=\"{}\"><mo>(</mo>",
            base_id,
        )));
    }
}
