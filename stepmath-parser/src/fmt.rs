//! Renders an expression tree back into editable text.
//!
//! This is the inverse of the parser: the output of these [`Display`] impls parses back into an
//! equivalent tree. Subtraction is recovered from the internal `-1`-factor encoding, so a sum
//! renders as `a - b`, never as `a + (-1)*b`.

use crate::ast::{Add, Call, Derivative, Expr, Ident, Mul, Number, Power, Relation};
use std::fmt::{self, Display, Formatter};

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(node) => node.fmt(f),
            Expr::Number(node) => node.fmt(f),
            Expr::Power(node) => node.fmt(f),
            Expr::Add(node) => node.fmt(f),
            Expr::Mul(node) => node.fmt(f),
            Expr::Call(node) => node.fmt(f),
            Expr::Relation(node) => node.fmt(f),
            Expr::Derivative(node) => node.fmt(f),
        }
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Returns true if the rendered form of the expression would begin with a minus sign.
fn starts_negative(expr: &Expr) -> bool {
    match expr {
        Expr::Number(node) => node.value < 0,
        Expr::Mul(node) => node.factors.first().is_some_and(starts_negative),
        _ => false,
    }
}

/// Returns true if the expression renders as a single token and can appear as a bare exponent.
fn is_atom(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) => true,
        Expr::Number(node) => node.value >= 0,
        _ => false,
    }
}

impl Display for Power {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let base_needs_parens = matches!(
            &*self.base,
            Expr::Add(_) | Expr::Mul(_) | Expr::Power(_) | Expr::Relation(_)
        ) || starts_negative(&self.base);

        if base_needs_parens {
            write!(f, "({})", self.base)?;
        } else {
            write!(f, "{}", self.base)?;
        }

        if is_atom(&self.exponent) {
            write!(f, "^{}", self.exponent)
        } else {
            write!(f, "^({})", self.exponent)
        }
    }
}

/// The body of a term once its leading minus sign has been removed.
enum Stripped<'a> {
    /// The magnitude of a negative number literal.
    Number(u64),

    /// The factors remaining after dropping a leading `-1`.
    Factors(&'a [Expr]),
}

/// Splits off a term's leading sign: a negative number literal, or a product whose first factor
/// is the literal `-1`.
fn strip_sign(term: &Expr) -> Option<Stripped<'_>> {
    match term {
        Expr::Number(node) if node.value < 0 => Some(Stripped::Number(node.value.unsigned_abs())),
        Expr::Mul(node) if node.factors.first().and_then(Expr::as_number) == Some(-1) => {
            Some(Stripped::Factors(&node.factors[1..]))
        },
        _ => None,
    }
}

fn fmt_stripped(f: &mut Formatter<'_>, stripped: &Stripped<'_>) -> fmt::Result {
    match stripped {
        Stripped::Number(value) => write!(f, "{}", value),
        Stripped::Factors([]) => write!(f, "1"),
        Stripped::Factors(factors) => fmt_factors(f, factors),
    }
}

fn fmt_factors(f: &mut Formatter<'_>, factors: &[Expr]) -> fmt::Result {
    for (i, factor) in factors.iter().enumerate() {
        if i > 0 {
            write!(f, "*")?;
        }
        let needs_parens = matches!(factor, Expr::Add(_) | Expr::Relation(_))
            || (i > 0 && starts_negative(factor));
        if needs_parens {
            write!(f, "({})", factor)?;
        } else {
            write!(f, "{}", factor)?;
        }
    }
    Ok(())
}

impl Display for Add {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            match (i == 0, strip_sign(term)) {
                (true, None) => write!(f, "{}", term)?,
                (true, Some(stripped)) => {
                    write!(f, "-")?;
                    fmt_stripped(f, &stripped)?;
                },
                (false, None) => {
                    write!(f, " + {}", term)?;
                },
                (false, Some(stripped)) => {
                    write!(f, " - ")?;
                    fmt_stripped(f, &stripped)?;
                },
            }
        }
        Ok(())
    }
}

impl Display for Mul {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match strip_sign_of_product(self) {
            Some(rest) => {
                write!(f, "-")?;
                match rest {
                    [] => write!(f, "1"),
                    factors => fmt_factors(f, factors),
                }
            },
            None => fmt_factors(f, &self.factors),
        }
    }
}

/// Splits a leading `-1` factor off a standalone product.
fn strip_sign_of_product(node: &Mul) -> Option<&[Expr]> {
    if node.factors.first().and_then(Expr::as_number) == Some(-1) {
        Some(&node.factors[1..])
    } else {
        None
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.func, self.arg)
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op.as_str(), self.rhs)
    }
}

impl Display for Derivative {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "d/d{}({})", self.var, self.arg)
    }
}

#[cfg(test)]
mod tests {
    use crate::{parser::Parser, Notation};
    use super::*;

    fn render(input: &str) -> String {
        Parser::new(input, Notation::Basic)
            .parse_full()
            .unwrap()
            .to_string()
    }

    #[test]
    fn sign_collapses_to_subtraction() {
        let expr = Expr::add(vec![
            Expr::number(1),
            Expr::mul(vec![
                Expr::number(-1),
                Expr::power(
                    Expr::call("cos", Expr::ident("x")),
                    Expr::number(2),
                ),
            ]),
        ]);

        assert_eq!(expr.to_string(), "1 - cos(x)^2");
    }

    #[test]
    fn negative_literal_term_collapses() {
        let expr = Expr::add(vec![Expr::ident("x"), Expr::number(-4)]);
        assert_eq!(expr.to_string(), "x - 4");
    }

    #[test]
    fn leading_negative_term() {
        let expr = Expr::add(vec![
            Expr::mul(vec![Expr::number(-1), Expr::ident("x")]),
            Expr::ident("y"),
        ]);
        assert_eq!(expr.to_string(), "-x + y");
    }

    #[test]
    fn lone_negated_one_renders_as_one() {
        let expr = Expr::add(vec![
            Expr::ident("a"),
            Expr::mul(vec![Expr::number(-1)]),
        ]);
        assert_eq!(expr.to_string(), "a - 1");
    }

    #[test]
    fn standalone_negated_product() {
        let expr = Expr::mul(vec![Expr::number(-1), Expr::ident("x")]);
        assert_eq!(expr.to_string(), "-x");
    }

    #[test]
    fn power_base_parenthesization() {
        assert_eq!(render("(a+b)^2"), "(a + b)^2");
        assert_eq!(render("(2x)^2"), "(2*x)^2");
        assert_eq!(render("x^2"), "x^2");
        assert_eq!(render("cos(x)^2"), "cos(x)^2");
    }

    #[test]
    fn exponent_parenthesization() {
        assert_eq!(render("x^(a+b)"), "x^(a + b)");
        let expr = Expr::power(Expr::ident("x"), Expr::number(-1));
        assert_eq!(expr.to_string(), "x^(-1)");
    }

    #[test]
    fn nested_power_base_keeps_grouping() {
        let expr = Expr::power(
            Expr::power(Expr::ident("x"), Expr::number(2)),
            Expr::number(3),
        );
        assert_eq!(expr.to_string(), "(x^2)^3");
    }

    #[test]
    fn product_with_sum_factor() {
        assert_eq!(render("2(a+b)"), "2*(a + b)");
    }

    #[test]
    fn relation_rendering() {
        assert_eq!(render("x + 2 = 7"), "x + 2 = 7");
        assert_eq!(render("a <= b"), "a <= b");
    }

    #[test]
    fn derivative_rendering() {
        assert_eq!(render("d/dx(x^2)"), "d/dx(x^2)");
        assert_eq!(render("d/dt t"), "d/dt(t)");
    }

    #[test]
    fn round_trips_through_parser() {
        for input in ["1 - cos(x)^2", "x + 2 = 7", "2*x + 5", "(a + b)^2", "-x + y"] {
            let expr = Parser::new(input, Notation::Extended).parse_full().unwrap();
            let rendered = expr.to_string();
            let reparsed = Parser::new(&rendered, Notation::Extended).parse_full().unwrap();
            assert_eq!(reparsed.to_string(), rendered);
        }
    }
}
