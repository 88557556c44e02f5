//! The Content MathML codec.
//!
//! The encoder wraps a tree in a `<math>` root and maps each node onto the content vocabulary
//! (`<ci>`, `<cn>`, and n-ary `<apply>` forms). The decoder is its tolerant inverse: it accepts
//! a lone element without the `<math>` wrapper, descends through unknown single-child wrappers,
//! reads an unknown text leaf as a number when its text is purely digits (an identifier
//! otherwise), and rejects everything else with a spanned error.

use crate::mathml::{error as kind, escape_text, known_func_tag, unescape_text, MATHML_NS};
use logos::Logos;
use std::fmt::{self, Display, Formatter};
use std::ops::Range;
use stepmath_error::Error;
use stepmath_parser::ast::{Expr, RelOp};

/// A trait for types that can be written in the Content MathML vocabulary.
pub trait ContentMathMl {
    /// Format the value as Content MathML, without the `<math>` wrapper.
    fn fmt_content(&self, f: &mut Formatter) -> fmt::Result;

    /// Wraps the value in a [`ContentFormatter`], which implements [`Display`].
    fn as_content(&self) -> ContentFormatter<'_, Self> {
        ContentFormatter(self)
    }
}

/// A wrapper type that implements [`Display`] for any type that implements [`ContentMathMl`].
pub struct ContentFormatter<'a, T: ?Sized>(&'a T);

impl<T: ?Sized> Display for ContentFormatter<'_, T>
where
    T: ContentMathMl,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt_content(f)
    }
}

impl ContentMathMl for Expr {
    fn fmt_content(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Expr::Ident(node) => write!(f, "<ci>{}</ci>", escape_text(&node.name)),
            Expr::Number(node) => write!(f, "<cn>{}</cn>", node.value),
            Expr::Power(node) => {
                write!(f, "<apply><power/>")?;
                node.base.fmt_content(f)?;
                node.exponent.fmt_content(f)?;
                write!(f, "</apply>")
            },
            Expr::Add(node) => {
                write!(f, "<apply><plus/>")?;
                for term in &node.terms {
                    term.fmt_content(f)?;
                }
                write!(f, "</apply>")
            },
            Expr::Mul(node) => {
                write!(f, "<apply><times/>")?;
                for factor in &node.factors {
                    factor.fmt_content(f)?;
                }
                write!(f, "</apply>")
            },
            Expr::Call(node) => {
                match known_func_tag(&node.func) {
                    Some(tag) => write!(f, "<apply><{}/>", tag)?,
                    None => write!(f, "<apply><ci>{}</ci>", escape_text(&node.func))?,
                }
                node.arg.fmt_content(f)?;
                write!(f, "</apply>")
            },
            Expr::Relation(node) => {
                let tag = match node.op {
                    RelOp::Eq => "eq",
                    RelOp::Lt => "lt",
                    RelOp::Le => "leq",
                    RelOp::Gt => "gt",
                    RelOp::Ge => "geq",
                };
                write!(f, "<apply><{}/>", tag)?;
                node.lhs.fmt_content(f)?;
                node.rhs.fmt_content(f)?;
                write!(f, "</apply>")
            },
            Expr::Derivative(node) => {
                write!(f, "<apply><diff/><ci>{}</ci>", escape_text(&node.var))?;
                node.arg.fmt_content(f)?;
                write!(f, "</apply>")
            },
        }
    }
}

/// Serializes the tree as a Content MathML document.
pub fn encode_content(expr: &Expr) -> String {
    format!("<math xmlns=\"{}\">{}</math>", MATHML_NS, expr.as_content())
}

/// The pieces of markup recognized by the decoder.
#[derive(Logos, Clone, Copy, Debug, PartialEq)]
enum MarkupToken {
    #[regex(r"<([A-Za-z][A-Za-z0-9]*:)?[A-Za-z][A-Za-z0-9]*(\s[^<>]*)?/>")]
    SelfClosing,

    #[regex(r"<([A-Za-z][A-Za-z0-9]*:)?[A-Za-z][A-Za-z0-9]*(\s[^<>]*)?>")]
    Open,

    #[regex(r"</\s*([A-Za-z][A-Za-z0-9]*:)?[A-Za-z][A-Za-z0-9]*\s*>")]
    Close,

    #[regex(r"[^<>]+")]
    Text,

    #[regex(r".", priority = 0)]
    Unknown,
}

/// Extracts the local tag name from an open, self-closing, or close tag lexeme: the markup
/// delimiters, any attributes, and any namespace prefix are stripped.
fn local_name(lexeme: &str) -> String {
    let name = lexeme
        .trim_start_matches('<')
        .trim_start_matches('/')
        .trim_start()
        .split(|ch: char| ch.is_whitespace() || ch == '/' || ch == '>')
        .next()
        .unwrap_or("");
    match name.split_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.to_string(),
    }
}

/// A parsed markup element.
#[derive(Debug)]
struct Element {
    /// The local tag name, without any namespace prefix.
    local: String,

    /// The region of the markup string covered by the element.
    span: Range<usize>,

    /// Child elements, in document order.
    children: Vec<Element>,

    /// Concatenated, entity-unescaped text content, trimmed.
    text: String,
}

/// A pull reader over the markup token stream.
struct Reader<'source> {
    tokens: Vec<(MarkupToken, Range<usize>, &'source str)>,
    cursor: usize,
    len: usize,
}

impl<'source> Reader<'source> {
    fn new(markup: &'source str) -> Self {
        let mut lexer = MarkupToken::lexer(markup);
        let mut tokens = Vec::new();
        while let Some(Ok(token)) = lexer.next() {
            tokens.push((token, lexer.span(), lexer.slice()));
        }
        Self { tokens, cursor: 0, len: markup.len() }
    }

    fn eof_span(&self) -> Range<usize> {
        self.len..self.len
    }

    /// Skips whitespace-only text between elements.
    fn skip_blank_text(&mut self) {
        while let Some((MarkupToken::Text, _, lexeme)) = self.tokens.get(self.cursor) {
            if lexeme.trim().is_empty() {
                self.cursor += 1;
            } else {
                break;
            }
        }
    }

    /// Parses one complete element, including its closing tag.
    fn parse_element(&mut self) -> Result<Element, Error> {
        self.skip_blank_text();
        let Some((token, span, lexeme)) = self.tokens.get(self.cursor).cloned() else {
            return Err(Error::new(vec![self.eof_span()], kind::UnexpectedEndOfMarkup));
        };
        self.cursor += 1;

        match token {
            MarkupToken::SelfClosing => Ok(Element {
                local: local_name(lexeme),
                span,
                children: Vec::new(),
                text: String::new(),
            }),
            MarkupToken::Open => {
                let local = local_name(lexeme);
                let mut children = Vec::new();
                let mut text = String::new();

                loop {
                    self.skip_blank_text();
                    let Some((next, next_span, next_lexeme)) = self.tokens.get(self.cursor).cloned() else {
                        return Err(Error::new(vec![self.eof_span()], kind::UnexpectedEndOfMarkup));
                    };

                    match next {
                        MarkupToken::Close => {
                            self.cursor += 1;
                            let found = local_name(next_lexeme);
                            if found != local {
                                return Err(Error::new(
                                    vec![next_span],
                                    kind::MismatchedClosingTag { expected: local, found },
                                ));
                            }
                            return Ok(Element {
                                local,
                                span: span.start..next_span.end,
                                children,
                                text: text.trim().to_string(),
                            });
                        },
                        MarkupToken::Open | MarkupToken::SelfClosing => {
                            children.push(self.parse_element()?);
                        },
                        MarkupToken::Text => {
                            self.cursor += 1;
                            text.push_str(&unescape_text(next_lexeme));
                        },
                        MarkupToken::Unknown => {
                            return Err(Error::new(vec![next_span], kind::StrayMarkup));
                        },
                    }
                }
            },
            _ => Err(Error::new(vec![span], kind::StrayMarkup)),
        }
    }

    /// Requires that nothing but blank text remains.
    fn expect_end(&mut self) -> Result<(), Error> {
        self.skip_blank_text();
        match self.tokens.get(self.cursor) {
            None => Ok(()),
            Some((_, span, _)) => Err(Error::new(vec![span.clone()], kind::StrayMarkup)),
        }
    }
}

/// Deserializes a Content MathML document (or a lone content element) back into a tree.
///
/// The returned tree carries no stable ids; run it through the canonicalizer before addressing
/// into it.
pub fn decode_content(markup: &str) -> Result<Expr, Error> {
    let mut reader = Reader::new(markup);
    let root = reader.parse_element()?;
    reader.expect_end()?;

    let element = if root.local == "math" {
        let span = root.span.clone();
        match root.children.into_iter().next() {
            Some(first) => first,
            None => return Err(Error::new(vec![span], kind::EmptyLeaf { tag: "math".into() })),
        }
    } else {
        root
    };

    to_expr(element)
}

fn to_expr(element: Element) -> Result<Expr, Error> {
    let span = element.span.clone();
    match element.local.as_str() {
        "ci" => {
            if element.text.is_empty() {
                return Err(Error::new(vec![span], kind::EmptyLeaf { tag: "ci".into() }));
            }
            Ok(Expr::ident(element.text))
        },
        "cn" => {
            if element.text.is_empty() {
                return Err(Error::new(vec![span], kind::EmptyLeaf { tag: "cn".into() }));
            }
            match element.text.parse() {
                Ok(value) => Ok(Expr::number(value)),
                Err(_) => Err(Error::new(vec![span], kind::InvalidNumericLiteral)),
            }
        },
        "apply" => to_apply(element),
        _ => {
            // tolerances: descend through an unknown single-child wrapper, and read an unknown
            // text leaf as a number or identifier
            if element.children.len() == 1 {
                let child = element.children.into_iter().next();
                match child {
                    Some(child) => to_expr(child),
                    None => Err(Error::new(vec![span], kind::UnsupportedTag { tag: element.local })),
                }
            } else if element.children.is_empty() && !element.text.is_empty() {
                if element.text.bytes().all(|byte| byte.is_ascii_digit()) {
                    match element.text.parse() {
                        Ok(value) => Ok(Expr::number(value)),
                        Err(_) => Err(Error::new(vec![span], kind::InvalidNumericLiteral)),
                    }
                } else {
                    Ok(Expr::ident(element.text))
                }
            } else {
                Err(Error::new(vec![span], kind::UnsupportedTag { tag: element.local }))
            }
        },
    }
}

fn to_apply(element: Element) -> Result<Expr, Error> {
    let span = element.span.clone();
    let mut kids = element.children.into_iter();
    let Some(head) = kids.next() else {
        return Err(Error::new(vec![span], kind::EmptyApply));
    };
    let head_span = head.span.clone();
    let args: Vec<Element> = kids.collect();

    match head.local.as_str() {
        "power" => {
            let [base, exponent] = expect_operands::<2>("power", args, &head_span)?;
            Ok(Expr::power(to_expr(base)?, to_expr(exponent)?))
        },
        "plus" => to_nary("plus", args, &head_span, Expr::add),
        "times" => to_nary("times", args, &head_span, Expr::mul),
        "eq" | "lt" | "leq" | "gt" | "geq" => {
            let op = match head.local.as_str() {
                "eq" => RelOp::Eq,
                "lt" => RelOp::Lt,
                "leq" => RelOp::Le,
                "gt" => RelOp::Gt,
                _ => RelOp::Ge,
            };
            let [lhs, rhs] = expect_operands::<2>(&head.local, args, &head_span)?;
            Ok(Expr::relation(op, to_expr(lhs)?, to_expr(rhs)?))
        },
        "diff" => {
            let [first, second] = expect_operands::<2>("diff", args, &head_span)?;
            let first = to_expr(first)?;
            let second = to_expr(second)?;
            // the variable and the argument are accepted in either order
            match (first, second) {
                (Expr::Ident(var), arg) => Ok(Expr::derivative(var.name, arg)),
                (arg, Expr::Ident(var)) => Ok(Expr::derivative(var.name, arg)),
                _ => Err(Error::new(vec![span], kind::MissingDerivativeVariable)),
            }
        },
        "sin" | "cos" | "tan" | "sec" | "csc" | "cot" | "exp" | "ln" => {
            let func = head.local.clone();
            let [arg] = expect_operands::<1>(&func, args, &head_span)?;
            Ok(Expr::call(func, to_expr(arg)?))
        },
        "ci" => {
            if head.text.is_empty() {
                return Err(Error::new(vec![head_span], kind::EmptyLeaf { tag: "ci".into() }));
            }
            let func = head.text;
            let [arg] = expect_operands::<1>(&func, args, &head_span)?;
            Ok(Expr::call(func, to_expr(arg)?))
        },
        _ => Err(Error::new(vec![head_span], kind::UnsupportedOperator { tag: head.local })),
    }
}

/// Checks an operator's operand count, returning the operands as a fixed-size array.
fn expect_operands<const N: usize>(
    tag: &str,
    args: Vec<Element>,
    head_span: &Range<usize>,
) -> Result<[Element; N], Error> {
    let found = args.len();
    args.try_into().map_err(|_| {
        Error::new(
            vec![head_span.clone()],
            kind::WrongOperandCount { tag: tag.to_string(), expected: N, found },
        )
    })
}

/// Builds an n-ary node, collapsing a single operand to the operand itself.
fn to_nary(
    tag: &str,
    args: Vec<Element>,
    head_span: &Range<usize>,
    build: impl FnOnce(Vec<Expr>) -> Expr,
) -> Result<Expr, Error> {
    if args.is_empty() {
        return Err(Error::new(
            vec![head_span.clone()],
            kind::WrongOperandCount { tag: tag.to_string(), expected: 2, found: 0 },
        ));
    }

    let mut children = Vec::with_capacity(args.len());
    for arg in args {
        children.push(to_expr(arg)?);
    }

    if children.len() == 1 {
        Ok(children.swap_remove(0))
    } else {
        Ok(build(children))
    }
}
