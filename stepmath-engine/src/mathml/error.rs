//! Errors produced while decoding Content MathML.

use stepmath_attrs::ErrorKind;
use stepmath_error::ErrorKind;

/// The markup ended in the middle of an element.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of markup",
    labels = ["the markup ends in the middle of an element here"],
)]
pub struct UnexpectedEndOfMarkup;

/// A closing tag did not match the element it should close.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("mismatched closing tag: expected `</{}>`, found `</{}>`", expected, found),
    labels = ["this closing tag does not match its element"],
)]
pub struct MismatchedClosingTag {
    /// The local name of the element being closed.
    pub expected: String,

    /// The local name found in the closing tag.
    pub found: String,
}

/// Markup content that could not be understood at all.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected content in markup",
    labels = ["I could not understand this part of the markup"],
)]
pub struct StrayMarkup;

/// An `apply` element with no operator.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "empty apply element",
    labels = ["this `apply` element has no operator"],
)]
pub struct EmptyApply;

/// An element that is not part of the content encoding.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unsupported tag `{}`", tag),
    labels = ["this element is not part of the content encoding"],
)]
pub struct UnsupportedTag {
    /// The local name of the element.
    pub tag: String,
}

/// An operator that is not part of the content encoding.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unsupported operator `{}`", tag),
    labels = ["this operator is not part of the content encoding"],
)]
pub struct UnsupportedOperator {
    /// The local name of the operator element.
    pub tag: String,
}

/// A `cn` element whose text is not an integer.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid numeric literal",
    labels = ["this value is not a representable integer"],
)]
pub struct InvalidNumericLiteral;

/// An operator applied to the wrong number of operands.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("wrong number of operands for `{}`", tag),
    labels = [format!("expected {} operands here, found {}", expected, found)],
)]
pub struct WrongOperandCount {
    /// The local name of the operator element.
    pub tag: String,

    /// The number of operands the operator requires.
    pub expected: usize,

    /// The number of operands found.
    pub found: usize,
}

/// A leaf element with no usable value.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("empty `{}` element", tag),
    labels = ["add a value here"],
)]
pub struct EmptyLeaf {
    /// The local name of the element.
    pub tag: String,
}

/// A `diff` application where neither operand is an identifier.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "missing derivative variable",
    labels = ["one operand of `diff` must be an identifier"],
)]
pub struct MissingDerivativeVariable;
