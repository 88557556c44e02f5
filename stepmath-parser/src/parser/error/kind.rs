use ariadne::Fmt;
use stepmath_attrs::ErrorKind;
use stepmath_error::{ErrorKind, EXPR};

/// The end of the input was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of input",
    labels = [format!("you might need to add another {} here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The end of the input was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of input",
    labels = [format!("I could not understand the remaining {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedEof;

/// Expected to see an expression here.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected an expression",
    labels = [format!("I expected to see an {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedExpr;

/// A parenthesis was not closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed parenthesis",
    labels = [if *opening {
        "expected a closing parenthesis by this point"
    } else {
        "this parenthesis was never opened"
    }],
    help = if *opening {
        "add a closing parenthesis `)` somewhere after this"
    } else {
        "add an opening parenthesis `(` somewhere before this"
    },
)]
pub struct UnclosedParenthesis {
    /// Whether the parenthesis was an opening parenthesis `(`. Otherwise, the parenthesis was a
    /// closing parenthesis `)`.
    pub opening: bool,
}

/// There was no expression inside a pair of parentheses.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "missing expression inside parenthesis",
    labels = ["add an expression here"],
)]
pub struct EmptyParenthesis;

/// A character that is not part of the notation was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unrecognized character `{}`", ch),
    labels = ["here"],
)]
pub struct UnknownCharacter {
    /// The character that was found.
    pub ch: char,
}

/// A number literal was too large to represent.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "number literal is too large",
    labels = ["this value cannot be represented"],
    help = "number literals must fit in a signed 64-bit integer",
)]
pub struct InvalidNumber;

/// A second relational operator was found in one expression.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "cannot chain relational operators",
    labels = ["this second comparison is not allowed"],
    help = "an expression may contain at most one relational operator",
)]
pub struct ChainedRelation;
