pub mod error;

use crate::{
    ast::{Expr, RelOp},
    tokenizer::{tokenize_complete, Token, TokenKind},
    Notation,
};
use error::{kind, Error};
use std::ops::Range;

/// A high-level parser for expression text. This is the type to use to parse an arbitrary piece
/// of input into an expression tree.
///
/// The grammar, from lowest to highest precedence:
///
/// ```text
/// Expr     := Relation
/// Relation := Add ( relOp Add )?
/// Add      := Mul ( ('+' | '-') Mul )*
/// Mul      := Power ( ('*' Power) | ('/' Power) | Power )*
/// Power    := Unary ('^' Power)?
/// Unary    := ('+' | '-')? Primary
/// Primary  := Derivative | Call | Ident | Number | '(' Expr ')'
/// ```
///
/// A subtracted term is stored as multiplication by `-1`, explicit division (extended notation
/// only) as multiplication by a reciprocal power, and a bare juxtaposed primary continues the
/// enclosing product (implicit multiplication, e.g. `2x` or `3(a + b)`). Unary signs are only
/// accepted in the extended notation.
#[derive(Debug, Clone)]
pub struct Parser<'source> {
    /// The tokens that this parser is currently parsing.
    tokens: Box<[Token<'source>]>,

    /// The index of the **next** token to be parsed.
    cursor: usize,

    /// The notation the source was written in.
    notation: Notation,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str, notation: Notation) -> Self {
        Self {
            tokens: tokenize_complete(source, notation),
            cursor: 0,
            notation,
        }
    }

    /// Creates an error that points at the current token, or the end of the input if the cursor
    /// is at the end of the stream.
    fn error(&self, kind: impl stepmath_error::ErrorKind + 'static) -> Error {
        Error::new(self.span(), kind)
    }

    /// Creates a fatal error that points at the current token, or the end of the input if the
    /// cursor is at the end of the stream.
    fn error_fatal(&self, kind: impl stepmath_error::ErrorKind + 'static) -> Error {
        Error::new_fatal(self.span(), kind)
    }

    /// Returns a span pointing at the end of the input.
    pub fn eof_span(&self) -> Range<usize> {
        self.tokens.last().map_or(0..0, |token| token.span.end..token.span.end)
    }

    /// Returns the span of the next meaningful token, or the end of the input if only whitespace
    /// remains.
    pub fn span(&self) -> Range<usize> {
        self.peek_token().map_or(self.eof_span(), |token| token.span.clone())
    }

    /// Returns the next non-whitespace token without advancing the cursor.
    fn peek_token(&self) -> Option<&Token<'source>> {
        self.tokens[self.cursor..].iter().find(|token| !token.is_whitespace())
    }

    /// Returns the kind of the next non-whitespace token without advancing the cursor.
    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek_token().map(|token| token.kind)
    }

    /// Returns the next token to be parsed, then advances the cursor. Whitespace tokens are
    /// skipped.
    ///
    /// Returns an EOF error if there are no more tokens.
    fn next_token(&mut self) -> Result<Token<'source>, Error> {
        while self.cursor < self.tokens.len() {
            let token = &self.tokens[self.cursor];
            self.cursor += 1;
            if token.is_whitespace() {
                continue;
            } else {
                // cloning is cheap: only Range<_> is cloned
                return Ok(token.clone());
            }
        }

        Err(self.error(kind::UnexpectedEof))
    }

    /// Advances past the next token and returns it if it has the given kind. The stream is left
    /// unchanged otherwise.
    fn eat(&mut self, kind: TokenKind) -> Option<Token<'source>> {
        let start = self.cursor;
        match self.next_token() {
            Ok(token) if token.kind == kind => Some(token),
            _ => {
                self.cursor = start;
                None
            },
        }
    }

    /// Speculatively parses a value using the given parsing function, backtracking the cursor if
    /// parsing fails. Fatal errors are propagated without backtracking.
    fn try_parse_with_fn<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Parser<'source>) -> Result<T, Error>,
    {
        let start = self.cursor;
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) if err.fatal => Err(err),
            err => {
                self.cursor = start;
                err
            },
        }
    }

    /// Parses the source as a single complete expression. All tokens must be consumed; trailing
    /// tokens after a complete parse are an error, never a partial success.
    pub fn parse_full(&mut self) -> Result<Expr, Error> {
        let expr = self.parse_expr()?;
        match self.peek_token() {
            None => Ok(expr),
            Some(_) => Err(self.error(kind::ExpectedEof)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_relation()
    }

    /// Maps the next token onto a relational operator, without consuming it.
    fn peek_relation_op(&self) -> Option<RelOp> {
        match self.peek_kind()? {
            TokenKind::Eq => Some(RelOp::Eq),
            TokenKind::Less => Some(RelOp::Lt),
            TokenKind::LessEq => Some(RelOp::Le),
            TokenKind::Greater => Some(RelOp::Gt),
            TokenKind::GreaterEq => Some(RelOp::Ge),
            _ => None,
        }
    }

    fn parse_relation(&mut self) -> Result<Expr, Error> {
        let lhs = self.parse_add()?;
        let Some(op) = self.peek_relation_op() else {
            return Ok(lhs);
        };
        self.next_token()?;

        let rhs = self.parse_add()?;
        if self.peek_relation_op().is_some() {
            return Err(self.error_fatal(kind::ChainedRelation));
        }

        Ok(Expr::relation(op, lhs, rhs))
    }

    fn parse_add(&mut self) -> Result<Expr, Error> {
        let first = self.parse_mul()?;
        let mut terms = vec![first];

        loop {
            if self.eat(TokenKind::Add).is_some() {
                terms.push(self.parse_mul()?);
            } else if self.eat(TokenKind::Sub).is_some() {
                let rhs = self.parse_mul()?;
                terms.push(Expr::mul(vec![Expr::number(-1), rhs]));
            } else {
                break;
            }
        }

        if terms.len() == 1 {
            Ok(terms.swap_remove(0))
        } else {
            Ok(Expr::add(terms))
        }
    }

    fn parse_mul(&mut self) -> Result<Expr, Error> {
        let first = self.parse_power()?;
        let mut factors = vec![first];

        loop {
            if self.eat(TokenKind::Mul).is_some() {
                factors.push(self.parse_power()?);
            } else if self.notation == Notation::Extended && self.eat(TokenKind::Div).is_some() {
                let rhs = self.parse_power()?;
                factors.push(Expr::power(rhs, Expr::number(-1)));
            } else if matches!(
                self.peek_kind(),
                Some(TokenKind::Name | TokenKind::Int | TokenKind::OpenParen)
            ) {
                // implicit multiplication: a primary directly after a completed factor
                factors.push(self.parse_power()?);
            } else {
                break;
            }
        }

        if factors.len() == 1 {
            Ok(factors.swap_remove(0))
        } else {
            Ok(Expr::mul(factors))
        }
    }

    fn parse_power(&mut self) -> Result<Expr, Error> {
        let base = self.parse_unary()?;
        if self.eat(TokenKind::Exp).is_some() {
            let exponent = self.parse_power()?;
            return Ok(Expr::power(base, exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        if self.notation == Notation::Extended {
            if self.eat(TokenKind::Add).is_some() {
                return self.parse_primary();
            }
            if self.eat(TokenKind::Sub).is_some() {
                let operand = self.parse_primary()?;
                return Ok(Expr::mul(vec![Expr::number(-1), operand]));
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let Some(token) = self.peek_token().cloned() else {
            return Err(self.error(kind::UnexpectedEof));
        };

        match token.kind {
            TokenKind::Name => {
                if token.lexeme == "d" {
                    match self.try_parse_with_fn(Self::parse_derivative) {
                        Ok(derivative) => return Ok(derivative),
                        Err(err) if err.fatal => return Err(err),
                        Err(_) => {},
                    }
                }

                self.next_token()?;

                // a name directly adjacent to `(` is a function call; with whitespace in
                // between, the parenthesis is an implicit multiplication instead
                if let Some(open) = self.peek_token() {
                    if open.kind == TokenKind::OpenParen && open.span.start == token.span.end {
                        let arg = self.parse_paren_group()?;
                        return Ok(Expr::call(token.lexeme, arg));
                    }
                }

                Ok(Expr::ident(token.lexeme))
            },
            TokenKind::Int => {
                self.next_token()?;
                let value = token
                    .lexeme
                    .parse()
                    .map_err(|_| Error::new(token.span.clone(), kind::InvalidNumber))?;
                Ok(Expr::number(value))
            },
            TokenKind::OpenParen => self.parse_paren_group(),
            TokenKind::CloseParen => {
                Err(self.error_fatal(kind::UnclosedParenthesis { opening: false }))
            },
            TokenKind::Unknown | TokenKind::Underscore => Err(self.error(kind::UnknownCharacter {
                ch: token.lexeme.chars().next().unwrap_or('\u{fffd}'),
            })),
            _ => Err(self.error(kind::ExpectedExpr)),
        }
    }

    /// Parses a parenthesized expression, returning the inner expression.
    fn parse_paren_group(&mut self) -> Result<Expr, Error> {
        let Some(open) = self.eat(TokenKind::OpenParen) else {
            return Err(self.error(kind::ExpectedExpr));
        };

        if let Some(close) = self.eat(TokenKind::CloseParen) {
            return Err(Error::new_fatal(
                open.span.start..close.span.end,
                kind::EmptyParenthesis,
            ));
        }

        let expr = self.parse_expr()?;
        if self.eat(TokenKind::CloseParen).is_none() {
            return Err(self.error_fatal(kind::UnclosedParenthesis { opening: true }));
        }

        Ok(expr)
    }

    /// Parses derivative notation: the identifier `d`, followed by `/` and an identifier of the
    /// form `d<var>`, followed by either a parenthesized expression or a single power.
    fn parse_derivative(input: &mut Parser<'source>) -> Result<Expr, Error> {
        let d = input.next_token()?;
        if d.kind != TokenKind::Name || d.lexeme != "d" {
            return Err(input.error(kind::ExpectedExpr));
        }

        if input.eat(TokenKind::Div).is_none() {
            return Err(input.error(kind::ExpectedExpr));
        }

        let dv = input.next_token()?;
        if dv.kind != TokenKind::Name || dv.lexeme.len() < 2 || !dv.lexeme.starts_with('d') {
            return Err(input.error(kind::ExpectedExpr));
        }
        let var = &dv.lexeme[1..];

        let arg = if input.peek_kind() == Some(TokenKind::OpenParen) {
            input.parse_paren_group()?
        } else {
            input.parse_power()?
        };

        Ok(Expr::derivative(var, arg))
    }
}
