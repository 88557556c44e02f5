pub mod token;

use crate::Notation;
use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};

/// Returns an iterator over the token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Returns an owned array containing all of the tokens produced by the tokenizer. This allows us
/// to backtrack in case of an error.
///
/// In the extended notation, adjacent letter / underscore / digit tokens beginning with a letter
/// or underscore are glued into a single [`TokenKind::Name`] token, widening identifiers to
/// `[A-Za-z_][A-Za-z0-9_]*`.
pub fn tokenize_complete<'source>(input: &'source str, notation: Notation) -> Box<[Token<'source>]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(Ok(kind)) = lexer.next() {
        tokens.push(Token {
            span: lexer.span(),
            kind,
            lexeme: lexer.slice(),
        });
    }

    match notation {
        Notation::Basic => tokens.into_boxed_slice(),
        Notation::Extended => glue_names(input, tokens).into_boxed_slice(),
    }
}

/// Merges maximal runs of adjacent `Name` / `Underscore` / `Int` tokens that start with a letter
/// or underscore into one `Name` token.
fn glue_names<'source>(input: &'source str, tokens: Vec<Token<'source>>) -> Vec<Token<'source>> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        if matches!(token.kind, TokenKind::Name | TokenKind::Underscore) {
            let start = token.span.start;
            let mut end = token.span.end;
            let mut j = i + 1;
            while j < tokens.len()
                && matches!(tokens[j].kind, TokenKind::Name | TokenKind::Underscore | TokenKind::Int)
                && tokens[j].span.start == end
            {
                end = tokens[j].span.end;
                j += 1;
            }
            out.push(Token {
                span: start..end,
                kind: TokenKind::Name,
                lexeme: &input[start..end],
            });
            i = j;
        } else {
            out.push(token.clone());
            i += 1;
        }
    }

    out
}
