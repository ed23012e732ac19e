use crate::span::Span;

/// A token is any maximal run of non-whitespace characters. The assembler
/// decides what it means; the lexer only remembers where it came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    pub span: Span,
}

impl Token {
    pub fn new(offs: usize, len: usize) -> Self {
        Token {
            span: Span::new(offs, len),
        }
    }

    /// Slice the token text back out of the source it was lexed from.
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.span.range()]
    }
}

/// Split source into spanned whitespace-delimited tokens.
///
/// Mnemonics, hex operands and `#`-prefixed origin labels all come out as
/// plain tokens here. There is deliberately no token-kind classification:
/// the assembler's single pass is where "what is this token" lives.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut toks = Vec::new();
    let mut start = None;
    for (i, c) in src.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                toks.push(Token::new(s, i - s));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        toks.push(Token::new(s, src.len() - s));
    }
    toks
}
