use logos::Logos;
use std::fmt;
use std::ops::Range;

use crate::error::{ParseError, ParseResult};

/// Token types for Manuscript markup
///
/// Tab, newline and carriage-return characters are lexed as `Trivia` and
/// dropped before parsing, except for a blank line (`\n\n`), which survives
/// as `BlankLine` and becomes a paragraph break. Spaces are ordinary text.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // A command: backslash followed by a maximal run of letters
    #[regex(r"\\[a-zA-Z]+", |lex| &lex.slice()[1..])]
    Command(&'src str),

    // Symbols
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("$")]
    Dollar,

    #[token("^")]
    Caret,

    // Alignment equals, a single two-character token
    #[token("&=")]
    AlignEq,

    // Paragraph separator
    #[token("\n\n")]
    BlankLine,

    // Skipped whitespace; matched explicitly so BlankLine wins the overlap
    #[regex(r"[\t\r\n]")]
    Trivia,

    // A lone ampersand is plain text
    #[token("&")]
    Ampersand,

    // Plain text run; spaces included
    #[regex(r"[^\\{}()\[\]$^&\t\r\n]+", |lex| lex.slice())]
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Command(name) => write!(f, "\\{}", name),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Dollar => write!(f, "$"),
            Token::Caret => write!(f, "^"),
            Token::AlignEq => write!(f, "&="),
            Token::BlankLine => write!(f, "blank line"),
            Token::Trivia => write!(f, "whitespace"),
            Token::Ampersand => write!(f, "&"),
            Token::Text(s) => write!(f, "text {:?}", s),
        }
    }
}

/// Tokenize a source string, dropping trivia
pub fn tokenize(source: &str) -> ParseResult<Vec<(Token<'_>, Range<usize>)>> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(Token::Trivia) => {}
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(ParseError::lexer_error(span.start)),
        }
    }
    Ok(tokens)
}
