use std::ops::Range;

use crate::ast::AstNode;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};

/// How a scope scan stopped
#[derive(Debug, Clone, PartialEq)]
enum ScopeEnd {
    /// Ran out of input
    Eof,
    /// A closing delimiter (`)`, `]`, `}`, or `$` in maths mode)
    Closer { pos: usize, text: &'static str },
    /// An `\end` command
    End { pos: usize },
}

/// Recursive-descent parser for Manuscript markup
///
/// Scans the token stream left to right, recursing for nested scopes. Any
/// closing delimiter terminates the innermost scope regardless of which
/// opener started it; only a closer with no scope open at all is rejected.
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    last_end: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            tokens,
            pos: 0,
            last_end: 0,
        })
    }

    /// Parse a complete document
    pub fn parse_document(&mut self) -> ParseResult<Vec<AstNode>> {
        let (nodes, end) = self.parse_nodes(false)?;
        match end {
            ScopeEnd::Eof => Ok(nodes),
            ScopeEnd::Closer { pos, text } => Err(ParseError::unmatched_delimiter(pos, text)),
            ScopeEnd::End { pos } => Err(ParseError::unmatched_delimiter(pos, "\\end")),
        }
    }

    /// Parse nodes until the current scope ends
    ///
    /// Returns the accumulated nodes together with the reason the scan
    /// stopped; the cursor is left just past the terminator.
    fn parse_nodes(&mut self, in_maths: bool) -> ParseResult<(Vec<AstNode>, ScopeEnd)> {
        let mut nodes = Vec::new();
        let mut buf = String::new();

        loop {
            let (token, span) = match self.tokens.get(self.pos) {
                Some((token, span)) => (token.clone(), span.clone()),
                None => {
                    flush_text(&mut buf, &mut nodes);
                    return Ok((nodes, ScopeEnd::Eof));
                }
            };

            match token {
                Token::Text(text) => {
                    buf.push_str(text);
                    self.advance();
                }
                Token::Ampersand => {
                    buf.push('&');
                    self.advance();
                }
                // A bare brace group never opens a scope on its own; braces
                // are only significant directly after a command or caret
                Token::LBrace => {
                    buf.push('{');
                    self.advance();
                }
                Token::BlankLine => {
                    self.advance();
                    flush_text(&mut buf, &mut nodes);
                    nodes.push(AstNode::Break);
                }
                Token::RBrace | Token::RParen | Token::RBracket => {
                    self.advance();
                    flush_text(&mut buf, &mut nodes);
                    let text = match token {
                        Token::RBrace => "}",
                        Token::RParen => ")",
                        _ => "]",
                    };
                    return Ok((
                        nodes,
                        ScopeEnd::Closer {
                            pos: span.start,
                            text,
                        },
                    ));
                }
                Token::Dollar => {
                    self.advance();
                    flush_text(&mut buf, &mut nodes);
                    if in_maths {
                        return Ok((
                            nodes,
                            ScopeEnd::Closer {
                                pos: span.start,
                                text: "$",
                            },
                        ));
                    }
                    let children = self.parse_scope(true)?;
                    nodes.push(AstNode::InlineMaths { children });
                }
                Token::LParen => {
                    self.advance();
                    flush_text(&mut buf, &mut nodes);
                    let children = self.parse_scope(in_maths)?;
                    nodes.push(AstNode::Brackets {
                        children,
                        square: false,
                    });
                }
                Token::LBracket => {
                    self.advance();
                    flush_text(&mut buf, &mut nodes);
                    let children = self.parse_scope(in_maths)?;
                    nodes.push(AstNode::Brackets {
                        children,
                        square: true,
                    });
                }
                Token::Caret => {
                    self.advance();
                    if self.adjacent_lbrace() {
                        self.advance();
                        flush_text(&mut buf, &mut nodes);
                        let data = self.parse_scope(in_maths)?;
                        nodes.push(AstNode::Tag {
                            name: "^".to_string(),
                            data: Some(data),
                            options: None,
                        });
                    } else {
                        buf.push('^');
                    }
                }
                Token::AlignEq => {
                    self.advance();
                    flush_text(&mut buf, &mut nodes);
                    nodes.push(AstNode::Tag {
                        name: "&=".to_string(),
                        data: None,
                        options: None,
                    });
                }
                Token::Command(name) => {
                    let name = name.to_string();
                    self.advance();
                    flush_text(&mut buf, &mut nodes);

                    let options = if self.adjacent_lbracket() {
                        Some(self.parse_options()?)
                    } else {
                        None
                    };

                    match name.as_str() {
                        "begin" => {
                            if !self.adjacent_lbrace() {
                                return Err(ParseError::invalid_syntax(
                                    self.last_end,
                                    "\\begin requires a {name} argument",
                                ));
                            }
                            self.advance();
                            let data = self.parse_scope(in_maths)?;

                            let (children, end) = self.parse_nodes(in_maths)?;
                            if end == ScopeEnd::Eof {
                                return Err(ParseError::unexpected_eof(self.last_end));
                            }
                            nodes.push(AstNode::Environment {
                                data: Some(data),
                                options,
                                children,
                            });
                        }
                        "end" => {
                            // The name argument is consumed and discarded;
                            // no check against the enclosing \begin
                            if self.adjacent_lbrace() {
                                self.advance();
                                self.parse_scope(in_maths)?;
                            }
                            return Ok((nodes, ScopeEnd::End { pos: span.start }));
                        }
                        _ => {
                            let data = if self.adjacent_lbrace() {
                                self.advance();
                                Some(self.parse_scope(in_maths)?)
                            } else {
                                None
                            };
                            nodes.push(AstNode::Tag {
                                name,
                                data,
                                options,
                            });
                        }
                    }
                }
                Token::Trivia => {
                    // tokenize() never emits trivia
                    self.advance();
                }
            }
        }
    }

    /// Parse a nested scope; running out of input before the scope closes is
    /// an error
    fn parse_scope(&mut self, in_maths: bool) -> ParseResult<Vec<AstNode>> {
        let (nodes, end) = self.parse_nodes(in_maths)?;
        if end == ScopeEnd::Eof {
            return Err(ParseError::unexpected_eof(self.last_end));
        }
        Ok(nodes)
    }

    /// Parse a `[key=value,...]` option list; the cursor is on the `[`
    fn parse_options(&mut self) -> ParseResult<Vec<(String, String)>> {
        let open_pos = self
            .tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.last_end);
        self.advance();

        match self.tokens.get(self.pos) {
            Some((Token::RBracket, _)) => {
                self.advance();
                Ok(Vec::new())
            }
            Some((Token::Text(text), span)) => {
                let text = text.to_string();
                let pos = span.start;
                self.advance();
                match self.tokens.get(self.pos) {
                    Some((Token::RBracket, _)) => self.advance(),
                    _ => {
                        return Err(ParseError::malformed_options(
                            pos,
                            "option list not closed by ]",
                        ))
                    }
                }
                parse_option_entries(&text, pos)
            }
            Some((other, span)) => Err(ParseError::malformed_options(
                span.start,
                format!("unexpected {} in option list", other),
            )),
            None => Err(ParseError::unexpected_eof(open_pos)),
        }
    }

    fn advance(&mut self) {
        if let Some((_, span)) = self.tokens.get(self.pos) {
            self.last_end = span.end;
            self.pos += 1;
        }
    }

    fn adjacent_lbrace(&self) -> bool {
        matches!(
            self.tokens.get(self.pos),
            Some((Token::LBrace, span)) if span.start == self.last_end
        )
    }

    fn adjacent_lbracket(&self) -> bool {
        matches!(
            self.tokens.get(self.pos),
            Some((Token::LBracket, span)) if span.start == self.last_end
        )
    }
}

fn flush_text(buf: &mut String, nodes: &mut Vec<AstNode>) {
    if !buf.is_empty() {
        nodes.push(AstNode::Text {
            text: std::mem::take(buf),
        });
    }
}

fn parse_option_entries(text: &str, pos: usize) -> ParseResult<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for piece in text.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            return Err(ParseError::malformed_options(pos, "empty option entry"));
        }
        match piece.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    return Err(ParseError::malformed_options(pos, "empty option key"));
                }
                entries.push((key.to_string(), value.trim().to_string()));
            }
            // A bare key is recorded with an empty value
            None => entries.push((piece.to_string(), String::new())),
        }
    }
    Ok(entries)
}
