//! Lossless tokenizer for zenoscript.
//!
//! Every byte of the input lands in exactly one token, so concatenating the
//! token texts reproduces the source. Strings, template literals, regex
//! literals and comments come out as single opaque tokens: rewrite stages
//! only ever look at the surrounding code tokens, which is what keeps a
//! `"http://…"` string or a `// let x = …` comment from being rewritten.
//!
//! Multi-character operators are merged here (`|>`, `=>`, `===`, …) so
//! stages can match on whole operators. `>>` is deliberately left as two
//! `>` tokens; generic argument lists close that way.

use thiserror::Error;
use zs_ast::{keywords, Position, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Number,
    /// `"…"` or `'…'`.
    Str,
    /// `` `…` ``, including any `${…}` interpolations.
    Template,
    Regex,
    LineComment,
    BlockComment,
    /// Horizontal whitespace only; line breaks are `Newline`.
    Whitespace,
    Newline,
    Punct,
    /// Anything unrecognized. Passed through untouched.
    Other,
}

/// A classified slice of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Span,
    pub text: &'a str,
}

impl Token<'_> {
    /// Whitespace or a comment; never a line break.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TokenKind::Newline
    }

    /// Neither trivia nor a line break.
    pub fn is_significant(&self) -> bool {
        !self.is_trivia() && !self.is_newline()
    }

    /// Tokens whose contents no stage may alter.
    pub fn is_opaque(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Str
                | TokenKind::Template
                | TokenKind::Regex
                | TokenKind::LineComment
                | TokenKind::BlockComment
        )
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }

    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }

    /// An identifier that is not a reserved word.
    pub fn is_plain_ident(&self) -> bool {
        self.kind == TokenKind::Ident && !keywords::is_reserved(self.text)
    }

    pub fn is_opener(&self) -> bool {
        self.kind == TokenKind::Punct && matches!(self.text, "(" | "[" | "{")
    }

    pub fn is_closer(&self) -> bool {
        self.kind == TokenKind::Punct && matches!(self.text, ")" | "]" | "}")
    }

    /// Whether an expression can end with this token. Drives the
    /// regex-vs-division decision and the atom / call-position rules.
    pub fn ends_operand(&self) -> bool {
        match self.kind {
            TokenKind::Ident => {
                !keywords::is_reserved(self.text) || keywords::is_value_word(self.text)
            }
            TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => true,
            TokenKind::Punct => matches!(self.text, ")" | "]" | "}"),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedTemplate,
    UnterminatedComment,
}

impl std::fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            LexErrorKind::UnterminatedTemplate => write!(f, "unterminated template literal"),
            LexErrorKind::UnterminatedComment => write!(f, "unterminated block comment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} starting at {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

/// Operators merged into one token, longest first.
const OPERATORS: &[&str] = &[
    "===", "!==", "**=", "...", "&&=", "||=", "??=", "|>", "=>", "==", "!=", "<=", ">=", "&&",
    "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "**",
];

const SINGLE_PUNCT: &[u8] = b"{}()[];,.:<>+-*/%=!&|^~?@#";

/// Split `source` into tokens. Fails only on an unterminated string,
/// template literal or block comment.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token<'a>>, LexError> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let kind = self.next_kind()?;
            debug_assert!(self.pos > start, "lexer made no progress at {start}");
            self.tokens.push(Token {
                kind,
                span: Span::new(start, self.pos),
                text: &self.source[start..self.pos],
            });
        }
        Ok(self.tokens)
    }

    fn peek(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn error(&self, kind: LexErrorKind, start: usize) -> LexError {
        LexError {
            kind,
            position: Position::locate(self.source, start),
        }
    }

    fn next_kind(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        let b = self.bytes[self.pos];

        match b {
            b'\n' => {
                self.pos += 1;
                Ok(TokenKind::Newline)
            }
            b'\r' if self.peek(1) == Some(b'\n') => {
                self.pos += 2;
                Ok(TokenKind::Newline)
            }
            b' ' | b'\t' | b'\r' | 0x0b | 0x0c => {
                self.pos += 1;
                while let Some(c) = self.peek(0) {
                    let horizontal = matches!(c, b' ' | b'\t' | 0x0b | 0x0c)
                        || (c == b'\r' && self.peek(1) != Some(b'\n'));
                    if !horizontal {
                        break;
                    }
                    self.pos += 1;
                }
                Ok(TokenKind::Whitespace)
            }
            b'/' if self.peek(1) == Some(b'/') => {
                self.skip_line_comment();
                Ok(TokenKind::LineComment)
            }
            b'/' if self.peek(1) == Some(b'*') => {
                self.skip_block_comment(start)?;
                Ok(TokenKind::BlockComment)
            }
            b'"' | b'\'' => {
                self.skip_string(b, start)?;
                Ok(TokenKind::Str)
            }
            b'`' => {
                self.skip_template(start)?;
                Ok(TokenKind::Template)
            }
            b'/' if self.regex_allowed() && self.try_regex() => Ok(TokenKind::Regex),
            b'0'..=b'9' => {
                self.skip_number();
                Ok(TokenKind::Number)
            }
            b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.skip_number();
                Ok(TokenKind::Number)
            }
            _ if is_ident_start(b) => {
                while self.peek(0).is_some_and(is_ident_continue) {
                    self.pos += 1;
                }
                Ok(TokenKind::Ident)
            }
            _ => Ok(self.punct()),
        }
    }

    fn skip_line_comment(&mut self) {
        self.pos += 2;
        while self.peek(0).is_some_and(|c| c != b'\n') {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 2;
        loop {
            match (self.peek(0), self.peek(1)) {
                (Some(b'*'), Some(b'/')) => {
                    self.pos += 2;
                    return Ok(());
                }
                (Some(_), _) => self.pos += 1,
                (None, _) => return Err(self.error(LexErrorKind::UnterminatedComment, start)),
            }
        }
    }

    fn skip_string(&mut self, quote: u8, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some(b'\n') => {
                    return Err(self.error(LexErrorKind::UnterminatedString, start));
                }
                Some(b'\\') => self.pos = (self.pos + 2).min(self.bytes.len()),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn skip_template(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        loop {
            match self.peek(0) {
                None => return Err(self.error(LexErrorKind::UnterminatedTemplate, start)),
                Some(b'\\') => self.pos = (self.pos + 2).min(self.bytes.len()),
                Some(b'`') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'$') if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.skip_interpolation(start)?;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Skip the code inside `${…}`, stopping after the closing brace.
    fn skip_interpolation(&mut self, template_start: usize) -> Result<(), LexError> {
        let mut depth = 1usize;
        loop {
            let Some(c) = self.peek(0) else {
                return Err(self.error(LexErrorKind::UnterminatedTemplate, template_start));
            };
            match c {
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                b'"' | b'\'' => {
                    let start = self.pos;
                    self.skip_string(c, start)?;
                }
                b'`' => {
                    let start = self.pos;
                    self.skip_template(start)?;
                }
                b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => {
                    let start = self.pos;
                    self.skip_block_comment(start)?;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// A `/` starts a regex unless the previous significant token ends an
    /// operand (then it is division).
    fn regex_allowed(&self) -> bool {
        self.tokens
            .iter()
            .rev()
            .find(|t| t.is_significant())
            .map_or(true, |t| !t.ends_operand())
    }

    /// Consume a regex literal if one closes on this line.
    fn try_regex(&mut self) -> bool {
        let mut i = self.pos + 1;
        let mut in_class = false;
        loop {
            match self.bytes.get(i) {
                None | Some(b'\n') | Some(b'\r') => return false,
                Some(b'\\') => i += 2,
                Some(b'[') => {
                    in_class = true;
                    i += 1;
                }
                Some(b']') => {
                    in_class = false;
                    i += 1;
                }
                Some(b'/') if !in_class => {
                    i += 1;
                    break;
                }
                Some(_) => i += 1,
            }
        }
        while self.bytes.get(i).is_some_and(|&c| is_ident_continue(c)) {
            i += 1;
        }
        self.pos = i;
        true
    }

    fn skip_number(&mut self) {
        let start = self.pos;
        let hex = matches!(self.bytes.get(start..start + 2), Some(b"0x" | b"0X"));
        self.pos += 1;
        while let Some(c) = self.peek(0) {
            let exponent_sign = matches!(c, b'+' | b'-')
                && !hex
                && matches!(self.bytes[self.pos - 1], b'e' | b'E')
                && self.peek(1).is_some_and(|d| d.is_ascii_digit());
            let fraction = c == b'.' && self.peek(1).is_some_and(|d| d.is_ascii_digit());
            if c.is_ascii_alphanumeric() || c == b'_' || exponent_sign || fraction {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn punct(&mut self) -> TokenKind {
        let rest = &self.bytes[self.pos..];
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(op.as_bytes())) {
            self.pos += op.len();
            return TokenKind::Punct;
        }
        let b = rest[0];
        self.pos += 1;
        if SINGLE_PUNCT.contains(&b) {
            TokenKind::Punct
        } else {
            TokenKind::Other
        }
    }
}

/// Non-ASCII bytes are treated as identifier bytes so multi-byte characters
/// are never split across tokens.
fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c >= 0x80
}

fn is_ident_continue(c: u8) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
