//! Single-pass tokenizer: pattern string → token stream (component A).

use super::token::{Token, TokenKind};

/// A lexical error raised while tokenizing a route pattern string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub position: usize,
    pub message: String,
}

impl LexError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        Self { position, message: message.into() }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lex error at byte {}: {}", self.position, self.message)
    }
}

impl std::error::Error for LexError {}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

// Counts a run of identical characters `c` starting at index `i`.
fn count_run(chars: &[char], mut i: usize, c: char) -> usize {
    let mut n = 0;
    while i < chars.len() && chars[i] == c {
        n += 1;
        i += 1;
    }
    n
}

/// Tokenize a route pattern string.
///
/// Whitespace is emitted as its own token (not dropped) so the parser can
/// use it to separate adjacent segments; braces, colons, and friends are
/// single-character tokens; `-` runs of exactly two become [`TokenKind::DoubleDash`],
/// a lone `-` becomes [`TokenKind::SingleDash`], and any other run length of `-`
/// is a lex error.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0usize;
    let mut out = Vec::new();

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            let n = count_run_ws(&chars, i);
            out.push(Token::new(TokenKind::Whitespace, &input_slice(&chars, i, i + n), start));
            i += n;
            continue;
        }

        match c {
            '{' => { out.push(Token::new(TokenKind::LBrace, "{", start)); i += 1; }
            '}' => { out.push(Token::new(TokenKind::RBrace, "}", start)); i += 1; }
            ':' => { out.push(Token::new(TokenKind::Colon, ":", start)); i += 1; }
            '?' => { out.push(Token::new(TokenKind::Question, "?", start)); i += 1; }
            '*' => { out.push(Token::new(TokenKind::Star, "*", start)); i += 1; }
            '|' => { out.push(Token::new(TokenKind::Pipe, "|", start)); i += 1; }
            ',' => { out.push(Token::new(TokenKind::Comma, ",", start)); i += 1; }
            '-' => {
                let n = count_run(&chars, i, '-');
                match n {
                    1 => out.push(Token::new(TokenKind::SingleDash, "-", start)),
                    2 => out.push(Token::new(TokenKind::DoubleDash, "--", start)),
                    _ => {
                        return Err(LexError::new(
                            start,
                            format!("unexpected run of {} consecutive '-' characters", n),
                        ));
                    }
                }
                i += n;
            }
            _ if is_ident_start(c) => {
                let mut j = i + 1;
                while j < chars.len() && is_ident_continue(chars[j]) {
                    j += 1;
                }
                out.push(Token::new(TokenKind::Identifier, input_slice(&chars, i, j), start));
                i = j;
            }
            _ => {
                return Err(LexError::new(start, format!("illegal character '{}'", c)));
            }
        }
    }

    out.push(Token::new(TokenKind::Eof, "", chars.len()));
    Ok(out)
}

fn count_run_ws(chars: &[char], mut i: usize) -> usize {
    let mut n = 0;
    while i < chars.len() && chars[i].is_whitespace() {
        n += 1;
        i += 1;
    }
    n
}

fn input_slice(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}
