//! Recursive-descent parser: token stream → [`Pattern`] AST (component B).
//!
//! This stage only enforces the *syntactic* grammar in spec §6. Structural
//! invariants that span more than one segment (catch-all position, optional
//! ordering, duplicate parameter names, end-of-options placement) are a
//! property of the whole segment sequence, not of any single production, so
//! they are checked by the route compiler (component C) and reported as
//! [`crate::route::CompileError`] instead of [`ParseError`] — see DESIGN.md
//! for why this split was chosen over enforcing everything here.

use super::ast::{OptionSyntax, ParameterSyntax, Pattern, ParseError, SegmentSyntax};
use super::token::{Token, TokenKind};

/// Parse a full pattern string into a [`Pattern`] AST.
pub fn parse(input: &str) -> Result<Pattern, ParseErrorKind> {
    let tokens = super::lexer::tokenize(input).map_err(ParseErrorKind::Lex)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_pattern().map_err(ParseErrorKind::Parse)
}

/// Either stage can fail when turning a pattern string into an AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    Lex(super::lexer::LexError),
    Parse(ParseError),
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::Lex(e) => write!(f, "{}", e),
            ParseErrorKind::Parse(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ParseErrorKind {}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn skip_ws(&mut self) {
        while self.peek().kind == TokenKind::Whitespace {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            Err(ParseError::new(
                tok.position,
                expected,
                format!("{:?} {:?}", tok.kind, tok.lexeme),
                "unexpected token",
            ))
        }
    }

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let mut segments = Vec::new();
        self.skip_ws();
        while self.peek().kind != TokenKind::Eof {
            segments.push(self.parse_segment()?);
            // Between segments we require at least one whitespace token,
            // unless we've reached the end of input.
            if self.peek().kind != TokenKind::Eof {
                if self.peek().kind != TokenKind::Whitespace {
                    let tok = self.peek().clone();
                    return Err(ParseError::new(
                        tok.position,
                        "whitespace between segments",
                        format!("{:?} {:?}", tok.kind, tok.lexeme),
                        "segments must be separated by whitespace",
                    ));
                }
                self.skip_ws();
            }
        }
        Ok(Pattern { segments })
    }

    fn parse_segment(&mut self) -> Result<SegmentSyntax, ParseError> {
        match self.peek().kind {
            TokenKind::Identifier => {
                let tok = self.advance();
                Ok(SegmentSyntax::Literal(tok.lexeme))
            }
            TokenKind::LBrace => self.parse_parameter().map(SegmentSyntax::Parameter),
            TokenKind::DoubleDash => self.parse_double_dash_segment(),
            TokenKind::SingleDash => self.parse_option(true),
            _ => {
                let tok = self.peek().clone();
                Err(ParseError::new(
                    tok.position,
                    "literal, parameter, option, or end-of-options",
                    format!("{:?} {:?}", tok.kind, tok.lexeme),
                    "unexpected start of segment",
                ))
            }
        }
    }

    // Disambiguates a bare `--` end-of-options marker from `--longname` options.
    fn parse_double_dash_segment(&mut self) -> Result<SegmentSyntax, ParseError> {
        if self.peek_at(1).kind == TokenKind::Identifier {
            self.parse_option(false)
        } else {
            self.advance();
            Ok(SegmentSyntax::EndOfOptions)
        }
    }

    fn parse_parameter(&mut self) -> Result<ParameterSyntax, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_ws();

        let catch_all = if self.peek().kind == TokenKind::Star {
            self.advance();
            true
        } else {
            false
        };
        self.skip_ws();

        let name_tok = self.expect(TokenKind::Identifier, "parameter name")?;
        let name = name_tok.lexeme;
        self.skip_ws();

        let type_tag = if self.peek().kind == TokenKind::Colon {
            self.advance();
            self.skip_ws();
            let t = self.expect(TokenKind::Identifier, "type tag")?;
            self.skip_ws();
            Some(t.lexeme)
        } else {
            None
        };

        let optional = if self.peek().kind == TokenKind::Question {
            self.advance();
            self.skip_ws();
            true
        } else {
            false
        };

        let description = if self.peek().kind == TokenKind::Pipe {
            self.advance();
            Some(self.parse_brace_description()?)
        } else {
            None
        };

        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(ParameterSyntax { name, optional, catch_all, type_tag, description })
    }

    // Description text inside `{ ... | description }`: every token up to the
    // closing brace, joined back together with single spaces at token
    // boundaries that were whitespace in the source.
    fn parse_brace_description(&mut self) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.peek().kind {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Whitespace => {
                    self.advance();
                    if !out.is_empty() {
                        out.push(' ');
                    }
                }
                _ => {
                    let tok = self.advance();
                    out.push_str(&tok.lexeme);
                }
            }
        }
        if self.peek().kind == TokenKind::Eof {
            let tok = self.peek().clone();
            return Err(ParseError::new(tok.position, "'}'", "end of input", "unterminated parameter"));
        }
        Ok(out.trim_end().to_string())
    }

    // Parses `--longname(,-shortchar)?(|description)?(ws+ param)?` or the
    // mirror image starting from `-shortchar`. `leading_short` tells us
    // which form we started from.
    fn parse_option(&mut self, leading_short: bool) -> Result<SegmentSyntax, ParseError> {
        let mut long_name = None;
        let mut short_name = None;

        if leading_short {
            self.expect(TokenKind::SingleDash, "'-'")?;
            let tok = self.expect(TokenKind::Identifier, "short option name")?;
            short_name = Some(single_char(&tok)?);
        } else {
            self.expect(TokenKind::DoubleDash, "'--'")?;
            let tok = self.expect(TokenKind::Identifier, "option name")?;
            long_name = Some(tok.lexeme);
        }

        if self.peek().kind == TokenKind::Comma {
            self.advance();
            if leading_short {
                self.expect(TokenKind::DoubleDash, "'--' alternate long name")?;
                let tok = self.expect(TokenKind::Identifier, "option name")?;
                long_name = Some(tok.lexeme);
            } else {
                self.expect(TokenKind::SingleDash, "'-' alternate short name")?;
                let tok = self.expect(TokenKind::Identifier, "short option name")?;
                short_name = Some(single_char(&tok)?);
            }
        }

        let description = if self.peek().kind == TokenKind::Pipe {
            self.advance();
            // Options have no closing delimiter, so a description is
            // restricted to a single word (see module docs / DESIGN.md).
            let tok = self.expect(TokenKind::Identifier, "option description")?;
            Some(tok.lexeme)
        } else {
            None
        };

        // Lookahead: whitespace followed by '{' means an attached parameter;
        // otherwise that whitespace is the separator before the next segment
        // and must not be consumed here.
        let attached_parameter = if self.peek().kind == TokenKind::Whitespace
            && self.peek_at(1).kind == TokenKind::LBrace
        {
            self.skip_ws();
            Some(self.parse_parameter()?)
        } else {
            None
        };

        Ok(SegmentSyntax::Option(OptionSyntax {
            long_name,
            short_name,
            description,
            attached_parameter,
        }))
    }
}

fn single_char(tok: &Token) -> Result<char, ParseError> {
    let mut chars = tok.lexeme.chars();
    let c = chars.next();
    if c.is_none() || chars.next().is_some() || c == Some('-') {
        return Err(ParseError::new(
            tok.position,
            "a single character distinct from '-'",
            tok.lexeme.clone(),
            "short option names must be exactly one character",
        ));
    }
    Ok(c.unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern() {
        let pat = parse("status").unwrap();
        assert_eq!(pat.segments, vec![SegmentSyntax::Literal("status".into())]);
    }

    #[test]
    fn literal_then_parameter() {
        let pat = parse("deploy {env}").unwrap();
        assert_eq!(
            pat.segments,
            vec![
                SegmentSyntax::Literal("deploy".into()),
                SegmentSyntax::Parameter(ParameterSyntax {
                    name: "env".into(),
                    optional: false,
                    catch_all: false,
                    type_tag: None,
                    description: None,
                }),
            ]
        );
    }

    #[test]
    fn typed_parameter() {
        let pat = parse("{n:int}").unwrap();
        assert_eq!(
            pat.segments,
            vec![SegmentSyntax::Parameter(ParameterSyntax {
                name: "n".into(),
                optional: false,
                catch_all: false,
                type_tag: Some("int".into()),
                description: None,
            })]
        );
    }

    #[test]
    fn optional_parameter_with_description() {
        let pat = parse("{name?|the target name}").unwrap();
        assert_eq!(
            pat.segments,
            vec![SegmentSyntax::Parameter(ParameterSyntax {
                name: "name".into(),
                optional: true,
                catch_all: false,
                type_tag: None,
                description: Some("the target name".into()),
            })]
        );
    }

    #[test]
    fn catch_all_parameter() {
        let pat = parse("{*files}").unwrap();
        assert_eq!(
            pat.segments,
            vec![SegmentSyntax::Parameter(ParameterSyntax {
                name: "files".into(),
                optional: false,
                catch_all: true,
                type_tag: None,
                description: None,
            })]
        );
    }

    #[test]
    fn long_option_with_short_alias_and_attached_param() {
        let pat = parse("--replicas,-r {n:int}").unwrap();
        assert_eq!(
            pat.segments,
            vec![SegmentSyntax::Option(OptionSyntax {
                long_name: Some("replicas".into()),
                short_name: Some('r'),
                description: None,
                attached_parameter: Some(ParameterSyntax {
                    name: "n".into(),
                    optional: false,
                    catch_all: false,
                    type_tag: Some("int".into()),
                    description: None,
                }),
            })]
        );
    }

    #[test]
    fn short_option_with_long_alias_no_attached_param() {
        let pat = parse("-v,--verbose").unwrap();
        assert_eq!(
            pat.segments,
            vec![SegmentSyntax::Option(OptionSyntax {
                long_name: Some("verbose".into()),
                short_name: Some('v'),
                description: None,
                attached_parameter: None,
            })]
        );
    }

    #[test]
    fn bare_end_of_options() {
        let pat = parse("git checkout -- {file}").unwrap();
        assert_eq!(
            pat.segments,
            vec![
                SegmentSyntax::Literal("git".into()),
                SegmentSyntax::Literal("checkout".into()),
                SegmentSyntax::EndOfOptions,
                SegmentSyntax::Parameter(ParameterSyntax {
                    name: "file".into(),
                    optional: false,
                    catch_all: false,
                    type_tag: None,
                    description: None,
                }),
            ]
        );
    }

    #[test]
    fn option_followed_by_next_segment_is_not_mistaken_for_attached_param() {
        let pat = parse("serve --verbose,-v status").unwrap();
        assert_eq!(pat.segments.len(), 3);
        match &pat.segments[1] {
            SegmentSyntax::Option(opt) => assert!(opt.attached_parameter.is_none()),
            other => panic!("expected option, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_parameter_errors() {
        let err = parse("{env").unwrap_err();
        matches!(err, ParseErrorKind::Parse(_));
    }

    #[test]
    fn short_option_name_must_be_one_char() {
        let err = parse("-ab").unwrap_err();
        matches!(err, ParseErrorKind::Parse(_));
    }

    #[test]
    fn missing_whitespace_between_segments_errors() {
        let err = parse("deploy{env}").unwrap_err();
        matches!(err, ParseErrorKind::Parse(_));
    }

    // Property: parse → canonical re-emit → parse again yields the same
    // AST, for patterns built from a restricted but representative grammar
    // (ascii-lowercase identifiers; literals, parameters, and options, not
    // the bare end-of-options marker, whose disambiguation depends on
    // surrounding tokens rather than its own text).
    mod round_trip {
        use super::*;
        use quickcheck::{Arbitrary, Gen};

        fn arb_ident(g: &mut Gen) -> String {
            let len = (u8::arbitrary(g) % 5) + 1;
            (0..len).map(|_| (u8::arbitrary(g) % 26 + b'a') as char).collect()
        }

        fn arb_parameter(g: &mut Gen) -> ParameterSyntax {
            ParameterSyntax {
                name: arb_ident(g),
                optional: bool::arbitrary(g),
                catch_all: bool::arbitrary(g),
                type_tag: bool::arbitrary(g).then(|| arb_ident(g)),
                description: None,
            }
        }

        fn arb_option(g: &mut Gen) -> OptionSyntax {
            let has_long = bool::arbitrary(g);
            let has_short = !has_long || bool::arbitrary(g);
            OptionSyntax {
                long_name: has_long.then(|| arb_ident(g)),
                short_name: has_short.then(|| (u8::arbitrary(g) % 26 + b'a') as char),
                description: None,
                attached_parameter: bool::arbitrary(g).then(|| arb_parameter(g)),
            }
        }

        fn arb_segment(g: &mut Gen) -> SegmentSyntax {
            match u8::arbitrary(g) % 3 {
                0 => SegmentSyntax::Literal(arb_ident(g)),
                1 => SegmentSyntax::Parameter(arb_parameter(g)),
                _ => SegmentSyntax::Option(arb_option(g)),
            }
        }

        #[derive(Debug, Clone)]
        struct ArbPattern(Pattern);

        impl Arbitrary for ArbPattern {
            fn arbitrary(g: &mut Gen) -> Self {
                let len = (u8::arbitrary(g) % 4) + 1;
                let segments = (0..len).map(|_| arb_segment(g)).collect();
                ArbPattern(Pattern { segments })
            }
        }

        quickcheck::quickcheck! {
            fn parse_round_trip(input: ArbPattern) -> bool {
                let emitted = input.0.to_string();
                match parse(&emitted) {
                    Ok(reparsed) => reparsed == input.0,
                    Err(_) => false,
                }
            }
        }
    }
}
