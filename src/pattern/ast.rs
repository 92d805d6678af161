//! The route pattern AST (component B's output).

/// A parameter hole in a pattern: `{name}`, `{name:type}`, `{name?}`, `{*name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSyntax {
    pub name: String,
    pub optional: bool,
    pub catch_all: bool,
    pub type_tag: Option<String>,
    pub description: Option<String>,
}

/// A named, optionally-valued flag: `--long`, `-s`, or both, with an optional
/// attached parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSyntax {
    pub long_name: Option<String>,
    pub short_name: Option<char>,
    pub description: Option<String>,
    pub attached_parameter: Option<ParameterSyntax>,
}

impl std::fmt::Display for ParameterSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        if self.catch_all {
            write!(f, "*")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(tag) = &self.type_tag {
            write!(f, ":{}", tag)?;
        }
        if self.optional {
            write!(f, "?")?;
        }
        if let Some(desc) = &self.description {
            write!(f, "|{}", desc)?;
        }
        write!(f, "}}")
    }
}

impl std::fmt::Display for OptionSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.long_name, &self.short_name) {
            (Some(long), Some(short)) => write!(f, "--{},-{}", long, short)?,
            (Some(long), None) => write!(f, "--{}", long)?,
            (None, Some(short)) => write!(f, "-{}", short)?,
            (None, None) => unreachable!("an option always carries a long or short name"),
        }
        if let Some(desc) = &self.description {
            write!(f, "|{}", desc)?;
        }
        if let Some(param) = &self.attached_parameter {
            write!(f, " {}", param)?;
        }
        Ok(())
    }
}

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentSyntax {
    Literal(String),
    Parameter(ParameterSyntax),
    Option(OptionSyntax),
    /// The bare `--` segment: everything after it is positional.
    EndOfOptions,
}

impl std::fmt::Display for SegmentSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentSyntax::Literal(value) => write!(f, "{}", value),
            SegmentSyntax::Parameter(param) => write!(f, "{}", param),
            SegmentSyntax::Option(opt) => write!(f, "{}", opt),
            SegmentSyntax::EndOfOptions => write!(f, "--"),
        }
    }
}

/// The parsed form of a whole route pattern string: an ordered sequence of
/// segments in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    pub segments: Vec<SegmentSyntax>,
}

/// Canonical re-emission: segments joined by a single space, the minimal
/// separator the parser requires between them. Re-parsing this string
/// always reproduces an AST equal to the one it was emitted from, even if
/// the original source used different option ordering (`--long,-s` vs.
/// `-s,--long`) or extra whitespace.
impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A syntactic error raised while parsing the token stream into a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub position: usize,
    pub expected: String,
    pub actual: String,
    pub message: String,
}

impl ParseError {
    pub fn new(
        position: usize,
        expected: impl Into<String>,
        actual: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            position,
            expected: expected.into(),
            actual: actual.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parse error at byte {}: expected {}, found {} ({})",
            self.position, self.expected, self.actual, self.message
        )
    }
}

impl std::error::Error for ParseError {}
