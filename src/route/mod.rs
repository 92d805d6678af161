//! Route compiler (component C): AST → [`CompiledRoute`].
//!
//! The parser (component B) only rejects malformed single productions; the
//! invariants that span the whole segment sequence — catch-all placement,
//! the optional-parameter trailing run, unique parameter names, and
//! end-of-options placement — are this module's job, reported as
//! [`CompileError`] rather than [`crate::pattern::ParseError`].

use std::collections::HashSet;

use crate::convert::TypeConverterRegistry;
use crate::endpoint::MessageType;
use crate::pattern::{OptionSyntax, ParameterSyntax, Pattern, SegmentSyntax};

const LITERAL_WEIGHT: u32 = 100;
const TYPED_REQUIRED_PARAM_WEIGHT: u32 = 30;
const REQUIRED_PARAM_WEIGHT: u32 = 20;
const OPTION_WITH_ARG_WEIGHT: u32 = 15;
const OPTIONAL_PARAM_WEIGHT: u32 = 10;
const BARE_OPTION_WEIGHT: u32 = 10;
const CATCH_ALL_WEIGHT: u32 = 1;

/// A structural AST invariant was violated. Fatal at registration — these
/// never surface at match time since a [`CompiledRoute`] can't be built
/// without clearing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    DuplicateParameterName { name: String },
    CatchAllNotLast { name: String },
    RequiredParameterAfterOptional { name: String },
    LiteralAfterOptional { value: String },
    SegmentAfterCatchAll,
    MultipleEndOfOptions,
    OptionAfterEndOfOptions,
    UnknownTypeTag { parameter: String, type_tag: String },
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::DuplicateParameterName { name } => {
                write!(f, "parameter name '{}' is used more than once", name)
            }
            CompileError::CatchAllNotLast { name } => {
                write!(f, "catch-all parameter '{}' must be the last positional segment", name)
            }
            CompileError::RequiredParameterAfterOptional { name } => {
                write!(f, "required parameter '{}' follows an optional parameter", name)
            }
            CompileError::LiteralAfterOptional { value } => {
                write!(f, "literal '{}' follows an optional parameter; all positionals after an optional parameter must also be optional", value)
            }
            CompileError::SegmentAfterCatchAll => {
                write!(f, "no segment may follow a catch-all parameter")
            }
            CompileError::MultipleEndOfOptions => {
                write!(f, "a pattern may contain at most one '--' end-of-options marker")
            }
            CompileError::OptionAfterEndOfOptions => {
                write!(f, "an option segment may not follow '--'")
            }
            CompileError::UnknownTypeTag { parameter, type_tag } => {
                write!(f, "parameter '{}' declares unknown type tag '{}'", parameter, type_tag)
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// One compiled segment, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMatcher {
    Literal {
        value: String,
    },
    Parameter {
        name: String,
        type_tag: Option<String>,
        optional: bool,
        catch_all: bool,
    },
    Option {
        long_name: Option<String>,
        short_name: Option<char>,
        attached_parameter: Option<Box<RouteMatcher>>,
        is_repeated: bool,
    },
    EndOfOptions,
}

impl RouteMatcher {
    fn specificity(&self) -> u32 {
        match self {
            RouteMatcher::Literal { .. } => LITERAL_WEIGHT,
            RouteMatcher::Parameter { catch_all: true, .. } => CATCH_ALL_WEIGHT,
            RouteMatcher::Parameter { optional: true, .. } => OPTIONAL_PARAM_WEIGHT,
            RouteMatcher::Parameter { type_tag: Some(_), .. } => TYPED_REQUIRED_PARAM_WEIGHT,
            RouteMatcher::Parameter { .. } => REQUIRED_PARAM_WEIGHT,
            RouteMatcher::Option { attached_parameter: Some(_), .. } => OPTION_WITH_ARG_WEIGHT,
            RouteMatcher::Option { .. } => BARE_OPTION_WEIGHT,
            RouteMatcher::EndOfOptions => 0,
        }
    }
}

/// A pattern that has been parsed, validated, and scored. This is what the
/// matcher (component F) and completion engine (component G) actually
/// operate on; the source pattern string is kept only for diagnostics.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pub pattern_source: String,
    pub matchers: Vec<RouteMatcher>,
    pub positional: Vec<RouteMatcher>,
    pub options: Vec<RouteMatcher>,
    pub catch_all_parameter_name: Option<String>,
    pub specificity: u32,
    pub message_type: MessageType,
}

impl CompiledRoute {
    /// Long or short option names this route declares as repeatable.
    pub fn repeated_option_names(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter_map(|m| match m {
                RouteMatcher::Option { long_name, is_repeated: true, .. } => {
                    long_name.as_deref()
                }
                _ => None,
            })
            .collect()
    }
}

/// Walk a pattern's AST, enforcing the cross-segment invariants the parser
/// does not, and produce a [`CompiledRoute`].
pub fn compile(
    pattern: &Pattern,
    pattern_source: &str,
    registry: &TypeConverterRegistry,
    message_type: MessageType,
    repeated_options: &HashSet<String>,
) -> Result<CompiledRoute, CompileError> {
    let mut names = HashSet::new();
    let mut matchers = Vec::with_capacity(pattern.segments.len());
    let mut positional = Vec::new();
    let mut options = Vec::new();
    let mut catch_all_parameter_name = None;
    let mut specificity: u32 = 0;

    let mut seen_catch_all = false;
    let mut seen_optional_positional = false;
    let mut seen_end_of_options = false;

    for segment in &pattern.segments {
        match segment {
            SegmentSyntax::Literal(value) => {
                if seen_catch_all {
                    return Err(CompileError::SegmentAfterCatchAll);
                }
                if seen_optional_positional {
                    return Err(CompileError::LiteralAfterOptional { value: value.clone() });
                }
                let matcher = RouteMatcher::Literal { value: value.clone() };
                specificity += matcher.specificity();
                positional.push(matcher.clone());
                matchers.push(matcher);
            }
            SegmentSyntax::Parameter(param) => {
                if seen_catch_all {
                    return Err(CompileError::SegmentAfterCatchAll);
                }
                register_name(&mut names, &param.name)?;
                check_type_tag(registry, &param.name, param.type_tag.as_deref())?;

                if param.catch_all {
                    seen_catch_all = true;
                    catch_all_parameter_name = Some(param.name.clone());
                } else if param.optional {
                    seen_optional_positional = true;
                } else if seen_optional_positional {
                    return Err(CompileError::RequiredParameterAfterOptional {
                        name: param.name.clone(),
                    });
                }

                let matcher = parameter_matcher(param);
                specificity += matcher.specificity();
                positional.push(matcher.clone());
                matchers.push(matcher);
            }
            SegmentSyntax::Option(opt) => {
                if seen_end_of_options {
                    return Err(CompileError::OptionAfterEndOfOptions);
                }
                if let Some(attached) = &opt.attached_parameter {
                    register_name(&mut names, &attached.name)?;
                    check_type_tag(registry, &attached.name, attached.type_tag.as_deref())?;
                }
                let matcher = option_matcher(opt, repeated_options);
                specificity += matcher.specificity();
                options.push(matcher.clone());
                matchers.push(matcher);
            }
            SegmentSyntax::EndOfOptions => {
                if seen_end_of_options {
                    return Err(CompileError::MultipleEndOfOptions);
                }
                seen_end_of_options = true;
                matchers.push(RouteMatcher::EndOfOptions);
            }
        }
    }

    if let Some(name) = &catch_all_parameter_name {
        let last_positional_is_catch_all = positional
            .last()
            .map(|m| matches!(m, RouteMatcher::Parameter { catch_all: true, .. }))
            .unwrap_or(false);
        if !last_positional_is_catch_all {
            return Err(CompileError::CatchAllNotLast { name: name.clone() });
        }
    }

    Ok(CompiledRoute {
        pattern_source: pattern_source.to_string(),
        matchers,
        positional,
        options,
        catch_all_parameter_name,
        specificity,
        message_type,
    })
}

fn register_name(names: &mut HashSet<String>, name: &str) -> Result<(), CompileError> {
    if !names.insert(name.to_string()) {
        return Err(CompileError::DuplicateParameterName { name: name.to_string() });
    }
    Ok(())
}

fn check_type_tag(
    registry: &TypeConverterRegistry,
    parameter: &str,
    type_tag: Option<&str>,
) -> Result<(), CompileError> {
    if let Some(tag) = type_tag {
        if !registry.has(tag) {
            return Err(CompileError::UnknownTypeTag {
                parameter: parameter.to_string(),
                type_tag: tag.to_string(),
            });
        }
    }
    Ok(())
}

fn parameter_matcher(param: &ParameterSyntax) -> RouteMatcher {
    RouteMatcher::Parameter {
        name: param.name.clone(),
        type_tag: param.type_tag.clone(),
        optional: param.optional,
        catch_all: param.catch_all,
    }
}

fn option_matcher(opt: &OptionSyntax, repeated_options: &HashSet<String>) -> RouteMatcher {
    let is_repeated = opt
        .long_name
        .as_deref()
        .map(|name| repeated_options.contains(name))
        .unwrap_or(false);
    RouteMatcher::Option {
        long_name: opt.long_name.clone(),
        short_name: opt.short_name,
        attached_parameter: opt.attached_parameter.as_ref().map(|p| Box::new(parameter_matcher(p))),
        is_repeated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse;

    fn compile_str(src: &str) -> Result<CompiledRoute, CompileError> {
        let pattern = parse(src).unwrap();
        let registry = TypeConverterRegistry::with_builtins();
        compile(&pattern, src, &registry, MessageType::Command, &HashSet::new())
    }

    #[test]
    fn literal_beats_parameter_in_specificity() {
        let literal = compile_str("build").unwrap();
        let parameter = compile_str("{cmd}").unwrap();
        assert!(literal.specificity > parameter.specificity);
    }

    #[test]
    fn typed_required_beats_untyped_required() {
        let typed = compile_str("{n:int}").unwrap();
        let untyped = compile_str("{n}").unwrap();
        assert!(typed.specificity > untyped.specificity);
    }

    #[test]
    fn optional_beats_catch_all() {
        let optional = compile_str("{n?}").unwrap();
        let catch_all = compile_str("{*n}").unwrap();
        assert!(optional.specificity > catch_all.specificity);
    }

    #[test]
    fn catch_all_must_be_last() {
        let pattern = parse("{*rest}").unwrap();
        let mut pattern = pattern;
        pattern.segments.push(SegmentSyntax::Literal("oops".into()));
        let registry = TypeConverterRegistry::with_builtins();
        let err = compile(&pattern, "bad", &registry, MessageType::Command, &HashSet::new()).unwrap_err();
        assert_eq!(err, CompileError::SegmentAfterCatchAll);
    }

    #[test]
    fn duplicate_parameter_names_rejected() {
        let pattern = parse("{env} {env}").unwrap();
        let registry = TypeConverterRegistry::with_builtins();
        let err = compile(&pattern, "dup", &registry, MessageType::Command, &HashSet::new()).unwrap_err();
        assert_eq!(err, CompileError::DuplicateParameterName { name: "env".into() });
    }

    #[test]
    fn required_after_optional_rejected() {
        let pattern = parse("{a?} {b}").unwrap();
        let registry = TypeConverterRegistry::with_builtins();
        let err = compile(&pattern, "bad", &registry, MessageType::Command, &HashSet::new()).unwrap_err();
        assert_eq!(err, CompileError::RequiredParameterAfterOptional { name: "b".into() });
    }

    #[test]
    fn literal_after_optional_rejected() {
        let err = compile_str("{env?} prod").unwrap_err();
        assert_eq!(err, CompileError::LiteralAfterOptional { value: "prod".into() });
    }

    #[test]
    fn unknown_type_tag_rejected() {
        let pattern = parse("{n:uuid}").unwrap();
        let registry = TypeConverterRegistry::with_builtins();
        let err = compile(&pattern, "bad", &registry, MessageType::Command, &HashSet::new()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownTypeTag { parameter: "n".into(), type_tag: "uuid".into() }
        );
    }

    #[test]
    fn option_after_end_of_options_rejected() {
        let pattern = parse("checkout -- {file} --oops").unwrap();
        let registry = TypeConverterRegistry::with_builtins();
        let err = compile(&pattern, "bad", &registry, MessageType::Command, &HashSet::new()).unwrap_err();
        assert_eq!(err, CompileError::OptionAfterEndOfOptions);
    }

    #[test]
    fn end_of_options_allows_trailing_positionals() {
        let compiled = compile_str("checkout -- {file}").unwrap();
        assert!(matches!(compiled.matchers[1], RouteMatcher::EndOfOptions));
    }
}
