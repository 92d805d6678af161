//! The matcher (component F): argv → winning endpoint + bound parameters.

use crate::binding::{Binding, ParamValue};
use crate::convert::{ConvertError, TypeConverterRegistry};
use crate::endpoint::EndpointCollection;
use crate::route::{CompiledRoute, RouteMatcher};

/// Why one endpoint refused a particular argv.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    LiteralMismatch { expected: String, found: String, position: usize },
    UnknownOption { token: String },
    MissingRequiredParameter { name: String },
    MissingRequiredOption { name: String },
    UnexpectedOptionValue { option: String },
    MissingOptionValue { option: String },
    TooManyPositionalArguments { surplus: usize },
    ConvertFailed(ConvertError),
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::LiteralMismatch { expected, found, position } => {
                write!(f, "expected '{}' at position {}, found '{}'", expected, position, found)
            }
            RejectionReason::UnknownOption { token } => write!(f, "unknown option '{}'", token),
            RejectionReason::MissingRequiredParameter { name } => {
                write!(f, "missing required parameter '{}'", name)
            }
            RejectionReason::MissingRequiredOption { name } => {
                write!(f, "missing required option '--{}'", name)
            }
            RejectionReason::UnexpectedOptionValue { option } => {
                write!(f, "option '--{}' does not take a value", option)
            }
            RejectionReason::MissingOptionValue { option } => {
                write!(f, "option '--{}' requires a value", option)
            }
            RejectionReason::TooManyPositionalArguments { surplus } => {
                write!(f, "{} unexpected trailing argument(s)", surplus)
            }
            RejectionReason::ConvertFailed(e) => write!(f, "{}", e),
        }
    }
}

/// One endpoint's outcome when an attempt failed, kept for the "nearest
/// miss" diagnostic in §4.I.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub pattern_source: String,
    pub matched_prefix_len: usize,
    pub reason: RejectionReason,
}

/// No registered endpoint bound this argv.
#[derive(Debug, Clone, PartialEq)]
pub struct NoMatch {
    pub argv: Vec<String>,
    pub attempts: Vec<Attempt>,
}

impl std::fmt::Display for NoMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.nearest_miss() {
            Some(attempt) => write!(
                f,
                "no route matched {:?}; closest was '{}' ({})",
                self.argv, attempt.pattern_source, attempt.reason
            ),
            None => write!(f, "no route matched {:?}", self.argv),
        }
    }
}

impl std::error::Error for NoMatch {}

impl NoMatch {
    /// The attempt with the longest successful prefix bind, ties broken by
    /// collection order (the order attempts were recorded in, which is the
    /// sorted endpoint order).
    pub fn nearest_miss(&self) -> Option<&Attempt> {
        self.attempts.iter().max_by_key(|a| a.matched_prefix_len)
    }
}

/// Try every endpoint in `collection`'s sorted order and return the first
/// successful bind, or a [`NoMatch`] carrying every rejection reason.
pub fn match_args(
    collection: &EndpointCollection,
    argv: &[String],
    registry: &TypeConverterRegistry,
) -> Result<(usize, Binding), NoMatch> {
    let mut attempts = Vec::new();
    for endpoint in collection.iter() {
        match try_bind(&endpoint.compiled, argv, registry) {
            Ok(binding) => return Ok((endpoint.handler_id, binding)),
            Err((reason, matched_prefix_len)) => {
                crate::trace_rejection!(
                    "route '{}' rejected argv {:?}: {} (matched {} token(s))",
                    endpoint.compiled.pattern_source,
                    argv,
                    reason,
                    matched_prefix_len
                );
                attempts.push(Attempt {
                    pattern_source: endpoint.compiled.pattern_source.clone(),
                    matched_prefix_len,
                    reason,
                });
            }
        }
    }
    Err(NoMatch { argv: argv.to_vec(), attempts })
}

fn is_option_like(token: &str) -> bool {
    token.starts_with('-') && token != "-"
}

fn split_inline_value(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    }
}

struct OptionOccurrence {
    long_name: Option<String>,
    short_name: Option<char>,
    value: Option<String>,
}

/// Attempt to bind one route's matchers against argv. On failure, returns
/// the reason plus how many leading argv tokens were successfully accounted
/// for before the failure, for the nearest-miss diagnostic.
fn try_bind(
    route: &CompiledRoute,
    argv: &[String],
    registry: &TypeConverterRegistry,
) -> Result<Binding, (RejectionReason, usize)> {
    let mut positional_tokens: Vec<String> = Vec::new();
    let mut occurrences: Vec<OptionOccurrence> = Vec::new();
    let mut past_end_of_options = false;

    let mut i = 0;
    while i < argv.len() {
        let token = &argv[i];

        if !past_end_of_options && token == "--" {
            past_end_of_options = true;
            i += 1;
            continue;
        }

        if !past_end_of_options && is_option_like(token) {
            let (name_part, inline_value) = split_inline_value(token);
            let found = find_option(route, name_part);
            let Some((long_name, short_name, has_attached)) = found else {
                if route.catch_all_parameter_name.is_some() {
                    positional_tokens.push(token.clone());
                    i += 1;
                    continue;
                }
                return Err((RejectionReason::UnknownOption { token: token.clone() }, i));
            };

            let value = if has_attached {
                match inline_value {
                    Some(v) => Some(v.to_string()),
                    None => {
                        let next = argv.get(i + 1).cloned();
                        if next.is_none() {
                            let name = long_name.clone().unwrap_or_default();
                            return Err((RejectionReason::MissingOptionValue { option: name }, i));
                        }
                        i += 1;
                        next
                    }
                }
            } else {
                if inline_value.is_some() {
                    let name = long_name.clone().unwrap_or_default();
                    return Err((RejectionReason::UnexpectedOptionValue { option: name }, i));
                }
                None
            };

            occurrences.push(OptionOccurrence { long_name, short_name, value });
            i += 1;
        } else {
            positional_tokens.push(token.clone());
            i += 1;
        }
    }

    let mut binding = Binding::new();
    bind_positionals(route, &positional_tokens, registry, &mut binding)
        .map_err(|(reason, pos)| (reason, pos))?;
    bind_options(route, &occurrences, registry, &mut binding)
        .map_err(|reason| (reason, argv.len()))?;

    Ok(binding)
}

fn find_option(route: &CompiledRoute, name_part: &str) -> Option<(Option<String>, Option<char>, bool)> {
    for matcher in &route.options {
        if let RouteMatcher::Option { long_name, short_name, attached_parameter, .. } = matcher {
            let matches_long = name_part.strip_prefix("--").map(|n| Some(n) == long_name.as_deref()).unwrap_or(false);
            let matches_short = name_part
                .strip_prefix('-')
                .filter(|n| !n.starts_with('-'))
                .and_then(|n| n.chars().next().filter(|_| n.chars().count() == 1))
                .map(|c| Some(c) == *short_name)
                .unwrap_or(false);
            if matches_long || matches_short {
                return Some((long_name.clone(), *short_name, attached_parameter.is_some()));
            }
        }
    }
    None
}

fn bind_positionals(
    route: &CompiledRoute,
    tokens: &[String],
    registry: &TypeConverterRegistry,
    binding: &mut Binding,
) -> Result<(), (RejectionReason, usize)> {
    let mut idx = 0usize;

    for matcher in &route.positional {
        match matcher {
            RouteMatcher::Literal { value } => {
                match tokens.get(idx) {
                    Some(found) if found == value => {
                        idx += 1;
                    }
                    Some(found) => {
                        return Err((
                            RejectionReason::LiteralMismatch {
                                expected: value.clone(),
                                found: found.clone(),
                                position: idx,
                            },
                            idx,
                        ));
                    }
                    None => {
                        return Err((
                            RejectionReason::LiteralMismatch {
                                expected: value.clone(),
                                found: String::new(),
                                position: idx,
                            },
                            idx,
                        ));
                    }
                }
            }
            RouteMatcher::Parameter { name, type_tag, optional, catch_all: true } => {
                let _ = (type_tag, optional);
                let rest: Vec<String> = tokens[idx.min(tokens.len())..].to_vec();
                idx = tokens.len();
                binding.insert(name.clone(), ParamValue::List(rest));
            }
            RouteMatcher::Parameter { name, type_tag, optional: false, .. } => {
                let raw = tokens.get(idx).ok_or_else(|| {
                    (RejectionReason::MissingRequiredParameter { name: name.clone() }, idx)
                })?;
                bind_scalar(binding, registry, name, type_tag.as_deref(), raw).map_err(|e| (e, idx))?;
                idx += 1;
            }
            RouteMatcher::Parameter { name, type_tag, optional: true, .. } => {
                if let Some(raw) = tokens.get(idx) {
                    bind_scalar(binding, registry, name, type_tag.as_deref(), raw).map_err(|e| (e, idx))?;
                    idx += 1;
                }
            }
            RouteMatcher::Option { .. } | RouteMatcher::EndOfOptions => unreachable!(
                "positional view never contains option or end-of-options matchers"
            ),
        }
    }

    if idx < tokens.len() {
        return Err((
            RejectionReason::TooManyPositionalArguments { surplus: tokens.len() - idx },
            idx,
        ));
    }

    Ok(())
}

fn bind_scalar(
    binding: &mut Binding,
    registry: &TypeConverterRegistry,
    name: &str,
    type_tag: Option<&str>,
    raw: &str,
) -> Result<(), RejectionReason> {
    let tag = type_tag.unwrap_or("string");
    let value = registry.convert(tag, raw).map_err(RejectionReason::ConvertFailed)?;
    binding.insert(name.to_string(), value);
    Ok(())
}

fn bind_options(
    route: &CompiledRoute,
    occurrences: &[OptionOccurrence],
    registry: &TypeConverterRegistry,
    binding: &mut Binding,
) -> Result<(), RejectionReason> {
    for matcher in &route.options {
        let RouteMatcher::Option { long_name, short_name, attached_parameter, is_repeated } = matcher else {
            continue;
        };
        let matches: Vec<&OptionOccurrence> = occurrences
            .iter()
            .filter(|o| {
                (long_name.is_some() && o.long_name == *long_name)
                    || (short_name.is_some() && o.short_name == *short_name)
            })
            .collect();

        if matches.is_empty() {
            let name = long_name.clone().or_else(|| short_name.map(|c| c.to_string())).unwrap_or_default();
            return Err(RejectionReason::MissingRequiredOption { name });
        }

        if !*is_repeated && matches.len() > 1 {
            let name = long_name.clone().unwrap_or_default();
            return Err(RejectionReason::UnexpectedOptionValue { option: name });
        }

        let key = long_name.clone().or_else(|| short_name.map(|c| c.to_string())).unwrap_or_default();

        if let Some(attached) = attached_parameter {
            let (param_name, type_tag) = match attached.as_ref() {
                RouteMatcher::Parameter { name, type_tag, .. } => (name.clone(), type_tag.clone()),
                _ => unreachable!("an option's attached parameter is always a Parameter matcher"),
            };
            for occurrence in &matches {
                let raw = occurrence.value.as_deref().unwrap_or("");
                let tag = type_tag.as_deref().unwrap_or("string");
                let value = registry.convert(tag, raw).map_err(RejectionReason::ConvertFailed)?;
                if *is_repeated {
                    binding.push_repeated(param_name.clone(), value);
                } else {
                    binding.insert(param_name.clone(), value);
                }
            }
            binding.set_flag(key, true);
        } else {
            binding.set_flag(key, true);
        }
    }
    Ok(())
}
