//! Shell-style line tokenizer (component H) and completion engine
//! (component G): partial input → ordered candidate set.

use crate::convert::TypeConverterRegistry;
use crate::endpoint::EndpointCollection;
use crate::route::{CompiledRoute, RouteMatcher};

/// A line of user input split into what's already committed and what's
/// still being typed.
///
/// Invariant: `partial_word.is_none()` if and only if `trailing_space` is
/// `true` — a line ending in whitespace has nothing left to filter by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedInput {
    pub completed_words: Vec<String>,
    pub partial_word: Option<String>,
    pub trailing_space: bool,
}

impl ParsedInput {
    pub fn new(completed_words: Vec<String>, partial_word: Option<String>, trailing_space: bool) -> Self {
        debug_assert_eq!(partial_word.is_none(), trailing_space, "partial_word and trailing_space must disagree");
        Self { completed_words, partial_word, trailing_space }
    }
}

/// Tokenize a raw shell-style command line into a [`ParsedInput`].
///
/// Supports single- and double-quoted words and backslash escapes, same as
/// a minimal POSIX shell would for the purpose of argument splitting — this
/// is not a full shell grammar (no globbing, no variable expansion).
pub fn tokenize_line(line: &str) -> ParsedInput {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();
    let mut trailing_space = line.ends_with(|c: char| c.is_whitespace()) || line.is_empty();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => {
                quote = None;
            }
            Some('\'') => current.push(c),
            Some('"') => {
                if c == '\\' {
                    if let Some(&next) = chars.peek() {
                        if next == '"' || next == '\\' {
                            current.push(next);
                            chars.next();
                            continue;
                        }
                    }
                    current.push(c);
                } else {
                    current.push(c);
                }
            }
            _ => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    in_word = true;
                } else if c == '\\' {
                    if let Some(next) = chars.next() {
                        current.push(next);
                        in_word = true;
                    }
                } else if c.is_whitespace() {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                } else {
                    current.push(c);
                    in_word = true;
                }
            }
        }
    }

    if in_word || quote.is_some() {
        trailing_space = false;
    }

    if trailing_space {
        if in_word {
            words.push(current);
        }
        ParsedInput::new(words, None, true)
    } else {
        ParsedInput::new(words, Some(current), false)
    }
}

/// One suggested next token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub text: String,
    pub kind: CandidateKind,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Literal,
    ParameterValue,
    LongOption,
    ShortOption,
}

struct Survivor<'a> {
    route: &'a CompiledRoute,
    description: Option<&'a str>,
    positional_consumed: usize,
    consumed_option_names: Vec<String>,
}

/// Produce the ordered, de-duplicated candidate set for `input` given the
/// sorted endpoint collection.
pub fn complete(
    input: &ParsedInput,
    collection: &EndpointCollection,
    registry: &TypeConverterRegistry,
) -> Vec<Candidate> {
    let survivors: Vec<Survivor> = collection
        .iter()
        .filter_map(|e| simulate(&e.compiled, &input.completed_words).map(|(pos, opts)| Survivor {
            route: &e.compiled,
            description: e.description.as_deref(),
            positional_consumed: pos,
            consumed_option_names: opts,
        }))
        .collect();

    let mut out: Vec<Candidate> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for survivor in &survivors {
        if let Some(matcher) = survivor.route.positional.get(survivor.positional_consumed) {
            match matcher {
                RouteMatcher::Literal { value } => push_unique(&mut out, &mut seen, Candidate {
                    text: value.clone(),
                    kind: CandidateKind::Literal,
                    description: survivor.description.map(str::to_string),
                }),
                RouteMatcher::Parameter { catch_all: true, .. } => {}
                RouteMatcher::Parameter { type_tag: Some(tag), .. } => {
                    for value in registry.domain(tag).unwrap_or_default() {
                        push_unique(&mut out, &mut seen, Candidate {
                            text: value.to_string(),
                            kind: CandidateKind::ParameterValue,
                            description: None,
                        });
                    }
                }
                RouteMatcher::Parameter { .. } => {}
                RouteMatcher::Option { .. } | RouteMatcher::EndOfOptions => {}
            }
        }

        for option in &survivor.route.options {
            let RouteMatcher::Option { long_name, short_name, is_repeated, .. } = option else { continue };
            let key = long_name.clone().or_else(|| short_name.map(|c| c.to_string())).unwrap_or_default();
            if survivor.consumed_option_names.contains(&key) && !*is_repeated {
                continue;
            }
            if let Some(long) = long_name {
                push_unique(&mut out, &mut seen, Candidate {
                    text: format!("--{}", long),
                    kind: CandidateKind::LongOption,
                    description: survivor.description.map(str::to_string),
                });
            }
            if let Some(short) = short_name {
                push_unique(&mut out, &mut seen, Candidate {
                    text: format!("-{}", short),
                    kind: CandidateKind::ShortOption,
                    description: survivor.description.map(str::to_string),
                });
            }
        }
    }

    let filter = if input.trailing_space { "" } else { input.partial_word.as_deref().unwrap_or("") };
    out.retain(|c| match c.kind {
        CandidateKind::ShortOption if !filter.is_empty() => filter.starts_with('-') && c.text.starts_with(filter),
        CandidateKind::ShortOption => true,
        _ => c.text.starts_with(filter),
    });
    out
}

fn push_unique(out: &mut Vec<Candidate>, seen: &mut std::collections::HashSet<String>, candidate: Candidate) {
    if seen.insert(candidate.text.clone()) {
        out.push(candidate);
    }
}

/// A relaxed version of the matcher's bind: consume as many `words` as
/// possible against `route` without requiring the whole pattern to be
/// satisfied. Returns `None` if `words` already contradicts the route
/// (literal mismatch, unknown option, bad conversion, or more positional
/// tokens than the route can ever hold), `Some((positional_consumed,
/// consumed_option_names))` otherwise.
fn simulate(route: &CompiledRoute, words: &[String]) -> Option<(usize, Vec<String>)> {
    let mut positional_tokens = Vec::new();
    let mut consumed_option_names = Vec::new();
    let mut past_end_of_options = false;

    let mut i = 0;
    while i < words.len() {
        let word = &words[i];
        if !past_end_of_options && word == "--" {
            past_end_of_options = true;
            i += 1;
            continue;
        }
        if !past_end_of_options && word.starts_with('-') && word != "-" {
            let (name_part, inline_value) = word.split_once('=').map(|(n, v)| (n, Some(v))).unwrap_or((word.as_str(), None));
            let found = route.options.iter().find_map(|m| match m {
                RouteMatcher::Option { long_name, short_name, attached_parameter, .. } => {
                    let matches_long = name_part.strip_prefix("--").map(|n| Some(n) == long_name.as_deref()).unwrap_or(false);
                    let matches_short = name_part.strip_prefix('-').filter(|n| !n.starts_with('-')).map(|n| n.len() == 1 && Some(n.chars().next().unwrap()) == *short_name).unwrap_or(false);
                    (matches_long || matches_short).then(|| (long_name.clone().or_else(|| short_name.map(|c| c.to_string())).unwrap_or_default(), attached_parameter.is_some()))
                }
                _ => None,
            });
            let Some((key, has_attached)) = found else {
                if route.catch_all_parameter_name.is_some() {
                    positional_tokens.push(word.clone());
                    i += 1;
                    continue;
                }
                return None;
            };
            consumed_option_names.push(key);
            if has_attached && inline_value.is_none() {
                i += 1; // the value token, if present; if absent we've simply run out mid-typing
            }
            i += 1;
        } else {
            positional_tokens.push(word.clone());
            i += 1;
        }
    }

    let mut idx = 0;
    for matcher in &route.positional {
        if idx >= positional_tokens.len() {
            break;
        }
        match matcher {
            RouteMatcher::Literal { value } => {
                if &positional_tokens[idx] != value {
                    return None;
                }
                idx += 1;
            }
            RouteMatcher::Parameter { catch_all: true, .. } => {
                idx = positional_tokens.len();
            }
            RouteMatcher::Parameter { .. } => {
                idx += 1;
            }
            RouteMatcher::Option { .. } | RouteMatcher::EndOfOptions => unreachable!(),
        }
    }

    if idx < positional_tokens.len() && route.catch_all_parameter_name.is_none() {
        return None;
    }

    Some((idx, consumed_option_names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::MessageType;
    use crate::pattern::parse;
    use crate::route::compile;

    fn collection_of(patterns: &[&str]) -> EndpointCollection {
        let registry = TypeConverterRegistry::with_builtins();
        let mut collection = EndpointCollection::new();
        for (i, p) in patterns.iter().enumerate() {
            let ast = parse(p).unwrap();
            let compiled = compile(&ast, p, &registry, MessageType::Command, &Default::default()).unwrap();
            collection.push(compiled, i, 0, None);
        }
        collection.sort();
        collection
    }

    #[test]
    fn tokenizer_splits_on_whitespace() {
        let parsed = tokenize_line("deploy prod ");
        assert_eq!(parsed.completed_words, vec!["deploy", "prod"]);
        assert!(parsed.trailing_space);
        assert!(parsed.partial_word.is_none());
    }

    #[test]
    fn tokenizer_tracks_partial_word() {
        let parsed = tokenize_line("dep");
        assert_eq!(parsed.completed_words, Vec::<String>::new());
        assert_eq!(parsed.partial_word.as_deref(), Some("dep"));
        assert!(!parsed.trailing_space);
    }

    #[test]
    fn tokenizer_handles_quotes() {
        let parsed = tokenize_line("deploy \"us east\" ");
        assert_eq!(parsed.completed_words, vec!["deploy", "us east"]);
    }

    #[test]
    fn first_token_candidates_are_literals() {
        let collection = collection_of(&["deploy {env}", "destroy {env}", "status"]);
        let registry = TypeConverterRegistry::with_builtins();
        let input = ParsedInput::new(vec![], Some("d".into()), false);
        let candidates = complete(&input, &collection, &registry);
        let texts: Vec<_> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert!(texts.contains(&"deploy"));
        assert!(texts.contains(&"destroy"));
        assert!(!texts.contains(&"status"));
    }

    #[test]
    fn catch_all_route_survives_an_unrecognized_flag() {
        let collection = collection_of(&["exec {*cmd}"]);
        let words = vec!["exec".to_string(), "run".to_string(), "-b".to_string()];
        let route = &collection.iter().next().unwrap().compiled;
        assert!(simulate(route, &words).is_some());
    }

    #[test]
    fn after_literal_with_trailing_space_shows_next_slot() {
        let collection = collection_of(&["deploy {env} --verbose,-v"]);
        let registry = TypeConverterRegistry::with_builtins();
        let input = ParsedInput::new(vec!["deploy".into()], None, true);
        let candidates = complete(&input, &collection, &registry);
        let texts: Vec<_> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert!(texts.contains(&"--verbose"));
        assert!(texts.contains(&"-v"));
    }

    // Property: every candidate `complete` suggests is a token that, once
    // appended, still leaves at least one endpoint able to bind some
    // extension of the input.
    mod soundness {
        use super::*;

        quickcheck::quickcheck! {
            fn every_candidate_keeps_a_route_alive(words: Vec<String>) -> bool {
                let collection = collection_of(&[
                    "deploy {env} --replicas {n:int}",
                    "destroy {env}",
                    "status",
                    "exec {*cmd}",
                ]);
                let registry = TypeConverterRegistry::with_builtins();
                let input = ParsedInput::new(words.clone(), None, true);
                let candidates = complete(&input, &collection, &registry);
                candidates.iter().all(|c| {
                    let mut extended = words.clone();
                    extended.push(c.text.clone());
                    collection.iter().any(|e| simulate(&e.compiled, &extended).is_some())
                })
            }
        }
    }
}
