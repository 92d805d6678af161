//! The top-level façade: registration via a consuming-self fluent builder,
//! and the sealed, read-only `CliRouter` it produces.

use std::sync::Arc;

use crate::completion::{complete, tokenize_line, Candidate};
use crate::convert::TypeConverterRegistry;
use crate::dispatch::{DispatchContext, Handler};
use crate::endpoint::{Endpoint, EndpointCollection, MessageType};
use crate::matcher::{match_args, NoMatch};
use crate::pattern::{parse, ParseErrorKind};
use crate::report::{build_report, NoMatchReport};
use crate::route::{compile, CompileError};

/// Either stage of turning a pattern string plus its cross-segment
/// invariants into a [`crate::route::CompiledRoute`] can fail at
/// registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    Parse(ParseErrorKind),
    Compile(CompileError),
}

impl std::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterError::Parse(e) => write!(f, "{}", e),
            RegisterError::Compile(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RegisterError {}

/// Per-route metadata beyond the pattern string and handler, all optional.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub order: i32,
    pub description: Option<String>,
    pub message_type: MessageType,
    /// Long option names (as written in the pattern, without the leading
    /// `--`) this route allows to occur more than once. The pattern DSL
    /// has no syntax for this (see DESIGN.md), so it is set here instead.
    pub repeated_options: Vec<String>,
}

/// Consuming-self fluent builder. No field setter or `route()` call does
/// any work beyond bookkeeping; parsing and compilation happen immediately
/// (so a bad pattern fails at the call site with a precise error) but the
/// endpoint list itself is only sorted once, in [`Self::build`].
pub struct CliRouterBuilder<S, Output> {
    registry: TypeConverterRegistry,
    endpoints: EndpointCollection,
    handlers: Vec<Arc<dyn Handler<S, Output>>>,
}

impl<S, Output> CliRouterBuilder<S, Output>
where
    S: Send + Sync + 'static,
    Output: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            registry: TypeConverterRegistry::with_builtins(),
            endpoints: EndpointCollection::new(),
            handlers: Vec::new(),
        }
    }

    /// Register with a custom [`TypeConverterRegistry`] (e.g. one with
    /// application-specific type tags) instead of the built-in one.
    pub fn with_registry(mut self, registry: TypeConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a route with default options: `order = 0`, no description,
    /// [`MessageType::Command`], no repeated options.
    pub fn route(
        self,
        pattern: &str,
        handler: impl Handler<S, Output>,
    ) -> Result<Self, RegisterError> {
        self.route_with(pattern, handler, RouteOptions::default())
    }

    pub fn route_with(
        mut self,
        pattern: &str,
        handler: impl Handler<S, Output>,
        options: RouteOptions,
    ) -> Result<Self, RegisterError> {
        let ast = parse(pattern).map_err(RegisterError::Parse)?;
        let repeated: std::collections::HashSet<String> = options.repeated_options.into_iter().collect();
        let compiled = compile(&ast, pattern, &self.registry, options.message_type, &repeated)
            .map_err(RegisterError::Compile)?;

        let handler_id = self.handlers.len();
        self.handlers.push(Arc::new(handler));
        self.endpoints.push(compiled, handler_id, options.order, options.description);
        Ok(self)
    }

    /// Seal the endpoint list (sorted exactly once) and produce a read-only
    /// router.
    pub fn build(mut self) -> Arc<CliRouter<S, Output>> {
        self.endpoints.sort();
        Arc::new(CliRouter {
            registry: self.registry,
            endpoints: self.endpoints,
            handlers: self.handlers,
        })
    }
}

impl<S, Output> Default for CliRouterBuilder<S, Output>
where
    S: Send + Sync + 'static,
    Output: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only after [`CliRouterBuilder::build`]. Matching, completion, and
/// dispatch all take `&self` — an `Arc<CliRouter<_, _>>` is safely shared
/// across concurrent invocations without any locking.
pub struct CliRouter<S, Output> {
    registry: TypeConverterRegistry,
    endpoints: EndpointCollection,
    handlers: Vec<Arc<dyn Handler<S, Output>>>,
}

impl<S, Output> CliRouter<S, Output>
where
    S: Send + Sync + 'static,
    Output: Send + 'static,
{
    /// Match `argv` against the registered routes and return the winning
    /// endpoint's handler id plus its bound parameters.
    pub fn match_args(&self, argv: &[String]) -> Result<(usize, crate::binding::Binding), NoMatch> {
        match_args(&self.endpoints, argv, &self.registry)
    }

    /// Match and invoke the winning handler in one step.
    pub async fn dispatch(&self, argv: &[String], ctx: DispatchContext<S>) -> Result<Output, NoMatch> {
        let (handler_id, binding) = self.match_args(argv)?;
        let handler = &self.handlers[handler_id];
        Ok(handler.handle(binding, ctx).await)
    }

    /// The nearest-miss diagnostic for a failed match.
    pub fn report(&self, no_match: &NoMatch) -> Option<NoMatchReport> {
        build_report(no_match)
    }

    /// Shell completion for a raw, possibly partial, input line.
    pub fn complete(&self, raw_line: &str) -> Vec<Candidate> {
        let parsed = tokenize_line(raw_line);
        complete(&parsed, &self.endpoints, &self.registry)
    }

    /// Every registered endpoint, in match order, for help rendering.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }
}
