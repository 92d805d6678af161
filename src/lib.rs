//! A pattern-routed command-line dispatch framework.
//!
//! Application authors declare *route patterns* — small string DSL
//! expressions such as `deploy {env} --replicas {n:int}` — and bind each to
//! a handler. At run time the crate parses the pattern set once, matches an
//! argument vector against the patterns, picks the single most specific
//! successful match, extracts and converts typed parameters, and dispatches
//! the bound handler. It also serves shell completions for partial input.

// Type aliases (must be declared before other modules that use it)
pub mod alias;
pub mod debug;

pub mod pattern;
pub mod convert;
pub mod route;
pub mod binding;
pub mod endpoint;
pub mod matcher;
pub mod report;
pub mod completion;
pub mod dispatch;
pub mod router;

pub use alias::{PMutex, PMutexGuard, PRwLock, PRwLockReadGuard, PRwLockWriteGuard};
pub use binding::{Binding, ParamValue};
pub use completion::{tokenize_line, Candidate, CandidateKind, ParsedInput};
pub use convert::{ConvertError, Converter, TypeConverterRegistry, UnknownTypeError};
pub use dispatch::{BoxFuture, CancellationToken, DispatchContext, Handler};
pub use endpoint::{Endpoint, EndpointCollection, MessageType};
pub use matcher::{Attempt, NoMatch, RejectionReason};
pub use pattern::{LexError, ParseError, ParseErrorKind};
pub use report::NoMatchReport;
pub use route::{CompileError, CompiledRoute, RouteMatcher};
pub use router::{CliRouter, CliRouterBuilder, RegisterError, RouteOptions};
