//! Handler dispatch: the boundary between a successful [`crate::binding::Binding`]
//! and application code.
//!
//! Instead of a context threaded implicitly through a connection or a
//! static "current REPL", the handler receives the [`Binding`] plus an
//! explicit [`DispatchContext`] the embedding application populates.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::binding::Binding;

/// A boxed, `Send` future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A cooperative cancellation signal propagated in from the caller of
/// [`crate::router::CliRouter::dispatch`]. The core never sets this itself;
/// it only carries it.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whatever the embedding application needs a handler to see besides the
/// bound parameters: REPL state, a shared client, cancellation — supplied
/// explicitly by the caller of [`crate::router::CliRouter::dispatch`]
/// rather than read from any static.
#[derive(Clone)]
pub struct DispatchContext<S> {
    pub state: S,
    pub cancellation: CancellationToken,
}

impl<S> DispatchContext<S> {
    pub fn new(state: S) -> Self {
        Self { state, cancellation: CancellationToken::new() }
    }
}

/// A registered endpoint's behavior: given the bound parameters and the
/// dispatch context, produce a future yielding `Output`.
pub trait Handler<S, Output>: Send + Sync + 'static {
    fn handle(&self, binding: Binding, ctx: DispatchContext<S>) -> BoxFuture<Output>;
}

/// Blanket impl: any `Fn(Binding, DispatchContext<S>) -> impl Future<Output = Output>`
/// closure is a [`Handler`].
impl<F, Fut, S, Output> Handler<S, Output> for F
where
    F: Fn(Binding, DispatchContext<S>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Output> + Send + 'static,
{
    fn handle(&self, binding: Binding, ctx: DispatchContext<S>) -> BoxFuture<Output> {
        Box::pin((self)(binding, ctx))
    }
}
