//! Endpoint collection (component D): stores compiled routes and orders
//! them for matching.

use crate::route::CompiledRoute;

/// Metadata attached to a route at registration time, carried through to
/// callers for confirmation policies. The matcher itself never reads this —
/// it has no bearing on whether argv matches a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    /// Read-only: safe to run without confirmation, safe to run repeatedly.
    Query,
    /// Mutating, and not safe to repeat blindly (e.g. `deploy`).
    #[default]
    Command,
    /// Mutating, but safe to repeat (e.g. `set-replicas {n:int}`).
    IdempotentCommand,
}

/// One registered route: its compiled form plus the bookkeeping the
/// collection's sort needs.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub compiled: CompiledRoute,
    pub handler_id: usize,
    pub order: i32,
    pub description: Option<String>,
    pub insertion_index: usize,
}

/// Append-only until [`EndpointCollection::sort`] is called exactly once
/// during [`crate::router::CliRouterBuilder::build`]; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct EndpointCollection {
    endpoints: Vec<Endpoint>,
    sorted: bool,
}

impl EndpointCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an endpoint, recording its insertion index for the final
    /// tie-break. Panics if called after [`Self::sort`] — registration and
    /// matching are two disjoint phases of this type's lifetime.
    pub fn push(&mut self, compiled: CompiledRoute, handler_id: usize, order: i32, description: Option<String>) {
        assert!(!self.sorted, "cannot register new endpoints after the collection has been sorted");
        let insertion_index = self.endpoints.len();
        self.endpoints.push(Endpoint { compiled, handler_id, order, description, insertion_index });
    }

    /// Order by `(order desc, specificity desc, insertion-index asc)`. This
    /// is the order the matcher iterates in, and must only run once.
    pub fn sort(&mut self) {
        assert!(!self.sorted, "EndpointCollection::sort must run exactly once");
        self.endpoints.sort_by(|a, b| {
            b.order
                .cmp(&a.order)
                .then_with(|| b.compiled.specificity.cmp(&a.compiled.specificity))
                .then_with(|| a.insertion_index.cmp(&b.insertion_index))
        });
        self.sorted = true;
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::TypeConverterRegistry;
    use crate::pattern::parse;
    use crate::route::compile;

    fn compiled(src: &str) -> CompiledRoute {
        let pattern = parse(src).unwrap();
        let registry = TypeConverterRegistry::with_builtins();
        compile(&pattern, src, &registry, MessageType::Command, &std::collections::HashSet::new()).unwrap()
    }

    #[test]
    fn sort_breaks_ties_by_insertion_order() {
        let mut collection = EndpointCollection::new();
        collection.push(compiled("{cmd}"), 0, 0, None);
        collection.push(compiled("{other}"), 1, 0, None);
        collection.sort();
        let ids: Vec<_> = collection.iter().map(|e| e.handler_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn sort_prefers_higher_specificity() {
        let mut collection = EndpointCollection::new();
        collection.push(compiled("{cmd}"), 0, 0, None);
        collection.push(compiled("build"), 1, 0, None);
        collection.sort();
        let ids: Vec<_> = collection.iter().map(|e| e.handler_id).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn sort_prefers_higher_order_over_specificity() {
        let mut collection = EndpointCollection::new();
        collection.push(compiled("build"), 0, 0, None);
        collection.push(compiled("{cmd}"), 1, 10, None);
        collection.sort();
        let ids: Vec<_> = collection.iter().map(|e| e.handler_id).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    #[should_panic]
    fn push_after_sort_panics() {
        let mut collection = EndpointCollection::new();
        collection.sort();
        collection.push(compiled("build"), 0, 0, None);
    }
}
