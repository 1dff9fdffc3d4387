//! Error conversion registry
//!
//! Maps an error value to a result `R` by the error's kind. Lookup order:
//!
//! 1. a handler registered for the exact kind
//! 2. the handler of the nearest registered ancestor kind, which is then
//!    cached under the exact kind so later lookups skip the walk
//! 3. the default handler, if one is set (not cached)
//! 4. otherwise no result
//!
//! Kinds form an explicit taxonomy: each kind names its direct parent via
//! [`ErrorKind::parent`].

use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A node in an error taxonomy
pub trait ErrorKind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Direct ancestor of this kind, `None` for a root
    fn parent(self) -> Option<Self>;

    /// Ancestors from the direct parent up to the root
    fn ancestors(self) -> Ancestors<Self> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Check if this kind is `other` or descends from it
    fn is_a(self, other: Self) -> bool {
        self == other || self.ancestors().any(|kind| kind == other)
    }
}

/// Iterator over the ancestor chain of an [`ErrorKind`]
#[derive(Debug, Clone)]
pub struct Ancestors<K> {
    next: Option<K>,
}

impl<K: ErrorKind> Iterator for Ancestors<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

/// An error value that can report its kind
pub trait Classify {
    type Kind: ErrorKind;

    fn kind(&self) -> Self::Kind;
}

/// Shared conversion function
pub type Handler<E, R> = Arc<dyn Fn(&E) -> R + Send + Sync>;

/// Registry of conversion functions keyed by error kind
///
/// Safe to share between threads: the registry is read-mostly and only
/// written when a new concrete kind is first resolved through an ancestor.
pub struct ExceptionConverter<E: Classify, R> {
    registry: DashMap<E::Kind, Handler<E, R>>,
    default_handler: RwLock<Option<Handler<E, R>>>,
}

impl<E: Classify, R> ExceptionConverter<E, R> {
    /// Create an empty converter
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: DashMap::new(),
            default_handler: RwLock::new(None),
        }
    }

    /// Start a builder chain
    pub fn builder() -> ExceptionConverterBuilder<E, R> {
        ExceptionConverterBuilder {
            converter: Self::new(),
        }
    }

    /// Register a handler for an exact kind, replacing any previous one
    pub fn register<F>(&self, kind: E::Kind, handler: F)
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        self.register_shared(kind, Arc::new(handler));
    }

    fn register_shared(&self, kind: E::Kind, handler: Handler<E, R>) {
        self.registry.insert(kind, handler);
    }

    /// Set the fallback handler, replacing any previous one
    pub fn set_default_handler<F>(&self, handler: F)
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        *self.default_handler.write() = Some(Arc::new(handler));
    }

    /// Convert an error
    ///
    /// Returns `None` when neither the kind, any of its ancestors, nor a
    /// default handler is registered.
    pub fn apply(&self, error: &E) -> Option<R> {
        let kind = error.kind();

        if let Some(handler) = self.lookup(kind) {
            return Some(handler(error));
        }

        let inherited = kind
            .ancestors()
            .find_map(|ancestor| self.lookup(ancestor).map(|handler| (ancestor, handler)));

        if let Some((ancestor, handler)) = inherited {
            tracing::trace!(?kind, ?ancestor, "Caching inherited error handler");
            self.registry
                .entry(kind)
                .or_insert_with(|| Arc::clone(&handler));
            return Some(handler(error));
        }

        // Read guard must be released before the handler runs
        let default_handler = self.default_handler.read().clone();
        match default_handler {
            Some(handler) => {
                tracing::debug!(?kind, "No handler registered, using default");
                Some(handler(error))
            }
            None => {
                tracing::debug!(?kind, "No handler registered and no default set");
                None
            }
        }
    }

    /// Clone the handler out so no map guard is held while it runs
    fn lookup(&self, kind: E::Kind) -> Option<Handler<E, R>> {
        self.registry.get(&kind).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a handler is registered (or cached) for the exact kind
    pub fn is_registered(&self, kind: E::Kind) -> bool {
        self.registry.contains_key(&kind)
    }

    /// Number of kinds with a registered or cached handler
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn has_default_handler(&self) -> bool {
        self.default_handler.read().is_some()
    }
}

impl<E: Classify, R> Default for ExceptionConverter<E, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Classify, R> fmt::Debug for ExceptionConverter<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<E::Kind> = self.registry.iter().map(|entry| *entry.key()).collect();
        f.debug_struct("ExceptionConverter")
            .field("kinds", &kinds)
            .field("has_default_handler", &self.has_default_handler())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ExceptionConverter`]
///
/// ```ignore
/// let converter = ExceptionConverter::builder()
///     .when(Kind::Expired).then_apply(|e| Outcome::reauthenticate(e))
///     .when_any_of([Kind::Timeout, Kind::Refused]).then_apply(|e| Outcome::retry(e))
///     .when_uncaught().then_apply(|e| Outcome::fail(e))
///     .build();
/// ```
#[must_use]
pub struct ExceptionConverterBuilder<E: Classify, R> {
    converter: ExceptionConverter<E, R>,
}

impl<E: Classify, R> ExceptionConverterBuilder<E, R> {
    /// Target a single kind
    pub fn when(self, kind: E::Kind) -> PendingRule<E, R> {
        PendingRule {
            builder: self,
            target: RuleTarget::Kinds(vec![kind]),
        }
    }

    /// Target several kinds sharing one handler
    ///
    /// # Panics
    /// Panics if `kinds` is empty
    pub fn when_any_of<I>(self, kinds: I) -> PendingRule<E, R>
    where
        I: IntoIterator<Item = E::Kind>,
    {
        let kinds: Vec<E::Kind> = kinds.into_iter().collect();
        assert!(!kinds.is_empty(), "when_any_of requires at least one error kind");

        PendingRule {
            builder: self,
            target: RuleTarget::Kinds(kinds),
        }
    }

    /// Target errors no registered kind matches
    pub fn when_uncaught(self) -> PendingRule<E, R> {
        PendingRule {
            builder: self,
            target: RuleTarget::Uncaught,
        }
    }

    pub fn build(self) -> ExceptionConverter<E, R> {
        self.converter
    }
}

enum RuleTarget<K> {
    Kinds(Vec<K>),
    Uncaught,
}

/// A rule waiting for its handler
#[must_use = "a pending rule does nothing until `then_apply` is called"]
pub struct PendingRule<E: Classify, R> {
    builder: ExceptionConverterBuilder<E, R>,
    target: RuleTarget<E::Kind>,
}

impl<E: Classify, R> PendingRule<E, R> {
    /// Commit the rule and return to the builder
    pub fn then_apply<F>(self, handler: F) -> ExceptionConverterBuilder<E, R>
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
    {
        let Self { builder, target } = self;
        let handler: Handler<E, R> = Arc::new(handler);

        match target {
            RuleTarget::Kinds(kinds) => {
                for kind in kinds {
                    builder.converter.register_shared(kind, Arc::clone(&handler));
                }
            }
            RuleTarget::Uncaught => {
                *builder.converter.default_handler.write() = Some(handler);
            }
        }

        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestKind {
        Base,
        Derived,
        Grandchild,
        Sibling,
        Unrelated,
    }

    impl ErrorKind for TestKind {
        fn parent(self) -> Option<Self> {
            match self {
                Self::Base | Self::Unrelated => None,
                Self::Derived | Self::Sibling => Some(Self::Base),
                Self::Grandchild => Some(Self::Derived),
            }
        }
    }

    #[derive(Debug)]
    struct TestError {
        kind: TestKind,
        message: &'static str,
    }

    impl TestError {
        fn new(kind: TestKind) -> Self {
            Self {
                kind,
                message: "boom",
            }
        }
    }

    impl Classify for TestError {
        type Kind = TestKind;

        fn kind(&self) -> TestKind {
            self.kind
        }
    }

    fn converter() -> ExceptionConverter<TestError, String> {
        ExceptionConverter::new()
    }

    #[test]
    fn test_ancestors_order() {
        let chain: Vec<TestKind> = TestKind::Grandchild.ancestors().collect();
        assert_eq!(chain, vec![TestKind::Derived, TestKind::Base]);
        assert_eq!(TestKind::Base.ancestors().count(), 0);
    }

    #[test]
    fn test_is_a() {
        assert!(TestKind::Grandchild.is_a(TestKind::Base));
        assert!(TestKind::Derived.is_a(TestKind::Derived));
        assert!(!TestKind::Base.is_a(TestKind::Derived));
        assert!(!TestKind::Unrelated.is_a(TestKind::Base));
    }

    #[test]
    fn test_exact_match() {
        let converter = converter();
        converter.register(TestKind::Derived, |e: &TestError| format!("derived: {}", e.message));

        let result = converter.apply(&TestError::new(TestKind::Derived));
        assert_eq!(result.as_deref(), Some("derived: boom"));
    }

    #[test]
    fn test_ancestor_match_is_cached() {
        let converter = converter();
        converter.register(TestKind::Base, |_: &TestError| "base".to_string());

        assert!(!converter.is_registered(TestKind::Derived));
        assert_eq!(converter.apply(&TestError::new(TestKind::Derived)).as_deref(), Some("base"));
        assert!(converter.is_registered(TestKind::Derived));

        // Second lookup hits the cached entry directly
        assert_eq!(converter.apply(&TestError::new(TestKind::Derived)).as_deref(), Some("base"));
        assert_eq!(converter.len(), 2);
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let converter = converter();
        converter.register(TestKind::Base, |_: &TestError| "base".to_string());
        converter.register(TestKind::Derived, |_: &TestError| "derived".to_string());

        let result = converter.apply(&TestError::new(TestKind::Grandchild));
        assert_eq!(result.as_deref(), Some("derived"));

        let result = converter.apply(&TestError::new(TestKind::Sibling));
        assert_eq!(result.as_deref(), Some("base"));
    }

    #[test]
    fn test_default_handler_is_not_cached() {
        let converter = converter();
        converter.register(TestKind::Base, |_: &TestError| "base".to_string());
        converter.set_default_handler(|_: &TestError| "default".to_string());

        let result = converter.apply(&TestError::new(TestKind::Unrelated));
        assert_eq!(result.as_deref(), Some("default"));
        assert!(!converter.is_registered(TestKind::Unrelated));
    }

    #[test]
    fn test_no_handler_returns_none() {
        let converter = converter();
        converter.register(TestKind::Derived, |_: &TestError| "derived".to_string());

        assert!(converter.apply(&TestError::new(TestKind::Unrelated)).is_none());
        assert!(converter.apply(&TestError::new(TestKind::Base)).is_none());
        assert!(!converter.has_default_handler());
    }

    #[test]
    fn test_register_overwrites() {
        let converter = converter();
        converter.register(TestKind::Base, |_: &TestError| "first".to_string());
        converter.register(TestKind::Base, |_: &TestError| "second".to_string());

        assert_eq!(converter.apply(&TestError::new(TestKind::Base)).as_deref(), Some("second"));
        assert_eq!(converter.len(), 1);
    }

    #[test]
    fn test_default_handler_overwrites() {
        let converter = converter();
        converter.set_default_handler(|_: &TestError| "first".to_string());
        converter.set_default_handler(|_: &TestError| "second".to_string());

        let result = converter.apply(&TestError::new(TestKind::Unrelated));
        assert_eq!(result.as_deref(), Some("second"));
    }

    #[test]
    fn test_builder_superclass_and_uncaught() {
        let converter = ExceptionConverter::<TestError, String>::builder()
            .when(TestKind::Base)
            .then_apply(|_| "superclass".to_string())
            .when_uncaught()
            .then_apply(|_| "default".to_string())
            .build();

        assert_eq!(converter.apply(&TestError::new(TestKind::Base)).as_deref(), Some("superclass"));
        assert_eq!(converter.apply(&TestError::new(TestKind::Derived)).as_deref(), Some("superclass"));
        assert_eq!(converter.apply(&TestError::new(TestKind::Unrelated)).as_deref(), Some("default"));
    }

    #[test]
    fn test_builder_when_any_of_shares_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let converter = ExceptionConverter::<TestError, u16>::builder()
            .when_any_of([TestKind::Derived, TestKind::Sibling])
            .then_apply(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                400
            })
            .when(TestKind::Unrelated)
            .then_apply(|_| 500)
            .build();

        assert_eq!(converter.apply(&TestError::new(TestKind::Derived)), Some(400));
        assert_eq!(converter.apply(&TestError::new(TestKind::Sibling)), Some(400));
        assert_eq!(converter.apply(&TestError::new(TestKind::Unrelated)), Some(500));
        assert_eq!(converter.apply(&TestError::new(TestKind::Base)), None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_builder_last_registration_wins() {
        let converter = ExceptionConverter::<TestError, &'static str>::builder()
            .when(TestKind::Base)
            .then_apply(|_| "first")
            .when_any_of([TestKind::Base, TestKind::Derived])
            .then_apply(|_| "second")
            .when_uncaught()
            .then_apply(|_| "default one")
            .when_uncaught()
            .then_apply(|_| "default two")
            .build();

        assert_eq!(converter.apply(&TestError::new(TestKind::Base)), Some("second"));
        assert_eq!(converter.apply(&TestError::new(TestKind::Unrelated)), Some("default two"));
    }

    #[test]
    #[should_panic(expected = "when_any_of requires at least one error kind")]
    fn test_builder_rejects_empty_kind_set() {
        let _ = ExceptionConverter::<TestError, String>::builder().when_any_of([]);
    }

    #[test]
    fn test_concurrent_apply() {
        let converter = Arc::new(
            ExceptionConverter::<TestError, &'static str>::builder()
                .when(TestKind::Base)
                .then_apply(|_| "base")
                .when_uncaught()
                .then_apply(|_| "default")
                .build(),
        );

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let converter = Arc::clone(&converter);
                thread::spawn(move || {
                    for _ in 0..500 {
                        assert_eq!(converter.apply(&TestError::new(TestKind::Grandchild)), Some("base"));
                        assert_eq!(converter.apply(&TestError::new(TestKind::Sibling)), Some("base"));
                        assert_eq!(converter.apply(&TestError::new(TestKind::Unrelated)), Some("default"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(converter.is_registered(TestKind::Grandchild));
        assert!(converter.is_registered(TestKind::Sibling));
        assert!(!converter.is_registered(TestKind::Unrelated));
    }
}
