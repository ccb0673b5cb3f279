use crate::collection::Collection;
use crate::resolver::*;
use crate::version::Version;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Strategy turning an alias into a version of a collection.
///
/// # Purpose
/// Each resolver understands one family of aliases. It returns `Some` when it
/// recognises the alias and can point at exactly one version, and `None`
/// otherwise, including when the alias is ambiguous.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so chains can be shared between
/// collections.
pub trait Resolver: Send + Sync {
    /// Returns the unique name of this resolver.
    fn name(&self) -> String;

    /// Resolves `alias` against `collection`.
    ///
    /// Resolvers that need to resolve a part of the alias (for example the
    /// base of "HEAD-1") call back into `collection.find()` so the whole chain
    /// and its cache are used.
    fn resolve(&self, alias: &str, collection: &Collection) -> Option<Version>;
}

#[derive(Clone)]
struct RegisteredResolver {
    priority: i32,
    resolver: Arc<dyn Resolver>,
}

/// Ordered chain of resolvers.
///
/// # Characteristics
/// - **Priority order**: resolvers are tried highest priority first;
///   resolvers of equal priority keep their registration order
/// - **First match wins**: the first `Some` ends the resolution
/// - **Replace by name**: registering a resolver whose name is already
///   present replaces the old one
/// - **Cheap to clone**: resolvers are shared via `Arc`
///
/// The default chain contains, from first to last tried: [OffsetResolver],
/// [HeadResolver], [FirstLastResolver], [FilenameResolver], [LazyIdResolver].
#[derive(Clone)]
pub struct ResolverChain {
    resolvers: Vec<RegisteredResolver>,
}

impl ResolverChain {
    /// Creates an empty chain that resolves nothing.
    pub fn new() -> Self {
        ResolverChain {
            resolvers: Vec::new(),
        }
    }

    /// Registers a resolver with the given priority.
    pub fn add_resolver<T: Resolver + 'static>(&mut self, resolver: T, priority: i32) {
        let resolver: Arc<dyn Resolver> = Arc::new(resolver);
        let name = resolver.name();
        self.resolvers.retain(|r| r.resolver.name() != name);

        // insert after every resolver of equal or higher priority
        let index = self
            .resolvers
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(self.resolvers.len());
        self.resolvers.insert(index, RegisteredResolver { priority, resolver });
    }

    /// Removes a resolver by name. No error if it is not registered.
    pub fn remove_resolver(&mut self, name: &str) {
        self.resolvers.retain(|r| r.resolver.name() != name);
    }

    /// Names of the registered resolvers in the order they are tried.
    pub fn names(&self) -> Vec<String> {
        self.resolvers.iter().map(|r| r.resolver.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Tries every resolver in order and returns the first match.
    pub fn resolve(&self, alias: &str, collection: &Collection) -> Option<Version> {
        for registered in &self.resolvers {
            if let Some(version) = registered.resolver.resolve(alias, collection) {
                log::debug!(
                    "Resolved '{}' to {} using {}",
                    alias,
                    version.id(),
                    registered.resolver.name()
                );
                return Some(version);
            }
        }
        log::debug!("Alias '{}' could not be resolved", alias);
        None
    }
}

impl Default for ResolverChain {
    fn default() -> Self {
        let mut chain = ResolverChain::new();
        chain.add_resolver(OffsetResolver::new(), OFFSET_RESOLVER_PRIORITY);
        chain.add_resolver(HeadResolver, HEAD_RESOLVER_PRIORITY);
        chain.add_resolver(FirstLastResolver, FIRST_LAST_RESOLVER_PRIORITY);
        chain.add_resolver(FilenameResolver, FILENAME_RESOLVER_PRIORITY);
        chain.add_resolver(LazyIdResolver, LAZY_ID_RESOLVER_PRIORITY);
        chain
    }
}

impl Resolver for ResolverChain {
    fn name(&self) -> String {
        "ResolverChain".to_string()
    }

    fn resolve(&self, alias: &str, collection: &Collection) -> Option<Version> {
        ResolverChain::resolve(self, alias, collection)
    }
}

impl Debug for ResolverChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
