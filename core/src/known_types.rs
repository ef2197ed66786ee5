//! Known-type registry: decides whether a fully-qualified name has a native representation.
//!
//! # Resolution order (first hit wins)
//!
//! | Step | Scope | Source consulted |
//! |------|-------|------------------|
//! | 1 | [`KnownTypeScope::WellKnown`] | universe, well-known tag required |
//! | 2 | [`KnownTypeScope::AllCompiled`] | universe, any type |
//! | 3 | every scope | types added via [`add_known_type`](KnownTypeRegistry::add_known_type) |
//!
//! The compiled-in path is consulted before user registrations. A name that is
//! both a well-known type and user-registered resolves to the compiled-in type.
//!
//! # Concurrency
//!
//! The user-registered map is the only mutable state. Lookups take a shared
//! lock and registrations an exclusive one; the lock is released before the
//! selected type is instantiated. Once `add_known_type` returns, every later
//! lookup on any thread observes the registration.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::well_known::well_known_handle;
use crate::{KnownType, Message, Resolution, ResolutionSource, TypeHandle, TypeUniverse};

/// Which compiled-in types a [`KnownTypeRegistry`] consults before its own registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KnownTypeScope {
    /// Only compiled-in types tagged well-known. This is the default.
    #[default]
    WellKnown,
    /// No compiled-in types; well-known types become dynamic messages.
    WithoutWellKnown,
    /// Every compiled-in type, well-known or not.
    AllCompiled,
}

/// Registry of message types represented natively instead of dynamically.
///
/// A default registry only knows the well-known types. This matches the behavior
/// of a factory with no registry at all.
///
/// # Example
///
/// ```
/// use dynmsg::{KnownType, KnownTypeRegistry};
///
/// #[derive(Debug, Default)]
/// struct Foo;
///
/// impl KnownType for Foo {
///     const FULL_NAME: &'static str = "pkg.Foo";
/// }
///
/// let registry = KnownTypeRegistry::new();
/// assert!(registry.create_if_known("pkg.Foo").is_none());
///
/// registry.add_known_type::<Foo>();
/// assert!(registry.create_if_known("pkg.Foo").unwrap().is::<Foo>());
/// assert!(registry.create_if_known("google.protobuf.Duration").is_some());
/// ```
#[derive(Debug)]
pub struct KnownTypeRegistry {
    scope: KnownTypeScope,
    universe: Arc<TypeUniverse>,
    registered: RwLock<HashMap<String, TypeHandle>>,
}

impl Default for KnownTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KnownTypeRegistry {
    /// A registry that knows the well-known types plus whatever is added to it.
    #[must_use]
    pub fn new() -> Self {
        Self::with_scope(KnownTypeScope::WellKnown)
    }

    /// A registry that knows every compiled-in type.
    ///
    /// Inject the application's universe with [`with_universe`](Self::with_universe);
    /// otherwise only the standard universe is consulted.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::with_scope(KnownTypeScope::AllCompiled)
    }

    /// A registry that does not return well-known types natively.
    #[must_use]
    pub fn without_well_known_types() -> Self {
        Self::with_scope(KnownTypeScope::WithoutWellKnown)
    }

    /// A registry with an explicit scope over the standard universe.
    #[must_use]
    pub fn with_scope(scope: KnownTypeScope) -> Self {
        Self {
            scope,
            universe: TypeUniverse::standard(),
            registered: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the compiled-in universe consulted by steps 1 and 2.
    #[must_use]
    pub fn with_universe(mut self, universe: Arc<TypeUniverse>) -> Self {
        self.universe = universe;
        self
    }

    /// The configured scope.
    #[must_use]
    pub fn scope(&self) -> KnownTypeScope {
        self.scope
    }

    /// The compiled-in universe this registry consults.
    #[must_use]
    pub fn universe(&self) -> &Arc<TypeUniverse> {
        &self.universe
    }

    /// Register `T` as a known type under `T::FULL_NAME`.
    ///
    /// Registering the same name again replaces the earlier type.
    pub fn add_known_type<T: KnownType>(&self) {
        self.add_known_types([TypeHandle::of::<T>()]);
    }

    /// Register several handles under a single lock acquisition.
    ///
    /// The batch is validated before the lock is taken, so it is applied in
    /// full or not at all.
    ///
    /// # Panics
    ///
    /// Panics if a handle has an empty name.
    pub fn add_known_types(&self, handles: impl IntoIterator<Item = TypeHandle>) {
        let handles: Vec<TypeHandle> = handles.into_iter().collect();
        for handle in &handles {
            assert!(
                !handle.full_name().is_empty(),
                "type {} has an empty fully-qualified name",
                handle.rust_type()
            );
        }

        let mut registered = self.registered.write();
        for handle in handles {
            tracing::debug!(
                name = handle.full_name(),
                rust_type = handle.rust_type(),
                "registered known type"
            );
            registered.insert(handle.full_name().to_owned(), handle);
        }
    }

    /// Names added through [`add_known_type`](Self::add_known_type), sorted.
    #[must_use]
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registered.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Decide which native type, if any, represents `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Resolution> {
        let compiled = match self.scope {
            KnownTypeScope::WellKnown => well_known_handle(&self.universe, name)
                .map(|handle| (handle, ResolutionSource::WellKnown)),
            KnownTypeScope::AllCompiled => self
                .universe
                .get(name)
                .map(|handle| (handle, ResolutionSource::Compiled)),
            KnownTypeScope::WithoutWellKnown => None,
        };

        let resolution = compiled
            .or_else(|| {
                let handle = self.registered.read().get(name).copied();
                handle.map(|handle| (handle, ResolutionSource::Registered))
            })
            .map(|(handle, source)| Resolution { handle, source });

        match &resolution {
            Some(r) => tracing::trace!(name, source = %r.source, "resolved known type"),
            None => tracing::trace!(name, "no known type"),
        }
        resolution
    }

    /// Build a fresh, default-valued instance of `name` if it is a known type.
    ///
    /// Returns `None` for unknown names; callers fall back to a dynamic message.
    #[must_use]
    pub fn create_if_known(&self, name: &str) -> Option<Box<dyn Message>> {
        self.resolve(name).map(|r| r.handle.instantiate())
    }
}

/// Resolution used when no registry is configured: well-known types from the
/// standard universe, nothing else.
#[must_use]
pub(crate) fn resolve_without_registry(name: &str) -> Option<Resolution> {
    well_known_handle(&TypeUniverse::standard(), name).map(|handle| Resolution {
        handle,
        source: ResolutionSource::WellKnown,
    })
}
