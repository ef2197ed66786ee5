//! The native message universe: every compiled-in type the process knows how to build.
//!
//! # Pattern (monomorphization → type erasure)
//!
//! [`TypeHandle::of::<T>()`](TypeHandle::of) monomorphizes `T` into a plain
//! constructor function and erases it behind `fn() -> Box<dyn Message>`.
//! The well-known tag is read from `T::WELL_KNOWN` at the same moment and
//! stored next to the constructor, so lookups never introspect the type again.
//!
//! A [`TypeUniverse`] is built once through [`TypeUniverseBuilder`] and is
//! immutable afterwards. It is injected into the registries that consult it
//! rather than living in a hidden global. [`TypeUniverse::standard()`] is the
//! one shared instance, and it holds only the well-known types.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::extension::ExtensionField;
use crate::{KnownType, Message};

/// How to build one fresh instance of a native message type.
#[derive(Clone, Copy)]
pub struct TypeHandle {
    full_name: &'static str,
    rust_type: &'static str,
    well_known: bool,
    construct: fn() -> Box<dyn Message>,
}

fn construct<T: KnownType>() -> Box<dyn Message> {
    Box::new(T::default())
}

impl TypeHandle {
    /// Capture the constructor and well-known tag of `T`.
    #[must_use]
    pub fn of<T: KnownType>() -> Self {
        Self {
            full_name: T::FULL_NAME,
            rust_type: std::any::type_name::<T>(),
            well_known: T::WELL_KNOWN,
            construct: construct::<T>,
        }
    }

    /// Fully-qualified schema name this handle is registered under.
    #[must_use]
    pub fn full_name(&self) -> &'static str {
        self.full_name
    }

    /// Rust type path of the native representation.
    #[must_use]
    pub fn rust_type(&self) -> &'static str {
        self.rust_type
    }

    /// Whether the type belongs to the well-known set.
    #[must_use]
    pub fn is_well_known(&self) -> bool {
        self.well_known
    }

    /// Build a brand-new, default-valued instance.
    ///
    /// Every call allocates; instances are never shared or cached.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Message> {
        (self.construct)()
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHandle")
            .field("full_name", &self.full_name)
            .field("rust_type", &self.rust_type)
            .field("well_known", &self.well_known)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
            && self.rust_type == other.rust_type
            && self.well_known == other.well_known
    }
}

impl Eq for TypeHandle {}

/// Immutable table of compiled-in message types and extension fields.
#[derive(Debug, Clone, Default)]
pub struct TypeUniverse {
    types: HashMap<&'static str, TypeHandle>,
    extensions: Vec<ExtensionField>,
}

impl TypeUniverse {
    /// Start building a universe.
    #[must_use]
    pub fn builder() -> TypeUniverseBuilder {
        TypeUniverseBuilder::new()
    }

    /// The shared universe of well-known types.
    ///
    /// Used wherever no universe is injected, including by the absent
    /// known-type registry of a [`MessageFactory`](crate::MessageFactory).
    #[must_use]
    pub fn standard() -> Arc<Self> {
        static STANDARD: OnceLock<Arc<TypeUniverse>> = OnceLock::new();
        Arc::clone(STANDARD.get_or_init(|| Arc::new(Self::builder().well_known().build())))
    }

    /// Look up the handle registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TypeHandle> {
        self.types.get(name).copied()
    }

    /// Returns `true` if a type is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.types.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Compiled-in extension fields.
    #[must_use]
    pub fn extensions(&self) -> &[ExtensionField] {
        &self.extensions
    }
}

/// Builder for [`TypeUniverse`].
///
/// Registering the same name twice keeps the last handle.
#[derive(Debug, Default)]
pub struct TypeUniverseBuilder {
    types: HashMap<&'static str, TypeHandle>,
    extensions: Vec<ExtensionField>,
}

impl TypeUniverseBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native type.
    #[must_use]
    pub fn register<T: KnownType>(self) -> Self {
        self.handle(TypeHandle::of::<T>())
    }

    /// Register a pre-built handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle has an empty name.
    #[must_use]
    pub fn handle(mut self, handle: TypeHandle) -> Self {
        assert!(
            !handle.full_name().is_empty(),
            "type {} has an empty fully-qualified name",
            handle.rust_type()
        );
        self.types.insert(handle.full_name(), handle);
        self
    }

    /// Register all well-known types.
    #[must_use]
    pub fn well_known(self) -> Self {
        crate::well_known::register_well_known(self)
    }

    /// Add a compiled-in extension field.
    #[must_use]
    pub fn extension(mut self, extension: ExtensionField) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Freeze the universe.
    #[must_use]
    pub fn build(self) -> TypeUniverse {
        TypeUniverse {
            types: self.types,
            extensions: self.extensions,
        }
    }
}
