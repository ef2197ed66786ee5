//! Message factory: the single entry point for "an empty message matching this descriptor".
//!
//! | Constructor | Extension registry | Known-type registry |
//! |-------------|--------------------|---------------------|
//! | [`MessageFactory::new`] | none | none (well-known types only) |
//! | [`MessageFactory::with_extension_registry`] | given | none |
//! | [`MessageFactory::with_known_type_registry`] | none | given |
//! | [`MessageFactory::with_defaults`] | compiled-in extensions | all compiled-in types |
//! | [`MessageFactory::with_registries`] | given | given |
//!
//! A factory's configuration is fixed once built. The registries it holds may
//! still grow through their own methods, and every message built afterwards
//! sees those additions.

use std::sync::Arc;

use crate::known_types::resolve_without_registry;
use crate::{
    DynamicMessage, ExtensionRegistry, KnownTypeRegistry, Message, MessageDescriptor, Resolution,
    TypeUniverse,
};

/// Builds native messages for known types and [`DynamicMessage`]s for everything else.
///
/// Share it behind an `Arc`: dynamic messages keep a clone of that `Arc` so
/// their children are built with the same policy.
///
/// # Example
///
/// ```
/// use dynmsg::{DynamicMessage, Message, MessageDescriptor, MessageFactory};
/// use std::sync::Arc;
///
/// let factory = Arc::new(MessageFactory::new());
///
/// let ts = Arc::new(MessageDescriptor::builder("google.protobuf.Timestamp").build());
/// assert!(factory.new_message(&ts).is::<prost_types::Timestamp>());
///
/// let bar = Arc::new(MessageDescriptor::builder("pkg.Bar").build());
/// let msg = factory.new_message(&bar);
/// assert_eq!(msg.downcast_ref::<DynamicMessage>().unwrap().full_name(), "pkg.Bar");
/// ```
#[derive(Debug, Default)]
pub struct MessageFactory {
    extensions: Option<Arc<ExtensionRegistry>>,
    known_types: Option<Arc<KnownTypeRegistry>>,
}

impl MessageFactory {
    /// A factory with no registries: well-known types are native, extensions unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dynamic messages will recognize extensions from `extensions`.
    #[must_use]
    pub fn with_extension_registry(extensions: Arc<ExtensionRegistry>) -> Self {
        Self::with_registries(Some(extensions), None)
    }

    /// Known types, per `known_types`, are built natively.
    #[must_use]
    pub fn with_known_type_registry(known_types: Arc<KnownTypeRegistry>) -> Self {
        Self::with_registries(None, Some(known_types))
    }

    /// All compiled-in types are known and all compiled-in extensions recognized,
    /// using the standard universe.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::with_defaults_in(TypeUniverse::standard())
    }

    /// Same as [`with_defaults`](Self::with_defaults) over an injected universe.
    #[must_use]
    pub fn with_defaults_in(universe: Arc<TypeUniverse>) -> Self {
        let extensions = ExtensionRegistry::with_defaults(&universe);
        let known_types = KnownTypeRegistry::with_defaults().with_universe(universe);
        Self::with_registries(Some(Arc::new(extensions)), Some(Arc::new(known_types)))
    }

    /// A factory with explicitly supplied registries; `None` means "not configured".
    #[must_use]
    pub fn with_registries(
        extensions: Option<Arc<ExtensionRegistry>>,
        known_types: Option<Arc<KnownTypeRegistry>>,
    ) -> Self {
        Self {
            extensions,
            known_types,
        }
    }

    /// The extension registry handed to dynamic messages.
    #[must_use]
    pub fn extension_registry(&self) -> Option<&Arc<ExtensionRegistry>> {
        self.extensions.as_ref()
    }

    /// The known-type registry, if configured.
    #[must_use]
    pub fn known_type_registry(&self) -> Option<&Arc<KnownTypeRegistry>> {
        self.known_types.as_ref()
    }

    /// Decide which native type, if any, this factory would build for `name`.
    ///
    /// Without a known-type registry, only well-known types resolve.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Resolution> {
        match &self.known_types {
            Some(registry) => registry.resolve(name),
            None => resolve_without_registry(name),
        }
    }

    /// Create an empty message for `descriptor`.
    ///
    /// Returns a native instance if the name is a known type. Otherwise returns a
    /// [`DynamicMessage`] that holds this factory, so nested messages and
    /// extensions resolve the same way.
    #[must_use]
    pub fn new_message(self: &Arc<Self>, descriptor: &Arc<MessageDescriptor>) -> Box<dyn Message> {
        if let Some(resolution) = self.resolve(descriptor.full_name()) {
            return resolution.handle.instantiate();
        }
        tracing::trace!(name = descriptor.full_name(), "building dynamic message");
        Box::new(DynamicMessage::with_factory(
            Arc::clone(descriptor),
            Arc::clone(self),
        ))
    }
}

/// Create an empty message, with or without a factory.
///
/// With no factory, the result is always a [`DynamicMessage`] with no
/// known-type shortcut and no extension knowledge. This never fails.
#[must_use]
pub fn new_message(
    factory: Option<&Arc<MessageFactory>>,
    descriptor: &Arc<MessageDescriptor>,
) -> Box<dyn Message> {
    match factory {
        Some(factory) => factory.new_message(descriptor),
        None => Box::new(DynamicMessage::new(Arc::clone(descriptor))),
    }
}
