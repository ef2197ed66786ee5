//! Extension-field knowledge.
//!
//! The factory passes an [`ExtensionRegistry`] through to every dynamic message
//! it builds and never looks inside it. Dynamic messages consult it to accept
//! extension fields and to build children for message-typed extensions.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::{FieldDescriptor, TypeUniverse};

/// An extension field declared for some extendee message.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionField {
    extendee: String,
    field: FieldDescriptor,
}

impl ExtensionField {
    /// Declare `field` as an extension of the message named `extendee`.
    #[must_use]
    pub fn new(extendee: impl Into<String>, field: FieldDescriptor) -> Self {
        Self {
            extendee: extendee.into(),
            field,
        }
    }

    /// Fully-qualified name of the extended message.
    #[must_use]
    pub fn extendee(&self) -> &str {
        &self.extendee
    }

    /// The extension's field descriptor.
    #[must_use]
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }
}

/// Registry of extension fields, keyed by extendee then field number.
///
/// Safe to share between threads; additions take an exclusive lock and
/// lookups a shared one.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    extensions: RwLock<HashMap<String, BTreeMap<u32, FieldDescriptor>>>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every extension compiled into `universe`.
    #[must_use]
    pub fn with_defaults(universe: &TypeUniverse) -> Self {
        let registry = Self::new();
        registry.add_extensions(universe.extensions().iter().cloned());
        registry
    }

    /// Add one extension. A later extension with the same extendee and number replaces it.
    pub fn add_extension(&self, extension: ExtensionField) {
        self.add_extensions(std::iter::once(extension));
    }

    /// Add several extensions under a single lock acquisition.
    pub fn add_extensions(&self, extensions: impl IntoIterator<Item = ExtensionField>) {
        let mut map = self.extensions.write();
        for ExtensionField { extendee, field } in extensions {
            tracing::debug!(
                extendee = %extendee,
                number = field.number(),
                name = field.name(),
                "registered extension"
            );
            map.entry(extendee).or_default().insert(field.number(), field);
        }
    }

    /// Find the extension of `extendee` with the given field number.
    #[must_use]
    pub fn find_extension(&self, extendee: &str, number: u32) -> Option<FieldDescriptor> {
        self.extensions
            .read()
            .get(extendee)
            .and_then(|fields| fields.get(&number))
            .cloned()
    }

    /// Find the extension of `extendee` with the given field name.
    #[must_use]
    pub fn find_extension_by_name(&self, extendee: &str, name: &str) -> Option<FieldDescriptor> {
        self.extensions
            .read()
            .get(extendee)
            .and_then(|fields| fields.values().find(|f| f.name() == name))
            .cloned()
    }

    /// All extensions of `extendee`, ordered by field number.
    #[must_use]
    pub fn all_extensions_for_type(&self, extendee: &str) -> Vec<FieldDescriptor> {
        self.extensions
            .read()
            .get(extendee)
            .map(|fields| fields.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.read().values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if no extensions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
