//! dynmsg - message construction broker
//!
//! Given a [`MessageDescriptor`], decide whether to build a natively compiled
//! message ("known type") or a schema-driven [`DynamicMessage`].
//!
//! # Architecture
//!
//! - [`TypeUniverse`]: Immutable table of compiled-in types and extensions, injected
//! - [`KnownTypeRegistry`]: Scope over the universe plus user registrations (thread-safe)
//! - [`ExtensionRegistry`]: Extension-field knowledge, passed through to dynamic messages
//! - [`MessageFactory`]: Entry point, returns a known type if resolvable and a dynamic message otherwise
//!
//! # Key Design Insights
//!
//! 1. **Constructors, not reflection**: a [`TypeHandle`] stores a monomorphized
//!    constructor and a well-known tag, both captured once at registration.
//!
//! 2. **Compiled-in before registered**: the universe is consulted before
//!    user registrations, so a well-known name can never be shadowed.
//!
//! 3. **Absence is not failure**: unknown names resolve to `None`, and a missing
//!    registry or factory is a working default. Resolution has no error path.
//!
//! 4. **Children inherit context**: a dynamic message keeps its factory, so nested
//!    messages see the same known types and extensions.
//!
//! # Example
//!
//! ```
//! use dynmsg::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default)]
//! struct Foo {
//!     name: String,
//! }
//!
//! impl KnownType for Foo {
//!     const FULL_NAME: &'static str = "pkg.Foo";
//! }
//!
//! let registry = Arc::new(KnownTypeRegistry::new());
//! registry.add_known_type::<Foo>();
//! let factory = Arc::new(MessageFactory::with_known_type_registry(registry));
//!
//! let foo = Arc::new(MessageDescriptor::builder("pkg.Foo").build());
//! assert!(factory.new_message(&foo).is::<Foo>());
//!
//! let bar = Arc::new(MessageDescriptor::builder("pkg.Bar").build());
//! let msg = factory.new_message(&bar);
//! assert_eq!(msg.full_name(), "pkg.Bar");
//! assert!(msg.is::<DynamicMessage>());
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod descriptor;
mod dynamic;
mod extension;
mod factory;
mod known_types;
mod message;
mod trace;
mod universe;

pub mod well_known;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use descriptor::{FieldDescriptor, FieldKind, MessageDescriptor, MessageDescriptorBuilder};
pub use dynamic::{DynamicMessage, Value};
pub use extension::{ExtensionField, ExtensionRegistry};
pub use factory::{new_message, MessageFactory};
pub use known_types::{KnownTypeRegistry, KnownTypeScope};
pub use message::{KnownType, Message};
pub use universe::{TypeHandle, TypeUniverse, TypeUniverseBuilder};

// Trace types
pub use trace::{Resolution, ResolutionSource};

// Config (feature-gated)
#[cfg(feature = "config")]
pub use config::{ExtensionsConfig, FactoryConfig, KnownTypesConfig, ScopeConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use dynmsg::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core types
        DynamicMessage,
        ExtensionField,
        ExtensionRegistry,
        // Errors
        FactoryError,
        FieldDescriptor,
        FieldKind,
        // Traits
        KnownType,
        KnownTypeRegistry,
        KnownTypeScope,
        Message,
        MessageDescriptor,
        MessageFactory,
        // Trace types
        Resolution,
        ResolutionSource,
        TypeHandle,
        TypeUniverse,
        Value,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from dynamic field access and factory configuration.
///
/// Known-type resolution never produces an error: unknown names are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    /// Neither the descriptor nor the extension registry declares the field.
    UnknownField {
        /// Fully-qualified name of the message.
        message: String,
        /// The field that was requested.
        field: String,
    },
    /// A value or operation does not fit the field's kind.
    FieldTypeMismatch {
        /// Fully-qualified name of the message.
        message: String,
        /// The field involved.
        field: String,
        /// The kind the field declares (e.g. `"int64"`, `"message pkg.Foo"`).
        expected: String,
        /// The kind that was supplied.
        actual: String,
    },
    /// A type name was not found in the universe.
    UnknownType {
        /// The unregistered name.
        name: String,
        /// Names that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },
    /// Configuration deserialization or construction failed.
    InvalidConfig {
        /// The underlying error message.
        source: String,
    },
}

impl std::fmt::Display for FactoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField { message, field } => {
                write!(f, "message \"{message}\" has no field \"{field}\"")
            }
            Self::FieldTypeMismatch {
                message,
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "field \"{field}\" of \"{message}\" is {expected}, but got {actual}"
                )
            }
            Self::UnknownType { name, available } => {
                write!(f, "unknown type \"{name}\"")?;
                if available.is_empty() {
                    write!(f, " — no types are registered")
                } else {
                    write!(f, " — registered: {}", available.join(", "))
                }
            }
            Self::InvalidConfig { source } => {
                write!(f, "invalid config: {source}")
            }
        }
    }
}

impl std::error::Error for FactoryError {}
