//! Runtime schema descriptors.
//!
//! A [`MessageDescriptor`] identifies a message type by its fully-qualified
//! name and lists its fields. Nested message fields hold the child descriptor
//! behind an `Arc`, so a descriptor tree is shared cheaply between the
//! messages built from it.

use std::fmt;
use std::sync::Arc;

/// Runtime description of a message type.
///
/// # Example
///
/// ```
/// use dynmsg::{FieldKind, MessageDescriptor};
/// use std::sync::Arc;
///
/// let point = Arc::new(
///     MessageDescriptor::builder("geo.Point")
///         .field("lat", 1, FieldKind::Double)
///         .field("lng", 2, FieldKind::Double)
///         .build(),
/// );
/// let place = MessageDescriptor::builder("geo.Place")
///     .field("name", 1, FieldKind::String)
///     .message_field("location", 2, &point)
///     .build();
///
/// assert_eq!(place.name(), "Place");
/// assert_eq!(place.package(), "geo");
/// assert_eq!(place.field_by_number(2).unwrap().name(), "location");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    full_name: String,
    fields: Vec<FieldDescriptor>,
}

impl MessageDescriptor {
    /// Start building a descriptor for the given fully-qualified name.
    #[must_use]
    pub fn builder(full_name: impl Into<String>) -> MessageDescriptorBuilder {
        MessageDescriptorBuilder {
            full_name: full_name.into(),
            fields: Vec::new(),
        }
    }

    /// Fully-qualified name, e.g. `pkg.Foo`.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Simple name: the last dot-separated segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map_or(self.full_name.as_str(), |(_, name)| name)
    }

    /// Package portion of the name (empty for unqualified names).
    #[must_use]
    pub fn package(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map_or("", |(package, _)| package)
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by number.
    #[must_use]
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.number == number)
    }
}

impl fmt::Display for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Builder for [`MessageDescriptor`].
#[derive(Debug)]
pub struct MessageDescriptorBuilder {
    full_name: String,
    fields: Vec<FieldDescriptor>,
}

impl MessageDescriptorBuilder {
    /// Add a field. A later field with the same name or number replaces the earlier one.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        let field = FieldDescriptor::new(name, number, kind);
        self.fields
            .retain(|f| f.name != field.name && f.number != field.number);
        self.fields.push(field);
        self
    }

    /// Add a nested message field.
    #[must_use]
    pub fn message_field(
        self,
        name: impl Into<String>,
        number: u32,
        descriptor: &Arc<MessageDescriptor>,
    ) -> Self {
        self.field(name, number, FieldKind::Message(Arc::clone(descriptor)))
    }

    /// Finish the descriptor.
    #[must_use]
    pub fn build(self) -> MessageDescriptor {
        MessageDescriptor {
            full_name: self.full_name,
            fields: self.fields,
        }
    }
}

/// A single field of a message (or an extension field).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    number: u32,
    kind: FieldKind,
}

impl FieldDescriptor {
    /// Create a field descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            number,
            kind,
        }
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Field kind.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Descriptor of the nested message, if this is a message field.
    #[must_use]
    pub fn message_type(&self) -> Option<&Arc<MessageDescriptor>> {
        match &self.kind {
            FieldKind::Message(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

/// The type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    /// Nested message.
    Message(Arc<MessageDescriptor>),
}

impl FieldKind {
    /// Short name used in error messages (`"int64"`, `"message pkg.Foo"`, ...).
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Bool => "bool".into(),
            Self::Int32 => "int32".into(),
            Self::Int64 => "int64".into(),
            Self::Uint32 => "uint32".into(),
            Self::Uint64 => "uint64".into(),
            Self::Float => "float".into(),
            Self::Double => "double".into(),
            Self::String => "string".into(),
            Self::Bytes => "bytes".into(),
            Self::Message(d) => format!("message {}", d.full_name()),
        }
    }
}
