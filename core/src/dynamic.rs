//! Schema-driven generic message, used when no native type exists.
//!
//! A [`DynamicMessage`] built by a [`MessageFactory`] keeps a handle to that
//! factory. Every nested message it creates goes back through the same
//! factory, so children see the same known types and the same extension
//! registry as their parent. The factory never refers back to the messages
//! it builds, so there is no ownership cycle.
//!
//! Field storage is deliberately small: enough to populate nested messages
//! and extensions, with a kind check on every write.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::factory::new_message;
use crate::{
    ExtensionRegistry, FactoryError, FieldDescriptor, FieldKind, Message, MessageDescriptor,
    MessageFactory,
};

/// A field value stored in a [`DynamicMessage`].
#[derive(Debug)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Nested message, native or dynamic.
    Message(Box<dyn Message>),
}

impl Value {
    /// Short name of the value's type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Bool(_) => "bool".into(),
            Self::I32(_) => "int32".into(),
            Self::I64(_) => "int64".into(),
            Self::U32(_) => "uint32".into(),
            Self::U64(_) => "uint64".into(),
            Self::F32(_) => "float".into(),
            Self::F64(_) => "double".into(),
            Self::String(_) => "string".into(),
            Self::Bytes(_) => "bytes".into(),
            Self::Message(m) => format!("message {}", m.full_name()),
        }
    }

    /// Returns `true` if this value may be stored in a field of `kind`.
    ///
    /// Message values must carry the same fully-qualified name as the field's type.
    #[must_use]
    pub fn is_valid_for(&self, kind: &FieldKind) -> bool {
        match (self, kind) {
            (Self::Bool(_), FieldKind::Bool)
            | (Self::I32(_), FieldKind::Int32)
            | (Self::I64(_), FieldKind::Int64)
            | (Self::U32(_), FieldKind::Uint32)
            | (Self::U64(_), FieldKind::Uint64)
            | (Self::F32(_), FieldKind::Float)
            | (Self::F64(_), FieldKind::Double)
            | (Self::String(_), FieldKind::String)
            | (Self::Bytes(_), FieldKind::Bytes) => true,
            (Self::Message(m), FieldKind::Message(d)) => m.full_name() == d.full_name(),
            _ => false,
        }
    }

    /// The nested message, if this is a message value.
    #[must_use]
    pub fn as_message(&self) -> Option<&(dyn Message + 'static)> {
        match self {
            Self::Message(m) => Some(m.as_ref()),
            _ => None,
        }
    }
}

/// A message whose shape comes from a [`MessageDescriptor`] at runtime.
#[derive(Debug)]
pub struct DynamicMessage {
    descriptor: Arc<MessageDescriptor>,
    factory: Option<Arc<MessageFactory>>,
    fields: BTreeMap<u32, Value>,
}

impl DynamicMessage {
    /// Create an empty message with no factory.
    ///
    /// Children of such a message are always dynamic and extensions are not recognized.
    #[must_use]
    pub fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        Self {
            descriptor,
            factory: None,
            fields: BTreeMap::new(),
        }
    }

    pub(crate) fn with_factory(
        descriptor: Arc<MessageDescriptor>,
        factory: Arc<MessageFactory>,
    ) -> Self {
        Self {
            descriptor,
            factory: Some(factory),
            fields: BTreeMap::new(),
        }
    }

    /// The descriptor this message is bound to.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// The factory that built this message, if any.
    #[must_use]
    pub fn factory(&self) -> Option<&Arc<MessageFactory>> {
        self.factory.as_ref()
    }

    /// The extension registry inherited from the factory, if any.
    #[must_use]
    pub fn extension_registry(&self) -> Option<&Arc<ExtensionRegistry>> {
        self.factory.as_ref().and_then(|f| f.extension_registry())
    }

    /// Find a field by name among the descriptor's fields, then the known extensions.
    ///
    /// Values are stored by field number, so an extension whose number is also
    /// declared by the descriptor is shadowed and never returned.
    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<FieldDescriptor> {
        self.descriptor.field_by_name(name).cloned().or_else(|| {
            self.extension_registry()
                .and_then(|er| er.find_extension_by_name(self.descriptor.full_name(), name))
                .filter(|ext| self.descriptor.field_by_number(ext.number()).is_none())
        })
    }

    /// Find a field by number among the descriptor's fields, then the known extensions.
    #[must_use]
    pub fn find_field_by_number(&self, number: u32) -> Option<FieldDescriptor> {
        self.descriptor.field_by_number(number).cloned().or_else(|| {
            self.extension_registry()
                .and_then(|er| er.find_extension(self.descriptor.full_name(), number))
        })
    }

    /// Current value of a field, if set.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        let field = self.find_field(name)?;
        self.fields.get(&field.number())
    }

    /// Returns `true` if the field is set.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Set a field by name.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::UnknownField`] if neither the descriptor nor the extension registry
    ///   declares the field
    /// - [`FactoryError::FieldTypeMismatch`] if the value does not fit the field's kind
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), FactoryError> {
        let field = self.require_field(name)?;
        if !value.is_valid_for(field.kind()) {
            return Err(FactoryError::FieldTypeMismatch {
                message: self.descriptor.full_name().to_owned(),
                field: name.to_owned(),
                expected: field.kind().type_name(),
                actual: value.type_name(),
            });
        }
        self.fields.insert(field.number(), value);
        Ok(())
    }

    /// Clear a field, returning its previous value.
    pub fn clear_field(&mut self, name: &str) -> Option<Value> {
        let field = self.find_field(name)?;
        self.fields.remove(&field.number())
    }

    /// Build an empty child message for a message-typed field.
    ///
    /// The child is created through this message's factory, so it resolves
    /// known types and extensions exactly as this message did.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::UnknownField`] if the field does not exist
    /// - [`FactoryError::FieldTypeMismatch`] if the field is not a message field
    pub fn new_child(&self, field_name: &str) -> Result<Box<dyn Message>, FactoryError> {
        let field = self.require_field(field_name)?;
        let child = self.child_descriptor(&field)?;
        Ok(new_message(self.factory.as_ref(), &child))
    }

    /// Build an empty child message for a message-typed extension.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::UnknownField`] if no extension with that number is known
    /// - [`FactoryError::FieldTypeMismatch`] if the extension is not a message field
    pub fn new_extension_child(&self, number: u32) -> Result<Box<dyn Message>, FactoryError> {
        let field = self
            .extension_registry()
            .filter(|_| self.descriptor.field_by_number(number).is_none())
            .and_then(|er| er.find_extension(self.descriptor.full_name(), number))
            .ok_or_else(|| FactoryError::UnknownField {
                message: self.descriptor.full_name().to_owned(),
                field: format!("extension #{number}"),
            })?;
        let child = self.child_descriptor(&field)?;
        Ok(new_message(self.factory.as_ref(), &child))
    }

    /// Get the nested message stored in a field, creating it first if unset.
    ///
    /// # Errors
    ///
    /// Same as [`new_child`](Self::new_child).
    pub fn mutable_message(
        &mut self,
        field_name: &str,
    ) -> Result<&mut (dyn Message + 'static), FactoryError> {
        let field = self.require_field(field_name)?;
        let child = self.child_descriptor(&field)?;
        let slot = self
            .fields
            .entry(field.number())
            .or_insert_with(|| Value::Message(new_message(self.factory.as_ref(), &child)));
        match slot {
            Value::Message(m) => Ok(m.as_mut()),
            other => Err(FactoryError::FieldTypeMismatch {
                message: self.descriptor.full_name().to_owned(),
                field: field_name.to_owned(),
                expected: field.kind().type_name(),
                actual: other.type_name(),
            }),
        }
    }

    fn require_field(&self, name: &str) -> Result<FieldDescriptor, FactoryError> {
        self.find_field(name)
            .ok_or_else(|| FactoryError::UnknownField {
                message: self.descriptor.full_name().to_owned(),
                field: name.to_owned(),
            })
    }

    fn child_descriptor(
        &self,
        field: &FieldDescriptor,
    ) -> Result<Arc<MessageDescriptor>, FactoryError> {
        field
            .message_type()
            .cloned()
            .ok_or_else(|| FactoryError::FieldTypeMismatch {
                message: self.descriptor.full_name().to_owned(),
                field: field.name().to_owned(),
                expected: "message".into(),
                actual: field.kind().type_name(),
            })
    }
}

impl Message for DynamicMessage {
    fn full_name(&self) -> &str {
        self.descriptor.full_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
