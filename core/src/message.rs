//! The message handle shared by native and dynamic representations.
//!
//! Callers never see the concrete type directly: the factory hands out
//! `Box<dyn Message>` and callers downcast when they expect a native type.
//!
//! # Two kinds of message
//!
//! | Kind | Type | Built by |
//! |------|------|----------|
//! | Known (native) | any `T: KnownType` | [`TypeHandle::instantiate`](crate::TypeHandle::instantiate) |
//! | Generic | [`DynamicMessage`](crate::DynamicMessage) | [`MessageFactory::new_message`](crate::MessageFactory::new_message) fallback |

use std::any::Any;
use std::fmt;

/// An instantiated message, native or dynamic.
///
/// Object-safe so that both representations travel as `Box<dyn Message>`.
/// Implemented automatically for every [`KnownType`].
pub trait Message: Any + fmt::Debug + Send + Sync {
    /// Fully-qualified schema name of this message (e.g. `google.protobuf.Timestamp`).
    fn full_name(&self) -> &str;

    /// Access as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Access as `&mut dyn Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Convert into `Box<dyn Any>` for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl dyn Message {
    /// Returns `true` if the concrete type behind this handle is `T`.
    #[inline]
    #[must_use]
    pub fn is<T: Message>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to a shared reference of the concrete type.
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a mutable reference of the concrete type.
    #[inline]
    pub fn downcast_mut<T: Message>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Downcast an owned handle. On mismatch the original handle is returned.
    ///
    /// # Errors
    ///
    /// Returns the untouched `Box<dyn Message>` if the concrete type is not `T`.
    pub fn downcast<T: Message>(self: Box<Self>) -> Result<Box<T>, Box<dyn Message>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(native) => Ok(native),
                Err(_) => unreachable!("type checked above"),
            }
        } else {
            Err(self)
        }
    }
}

/// A native (compiled) message type that the registry can instantiate.
///
/// `FULL_NAME` is the lookup key; `WELL_KNOWN` tags the type as part of the
/// blessed well-known set. The tag is read once when a [`TypeHandle`](crate::TypeHandle)
/// is created and stored alongside the constructor.
///
/// # Example
///
/// ```
/// use dynmsg::{KnownType, Message};
///
/// #[derive(Debug, Default)]
/// struct Foo {
///     name: String,
/// }
///
/// impl KnownType for Foo {
///     const FULL_NAME: &'static str = "pkg.Foo";
/// }
///
/// let foo: Box<dyn Message> = Box::new(Foo::default());
/// assert_eq!(foo.full_name(), "pkg.Foo");
/// assert!(foo.is::<Foo>());
/// ```
pub trait KnownType: Default + fmt::Debug + Send + Sync + 'static {
    /// Fully-qualified schema name.
    const FULL_NAME: &'static str;

    /// Whether this type belongs to the well-known set.
    const WELL_KNOWN: bool = false;
}

impl<T: KnownType> Message for T {
    fn full_name(&self) -> &str {
        T::FULL_NAME
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
