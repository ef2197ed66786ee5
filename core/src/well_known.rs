//! The well-known types: a small, standardized set of schema types that even
//! the conservative resolution policy returns as native values.
//!
//! The structural types (`Any`, `Duration`, `Timestamp`, ...) use the
//! `prost-types` representations. The wrapper types and `Empty` have no
//! `prost-types` counterpart (prost maps `Empty` to `()`) and are defined here.
//!
//! [`well_known_handle`] is the only place the well-known filter is applied.
//! Both the absent registry and the well-known-only scope go through it.

use crate::{KnownType, TypeHandle, TypeUniverse, TypeUniverseBuilder};

macro_rules! well_known_types {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl KnownType for $ty {
                const FULL_NAME: &'static str = $name;
                const WELL_KNOWN: bool = true;
            }
        )*

        /// Fully-qualified names of every well-known type.
        pub const WELL_KNOWN_TYPE_NAMES: &[&str] = &[$($name),*];

        /// Register every well-known type with the builder.
        #[must_use]
        pub fn register_well_known(builder: TypeUniverseBuilder) -> TypeUniverseBuilder {
            builder $(.register::<$ty>())*
        }
    };
}

macro_rules! wrapper_types {
    ($($(#[$doc:meta])* $name:ident($inner:ty)),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Default, PartialEq)]
            pub struct $name {
                /// The wrapped value.
                pub value: $inner,
            }
        )*
    };
}

/// Native representations of the `google/protobuf/wrappers.proto` types and `Empty`.
pub mod wrappers {
    wrapper_types! {
        /// `google.protobuf.DoubleValue`
        DoubleValue(f64),
        /// `google.protobuf.FloatValue`
        FloatValue(f32),
        /// `google.protobuf.Int64Value`
        Int64Value(i64),
        /// `google.protobuf.UInt64Value`
        UInt64Value(u64),
        /// `google.protobuf.Int32Value`
        Int32Value(i32),
        /// `google.protobuf.UInt32Value`
        UInt32Value(u32),
        /// `google.protobuf.BoolValue`
        BoolValue(bool),
        /// `google.protobuf.StringValue`
        StringValue(String),
        /// `google.protobuf.BytesValue`
        BytesValue(Vec<u8>),
    }

    /// `google.protobuf.Empty`
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Empty;
}

well_known_types! {
    prost_types::Any => "google.protobuf.Any",
    prost_types::Duration => "google.protobuf.Duration",
    prost_types::Timestamp => "google.protobuf.Timestamp",
    prost_types::Struct => "google.protobuf.Struct",
    prost_types::Value => "google.protobuf.Value",
    prost_types::ListValue => "google.protobuf.ListValue",
    prost_types::FieldMask => "google.protobuf.FieldMask",
    wrappers::DoubleValue => "google.protobuf.DoubleValue",
    wrappers::FloatValue => "google.protobuf.FloatValue",
    wrappers::Int64Value => "google.protobuf.Int64Value",
    wrappers::UInt64Value => "google.protobuf.UInt64Value",
    wrappers::Int32Value => "google.protobuf.Int32Value",
    wrappers::UInt32Value => "google.protobuf.UInt32Value",
    wrappers::BoolValue => "google.protobuf.BoolValue",
    wrappers::StringValue => "google.protobuf.StringValue",
    wrappers::BytesValue => "google.protobuf.BytesValue",
    wrappers::Empty => "google.protobuf.Empty",
}

/// Returns `true` if `name` is one of the well-known type names.
#[must_use]
pub fn is_well_known_name(name: &str) -> bool {
    WELL_KNOWN_TYPE_NAMES.contains(&name)
}

/// Look up `name` in the universe, keeping it only if it carries the well-known tag.
#[must_use]
pub fn well_known_handle(universe: &TypeUniverse, name: &str) -> Option<TypeHandle> {
    universe.get(name).filter(TypeHandle::is_well_known)
}
