//! Resolution trace types for debugging known-type decisions.
//!
//! [`KnownTypeRegistry::resolve`](crate::KnownTypeRegistry::resolve) returns the
//! same decision `create_if_known()` acts on, plus which source produced it.
//!
//! # INV: `resolve(name).is_some()` == `create_if_known(name).is_some()`

use std::fmt;

use crate::TypeHandle;

/// Which knowledge source answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// A compiled-in type carrying the well-known tag (well-known-only scope or absent registry).
    WellKnown,
    /// Any compiled-in type (all-compiled scope).
    Compiled,
    /// A type added through `add_known_type`.
    Registered,
}

impl ResolutionSource {
    /// Stable lowercase label, also used by config fixtures.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WellKnown => "well_known",
            Self::Compiled => "compiled",
            Self::Registered => "registered",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful known-type lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The selected constructor.
    pub handle: TypeHandle,
    /// Where it came from.
    pub source: ResolutionSource,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.handle.full_name(),
            self.source,
            self.handle.rust_type()
        )
    }
}
