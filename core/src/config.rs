//! Config types for building a [`MessageFactory`] from JSON/YAML.
//!
//! # Shape
//!
//! ```yaml
//! known_types:
//!   scope: well_known        # well_known | without_well_known | all_compiled | absent
//!   register: [pkg.Foo]      # resolved against the injected universe
//! extensions: defaults       # none | defaults
//! ```
//!
//! Every field is optional; an empty config builds the same factory as
//! [`MessageFactory::with_known_type_registry`] over a default registry.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    ExtensionRegistry, FactoryError, KnownTypeRegistry, KnownTypeScope, MessageFactory,
    TypeUniverse,
};

/// Configuration for a [`MessageFactory`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactoryConfig {
    /// Known-type registry settings.
    #[serde(default)]
    pub known_types: KnownTypesConfig,

    /// Extension registry settings.
    #[serde(default)]
    pub extensions: ExtensionsConfig,
}

/// Configuration for the factory's [`KnownTypeRegistry`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnownTypesConfig {
    /// Which compiled-in types are consulted.
    #[serde(default)]
    pub scope: ScopeConfig,

    /// Universe types to add as user registrations.
    #[serde(default)]
    pub register: Vec<String>,
}

/// Registry scope, or `absent` for a factory with no known-type registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeConfig {
    #[default]
    WellKnown,
    WithoutWellKnown,
    AllCompiled,
    /// No registry at all. Cannot be combined with `register`.
    Absent,
}

impl ScopeConfig {
    fn scope(self) -> Option<KnownTypeScope> {
        match self {
            Self::WellKnown => Some(KnownTypeScope::WellKnown),
            Self::WithoutWellKnown => Some(KnownTypeScope::WithoutWellKnown),
            Self::AllCompiled => Some(KnownTypeScope::AllCompiled),
            Self::Absent => None,
        }
    }
}

/// Which extensions dynamic messages recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionsConfig {
    /// No extension registry.
    #[default]
    None,
    /// Every extension compiled into the universe.
    Defaults,
}

impl FactoryConfig {
    /// Build the factory. `universe` backs the registry and supplies the
    /// types named in `known_types.register`.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::InvalidConfig`] if `scope: absent` is combined with `register`
    /// - [`FactoryError::UnknownType`] if a registered name is not in the universe
    pub fn build(&self, universe: &Arc<TypeUniverse>) -> Result<MessageFactory, FactoryError> {
        let known_types = match self.known_types.scope.scope() {
            Some(scope) => {
                let handles = self
                    .known_types
                    .register
                    .iter()
                    .map(|name| {
                        universe.get(name).ok_or_else(|| FactoryError::UnknownType {
                            name: name.clone(),
                            available: universe
                                .type_names()
                                .into_iter()
                                .map(str::to_owned)
                                .collect(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let registry =
                    KnownTypeRegistry::with_scope(scope).with_universe(Arc::clone(universe));
                registry.add_known_types(handles);
                Some(Arc::new(registry))
            }
            None if !self.known_types.register.is_empty() => {
                return Err(FactoryError::InvalidConfig {
                    source: "known_types.register requires a registry, but scope is \"absent\""
                        .into(),
                });
            }
            None => None,
        };

        let extensions = match self.extensions {
            ExtensionsConfig::None => None,
            ExtensionsConfig::Defaults => {
                Some(Arc::new(ExtensionRegistry::with_defaults(universe)))
            }
        };

        Ok(MessageFactory::with_registries(extensions, known_types))
    }
}
