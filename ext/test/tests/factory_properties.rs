//! Resolution and construction properties of `KnownTypeRegistry` and `MessageFactory`.

use dynmsg::well_known::WELL_KNOWN_TYPE_NAMES;
use dynmsg::{new_message, DynamicMessage, Value};
use dynmsg_test::prelude::*;
use dynmsg_test::{
    bar_descriptor, envelope_descriptor, foo_descriptor, universe, PRIORITY_EXTENSION,
    TRACE_EXTENSION,
};
use std::sync::Arc;

/// Pretends to be the well-known `Duration` so precedence can be observed.
#[derive(Debug, Default)]
struct ShadowDuration;

impl KnownType for ShadowDuration {
    const FULL_NAME: &'static str = "google.protobuf.Duration";
}

fn descriptor(name: &str) -> Arc<MessageDescriptor> {
    Arc::new(MessageDescriptor::builder(name).build())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry scope
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn default_registry_knows_exactly_the_well_known_types() {
    let registry = KnownTypeRegistry::new().with_universe(universe());
    let universe = universe();

    for name in universe.type_names() {
        let expected = universe.get(name).unwrap().is_well_known();
        assert_eq!(
            registry.create_if_known(name).is_some(),
            expected,
            "default registry disagreed on {name}"
        );
    }
    assert!(registry.create_if_known("pkg.Bar").is_none());
}

#[test]
fn absent_registry_matches_default_registry() {
    let without = Arc::new(MessageFactory::new());
    let with_default = Arc::new(MessageFactory::with_known_type_registry(Arc::new(
        KnownTypeRegistry::new(),
    )));

    for name in WELL_KNOWN_TYPE_NAMES.iter().chain(&["pkg.Foo", "pkg.Baz", "pkg.Bar"]) {
        assert_eq!(without.resolve(name), with_default.resolve(name), "{name}");
    }
}

#[test]
fn excluded_well_known_types_are_dynamic() {
    let registry = Arc::new(KnownTypeRegistry::without_well_known_types());
    let factory = Arc::new(MessageFactory::with_known_type_registry(Arc::clone(&registry)));

    for name in WELL_KNOWN_TYPE_NAMES {
        assert!(registry.create_if_known(name).is_none(), "{name}");
        assert!(factory.new_message(&descriptor(name)).is::<DynamicMessage>());
    }

    registry.add_known_type::<ShadowDuration>();
    assert!(registry
        .create_if_known("google.protobuf.Duration")
        .unwrap()
        .is::<ShadowDuration>());
}

#[test]
fn compiled_in_well_known_type_wins_over_registration() {
    let registry = KnownTypeRegistry::new();
    registry.add_known_type::<ShadowDuration>();

    let resolution = registry.resolve("google.protobuf.Duration").unwrap();
    assert_eq!(resolution.source, ResolutionSource::WellKnown);
    assert!(registry
        .create_if_known("google.protobuf.Duration")
        .unwrap()
        .is::<prost_types::Duration>());
    assert_eq!(
        registry.registered_names(),
        vec!["google.protobuf.Duration".to_string()]
    );
}

#[test]
fn all_compiled_scope_wins_over_registration() {
    let registry = KnownTypeRegistry::with_defaults().with_universe(universe());
    registry.add_known_type::<ShadowDuration>();

    let resolution = registry.resolve("google.protobuf.Duration").unwrap();
    assert_eq!(resolution.source, ResolutionSource::Compiled);
    assert_eq!(
        registry.resolve("pkg.Baz").unwrap().source,
        ResolutionSource::Compiled
    );
}

#[test]
fn instances_are_fresh_and_independent() {
    let registry = KnownTypeRegistry::new();
    registry.add_known_type::<Foo>();

    let mut first = registry.create_if_known("pkg.Foo").unwrap();
    let second = registry.create_if_known("pkg.Foo").unwrap();
    first.downcast_mut::<Foo>().unwrap().count = 5;

    assert_eq!(first.downcast_ref::<Foo>().unwrap().count, 5);
    assert_eq!(second.downcast_ref::<Foo>(), Some(&Foo::default()));

    let mut ts = registry.create_if_known("google.protobuf.Timestamp").unwrap();
    ts.downcast_mut::<prost_types::Timestamp>().unwrap().seconds = 60;
    let ts2 = registry.create_if_known("google.protobuf.Timestamp").unwrap();
    assert_eq!(ts2.downcast_ref::<prost_types::Timestamp>().unwrap().seconds, 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Factory
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn absent_factory_always_builds_generic_messages() {
    let names = WELL_KNOWN_TYPE_NAMES
        .iter()
        .copied()
        .chain(["pkg.Foo", "pkg.Baz", "pkg.Bar", ""]);
    for name in names {
        let msg = new_message(None, &descriptor(name));
        let dynamic = msg.downcast_ref::<DynamicMessage>().unwrap();
        assert_eq!(dynamic.full_name(), name);
        assert!(dynamic.factory().is_none());
    }
}

#[test]
fn default_factory_builds_well_known_natively() {
    let factory = Arc::new(MessageFactory::default());
    assert!(factory
        .new_message(&descriptor("google.protobuf.Timestamp"))
        .is::<prost_types::Timestamp>());
    assert!(factory
        .new_message(&descriptor("google.protobuf.BoolValue"))
        .is::<dynmsg::well_known::wrappers::BoolValue>());
    assert!(factory.new_message(&descriptor("pkg.Foo")).is::<DynamicMessage>());
}

#[test]
fn register_foo_then_fall_back_for_bar() {
    let registry = Arc::new(KnownTypeRegistry::new());
    registry.add_known_type::<Foo>();
    let factory = Arc::new(MessageFactory::with_known_type_registry(Arc::clone(&registry)));

    let foo = registry.create_if_known("pkg.Foo").unwrap();
    assert_eq!(foo.downcast_ref::<Foo>(), Some(&Foo::default()));
    assert!(registry.create_if_known("pkg.Bar").is_none());

    let bar = factory.new_message(&bar_descriptor());
    let bar = bar.downcast_ref::<DynamicMessage>().unwrap();
    assert_eq!(bar.descriptor().full_name(), "pkg.Bar");
    assert!(Arc::ptr_eq(bar.factory().unwrap(), &factory));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Recursive context propagation
// ═══════════════════════════════════════════════════════════════════════════════

fn configured_factory() -> Arc<MessageFactory> {
    let registry = KnownTypeRegistry::without_well_known_types().with_universe(universe());
    registry.add_known_type::<Foo>();
    let extensions = ExtensionRegistry::with_defaults(&universe());
    Arc::new(MessageFactory::with_registries(
        Some(Arc::new(extensions)),
        Some(Arc::new(registry)),
    ))
}

#[test]
fn children_use_the_parent_factory() {
    let factory = configured_factory();
    let envelope = factory.new_message(&envelope_descriptor());
    let envelope = envelope.downcast_ref::<DynamicMessage>().unwrap();

    // Registered type: native.
    assert!(envelope.new_child("payload").unwrap().is::<Foo>());

    // Well-known type excluded by this factory: dynamic, not the default native Timestamp.
    let created = envelope.new_child("created").unwrap();
    let created = created.downcast_ref::<DynamicMessage>().unwrap();
    assert!(Arc::ptr_eq(created.factory().unwrap(), &factory));

    // No native type anywhere: dynamic, sharing the parent extensions.
    let inner = envelope.new_child("inner").unwrap();
    let inner = inner.downcast_ref::<DynamicMessage>().unwrap();
    assert!(Arc::ptr_eq(
        inner.extension_registry().unwrap(),
        factory.extension_registry().unwrap()
    ));
    assert_eq!(
        inner.find_field_by_number(PRIORITY_EXTENSION).unwrap().name(),
        "pkg.priority"
    );
    assert!(envelope.new_child("baz").unwrap().is::<DynamicMessage>());
}

#[test]
fn default_context_would_resolve_differently() {
    let default_factory = Arc::new(MessageFactory::new());
    let envelope = default_factory.new_message(&envelope_descriptor());
    let envelope = envelope.downcast_ref::<DynamicMessage>().unwrap();

    assert!(envelope.new_child("payload").unwrap().is::<DynamicMessage>());
    assert!(envelope
        .new_child("created")
        .unwrap()
        .is::<prost_types::Timestamp>());
    assert!(envelope.new_extension_child(TRACE_EXTENSION).is_err());
}

#[test]
fn extension_children_use_the_parent_factory() {
    let factory = configured_factory();
    let envelope = factory.new_message(&envelope_descriptor());
    let envelope = envelope.downcast_ref::<DynamicMessage>().unwrap();

    assert!(envelope.new_extension_child(TRACE_EXTENSION).unwrap().is::<Foo>());
}

#[test]
fn grandchildren_keep_the_context() {
    let factory = configured_factory();
    let mut envelope = factory
        .new_message(&envelope_descriptor())
        .downcast::<DynamicMessage>()
        .unwrap();

    let inner = envelope.mutable_message("inner").unwrap();
    let inner = inner.downcast_mut::<DynamicMessage>().unwrap();
    inner.set_field("pkg.priority", Value::I32(3)).unwrap();
    assert!(matches!(inner.get_field("pkg.priority"), Some(Value::I32(3))));
    assert!(Arc::ptr_eq(inner.factory().unwrap(), &factory));

    let payload = envelope.mutable_message("payload").unwrap();
    payload.downcast_mut::<Foo>().unwrap().name = "hello".into();

    let stored = envelope.get_field("payload").unwrap().as_message().unwrap();
    assert_eq!(stored.downcast_ref::<Foo>().unwrap().name, "hello");
}

#[test]
fn native_child_can_be_stored_back() {
    let factory = configured_factory();
    let mut envelope = factory
        .new_message(&envelope_descriptor())
        .downcast::<DynamicMessage>()
        .unwrap();

    let mut payload = envelope.new_child("payload").unwrap();
    payload.downcast_mut::<Foo>().unwrap().count = 9;
    envelope.set_field("payload", Value::Message(payload)).unwrap();

    let wrong = factory.new_message(&foo_descriptor());
    assert!(envelope.set_field("inner", Value::Message(wrong)).is_err());
}
