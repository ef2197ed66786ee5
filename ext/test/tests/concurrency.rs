//! Concurrent registration and lookup on a shared `KnownTypeRegistry`.

use dynmsg::{
    DynamicMessage, KnownType, KnownTypeRegistry, Message, MessageDescriptor, MessageFactory,
    TypeHandle,
};
use dynmsg::well_known::wrappers::Empty;
use std::sync::Arc;
use std::thread;

macro_rules! concurrent_types {
    ($($ty:ident => $name:literal),* $(,)?) => {
        $(
            #[derive(Debug, Default)]
            struct $ty;

            impl KnownType for $ty {
                const FULL_NAME: &'static str = $name;
            }
        )*

        fn handles() -> Vec<TypeHandle> {
            vec![$(TypeHandle::of::<$ty>()),*]
        }
    };
}

concurrent_types! {
    T00 => "conc.T00", T01 => "conc.T01", T02 => "conc.T02", T03 => "conc.T03",
    T04 => "conc.T04", T05 => "conc.T05", T06 => "conc.T06", T07 => "conc.T07",
    T08 => "conc.T08", T09 => "conc.T09", T10 => "conc.T10", T11 => "conc.T11",
    T12 => "conc.T12", T13 => "conc.T13", T14 => "conc.T14", T15 => "conc.T15",
}

const READS_PER_THREAD: usize = 500;

#[test]
fn concurrent_registration_and_lookup() {
    let _ = tracing_subscriber::fmt::try_init();

    let registry = KnownTypeRegistry::new();
    let handles = handles();

    thread::scope(|s| {
        for handle in &handles {
            let registry = &registry;
            s.spawn(move || {
                registry.add_known_types([*handle]);
                // Visible to this thread as soon as the call returns.
                assert!(registry.create_if_known(handle.full_name()).is_some());
            });
        }
        for _ in 0..8 {
            let registry = &registry;
            let handles = &handles;
            s.spawn(move || {
                for i in 0..READS_PER_THREAD {
                    // Well-known types resolve regardless of concurrent writers.
                    assert!(registry.create_if_known("google.protobuf.Any").is_some());

                    // A registered name is either absent or fully usable, never torn.
                    let handle = handles[i % handles.len()];
                    if let Some(msg) = registry.create_if_known(handle.full_name()) {
                        assert_eq!(msg.full_name(), handle.full_name());
                    }
                    assert!(registry.create_if_known("conc.Missing").is_none());
                }
            });
        }
    });

    assert_eq!(registry.registered_names().len(), handles.len());
    for handle in &handles {
        let resolved = registry.resolve(handle.full_name()).unwrap();
        assert_eq!(resolved.handle, *handle);
    }
}

#[test]
fn shared_factory_across_threads() {
    let registry = Arc::new(KnownTypeRegistry::new());
    let factory = Arc::new(MessageFactory::with_known_type_registry(Arc::clone(&registry)));

    thread::scope(|s| {
        s.spawn(|| registry.add_known_type::<T00>());
        for _ in 0..4 {
            s.spawn(|| {
                let known = Arc::new(MessageDescriptor::builder("google.protobuf.Empty").build());
                let unknown = Arc::new(MessageDescriptor::builder("conc.Unregistered").build());
                for _ in 0..READS_PER_THREAD {
                    assert!(factory.new_message(&known).is::<Empty>());
                    assert!(factory.new_message(&unknown).is::<DynamicMessage>());
                }
            });
        }
    });

    let t00 = Arc::new(MessageDescriptor::builder("conc.T00").build());
    assert!(factory.new_message(&t00).is::<T00>());
}
