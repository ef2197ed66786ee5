//! Resolution conformance tests: config fixtures against the test universe.
//!
//! Each fixture builds a factory from YAML and checks, per type name, which
//! source resolves it and what `new_message()` actually returns.
//!
//! Run with: cargo test -p dynmsg-test --test config_conformance

#![cfg(feature = "fixtures")]

use dynmsg::{DynamicMessage, Message, MessageDescriptor};
use dynmsg_test::config_fixture::{resolution_label, ConfigFixture, DYNAMIC};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn load(file: &str) -> Vec<ConfigFixture> {
    let path = fixtures_dir().join(file);
    let yaml = fs::read_to_string(&path).expect("read yaml");
    ConfigFixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    })
}

#[test]
fn test_resolution_conformance() {
    let universe = dynmsg_test::universe();
    let fixtures = load("resolution.yaml");
    assert!(!fixtures.is_empty());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        assert!(!fixture.expect_error, "{} is in the wrong file", fixture.name);

        let config = fixture.factory_config().unwrap_or_else(|e| {
            panic!("Fixture '{}' config parse failed: {}", fixture.name, e);
        });
        let factory = Arc::new(config.build(&universe).unwrap_or_else(|e| {
            panic!("Fixture '{}' build failed: {}", fixture.name, e);
        }));

        for case in &fixture.cases {
            let actual = resolution_label(factory.resolve(&case.type_name));
            assert_eq!(
                actual, case.expect,
                "Fixture '{}' type '{}': expected {}, got {}",
                fixture.name, case.type_name, case.expect, actual,
            );

            let descriptor = Arc::new(MessageDescriptor::builder(case.type_name.as_str()).build());
            let msg = factory.new_message(&descriptor);
            assert_eq!(msg.full_name(), case.type_name);
            assert_eq!(
                msg.is::<DynamicMessage>(),
                case.expect == DYNAMIC,
                "Fixture '{}' type '{}': new_message disagrees with resolve",
                fixture.name,
                case.type_name,
            );
        }
    }
}

#[test]
fn test_error_conformance() {
    let universe = dynmsg_test::universe();

    for fixture in load("errors.yaml") {
        println!("  Running: {}", fixture.name);
        assert!(fixture.expect_error, "{} is in the wrong file", fixture.name);

        match fixture.factory_config() {
            Err(e) => println!("    -> parse error: {e} (expected)"),
            Ok(config) => {
                let result = config.build(&universe);
                assert!(
                    result.is_err(),
                    "Fixture '{}' expected error but build succeeded",
                    fixture.name,
                );
                println!("    -> build error: {} (expected)", result.unwrap_err());
            }
        }
    }
}
