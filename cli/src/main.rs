//! dynmsg CLI: driving adapter for the message construction broker.
//!
//! Subcommands:
//! - `resolve <config> <type-name>...`: show how each name would be constructed
//! - `check <config>`: validate that a factory config loads
//! - `info`: print the compiled-in types and extensions
//!
//! `--verbose` anywhere on the command line enables debug logging on stderr.

use std::process;
use std::sync::Arc;

use dynmsg::{FactoryConfig, MessageFactory, TypeUniverse};
use tracing_subscriber::filter::LevelFilter;

fn main() {
    let (verbose, args) = split_verbose(std::env::args().skip(1).collect());
    init_logging(verbose);

    if args.is_empty() {
        print_usage();
        process::exit(1);
    }

    let result = match args[0].as_str() {
        "resolve" => cmd_resolve(&args[1..]),
        "check" => cmd_check(&args[1..]),
        "info" => cmd_info(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_resolve(args: &[String]) -> Result<(), String> {
    let Some((config_path, names)) = args.split_first() else {
        return Err("resolve requires a config file path".into());
    };
    if names.is_empty() {
        return Err("resolve requires at least one type name".into());
    }

    let factory = build_factory(&load_config(config_path)?)?;
    for line in resolve_lines(&factory, names) {
        println!("{line}");
    }

    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    let Some(config_path) = args.first() else {
        return Err("check requires a config file path".into());
    };

    let config = load_config(config_path)?;
    let factory = build_factory(&config)?;

    match factory.known_type_registry() {
        Some(registry) => println!(
            "Config valid (scope: {:?}, registered: {})",
            registry.scope(),
            registry.registered_names().len()
        ),
        None => println!("Config valid (no known-type registry)"),
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_info() -> Result<(), String> {
    let universe = build_universe();

    println!("Compiled-in types:");
    for name in universe.type_names() {
        let marker = match universe.get(name) {
            Some(handle) if handle.is_well_known() => " (well-known)",
            _ => "",
        };
        println!("  {name}{marker}");
    }

    println!("\nExtensions:");
    for ext in universe.extensions() {
        println!(
            "  {} #{} {} on {}",
            ext.field().name(),
            ext.field().number(),
            ext.field().kind().type_name(),
            ext.extendee()
        );
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Factory assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_universe() -> Arc<TypeUniverse> {
    dynmsg_test::universe()
}

fn build_factory(config: &FactoryConfig) -> Result<Arc<MessageFactory>, String> {
    config
        .build(&build_universe())
        .map(Arc::new)
        .map_err(|e| format!("config invalid: {e}"))
}

fn resolve_lines(factory: &MessageFactory, names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| match factory.resolve(name) {
            Some(resolution) => resolution.to_string(),
            None => format!("{name} (dynamic)"),
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<FactoryConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    parse_config(&content, is_json)
}

fn parse_config(content: &str, is_json: bool) -> Result<FactoryConfig, String> {
    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn split_verbose(args: Vec<String>) -> (bool, Vec<String>) {
    let (flags, rest): (Vec<String>, Vec<String>) = args
        .into_iter()
        .partition(|a| a == "--verbose" || a == "-v");
    (!flags.is_empty(), rest)
}

fn print_usage() {
    eprintln!(
        "Usage: dynmsg [--verbose] <command> [options]

Commands:
  resolve <config> <type-name>...   Show how each type would be constructed
  check <config>                    Validate config
  info                              Print compiled-in types and extensions
  help                              Show this help"
    );
}
