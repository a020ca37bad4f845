//! Basic A/B Test Demo
//!
//! Run with: `cargo run --example basic -- [PAGE_URL] [--reset]`
//!
//! Each invocation is one "page load": selections are kept in a JSON file in
//! the temp directory, so repeated runs show the same variant until the
//! file is reset or a `?ab-test=demo-basic&ab-variant=...` URL overrides it.
//! Set `RUST_LOG=info` to see the debug trail.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ab_testing_toolkit::kv::FileKvStore;
use ab_testing_toolkit::{AbTestManager, ExperimentDefinition, PageLocation, Variant};
use tracing_subscriber::EnvFilter;

fn main() -> ab_testing_toolkit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let reset = args.iter().any(|arg| arg == "--reset");
    let href = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map_or("https://demo.test/basic.html", String::as_str);

    let path = std::env::temp_dir().join("ab-testing-toolkit-demo.json");
    println!("=== A/B Test Demo ===\n");
    println!("   page:  {href}");
    println!("   store: {}\n", path.display());

    let mut manager = AbTestManager::builder()
        .store(FileKvStore::new(&path))
        .location(PageLocation::parse(href)?)
        .build();

    if reset {
        manager.store().clear()?;
        println!("   saved variants cleared\n");
    }

    let rendered = Arc::new(AtomicBool::new(false));
    let (shown_a, shown_b) = (Arc::clone(&rendered), Arc::clone(&rendered));

    manager.register(
        ExperimentDefinition::builder("demo-basic", "Basic Demo")
            .debug(true)
            .variant(Variant::new("variant-a", "Variant A").with_action(move || {
                println!("   >> Variant A chosen");
                shown_a.store(true, Ordering::SeqCst);
                Ok(())
            }))
            .variant(Variant::new("variant-b", "Variant B").with_action(move || {
                println!("   >> Variant B chosen");
                shown_b.store(true, Ordering::SeqCst);
                Ok(())
            }))
            .build(),
    )?;

    if let Some(outcome) = manager.run("demo-basic")? {
        println!("\n   selected by: {}", outcome.source.as_str());
        println!("   rendered:    {}", rendered.load(Ordering::SeqCst));
    }

    println!("\n   dataLayer = {}", manager.data_layer().to_json());
    Ok(())
}
