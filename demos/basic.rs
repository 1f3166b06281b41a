//! Basic example demonstrating event constraint checking.
//!
//! Builds one event with room for three entries, then tries to overfill it
//! with duplicates, oversized keys and extra entries.

use event_constraints::{AnalyticsEvent, EventConstraintGuard, EventSession};
use tracing_subscriber::prelude::*;

fn main() {
    // Truncation warnings go to stdout
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let event = AnalyticsEvent::builder("checkout")
        .with_session(EventSession::new("session-1", 1_700_000_000_000))
        .with_unique_id("client-42")
        .build();

    let guard = EventConstraintGuard::builder(event)
        .with_max_attributes_and_metrics(3)
        .build()
        .expect("valid limits");

    println!("=== Event Constraint Example ===\n");
    println!("Limit: 3 entries, 40-char keys, 200-char values\n");

    let long_key = "a_rather_long_attribute_name_that_keeps_on_going";
    let writes = [
        ("add_attribute(\"item\", \"coffee\")", guard.add_attribute("item", "coffee")),
        ("add_attribute(\"item\", \"tea\")", guard.add_attribute("item", "tea")),
        ("add_attribute(<48-char key>, \"x\")", guard.add_attribute(long_key, "x")),
        ("add_metric(\"price\", 3.5)", guard.add_metric("price", 3.5)),
        ("add_metric(\"tip\", 0.5)", guard.add_metric("tip", 0.5)),
    ];

    for (call, outcome) in writes {
        println!("{:<40} -> {:?}", call, outcome);
    }

    println!(
        "\nEntries: {}/{}",
        guard.current_count(),
        guard.max_entries()
    );
    println!("Metrics: {:?}", guard.metrics().snapshot());

    match guard.to_json() {
        Ok(json) => println!("\nSerialized event:\n{}", json),
        Err(e) => eprintln!("serialization failed: {}", e),
    }
}
