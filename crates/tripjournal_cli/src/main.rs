//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tripjournal_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("tripjournal_core ping={}", tripjournal_core::ping());
    println!(
        "tripjournal_core version={}",
        tripjournal_core::core_version()
    );
    for item in tripjournal_core::recommendations() {
        println!("recommendation slug={} title={}", item.slug, item.title());
    }
}
