//! Fuzz target for the container's registration and resolution protocol.
//!
//! Run with: cargo +nightly fuzz run fuzz_container_ops
//!
//! Replays arbitrary byte sequences as an operation stream against a
//! `NamedContainer<u64>` and asserts the ordering invariants afterwards.

#![no_main]

use keel_model::NamedContainer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let container: NamedContainer<u64> = NamedContainer::with_display_name("value");

    // First byte decides whether a materializing rule participates.
    if data.first().is_some_and(|b| b & 1 == 1) {
        let handle = container.clone();
        container.add_rule_fn("even-length defaults", move |name| {
            if name.len() % 2 == 0 {
                handle.add(name.to_string(), 0);
            }
        });
    }

    let view = container.matching(|v: &u64| v % 2 == 0);

    for chunk in data.chunks(3).take(256) {
        let op = chunk[0] % 4;
        let name = format!("n{}", chunk.get(1).copied().unwrap_or(0) % 16);
        let value = u64::from(chunk.get(2).copied().unwrap_or(0));
        match op {
            0 => container.add(name, value),
            1 => {
                let _ = container.find_by_name(&name);
            }
            2 => {
                let _ = container.get_by_name(&name);
            }
            _ => {
                let _ = container.configure(&name, |v| *v = value.wrapping_add(1));
            }
        }
    }

    // Names iterate ascending and uniquely, from every surface.
    let names = container.names();
    assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(container.len(), container.as_map().len());
    assert_eq!(container.get_all().len(), container.len());

    // The live view agrees with a fresh filter of the container.
    let expected: Vec<u64> = container.get_all().into_iter().filter(|v| v % 2 == 0).collect();
    assert_eq!(view.get_all(), expected);
});
