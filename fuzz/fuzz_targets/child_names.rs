//! Fuzz target for path tree addressing.
//!
//! The child-name extraction must be total: no panics for any base path
//! and node list, and the result never contains duplicates.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use buspeek::child_names;

/// Input structure for child-name fuzzing.
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// Base path (arbitrary, not necessarily well-formed)
    base: String,
    /// Flat descendant path list
    nodes: Vec<String>,
}

fuzz_target!(|input: FuzzInput| {
    // Limit node count to keep iterations fast
    if input.nodes.len() > 1024 {
        return;
    }

    let names = child_names(&input.base, &input.nodes);

    for (i, name) in names.iter().enumerate() {
        assert!(!name.is_empty());
        assert!(!names[..i].contains(name));
    }
});
