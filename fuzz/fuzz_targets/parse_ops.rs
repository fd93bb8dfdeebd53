/*
 * fuzz_targets/parse_ops.rs
 *
 * fuzz target for heap-probe script parsing and replay. parsing must never
 * panic, and any script that parses must replay to Ok or a usage error,
 * never to undefined behaviour (double frees are refused, not executed).
 *
 * edge cases: "a:", "f:99", "a:18446744073709551615", unicode, empty
 */

#![no_main]

use fallback_heap::heap::FallbackHeap;
use fallback_heap::probe::{parse_ops, replay};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    /* split on null bytes to simulate multiple arguments */
    let args: Vec<&str> = data
        .split(|&b| b == 0)
        .filter_map(|chunk| core::str::from_utf8(chunk).ok())
        .collect();

    if let Ok(ops) = parse_ops(&args) {
        let heap = FallbackHeap::<512>::new();
        let _ = replay(&heap, &ops);
    }
});
