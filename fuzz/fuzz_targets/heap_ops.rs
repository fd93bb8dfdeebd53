/*
 * fuzz_targets/heap_ops.rs
 *
 * fuzz target for the arena itself. each input byte pair is one step:
 * even first byte = allocate (second byte = size), odd = free a live block.
 * after every step the free and live extents must tile the arena exactly.
 *
 * edge cases: size 0, whole-arena requests, frees that only merge one hop
 */

#![no_main]

use core::ptr::NonNull;
use fallback_heap::heap::{Chunk, FallbackHeap};
use libfuzzer_sys::fuzz_target;

const ARENA: usize = 512;

fuzz_target!(|data: &[u8]| {
    let heap = FallbackHeap::<ARENA>::new();
    let mut live: Vec<NonNull<u8>> = Vec::new();

    for step in data.chunks_exact(2) {
        let (kind, arg) = (step[0], usize::from(step[1]));
        if kind % 2 == 0 {
            /* scale up so whole-arena requests are reachable */
            if let Some(p) = heap.allocate(arg * 2) {
                assert!(heap.owns(p.as_ptr()));
                live.push(p);
            }
        } else if !live.is_empty() {
            let p = live.swap_remove(arg % live.len());
            // SAFETY: p is live and dropped from the set before freeing
            unsafe { heap.free(p.as_ptr()) };
        }

        let mut all: Vec<Chunk> = Vec::new();
        heap.for_each_free_chunk(|c| all.push(c));
        for p in &live {
            // SAFETY: every pointer in `live` is allocated
            all.push(unsafe { heap.chunk_of(p.as_ptr()) });
        }
        all.sort();
        let mut at = 0;
        for c in &all {
            assert_eq!(c.offset, at, "arena tiling broken: {all:?}");
            at = c.end();
        }
        assert_eq!(at, ARENA);
    }
});
