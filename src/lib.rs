/*
 * lib.rs
 *
 * The allocator is no_std and never allocates itself. The probe/args
 * modules use `alloc` because they only ever run in the CLI and tests.
 */

//! # fallback-heap
//!
//! A last-resort allocator: a fixed 512-byte arena that keeps a runtime
//! allocating (exception objects, panic payloads) after the system heap has
//! failed.
//!
//! ## Quick Start
//!
//! ```rust
//! use fallback_heap::{emergency_heap, FallbackHeap};
//!
//! // the process-wide arena
//! let heap = emergency_heap();
//! let p = heap.allocate(24).expect("fresh arena has room");
//! assert!(heap.owns(p.as_ptr()));
//! // SAFETY: p is live and freed once
//! unsafe { heap.free(p.as_ptr()) };
//!
//! // or a private one
//! static SCRATCH: FallbackHeap<1024> = FallbackHeap::new();
//! assert!(SCRATCH.allocate(2048).is_none());
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[cfg(unix)]
pub mod allocator;
pub mod args;
pub mod error;
pub mod heap;
pub mod io;
pub mod probe;
pub mod sync;

#[cfg(unix)]
pub use allocator::{
    FallbackAlloc, aligned_malloc_with_fallback, calloc_with_fallback, free_with_fallback,
    malloc_with_fallback,
};
pub use error::{ProbeError, Result, exit_codes};
pub use heap::{
    Chunk, EMERGENCY_HEAP_BYTES, FALLBACK_ALIGN, FallbackHeap, HeapStats, UNIT, emergency_heap,
    fallback_free, fallback_malloc, is_fallback_ptr, units_for,
};
