/*
 * probe.rs
 *
 * Replays an allocate/free script against a heap and records what the
 * allocator did with each step. Backs the heap-probe binary; lives in the
 * library so the same replay can be driven from tests and the fuzzer.
 *
 * Handles are numbered in the order `a:` ops appear, whether or not the
 * allocation succeeded. Freeing an exhausted handle is free(NULL): a no-op.
 */

use alloc::string::ToString;
use alloc::vec::Vec;
use core::ptr::NonNull;

use crate::error::{ProbeError, Result};
use crate::heap::{Chunk, FallbackHeap, HeapStats};

/// One script step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Alloc(usize),
    Free(usize),
}

/// Parse `a:<bytes>` or `f:<handle>`.
pub fn parse_op(s: &str) -> Result<Op> {
    let s = s.trim();
    let Some((kind, num)) = s.split_once(':') else {
        return Err(ProbeError::InvalidOp(s.to_string()));
    };
    let n: usize = num
        .parse()
        .map_err(|_| ProbeError::InvalidSize(num.to_string()))?;
    match kind {
        "a" | "alloc" => Ok(Op::Alloc(n)),
        "f" | "free" => Ok(Op::Free(n)),
        _ => Err(ProbeError::InvalidOp(s.to_string())),
    }
}

/// Parse every op, failing on the first bad one.
pub fn parse_ops<S: AsRef<str>>(ops: &[S]) -> Result<Vec<Op>> {
    if ops.is_empty() {
        return Err(ProbeError::MissingOps);
    }
    ops.iter().map(|s| parse_op(s.as_ref())).collect()
}

/// What the allocator did for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allocated { handle: usize, requested: usize, chunk: Chunk },
    Exhausted { handle: usize, requested: usize },
    Freed { handle: usize, chunk: Chunk },
    FreedNull { handle: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub arena_bytes: usize,
    pub outcomes: Vec<Outcome>,
    /// Free list in list order after the last step.
    pub free_list: Vec<Chunk>,
    pub stats: HeapStats,
}

impl Report {
    /// Number of allocations the arena could not serve.
    #[must_use]
    pub fn exhausted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Exhausted { .. }))
            .count()
    }
}

enum Slot {
    Live(NonNull<u8>),
    Null,
    Freed,
}

/// Run `ops` against `heap`.
///
/// Handles still live at the end stay allocated; the caller owns the heap.
pub fn replay<const N: usize>(heap: &FallbackHeap<N>, ops: &[Op]) -> Result<Report> {
    let mut slots: Vec<Slot> = Vec::with_capacity(ops.len());
    let mut outcomes = Vec::with_capacity(ops.len());

    for &op in ops {
        let outcome = match op {
            Op::Alloc(requested) => {
                let handle = slots.len();
                match heap.allocate(requested) {
                    Some(p) => {
                        // SAFETY: p was just returned by allocate and is live
                        let chunk = unsafe { heap.chunk_of(p.as_ptr()) };
                        slots.push(Slot::Live(p));
                        Outcome::Allocated { handle, requested, chunk }
                    }
                    None => {
                        slots.push(Slot::Null);
                        Outcome::Exhausted { handle, requested }
                    }
                }
            }
            Op::Free(handle) => {
                let slot = slots
                    .get_mut(handle)
                    .ok_or(ProbeError::UnknownHandle(handle))?;
                match core::mem::replace(slot, Slot::Freed) {
                    Slot::Live(p) => {
                        // SAFETY: p is live (slot was Live)
                        let chunk = unsafe { heap.chunk_of(p.as_ptr()) };
                        // SAFETY: freed exactly once, the slot is now Freed
                        unsafe { heap.free(p.as_ptr()) };
                        Outcome::Freed { handle, chunk }
                    }
                    Slot::Null => Outcome::FreedNull { handle },
                    Slot::Freed => return Err(ProbeError::AlreadyFreed(handle)),
                }
            }
        };
        outcomes.push(outcome);
    }

    let mut free_list = Vec::new();
    heap.for_each_free_chunk(|c| free_list.push(c));

    Ok(Report {
        arena_bytes: heap.capacity(),
        outcomes,
        free_list,
        stats: heap.stats(),
    })
}
