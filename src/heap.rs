/*
 * heap.rs
 *
 * The last-resort arena. A fixed byte buffer carved into chunks, each
 * prefixed by a one-unit header { next, len }. Free chunks form a singly
 * linked list threaded through those headers by *index*, not by pointer:
 * u16 offsets keep the header to two fields and let every link be
 * bounds-checked against the arena.
 *
 * Allocation is first-fit and splits off the *tail* of a larger chunk, so
 * the surviving free chunk keeps its index and nobody has to patch the
 * predecessor's link. Free merges with at most one neighbour on each side
 * (single hop), otherwise it pushes the chunk onto the list head.
 *
 * Everything that walks or rewrites headers holds the heap's mutex.
 */

use core::cell::UnsafeCell;
use core::mem::size_of;
use core::ptr::{self, NonNull};

use crate::io::heap_trace;
use crate::sync::Mutex;

/// Size of the process-wide emergency arena.
pub const EMERGENCY_HEAP_BYTES: usize = 512;

/// Alignment of the arena and of every pointer handed out by it.
pub const FALLBACK_ALIGN: usize = 16;

/// In-band chunk header. One header is exactly one allocation unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, align(16))]
struct ChunkHeader {
    /* unit index of the next free chunk, END if none. dead (0) when allocated */
    next: u16,
    /* chunk length in units, header included */
    len: u16,
}

/// Allocation granularity in bytes.
pub const UNIT: usize = size_of::<ChunkHeader>();

/* end-of-list sentinel */
const END: u16 = u16::MAX;

const _: () = assert!(UNIT == FALLBACK_ALIGN);

#[repr(C, align(16))]
struct Arena<const BYTES: usize>([u8; BYTES]);

/* list head plus the one-way uninitialized -> initialized flag */
struct FreeList {
    head: u16,
    initialized: bool,
}

/// A chunk extent, in bytes relative to the arena base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Chunk {
    pub offset: usize,
    /// Total length including the header.
    pub len: usize,
}

impl Chunk {
    /// Bytes a caller could use if this chunk were handed out.
    #[must_use]
    pub const fn usable(&self) -> usize {
        self.len - UNIT
    }

    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Snapshot of the free list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Sum of usable bytes over all free chunks.
    pub free_bytes: usize,
    pub free_chunks: usize,
    /// Largest single request that would currently succeed.
    pub largest_free: usize,
}

/// Number of units (header included) needed to serve `bytes`.
///
/// A zero-byte request is served as a one-byte request so the returned
/// pointer always addresses memory inside the arena.
#[inline]
#[must_use]
pub const fn units_for(bytes: usize) -> usize {
    let bytes = if bytes == 0 { 1 } else { bytes };
    bytes.div_ceil(UNIT) + 1
}

/// Fixed-capacity free-list allocator over a `BYTES`-sized arena.
///
/// `BYTES` must be a multiple of [`UNIT`], hold at least two units, and
/// fewer than `u16::MAX` units; violations fail at compile time when
/// [`FallbackHeap::new`] is instantiated.
///
/// The heap must not be moved after its first `allocate`: pointers it hands
/// out point into the value itself, and the unix lock is a pthread mutex.
/// In practice it lives in a `static` (see [`emergency_heap`]).
pub struct FallbackHeap<const BYTES: usize> {
    arena: UnsafeCell<Arena<BYTES>>,
    list: Mutex<FreeList>,
}

// SAFETY: headers inside `arena` are only read or written while `list` is
// locked. Payload bytes belong to whoever holds the pointer, same as with
// malloc. owns() only compares addresses.
unsafe impl<const BYTES: usize> Sync for FallbackHeap<BYTES> {}

impl<const BYTES: usize> FallbackHeap<BYTES> {
    const UNITS: usize = {
        assert!(BYTES.is_multiple_of(UNIT), "arena size must be a multiple of UNIT");
        assert!(BYTES / UNIT >= 2, "arena must hold a header and one payload unit");
        assert!(BYTES / UNIT < END as usize, "arena too large for u16 offsets");
        BYTES / UNIT
    };

    #[must_use]
    pub const fn new() -> Self {
        let _ = Self::UNITS;
        Self {
            arena: UnsafeCell::new(Arena([0; BYTES])),
            list: Mutex::new(FreeList {
                head: END,
                initialized: false,
            }),
        }
    }

    /// Arena size in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        BYTES
    }

    /// Allocate at least `bytes` bytes, 16-byte aligned.
    ///
    /// Returns `None` when no single free chunk is large enough. Never
    /// blocks beyond the lock and never panics.
    pub fn allocate(&self, bytes: usize) -> Option<NonNull<u8>> {
        let mut list = self.list.lock();
        self.init(&mut list);

        let needed = units_for(bytes);
        let mut prev = END;
        let mut cur = list.head;

        while cur != END {
            let hdr = self.header(cur);
            let len = usize::from(hdr.len);

            if len > needed {
                /* shrink in place, hand out the tail */
                let rest = len - needed;
                self.set_header(cur, ChunkHeader { next: hdr.next, len: rest as u16 });
                let taken = cur + rest as u16;
                self.set_header(taken, ChunkHeader { next: 0, len: needed as u16 });
                return Some(self.payload(taken));
            }

            if len == needed {
                if prev == END {
                    list.head = hdr.next;
                } else {
                    let p = self.header(prev);
                    self.set_header(prev, ChunkHeader { next: hdr.next, len: p.len });
                }
                self.set_header(cur, ChunkHeader { next: 0, len: hdr.len });
                return Some(self.payload(cur));
            }

            prev = cur;
            cur = hdr.next;
        }

        heap_trace!("arena exhausted: requested {} bytes", bytes);
        None
    }

    /// Return a block to the arena, merging with at most one adjacent free
    /// chunk. Null is a no-op.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a pointer previously returned by `allocate` on
    /// this heap that has not been freed since. Check [`owns`](Self::owns)
    /// before routing a foreign pointer here. Double frees are not detected.
    pub unsafe fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }

        let mut list = self.list.lock();
        let freed = self.index_of(ptr) - 1;
        let freed_len = self.header(freed).len;
        let freed_end = freed + freed_len;

        let mut prev = END;
        let mut cur = list.head;
        while cur != END {
            let hdr = self.header(cur);

            if cur + hdr.len == freed {
                /* free neighbour right before us: it swallows the block */
                self.set_header(cur, ChunkHeader { next: hdr.next, len: hdr.len + freed_len });
                return;
            }

            if freed_end == cur {
                /* free neighbour right after us: take over its list slot */
                self.set_header(freed, ChunkHeader { next: hdr.next, len: freed_len + hdr.len });
                if prev == END {
                    list.head = freed;
                } else {
                    let p = self.header(prev);
                    self.set_header(prev, ChunkHeader { next: freed, len: p.len });
                }
                return;
            }

            prev = cur;
            cur = hdr.next;
        }

        self.set_header(freed, ChunkHeader { next: list.head, len: freed_len });
        list.head = freed;
    }

    /// True iff `ptr` lies inside this heap's arena.
    #[inline]
    #[must_use]
    pub fn owns(&self, ptr: *const u8) -> bool {
        let base = self.base() as usize;
        let addr = ptr as usize;
        addr >= base && addr < base + BYTES
    }

    /// Totals over the current free list.
    #[must_use]
    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats::default();
        self.for_each_free_chunk(|c| {
            stats.free_bytes += c.usable();
            stats.free_chunks += 1;
            stats.largest_free = stats.largest_free.max(c.usable());
        });
        stats
    }

    /// Visit every free chunk in list order. An untouched heap reports the
    /// single chunk it would carve on first use.
    ///
    /// Runs `f` under the heap lock: `f` must not call back into this heap.
    pub fn for_each_free_chunk<F: FnMut(Chunk)>(&self, mut f: F) {
        let list = self.list.lock();
        if !list.initialized {
            f(Chunk { offset: 0, len: BYTES });
            return;
        }
        let mut cur = list.head;
        while cur != END {
            let hdr = self.header(cur);
            f(Self::extent(cur, hdr));
            cur = hdr.next;
        }
    }

    /// Extent of the allocated chunk behind `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live pointer returned by `allocate` on this heap.
    #[must_use]
    pub unsafe fn chunk_of(&self, ptr: *const u8) -> Chunk {
        let _list = self.list.lock();
        let idx = self.index_of(ptr) - 1;
        Self::extent(idx, self.header(idx))
    }

    /* ---------------------------------------------------------------- */
    /*                     index <-> address helpers                    */
    /* ---------------------------------------------------------------- */

    #[inline]
    fn base(&self) -> *mut u8 {
        self.arena.get().cast::<u8>()
    }

    #[inline]
    fn node(&self, idx: u16) -> *mut ChunkHeader {
        debug_assert!(usize::from(idx) < Self::UNITS);
        // SAFETY: idx < UNITS, so the offset stays inside the arena
        unsafe { self.base().add(usize::from(idx) * UNIT).cast::<ChunkHeader>() }
    }

    #[inline]
    fn header(&self, idx: u16) -> ChunkHeader {
        // SAFETY: node() is in bounds and UNIT-aligned (arena is align(16));
        // caller holds the list lock
        unsafe { ptr::read(self.node(idx)) }
    }

    #[inline]
    fn set_header(&self, idx: u16, hdr: ChunkHeader) {
        // SAFETY: as in header(); headers never overlap a live payload
        unsafe { ptr::write(self.node(idx), hdr) }
    }

    #[inline]
    fn payload(&self, idx: u16) -> NonNull<u8> {
        // SAFETY: an allocated chunk spans >= 2 units, so idx + 1 is in bounds
        let body = unsafe { self.node(idx).add(1) }.cast::<u8>();
        // SAFETY: derived from the non-null arena pointer
        unsafe { NonNull::new_unchecked(body) }
    }

    #[inline]
    fn index_of(&self, ptr: *const u8) -> u16 {
        let off = ptr as usize - self.base() as usize;
        debug_assert!(off.is_multiple_of(UNIT) && off < BYTES, "pointer not from this arena");
        (off / UNIT) as u16
    }

    #[inline]
    fn extent(idx: u16, hdr: ChunkHeader) -> Chunk {
        Chunk {
            offset: usize::from(idx) * UNIT,
            len: usize::from(hdr.len) * UNIT,
        }
    }

    /* first use: the whole arena becomes one free chunk */
    fn init(&self, list: &mut FreeList) {
        if list.initialized {
            return;
        }
        self.set_header(0, ChunkHeader { next: END, len: Self::UNITS as u16 });
        list.head = 0;
        list.initialized = true;
        heap_trace!("arena initialized: {} bytes at {:p}", BYTES, self.base());
    }
}

impl<const BYTES: usize> Default for FallbackHeap<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

/* -------------------------------------------------------------------------- */
/*                          process-wide instance                             */
/* -------------------------------------------------------------------------- */

static EMERGENCY_HEAP: FallbackHeap<EMERGENCY_HEAP_BYTES> = FallbackHeap::new();

/// The process-wide emergency arena.
///
/// Lazily carved on its first `allocate`; the first-use check runs under the
/// same lock as allocation, so there is no initialization race.
#[inline]
#[must_use]
pub fn emergency_heap() -> &'static FallbackHeap<EMERGENCY_HEAP_BYTES> {
    &EMERGENCY_HEAP
}

/// Allocate from the emergency arena. Null on exhaustion.
#[must_use]
pub fn fallback_malloc(bytes: usize) -> *mut u8 {
    emergency_heap()
        .allocate(bytes)
        .map_or(ptr::null_mut(), NonNull::as_ptr)
}

/// Free a pointer obtained from [`fallback_malloc`].
///
/// # Safety
///
/// Same contract as [`FallbackHeap::free`] on the emergency arena.
pub unsafe fn fallback_free(ptr: *mut u8) {
    // SAFETY: forwarded caller contract
    unsafe { emergency_heap().free(ptr) }
}

/// True iff `ptr` belongs to the emergency arena.
#[inline]
#[must_use]
pub fn is_fallback_ptr(ptr: *const u8) -> bool {
    emergency_heap().owns(ptr)
}

#[cfg(test)]
mod tests {
    use super::*;

    /* 30 units: splits into three 10-unit chunks with nothing left over */
    type Heap480 = FallbackHeap<480>;

    fn free_list<const N: usize>(heap: &FallbackHeap<N>) -> std::vec::Vec<Chunk> {
        let mut v = std::vec::Vec::new();
        heap.for_each_free_chunk(|c| v.push(c));
        v
    }

    #[test]
    fn test_header_is_one_unit() {
        assert_eq!(UNIT, 16);
        assert_eq!(core::mem::align_of::<Arena<512>>(), FALLBACK_ALIGN);
    }

    #[test]
    fn test_units_for() {
        assert_eq!(units_for(0), 2);
        assert_eq!(units_for(1), 2);
        assert_eq!(units_for(16), 2);
        assert_eq!(units_for(17), 3);
        assert_eq!(units_for(496), 32);
    }

    #[test]
    fn test_untouched_heap_reports_whole_arena() {
        let heap = FallbackHeap::<512>::new();
        assert_eq!(free_list(&heap), [Chunk { offset: 0, len: 512 }]);
        assert_eq!(heap.stats().largest_free, 496);
    }

    #[test]
    fn test_split_hands_out_tail() {
        let heap = FallbackHeap::<512>::new();
        let p = heap.allocate(32).unwrap();

        /* 3 units taken from the end, front chunk keeps index 0 */
        // SAFETY: p is live
        let c = unsafe { heap.chunk_of(p.as_ptr()) };
        assert_eq!(c, Chunk { offset: 464, len: 48 });
        assert_eq!(free_list(&heap), [Chunk { offset: 0, len: 464 }]);
    }

    #[test]
    fn test_exact_fit_unlinks_chunk() {
        let heap = FallbackHeap::<512>::new();
        let p = heap.allocate(496).unwrap();
        assert!(free_list(&heap).is_empty());
        assert!(heap.allocate(0).is_none());
        // SAFETY: p is live
        unsafe { heap.free(p.as_ptr()) };
        assert_eq!(free_list(&heap), [Chunk { offset: 0, len: 512 }]);
    }

    #[test]
    fn test_exact_fit_in_middle_of_list_patches_predecessor() {
        let heap = FallbackHeap::<512>::new();
        let a = heap.allocate(64).unwrap(); /* units [27,32) */
        let _g1 = heap.allocate(16).unwrap(); /* [25,27) */
        let b = heap.allocate(16).unwrap(); /* [23,25) */
        let _g2 = heap.allocate(16).unwrap(); /* [21,23) */
        // SAFETY: live, freed once
        unsafe {
            heap.free(a.as_ptr());
            heap.free(b.as_ptr());
        }
        /* list: b -> a -> front */
        assert_eq!(free_list(&heap).len(), 3);

        /* 64 bytes skips b and takes a whole; b must now link to the front */
        let c = heap.allocate(64).unwrap();
        assert_eq!(c, a);
        assert_eq!(
            free_list(&heap),
            [
                Chunk { offset: 23 * UNIT, len: 2 * UNIT },
                Chunk { offset: 0, len: 21 * UNIT },
            ]
        );
    }

    #[test]
    fn test_merge_with_following_chunk_behind_head_relinks_predecessor() {
        let heap = FallbackHeap::<512>::new();
        let b1 = heap.allocate(16).unwrap(); /* units [30,32) */
        let _b2 = heap.allocate(16).unwrap(); /* [28,30) */
        let b3 = heap.allocate(16).unwrap(); /* [26,28) */
        let b4 = heap.allocate(16).unwrap(); /* [24,26) */
        let _b5 = heap.allocate(16).unwrap(); /* [22,24) */
        // SAFETY: live, freed once
        unsafe {
            heap.free(b3.as_ptr());
            heap.free(b1.as_ptr());
        }
        /* list: b1 -> b3 -> front, none adjacent */
        assert_eq!(
            free_list(&heap),
            [
                Chunk { offset: 30 * UNIT, len: 2 * UNIT },
                Chunk { offset: 26 * UNIT, len: 2 * UNIT },
                Chunk { offset: 0, len: 22 * UNIT },
            ]
        );

        /* b4 ends where b3 starts: it absorbs b3 and b1 must point at it */
        // SAFETY: live, freed once
        unsafe { heap.free(b4.as_ptr()) };
        assert_eq!(heap.header(30).next, 24);
        assert_eq!(heap.header(24).next, 0);
        assert_eq!(
            free_list(&heap),
            [
                Chunk { offset: 30 * UNIT, len: 2 * UNIT },
                Chunk { offset: 24 * UNIT, len: 4 * UNIT },
                Chunk { offset: 0, len: 22 * UNIT },
            ]
        );
    }

    #[test]
    fn test_first_fit_not_best_fit() {
        let heap = FallbackHeap::<512>::new();
        let a = heap.allocate(64).unwrap(); /* units [27,32) */
        let _guard1 = heap.allocate(16).unwrap(); /* [25,27) */
        let b = heap.allocate(16).unwrap(); /* [23,25) */
        let _guard2 = heap.allocate(16).unwrap(); /* [21,23) */
        // SAFETY: live, freed once
        unsafe {
            heap.free(b.as_ptr()); /* isolated, prepended */
            heap.free(a.as_ptr()); /* isolated, prepended ahead of b */
        }
        let list = free_list(&heap);
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], Chunk { offset: 27 * UNIT, len: 5 * UNIT });
        assert_eq!(list[1], Chunk { offset: 23 * UNIT, len: 2 * UNIT });

        /* b would be the exact (best) fit, but a comes first in the list */
        let c = heap.allocate(16).unwrap();
        assert_ne!(c, b);
        // SAFETY: c is live
        assert_eq!(unsafe { heap.chunk_of(c.as_ptr()) }.offset, 30 * UNIT);
    }

    #[test]
    fn test_zero_byte_allocation_is_distinct_and_owned() {
        let heap = FallbackHeap::<512>::new();
        let a = heap.allocate(0).unwrap();
        let b = heap.allocate(0).unwrap();
        assert_ne!(a, b);
        assert!(heap.owns(a.as_ptr()));
        assert!(heap.owns(b.as_ptr()));
        /* b sits below a, so freeing b first lets each free merge downward */
        // SAFETY: both live, freed once
        unsafe {
            heap.free(b.as_ptr());
            heap.free(a.as_ptr());
        }
        assert_eq!(heap.stats().largest_free, 496);
    }

    #[test]
    fn test_exhaustion() {
        let heap = FallbackHeap::<512>::new();
        assert!(heap.allocate(512 - UNIT + 1).is_none());
        assert!(heap.allocate(usize::MAX).is_none());
        assert!(heap.allocate(512 - UNIT).is_some());
    }

    #[test]
    fn test_pointers_are_aligned() {
        let heap = FallbackHeap::<512>::new();
        for n in [0, 1, 7, 15, 16, 33] {
            let p = heap.allocate(n).unwrap();
            assert_eq!(p.as_ptr() as usize % FALLBACK_ALIGN, 0);
        }
    }

    #[test]
    fn test_owns_bounds() {
        let heap = FallbackHeap::<512>::new();
        let base = heap.base();
        assert!(heap.owns(base));
        assert!(heap.owns(base.wrapping_add(511)));
        assert!(!heap.owns(base.wrapping_add(512)));
        assert!(!heap.owns(base.wrapping_sub(1)));
        let local = 0u8;
        assert!(!heap.owns(&local));
        assert!(!heap.owns(ptr::null()));
    }

    #[test]
    fn test_free_null_is_noop() {
        let heap = FallbackHeap::<512>::new();
        // SAFETY: null is explicitly allowed
        unsafe { heap.free(ptr::null_mut()) };
        assert_eq!(heap.stats().free_chunks, 1);
    }

    #[test]
    fn test_payload_writable_without_touching_neighbours() {
        let heap = FallbackHeap::<512>::new();
        let a = heap.allocate(40).unwrap();
        let b = heap.allocate(40).unwrap();
        // SAFETY: each pointer is valid for 40 bytes
        unsafe {
            ptr::write_bytes(a.as_ptr(), 0xAA, 40);
            ptr::write_bytes(b.as_ptr(), 0xBB, 40);
            assert!(core::slice::from_raw_parts(a.as_ptr(), 40).iter().all(|&x| x == 0xAA));
        }
        /* headers survived the payload writes */
        let stats = heap.stats();
        assert_eq!(stats.free_chunks, 1);
        assert_eq!(stats.free_bytes, 512 - UNIT - 2 * 64);
    }

    /* the three-chunk coalescing scenario, every free order */
    fn free_order(order: [usize; 3]) -> std::vec::Vec<Chunk> {
        let heap = Heap480::new();
        let a = heap.allocate(144).unwrap();
        let b = heap.allocate(144).unwrap();
        let c = heap.allocate(144).unwrap();
        assert!(free_list(&heap).is_empty());
        let ptrs = [a, b, c];
        for i in order {
            // SAFETY: each pointer freed exactly once
            unsafe { heap.free(ptrs[i].as_ptr()) };
        }
        let list = free_list(&heap);
        if list.len() == 1 {
            assert!(heap.allocate(480 - UNIT).is_some());
        }
        list
    }

    #[test]
    fn test_coalesce_reunifies_when_middle_freed_early() {
        /* a is the highest chunk, b the middle, c the lowest */
        for order in [[1, 0, 2], [1, 2, 0], [0, 1, 2], [2, 1, 0]] {
            assert_eq!(free_order(order), [Chunk { offset: 0, len: 480 }], "{order:?}");
        }
    }

    #[test]
    fn test_single_hop_leaves_split_when_middle_freed_last() {
        /* both ends free and separate, middle merges with only one of them */
        for order in [[0, 2, 1], [2, 0, 1]] {
            let list = free_order(order);
            assert_eq!(list.len(), 2, "{order:?}");
            assert_eq!(list.iter().map(|c| c.len).sum::<usize>(), 480);
        }
    }

    #[test]
    fn test_repeated_alloc_free_does_not_leak() {
        let heap = FallbackHeap::<512>::new();
        for _ in 0..1000 {
            let p = heap.allocate(100).unwrap();
            // SAFETY: live, freed once
            unsafe { heap.free(p.as_ptr()) };
        }
        assert!(heap.allocate(512 - UNIT).is_some());
    }

    #[test]
    fn test_emergency_heap_is_singleton() {
        assert!(core::ptr::eq(emergency_heap(), emergency_heap()));
        assert_eq!(emergency_heap().capacity(), EMERGENCY_HEAP_BYTES);
        let p = fallback_malloc(8);
        assert!(!p.is_null());
        assert!(is_fallback_ptr(p));
        // SAFETY: p came from fallback_malloc
        unsafe { fallback_free(p) };
    }
}

/* -------------------------------------------------------------------------- */
/*                              kani proofs                                   */
/* -------------------------------------------------------------------------- */

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /*
     * units_for always reserves the header plus enough payload units,
     * and never reserves a whole spare unit.
     */
    #[kani::proof]
    fn verify_units_for_covers_request() {
        let bytes: usize = kani::any();
        kani::assume(bytes < usize::MAX - UNIT);
        let units = units_for(bytes);

        kani::assert(units >= 2, "at least header + one payload unit");
        kani::assert((units - 1) * UNIT >= bytes, "payload covers the request");
        if bytes > 0 {
            kani::assert((units - 2) * UNIT < bytes, "no spare payload unit");
        }
    }

    /*
     * tail split as allocate() does it, usize lengths narrowed to u16:
     * the tail ends inside the arena, exactly where the old chunk ended.
     */
    #[kani::proof]
    fn verify_tail_split_tiles() {
        const UNITS: usize = 32;
        let cur: u16 = kani::any();
        let hdr_len: u16 = kani::any();
        let bytes: usize = kani::any();
        kani::assume(usize::from(cur) + usize::from(hdr_len) <= UNITS);
        kani::assume(bytes < UNITS * UNIT);

        let len = usize::from(hdr_len);
        let needed = units_for(bytes);
        kani::assume(len > needed);

        let rest = len - needed;
        let taken = cur + rest as u16;
        kani::assert(
            usize::from(taken) + needed <= UNITS,
            "tail ends inside the arena",
        );
        kani::assert(
            usize::from(taken) + needed == usize::from(cur) + len,
            "tail ends at original end",
        );
        kani::assert(usize::from(needed as u16) == needed, "tail length fits a header");
        kani::assert(rest >= 1, "front chunk never zero length");
    }
}
