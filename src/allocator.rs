/*
 * allocator.rs
 *
 * System malloc first, emergency arena second.
 *
 * The arena never grows and is tiny, so it only ever sees requests the
 * system allocator already refused. Deallocation has to tell the two
 * apart: owns() is an address-range check, so a pointer the arena did
 * not hand out always goes back to libc.
 */

use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

use crate::heap::{FALLBACK_ALIGN, emergency_heap, fallback_malloc};

/* malloc's own guarantee on every supported platform */
const MALLOC_ALIGN: usize = 16;

/// malloc, then the emergency arena. Null only if both are exhausted.
#[must_use]
pub fn malloc_with_fallback(size: usize) -> *mut u8 {
    // SAFETY: malloc accepts any size and returns null on failure
    let p = unsafe { libc::malloc(size) }.cast::<u8>();
    if p.is_null() { fallback_malloc(size) } else { p }
}

/// calloc, then the emergency arena zeroed by hand.
///
/// `count * size` overflow returns null without touching either allocator.
#[must_use]
pub fn calloc_with_fallback(count: usize, size: usize) -> *mut u8 {
    let Some(total) = count.checked_mul(size) else {
        return ptr::null_mut();
    };
    // SAFETY: calloc checks the product itself and returns zeroed memory or null
    let p = unsafe { libc::calloc(count, size) }.cast::<u8>();
    if !p.is_null() {
        return p;
    }
    let p = fallback_malloc(total);
    if !p.is_null() {
        /* arena chunks are recycled, not fresh pages */
        // SAFETY: p is valid for at least `total` bytes
        unsafe { ptr::write_bytes(p, 0, total) };
    }
    p
}

/// posix_memalign to [`FALLBACK_ALIGN`], then the emergency arena (which is
/// always that aligned).
#[must_use]
pub fn aligned_malloc_with_fallback(size: usize) -> *mut u8 {
    let size = size.max(1);
    let mut p: *mut libc::c_void = ptr::null_mut();
    // SAFETY: FALLBACK_ALIGN is a power of two and a multiple of
    // size_of::<*mut c_void>(), as posix_memalign requires
    if unsafe { libc::posix_memalign(&raw mut p, FALLBACK_ALIGN, size) } == 0 {
        p.cast::<u8>()
    } else {
        fallback_malloc(size)
    }
}

/// Route a pointer from any of the `*_with_fallback` functions to whoever
/// allocated it.
///
/// # Safety
///
/// `ptr` must be null or come from one of this module's allocation
/// functions (or plain malloc) and not have been freed already.
pub unsafe fn free_with_fallback(ptr: *mut u8) {
    let heap = emergency_heap();
    if heap.owns(ptr) {
        // SAFETY: owns() says the arena handed it out; caller rules out double free
        unsafe { heap.free(ptr) }
    } else {
        // SAFETY: not ours, so it came from libc (free(NULL) is fine)
        unsafe { libc::free(ptr.cast::<libc::c_void>()) }
    }
}

/// Global allocator: libc malloc/free with the emergency arena behind them.
///
/// # Safety
///
/// - Layout invariants (size <= isize::MAX, power-of-two alignment) are
///   upheld by the caller per the GlobalAlloc contract.
/// - The arena is only used for alignments it can honour (<= 16 bytes).
/// - dealloc/realloc decide ownership by address range, so arena and libc
///   pointers never cross.
///
/// Thread safety: libc's allocator is thread-safe; the arena has its own lock.
pub struct FallbackAlloc;

impl FallbackAlloc {
    #[inline]
    fn arena_alloc(layout: Layout) -> *mut u8 {
        if layout.align() > FALLBACK_ALIGN {
            return ptr::null_mut();
        }
        fallback_malloc(layout.size())
    }
}

// SAFETY: all methods follow the GlobalAlloc contract: they return memory
// aligned to layout.align() and valid for layout.size() bytes, or null.
unsafe impl GlobalAlloc for FallbackAlloc {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let p = if layout.align() > MALLOC_ALIGN {
            let mut p: *mut libc::c_void = ptr::null_mut();
            // SAFETY: a power of two alignment above 16 is a multiple of the
            // pointer size, as posix_memalign requires
            if unsafe { libc::posix_memalign(&raw mut p, layout.align(), layout.size()) } == 0 {
                p.cast::<u8>()
            } else {
                ptr::null_mut()
            }
        } else {
            // SAFETY: malloc accepts any size and returns null on failure
            unsafe { libc::malloc(layout.size()) }.cast::<u8>()
        };
        if p.is_null() { Self::arena_alloc(layout) } else { p }
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        // SAFETY: ptr came from alloc/realloc above, so it is either an arena
        // pointer (owns) or a libc one
        unsafe { free_with_fallback(ptr) }
    }

    #[inline]
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let heap = emergency_heap();

        /* realloc(3) only keeps malloc's alignment; over-aligned blocks move */
        if !heap.owns(ptr) && layout.align() <= MALLOC_ALIGN {
            // SAFETY: ptr is a libc allocation; realloc keeps it intact on failure
            let p = unsafe { libc::realloc(ptr.cast::<libc::c_void>(), new_size) }.cast::<u8>();
            if !p.is_null() {
                return p;
            }
        }

        /* arena blocks can't grow in place: move them (or rescue libc's) */
        // SAFETY: layout.align() is unchanged and valid; new_size is bounded by
        // the caller per the GlobalAlloc contract
        let new_layout = unsafe { Layout::from_size_align_unchecked(new_size, layout.align()) };
        // SAFETY: new_layout is a valid layout
        let new = unsafe { self.alloc(new_layout) };
        if !new.is_null() {
            // SAFETY: both regions are valid for the copied length and distinct
            unsafe { ptr::copy_nonoverlapping(ptr, new, layout.size().min(new_size)) };
            // SAFETY: ptr came from this allocator with `layout`, copied out above
            unsafe { self.dealloc(ptr, layout) };
        }
        new
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if layout.align() > MALLOC_ALIGN {
            // SAFETY: forwarded from the caller's valid layout
            let p = unsafe { self.alloc(layout) };
            if !p.is_null() {
                // SAFETY: a fresh block valid for layout.size() bytes
                unsafe { ptr::write_bytes(p, 0, layout.size()) };
            }
            return p;
        }
        // SAFETY: calloc is safe with any count/size
        let p = unsafe { libc::calloc(1, layout.size()) }.cast::<u8>();
        if !p.is_null() {
            return p;
        }
        let p = Self::arena_alloc(layout);
        if !p.is_null() {
            // SAFETY: arena block valid for layout.size() bytes
            unsafe { ptr::write_bytes(p, 0, layout.size()) };
        }
        p
    }
}
