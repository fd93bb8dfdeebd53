/*
 * panic.rs
 *
 * Minimal panic handler for the no_std heap-probe release binary.
 * With panic=abort in Cargo.toml, panics go straight to abort().
 *
 * Only used in release builds without tests. Debug builds and tests use
 * std's panic handler for better error messages.
 */

#[cfg(not(any(debug_assertions, test, doc)))]
use core::panic::PanicInfo;

/// Panic handler - abort without formatting.
///
/// Formatting the message could allocate, and this binary's global
/// allocator may already be running on the emergency arena.
#[cfg(not(any(debug_assertions, test, doc)))]
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    // SAFETY: abort() has no preconditions and never returns.
    unsafe { libc::abort() }
}

/// Personality stub. Some code paths still reference the symbol when
/// linking with panic=abort; unwinding is disabled so it is never called.
#[cfg(not(any(debug_assertions, test, doc)))]
#[unsafe(no_mangle)]
pub extern "C" fn rust_eh_personality() {}
