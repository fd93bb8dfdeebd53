/*
 * sync.rs
 *
 * no_std mutual exclusion for the arena.
 * std::sync::Mutex would pull in std and may itself allocate on some
 * platforms, which is the one thing an out-of-memory path can't do.
 *
 * the guard and the protected value come from lock_api; this module only
 * picks the raw lock, at compile time:
 * - unix: pthread_mutex_t, statically initialized (usable in a `static`)
 * - everything else: spin's SpinMutex
 * - feature "single-threaded": no lock at all, for targets with no threads
 */

#[cfg(all(unix, not(feature = "single-threaded")))]
mod raw {
    use core::cell::UnsafeCell;

    /// pthread mutex. never moved once locked: it lives inside the heap,
    /// which is either a `static` or pinned by its outstanding pointers.
    pub struct RawLock(UnsafeCell<libc::pthread_mutex_t>);

    // SAFETY: pthread mutexes are made to be shared between threads; the
    // cell is only ever handed to pthread_mutex_{lock,trylock,unlock}.
    unsafe impl Sync for RawLock {}

    // SAFETY: an unlocked pthread mutex initialized from the static
    // initializer holds no thread-local state.
    unsafe impl Send for RawLock {}

    // SAFETY: pthread_mutex_lock gives exclusive ownership until the matching
    // unlock, which lock_api only issues from the guard that locked it.
    unsafe impl lock_api::RawMutex for RawLock {
        #[allow(clippy::declare_interior_mutable_const)]
        const INIT: Self = Self(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER));

        /* a pthread mutex must be unlocked by the thread that locked it */
        type GuardMarker = lock_api::GuardNoSend;

        #[inline]
        fn lock(&self) {
            // SAFETY: the mutex was initialized with PTHREAD_MUTEX_INITIALIZER
            // and never moves while locked.
            let rc = unsafe { libc::pthread_mutex_lock(self.0.get()) };
            debug_assert_eq!(rc, 0, "pthread_mutex_lock failed");
        }

        #[inline]
        fn try_lock(&self) -> bool {
            // SAFETY: as for lock()
            unsafe { libc::pthread_mutex_trylock(self.0.get()) == 0 }
        }

        #[inline]
        unsafe fn unlock(&self) {
            // SAFETY: the caller holds the lock on this thread (GuardNoSend).
            let rc = unsafe { libc::pthread_mutex_unlock(self.0.get()) };
            debug_assert_eq!(rc, 0, "pthread_mutex_unlock failed");
        }
    }
}

#[cfg(all(not(unix), not(feature = "single-threaded")))]
mod raw {
    pub type RawLock = spin::mutex::SpinMutex<()>;
}

#[cfg(feature = "single-threaded")]
mod raw {
    /// No-op lock. Only sound when the program never spawns a thread.
    pub struct RawLock;

    // SAFETY: with the single-threaded feature there is exactly one thread,
    // so exclusion holds trivially.
    unsafe impl lock_api::RawMutex for RawLock {
        const INIT: Self = Self;

        type GuardMarker = lock_api::GuardSend;

        #[inline]
        fn lock(&self) {}

        #[inline]
        fn try_lock(&self) -> bool {
            true
        }

        #[inline]
        unsafe fn unlock(&self) {}
    }
}

pub use raw::RawLock;

/// A mutual-exclusion lock that works without std and without allocating.
///
/// `const`-constructible so it can sit inside a `static` heap.
pub type Mutex<T> = lock_api::Mutex<RawLock, T>;

/// Scoped lock. Unlocks on drop, so every return path releases the mutex.
pub type MutexGuard<'a, T> = lock_api::MutexGuard<'a, RawLock, T>;
