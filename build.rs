/*
 * build.rs
 *
 * Build script for fallback-heap.
 * Ensures libc is linked for the no_std heap-probe binary.
 */

fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    /* darwin-only link flags */
    if target_os == "macos" {
        // Link with system libc - required because the release binary is
        // #![no_std], which makes rustc pass -nodefaultlibs to the linker.
        // Without this, malloc, write, pthread_mutex_lock etc. are undefined.
        println!("cargo:rustc-link-lib=c");
        println!("cargo:rustc-link-lib=System");
    }
}
