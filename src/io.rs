/*
 * io.rs
 *
 * no_std I/O primitives.
 * direct writes to stdout/stderr via write(2).
 *
 * nothing here may allocate: heap_trace! runs inside the allocator,
 * sometimes precisely because malloc just failed.
 */

use core::fmt::{self, Write};

/* file descriptors */
const STDOUT: i32 = 1;
const STDERR: i32 = 2;

unsafe extern "C" {
    fn write(fd: i32, buf: *const u8, count: usize) -> isize;
}

/* short writes only happen on pipes under pressure; retry the remainder */
fn write_all(fd: i32, mut s: &[u8]) {
    while !s.is_empty() {
        // SAFETY: s is a valid byte slice for s.len() bytes, fd is a std stream
        let n = unsafe { write(fd, s.as_ptr(), s.len()) };
        if n <= 0 {
            /* nowhere to report a failed diagnostic write; drop the rest */
            return;
        }
        s = &s[n as usize..];
    }
}

/// Write bytes to stdout
#[inline]
pub fn write_stdout(s: &[u8]) {
    write_all(STDOUT, s);
}

/// Write bytes to stderr
#[inline]
pub fn write_stderr(s: &[u8]) {
    write_all(STDERR, s);
}

/// A writer that outputs to stderr via direct syscall.
/// Implements core::fmt::Write for use with write!/writeln! macros.
pub struct StderrWriter;

impl Write for StderrWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_stderr(s.as_bytes());
        Ok(())
    }
}

/// A writer that outputs to stdout via direct syscall.
pub struct StdoutWriter;

impl Write for StdoutWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_stdout(s.as_bytes());
        Ok(())
    }
}

/// Print to stderr with newline
#[macro_export]
macro_rules! eprintln {
    () => {{
        $crate::io::write_stderr(b"\n");
    }};
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let _ = write!($crate::io::StderrWriter, $($arg)*);
        $crate::io::write_stderr(b"\n");
    }};
}

/// Print to stdout (no newline)
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let _ = write!($crate::io::StdoutWriter, $($arg)*);
    }};
}

/// Print to stdout with newline
#[macro_export]
macro_rules! println {
    () => {{
        $crate::io::write_stdout(b"\n");
    }};
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let _ = write!($crate::io::StdoutWriter, $($arg)*);
        $crate::io::write_stdout(b"\n");
    }};
}

/* allocator diagnostics, compiled out unless the "trace" feature is on */
#[cfg(feature = "trace")]
macro_rules! heap_trace {
    ($($arg:tt)*) => {{
        $crate::io::write_stderr(b"fallback-heap: ");
        $crate::eprintln!($($arg)*);
    }};
}

#[cfg(not(feature = "trace"))]
macro_rules! heap_trace {
    ($($arg:tt)*) => {{
        if false {
            let _ = format_args!($($arg)*);
        }
    }};
}

pub(crate) use heap_trace;
