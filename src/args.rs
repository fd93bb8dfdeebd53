/*
 * args.rs
 *
 * Hand-rolled flag parsing for heap-probe. The release binary is no_std,
 * so clap is out; there are four flags, so it doesn't matter.
 *
 * Everything that isn't a flag is an op. `--` ends flag parsing.
 * HEAP_PROBE_FORMAT=json is the env fallback for --json, for CI.
 */

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::ffi::CStr;

use crate::error::{ProbeError, Result};

pub const USAGE: &str = "\
Usage: heap-probe [OPTIONS] [--] OP...

Replay an allocate/free script against a fresh 512-byte fallback arena
and print what the allocator did.

Ops:
  a:<bytes>    allocate <bytes> (handles are numbered from 0)
  f:<handle>   free a previous allocation

Options:
      --json     print a single JSON object (also HEAP_PROBE_FORMAT=json)
  -q, --quiet    only print the final free list
  -h, --help     print this help
  -V, --version  print version

Exit status:
  0 if every allocation succeeded
  1 if at least one allocation found the arena exhausted
  2 on a bad option or script";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProbeArgs {
    pub json: bool,
    pub quiet: bool,
    pub help: bool,
    pub version: bool,
    pub ops: Vec<String>,
}

/// Parse arguments (without argv[0]).
///
/// `format_env` is the value of HEAP_PROBE_FORMAT, if set.
pub fn parse_args<I, S>(args: I, format_env: Option<&str>) -> Result<ProbeArgs>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ProbeArgs {
        json: format_env.is_some_and(|f| f.eq_ignore_ascii_case("json")),
        ..ProbeArgs::default()
    };
    let mut flags_done = false;

    for arg in args {
        let arg = arg.as_ref();
        if flags_done || !arg.starts_with('-') {
            parsed.ops.push(arg.to_string());
            continue;
        }
        match arg {
            "--" => flags_done = true,
            "--json" => parsed.json = true,
            "-q" | "--quiet" => parsed.quiet = true,
            "-h" | "--help" => parsed.help = true,
            "-V" | "--version" => parsed.version = true,
            _ => return Err(ProbeError::UnknownFlag(arg.to_string())),
        }
    }

    if parsed.ops.is_empty() && !parsed.help && !parsed.version {
        return Err(ProbeError::MissingOps);
    }
    Ok(parsed)
}

/// Read an environment variable without std.
#[must_use]
pub fn get_env(name: &CStr) -> Option<String> {
    // SAFETY: name is NUL-terminated; getenv returns null or a pointer to a
    // NUL-terminated string owned by the environment, copied out immediately
    let value = unsafe { libc::getenv(name.as_ptr()) };
    if value.is_null() {
        return None;
    }
    // SAFETY: non-null getenv result is a valid C string
    let value = unsafe { CStr::from_ptr(value) };
    value.to_str().ok().map(ToString::to_string)
}
