/*
 * main.rs
 *
 * heap-probe: replay an allocate/free script against a fresh arena and
 * print the free list. Parse args, replay, format. Boring on purpose; the
 * interesting stuff is in heap.rs.
 *
 * --json is for CI. Format is stable, don't change field names.
 */

#![cfg_attr(not(any(debug_assertions, test, doc)), no_std)]
#![cfg_attr(not(any(debug_assertions, test, doc)), no_main)]

mod panic;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as FmtWrite;

use fallback_heap::args::{USAGE, get_env, parse_args};
use fallback_heap::error::{ProbeError, exit_codes};
use fallback_heap::heap::{Chunk, EMERGENCY_HEAP_BYTES, FallbackHeap};
use fallback_heap::probe::{Outcome, Report, parse_ops, replay};
use fallback_heap::{eprintln, print, println};

/* import alloc crate in no_std mode */
#[cfg(not(any(debug_assertions, test, doc)))]
extern crate alloc;

/* in debug/test mode, use std's alloc */
#[cfg(any(debug_assertions, test, doc))]
use std as alloc;

/* the binary eats its own cooking: malloc first, emergency arena second */
#[cfg(not(any(debug_assertions, test, doc)))]
#[global_allocator]
static ALLOCATOR: fallback_heap::FallbackAlloc = fallback_heap::FallbackAlloc;

/* separate from the process-wide emergency arena so the allocator above
 * can't disturb the script's view */
static PROBE_HEAP: FallbackHeap<EMERGENCY_HEAP_BYTES> = FallbackHeap::new();

const SCHEMA_VERSION: u8 = 1;

/* release build entry point - C ABI */
#[cfg(not(any(debug_assertions, test, doc)))]
#[unsafe(no_mangle)]
pub extern "C" fn main(argc: i32, argv: *const *const core::ffi::c_char) -> i32 {
    let mut args = Vec::new();
    for i in 1..usize::try_from(argc).unwrap_or(0) {
        // SAFETY: the C runtime passes argc valid NUL-terminated strings
        let arg = unsafe { core::ffi::CStr::from_ptr(*argv.add(i)) };
        args.push(String::from_utf8_lossy(arg.to_bytes()).into_owned());
    }
    i32::from(run_main(args))
}

/* debug/test builds use standard Rust entry point */
#[cfg(any(debug_assertions, test, doc))]
fn main() {
    std::process::exit(i32::from(run_main(std::env::args().skip(1).collect())));
}

/* shared implementation */
fn run_main(raw_args: Vec<String>) -> u8 {
    let format_env = get_env(c"HEAP_PROBE_FORMAT");
    let args = match parse_args(&raw_args, format_env.as_deref()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("heap-probe: {}", e);
            return e.exit_code();
        }
    };

    if args.help {
        println!("{}", USAGE);
        return exit_codes::SUCCESS;
    }
    if args.version {
        println!("heap-probe {}", env!("CARGO_PKG_VERSION"));
        return exit_codes::SUCCESS;
    }

    let report = match parse_ops(&args.ops).and_then(|ops| replay(&PROBE_HEAP, &ops)) {
        Ok(report) => report,
        Err(e) => {
            if args.json {
                print_json_error(&e);
            } else {
                eprintln!("heap-probe: {}", e);
            }
            return e.exit_code();
        }
    };

    if args.json {
        print_json_report(&report);
    } else {
        print_text_report(&report, args.quiet);
    }

    if report.exhausted() > 0 {
        exit_codes::EXHAUSTED
    } else {
        exit_codes::SUCCESS
    }
}

fn print_text_report(report: &Report, quiet: bool) {
    if !quiet {
        for outcome in &report.outcomes {
            match *outcome {
                Outcome::Allocated { handle, requested, chunk } => println!(
                    "a:{} -> #{} offset={} len={}",
                    requested, handle, chunk.offset, chunk.len
                ),
                Outcome::Exhausted { handle, requested } => {
                    println!("a:{} -> #{} exhausted", requested, handle);
                }
                Outcome::Freed { handle, chunk } => println!(
                    "f:{} -> freed offset={} len={}",
                    handle, chunk.offset, chunk.len
                ),
                Outcome::FreedNull { handle } => println!("f:{} -> null, ignored", handle),
            }
        }
    }

    print!("free list:");
    if report.free_list.is_empty() {
        print!(" (empty)");
    }
    for chunk in &report.free_list {
        print!(" [{}..{})", chunk.offset, chunk.end());
    }
    println!();
    println!(
        "free: {} bytes in {} chunk(s), largest {}",
        report.stats.free_bytes, report.stats.free_chunks, report.stats.largest_free
    );
}

fn print_json_report(report: &Report) {
    let mut json = String::with_capacity(256);
    let _ = write!(
        json,
        r#"{{"schema_version":{},"status":"ok","arena_bytes":{},"ops":["#,
        SCHEMA_VERSION, report.arena_bytes
    );

    for (i, outcome) in report.outcomes.iter().enumerate() {
        if i > 0 {
            json.push(',');
        }
        let _ = match *outcome {
            Outcome::Allocated { handle, requested, chunk } => write!(
                json,
                r#"{{"op":"alloc","handle":{},"requested":{},"status":"allocated","offset":{},"len":{}}}"#,
                handle, requested, chunk.offset, chunk.len
            ),
            Outcome::Exhausted { handle, requested } => write!(
                json,
                r#"{{"op":"alloc","handle":{},"requested":{},"status":"exhausted"}}"#,
                handle, requested
            ),
            Outcome::Freed { handle, chunk } => write!(
                json,
                r#"{{"op":"free","handle":{},"status":"freed","offset":{},"len":{}}}"#,
                handle, chunk.offset, chunk.len
            ),
            Outcome::FreedNull { handle } => write!(
                json,
                r#"{{"op":"free","handle":{},"status":"null"}}"#,
                handle
            ),
        };
    }

    json.push_str(r#"],"free_chunks":["#);
    write_chunks(&mut json, &report.free_list);
    let _ = write!(
        json,
        r#"],"free_bytes":{},"largest_free":{},"exhausted":{}}}"#,
        report.stats.free_bytes,
        report.stats.largest_free,
        report.exhausted()
    );
    println!("{}", json);
}

fn write_chunks(json: &mut String, chunks: &[Chunk]) {
    for (i, c) in chunks.iter().enumerate() {
        if i > 0 {
            json.push(',');
        }
        let _ = write!(json, r#"{{"offset":{},"len":{}}}"#, c.offset, c.len);
    }
}

fn print_json_error(err: &ProbeError) {
    println!(
        r#"{{"schema_version":{},"status":"error","error":"{}","exit_code":{}}}"#,
        SCHEMA_VERSION,
        escape_json_string(&alloc::format!("{}", err)),
        err.exit_code()
    );
}

/* escape string for JSON - handles quotes, backslashes, control chars */
fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            c if c < '\x20' => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}
