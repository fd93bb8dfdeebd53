/*
 * error.rs
 *
 * The allocator itself never returns errors: exhaustion is None/null and
 * misuse is undefined behaviour. This is for heap-probe, which replays
 * scripts typed by a human and has to reject bad ones.
 *
 * Exit codes are part of the CLI contract. Scripts depend on them.
 */

use alloc::string::String;
use core::fmt;

/// heap-probe exit codes. don't change these.
pub mod exit_codes {
    /// Script replayed, every allocation succeeded
    pub const SUCCESS: u8 = 0;
    /// Script replayed, at least one allocation found the arena exhausted
    pub const EXHAUSTED: u8 = 1;
    /// Bad flag or bad script, nothing meaningful was replayed
    pub const USAGE: u8 = 2;
}

/* everything that can go wrong before or while replaying a script */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    InvalidOp(String),
    InvalidSize(String),
    UnknownHandle(usize),
    AlreadyFreed(usize), // would be a double free; refused instead of UB
    MissingOps,
    UnknownFlag(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOp(s) => write!(f, "invalid op '{s}' (expected a:<bytes> or f:<handle>)"),
            Self::InvalidSize(s) => write!(f, "invalid number: {s}"),
            Self::UnknownHandle(h) => write!(f, "unknown handle #{h}"),
            Self::AlreadyFreed(h) => write!(f, "handle #{h} already freed"),
            Self::MissingOps => write!(f, "missing ops (try --help)"),
            Self::UnknownFlag(s) => write!(f, "unknown option: {s}"),
        }
    }
}

impl ProbeError {
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidOp(_)
            | Self::InvalidSize(_)
            | Self::UnknownHandle(_)
            | Self::AlreadyFreed(_)
            | Self::MissingOps
            | Self::UnknownFlag(_) => exit_codes::USAGE,
        }
    }
}

pub type Result<T> = core::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_freed_display() {
        let msg = alloc::format!("{}", ProbeError::AlreadyFreed(3));
        assert_eq!(msg, "handle #3 already freed");
    }

    #[test]
    fn test_usage_errors_share_exit_code() {
        for e in [
            ProbeError::MissingOps,
            ProbeError::UnknownHandle(9),
            ProbeError::UnknownFlag("--frob".into()),
        ] {
            assert_eq!(e.exit_code(), exit_codes::USAGE, "{e}");
        }
    }
}
