// Status codes and callback contract shared by every scanner in the crate.
//
// The numeric values are a wire contract with enclosing engines and must not
// change: they match Hyperscan's `hwlm_error_t` / `hwlmcb_rv_t` bit for bit.

use thiserror::Error;

/// Longest literal the Noodle matcher accepts, in bytes.
///
/// Longer literals are expected to be truncated by the caller before the
/// table is built (an enclosing engine confirms the tail separately).
pub const LITERAL_MAX_LEN: usize = 8;

/// Result of a scan that reports matches through a callback.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwlmStatus {
    /// The scan ran to the end of the buffer.
    Success = 0,
    /// The callback asked for matching to stop.
    Terminated = 1,
    /// Internal error.
    ErrorUnknown = 2,
    /// The literal exceeded [`LITERAL_MAX_LEN`].
    LiteralTooLong = 3,
}

/// Verdict returned by a match callback.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Keep scanning.
    Continue = 0,
    /// Stop the scan; the scanner returns [`HwlmStatus::Terminated`].
    Terminate = 1,
}

/// Match callback: `(end_offset, id)` for every match, in ascending
/// end-offset order. Any per-scan context (a match accumulator, a scratch
/// structure) lives in the closure's captures.
pub type HwlmCallback<'a> = &'a mut (dyn FnMut(usize, u32) -> MatchOutcome + 'a);

/// Builder errors. Scanners themselves never fail; only table construction
/// can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("literal is empty")]
    EmptyLiteral,
    #[error("literal of {0} bytes exceeds the 8 byte cap")]
    LiteralTooLong(usize),
}

impl Error {
    /// The wire status corresponding to this error.
    pub fn status(&self) -> HwlmStatus {
        match self {
            Error::EmptyLiteral => HwlmStatus::ErrorUnknown,
            Error::LiteralTooLong(_) => HwlmStatus::LiteralTooLong,
        }
    }
}
