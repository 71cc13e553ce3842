//------------ Errors --------------------------------------------------------

use std::fmt;

/// Possible errors returned by query-path methods on the suggestion engine.
///
/// These map directly onto the error kinds described for the system: most
/// are recovered from locally (an empty result, a degraded score) rather
/// than propagated to the caller as a hard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    /// The prefix was empty, or became empty after normalization.
    PrefixInvalid,
    /// The shard is momentarily unavailable, e.g. mid-swap contention or a
    /// lock acquisition timeout. Safe to retry within the same request's
    /// deadline.
    Transient,
    /// The request's deadline was exceeded before a full answer could be
    /// produced. Whatever partial answer existed is still meaningful.
    DeadlineExceeded,
}

impl std::error::Error for QueryError {}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QueryError::PrefixInvalid => {
                write!(f, "Error: the prefix is empty or not normalizable.")
            }
            QueryError::Transient => {
                write!(
                    f,
                    "Error: the shard is temporarily unavailable, retry is safe."
                )
            }
            QueryError::DeadlineExceeded => {
                write!(
                    f,
                    "Warning: the query deadline was exceeded, returning a partial answer."
                )
            }
        }
    }
}

/// Errors that can occur while accepting an ingestion event. Never
/// surfaced to the query path; the pipeline logs these and increments a
/// counter instead of propagating them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    /// The event failed the quality filter (see `aggregation::filter`).
    Rejected(RejectReason),
    /// The delta map's soft cap was exceeded and an entry was evicted to
    /// make room; the incoming event was still accepted.
    Capacity,
}

/// Why an ingested phrase was rejected by the quality filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooShort,
    TooLong,
    OnlyDigits,
    KeyboardSmash,
    EmptyAfterNormalize,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            RejectReason::TooShort => "phrase shorter than 2 characters",
            RejectReason::TooLong => "phrase longer than 100 characters",
            RejectReason::OnlyDigits => "phrase is purely digits",
            RejectReason::KeyboardSmash => "phrase looks like a keyboard smash",
            RejectReason::EmptyAfterNormalize => "phrase is empty after normalization",
        };
        write!(f, "{}", msg)
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IngestError::Rejected(reason) => {
                write!(f, "Error: event rejected, {}.", reason)
            }
            IngestError::Capacity => {
                write!(f, "Warning: delta map soft cap reached, oldest entries evicted.")
            }
        }
    }
}

impl std::error::Error for IngestError {}

/// Errors from the offline/periodic rebuild path (C7). A `Fatal` error
/// never touches the currently-published generation; the previous one
/// stays live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The snapshot could not be parsed or its checksum did not match.
    SnapshotInvalid(String),
    /// The builder ran out of memory, or some other unrecoverable
    /// condition occurred mid-build. The store must keep serving the
    /// previous generation; the caller should alert and retry later.
    Fatal(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::SnapshotInvalid(msg) => {
                write!(f, "Error: snapshot is invalid: {}", msg)
            }
            BuildError::Fatal(msg) => {
                write!(f, "Fatal: rebuild aborted, previous generation remains live: {}", msg)
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// A signal provider (trending, personalization) was unavailable during
/// ranking. This is not an error in the ordinary sense: it is recorded so
/// a caller _could_ surface a degraded-mode metric, but ranking proceeds
/// with the corresponding term at zero weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degraded {
    pub signal: &'static str,
}

impl fmt::Display for Degraded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Degraded: signal '{}' unavailable, scored as 0.", self.signal)
    }
}
