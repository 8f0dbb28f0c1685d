//! Error types
//!
//! Every adapter failure is handed back to the caller as an [`Error`]. The
//! transport never aborts on its own; retrying, switching channel or giving
//! up is the caller's decision.

use core::fmt::{self, Debug};

/// Direction of a failed bus transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
    /// Full-duplex single byte exchange
    Duplex,
}

/// Errors reported by [`Transport`](crate::Transport).
///
/// Generic over the adapter error so callers can match on the underlying
/// hardware failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    /// The requested channel index is not below the number of channels the
    /// adapter enumerated.
    ChannelUnavailable {
        /// Channel that was asked for
        channel: u32,
        /// Channels the adapter reported
        available: u32,
    },
    /// The adapter refused to enumerate or open the channel.
    OpenFailed(E),
    /// The adapter failed to close the channel.
    CloseFailed(E),
    /// The adapter rejected the bus parameters or a pause request.
    ConfigFailed(E),
    /// A write or read did not move the requested number of bytes.
    ///
    /// `source` is `None` when the adapter call succeeded but reported a
    /// short count.
    TransferFailed {
        direction: Direction,
        requested: usize,
        actual: usize,
        source: Option<E>,
    },
    /// Driving or remapping the select line failed.
    Select(E),
    /// The operation needs an open channel; call
    /// [`Transport::begin`](crate::Transport::begin) first.
    NotOpen,
}

impl<E> Error<E> {
    pub(crate) fn transfer(
        direction: Direction,
        requested: usize,
        result: Result<usize, E>,
    ) -> Result<(), Self> {
        match result {
            Ok(actual) if actual == requested => Ok(()),
            Ok(actual) => Err(Error::TransferFailed {
                direction,
                requested,
                actual,
                source: None,
            }),
            Err(e) => Err(Error::TransferFailed {
                direction,
                requested,
                actual: 0,
                source: Some(e),
            }),
        }
    }
}

impl<E: Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ChannelUnavailable { channel, available } => write!(
                f,
                "Channel {channel} not available (adapter has {available})"
            ),
            Error::OpenFailed(e) => write!(f, "Failed to open channel: {e:?}"),
            Error::CloseFailed(e) => write!(f, "Failed to close channel: {e:?}"),
            Error::ConfigFailed(e) => write!(f, "Failed to configure bus: {e:?}"),
            Error::TransferFailed {
                direction,
                requested,
                actual,
                source,
            } => {
                let dir = match direction {
                    Direction::Write => "write",
                    Direction::Read => "read",
                    Direction::Duplex => "transfer",
                };
                write!(f, "Bus {dir} moved {actual} of {requested} bytes")?;
                if let Some(e) = source {
                    write!(f, ": {e:?}")?;
                }
                Ok(())
            }
            Error::Select(e) => write!(f, "Select line error: {e:?}"),
            Error::NotOpen => write!(f, "No channel open"),
        }
    }
}

impl<E: Debug> core::error::Error for Error<E> {}

/// Errors that can occur when building a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// Clock rate of 0 Hz
    InvalidClockRate,
    /// Latency timer of 0 ms
    InvalidLatencyTimer,
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::InvalidClockRate => write!(f, "Clock rate must be non-zero"),
            BuilderError::InvalidLatencyTimer => write!(f, "Latency timer must be non-zero"),
        }
    }
}

impl core::error::Error for BuilderError {}
