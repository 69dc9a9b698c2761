// Symphonia
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error;
use std::fmt;
use std::result;

use crate::channels::Position;

/// `BufferKind` identifies the buffer that was found to be too small for a mixing operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// The interleaved multichannel source buffer.
    Source,
    /// The interleaved stereo destination buffer.
    Destination,
}

impl BufferKind {
    fn as_str(&self) -> &'static str {
        match *self {
            BufferKind::Source => "source",
            BufferKind::Destination => "destination",
        }
    }
}

/// `Error` provides an enumeration of all possible errors reported by the channel mixer.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The position mask contains one or more channels outside of the supported range. The
    /// unsupported channels are provided.
    UnsupportedPositions(Position),
    /// A mix was attempted before the mixer was configured with an input position mask.
    Unconfigured,
    /// A buffer did not contain enough samples for the requested number of frames.
    BufferTooSmall {
        /// The buffer that was too small.
        kind: BufferKind,
        /// The number of samples the operation required.
        required: usize,
        /// The number of samples in the buffer.
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::UnsupportedPositions(positions) => {
                write!(f, "unsupported channel positions: {:#x}", positions.bits())
            }
            Error::Unconfigured => {
                write!(f, "channel mixer is not configured")
            }
            Error::BufferTooSmall { kind, required, actual } => {
                write!(
                    f,
                    "{} buffer too small: {} samples required, {} available",
                    kind.as_str(),
                    required,
                    actual
                )
            }
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create an unsupported positions error.
pub fn unsupported_error<T>(positions: Position) -> Result<T> {
    Err(Error::UnsupportedPositions(positions))
}

/// Convenience function to create an unconfigured mixer error.
pub fn unconfigured_error<T>() -> Result<T> {
    Err(Error::Unconfigured)
}

/// Convenience function to create a buffer too small error.
pub fn buffer_error<T>(kind: BufferKind, required: usize, actual: usize) -> Result<T> {
    Err(Error::BufferTooSmall { kind, required, actual })
}
