// Copyright (c) 2025 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The crate's error type.

use std::error::Error as StdError;
use std::fmt;

/// Errors that can occur while building a lookup table or allocating a monitor buffer.
///
/// `submit` and the read accessors never return an error: malformed audio simply fails to
/// validate, which is reported as `None` rather than as an `Error` (see [`crate::Decoder`]).
#[derive(Debug)]
pub enum Error {
    /// `build_lookup` was asked for a variant name that isn't in the registry.
    UnknownVariant(String),
    /// The configured `length` exceeds the cycle the LFSR actually produces from its seed and
    /// taps, or the reverse LFSR does not invert the forward one at the seed.
    LfsrWrapped,
    /// A lookup or monitor buffer allocation could not be satisfied.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownVariant(name) => write!(f, "unknown timecode variant: {name}"),
            Error::LfsrWrapped => {
                write!(f, "LFSR wrapped before covering the configured cycle length")
            }
            Error::OutOfMemory => write!(f, "allocation failed"),
        }
    }
}

impl StdError for Error {}
