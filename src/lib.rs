// Copyright (c) 2025 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Real-time decoding of pre-mastered LFSR timecode signals used by digital DJ control
//! vinyl/CD systems (Serato, Traktor) to recover absolute playback position and pitch from
//! stereo PCM audio.

// FIXME: Enable missing_docs
//#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(broken_intra_doc_links)]
#![cfg_attr(test, deny(warnings))]

mod bits;
mod channel;
mod decoder;
mod error;
mod format;
mod generator;
mod lfsr;
mod lookup;
mod monitor;
mod pitch;

pub use decoder::{Decoder, REF_PEAKS_AVG, SIGNAL_RC, SIGNAL_THRESHOLD, VALID_BITS};
pub use error::Error;
pub use format::{Polarity, TimecodeDef, REGISTRY, SERATO_2A, SERATO_2B, SERATO_CD, TRAKTOR_A, TRAKTOR_B};
pub use generator::TimecodeAudioGenerator;
pub use lookup::{build_lookup, Lookup};
pub use monitor::Monitor;
