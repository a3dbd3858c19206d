// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signed zero-crossing based pitch (playback speed and direction) estimator.

/// Accumulates signed mono zero-crossings and the samples elapsed between them, producing a
/// fractional playback-speed estimate on read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimator {
    crossings: i32,
    pitch_ticker: u32,
}

impl PitchEstimator {
    pub fn new() -> Self {
        PitchEstimator {
            crossings: 0,
            pitch_ticker: 0,
        }
    }

    /// Record one mono zero-crossing, signed by playback direction.
    pub fn record_crossing(&mut self, forwards: bool) {
        self.crossings += if forwards { 1 } else { -1 };
    }

    /// Accumulate samples elapsed since the previous mono crossing.
    pub fn add_ticks(&mut self, ticks: u32) {
        self.pitch_ticker += ticks;
    }

    /// Return the estimated fractional playback speed (1.0 = nominal, negative = reverse) and
    /// reset the accumulators. Returns `None` if no crossings have been recorded since the last
    /// read.
    pub fn read(&mut self, rate: u32, resolution: u32) -> Option<f32> {
        if self.crossings == 0 {
            return None;
        }

        let pitch = (rate as f32 * self.crossings as f32)
            / (self.pitch_ticker as f32 * resolution as f32 * 2.0);

        self.crossings = 0;
        self.pitch_ticker = 0;

        Some(pitch)
    }
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self::new()
    }
}
