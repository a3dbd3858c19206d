// Copyright (c) 2025 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! An optional decaying scope buffer ("donut" visualizer), one pixel per input sample.

use crate::error::Error;

/// Number of samples between decay passes.
pub const MONITOR_DECAY_EVERY: usize = 512;

/// Multiplicative decay factor applied to every non-zero pixel each decay pass.
const DECAY_NUMERATOR: u32 = 7;
const DECAY_DENOMINATOR: u32 = 8;

/// A `size x size` byte grid that decays over time, one pixel lit per submitted sample.
#[derive(Debug, Clone)]
pub struct Monitor {
    size: usize,
    buffer: Vec<u8>,
    samples_since_decay: usize,
}

impl Monitor {
    pub fn new(size: usize) -> Result<Self, Error> {
        let pixel_count = size.checked_mul(size).ok_or(Error::OutOfMemory)?;
        Ok(Monitor {
            size,
            buffer: vec![0u8; pixel_count],
            samples_since_decay: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn decay(&mut self) {
        for pixel in self.buffer.iter_mut() {
            *pixel = ((u32::from(*pixel) * DECAY_NUMERATOR) / DECAY_DENOMINATOR) as u8;
        }
    }

    /// Draw one sample, normalized by `ref_level` (or full-scale if unknown), then decay the
    /// buffer every [`MONITOR_DECAY_EVERY`] samples.
    pub fn draw_sample(&mut self, left: i16, right: i16, ref_level: Option<i32>) {
        let scale = match ref_level {
            Some(level) if level > 0 => level as f32,
            _ => f32::from(i16::MAX),
        };

        let half = (self.size / 2) as f32;
        let x = (half - (f32::from(left) / scale) * half).clamp(0.0, (self.size - 1) as f32);
        let y = (half - (f32::from(right) / scale) * half).clamp(0.0, (self.size - 1) as f32);

        let index = (x as usize) * self.size + (y as usize);
        self.buffer[index] = u8::MAX;

        self.samples_since_decay += 1;
        if self.samples_since_decay >= MONITOR_DECAY_EVERY {
            self.decay();
            self.samples_since_decay = 0;
        }
    }
}
