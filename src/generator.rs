use crate::format::TimecodeDef;
use crate::lfsr::{fwd, rev};

/// Synthesizes stereo PCM encoding a timecode variant's LFSR bitstream from its seed.
///
/// Used to build test fixtures and by the `demos/generate` example; not part of the decoder's
/// real-time path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimecodeAudioGenerator {
    def: &'static TimecodeDef,
    state: u32,
    sample_rate_hz: f64,
    previous_bit: bool,
    cycle_index: i32,
    index: i32,
}

impl TimecodeAudioGenerator {
    pub fn new(def: &'static TimecodeDef, sample_rate_hz: f64) -> Self {
        let previous_state = rev(def.bits, def.seed, def.taps);
        let previous_bit = (previous_state >> (def.bits - 2)) & 1 == 1;
        debug_assert_eq!(fwd(def.bits, previous_state, def.taps), def.seed);

        Self {
            def,
            state: def.seed,
            sample_rate_hz,
            cycle_index: 0,
            previous_bit,
            index: 0,
        }
    }

    const SCALE_FACTOR_ZERO: f64 = 0.75;

    fn scale_sample(sample: f64) -> i16 {
        let sample = sample * (i16::MAX as f64) * 0.5;
        sample.round().trunc() as i16
    }

    fn sample_from_cycle(cycle: f64, left_bit: bool, right_bit: bool) -> (f64, f64) {
        let angle = 2.0 * std::f64::consts::PI * cycle;
        let (mut left, mut right) = angle.sin_cos();

        if !left_bit {
            left *= Self::SCALE_FACTOR_ZERO;
        }
        if !right_bit {
            right *= Self::SCALE_FACTOR_ZERO;
        }

        (left, right)
    }

    /// Produce the next stereo sample pair `(left, right)`.
    pub fn next_sample(&mut self) -> (i16, i16) {
        let index = f64::from(self.index);

        let cycle = (index * f64::from(self.def.resolution)) / self.sample_rate_hz;
        let cycle_index = cycle.trunc() as i32;
        let cycle_position = cycle - f64::from(cycle_index);

        if cycle_index == self.cycle_index && cycle_position >= 0.75 {
            self.cycle_index = cycle_index + 1;
            self.previous_bit = (self.state >> (self.def.bits - 1)) & 1 == 1;
            self.state = fwd(self.def.bits, self.state, self.def.taps);
        }

        let right_bit = (self.state >> (self.def.bits - 1)) == 1;
        let left_bit = if cycle_position >= 0.75 {
            self.previous_bit
        } else {
            right_bit
        };

        let (mut left_sample, mut right_sample) =
            Self::sample_from_cycle(cycle, left_bit, right_bit);

        if cycle < 1.0 {
            left_sample *= cycle;
            right_sample *= cycle;
        }

        let left_sample = Self::scale_sample(left_sample);
        let right_sample = Self::scale_sample(right_sample);

        self.index += 1;
        (left_sample, right_sample)
    }

    /// Current LFSR state (the state that was, or is about to be, encoded).
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Time-reverse a stereo PCM buffer and swap its channels.
///
/// Playing a pressed timecode backwards doesn't just replay the samples in reverse order: the two
/// channels' phase relationship flips too, so the channel that led in forward playback trails in
/// reverse. Swapping L/R alongside the reversal produces the fixture §8's reverse-playback
/// scenario describes ("same signal time-reversed and with right leading left").
pub fn reverse_buffer(pcm: &[i16]) -> Vec<i16> {
    let mut reversed = Vec::with_capacity(pcm.len());
    for frame in pcm.chunks_exact(2).rev() {
        reversed.push(frame[1]);
        reversed.push(frame[0]);
    }
    reversed
}
