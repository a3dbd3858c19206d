// Copyright (c) 2025 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The decoder façade: wave/bit state machine, error-checked bitstream, pitch and liveness.

use crate::bits;
use crate::channel::{self, ChannelState, ZERO_RC};
use crate::error::Error;
use crate::format::Polarity;
use crate::lfsr::{fwd, rev};
use crate::lookup::Lookup;
use crate::monitor::Monitor;
use crate::pitch::PitchEstimator;
use std::sync::Arc;

/// Fixed 16-bit-PCM level the rectified mono signal must stay above to be considered "alive".
pub const SIGNAL_THRESHOLD: i32 = 256;

/// Time constant of the signal-liveness low-pass filter.
pub const SIGNAL_RC: f64 = 0.004;

/// Number of recent full cycles averaged into the amplitude reference level.
pub const REF_PEAKS_AVG: i32 = 48;

/// Consecutive matching bits required before a position is trusted.
pub const VALID_BITS: u32 = 24;

/// Recovers an absolute playback position and instantaneous pitch from a stereo PCM stream
/// carrying a pre-mastered LFSR timecode.
///
/// One `Decoder` is bound to a single [`Lookup`] (shared read-only with any other decoder using
/// the same variant) and owns all per-stream state. It is not thread-safe: callers using a
/// decoder from multiple threads must serialize externally.
pub struct Decoder {
    lookup: Arc<Lookup>,

    left: ChannelState,
    right: ChannelState,
    mono: ChannelState,

    forwards: bool,
    wave_peak: i32,
    half_peak: i32,
    ref_level: Option<i32>,
    signal_level: f64,

    pitch: PitchEstimator,

    bitstream: u32,
    timecode: u32,
    valid_counter: u32,
    timecode_ticker: u32,

    rate: u32,
    zero_alpha: f64,
    signal_alpha: f64,

    monitor: Option<Monitor>,
    bit_observer: Option<Box<dyn FnMut(bool)>>,
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("lookup", &self.lookup.name())
            .field("left", &self.left)
            .field("right", &self.right)
            .field("mono", &self.mono)
            .field("forwards", &self.forwards)
            .field("wave_peak", &self.wave_peak)
            .field("half_peak", &self.half_peak)
            .field("ref_level", &self.ref_level)
            .field("signal_level", &self.signal_level)
            .field("pitch", &self.pitch)
            .field("bitstream", &self.bitstream)
            .field("timecode", &self.timecode)
            .field("valid_counter", &self.valid_counter)
            .field("timecode_ticker", &self.timecode_ticker)
            .field("rate", &self.rate)
            .field("monitor", &self.monitor)
            .field("has_bit_observer", &self.bit_observer.is_some())
            .finish()
    }
}

impl Decoder {
    /// Create a decoder bound to `lookup`. Multiple decoders may share the same `Lookup`.
    pub fn new(lookup: Arc<Lookup>) -> Self {
        Decoder {
            lookup,
            left: ChannelState::new(),
            right: ChannelState::new(),
            mono: ChannelState::new(),
            forwards: true,
            wave_peak: 0,
            half_peak: 0,
            ref_level: None,
            signal_level: 0.0,
            pitch: PitchEstimator::new(),
            bitstream: 0,
            timecode: 0,
            valid_counter: 0,
            timecode_ticker: 0,
            rate: 0,
            zero_alpha: 0.0,
            signal_alpha: 0.0,
            monitor: None,
            bit_observer: None,
        }
    }

    /// Reset all per-stream state as if the decoder had just been created, keeping the bound
    /// variant and monitor.
    pub fn clear(&mut self) {
        self.left = ChannelState::new();
        self.right = ChannelState::new();
        self.mono = ChannelState::new();
        self.forwards = true;
        self.wave_peak = 0;
        self.half_peak = 0;
        self.ref_level = None;
        self.signal_level = 0.0;
        self.pitch = PitchEstimator::new();
        self.bitstream = 0;
        self.timecode = 0;
        self.valid_counter = 0;
        self.timecode_ticker = 0;
    }

    /// Allocate a `size x size` decaying scope buffer, fed one pixel per submitted sample.
    pub fn monitor_init(&mut self, size: usize) -> Result<(), Error> {
        match Monitor::new(size) {
            Ok(monitor) => {
                self.monitor = Some(monitor);
                Ok(())
            }
            Err(err) => {
                log::warn!("refusing to attach {size}x{size} monitor: {err}");
                Err(err)
            }
        }
    }

    /// Drop the scope buffer, if any.
    pub fn monitor_clear(&mut self) {
        self.monitor = None;
    }

    /// Borrow the scope buffer's current pixels, if a monitor is attached.
    pub fn monitor_buffer(&self) -> Option<&[u8]> {
        self.monitor.as_ref().map(Monitor::buffer)
    }

    /// Install a callback invoked with every emitted bit, in emission order.
    ///
    /// This is the pluggable replacement for a blocking per-bit bitlog file write: the core never
    /// performs I/O itself.
    pub fn set_bit_observer(&mut self, observer: impl FnMut(bool) + 'static) {
        self.bit_observer = Some(Box::new(observer));
    }

    /// Remove any installed bit observer.
    pub fn clear_bit_observer(&mut self) {
        self.bit_observer = None;
    }

    /// Feed `samples` interleaved stereo sample pairs (`pcm.len() == 2 * samples`) at `rate` Hz.
    ///
    /// Strictly `O(samples)`, no allocation. Splitting one buffer into multiple `submit` calls
    /// yields identical results to submitting it whole.
    ///
    /// The `Result` exists to satisfy the external-interface contract: `submit` cannot itself
    /// fail, since malformed audio simply fails to validate rather than erroring (see
    /// [`crate::Error`]).
    pub fn submit(
        &mut self,
        pcm: &[i16],
        samples: usize,
        rate: u32,
    ) -> Result<(), std::convert::Infallible> {
        assert!(pcm.len() >= 2 * samples, "pcm buffer shorter than declared sample count");

        self.rate = rate;
        self.zero_alpha = channel::smoothing_factor(ZERO_RC, rate);
        self.signal_alpha = channel::smoothing_factor(SIGNAL_RC, rate);

        for i in 0..samples {
            let left_raw = pcm[2 * i];
            let right_raw = pcm[2 * i + 1];
            self.process_sample(left_raw, right_raw);
        }

        Ok(())
    }

    fn process_sample(&mut self, left_raw: i16, right_raw: i16) {
        let left_sample = i32::from(left_raw);
        let right_sample = i32::from(right_raw);
        let mono_sample = left_sample + right_sample;

        log::trace!("sample left={left_sample} right={right_sample} mono={mono_sample}");

        self.left.process(left_sample, self.zero_alpha);
        self.right.process(right_sample, self.zero_alpha);
        let (mono_crossed, mono_ticker) = self.mono.process(mono_sample, self.zero_alpha);

        let deviation = (mono_sample - self.mono.zero()).abs();
        self.wave_peak = self.wave_peak.max(deviation);
        self.signal_level += self.signal_alpha * (f64::from(deviation) - self.signal_level);
        self.timecode_ticker += 1;

        if mono_crossed {
            self.handle_mono_crossing(mono_ticker);
        }

        if let Some(monitor) = self.monitor.as_mut() {
            monitor.draw_sample(left_raw, right_raw, self.ref_level);
        }
    }

    fn handle_mono_crossing(&mut self, mono_ticker: u32) {
        let polarity_positive = self.lookup.polarity() == Polarity::Positive;
        let half_cycle = self.mono.is_positive() == (polarity_positive ^ self.forwards);

        if half_cycle {
            self.half_peak = self.wave_peak;
        } else {
            let amplitude = self.wave_peak + self.half_peak;
            let bit = match self.ref_level {
                None => false,
                Some(ref_level) => amplitude > ref_level,
            };

            self.emit_bit(bit);

            if self.ref_level.is_none() {
                log::debug!("reference level bootstrapped from first full cycle: {amplitude}");
            }

            self.ref_level = Some(match self.ref_level {
                None => amplitude,
                Some(level) => (level * (REF_PEAKS_AVG - 1) + amplitude) / REF_PEAKS_AVG,
            });

            if let Some(observer) = self.bit_observer.as_mut() {
                observer(bit);
            }
        }

        // Direction decision: whichever channel has been tracking longer since its own last
        // crossing led the phase, and therefore indicates which way the record is moving.
        let forwards = self.left.crossing_ticker() > self.right.crossing_ticker();
        if forwards != self.forwards {
            log::debug!("direction changed: forwards={forwards}");
        }
        self.forwards = forwards;
        self.pitch.record_crossing(forwards);
        self.pitch.add_ticks(mono_ticker);

        self.wave_peak = 0;
    }

    fn emit_bit(&mut self, bit: bool) {
        let bits = self.lookup.bits();
        let taps = self.lookup.taps();
        let b = u32::from(bit);

        if self.forwards {
            self.timecode = fwd(bits, self.timecode, taps);
            self.bitstream = bits::insert_msb(bits, self.bitstream, b);
        } else {
            self.timecode = rev(bits, self.timecode, taps);
            self.bitstream = bits::insert_lsb(bits, self.bitstream, b);
        }

        if self.timecode == self.bitstream {
            self.valid_counter += 1;
        } else {
            self.timecode = self.bitstream;
            self.valid_counter = 0;
        }

        self.timecode_ticker = 0;
    }

    /// Resolve the current bitstream to an absolute position, if enough consecutive bits have
    /// validated. Returns the cycle index and the seconds elapsed since that value was current.
    pub fn get_position(&self) -> Option<(i32, f32)> {
        if self.valid_counter <= VALID_BITS {
            return None;
        }

        let cycle = self.lookup.get(self.bitstream)?;
        let seconds_since_read = if self.rate == 0 {
            0.0
        } else {
            self.timecode_ticker as f32 / self.rate as f32
        };

        Some((cycle as i32, seconds_since_read))
    }

    /// Read and reset the pitch accumulator. `None` if no crossings were observed since the last
    /// read (or ever).
    pub fn get_pitch(&mut self) -> Option<f32> {
        self.pitch.read(self.rate, self.lookup.resolution())
    }

    /// Whether the signal level indicates a record is actually playing.
    pub fn get_alive(&self) -> bool {
        self.signal_level >= f64::from(SIGNAL_THRESHOLD)
    }

    /// Largest cycle index past which the needle is on the record label.
    pub fn get_safe(&self) -> u32 {
        self.lookup.safe()
    }

    /// Wave cycles per second of audio at nominal playback speed.
    pub fn get_resolution(&self) -> u32 {
        self.lookup.resolution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{SERATO_2A, TRAKTOR_A};
    use crate::generator::{reverse_buffer, TimecodeAudioGenerator};
    use crate::lookup::build_lookup;

    fn serato_lookup() -> Arc<Lookup> {
        build_lookup("serato_2a").expect("serato_2a should build")
    }

    #[test]
    fn test_silent_stream_is_not_alive_and_unresolved() {
        let lookup = serato_lookup();
        let mut decoder = Decoder::new(lookup);

        let pcm = vec![0i16; 2 * 44100];
        decoder.submit(&pcm, 44100, 44100).unwrap();

        assert!(!decoder.get_alive());
        assert_eq!(decoder.get_position(), None);
        assert_eq!(decoder.get_pitch(), None);
    }

    #[test]
    fn test_bitstream_and_timecode_stay_within_bit_width() {
        let lookup = serato_lookup();
        let mut decoder = Decoder::new(lookup);
        let mut generator = TimecodeAudioGenerator::new(&SERATO_2A, 44100.0);

        let mut pcm = Vec::with_capacity(2 * 44100);
        for _ in 0..44100 {
            let (l, r) = generator.next_sample();
            pcm.push(l);
            pcm.push(r);
        }
        decoder.submit(&pcm, 44100, 44100).unwrap();

        let mask = bits::mask(SERATO_2A.bits);
        assert_eq!(decoder.bitstream & !mask, 0);
        assert_eq!(decoder.timecode & !mask, 0);
    }

    #[test]
    fn test_nominal_forward_play_resolves_a_position() {
        let lookup = serato_lookup();
        let mut decoder = Decoder::new(lookup);
        let mut generator = TimecodeAudioGenerator::new(&SERATO_2A, 44100.0);

        let total_samples = 2 * 44100;
        let mut pcm = Vec::with_capacity(2 * total_samples);
        for _ in 0..total_samples {
            let (l, r) = generator.next_sample();
            pcm.push(l);
            pcm.push(r);
        }

        decoder.submit(&pcm, total_samples, 44100).unwrap();

        assert!(decoder.get_alive());
        let position = decoder.get_position();
        assert!(position.is_some(), "expected a resolved position after 2s of signal");

        let pitch = decoder.get_pitch().expect("pitch should be available");
        assert!((pitch - 1.0).abs() < 0.1, "pitch was {pitch}");
    }

    #[test]
    fn test_reverse_play_yields_negative_pitch_and_decreasing_position() {
        let mut generator = TimecodeAudioGenerator::new(&SERATO_2A, 44100.0);
        let total_samples = 4 * 44100;
        let mut pcm = Vec::with_capacity(2 * total_samples);
        for _ in 0..total_samples {
            let (l, r) = generator.next_sample();
            pcm.push(l);
            pcm.push(r);
        }

        // Reversing the buffer and swapping channels turns a forward recording into what a
        // reverse-playing deck would present: the tail of the forward signal (the highest cycle
        // indices) comes first.
        let reversed_pcm = reverse_buffer(&pcm);

        let mut early_decoder = Decoder::new(serato_lookup());
        let early_samples = 2 * 44100;
        early_decoder
            .submit(&reversed_pcm[..2 * early_samples], early_samples, 44100)
            .unwrap();
        let (early_cycle, _) = early_decoder
            .get_position()
            .expect("expected a resolved position after 2s of reverse signal");

        let mut late_decoder = Decoder::new(serato_lookup());
        late_decoder.submit(&reversed_pcm, total_samples, 44100).unwrap();
        let (late_cycle, _) = late_decoder
            .get_position()
            .expect("expected a resolved position after 4s of reverse signal");

        assert!(
            late_cycle <= early_cycle,
            "cycle index should not increase during reverse playback: early={early_cycle}, late={late_cycle}"
        );

        let pitch = late_decoder.get_pitch().expect("pitch should be available");
        assert!(pitch < 0.0, "reverse pitch should be negative, was {pitch}");
        assert!((pitch + 1.0).abs() < 0.15, "reverse pitch magnitude off target: {pitch}");
    }

    #[test]
    fn test_half_speed_play_yields_half_pitch() {
        // Generating at twice the declared sample rate stretches every cycle across twice as
        // many samples at that rate, which is exactly what playing a pressed signal at half
        // rotational speed does.
        let mut generator = TimecodeAudioGenerator::new(&SERATO_2A, 2.0 * 44100.0);
        let total_samples = 4 * 44100;
        let mut pcm = Vec::with_capacity(2 * total_samples);
        for _ in 0..total_samples {
            let (l, r) = generator.next_sample();
            pcm.push(l);
            pcm.push(r);
        }

        let mut decoder = Decoder::new(serato_lookup());
        decoder.submit(&pcm, total_samples, 44100).unwrap();

        assert!(decoder.get_position().is_some(), "expected a resolved position at half speed");

        let pitch = decoder.get_pitch().expect("pitch should be available");
        assert!((pitch - 0.5).abs() < 0.1, "pitch was {pitch}, expected ~0.5");
    }

    #[test]
    fn test_traktor_a_own_signal_yields_nondecreasing_in_range_positions() {
        let lookup = build_lookup("traktor_a").expect("traktor_a should build");
        let mut decoder = Decoder::new(Arc::clone(&lookup));
        let mut generator = TimecodeAudioGenerator::new(&TRAKTOR_A, 44100.0);

        // A full pass of traktor_a spans 1,500,000 cycles (750s of audio), far too long to
        // generate and decode sample-by-sample in a unit test. Decoding a bounded prefix of the
        // variant's own generated signal still has to satisfy what a full pass requires at every
        // step: every resolved cycle index stays within [0, length) and never goes backwards
        // while playing forwards.
        let chunk_samples = 4410usize; // 100ms @ 44100Hz
        let mut previous: Option<i32> = None;
        let mut resolved_count = 0;

        for _ in 0..50 {
            let mut pcm = Vec::with_capacity(2 * chunk_samples);
            for _ in 0..chunk_samples {
                let (l, r) = generator.next_sample();
                pcm.push(l);
                pcm.push(r);
            }
            decoder.submit(&pcm, chunk_samples, 44100).unwrap();

            if let Some((cycle, _)) = decoder.get_position() {
                assert!(
                    cycle >= 0 && (cycle as u32) < lookup.length(),
                    "cycle {cycle} out of traktor_a's [0, {}) range",
                    lookup.length()
                );
                if let Some(prev) = previous {
                    assert!(
                        cycle >= prev,
                        "cycle index must not go backwards during forward play: prev={prev}, cycle={cycle}"
                    );
                }
                previous = Some(cycle);
                resolved_count += 1;
            }
        }

        assert!(
            resolved_count > 0,
            "expected at least one resolved position within traktor_a's own generated signal"
        );
    }

    #[test]
    fn test_split_submit_matches_whole_submit() {
        let lookup_a = serato_lookup();
        let lookup_b = serato_lookup();
        let mut decoder_whole = Decoder::new(lookup_a);
        let mut decoder_split = Decoder::new(lookup_b);

        let mut generator = TimecodeAudioGenerator::new(&SERATO_2A, 44100.0);
        let total_samples = 20_000usize;
        let mut pcm = Vec::with_capacity(2 * total_samples);
        for _ in 0..total_samples {
            let (l, r) = generator.next_sample();
            pcm.push(l);
            pcm.push(r);
        }

        decoder_whole.submit(&pcm, total_samples, 44100).unwrap();

        let split = total_samples / 3;
        decoder_split.submit(&pcm[..2 * split], split, 44100).unwrap();
        decoder_split
            .submit(&pcm[2 * split..2 * total_samples], total_samples - split, 44100)
            .unwrap();

        assert_eq!(decoder_whole.bitstream, decoder_split.bitstream);
        assert_eq!(decoder_whole.timecode, decoder_split.timecode);
        assert_eq!(decoder_whole.valid_counter, decoder_split.valid_counter);
    }

    #[test]
    fn test_noise_burst_never_validates() {
        let lookup = serato_lookup();
        let mut decoder = Decoder::new(lookup);

        // Deterministic pseudo-noise (LCG) rather than a real RNG dependency for a unit test.
        let mut state: u32 = 0x1234_5678;
        let samples = 4410; // 100ms @ 44100Hz
        let mut pcm = Vec::with_capacity(2 * samples);
        for _ in 0..(2 * samples) {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            pcm.push((state >> 16) as i16);
        }

        decoder.submit(&pcm, samples, 44100).unwrap();

        assert_eq!(decoder.get_position(), None);
    }

    #[test]
    fn test_bit_observer_is_invoked() {
        let lookup = serato_lookup();
        let mut decoder = Decoder::new(lookup);

        let observed = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let observed_clone = observed.clone();
        decoder.set_bit_observer(move |bit| observed_clone.borrow_mut().push(bit));

        let mut generator = TimecodeAudioGenerator::new(&SERATO_2A, 44100.0);
        let samples = 4410;
        let mut pcm = Vec::with_capacity(2 * samples);
        for _ in 0..samples {
            let (l, r) = generator.next_sample();
            pcm.push(l);
            pcm.push(r);
        }
        decoder.submit(&pcm, samples, 44100).unwrap();

        assert!(!observed.borrow().is_empty(), "expected at least one emitted bit");
    }

    #[test]
    fn test_monitor_lifecycle() {
        let lookup = serato_lookup();
        let mut decoder = Decoder::new(lookup);
        assert!(decoder.monitor_buffer().is_none());

        decoder.monitor_init(64).unwrap();
        assert!(decoder.monitor_buffer().is_some());

        let pcm = [1000i16, -1000i16];
        decoder.submit(&pcm, 1, 44100).unwrap();
        assert!(decoder.monitor_buffer().unwrap().iter().any(|&b| b != 0));

        decoder.monitor_clear();
        assert!(decoder.monitor_buffer().is_none());
    }
}
