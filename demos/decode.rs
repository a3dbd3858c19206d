// Copyright (c) 2025 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Reads a WAV file pressed with a known timecode variant and prints the decoded positions.
//!
//! ```bash
//! $ cargo run --example decode -- serato_2a /path/to/Serato\ Control\ CD.wav
//! ```

use hound::WavReader;
use std::env;
use vinylla::{build_lookup, Decoder};

fn main() {
    pretty_env_logger::init();

    let mut args = env::args().skip(1);
    let variant_name = args.next().expect("usage: decode <variant> <file.wav>");
    let path = args.next().expect("usage: decode <variant> <file.wav>");

    let lookup = build_lookup(&variant_name).expect("failed to build lookup table");
    let mut reader = WavReader::open(&path).expect("failed to open wav file");
    let rate = reader.spec().sample_rate;

    let mut decoder = Decoder::new(lookup);
    let mut samples = reader.samples::<i16>().map(|s| s.unwrap());
    let mut buffer = Vec::with_capacity(4096);

    let mut reported = 0usize;
    loop {
        buffer.clear();
        for _ in 0..2048 {
            match (samples.next(), samples.next()) {
                (Some(left), Some(right)) => {
                    buffer.push(left);
                    buffer.push(right);
                }
                _ => break,
            }
        }
        if buffer.is_empty() {
            break;
        }

        let count = buffer.len() / 2;
        decoder.submit(&buffer, count, rate).unwrap();

        if let Some((cycle, age)) = decoder.get_position() {
            println!("{reported:10}: cycle {cycle} ({age:.3}s old), alive={}", decoder.get_alive());
            reported += 1;
        }
    }

    if let Some(pitch) = decoder.get_pitch() {
        println!("final pitch estimate: {pitch:.3}");
    }
}
