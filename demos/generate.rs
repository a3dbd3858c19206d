// Copyright (c) 2025 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Synthesizes one full pass of a timecode variant's bitstream to a WAV file.
//!
//! ```bash
//! $ cargo run --example generate -- serato_2a /tmp/serato_2a.wav
//! ```

use hound::{SampleFormat, WavSpec, WavWriter};
use std::env;
use vinylla::{TimecodeAudioGenerator, REGISTRY};

const SAMPLE_RATE_HZ: f64 = 44100.0;

fn main() {
    pretty_env_logger::init();

    let mut args = env::args().skip(1);
    let variant_name = args.next().expect("usage: generate <variant> <output.wav>");
    let path = args.next().expect("usage: generate <variant> <output.wav>");

    let def = REGISTRY
        .iter()
        .find(|def| def.name == variant_name)
        .unwrap_or_else(|| panic!("unknown variant: {variant_name}"));

    log::info!("generating {} cycles of {}", def.length, def.name);

    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE_HZ as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(&path, spec).expect("failed to create wav file");
    let mut generator = TimecodeAudioGenerator::new(def, SAMPLE_RATE_HZ);
    let initial_state = generator.state();
    let mut state_changed = false;

    loop {
        let (left, right) = generator.next_sample();
        writer.write_sample(left).unwrap();
        writer.write_sample(right).unwrap();
        if !state_changed {
            state_changed = generator.state() != initial_state;
        } else if generator.state() == initial_state {
            break;
        }
    }
    writer.finalize().unwrap();

    println!("wrote {path}");
}
