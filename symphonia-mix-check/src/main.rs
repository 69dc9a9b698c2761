// Symphonia Mix Check Tool
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::time::Instant;

use symphonia_mix::channels::layouts::*;
use symphonia_mix::errors::Result;
use symphonia_mix::{ChannelMix, ChannelMixOptions, Position};

use clap::{value_parser, Arg, ArgAction};
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// The absolute maximum allowable sample delta between the closed-form and matrix downmixes. Around
/// 2^-20 (-120dB).
const ABS_MAX_ALLOWABLE_SAMPLE_DELTA: f32 = 0.000001;

/// The layouts checked if none are specified.
const DEFAULT_LAYOUTS: &[(&str, Position)] = &[
    ("stereo", CHANNEL_LAYOUT_STEREO),
    ("2.1", CHANNEL_LAYOUT_2P1),
    ("quad", CHANNEL_LAYOUT_4P0_QUAD),
    ("quad-side", CHANNEL_LAYOUT_4P0_QUAD_SIDE),
    ("5.0", CHANNEL_LAYOUT_5P0),
    ("5.1", CHANNEL_LAYOUT_5P1),
    ("5.1-side", CHANNEL_LAYOUT_5P1_SIDE),
    ("6.1", CHANNEL_LAYOUT_6P1),
    ("7.1", CHANNEL_LAYOUT_7P1),
    ("7.1-wide", CHANNEL_LAYOUT_7P1_WIDE),
];

#[derive(Default)]
struct TestOptions {
    n_frames: usize,
    seed: u64,
    accumulate: bool,
    bench_iterations: Option<usize>,
    is_quiet: bool,
}

#[derive(Default)]
struct TestResult {
    n_samples: u64,
    n_failed_samples: u64,
    abs_max_delta: f32,
    fast_ns_per_frame: Option<f64>,
    generic_ns_per_frame: Option<f64>,
}

/// Parse a layout name, or a hexadecimal (0x prefixed) or decimal position mask.
fn parse_positions(value: &str) -> Option<Position> {
    if let Some(&(_, positions)) = DEFAULT_LAYOUTS.iter().find(|(name, _)| *name == value) {
        return Some(positions);
    }

    let bits = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u64>().ok()?,
    };

    Some(Position::from_bits_retain(bits))
}

fn random_samples(rng: &mut SmallRng, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.random_range(-1.0f32..=1.0)).collect()
}

/// Get the average number of nanoseconds per frame spent mixing `src` into `dst`.
fn bench_mix(
    mix: &ChannelMix,
    src: &[f32],
    dst: &mut [f32],
    opts: &TestOptions,
    iterations: usize,
) -> Result<f64> {
    let start = Instant::now();

    for _ in 0..iterations {
        mix.mix(src, dst, opts.n_frames, opts.accumulate)?;
    }

    let n_frames = iterations.max(1) * opts.n_frames.max(1);

    Ok(start.elapsed().as_nanos() as f64 / n_frames as f64)
}

fn run_check(positions: Position, opts: &TestOptions) -> Result<TestResult> {
    let fast = ChannelMix::try_new(positions, Default::default())?;
    let generic = ChannelMix::try_new(positions, ChannelMixOptions { enable_fast_paths: false })?;

    info!(
        "checking {} with {} frames of {} channels, layout={:?}",
        positions,
        opts.n_frames,
        fast.num_input_channels(),
        fast.layout()
    );

    let mut rng = SmallRng::seed_from_u64(opts.seed);

    let src = random_samples(&mut rng, opts.n_frames * fast.num_input_channels());

    // Accumulating mixes start from existing content, otherwise the destination is overwritten.
    let init = if opts.accumulate {
        random_samples(&mut rng, 2 * opts.n_frames)
    }
    else {
        vec![0.0; 2 * opts.n_frames]
    };

    let mut fast_dst = init.clone();
    let mut generic_dst = init.clone();

    fast.mix(&src, &mut fast_dst, opts.n_frames, opts.accumulate)?;
    generic.mix(&src, &mut generic_dst, opts.n_frames, opts.accumulate)?;

    let mut acct: TestResult = Default::default();

    for (i, (&t, &r)) in fast_dst.iter().zip(&generic_dst).enumerate() {
        let delta = t - r;

        if delta.abs() > ABS_MAX_ALLOWABLE_SAMPLE_DELTA {
            if !opts.is_quiet {
                println!(
                    "[FAIL] frame={:>8}, channel={}, fast={:+.8}, matrix={:+.8} ({:+.8})",
                    i / 2,
                    if i % 2 == 0 { "L" } else { "R" },
                    t,
                    r,
                    r - t
                );
            }

            acct.n_failed_samples += 1;
        }

        acct.abs_max_delta = acct.abs_max_delta.max(delta.abs());
        acct.n_samples += 1;
    }

    if let Some(iterations) = opts.bench_iterations {
        let mut dst = init.clone();
        acct.fast_ns_per_frame = Some(bench_mix(&fast, &src, &mut dst, opts, iterations)?);

        let mut dst = init;
        acct.generic_ns_per_frame = Some(bench_mix(&generic, &src, &mut dst, opts, iterations)?);
    }

    Ok(acct)
}

fn main() {
    pretty_env_logger::init();

    let matches = clap::Command::new("Symphonia Mix Check")
        .version("1.0")
        .author("Philip Deljanov <philip.deljanov@gmail.com>")
        .about("Check the closed-form stereo downmixes against the generic matrix downmix")
        .arg(
            Arg::new("mask")
                .long("mask")
                .short('m')
                .value_name("MASK")
                .action(ArgAction::Append)
                .help("A layout name, or a hexadecimal (0x) or decimal position mask to check"),
        )
        .arg(
            Arg::new("frames")
                .long("frames")
                .value_parser(value_parser!(usize))
                .default_value("4096")
                .help("The number of frames to mix"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .default_value("0")
                .help("The seed of the random input"),
        )
        .arg(
            Arg::new("accumulate")
                .long("accumulate")
                .action(ArgAction::SetTrue)
                .help("Accumulate into existing content instead of overwriting"),
        )
        .arg(
            Arg::new("bench")
                .long("bench")
                .value_name("ITERATIONS")
                .value_parser(value_parser!(usize))
                .help("Report the time spent mixing over a number of iterations"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Only print test results"),
        )
        .get_matches();

    let layouts: Vec<(String, Position)> = match matches.get_many::<String>("mask") {
        Some(values) => {
            let mut layouts = Vec::new();

            for value in values {
                match parse_positions(value) {
                    Some(positions) => layouts.push((value.clone(), positions)),
                    None => {
                        eprintln!("Invalid position mask: {}", value);
                        std::process::exit(2);
                    }
                }
            }

            layouts
        }
        None => DEFAULT_LAYOUTS.iter().map(|&(name, pos)| (name.to_string(), pos)).collect(),
    };

    let opts = TestOptions {
        n_frames: matches.get_one::<usize>("frames").copied().unwrap_or(4096),
        seed: matches.get_one::<u64>("seed").copied().unwrap_or(0),
        accumulate: matches.get_flag("accumulate"),
        bench_iterations: matches.get_one::<usize>("bench").copied(),
        is_quiet: matches.get_flag("quiet"),
    };

    let mut n_failed_layouts = 0;

    for (name, positions) in &layouts {
        println!("Layout: {} {} ({:#x})", name, positions, positions.bits());
        println!();

        let res = match run_check(*positions, &opts) {
            Ok(res) => res,
            Err(err) => {
                eprintln!("Test interrupted by error: {}", err);
                std::process::exit(2);
            }
        };

        if res.n_samples == 0 {
            warn!("no samples were compared for {}", name);
        }

        println!("  Failed/Total Samples: {:>12}/{:>12}", res.n_failed_samples, res.n_samples);
        println!("  Absolute Maximum Sample Delta:       {:.8}", res.abs_max_delta);

        if let (Some(fast), Some(generic)) = (res.fast_ns_per_frame, res.generic_ns_per_frame) {
            println!("  Fast Path:      {:>10.2} ns/frame", fast);
            println!("  Generic Matrix: {:>10.2} ns/frame", generic);
        }

        println!();

        if res.n_failed_samples == 0 {
            println!("PASS");
        }
        else {
            println!("FAIL");
            n_failed_layouts += 1;
        }

        println!();
    }

    std::process::exit(if n_failed_layouts == 0 { 0 } else { 1 });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_parse_positions() {
        assert_eq!(parse_positions("7.1"), Some(CHANNEL_LAYOUT_7P1));
        assert_eq!(parse_positions("0x63f"), Some(CHANNEL_LAYOUT_7P1));
        assert_eq!(parse_positions("0X33"), Some(CHANNEL_LAYOUT_4P0_QUAD));
        assert_eq!(parse_positions("3"), Some(CHANNEL_LAYOUT_STEREO));
        assert_eq!(parse_positions("0x1000000"), Some(Position::FRONT_LEFT_WIDE));
        assert_eq!(parse_positions("surround"), None);
        assert_eq!(parse_positions("0xzz"), None);
    }

    #[test]
    fn verify_run_check() {
        let opts = TestOptions { n_frames: 512, accumulate: true, ..Default::default() };

        for &(_, positions) in DEFAULT_LAYOUTS {
            let res = run_check(positions, &opts).unwrap();

            assert_eq!(res.n_samples, 1024);
            assert_eq!(res.n_failed_samples, 0);
            assert!(res.fast_ns_per_frame.is_none());
        }

        assert!(run_check(Position::FRONT_RIGHT_WIDE, &opts).is_err());
    }
}
