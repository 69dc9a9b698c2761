// Symphonia
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Project Symphonia positional channel downmixing.
//!
//! `symphonia-mix` downmixes interleaved multichannel positional audio (quadrophonic, 5.1, 7.1,
//! and arbitrary combinations of up-to 24 positions) to interleaved stereo.
//!
//! Each input channel is mixed into the left output channel, the right output channel, or split
//! equally between both at -3 dB, based on its position. Channel positions without a stereo
//! mapping are silent. All output samples are clamped to [-1.0, 1.0].
//!
//! # Usage
//!
//! ```
//! use symphonia_mix::channels::layouts::CHANNEL_LAYOUT_5P1;
//! use symphonia_mix::{ChannelMix, ChannelMixOptions};
//!
//! let mix = ChannelMix::try_new(CHANNEL_LAYOUT_5P1, ChannelMixOptions::default()).unwrap();
//!
//! // One frame of 5.1 audio: FL, FR, FC, LFE1, RL, RR.
//! let src = [0.5, 0.0, 0.0, 0.0, 0.5, 0.0];
//! let mut dst = [0.0; 2];
//!
//! mix.mix(&src, &mut dst, 1, false).unwrap();
//!
//! assert_eq!(dst, [0.5, 0.0]);
//! ```

pub mod channels;
pub mod errors;
pub mod fast;
pub mod matrix;
pub mod mixer;
pub mod util;

pub use channels::Position;
pub use errors::{Error, Result};
pub use mixer::{ChannelMix, ChannelMixOptions};
