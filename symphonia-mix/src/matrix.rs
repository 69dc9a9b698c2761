// Symphonia
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `matrix` module decodes a position mask into a stereo downmix matrix, and implements the
//! generic matrix downmix.

use log::trace;

use crate::channels::Position;
use crate::errors::{unsupported_error, Result};
use crate::util::clamp::clamp_f32;

/// The maximum number of input channels supported by the downmixer.
pub const MAX_CHANNELS: usize = 24;

/// The number of output channels. Only stereo output is supported.
pub const OUTPUT_CHANNELS: usize = 2;

/// -3 dB expressed as a linear factor (1/sqrt(2)).
pub const MINUS_3_DB: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Positions that are mixed exclusively into the left output channel.
const LEFT_POSITIONS: Position =
    Position::FRONT_LEFT.union(Position::SIDE_LEFT).union(Position::REAR_LEFT);

/// Positions that are mixed exclusively into the right output channel.
const RIGHT_POSITIONS: Position =
    Position::FRONT_RIGHT.union(Position::SIDE_RIGHT).union(Position::REAR_RIGHT);

/// Positions that are split equally between both output channels.
const CENTER_POSITIONS: Position =
    Position::FRONT_CENTER.union(Position::LFE1).union(Position::REAR_CENTER);

/// The contribution of one input channel to the left and right output channels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Gain {
    /// Gain applied to the input channel when mixed into the left output channel.
    pub left: f32,
    /// Gain applied to the input channel when mixed into the right output channel.
    pub right: f32,
}

impl Gain {
    /// A gain that does not contribute to either output channel.
    pub const ZERO: Gain = Gain { left: 0.0, right: 0.0 };

    /// Get the gain of a single-bit position.
    ///
    /// Positions without a stereo mapping get a zero gain.
    pub fn for_position(pos: Position) -> Gain {
        if LEFT_POSITIONS.contains(pos) {
            Gain { left: 0.5, right: 0.0 }
        }
        else if RIGHT_POSITIONS.contains(pos) {
            Gain { left: 0.0, right: 0.5 }
        }
        else if CENTER_POSITIONS.contains(pos) {
            Gain { left: 0.5 * MINUS_3_DB, right: 0.5 * MINUS_3_DB }
        }
        else {
            Gain::ZERO
        }
    }

    /// Returns true if the gain contributes to neither output channel.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

/// Gain table storage. Over-aligned to keep the whole table within as few cache lines as possible.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(C, align(128))]
struct GainTable([Gain; MAX_CHANNELS]);

/// A stereo downmix matrix.
///
/// The matrix holds one [`Gain`] per input channel. Input channels are ordered by ascending bit
/// value of the position mask the matrix was decoded from.
#[derive(Clone, Debug, PartialEq)]
pub struct DownmixMatrix {
    gains: GainTable,
    /// The number of input channels, including channels without a stereo mapping.
    n_channels: usize,
    /// One past the index of the last input channel with a non-zero gain.
    n_active: usize,
}

impl Default for DownmixMatrix {
    fn default() -> Self {
        DownmixMatrix { gains: GainTable([Gain::ZERO; MAX_CHANNELS]), n_channels: 0, n_active: 0 }
    }
}

impl DownmixMatrix {
    /// Try to decode a position mask into a downmix matrix.
    ///
    /// Returns an error if the mask contains a position beyond the first [`MAX_CHANNELS`]
    /// positions. Positions within range that have no stereo mapping are retained as silent
    /// channels: they occupy a sample in each frame but never contribute to the output.
    pub fn try_from_positions(positions: Position) -> Result<DownmixMatrix> {
        let unsupported = positions.bits() >> MAX_CHANNELS;

        if unsupported != 0 {
            return unsupported_error(Position::from_bits_retain(unsupported << MAX_CHANNELS));
        }

        let mut matrix = DownmixMatrix::default();

        for (i, pos) in positions.iter_bits().enumerate() {
            let gain = Gain::for_position(pos);

            if gain.is_zero() {
                trace!("channel {} {} is silent in the stereo downmix", i, pos);
            }
            else {
                matrix.n_active = i + 1;
            }

            matrix.gains.0[i] = gain;
            matrix.n_channels = i + 1;
        }

        Ok(matrix)
    }

    /// Get the number of input channels.
    pub fn num_channels(&self) -> usize {
        self.n_channels
    }

    /// Get the number of input channels up-to and including the last channel that contributes to
    /// the output.
    pub fn num_active_channels(&self) -> usize {
        self.n_active
    }

    /// Get the gains of all input channels.
    pub fn gains(&self) -> &[Gain] {
        &self.gains.0[..self.n_channels]
    }

    /// Downmix `n_frames` interleaved frames from `src` into the interleaved stereo buffer `dst`.
    ///
    /// If `ACCUMULATE` is true, the downmix is added to the existing contents of `dst`. Otherwise,
    /// the contents of `dst` are replaced. Every output sample is clamped to [-1.0, 1.0].
    ///
    /// # Panics
    ///
    /// Panics if the matrix has no channels, or if `src` or `dst` contain less than `n_frames`
    /// frames.
    pub fn apply<const ACCUMULATE: bool>(&self, src: &[f32], dst: &mut [f32], n_frames: usize) {
        assert!(self.n_channels > 0, "downmix matrix has no channels");

        let src = &src[..n_frames * self.n_channels];
        let dst = &mut dst[..n_frames * OUTPUT_CHANNELS];

        let gains = &self.gains.0[..self.n_active];

        for (frame, out) in
            src.chunks_exact(self.n_channels).zip(dst.chunks_exact_mut(OUTPUT_CHANNELS))
        {
            let mut left = 0.0;
            let mut right = 0.0;

            for (gain, &s) in gains.iter().zip(frame) {
                left += gain.left * s;
                right += gain.right * s;
            }

            if ACCUMULATE {
                left += out[0];
                right += out[1];
            }

            out[0] = clamp_f32(left);
            out[1] = clamp_f32(right);
        }
    }
}
