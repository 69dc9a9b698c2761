// Symphonia
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `mixer` module provides the stereo channel mixer.

use log::{debug, warn};

use crate::channels::Position;
use crate::errors::{buffer_error, unconfigured_error, BufferKind, Result};
use crate::fast::{self, Layout};
use crate::matrix::{DownmixMatrix, OUTPUT_CHANNELS};

/// `ChannelMixOptions` is a common set of options that all channel mixers use.
#[derive(Copy, Clone, Debug)]
pub struct ChannelMixOptions {
    /// Use the closed-form downmixes for quadrophonic, 5.1, and 7.1 audio instead of the generic
    /// matrix downmix. The output is identical within floating-point rounding.
    ///
    /// Default: `true`.
    pub enable_fast_paths: bool,
}

impl Default for ChannelMixOptions {
    fn default() -> Self {
        ChannelMixOptions { enable_fast_paths: true }
    }
}

/// A stereo downmixer for interleaved positional audio.
///
/// A `ChannelMix` is configured with the position mask of its input. Each call to
/// [`ChannelMix::mix`] then downmixes a buffer of interleaved frames, ordered by ascending bit
/// value of the position mask, to interleaved stereo.
///
/// Mixing never allocates, locks, or logs, and may be performed on a real-time audio thread.
/// Reconfiguring the mixer with a new position mask rebuilds the downmix matrix and should be done
/// outside of the real-time context.
#[derive(Clone, Debug)]
pub struct ChannelMix {
    options: ChannelMixOptions,
    /// The configured position mask. An empty mask indicates the mixer is unconfigured.
    positions: Position,
    layout: Layout,
    matrix: DownmixMatrix,
}

impl Default for ChannelMix {
    fn default() -> Self {
        ChannelMix::new(Default::default())
    }
}

impl ChannelMix {
    /// Instantiate an unconfigured `ChannelMix`.
    pub fn new(options: ChannelMixOptions) -> Self {
        ChannelMix {
            options,
            positions: Position::empty(),
            layout: Layout::Generic,
            matrix: Default::default(),
        }
    }

    /// Try to instantiate a `ChannelMix` configured for the input position mask `positions`.
    pub fn try_new(positions: Position, options: ChannelMixOptions) -> Result<Self> {
        let mut mix = ChannelMix::new(options);
        mix.configure(positions)?;
        Ok(mix)
    }

    /// Configure the mixer for the input position mask `positions`.
    ///
    /// Returns an error if the position mask contains a position the mixer does not support, in
    /// which case the existing configuration is retained. Configuring the mixer with the position
    /// mask it is already configured with does nothing. Configuring the mixer with an empty
    /// position mask returns it to the unconfigured state.
    pub fn configure(&mut self, positions: Position) -> Result<()> {
        if positions == self.positions {
            return Ok(());
        }

        let matrix = match DownmixMatrix::try_from_positions(positions) {
            Ok(matrix) => matrix,
            Err(err) => {
                warn!("channel mix: rejected position mask {:#x}: {}", positions.bits(), err);
                return Err(err);
            }
        };

        let layout = if self.options.enable_fast_paths {
            Layout::classify(positions)
        }
        else {
            Layout::Generic
        };

        debug_assert!(layout.num_channels().map_or(true, |n| n == matrix.num_channels()));

        debug!(
            "channel mix: configured for {} (channels={}, active={}, layout={:?})",
            positions,
            matrix.num_channels(),
            matrix.num_active_channels(),
            layout
        );

        self.positions = positions;
        self.layout = layout;
        self.matrix = matrix;

        Ok(())
    }

    /// Get the configured input position mask, or `None` if the mixer is unconfigured.
    pub fn positions(&self) -> Option<Position> {
        if self.positions.is_empty() {
            None
        }
        else {
            Some(self.positions)
        }
    }

    /// Get the number of interleaved input channels per frame.
    pub fn num_input_channels(&self) -> usize {
        self.matrix.num_channels()
    }

    /// Get the layout class selected for the configured position mask, or `None` if the mixer is
    /// unconfigured.
    pub fn layout(&self) -> Option<Layout> {
        self.positions().map(|_| self.layout)
    }

    /// Get the downmix matrix.
    pub fn matrix(&self) -> &DownmixMatrix {
        &self.matrix
    }

    /// Get the options the mixer was instantiated with.
    pub fn options(&self) -> &ChannelMixOptions {
        &self.options
    }

    /// Downmix `n_frames` interleaved frames from `src` into the interleaved stereo buffer `dst`.
    ///
    /// If `accumulate` is true, the downmix is added to the existing contents of `dst`. Otherwise,
    /// the contents of `dst` are replaced. Every output sample is clamped to [-1.0, 1.0].
    ///
    /// Returns an error if the mixer is unconfigured, or if either buffer is too small for
    /// `n_frames` frames. On error, `dst` is not modified.
    pub fn mix(
        &self,
        src: &[f32],
        dst: &mut [f32],
        n_frames: usize,
        accumulate: bool,
    ) -> Result<()> {
        if self.positions.is_empty() {
            return unconfigured_error();
        }

        // A sample count that overflows can never be satisfied by any buffer.
        let n_src_samples = n_frames.checked_mul(self.matrix.num_channels()).unwrap_or(usize::MAX);

        if src.len() < n_src_samples {
            return buffer_error(BufferKind::Source, n_src_samples, src.len());
        }

        let n_dst_samples = n_frames.checked_mul(OUTPUT_CHANNELS).unwrap_or(usize::MAX);

        if dst.len() < n_dst_samples {
            return buffer_error(BufferKind::Destination, n_dst_samples, dst.len());
        }

        if accumulate {
            self.mix_layout::<true>(src, dst, n_frames);
        }
        else {
            self.mix_layout::<false>(src, dst, n_frames);
        }

        Ok(())
    }

    /// Configure the mixer for the input position mask `positions`, and then downmix `n_frames`
    /// interleaved frames from `src` into the interleaved stereo buffer `dst`.
    ///
    /// If configuration fails, the existing configuration is retained and `dst` is not modified.
    pub fn mix_with_positions(
        &mut self,
        src: &[f32],
        dst: &mut [f32],
        n_frames: usize,
        accumulate: bool,
        positions: Position,
    ) -> Result<()> {
        self.configure(positions)?;
        self.mix(src, dst, n_frames, accumulate)
    }

    fn mix_layout<const ACCUMULATE: bool>(&self, src: &[f32], dst: &mut [f32], n_frames: usize) {
        match self.layout {
            Layout::Quad => fast::downmix_quad::<ACCUMULATE>(src, dst, n_frames),
            Layout::FivePointOne => fast::downmix_5p1::<ACCUMULATE>(src, dst, n_frames),
            Layout::SevenPointOne => fast::downmix_7p1::<ACCUMULATE>(src, dst, n_frames),
            Layout::Generic => self.matrix.apply::<ACCUMULATE>(src, dst, n_frames),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::layouts::*;
    use crate::errors::Error;

    fn generic_options() -> ChannelMixOptions {
        ChannelMixOptions { enable_fast_paths: false }
    }

    #[test]
    fn verify_unconfigured() {
        let mix = ChannelMix::default();

        assert_eq!(mix.positions(), None);
        assert_eq!(mix.layout(), None);
        assert_eq!(mix.num_input_channels(), 0);

        let mut dst = [0.5; 2];
        assert_eq!(mix.mix(&[1.0; 2], &mut dst, 1, false), Err(Error::Unconfigured));
        assert_eq!(dst, [0.5; 2]);
    }

    #[test]
    fn verify_configure() {
        let mut mix = ChannelMix::default();

        mix.configure(CHANNEL_LAYOUT_5P1_SIDE).unwrap();
        assert_eq!(mix.positions(), Some(CHANNEL_LAYOUT_5P1_SIDE));
        assert_eq!(mix.layout(), Some(Layout::FivePointOne));
        assert_eq!(mix.num_input_channels(), 6);

        mix.configure(CHANNEL_LAYOUT_5P0).unwrap();
        assert_eq!(mix.positions(), Some(CHANNEL_LAYOUT_5P0));
        assert_eq!(mix.layout(), Some(Layout::Generic));
        assert_eq!(mix.num_input_channels(), 5);

        // An empty mask returns the mixer to the unconfigured state.
        mix.configure(Position::empty()).unwrap();
        assert_eq!(mix.positions(), None);
        assert_eq!(mix.mix(&[], &mut [], 0, false), Err(Error::Unconfigured));
    }

    #[test]
    fn verify_configure_idempotent() {
        let mut mix = ChannelMix::try_new(CHANNEL_LAYOUT_7P1_WIDE, Default::default()).unwrap();
        let before = mix.matrix().clone();

        mix.configure(CHANNEL_LAYOUT_7P1_WIDE).unwrap();

        assert_eq!(mix.matrix(), &before);
        assert_eq!(mix.num_input_channels(), 8);
        assert_eq!(mix.matrix().num_active_channels(), 6);
    }

    #[test]
    fn verify_configure_unsupported_retains_state() {
        let mut mix = ChannelMix::try_new(CHANNEL_LAYOUT_4P0_QUAD, Default::default()).unwrap();
        let before = mix.matrix().clone();

        let bad = CHANNEL_LAYOUT_STEREO | Position::FRONT_LEFT_WIDE;

        assert_eq!(mix.configure(bad), Err(Error::UnsupportedPositions(Position::FRONT_LEFT_WIDE)));
        assert_eq!(mix.positions(), Some(CHANNEL_LAYOUT_4P0_QUAD));
        assert_eq!(mix.layout(), Some(Layout::Quad));
        assert_eq!(mix.matrix(), &before);

        // Unconfigured mixers remain unconfigured.
        assert!(ChannelMix::try_new(bad, Default::default()).is_err());

        let mut mix = ChannelMix::default();
        assert!(mix.configure(bad).is_err());
        assert_eq!(mix.positions(), None);
    }

    #[test]
    fn verify_fast_paths_disabled() {
        let mix = ChannelMix::try_new(CHANNEL_LAYOUT_7P1, generic_options()).unwrap();
        assert_eq!(mix.layout(), Some(Layout::Generic));
        assert!(!mix.options().enable_fast_paths);
    }

    #[test]
    fn verify_buffer_too_small() {
        let mix = ChannelMix::try_new(CHANNEL_LAYOUT_5P1, Default::default()).unwrap();

        let mut dst = [0.25; 4];

        assert_eq!(
            mix.mix(&[0.0; 11], &mut dst, 2, false),
            Err(Error::BufferTooSmall { kind: BufferKind::Source, required: 12, actual: 11 })
        );

        assert_eq!(
            mix.mix(&[0.0; 12], &mut dst[..3], 2, false),
            Err(Error::BufferTooSmall { kind: BufferKind::Destination, required: 4, actual: 3 })
        );

        assert_eq!(dst, [0.25; 4]);

        // Larger buffers are fine, only the requested frames are written.
        let mut dst = [0.25; 6];
        mix.mix(&[0.0; 18], &mut dst, 2, false).unwrap();
        assert_eq!(dst, [0.0, 0.0, 0.0, 0.0, 0.25, 0.25]);
    }

    #[test]
    fn verify_frame_count_overflow() {
        let mix = ChannelMix::try_new(CHANNEL_LAYOUT_7P1, Default::default()).unwrap();

        assert_eq!(
            mix.mix(&[], &mut [], usize::MAX / 4, false),
            Err(Error::BufferTooSmall { kind: BufferKind::Source, required: usize::MAX, actual: 0 })
        );

        let mix = ChannelMix::try_new(Position::FRONT_CENTER, Default::default()).unwrap();

        let mut dst = [0.5; 2];

        assert_eq!(
            mix.mix(&[0.0; 4], &mut dst, usize::MAX, true),
            Err(Error::BufferTooSmall { kind: BufferKind::Source, required: usize::MAX, actual: 4 })
        );
        assert_eq!(dst, [0.5; 2]);
    }

    #[test]
    fn verify_mix_with_positions() {
        let mut mix = ChannelMix::default();
        let mut dst = [0.0; 2];

        mix.mix_with_positions(&[1.0, 0.0, 1.0, 0.0], &mut dst, 1, false, CHANNEL_LAYOUT_4P0_QUAD)
            .unwrap();
        assert_eq!(dst, [1.0, 0.0]);

        // A failed configuration retains the previous configuration and does not write.
        let bad = Position::from_bits_retain(1 << 32);

        assert!(mix.mix_with_positions(&[0.5; 4], &mut dst, 1, false, bad).is_err());
        assert_eq!(dst, [1.0, 0.0]);
        assert_eq!(mix.positions(), Some(CHANNEL_LAYOUT_4P0_QUAD));
    }

    #[test]
    fn verify_zero_frames() {
        let mix = ChannelMix::try_new(CHANNEL_LAYOUT_STEREO, Default::default()).unwrap();
        mix.mix(&[], &mut [], 0, true).unwrap();
    }
}
