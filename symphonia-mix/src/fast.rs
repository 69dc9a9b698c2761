// Symphonia
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `fast` module implements closed-form stereo downmixes for the most common channel layouts.
//!
//! Each downmix produces the same result, within floating-point rounding, as the generic matrix
//! downmix of the same layout.

use crate::channels::layouts::*;
use crate::channels::Position;
use crate::matrix::{MINUS_3_DB, OUTPUT_CHANNELS};
use crate::util::clamp::clamp_f32;

/// A channel layout class used to select a downmix implementation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Quadrophonic audio with either rear or side channels.
    Quad,
    /// 5.1 audio with either rear or side channels.
    FivePointOne,
    /// 7.1 audio.
    SevenPointOne,
    /// Any other layout. Downmixed with the generic matrix.
    Generic,
}

impl Layout {
    /// Classify a position mask.
    pub fn classify(positions: Position) -> Layout {
        if positions == CHANNEL_LAYOUT_4P0_QUAD || positions == CHANNEL_LAYOUT_4P0_QUAD_SIDE {
            Layout::Quad
        }
        else if positions == CHANNEL_LAYOUT_5P1 || positions == CHANNEL_LAYOUT_5P1_SIDE {
            Layout::FivePointOne
        }
        else if positions == CHANNEL_LAYOUT_7P1 {
            Layout::SevenPointOne
        }
        else {
            Layout::Generic
        }
    }

    /// Get the number of input channels of the layout, or `None` for the generic layout.
    pub fn num_channels(&self) -> Option<usize> {
        match self {
            Layout::Quad => Some(4),
            Layout::FivePointOne => Some(6),
            Layout::SevenPointOne => Some(8),
            Layout::Generic => None,
        }
    }
}

#[inline(always)]
fn store<const ACCUMULATE: bool>(out: &mut [f32], left: f32, right: f32) {
    if ACCUMULATE {
        out[0] = clamp_f32(out[0] + left);
        out[1] = clamp_f32(out[1] + right);
    }
    else {
        out[0] = clamp_f32(left);
        out[1] = clamp_f32(right);
    }
}

#[inline(always)]
fn downmix_frames<const N: usize, const ACCUMULATE: bool, F>(
    src: &[f32],
    dst: &mut [f32],
    n_frames: usize,
    f: F,
) where
    F: Fn(&[f32]) -> (f32, f32),
{
    let src = &src[..n_frames * N];
    let dst = &mut dst[..n_frames * OUTPUT_CHANNELS];

    for (frame, out) in src.chunks_exact(N).zip(dst.chunks_exact_mut(OUTPUT_CHANNELS)) {
        let (left, right) = f(frame);
        store::<ACCUMULATE>(out, 0.5 * left, 0.5 * right);
    }
}

/// Downmix quadrophonic audio to stereo.
///
/// Each frame of `src` is ordered: front left, front right, rear (or side) left, rear (or side)
/// right.
///
/// # Panics
///
/// Panics if `src` or `dst` contain less than `n_frames` frames.
pub fn downmix_quad<const ACCUMULATE: bool>(src: &[f32], dst: &mut [f32], n_frames: usize) {
    downmix_frames::<4, ACCUMULATE, _>(src, dst, n_frames, |s| {
        // FL + RL, FR + RR
        (s[0] + s[2], s[1] + s[3])
    })
}

/// Downmix 5.1 audio to stereo.
///
/// Each frame of `src` is ordered: front left, front right, front center, LFE, rear (or side)
/// left, rear (or side) right.
///
/// # Panics
///
/// Panics if `src` or `dst` contain less than `n_frames` frames.
pub fn downmix_5p1<const ACCUMULATE: bool>(src: &[f32], dst: &mut [f32], n_frames: usize) {
    downmix_frames::<6, ACCUMULATE, _>(src, dst, n_frames, |s| {
        let center = (s[2] + s[3]) * MINUS_3_DB;
        // FL + RL + C, FR + RR + C
        (s[0] + s[4] + center, s[1] + s[5] + center)
    })
}

/// Downmix 7.1 audio to stereo.
///
/// Each frame of `src` is ordered: front left, front right, front center, LFE, rear left, rear
/// right, side left, side right.
///
/// # Panics
///
/// Panics if `src` or `dst` contain less than `n_frames` frames.
pub fn downmix_7p1<const ACCUMULATE: bool>(src: &[f32], dst: &mut [f32], n_frames: usize) {
    downmix_frames::<8, ACCUMULATE, _>(src, dst, n_frames, |s| {
        let center = (s[2] + s[3]) * MINUS_3_DB;
        // FL + RL + SL + C, FR + RR + SR + C
        (s[0] + s[4] + s[6] + center, s[1] + s[5] + s[7] + center)
    })
}
