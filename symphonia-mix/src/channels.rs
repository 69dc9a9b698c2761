// Symphonia
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `channels` module defines the positional channel vocabulary and common channel layouts.

use bitflags::bitflags;

bitflags! {
    /// A bitmask representing positional audio channels.
    ///
    /// The first 18 channel positions are identical to those specified by the channel mask in
    /// Microsoft's `WAVEFORMATEXTENSIBLE` structure. Positions after the first 18 are not in any
    /// standardized order.
    ///
    /// Samples of an interleaved frame are ordered by ascending bit value. Arbitrary, possibly
    /// unnamed, bit patterns may be constructed with [`Position::from_bits_retain`].
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Position: u64 {
        /// Front-left (left) channel.
        const FRONT_LEFT          = 1 << 0;
        /// Front-right (right) channel.
        const FRONT_RIGHT         = 1 << 1;
        /// Front-center (center) or the Mono channel.
        const FRONT_CENTER        = 1 << 2;
        /// Low-frequency effects (LFE) channel 1.
        const LFE1                = 1 << 3;
        /// Rear-left channel.
        ///
        /// Microsoft calls this channel "back left".
        const REAR_LEFT           = 1 << 4;
        /// Rear-right channel.
        ///
        /// Microsoft calls this channel "back right".
        const REAR_RIGHT          = 1 << 5;
        /// Front left-of-center channel.
        const FRONT_LEFT_CENTER   = 1 << 6;
        /// Front right-of-center channel.
        const FRONT_RIGHT_CENTER  = 1 << 7;
        /// Rear-center channel.
        ///
        /// Microsoft calls this channel "back center".
        const REAR_CENTER         = 1 << 8;
        /// Side-left channel.
        const SIDE_LEFT           = 1 << 9;
        /// Side-right channel.
        const SIDE_RIGHT          = 1 << 10;
        /// Top-center channel.
        const TOP_CENTER          = 1 << 11;
        /// Top-front left channel.
        const TOP_FRONT_LEFT      = 1 << 12;
        /// Top-front center channel.
        const TOP_FRONT_CENTER    = 1 << 13;
        /// Top-front right channel.
        const TOP_FRONT_RIGHT     = 1 << 14;
        /// Top-rear left channel.
        const TOP_REAR_LEFT       = 1 << 15;
        /// Top-rear center channel.
        const TOP_REAR_CENTER     = 1 << 16;
        /// Top-rear right channel.
        const TOP_REAR_RIGHT      = 1 << 17;

        // End of standard WAVE channels.

        /// Low-frequency effects channel 2.
        const LFE2                = 1 << 18;
        /// Top-side left channel.
        const TOP_SIDE_LEFT       = 1 << 19;
        /// Top-side right channel.
        const TOP_SIDE_RIGHT      = 1 << 20;
        /// Bottom-front center channel.
        const BOTTOM_FRONT_CENTER = 1 << 21;
        /// Bottom-front left channel.
        const BOTTOM_FRONT_LEFT   = 1 << 22;
        /// Bottom-front right channel.
        const BOTTOM_FRONT_RIGHT  = 1 << 23;
        /// Front-left wide channel.
        const FRONT_LEFT_WIDE     = 1 << 24;
        /// Front-right wide channel.
        const FRONT_RIGHT_WIDE    = 1 << 25;
    }
}

impl Position {
    /// Get the number of channels in the position mask.
    ///
    /// Every set bit is counted, including bits that do not name a position.
    pub fn count(&self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Get an iterator over each set bit of the position mask as a single-bit position, from the
    /// lowest bit to the highest.
    ///
    /// Unlike [`Position::iter`], bits that do not name a position are yielded individually.
    pub fn iter_bits(&self) -> impl Iterator<Item = Position> {
        let mut bits = self.bits();

        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }

            // Isolate, and then clear, the lowest set bit.
            let lowest = bits & bits.wrapping_neg();
            bits ^= lowest;

            Some(Position::from_bits_retain(lowest))
        })
    }
}

const POSITION_NAMES: &[&str; 26] = &[
    "FL", "FR", "FC", "LFE1", "RL", "RR", "FLC", "FRC", "RC", "SL", "SR", "TC", "TFL", "TFC",
    "TFR", "TRL", "TRC", "TRR", "LFE2", "TSL", "TSR", "BFC", "BFL", "BFR", "FLW", "FRW",
];

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = self
            .iter_bits()
            .map(|pos| {
                POSITION_NAMES
                    .get(pos.bits().trailing_zeros() as usize)
                    .unwrap_or(&"???")
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(",");

        write!(f, "[{}]", list)
    }
}

/// Common channel layouts expressed as position masks.
pub mod layouts {
    use super::Position;

    /// Single channel (mono) audio.
    ///
    /// The channels in this layout are:
    /// * Front center
    pub const CHANNEL_LAYOUT_MONO: Position = Position::FRONT_CENTER;

    /// Two channel (stereo) audio.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    pub const CHANNEL_LAYOUT_STEREO: Position = Position::FRONT_LEFT.union(Position::FRONT_RIGHT);

    /// Two channel (stereo) audio with low-frequency effects.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Low-frequency effects
    pub const CHANNEL_LAYOUT_2P1: Position = CHANNEL_LAYOUT_STEREO.union(Position::LFE1);

    /// Quadrophonic audio with rear channels.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Rear left
    /// * Rear right
    pub const CHANNEL_LAYOUT_4P0_QUAD: Position =
        CHANNEL_LAYOUT_STEREO.union(Position::REAR_LEFT).union(Position::REAR_RIGHT);

    /// Quadrophonic audio with side channels.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Side left
    /// * Side right
    pub const CHANNEL_LAYOUT_4P0_QUAD_SIDE: Position =
        CHANNEL_LAYOUT_STEREO.union(Position::SIDE_LEFT).union(Position::SIDE_RIGHT);

    /// 5.0 audio.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Front center
    /// * Rear left
    /// * Rear right
    pub const CHANNEL_LAYOUT_5P0: Position = CHANNEL_LAYOUT_4P0_QUAD.union(Position::FRONT_CENTER);

    /// 5.1 audio.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Front center
    /// * Low-frequency effects
    /// * Rear left
    /// * Rear right
    pub const CHANNEL_LAYOUT_5P1: Position = CHANNEL_LAYOUT_5P0.union(Position::LFE1);

    /// 5.1 audio with side channels.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Front center
    /// * Low-frequency effects
    /// * Side left
    /// * Side right
    pub const CHANNEL_LAYOUT_5P1_SIDE: Position = CHANNEL_LAYOUT_4P0_QUAD_SIDE
        .union(Position::FRONT_CENTER)
        .union(Position::LFE1);

    /// 6.1 audio.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Front center
    /// * Low-frequency effects
    /// * Rear center
    /// * Side left
    /// * Side right
    pub const CHANNEL_LAYOUT_6P1: Position =
        CHANNEL_LAYOUT_5P1_SIDE.union(Position::REAR_CENTER);

    /// 7.1 audio.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Front center
    /// * Low-frequency effects
    /// * Rear left
    /// * Rear right
    /// * Side left
    /// * Side right
    pub const CHANNEL_LAYOUT_7P1: Position =
        CHANNEL_LAYOUT_5P1.union(Position::SIDE_LEFT).union(Position::SIDE_RIGHT);

    /// 7.1 audio with front left-of-center and right-of-center channels.
    ///
    /// The channels in this layout are:
    /// * Front left
    /// * Front right
    /// * Front center
    /// * Low-frequency effects
    /// * Rear left
    /// * Rear right
    /// * Front left-of-center
    /// * Front right-of-center
    pub const CHANNEL_LAYOUT_7P1_WIDE: Position = CHANNEL_LAYOUT_5P1
        .union(Position::FRONT_LEFT_CENTER)
        .union(Position::FRONT_RIGHT_CENTER);
}

#[cfg(test)]
mod tests {
    use super::layouts::*;
    use super::Position;

    #[test]
    fn verify_layout_channel_counts() {
        assert_eq!(CHANNEL_LAYOUT_MONO.count(), 1);
        assert_eq!(CHANNEL_LAYOUT_STEREO.count(), 2);
        assert_eq!(CHANNEL_LAYOUT_2P1.count(), 3);
        assert_eq!(CHANNEL_LAYOUT_4P0_QUAD.count(), 4);
        assert_eq!(CHANNEL_LAYOUT_4P0_QUAD_SIDE.count(), 4);
        assert_eq!(CHANNEL_LAYOUT_5P0.count(), 5);
        assert_eq!(CHANNEL_LAYOUT_5P1.count(), 6);
        assert_eq!(CHANNEL_LAYOUT_5P1_SIDE.count(), 6);
        assert_eq!(CHANNEL_LAYOUT_6P1.count(), 7);
        assert_eq!(CHANNEL_LAYOUT_7P1.count(), 8);
        assert_eq!(CHANNEL_LAYOUT_7P1_WIDE.count(), 8);
    }

    #[test]
    fn verify_iter_bits() {
        let bits: Vec<u64> = CHANNEL_LAYOUT_5P1.iter_bits().map(|pos| pos.bits()).collect();
        assert_eq!(bits, [0x1, 0x2, 0x4, 0x8, 0x10, 0x20]);

        // Unnamed bits are yielded individually.
        let unnamed = Position::from_bits_retain((1 << 40) | (1 << 41) | 1);
        let bits: Vec<u64> = unnamed.iter_bits().map(|pos| pos.bits()).collect();
        assert_eq!(bits, [1, 1 << 40, 1 << 41]);

        assert_eq!(Position::empty().iter_bits().count(), 0);
    }

    #[test]
    fn verify_display() {
        assert_eq!(CHANNEL_LAYOUT_7P1.to_string(), "[FL,FR,FC,LFE1,RL,RR,SL,SR]");
        assert_eq!(Position::empty().to_string(), "[]");
        assert_eq!(Position::from_bits_retain(1 << 30).to_string(), "[???]");
    }
}
