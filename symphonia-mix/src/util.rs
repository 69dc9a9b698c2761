// Symphonia
// Copyright (c) 2019-2024 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `util` module provides a repository of commonly used utility functions.

pub mod clamp {
    //! Saturating clamp functions for mixed samples.

    /// The maximum amplitude of a mixed sample (0 dBFS).
    pub const LIMIT_AMPLITUDE: f32 = 1.0;

    /// Clamps the given value to the [-1.0, 1.0] range.
    ///
    /// A NaN saturates to -1.0, so the result is always within range.
    #[inline(always)]
    pub fn clamp_f32(val: f32) -> f32 {
        // f32::max and f32::min ignore a NaN operand. They compile down to branchless minss/maxss
        // on platforms with SSE2 support.
        val.max(-LIMIT_AMPLITUDE).min(LIMIT_AMPLITUDE)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn verify_clamp() {
            assert_eq!(clamp_f32(1.1), 1.0);
            assert_eq!(clamp_f32(5.6), 1.0);
            assert_eq!(clamp_f32(0.5), 0.5);
            assert_eq!(clamp_f32(-1.1), -1.0);
            assert_eq!(clamp_f32(-5.6), -1.0);
            assert_eq!(clamp_f32(-0.5), -0.5);
            assert_eq!(clamp_f32(1.0), 1.0);
            assert_eq!(clamp_f32(-1.0), -1.0);

            assert_eq!(clamp_f32(f32::INFINITY), 1.0);
            assert_eq!(clamp_f32(f32::NEG_INFINITY), -1.0);
            assert_eq!(clamp_f32(f32::NAN), -1.0);
        }
    }
}
