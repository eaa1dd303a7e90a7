// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tri-state classification of scalar input values.

/// Semantic state of a function: off, or on in one of two directions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputState {
    /// Not active.
    #[default]
    Off,
    /// Active in the positive direction.
    Positive,
    /// Active in the negative direction.
    Negative,
}

impl InputState {
    /// Signed projection: `0`, `1`, or `-1`.
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Off => 0,
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }

    /// Signed projection as a float multiplier.
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Off => 0.0,
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }

    /// Classify `value`: below `-threshold` is negative, above `threshold` is positive.
    pub fn classify(value: f64, threshold: f64) -> Self {
        if value < -threshold {
            Self::Negative
        } else if value > threshold {
            Self::Positive
        } else {
            Self::Off
        }
    }

    /// Whether the state is anything other than [`InputState::Off`].
    pub const fn is_on(self) -> bool {
        !matches!(self, Self::Off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_thresholds() {
        assert_eq!(InputState::classify(0.0, 0.01), InputState::Off);
        assert_eq!(InputState::classify(0.01, 0.01), InputState::Off);
        assert_eq!(InputState::classify(-0.01, 0.01), InputState::Off);
        assert_eq!(InputState::classify(0.0101, 0.01), InputState::Positive);
        assert_eq!(InputState::classify(-0.5, 0.01), InputState::Negative);
    }

    #[test]
    fn signed_projection() {
        assert_eq!(InputState::Negative.as_i32(), -1);
        assert_eq!(InputState::Positive.as_f64(), 1.0);
        assert!(!InputState::Off.is_on());
        assert!(InputState::Negative.is_on());
    }
}
