//! Dimension calculator for the manual resize controls.
//!
//! Width and height live in free-text inputs, so the calculator works on
//! strings and treats anything it cannot read as "unset".

use serde::{Deserialize, Serialize};

/// Scale factor applied per step when growing.
pub const GROW_FACTOR: f64 = 1.1;

/// Scale factor applied per step when shrinking.
pub const SHRINK_FACTOR: f64 = 0.9;

/// Direction of a resize request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeDirection {
    /// Grow both dimensions.
    Up,
    /// Shrink both dimensions.
    Down,
}

impl ResizeDirection {
    /// Multiplier applied to both dimensions.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Up => GROW_FACTOR,
            Self::Down => SHRINK_FACTOR,
        }
    }

    /// Lowercase name, as used by host callbacks.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::str::FromStr for ResizeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown resize direction: {other}")),
        }
    }
}

impl std::fmt::Display for ResizeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width and height as currently known to the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels, if known.
    pub width: Option<u32>,
    /// Height in pixels, if known.
    pub height: Option<u32>,
}

impl Size {
    /// Create a size with both dimensions known.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Read a size from the raw input strings. Unreadable values become `None`.
    #[must_use]
    pub fn from_inputs(width: &str, height: &str) -> Self {
        Self {
            width: parse_dimension(width).and_then(to_pixels),
            height: parse_dimension(height).and_then(to_pixels),
        }
    }

    /// Both dimensions, if both are known and positive.
    #[must_use]
    pub fn both(self) -> Option<(u32, u32)> {
        self.width
            .zip(self.height)
            .filter(|&(width, height)| width > 0 && height > 0)
    }
}

/// Parse a dimension input. Anything that is not a finite positive number is unset.
#[must_use]
pub fn parse_dimension(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Compute the new dimensions for one resize step.
///
/// Returns `None` when either input is unset, in which case the caller must
/// leave the inputs and the preloader untouched.
#[must_use]
pub fn adjust(width: &str, height: &str, direction: ResizeDirection) -> Option<(u32, u32)> {
    let width = parse_dimension(width)?;
    let height = parse_dimension(height)?;
    let factor = direction.factor();
    Some((scale(width, factor)?, scale(height, factor)?))
}

fn scale(value: f64, factor: f64) -> Option<u32> {
    to_pixels(value * factor)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked
fn to_pixels(value: f64) -> Option<u32> {
    let rounded = value.round();
    (rounded >= 1.0 && rounded <= f64::from(u32::MAX)).then(|| rounded as u32)
}
