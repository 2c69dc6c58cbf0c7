//! Vector graphics primitives exposed by the content provider.
//!
//! Only the geometry matters for table detection, so colors and dash
//! patterns are not modelled.

use crate::geometry::{BBox, Orientation};

/// Tolerance for floating-point comparison when classifying line orientation.
const AXIS_TOLERANCE: f64 = 1e-6;

/// A stroked straight line segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl Line {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Horizontal line at `y` spanning `x0..x1`.
    pub fn horizontal(y: f64, x0: f64, x1: f64) -> Self {
        Self::new(x0, y, x1, y)
    }

    /// Vertical line at `x` spanning `top..bottom`.
    pub fn vertical(x: f64, top: f64, bottom: f64) -> Self {
        Self::new(x, top, x, bottom)
    }

    /// Axis the line runs along, or `None` for a diagonal.
    pub fn orientation(&self) -> Option<Orientation> {
        let dx = (self.x1 - self.x0).abs();
        let dy = (self.bottom - self.top).abs();
        if dy < AXIS_TOLERANCE {
            Some(Orientation::Horizontal)
        } else if dx < AXIS_TOLERANCE {
            Some(Orientation::Vertical)
        } else {
            None
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        BBox::new(self.x0, self.top, self.x1, self.bottom).is_finite()
    }
}

/// A stroked or filled rectangle; each side is a potential ruling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.x0, self.top, self.x1, self.bottom)
    }
}
