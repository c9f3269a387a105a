/// Maps pixel (element-grid) coordinates to world coordinates.
pub trait Coordinates {
    fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64);
}

/// World coordinates equal pixel coordinates. Used when a dataset has no
/// transform of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCoordinates;

impl Coordinates for IdentityCoordinates {
    fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }
}

/// Axis-aligned linear transform: `world = offset + scale * pixel` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineCoordinates {
    pub offset: (f64, f64),
    pub scale: (f64, f64),
}

impl AffineCoordinates {
    pub fn new(offset: (f64, f64), scale: (f64, f64)) -> Self {
        Self { offset, scale }
    }
}

impl Coordinates for AffineCoordinates {
    fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.offset.0 + self.scale.0 * x,
            self.offset.1 + self.scale.1 * y,
        )
    }
}
