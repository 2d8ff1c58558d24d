/// Integer pixel coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The single candidate region accepted for a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    /// Polygon area of the region's outer contour, in pixels.
    pub area: f64,
    /// Center of the minimal enclosing circle, truncated to whole pixels.
    pub center: Point,
    pub radius: f64,
}
