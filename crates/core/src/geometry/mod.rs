//! Scene coordinates on top of `kurbo`.
//!
//! Coordinates are scene units with `+x` to the right and `+y` up, so a
//! positive rotation angle turns counter-clockwise. Positions are [`Point`]s,
//! directions and displacements are [`Vec2`]s and bounds are [`Rect`]s.

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Tolerance used when comparing computed coordinates.
pub const EPSILON: f64 = 1e-9;

/// Multiply degrees by this constant to get radians.
pub const DEGREES: f64 = std::f64::consts::PI / 180.0;

pub const ORIGIN: Point = Point::ORIGIN;
pub const UP: Vec2 = Vec2::new(0.0, 1.0);
pub const DOWN: Vec2 = Vec2::new(0.0, -1.0);
pub const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
pub const RIGHT: Vec2 = Vec2::new(1.0, 0.0);
pub const UR: Vec2 = Vec2::new(1.0, 1.0);

/// Smallest rectangle containing every point, or `None` for an empty iterator.
pub fn bounds_of<I: IntoIterator<Item = Point>>(points: I) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p)))
}

/// Picks, per axis, the minimum for a negative direction component, the
/// centre for zero and the maximum for a positive one. Only the sign of each
/// component matters.
pub fn critical_point(bounds: Rect, direction: Vec2) -> Point {
    let pick = |component: f64, min: f64, max: f64| {
        if component < 0.0 {
            min
        } else if component > 0.0 {
            max
        } else {
            (min + max) / 2.0
        }
    };
    Point::new(
        pick(direction.x, bounds.x0, bounds.x1),
        pick(direction.y, bounds.y0, bounds.y1),
    )
}

/// Corners in counter-clockwise order starting from the upper right.
pub fn corners(bounds: Rect) -> [Point; 4] {
    [
        Point::new(bounds.x1, bounds.y1),
        Point::new(bounds.x0, bounds.y1),
        Point::new(bounds.x0, bounds.y0),
        Point::new(bounds.x1, bounds.y0),
    ]
}
