//! Plain numeric geometry shared by the layout engines.
//!
//! Angles are in degrees, increasing clockwise with 0° at three o'clock, in a
//! y-down screen coordinate system. This matches how the layouts are consumed
//! by raster renderers.

/// A 2-D point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    /// Rectangle of the given size centered on a point.
    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Rect {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Closed-interval intersection test.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Whether `other` lies fully inside this rectangle (closed bounds).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right() + 1e-9
            && other.bottom() <= self.bottom() + 1e-9
    }
}

/// Point on a circle of `radius` around `center` at `angle_deg`.
pub fn arc_point(center: Point, radius: f64, angle_deg: f64) -> Point {
    let rad = angle_deg.to_radians();
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

/// Evaluate a quadratic bezier through `p0`, control `ctrl`, `p1` at `t`.
pub fn quad_bezier_point(p0: Point, ctrl: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * p0.x + 2.0 * u * t * ctrl.x + t * t * p1.x,
        u * u * p0.y + 2.0 * u * t * ctrl.y + t * t * p1.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_point_cardinal_angles() {
        let c = Point::new(0.0, 0.0);
        let p = arc_point(c, 1.0, 0.0);
        assert!((p.x - 1.0).abs() < 1e-12 && p.y.abs() < 1e-12);
        // 90° clockwise in y-down coordinates points screen-down
        let p = arc_point(c, 1.0, 90.0);
        assert!(p.x.abs() < 1e-12 && (p.y - 1.0).abs() < 1e-12);
        let p = arc_point(c, 2.0, 180.0);
        assert!((p.x + 2.0).abs() < 1e-12 && p.y.abs() < 1e-9);
    }

    #[test]
    fn test_quad_bezier_endpoints_and_midpoint() {
        let p0 = Point::new(0.0, 0.0);
        let ctrl = Point::new(1.0, 2.0);
        let p1 = Point::new(2.0, 0.0);
        assert_eq!(quad_bezier_point(p0, ctrl, p1, 0.0), p0);
        assert_eq!(quad_bezier_point(p0, ctrl, p1, 1.0), p1);
        let mid = quad_bezier_point(p0, ctrl, p1, 0.5);
        assert!((mid.x - 1.0).abs() < 1e-12);
        assert!((mid.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(0.5, 0.5, 1.0, 1.0);
        let c = Rect::new(2.0, 2.0, 1.0, 1.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }
}
