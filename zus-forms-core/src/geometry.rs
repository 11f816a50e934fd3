//! Basic geometric types for widget placement

use lopdf::Object;

/// A point in PDF user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle defined by two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Lower-left corner
    pub lower_left: Point,
    /// Upper-right corner
    pub upper_right: Point,
}

impl Rectangle {
    /// Create a new rectangle from two points
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        Self {
            lower_left,
            upper_right,
        }
    }

    /// Create a rectangle from position and size
    pub fn from_position_and_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            lower_left: Point::new(x, y),
            upper_right: Point::new(x + width, y + height),
        }
    }

    /// Read a `/Rect` array. Corners are normalized so that width and
    /// height are never negative.
    pub fn from_pdf_array(array: &[Object]) -> Option<Self> {
        if array.len() != 4 {
            return None;
        }
        let mut coords = [0.0f64; 4];
        for (slot, obj) in coords.iter_mut().zip(array) {
            *slot = number(obj)?;
        }
        let [x1, y1, x2, y2] = coords;
        Some(Self::new(
            Point::new(x1.min(x2), y1.min(y2)),
            Point::new(x1.max(x2), y1.max(y2)),
        ))
    }

    /// Convert to a `/Rect` array
    pub fn to_pdf_array(&self) -> Object {
        Object::Array(vec![
            Object::Real(self.lower_left.x as f32),
            Object::Real(self.lower_left.y as f32),
            Object::Real(self.upper_right.x as f32),
            Object::Real(self.upper_right.y as f32),
        ])
    }

    /// Get the width
    pub fn width(&self) -> f64 {
        self.upper_right.x - self.lower_left.x
    }

    /// Get the height
    pub fn height(&self) -> f64 {
        self.upper_right.y - self.lower_left.y
    }

    /// Shrink horizontally by `dx` and vertically by `dy` on every side.
    /// Never produces a negative size.
    pub fn inset(&self, dx: f64, dy: f64) -> Self {
        let dx = dx.min(self.width() / 2.0);
        let dy = dy.min(self.height() / 2.0);
        Self::new(
            Point::new(self.lower_left.x + dx, self.lower_left.y + dy),
            Point::new(self.upper_right.x - dx, self.upper_right.y - dy),
        )
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), Point::new(110.0, 120.0));

        assert_eq!(rect.width(), 100.0);
        assert_eq!(rect.height(), 100.0);
    }

    #[test]
    fn test_rectangle_from_position_and_size() {
        let rect = Rectangle::from_position_and_size(10.0, 20.0, 50.0, 30.0);
        assert_eq!(rect.lower_left.x, 10.0);
        assert_eq!(rect.lower_left.y, 20.0);
        assert_eq!(rect.upper_right.x, 60.0);
        assert_eq!(rect.upper_right.y, 50.0);
    }

    #[test]
    fn test_from_pdf_array_normalizes_corners() {
        let array = vec![
            Object::Integer(200),
            Object::Real(40.5),
            Object::Integer(100),
            Object::Integer(20),
        ];
        let rect = Rectangle::from_pdf_array(&array).unwrap();
        assert_eq!(rect.lower_left, Point::new(100.0, 20.0));
        assert_eq!(rect.upper_right, Point::new(200.0, 40.5));
    }

    #[test]
    fn test_from_pdf_array_rejects_bad_input() {
        assert!(Rectangle::from_pdf_array(&[Object::Integer(1)]).is_none());
        let with_name = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Name(b"X".to_vec()),
            Object::Integer(1),
        ];
        assert!(Rectangle::from_pdf_array(&with_name).is_none());
    }

    #[test]
    fn test_inset_never_inverts() {
        let rect = Rectangle::from_position_and_size(0.0, 0.0, 4.0, 10.0);
        let inner = rect.inset(3.0, 1.0);
        assert_eq!(inner.width(), 0.0);
        assert_eq!(inner.height(), 8.0);
    }
}
