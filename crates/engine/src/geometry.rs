#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Horizontal facing of an entity. Sprites are authored facing right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn is_left(self) -> bool {
        self == Facing::Left
    }
}

/// Axis-aligned rectangle in surface pixels, y growing downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            left: center.x - width * 0.5,
            top: center.y - height * 0.5,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Edges are inclusive on every side.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right()
            && other.left <= self.right()
            && self.top <= other.bottom()
            && other.top <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_point_is_inclusive_on_edges() {
        let rect = Rect {
            left: 10.0,
            top: 20.0,
            width: 5.0,
            height: 5.0,
        };
        assert!(rect.contains_point(Vec2::new(10.0, 20.0)));
        assert!(rect.contains_point(Vec2::new(15.0, 25.0)));
        assert!(!rect.contains_point(Vec2::new(15.1, 25.0)));
        assert!(!rect.contains_point(Vec2::new(9.9, 22.0)));
    }

    #[test]
    fn from_center_splits_extents_evenly() {
        let rect = Rect::from_center(Vec2::new(400.0, 480.0), 50.0, 50.0);
        assert_eq!(rect.left, 375.0);
        assert_eq!(rect.top, 455.0);
        assert_eq!(rect.right(), 425.0);
        assert_eq!(rect.bottom(), 505.0);
    }

    #[test]
    fn intersects_detects_touching_and_separated_rects() {
        let a = Rect {
            left: 0.0,
            top: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let touching = Rect {
            left: 10.0,
            top: 5.0,
            width: 3.0,
            height: 3.0,
        };
        let apart = Rect {
            left: 11.0,
            top: 0.0,
            width: 3.0,
            height: 3.0,
        };
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn facing_sign_matches_direction() {
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::default(), Facing::Right);
    }
}
