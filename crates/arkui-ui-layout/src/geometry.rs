/// Scroll direction of a scrollable container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl Axis {
    pub fn cross(self) -> Self {
        match self {
            Self::Vertical => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
        }
    }

    pub fn is_vertical(self) -> bool {
        self == Self::Vertical
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeF {
    pub width: f32,
    pub height: f32,
}

impl SizeF {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Builds a size from main/cross extents for the given scroll axis.
    pub fn from_main_cross(axis: Axis, main: f32, cross: f32) -> Self {
        match axis {
            Axis::Vertical => Self::new(cross, main),
            Axis::Horizontal => Self::new(main, cross),
        }
    }

    pub fn main_size(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.height,
            Axis::Horizontal => self.width,
        }
    }

    pub fn cross_size(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.width,
            Axis::Horizontal => self.height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OffsetF {
    pub x: f32,
    pub y: f32,
}

impl OffsetF {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_main_cross(axis: Axis, main: f32, cross: f32) -> Self {
        match axis {
            Axis::Vertical => Self::new(cross, main),
            Axis::Horizontal => Self::new(main, cross),
        }
    }

    pub fn main(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.y,
            Axis::Horizontal => self.x,
        }
    }

    pub fn cross(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Vertical => self.x,
            Axis::Horizontal => self.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_offset_size(offset: OffsetF, size: SizeF) -> Self {
        Self::new(offset.x, offset.y, size.width, size.height)
    }

    pub fn offset(&self) -> OffsetF {
        OffsetF::new(self.x, self.y)
    }

    pub fn size(&self) -> SizeF {
        SizeF::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &RectF) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Normalizes a rectangle dragged in any direction (negative extents).
    pub fn normalized(&self) -> Self {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Self::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_cross_follow_axis() {
        let size = SizeF::from_main_cross(Axis::Horizontal, 30.0, 10.0);
        assert_eq!(size, SizeF::new(30.0, 10.0));
        assert_eq!(size.main_size(Axis::Horizontal), 30.0);
        assert_eq!(size.cross_size(Axis::Vertical), 30.0);
    }

    #[test]
    fn normalized_rect_intersects() {
        let drag = RectF::new(100.0, 100.0, -60.0, -60.0).normalized();
        assert_eq!(drag, RectF::new(40.0, 40.0, 60.0, 60.0));
        assert!(drag.intersects(&RectF::new(0.0, 0.0, 50.0, 50.0)));
        assert!(!drag.intersects(&RectF::new(100.0, 0.0, 10.0, 10.0)));
    }
}
