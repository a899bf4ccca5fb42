use crate::geometry::{Axis, SizeF};

/// Size bounds handed down to a node during measure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraints {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for Constraints {
    fn default() -> Self {
        Self::loose(SizeF::new(f32::INFINITY, f32::INFINITY))
    }
}

impl Constraints {
    pub fn tight(size: SizeF) -> Self {
        Self {
            min_width: size.width,
            max_width: size.width,
            min_height: size.height,
            max_height: size.height,
        }
    }

    pub fn loose(max: SizeF) -> Self {
        Self {
            min_width: 0.0,
            max_width: max.width,
            min_height: 0.0,
            max_height: max.height,
        }
    }

    /// Child constraints for a grid cell: the cross extent is fixed, the main
    /// extent is unbounded so the child reports its natural length.
    pub fn for_cell(axis: Axis, cross: f32) -> Self {
        match axis {
            Axis::Vertical => Self {
                min_width: 0.0,
                max_width: cross,
                min_height: 0.0,
                max_height: f32::INFINITY,
            },
            Axis::Horizontal => Self {
                min_width: 0.0,
                max_width: f32::INFINITY,
                min_height: 0.0,
                max_height: cross,
            },
        }
    }

    pub fn max_size(&self) -> SizeF {
        SizeF::new(self.max_width, self.max_height)
    }

    pub fn min_size(&self) -> SizeF {
        SizeF::new(self.min_width, self.min_height)
    }

    pub fn main_max(&self, axis: Axis) -> f32 {
        self.max_size().main_size(axis)
    }

    pub fn cross_max(&self, axis: Axis) -> f32 {
        self.max_size().cross_size(axis)
    }

    pub fn constrain(&self, size: SizeF) -> SizeF {
        SizeF::new(
            size.width.clamp(self.min_width, self.max_width),
            size.height.clamp(self.min_height, self.max_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_constraints_leave_main_unbounded() {
        let c = Constraints::for_cell(Axis::Vertical, 120.0);
        assert_eq!(c.max_width, 120.0);
        assert!(c.max_height.is_infinite());
        assert!(Constraints::for_cell(Axis::Horizontal, 50.0).max_width.is_infinite());
    }

    #[test]
    fn constrain_clamps_into_bounds() {
        let c = Constraints::loose(SizeF::new(100.0, 200.0));
        assert_eq!(c.constrain(SizeF::new(150.0, 20.0)), SizeF::new(100.0, 20.0));
    }
}
