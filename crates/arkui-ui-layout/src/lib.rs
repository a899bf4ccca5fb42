//! Layout primitives consumed by the grid engine.
//!
//! The engine never owns the node tree. Everything it needs from the host
//! (constraints, child measurement, child placement) goes through
//! [`LayoutWrapper`].

mod constraints;
mod geometry;
mod wrapper;

pub use constraints::Constraints;
pub use geometry::{Axis, OffsetF, RectF, SizeF};
pub use wrapper::LayoutWrapper;
