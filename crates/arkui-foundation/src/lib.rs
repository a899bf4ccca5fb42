//! Incremental grid layout for ArkUI NG.
//!
//! A [`GridPattern`](grid::GridPattern) owns the layout state of one grid
//! node. Each frame it hands a copy of that state to one of four layout
//! algorithms, which measures only the items near the viewport through a
//! [`GridLayoutWrapper`](grid::GridLayoutWrapper), and adopts the result.

pub mod error;
pub mod grid;

pub use error::GridError;
pub use grid::{
    GridLayoutAlgorithmKind, GridLayoutInfo, GridLayoutOptions, GridLayoutProperty,
    GridLayoutWrapper, GridPattern,
};
