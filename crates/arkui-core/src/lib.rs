//! Core building blocks shared by the ArkUI NG grid crates.

pub mod collections;
pub mod dirty;

pub use dirty::{DirtyFlags, DirtyTracker, HostNode, NodeId};
