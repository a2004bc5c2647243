//! # CV Core
//!
//! Common vocabulary shared by the crates in this workspace: integer pixel
//! keypoints produced by the corner detector and index matches produced by
//! the patch matcher. The crate is `#![no_std]` and allocation free so it can
//! sit underneath anything that needs to talk about features.
//!
//! Keypoints are stored in pixel coordinates with `x` growing to the right
//! and `y` growing downward, starting at the top-left pixel.

#![no_std]

mod keypoint;
mod matches;

pub use keypoint::*;
pub use matches::*;
pub use nalgebra;
