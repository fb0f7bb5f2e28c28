//! Coordinate space markers.
//!
//! Zero-sized types used as the type parameter of [`BBox`](super::BBox) so
//! that absolute pixel boxes read from VOC files cannot be written out as
//! YOLO labels without passing through normalization first.

use std::fmt;

/// Absolute pixel coordinates, origin at the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Coordinates divided by the image dimensions (0.0 to 1.0 for boxes
/// that lie inside the image).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl fmt::Debug for Pixel {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl fmt::Debug for Normalized {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}
