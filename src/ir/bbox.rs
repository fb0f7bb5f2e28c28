//! Axis-aligned bounding boxes in corner form.

use std::fmt;
use std::marker::PhantomData;

use super::{Normalized, Pixel};

/// An axis-aligned bounding box stored as its corners.
///
/// The `TSpace` parameter is either [`Pixel`] or [`Normalized`].
///
/// The constructor does not enforce `min <= max` or that the box lies inside
/// the image. Malformed source boxes are carried through unchanged and
/// reported, never silently corrected.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox<TSpace> {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBox<TSpace> {
    /// Creates a box from its corners, in VOC field order
    /// (`xmin`, `xmax`, `ymin`, `ymax`).
    #[inline]
    pub fn from_corners(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            _space: PhantomData,
        }
    }

    /// Creates a box from its center point and size.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::from_corners(cx - w / 2.0, cx + w / 2.0, cy - h / 2.0, cy + h / 2.0)
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    #[inline]
    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    #[inline]
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    #[inline]
    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Width of the box. Negative if `xmax < xmin`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the box. Negative if `ymax < ymin`.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns `(center_x, center_y, width, height)`.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
            self.width(),
            self.height(),
        )
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite()
            && self.ymin.is_finite()
            && self.xmax.is_finite()
            && self.ymax.is_finite()
    }
}

impl BBox<Pixel> {
    /// Divides every coordinate by the image dimensions.
    ///
    /// No clamping is applied: a box that sticks out of the image yields
    /// values outside `[0, 1]`.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBox<Normalized> {
        BBox::from_corners(
            self.xmin / image_width,
            self.xmax / image_width,
            self.ymin / image_height,
            self.ymax / image_height,
        )
    }

    /// True when `0 <= xmin <= xmax <= width` and the same holds vertically.
    pub fn is_within(&self, image_width: u32, image_height: u32) -> bool {
        let (w, h) = (image_width as f64, image_height as f64);
        0.0 <= self.xmin
            && self.xmin <= self.xmax
            && self.xmax <= w
            && 0.0 <= self.ymin
            && self.ymin <= self.ymax
            && self.ymax <= h
    }
}

impl BBox<Normalized> {
    /// Scales normalized coordinates back to pixels.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBox<Pixel> {
        BBox::from_corners(
            self.xmin * image_width,
            self.xmax * image_width,
            self.ymin * image_height,
            self.ymax * image_height,
        )
    }
}

impl<TSpace> fmt::Debug for BBox<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BBox")
            .field("xmin", &self.xmin)
            .field("xmax", &self.xmax)
            .field("ymin", &self.ymin)
            .field("ymax", &self.ymax)
            .finish()
    }
}

impl<TSpace> Default for BBox<TSpace> {
    fn default() -> Self {
        Self::from_corners(0.0, 0.0, 0.0, 0.0)
    }
}
