//! In-memory records for the dataset converter.
//!
//! VOC files are parsed into [`ImageRecord`]s holding pixel-space corner
//! boxes. Retained objects become [`LabelRow`]s holding normalized boxes,
//! which the YOLO writer renders as center/size lines.
//!
//! The coordinate space is part of the box type, so a pixel box cannot be
//! written as a label by mistake:
//!
//! ```
//! use bccdprep::ir::{BBox, ClassId, LabelRow, Pixel};
//!
//! let bbox = BBox::<Pixel>::from_corners(10.0, 50.0, 20.0, 60.0);
//! let row = LabelRow::from_pixel(ClassId::new(1), &bbox, 100, 100);
//! let (cx, cy, w, h) = row.bbox.to_cxcywh();
//! assert!((cx - 0.3).abs() < 1e-9 && (cy - 0.4).abs() < 1e-9);
//! assert!((w - 0.4).abs() < 1e-9 && (h - 0.4).abs() < 1e-9);
//! ```

mod bbox;
mod ids;
pub mod io_voc_xml;
pub mod io_yolo;
mod model;
mod space;

pub use bbox::BBox;
pub use ids::ClassId;
pub use model::{ClassList, ImageRecord, LabelRow, ObjectRecord};
pub use space::{Normalized, Pixel};
