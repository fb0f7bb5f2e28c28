//! Center-coordinate export of detections.
//!
//! One text file per image, named after the image stem:
//!
//! ```text
//! Center_X, Center_Y
//! 312.50, 140.00
//! 88.25, 402.75
//! ```
//!
//! Coordinates are absolute pixels with two decimals. There is no trailing
//! newline after the last row.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::{Detector, PredictParams, Prediction};
use crate::error::BccdError;

const CENTER_HEADER: &str = "Center_X, Center_Y";

/// Totals for an export run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub images: usize,
    pub detections: usize,
    pub files: Vec<PathBuf>,
}

/// Render the center export for one prediction.
pub fn format_center_export(prediction: &Prediction) -> String {
    let mut lines = Vec::with_capacity(prediction.detections.len() + 1);
    lines.push(CENTER_HEADER.to_string());
    for detection in &prediction.detections {
        let (cx, cy) = detection.center();
        lines.push(format!("{cx:.2}, {cy:.2}"));
    }
    lines.join("\n")
}

/// Write the center export for one prediction into `out_dir`.
pub fn write_center_export(out_dir: &Path, prediction: &Prediction) -> Result<PathBuf, BccdError> {
    let stem = prediction
        .image
        .file_stem()
        .ok_or_else(|| BccdError::Detector {
            message: format!(
                "prediction for '{}' has no image file name",
                prediction.image.display()
            ),
        })?;
    let path = out_dir.join(format!("{}.txt", stem.to_string_lossy()));
    fs::write(&path, format_center_export(prediction)).map_err(BccdError::io_at(&path))?;
    Ok(path)
}

/// Run `detector` over `images` and write one center export per image.
pub fn export_centers<D: Detector + ?Sized>(
    detector: &mut D,
    images: &[PathBuf],
    params: &PredictParams,
    out_dir: &Path,
) -> Result<ExportSummary, BccdError> {
    fs::create_dir_all(out_dir).map_err(BccdError::io_at(out_dir))?;

    let predictions = detector.predict(images, params)?;
    let mut summary = ExportSummary::default();
    for prediction in &predictions {
        summary.files.push(write_center_export(out_dir, prediction)?);
        summary.images += 1;
        summary.detections += prediction.detections.len();
    }

    info!(
        "exported {} detection center(s) for {} image(s) to {}",
        summary.detections,
        summary.images,
        out_dir.display()
    );
    Ok(summary)
}
