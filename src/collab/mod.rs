//! Contracts for the model collaborators, and the glue built on them.
//!
//! The detector and the trainer live outside this crate. They are consumed
//! through [`Detector`] and [`Trainer`]; everything here is plain file and
//! timing work around those calls.

pub mod bench;
pub mod export;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BccdError;
use crate::ir::{BBox, ClassId, Pixel};

pub use bench::{benchmark_fps, select_benchmark_batch, BenchmarkOptions, FpsReport};
pub use export::{export_centers, format_center_export, write_center_export, ExportSummary};

/// Class ID of red blood cells in the reference whitelist.
pub const RBC_CLASS_ID: ClassId = ClassId(1);

/// One detected object, in absolute pixel coordinates of its image.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class_id: ClassId,
    pub confidence: f64,
    pub bbox: BBox<Pixel>,
}

impl Detection {
    /// Center point in pixels.
    pub fn center(&self) -> (f64, f64) {
        let (cx, cy, _, _) = self.bbox.to_cxcywh();
        (cx, cy)
    }
}

/// All detections for one input image.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub image: PathBuf,
    pub detections: Vec<Detection>,
}

/// Inference parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictParams {
    confidence: f64,
    classes: Option<BTreeSet<ClassId>>,
}

impl PredictParams {
    /// `confidence` must lie in `[0, 1]`. `classes = None` keeps every class.
    pub fn new(confidence: f64, classes: Option<BTreeSet<ClassId>>) -> Result<Self, BccdError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(BccdError::InvalidConfig {
                message: format!("confidence threshold must be in [0, 1], got {confidence}"),
            });
        }
        Ok(Self {
            confidence,
            classes,
        })
    }

    /// Threshold 0.25, red blood cells only.
    pub fn rbc_only() -> Self {
        Self {
            confidence: 0.25,
            classes: Some(BTreeSet::from([RBC_CLASS_ID])),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn classes(&self) -> Option<&BTreeSet<ClassId>> {
        self.classes.as_ref()
    }

    /// Whether a detection passes the threshold and the class filter.
    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.confidence >= self.confidence
            && self
                .classes
                .as_ref()
                .map_or(true, |classes| classes.contains(&detection.class_id))
    }
}

impl Default for PredictParams {
    fn default() -> Self {
        Self {
            confidence: 0.25,
            classes: None,
        }
    }
}

/// The inference collaborator.
///
/// Implementations return one [`Prediction`] per input image, in input
/// order, already filtered by `params`.
pub trait Detector {
    fn predict(
        &mut self,
        images: &[PathBuf],
        params: &PredictParams,
    ) -> Result<Vec<Prediction>, BccdError>;
}

/// Compute device for training.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Device {
    Cpu,
    Cuda(u32),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda(index) => write!(f, "{index}"),
        }
    }
}

impl FromStr for Device {
    type Err = BccdError;

    /// Accepts `cpu`, a bare GPU index (`0`), or `cuda:0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        if trimmed == "cpu" {
            return Ok(Device::Cpu);
        }
        let index = trimmed.strip_prefix("cuda:").unwrap_or(&trimmed);
        index
            .parse::<u32>()
            .map(Device::Cuda)
            .map_err(|_| BccdError::InvalidConfig {
                message: format!("unknown device '{s}'; expected 'cpu', '0' or 'cuda:0'"),
            })
    }
}

/// Hyperparameters handed to the training collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    pub epochs: u32,
    pub image_size: u32,
    pub batch_size: u32,
    pub device: Device,
    pub workers: u32,
}

impl TrainParams {
    /// 30 epochs at 640 px, batch 4, no loader workers.
    pub fn reference(device: Device) -> Self {
        Self {
            epochs: 30,
            image_size: 640,
            batch_size: 4,
            device,
            workers: 0,
        }
    }

    pub fn validate(&self) -> Result<(), BccdError> {
        for (name, value) in [
            ("epochs", self.epochs),
            ("image_size", self.image_size),
            ("batch_size", self.batch_size),
        ] {
            if value == 0 {
                return Err(BccdError::InvalidConfig {
                    message: format!("{name} must be greater than 0"),
                });
            }
        }
        Ok(())
    }
}

/// The training collaborator. Returns the path of the trained weights.
pub trait Trainer {
    fn train(&mut self, manifest: &Path, params: &TrainParams) -> Result<PathBuf, BccdError>;
}
