//! Converter configuration.
//!
//! Every field has a default matching the reference BCCD deployment, so an
//! empty YAML document is a valid config. CLI flags are applied on top of
//! whatever the file provides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BccdError;
use crate::ir::io_yolo::MANIFEST_FILE_NAME;
use crate::ir::ClassList;
use crate::split::SplitRatios;

pub const DEFAULT_DATASET_URL: &str = "https://github.com/experiencor/BCCD_Dataset.git";
pub const DEFAULT_RAW_DIR: &str = "./BCCD_Dataset_Raw";
pub const DEFAULT_OUTPUT_DIR: &str = "./datasets/BCCD_YOLO";
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Everything the converter needs for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Where the raw dataset is fetched from. Only used in error messages;
    /// fetching is done outside this tool.
    pub dataset_url: String,

    /// Root of the raw dataset checkout.
    pub raw_dir: PathBuf,

    /// VOC XML directory. Defaults to `<raw_dir>/BCCD/Annotations`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations_dir: Option<PathBuf>,

    /// Source image directory. Defaults to `<raw_dir>/BCCD/JPEGImages`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_dir: Option<PathBuf>,

    /// Root of the converted dataset.
    pub output_dir: PathBuf,

    /// Manifest location. Defaults to `<output_dir>/data.yaml`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<PathBuf>,

    /// Ordered class names; position is the class ID.
    pub class_whitelist: ClassList,

    pub split_ratios: SplitRatios,

    pub seed: u64,

    /// Extension tried first when looking up an image for an annotation.
    pub image_extension: String,

    /// Keep images whose annotations were all filtered out, writing an
    /// empty label file for them.
    pub keep_empty_images: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            annotations_dir: None,
            images_dir: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            manifest_path: None,
            class_whitelist: ClassList::default(),
            split_ratios: SplitRatios::default(),
            seed: DEFAULT_SEED,
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            keep_empty_images: false,
        }
    }
}

impl ConvertConfig {
    /// Load a config from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, BccdError> {
        let data = fs::read_to_string(path).map_err(BccdError::io_at(path))?;
        Self::from_yaml_str(&data, path)
    }

    /// Parse a config from YAML text. `origin` is used in error messages.
    pub fn from_yaml_str(yaml: &str, origin: &Path) -> Result<Self, BccdError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|source| BccdError::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn annotations_dir(&self) -> PathBuf {
        self.annotations_dir
            .clone()
            .unwrap_or_else(|| self.raw_dir.join("BCCD").join("Annotations"))
    }

    pub fn images_dir(&self) -> PathBuf {
        self.images_dir
            .clone()
            .unwrap_or_else(|| self.raw_dir.join("BCCD").join("JPEGImages"))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join(MANIFEST_FILE_NAME))
    }

    /// Checks that cannot be expressed by the field types alone.
    pub fn validate(&self) -> Result<(), BccdError> {
        if self.image_extension.trim_start_matches('.').is_empty() {
            return Err(BccdError::InvalidConfig {
                message: "image_extension must not be empty".to_string(),
            });
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(BccdError::InvalidConfig {
                message: "output_dir must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
