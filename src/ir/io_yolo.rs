//! Ultralytics-style YOLO writer.
//!
//! Output layout under the dataset root:
//!
//! ```text
//! images/{train,val,test}/<image_id>.<ext>
//! labels/{train,val,test}/<image_id>.txt
//! data.yaml
//! ```
//!
//! Each label line is `class_id cx cy w h`. Normalized floats are printed in
//! their shortest round-trip form, so reading a label back yields exactly the
//! value that was written.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::model::{ClassList, LabelRow};
use super::{BBox, ClassId, Normalized};
use crate::error::BccdError;

pub const LABEL_EXTENSION: &str = "txt";
pub const MANIFEST_FILE_NAME: &str = "data.yaml";
const TEMP_SUFFIX: &str = "tmp";

/// Render label rows as the text content of a label file.
///
/// One line per row, each terminated by `\n`. An empty slice renders as an
/// empty string. `1.0` prints as `1`.
pub fn format_label_rows(rows: &[LabelRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let (cx, cy, w, h) = row.bbox.to_cxcywh();
        writeln!(out, "{} {} {} {} {}", row.class_id, cx, cy, w, h)
            .expect("write to string");
    }
    out
}

/// Write a label file for `image_id` into `labels_dir`.
///
/// The content is rendered fully in memory, written to a sibling temp file
/// and renamed over the target, so a failure never leaves a half-written
/// label file behind.
pub fn write_label_file(
    labels_dir: &Path,
    image_id: &str,
    rows: &[LabelRow],
) -> Result<PathBuf, BccdError> {
    let label_path = labels_dir.join(format!("{image_id}.{LABEL_EXTENSION}"));
    let temp_path = labels_dir.join(format!("{image_id}.{LABEL_EXTENSION}.{TEMP_SUFFIX}"));

    let content = format_label_rows(rows);
    fs::write(&temp_path, content).map_err(BccdError::io_at(&temp_path))?;
    if let Err(source) = fs::rename(&temp_path, &label_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(BccdError::IoAt {
            path: label_path,
            source,
        });
    }

    Ok(label_path)
}

/// Read a label file back into rows. Blank lines are skipped.
pub fn read_label_file(path: &Path) -> Result<Vec<LabelRow>, BccdError> {
    let content = fs::read_to_string(path).map_err(BccdError::io_at(path))?;
    let mut rows = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        if let Some(row) = parse_label_line(line, path, line_idx + 1)? {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelRow>, BccdError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // At most 6 tokens so pathological inputs stay bounded.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();
    if tokens.len() != 5 {
        return Err(label_parse_error(
            file_path,
            line_num,
            format!("expected 5 tokens, found {}", tokens.len()),
        ));
    }

    let class_id = tokens[0].parse::<usize>().map_err(|_| {
        label_parse_error(
            file_path,
            line_num,
            format!("invalid class_id '{}'; expected non-negative integer", tokens[0]),
        )
    })?;

    let mut values = [0.0f64; 4];
    for (slot, raw) in values.iter_mut().zip(&tokens[1..]) {
        *slot = raw.parse::<f64>().map_err(|_| {
            label_parse_error(
                file_path,
                line_num,
                format!("invalid coordinate '{raw}'; expected floating-point number"),
            )
        })?;
    }
    let [cx, cy, w, h] = values;

    Ok(Some(LabelRow {
        class_id: ClassId::new(class_id),
        bbox: BBox::<Normalized>::from_cxcywh(cx, cy, w, h),
    }))
}

fn label_parse_error(path: &Path, line: usize, message: String) -> BccdError {
    BccdError::LabelParse {
        path: path.to_path_buf(),
        line,
        message,
    }
}

/// Fuzz-only entrypoint for single-line label parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), BccdError> {
    let _ = parse_label_line(input, Path::new("<fuzz>"), 1)?;
    Ok(())
}

/// The `data.yaml` document consumed by the training collaborator.
///
/// Field order is the serialized key order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Absolute path of the dataset root.
    pub path: String,
    /// Train images, relative to `path`.
    pub train: String,
    /// Validation images, relative to `path`.
    pub val: String,
    /// Test images, relative to `path`.
    pub test: String,
    /// Class ID to class name, in whitelist order.
    pub names: BTreeMap<usize, String>,
}

impl Manifest {
    /// Build a manifest for a dataset rooted at `root`.
    ///
    /// `root` is made absolute against the current directory; symlinks are
    /// not resolved.
    pub fn new(root: &Path, classes: &ClassList) -> Result<Self, BccdError> {
        let absolute = std::path::absolute(root).map_err(BccdError::io_at(root))?;
        Ok(Self {
            path: absolute.to_string_lossy().into_owned(),
            train: "images/train".to_string(),
            val: "images/val".to_string(),
            test: "images/test".to_string(),
            names: classes
                .iter()
                .map(|(id, name)| (id.as_usize(), name.to_string()))
                .collect(),
        })
    }

    /// Class names ordered by ID.
    pub fn class_names(&self) -> Vec<&str> {
        self.names.values().map(String::as_str).collect()
    }

    /// Serialize to YAML text.
    pub fn to_yaml_string(&self, path: &Path) -> Result<String, BccdError> {
        serde_yaml::to_string(self).map_err(|source| BccdError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the manifest to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), BccdError> {
        let yaml = self.to_yaml_string(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(BccdError::io_at(parent))?;
        }
        fs::write(path, yaml).map_err(BccdError::io_at(path))
    }

    /// Read a manifest previously written by [`Manifest::write`].
    pub fn read(path: &Path) -> Result<Self, BccdError> {
        let data = fs::read_to_string(path).map_err(BccdError::io_at(path))?;
        serde_yaml::from_str(&data).map_err(|source| BccdError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
