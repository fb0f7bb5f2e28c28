//! Records read from VOC annotation files and written as YOLO labels.

use serde::{Deserialize, Serialize};

use super::bbox::BBox;
use super::ids::ClassId;
use super::space::{Normalized, Pixel};
use crate::error::BccdError;

/// One annotated image: the contents of a single VOC XML file.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRecord {
    /// File stem shared by the annotation file and the image file.
    pub image_id: String,

    /// Width in pixels, from `<size><width>`.
    pub width: u32,

    /// Height in pixels, from `<size><height>`.
    pub height: u32,

    /// Objects in document order.
    pub objects: Vec<ObjectRecord>,
}

/// One `<object>` entry of a VOC file, before any filtering.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRecord {
    pub class_name: String,
    pub difficult: bool,
    pub bbox: BBox<Pixel>,
}

/// One line of a YOLO label file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelRow {
    pub class_id: ClassId,
    pub bbox: BBox<Normalized>,
}

impl LabelRow {
    /// Converts a pixel-space object to a normalized label row.
    pub fn from_pixel(class_id: ClassId, bbox: &BBox<Pixel>, width: u32, height: u32) -> Self {
        Self {
            class_id,
            bbox: bbox.to_normalized(width as f64, height as f64),
        }
    }
}

/// The ordered class whitelist. Position in the list is the class ID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassList {
    names: Vec<String>,
}

impl ClassList {
    /// Builds a whitelist, rejecting empty lists, blank names and duplicates.
    pub fn new<I, S>(names: I) -> Result<Self, BccdError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.into().trim().to_string())
            .collect();

        if names.is_empty() {
            return Err(BccdError::InvalidConfig {
                message: "class whitelist must not be empty".to_string(),
            });
        }

        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(BccdError::InvalidConfig {
                    message: format!("class whitelist entry {idx} is blank"),
                });
            }
            if names[..idx].contains(name) {
                return Err(BccdError::InvalidConfig {
                    message: format!("class '{name}' appears more than once in the whitelist"),
                });
            }
        }

        Ok(Self { names })
    }

    /// Looks up the ID of a class name. Matching is exact and case-sensitive.
    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .map(ClassId::new)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(id, name)` pairs in whitelist order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (ClassId::new(idx), name.as_str()))
    }
}

impl Default for ClassList {
    fn default() -> Self {
        Self {
            names: ["WBC", "RBC", "Platelets"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl TryFrom<Vec<String>> for ClassList {
    type Error = BccdError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<ClassList> for Vec<String> {
    fn from(list: ClassList) -> Self {
        list.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_whitelist_is_bccd_order() {
        let classes = ClassList::default();
        assert_eq!(classes.id_of("WBC"), Some(ClassId(0)));
        assert_eq!(classes.id_of("RBC"), Some(ClassId(1)));
        assert_eq!(classes.id_of("Platelets"), Some(ClassId(2)));
        assert_eq!(classes.id_of("rbc"), None);
    }

    #[test]
    fn rejects_empty_and_duplicate_whitelists() {
        assert!(ClassList::new(Vec::<String>::new()).is_err());
        assert!(ClassList::new(["WBC", "RBC", "WBC"]).is_err());
        assert!(ClassList::new(["WBC", "  "]).is_err());
    }

    #[test]
    fn trims_names() {
        let classes = ClassList::new([" WBC ", "RBC"]).expect("valid list");
        assert_eq!(classes.names(), ["WBC".to_string(), "RBC".to_string()]);
    }

    #[test]
    fn label_row_normalizes_against_image_size() {
        let bbox = BBox::from_corners(10.0, 50.0, 20.0, 60.0);
        let row = LabelRow::from_pixel(ClassId(1), &bbox, 100, 200);
        let (cx, cy, w, h) = row.bbox.to_cxcywh();
        assert!((cx - 0.3).abs() < 1e-12);
        assert!((cy - 0.2).abs() < 1e-12);
        assert!((w - 0.4).abs() < 1e-12);
        assert!((h - 0.2).abs() < 1e-12);
    }
}
