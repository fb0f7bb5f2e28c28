#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use bccdprep::ConvertConfig;

/// One `<object>` in a fixture annotation.
pub struct FixtureObject<'a> {
    pub name: &'a str,
    pub difficult: Option<&'a str>,
    /// xmin, ymin, xmax, ymax
    pub bndbox: [f64; 4],
}

pub fn obj(name: &str, bndbox: [f64; 4]) -> FixtureObject<'_> {
    FixtureObject {
        name,
        difficult: Some("0"),
        bndbox,
    }
}

pub fn difficult_obj(name: &str, bndbox: [f64; 4]) -> FixtureObject<'_> {
    FixtureObject {
        name,
        difficult: Some("1"),
        bndbox,
    }
}

pub fn voc_xml(image_id: &str, width: u32, height: u32, objects: &[FixtureObject<'_>]) -> String {
    let mut xml = format!(
        "<annotation>\n  <folder>JPEGImages</folder>\n  <filename>{image_id}.jpg</filename>\n  <size>\n    <width>{width}</width>\n    <height>{height}</height>\n    <depth>3</depth>\n  </size>\n"
    );
    for object in objects {
        xml.push_str("  <object>\n");
        xml.push_str(&format!("    <name>{}</name>\n", object.name));
        xml.push_str("    <pose>Unspecified</pose>\n    <truncated>0</truncated>\n");
        if let Some(difficult) = object.difficult {
            xml.push_str(&format!("    <difficult>{difficult}</difficult>\n"));
        }
        let [xmin, ymin, xmax, ymax] = object.bndbox;
        xml.push_str(&format!(
            "    <bndbox>\n      <xmin>{xmin}</xmin>\n      <ymin>{ymin}</ymin>\n      <xmax>{xmax}</xmax>\n      <ymax>{ymax}</ymax>\n    </bndbox>\n"
        ));
        xml.push_str("  </object>\n");
    }
    xml.push_str("</annotation>\n");
    xml
}

/// A raw BCCD checkout under a temp dir: `<raw>/BCCD/{Annotations,JPEGImages}`.
pub struct RawDataset {
    pub raw_dir: PathBuf,
}

impl RawDataset {
    pub fn create(root: &Path) -> Self {
        let raw_dir = root.join("BCCD_Dataset_Raw");
        fs::create_dir_all(raw_dir.join("BCCD/Annotations")).expect("create annotations dir");
        fs::create_dir_all(raw_dir.join("BCCD/JPEGImages")).expect("create images dir");
        Self { raw_dir }
    }

    pub fn annotations_dir(&self) -> PathBuf {
        self.raw_dir.join("BCCD/Annotations")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.raw_dir.join("BCCD/JPEGImages")
    }

    /// Write an annotation and a matching `.jpg`.
    pub fn add(&self, image_id: &str, objects: &[FixtureObject<'_>]) {
        self.add_annotation(image_id, 640, 480, objects);
        self.add_image(image_id, "jpg");
    }

    pub fn add_annotation(&self, image_id: &str, width: u32, height: u32, objects: &[FixtureObject<'_>]) {
        fs::write(
            self.annotations_dir().join(format!("{image_id}.xml")),
            voc_xml(image_id, width, height, objects),
        )
        .expect("write annotation");
    }

    pub fn add_image(&self, image_id: &str, ext: &str) {
        fs::write(
            self.images_dir().join(format!("{image_id}.{ext}")),
            jpeg_bytes(image_id),
        )
        .expect("write image");
    }

    /// `count` images named `BloodImage_00000`.., each with one RBC.
    pub fn with_rbc_images(root: &Path, count: usize) -> Self {
        let raw = Self::create(root);
        for i in 0..count {
            raw.add(
                &format!("BloodImage_{i:05}"),
                &[obj("RBC", [10.0, 20.0, 50.0, 60.0])],
            );
        }
        raw
    }

    pub fn config(&self, output_dir: &Path) -> ConvertConfig {
        ConvertConfig {
            raw_dir: self.raw_dir.clone(),
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        }
    }

    /// Like [`RawDataset::config`], but every image goes to `train`.
    pub fn train_only_config(&self, output_dir: &Path) -> ConvertConfig {
        ConvertConfig {
            split_ratios: "1.0,0.0,0.0".parse().expect("split ratios"),
            ..self.config(output_dir)
        }
    }
}

/// Placeholder image content; the converter copies images byte for byte.
pub fn jpeg_bytes(tag: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(tag.as_bytes());
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

/// File names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
