//! Pascal VOC XML reader.
//!
//! The raw BCCD layout keeps one XML file per image in a flat
//! `Annotations/` directory. Each file is parsed into an [`ImageRecord`]
//! without any filtering; class whitelisting and the `difficult` flag are
//! applied later by the converter.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use roxmltree::Node;
use walkdir::WalkDir;

use super::model::{ImageRecord, ObjectRecord};
use super::BBox;
use crate::error::BccdError;

const VOC_XML_EXTENSION: &str = "xml";
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tif"];

/// List the annotation files directly inside `dir`, sorted by file name.
///
/// The order never depends on filesystem enumeration order. Files in nested
/// directories are not read; their presence is logged.
pub fn collect_annotation_files(dir: &Path) -> Result<Vec<PathBuf>, BccdError> {
    let mut files = Vec::new();
    let mut nested = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|source| BccdError::IoAt {
            path: dir.to_path_buf(),
            source: source.into(),
        })?;

        if !entry.file_type().is_file() || !has_xml_extension(entry.path()) {
            continue;
        }

        if entry.depth() == 1 {
            files.push(entry.into_path());
        } else {
            nested.push(entry.into_path());
        }
    }

    files.sort_by_cached_key(|path| file_name_key(path));

    if !nested.is_empty() {
        nested.sort();
        warn!(
            "annotation directory is read flat; skipping {} nested .xml file(s), e.g. {}",
            nested.len(),
            nested[0].display()
        );
    }

    Ok(files)
}

/// Read and parse one VOC annotation file.
///
/// The image ID is the file stem of `path`.
pub fn read_voc_file(path: &Path) -> Result<ImageRecord, BccdError> {
    let image_id = image_id_for(path)?;
    let xml = fs::read_to_string(path).map_err(|source| BccdError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("cannot read file: {source}"),
    })?;
    parse_voc_xml_str(&xml, &image_id, path)
}

/// Parse VOC XML from a UTF-8 string.
pub fn from_voc_xml_str(xml: &str, image_id: &str) -> Result<ImageRecord, BccdError> {
    parse_voc_xml_str(xml, image_id, Path::new("<memory>"))
}

/// Parse VOC XML from bytes. The input must be valid UTF-8.
///
/// Mostly useful for fuzzing the parser in-memory.
pub fn from_voc_xml_slice(bytes: &[u8]) -> Result<ImageRecord, BccdError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| BccdError::VocXmlParse {
        path: PathBuf::from("<memory>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    from_voc_xml_str(xml, "<memory>")
}

/// Locate the image for `image_id` in `images_dir`.
///
/// `preferred_ext` is tried first, then the other common extensions.
/// Returns `None` when no candidate file exists.
pub fn find_image(images_dir: &Path, image_id: &str, preferred_ext: &str) -> Option<PathBuf> {
    let preferred = preferred_ext.trim_start_matches('.');
    std::iter::once(preferred)
        .chain(
            IMAGE_EXTENSIONS
                .iter()
                .copied()
                .filter(|ext| !ext.eq_ignore_ascii_case(preferred)),
        )
        .map(|ext| images_dir.join(format!("{image_id}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// The file stem of an annotation path.
pub fn image_id_for(path: &Path) -> Result<String, BccdError> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| BccdError::VocXmlParse {
            path: path.to_path_buf(),
            message: "annotation file has no file stem".to_string(),
        })
}

fn parse_voc_xml_str(xml: &str, image_id: &str, path: &Path) -> Result<ImageRecord, BccdError> {
    let document = roxmltree::Document::parse(xml).map_err(|source| BccdError::VocXmlParse {
        path: path.to_path_buf(),
        message: source.to_string(),
    })?;

    let annotation = document.root_element();
    if annotation.tag_name().name() != "annotation" {
        return Err(BccdError::VocXmlParse {
            path: path.to_path_buf(),
            message: "missing <annotation> root element".to_string(),
        });
    }

    let size = required_child_element(annotation, "size", path, "<annotation>")?;
    let width = parse_required_dimension(size, "width", path)?;
    let height = parse_required_dimension(size, "height", path)?;

    let mut objects = Vec::new();
    for object in annotation
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
    {
        let class_name = required_child_text(object, "name", path, "<object>")?;
        let difficult = match optional_child_text(object, "difficult") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| BccdError::VocXmlParse {
                path: path.to_path_buf(),
                message: format!("invalid <difficult> value '{raw}' in <object>; expected 0 or 1"),
            })?,
            None => false,
        };

        let bndbox = required_child_element(object, "bndbox", path, "<object>")?;
        let xmin = parse_required_f64(bndbox, "xmin", path)?;
        let xmax = parse_required_f64(bndbox, "xmax", path)?;
        let ymin = parse_required_f64(bndbox, "ymin", path)?;
        let ymax = parse_required_f64(bndbox, "ymax", path)?;

        objects.push(ObjectRecord {
            class_name,
            difficult,
            bbox: BBox::from_corners(xmin, xmax, ymin, ymax),
        });
    }

    Ok(ImageRecord {
        image_id: image_id.to_string(),
        width,
        height,
        objects,
    })
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, BccdError> {
    child_element(node, tag).ok_or_else(|| BccdError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, BccdError> {
    optional_child_text(node, tag).ok_or_else(|| BccdError::VocXmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn parse_required_dimension(node: Node<'_, '_>, tag: &str, path: &Path) -> Result<u32, BccdError> {
    let raw = required_child_text(node, tag, path, "<size>")?;
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(BccdError::VocXmlParse {
            path: path.to_path_buf(),
            message: format!("invalid <{tag}> value '{raw}' in <size>; expected a positive integer"),
        }),
    }
}

fn parse_required_f64(node: Node<'_, '_>, tag: &str, path: &Path) -> Result<f64, BccdError> {
    let raw = required_child_text(node, tag, path, "<bndbox>")?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(BccdError::VocXmlParse {
            path: path.to_path_buf(),
            message: format!("invalid <{tag}> value '{raw}' in <bndbox>; expected a number"),
        }),
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(VOC_XML_EXTENSION))
        .unwrap_or(false)
}

fn file_name_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
