//! VOC → YOLO dataset conversion.
//!
//! One sequential pass: enumerate annotation files, plan the split, then for
//! each file parse, filter, normalize and write. The manifest is written last,
//! only after every image has been handled.

pub mod report;

pub use report::{
    ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity, SkippedAnnotations,
    SkippedImages, SplitCounts,
};

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::ConvertConfig;
use crate::error::BccdError;
use crate::ir::io_voc_xml::{collect_annotation_files, find_image, read_voc_file};
use crate::ir::io_yolo::{write_label_file, Manifest};
use crate::ir::{ClassList, ImageRecord, LabelRow};
use crate::split::{plan_split, Split, SplitPlan};

/// The result of a successful conversion.
#[derive(Clone, Debug)]
pub struct ConvertOutcome {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    pub report: ConversionReport,
}

/// What survived filtering for one image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredObjects {
    /// Retained objects, in document order.
    pub rows: Vec<LabelRow>,
    /// Class names of objects dropped as difficult, in document order.
    pub difficult: Vec<String>,
    /// Names of objects dropped for not being whitelisted, in document order.
    pub unknown_classes: Vec<String>,
    /// Retained objects whose box is not inside the image.
    pub out_of_bounds: usize,
}

/// Apply the `difficult` flag and the class whitelist, then normalize.
///
/// Difficult objects are dropped before the whitelist is consulted, so a
/// difficult object of an unknown class counts as difficult.
pub fn filter_objects(record: &ImageRecord, classes: &ClassList) -> FilteredObjects {
    let mut filtered = FilteredObjects::default();

    for object in &record.objects {
        if object.difficult {
            filtered.difficult.push(object.class_name.clone());
            continue;
        }

        let Some(class_id) = classes.id_of(&object.class_name) else {
            filtered.unknown_classes.push(object.class_name.clone());
            continue;
        };

        if !object.bbox.is_within(record.width, record.height) {
            filtered.out_of_bounds += 1;
        }

        filtered.rows.push(LabelRow::from_pixel(
            class_id,
            &object.bbox,
            record.width,
            record.height,
        ));
    }

    filtered
}

/// Output directories of a converted dataset.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Create empty `images/<split>` and `labels/<split>` dirs for every split.
    ///
    /// Split dirs left by an earlier run are removed first, so an image can
    /// only ever be found in the split of the current plan. Nothing else under
    /// `root` is touched.
    pub fn create(root: &Path) -> Result<Self, BccdError> {
        let layout = Self {
            root: root.to_path_buf(),
        };
        for split in Split::ALL {
            for dir in [layout.images_dir(split), layout.labels_dir(split)] {
                if dir.exists() {
                    debug!("clearing previous output in {}", dir.display());
                    fs::remove_dir_all(&dir).map_err(BccdError::io_at(&dir))?;
                }
                fs::create_dir_all(&dir).map_err(BccdError::io_at(&dir))?;
            }
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self, split: Split) -> PathBuf {
        self.root.join("images").join(split.dir_name())
    }

    pub fn labels_dir(&self, split: Split) -> PathBuf {
        self.root.join("labels").join(split.dir_name())
    }
}

/// Enumerate annotation files and compute the split without writing anything.
pub fn plan(config: &ConvertConfig) -> Result<SplitPlan, BccdError> {
    config.validate()?;

    let annotations_dir = config.annotations_dir();
    if !annotations_dir.is_dir() {
        return Err(BccdError::RawDataMissing {
            path: annotations_dir,
            dataset_url: config.dataset_url.clone(),
        });
    }

    let files = collect_annotation_files(&annotations_dir)?;
    info!(
        "found {} annotation file(s) in {}",
        files.len(),
        annotations_dir.display()
    );

    Ok(plan_split(&files, &config.split_ratios, config.seed))
}

/// Convert the raw VOC dataset described by `config` into a YOLO dataset.
///
/// Fatal: invalid config, missing annotation directory, malformed annotation
/// file, any filesystem failure on the output side. Everything else is
/// counted in the returned report.
pub fn convert(config: &ConvertConfig) -> Result<ConvertOutcome, BccdError> {
    let plan = plan(config)?;
    let layout = OutputLayout::create(&config.output_dir)?;
    let images_dir = config.images_dir();

    let mut report = ConversionReport::new(config.seed);
    report.planned = SplitCounts {
        train: plan.train.len(),
        val: plan.val.len(),
        test: plan.test.len(),
    };
    debug!(
        "split plan: {} train, {} val, {} test",
        plan.train.len(),
        plan.val.len(),
        plan.test.len()
    );

    for (split, annotation_path) in plan.iter() {
        let record = read_voc_file(annotation_path)?;

        let Some(image_path) = find_image(&images_dir, &record.image_id, &config.image_extension)
        else {
            warn!(
                "{}: no image file in {}; skipping",
                record.image_id,
                images_dir.display()
            );
            report.skipped_images.missing_image += 1;
            report.add(ConversionIssue::warning(
                ConversionIssueCode::MissingImage,
                format!(
                    "{}: no image file found for {}",
                    record.image_id,
                    annotation_path.display()
                ),
            ));
            continue;
        };

        let filtered = filter_objects(&record, &config.class_whitelist);
        record_filtering(&record, &filtered, &mut report);

        if filtered.rows.is_empty() {
            if !config.keep_empty_images {
                debug!("{}: no retained annotations; skipping", record.image_id);
                report.skipped_images.no_retained_annotations += 1;
                report.add(ConversionIssue::info(
                    ConversionIssueCode::NoRetainedAnnotations,
                    format!("{}: no retained annotations, left out", record.image_id),
                ));
                continue;
            }
            report.add(ConversionIssue::info(
                ConversionIssueCode::EmptyImageKept,
                format!("{}: no retained annotations, kept with an empty label file", record.image_id),
            ));
        }

        copy_image(&image_path, &layout.images_dir(split))?;
        write_label_file(&layout.labels_dir(split), &record.image_id, &filtered.rows)?;

        report.written.increment(split);
        report.labels_written += filtered.rows.len();
    }

    let manifest = Manifest::new(layout.root(), &config.class_whitelist)?;
    let manifest_path = config.manifest_path();
    manifest.write(&manifest_path)?;

    info!(
        "wrote {} image(s) and {} label line(s) to {}",
        report.written.total(),
        report.labels_written,
        layout.root().display()
    );
    info!("manifest written to {}", manifest_path.display());

    Ok(ConvertOutcome {
        manifest,
        manifest_path,
        report,
    })
}

fn record_filtering(record: &ImageRecord, filtered: &FilteredObjects, report: &mut ConversionReport) {
    report.skipped_annotations.difficult += filtered.difficult.len();
    report.skipped_annotations.unknown_class += filtered.unknown_classes.len();
    for name in &filtered.difficult {
        debug!("{}: dropped difficult '{}' object", record.image_id, name);
    }
    for name in &filtered.unknown_classes {
        debug!("{}: dropped object of unknown class '{}'", record.image_id, name);
        *report.unknown_classes.entry(name.clone()).or_insert(0) += 1;
    }

    if filtered.out_of_bounds > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::BoxOutOfBounds,
            format!(
                "{}: {} box(es) outside the {}x{} image, written unchanged",
                record.image_id, filtered.out_of_bounds, record.width, record.height
            ),
        ));
    }
}

fn copy_image(source: &Path, target_dir: &Path) -> Result<(), BccdError> {
    let file_name = source.file_name().ok_or_else(|| BccdError::IoAt {
        path: source.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "image path has no file name"),
    })?;
    let target = target_dir.join(file_name);
    fs::copy(source, &target).map_err(BccdError::io_at(&target))?;
    Ok(())
}
