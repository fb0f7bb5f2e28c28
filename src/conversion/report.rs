//! Run summary for a dataset conversion.
//!
//! Per-record problems never abort a run. They are counted here and, where a
//! user would want to find the offending file, recorded as an issue.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::split::Split;

/// A report generated by one conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Seed the split was computed with.
    pub seed: u64,
    /// Images assigned to each split before any skipping.
    pub planned: SplitCounts,
    /// Images actually written to each split.
    pub written: SplitCounts,
    /// Label lines written across all splits.
    pub labels_written: usize,
    /// Images left out of the output, by reason.
    pub skipped_images: SkippedImages,
    /// Objects left out of the labels, by reason.
    pub skipped_annotations: SkippedAnnotations,
    /// Unknown class names and how often each was seen.
    pub unknown_classes: BTreeMap<String, usize>,
    /// Issues discovered during the run.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Issues with the given code.
    pub fn issues_with(&self, code: ConversionIssueCode) -> impl Iterator<Item = &ConversionIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion summary (seed {}):", self.seed)?;
        for split in Split::ALL {
            writeln!(
                f,
                "  {:<5} {} of {} image(s) written",
                split.dir_name(),
                self.written.get(split),
                self.planned.get(split)
            )?;
        }
        writeln!(f, "  {} label line(s) written", self.labels_written)?;

        let images = &self.skipped_images;
        if images.total() > 0 {
            writeln!(f)?;
            writeln!(f, "Skipped images ({}):", images.total())?;
            writeln!(f, "  - missing image file: {}", images.missing_image)?;
            writeln!(
                f,
                "  - no retained annotations: {}",
                images.no_retained_annotations
            )?;
        }

        let annotations = &self.skipped_annotations;
        if annotations.total() > 0 {
            writeln!(f)?;
            writeln!(f, "Skipped annotations ({}):", annotations.total())?;
            writeln!(f, "  - difficult: {}", annotations.difficult)?;
            writeln!(f, "  - unknown class: {}", annotations.unknown_class)?;
            for (name, count) in &self.unknown_classes {
                writeln!(f, "      '{}' x{}", name, count)?;
            }
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Image counts per split.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitCounts {
    pub fn get(&self, split: Split) -> usize {
        match split {
            Split::Train => self.train,
            Split::Val => self.val,
            Split::Test => self.test,
        }
    }

    pub fn increment(&mut self, split: Split) {
        match split {
            Split::Train => self.train += 1,
            Split::Val => self.val += 1,
            Split::Test => self.test += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SkippedImages {
    pub missing_image: usize,
    pub no_retained_annotations: usize,
}

impl SkippedImages {
    pub fn total(&self) -> usize {
        self.missing_image + self.no_retained_annotations
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SkippedAnnotations {
    pub difficult: usize,
    pub unknown_class: usize,
}

impl SkippedAnnotations {
    pub fn total(&self) -> usize {
        self.difficult + self.unknown_class
    }
}

/// A single issue discovered during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    Warning,
    Info,
}

/// Stable issue codes. These appear in the JSON report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// No image file matched an annotation file.
    MissingImage,
    /// A box lies outside the image or has inverted corners; written unchanged.
    BoxOutOfBounds,
    /// An image lost all its objects to filtering and was left out.
    NoRetainedAnnotations,
    /// An image lost all its objects to filtering and was kept as a hard negative.
    EmptyImageKept,
}
