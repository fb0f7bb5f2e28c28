//! Criterion microbenches for the conversion hot paths.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure:
//! - VOC XML parsing of a BCCD-sized annotation (from_voc_xml_str)
//! - filtering plus label formatting for one image
//! - the seeded split over a dataset-sized file list

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use std::path::PathBuf;

use bccdprep::conversion::filter_objects;
use bccdprep::ir::io_voc_xml::from_voc_xml_str;
use bccdprep::ir::io_yolo::format_label_rows;
use bccdprep::ir::ClassList;
use bccdprep::split::{plan_split, SplitRatios};

/// A BCCD image typically carries one WBC, a dozen RBCs and a platelet or two.
fn bccd_annotation() -> String {
    let mut xml = String::from(
        "<annotation>\n  <filename>BloodImage_00000.jpg</filename>\n  <size>\n    <width>640</width>\n    <height>480</height>\n    <depth>3</depth>\n  </size>\n",
    );
    let objects = [("WBC", 1)]
        .into_iter()
        .chain(std::iter::repeat(("RBC", 0)).take(14))
        .chain([("Platelets", 0), ("Platelets", 1)]);
    for (i, (name, difficult)) in objects.enumerate() {
        let x = (i * 31) % 560;
        let y = (i * 17) % 400;
        xml.push_str(&format!(
            "  <object>\n    <name>{name}</name>\n    <pose>Unspecified</pose>\n    <truncated>0</truncated>\n    <difficult>{difficult}</difficult>\n    <bndbox>\n      <xmin>{}</xmin>\n      <ymin>{}</ymin>\n      <xmax>{}</xmax>\n      <ymax>{}</ymax>\n    </bndbox>\n  </object>\n",
            x,
            y,
            x + 80,
            y + 70
        ));
    }
    xml.push_str("</annotation>\n");
    xml
}

/// Benchmark VOC XML parsing from string.
fn bench_voc_parse(c: &mut Criterion) {
    let xml = bccd_annotation();
    let mut group = c.benchmark_group("voc_parse");
    group.throughput(Throughput::Bytes(xml.len() as u64));

    group.bench_function("from_voc_xml_str", |b| {
        b.iter(|| {
            let record = from_voc_xml_str(black_box(&xml), "BloodImage_00000").unwrap();
            black_box(record)
        })
    });

    group.finish();
}

/// Benchmark filtering and label formatting for one parsed image.
fn bench_label_write(c: &mut Criterion) {
    let record = from_voc_xml_str(&bccd_annotation(), "BloodImage_00000").unwrap();
    let classes = ClassList::default();
    let mut group = c.benchmark_group("label_write");
    group.throughput(Throughput::Elements(record.objects.len() as u64));

    group.bench_function("filter_and_format", |b| {
        b.iter(|| {
            let filtered = filter_objects(black_box(&record), &classes);
            black_box(format_label_rows(&filtered.rows))
        })
    });

    group.finish();
}

/// Benchmark the seeded split over a BCCD-sized file list.
fn bench_plan_split(c: &mut Criterion) {
    let files: Vec<PathBuf> = (0..410)
        .rev()
        .map(|i| PathBuf::from(format!("Annotations/BloodImage_{i:05}.xml")))
        .collect();
    let ratios = SplitRatios::default();
    let mut group = c.benchmark_group("split");
    group.throughput(Throughput::Elements(files.len() as u64));

    group.bench_function("plan_split", |b| {
        b.iter(|| black_box(plan_split(black_box(&files), &ratios, 42)))
    });

    group.finish();
}

criterion_group!(benches, bench_voc_parse, bench_label_write, bench_plan_split);
criterion_main!(benches);
