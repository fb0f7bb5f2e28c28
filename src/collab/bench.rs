//! Throughput measurement around a [`Detector`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::info;

use super::{Detector, PredictParams};
use crate::error::BccdError;

/// Benchmark settings. Defaults: batch of 4, one warmup call, 10 timed calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BenchmarkOptions {
    pub batch_size: usize,
    pub warmup: usize,
    pub iterations: usize,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            batch_size: 4,
            warmup: 1,
            iterations: 10,
        }
    }
}

/// Result of a benchmark run.
#[derive(Clone, Debug, PartialEq)]
pub struct FpsReport {
    pub batch_size: usize,
    pub iterations: usize,
    pub frames: usize,
    pub elapsed: Duration,
    pub fps: f64,
}

/// Pick a batch of `batch_size` images.
///
/// Images are taken in sorted order. With fewer than `batch_size` images
/// available, the list is repeated until the batch is full.
pub fn select_benchmark_batch(
    images: &[PathBuf],
    batch_size: usize,
) -> Result<Vec<PathBuf>, BccdError> {
    if batch_size == 0 {
        return Err(BccdError::Benchmark {
            message: "batch size must be greater than 0".to_string(),
        });
    }
    if images.is_empty() {
        return Err(BccdError::Benchmark {
            message: "no images available for the benchmark batch".to_string(),
        });
    }

    let mut sorted = images.to_vec();
    sorted.sort();
    Ok(sorted.iter().cycle().take(batch_size).cloned().collect())
}

/// Time `options.iterations` calls of `detector.predict` on `batch`.
///
/// `options.warmup` calls run first and are not timed.
/// `fps = iterations * batch.len() / elapsed_seconds`.
pub fn benchmark_fps<D: Detector + ?Sized>(
    detector: &mut D,
    batch: &[PathBuf],
    params: &PredictParams,
    options: &BenchmarkOptions,
) -> Result<FpsReport, BccdError> {
    if batch.is_empty() {
        return Err(BccdError::Benchmark {
            message: "benchmark batch is empty".to_string(),
        });
    }
    if options.iterations == 0 {
        return Err(BccdError::Benchmark {
            message: "iterations must be greater than 0".to_string(),
        });
    }

    for _ in 0..options.warmup {
        detector.predict(batch, params)?;
    }

    let start = Instant::now();
    for _ in 0..options.iterations {
        detector.predict(batch, params)?;
    }
    let elapsed = start.elapsed();

    let frames = options.iterations * batch.len();
    let secs = elapsed.as_secs_f64();
    let fps = if secs > 0.0 {
        frames as f64 / secs
    } else {
        f64::INFINITY
    };

    info!(
        "batch size {}: {} frame(s) in {:.3}s, {:.2} FPS",
        batch.len(),
        frames,
        secs,
        fps
    );

    Ok(FpsReport {
        batch_size: batch.len(),
        iterations: options.iterations,
        frames,
        elapsed,
        fps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::Prediction;

    #[derive(Default)]
    struct CountingDetector {
        calls: usize,
        images_seen: usize,
    }

    impl Detector for CountingDetector {
        fn predict(
            &mut self,
            images: &[PathBuf],
            _params: &PredictParams,
        ) -> Result<Vec<Prediction>, BccdError> {
            self.calls += 1;
            self.images_seen += images.len();
            std::thread::sleep(Duration::from_millis(1));
            Ok(images
                .iter()
                .map(|image| Prediction {
                    image: image.clone(),
                    detections: vec![],
                })
                .collect())
        }
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn predict(
            &mut self,
            _images: &[PathBuf],
            _params: &PredictParams,
        ) -> Result<Vec<Prediction>, BccdError> {
            Err(BccdError::Detector {
                message: "model not loaded".to_string(),
            })
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn batch_takes_first_sorted_images() {
        let batch = select_benchmark_batch(&paths(&["e.jpg", "a.jpg", "c.jpg", "b.jpg", "d.jpg"]), 4)
            .expect("select batch");
        assert_eq!(batch, paths(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]));
    }

    #[test]
    fn batch_repeats_short_lists() {
        let batch = select_benchmark_batch(&paths(&["b.jpg", "a.jpg"]), 4).expect("select batch");
        assert_eq!(batch, paths(&["a.jpg", "b.jpg", "a.jpg", "b.jpg"]));

        let batch = select_benchmark_batch(&paths(&["a.jpg"]), 4).expect("select batch");
        assert_eq!(batch.len(), 4);
    }

    #[test]
    fn batch_rejects_empty_input() {
        assert!(select_benchmark_batch(&[], 4).is_err());
        assert!(select_benchmark_batch(&paths(&["a.jpg"]), 0).is_err());
    }

    #[test]
    fn benchmark_runs_warmup_plus_timed_iterations() {
        let mut detector = CountingDetector::default();
        let batch = paths(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
        let report = benchmark_fps(
            &mut detector,
            &batch,
            &PredictParams::default(),
            &BenchmarkOptions::default(),
        )
        .expect("benchmark");

        assert_eq!(detector.calls, 11);
        assert_eq!(detector.images_seen, 44);
        assert_eq!(report.frames, 40);
        assert_eq!(report.batch_size, 4);
        assert!(report.fps > 0.0);
        assert!(report.elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn benchmark_propagates_detector_errors() {
        let err = benchmark_fps(
            &mut FailingDetector,
            &paths(&["a.jpg"]),
            &PredictParams::default(),
            &BenchmarkOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BccdError::Detector { .. }));
    }

    #[test]
    fn benchmark_rejects_zero_iterations() {
        let options = BenchmarkOptions {
            iterations: 0,
            ..Default::default()
        };
        assert!(benchmark_fps(
            &mut CountingDetector::default(),
            &paths(&["a.jpg"]),
            &PredictParams::default(),
            &options
        )
        .is_err());
    }
}
