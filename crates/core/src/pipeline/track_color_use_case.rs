use std::path::Path;
use std::time::{Duration, Instant};

use crate::detection::domain::blob_selector::BlobSelector;
use crate::pipeline::artifact_sink::ArtifactSink;
use crate::pipeline::error::PipelineError;
use crate::pipeline::pipeline_logger::{PipelineLogger, ProgressReport};
use crate::rendering::trail_compositor::TrailCompositor;
use crate::segmentation::domain::color_segmenter::ColorSegmenter;
use crate::shared::config::TrackerConfig;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::tracking::domain::track_state::TrackState;
use crate::video::domain::video_reader::VideoReader;

/// Counters describing a finished run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStats {
    pub frames_read: usize,
    pub frames_processed: usize,
    pub detections: usize,
    pub elapsed: Duration,
}

impl RunStats {
    /// Fraction of processed frames that yielded a candidate.
    pub fn detection_ratio(&self) -> f64 {
        if self.frames_processed == 0 {
            0.0
        } else {
            self.detections as f64 / self.frames_processed as f64
        }
    }

    pub fn average_fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames_processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives one tracking run over a video, frame by frame.
///
/// For every frame that survives the skip stride: segment, select, update
/// the track, fade and extend the trail, composite and hand the result to
/// the sink. The track state and trail canvas live only for the duration
/// of [`execute`](Self::execute).
pub struct TrackColorUseCase {
    reader: Box<dyn VideoReader>,
    segmenter: Box<dyn ColorSegmenter>,
    selector: Box<dyn BlobSelector>,
    sink: ArtifactSink,
    logger: Box<dyn PipelineLogger>,
    config: TrackerConfig,
}

impl TrackColorUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        segmenter: Box<dyn ColorSegmenter>,
        selector: Box<dyn BlobSelector>,
        sink: ArtifactSink,
        logger: Box<dyn PipelineLogger>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            reader,
            segmenter,
            selector,
            sink,
            logger,
            config,
        }
    }

    pub fn execute(&mut self, input: &Path) -> Result<RunStats, PipelineError> {
        let metadata = self
            .reader
            .open(input)
            .map_err(|source| PipelineError::InputOpen {
                path: input.to_path_buf(),
                source,
            })?;

        self.logger.info(&format!(
            "Input: {} ({}x{} @ {:.2} fps, ~{} frames)",
            input.display(),
            metadata.width,
            metadata.height,
            metadata.output_fps(),
            metadata.total_frames
        ));

        let result = self.run(&metadata);
        self.reader.close();

        let stats = result?;
        self.report(&stats);
        Ok(stats)
    }

    fn run(&mut self, metadata: &VideoMetadata) -> Result<RunStats, PipelineError> {
        let Self {
            reader,
            segmenter,
            selector,
            sink,
            logger,
            config,
        } = self;

        sink.open(metadata)?;

        let stride = config.frame_skip_stride.max(1);
        let mut track = TrackState::new(config.max_gap_frames);
        let mut compositor = TrailCompositor::new(metadata.width, metadata.height, config);
        let mut stats = RunStats::default();
        let mut last_frame: Option<Frame> = None;
        let start = Instant::now();

        for item in reader.frames() {
            let frame = item.map_err(|source| PipelineError::FrameRead {
                index: stats.frames_read,
                source,
            })?;
            stats.frames_read += 1;

            if stride > 1 && stats.frames_read % stride != 0 {
                last_frame = Some(frame);
                continue;
            }
            stats.frames_processed += 1;
            let processed = stats.frames_processed;

            let t = Instant::now();
            let mask = segmenter.segment(&frame);
            logger.timing("segment", elapsed_ms(t));

            let t = Instant::now();
            let candidate = selector.select(&mask);
            logger.timing("select", elapsed_ms(t));

            if candidate.is_some() {
                stats.detections += 1;
            }
            let center = candidate.map(|blob| blob.center);

            let t = Instant::now();
            compositor.fade();
            if let Some(segment) = track.update(center) {
                compositor.extend(segment);
            }
            let output = compositor.composite(&frame, center);
            logger.timing("composite", elapsed_ms(t));

            let t = Instant::now();
            sink.write_frame(&output)?;
            sink.maybe_write_mask(processed, &mask)?;
            logger.timing("write", elapsed_ms(t));

            logger.progress(&ProgressReport {
                processed,
                read: stats.frames_read,
                total: metadata.total_frames,
                detections: stats.detections,
                frames_without: track.frames_without(),
                area: candidate.map(|blob| blob.area),
                center,
            });

            last_frame = Some(frame);
        }

        sink.finish(last_frame.as_ref(), &compositor)?;
        stats.elapsed = start.elapsed();
        Ok(stats)
    }

    fn report(&mut self, stats: &RunStats) {
        self.logger.summary();
        self.logger.info(&format!(
            "Done: read {} frames, processed {} (stride {})",
            stats.frames_read,
            stats.frames_processed,
            self.config.frame_skip_stride.max(1)
        ));
        self.logger.info(&format!(
            "Detections: {} ({:.1}%), elapsed {:.1}s, avg {:.1} fps",
            stats.detections,
            stats.detection_ratio() * 100.0,
            stats.elapsed.as_secs_f64(),
            stats.average_fps()
        ));

        let paths = self.sink.paths().clone();
        self.logger.info(&format!("Wrote video: {}", paths.video.display()));
        self.logger.info(&format!("Wrote overlay: {}", paths.overlay.display()));
        self.logger.info(&format!("Wrote trail: {}", paths.trail.display()));
        if self.sink.masks_written() > 0 {
            self.logger.info(&format!(
                "Wrote {} debug masks to {}",
                self.sink.masks_written(),
                paths.debug_dir.display()
            ));
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
