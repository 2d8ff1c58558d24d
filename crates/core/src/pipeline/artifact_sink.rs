use std::path::{Path, PathBuf};

use crate::pipeline::error::PipelineError;
use crate::rendering::trail_compositor::TrailCompositor;
use crate::segmentation::domain::mask::Mask;
use crate::shared::config::TrackerConfig;
use crate::shared::constants::{
    DEBUG_DIR_NAME, OUTPUT_OVERLAY_NAME, OUTPUT_TRAIL_NAME, OUTPUT_VIDEO_NAME,
};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_writer::VideoWriter;

/// Where a run's artifacts land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub video: PathBuf,
    pub overlay: PathBuf,
    pub trail: PathBuf,
    pub debug_dir: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            video: dir.join(OUTPUT_VIDEO_NAME),
            overlay: dir.join(OUTPUT_OVERLAY_NAME),
            trail: dir.join(OUTPUT_TRAIL_NAME),
            debug_dir: dir.join(DEBUG_DIR_NAME),
        }
    }

    /// `mask_0001000.png` style name for the mask of processed frame `processed`.
    pub fn debug_mask(&self, processed: usize) -> PathBuf {
        self.debug_dir.join(format!("mask_{processed:07}.png"))
    }
}

/// Persists everything a run produces: the composited video, periodic
/// debug masks and the two final stills.
pub struct ArtifactSink {
    video_writer: Box<dyn VideoWriter>,
    image_writer: Box<dyn ImageWriter>,
    paths: OutputPaths,
    debug_cadence: Option<usize>,
    masks_written: usize,
}

impl ArtifactSink {
    pub fn new(
        video_writer: Box<dyn VideoWriter>,
        image_writer: Box<dyn ImageWriter>,
        paths: OutputPaths,
        config: &TrackerConfig,
    ) -> Self {
        Self {
            video_writer,
            image_writer,
            paths,
            debug_cadence: config
                .debug_enabled
                .then_some(config.debug_cadence.max(1)),
            masks_written: 0,
        }
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    pub fn masks_written(&self) -> usize {
        self.masks_written
    }

    /// Creates the output directory if needed and opens the video writer.
    pub fn open(&mut self, metadata: &VideoMetadata) -> Result<(), PipelineError> {
        if let Some(dir) = self.paths.video.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| PipelineError::OutputOpen {
                    path: dir.to_path_buf(),
                    source: e.into(),
                })?;
            }
        }
        self.video_writer
            .open(&self.paths.video, metadata)
            .map_err(|source| PipelineError::OutputOpen {
                path: self.paths.video.clone(),
                source,
            })
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), PipelineError> {
        self.video_writer
            .write(frame)
            .map_err(|source| PipelineError::OutputWrite {
                path: self.paths.video.clone(),
                source,
            })
    }

    /// Writes `mask` when debugging is on and `processed` falls on the
    /// cadence. Returns whether a file was written.
    pub fn maybe_write_mask(
        &mut self,
        processed: usize,
        mask: &Mask,
    ) -> Result<bool, PipelineError> {
        let Some(cadence) = self.debug_cadence else {
            return Ok(false);
        };
        if processed % cadence != 0 {
            return Ok(false);
        }
        let path = self.paths.debug_mask(processed);
        self.write_image(&path, &mask.to_frame(processed))?;
        self.masks_written += 1;
        Ok(true)
    }

    /// Finalizes the video, then writes the overlay and trail-only stills.
    ///
    /// The overlay is `last_frame` blended with the canvas, or the bare
    /// canvas when no frame was ever read.
    pub fn finish(
        &mut self,
        last_frame: Option<&Frame>,
        compositor: &TrailCompositor,
    ) -> Result<(), PipelineError> {
        self.video_writer
            .close()
            .map_err(|source| PipelineError::OutputWrite {
                path: self.paths.video.clone(),
                source,
            })?;

        let overlay = match last_frame {
            Some(frame) => compositor.blend(frame),
            None => compositor.canvas_frame(0),
        };
        self.write_image(&self.paths.overlay, &overlay)?;
        self.write_image(&self.paths.trail, &compositor.canvas_frame(overlay.index()))
    }

    fn write_image(&self, path: &Path, frame: &Frame) -> Result<(), PipelineError> {
        self.image_writer
            .write(path, frame)
            .map_err(|source| PipelineError::OutputWrite {
                path: path.to_path_buf(),
                source,
            })
    }
}
