use std::collections::HashMap;
use std::time::Instant;

use crate::detection::domain::blob::Point;

/// Per-frame snapshot handed to the logger after a frame is processed.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressReport {
    /// 1-based count of processed (non-skipped) frames.
    pub processed: usize,
    /// 1-based count of frames read from the source, skipped ones included.
    pub read: usize,
    /// Total frames the container reports; 0 when unknown.
    pub total: usize,
    pub detections: usize,
    /// Consecutive frames without an accepted candidate.
    pub frames_without: usize,
    /// Area of this frame's candidate, if any.
    pub area: Option<f64>,
    /// Center of this frame's candidate, if any.
    pub center: Option<Point>,
}

impl ProgressReport {
    /// Percent of the source consumed, 0 when the total is unknown.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.read as f64 / self.total as f64 * 100.0
        }
    }

    pub fn detection_ratio(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.detections as f64 / self.processed as f64
        }
    }
}

/// Cross-cutting logger for pipeline orchestration events.
///
/// Keeps the tracking driver free of output concerns: the CLI logs through
/// the `log` facade while tests record the reports.
pub trait PipelineLogger: Send {
    /// Report progress after a processed frame.
    fn progress(&mut self, report: &ProgressReport);

    /// Record how long a named pipeline stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-pipeline summary. Default: no-op.
    fn summary(&self) {}
}

/// Console logger: a progress line every `log_cadence` processed frames,
/// per-stage timing totals and a summary table at the end.
pub struct ConsolePipelineLogger {
    log_cadence: usize,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    processed: usize,
    lines_logged: usize,
}

impl ConsolePipelineLogger {
    pub fn new(log_cadence: usize) -> Self {
        Self {
            log_cadence: log_cadence.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            processed: 0,
            lines_logged: 0,
        }
    }

    /// Formats the progress line for `report` given the elapsed seconds.
    pub fn progress_line(report: &ProgressReport, elapsed_secs: f64) -> String {
        let fps = if elapsed_secs > 0.0 {
            report.processed as f64 / elapsed_secs
        } else {
            0.0
        };
        let area = report
            .area
            .map_or_else(|| "-".to_string(), |a| format!("{a:.0}"));
        let center = report
            .center
            .map_or_else(|| "-".to_string(), |c| format!("({}, {})", c.x, c.y));
        format!(
            "[{:>7}] {:5.1}% | {fps:6.1} fps | det {:5.1}% | gap {} | area {area} | center {center}",
            report.processed,
            report.percent(),
            report.detection_ratio() * 100.0,
            report.frames_without,
        )
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.processed;
        let mut lines = vec![format!(
            "Pipeline summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.2}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl Default for ConsolePipelineLogger {
    fn default() -> Self {
        Self::new(200)
    }
}

impl PipelineLogger for ConsolePipelineLogger {
    fn progress(&mut self, report: &ProgressReport) {
        self.processed = report.processed;
        if report.processed % self.log_cadence == 0 {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            log::info!("{}", Self::progress_line(report, elapsed));
            self.lines_logged += 1;
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn report(processed: usize) -> ProgressReport {
        ProgressReport {
            processed,
            read: processed,
            total: 400,
            detections: processed / 2,
            frames_without: 3,
            area: Some(812.4),
            center: Some(Point::new(120, 64)),
        }
    }

    #[test]
    fn test_percent_and_ratio() {
        let r = report(100);
        assert_relative_eq!(r.percent(), 25.0);
        assert_relative_eq!(r.detection_ratio(), 0.5);
    }

    #[test]
    fn test_percent_zero_when_total_unknown() {
        let r = ProgressReport {
            total: 0,
            ..report(10)
        };
        assert_eq!(r.percent(), 0.0);
    }

    #[test]
    fn test_ratio_zero_before_any_frame() {
        let r = ProgressReport {
            processed: 0,
            detections: 0,
            ..report(0)
        };
        assert_eq!(r.detection_ratio(), 0.0);
    }

    #[test]
    fn test_progress_line_fields() {
        let line = ConsolePipelineLogger::progress_line(&report(200), 10.0);
        assert!(line.contains("200"));
        assert!(line.contains("50.0%"));
        assert!(line.contains("20.0 fps"));
        assert!(line.contains("gap 3"));
        assert!(line.contains("area 812"));
        assert!(line.contains("center (120, 64)"));
    }

    #[test]
    fn test_progress_line_without_detection() {
        let r = ProgressReport {
            area: None,
            center: None,
            ..report(5)
        };
        let line = ConsolePipelineLogger::progress_line(&r, 0.0);
        assert!(line.contains("area -"));
        assert!(line.contains("center -"));
        assert!(line.contains("0.0 fps"));
    }

    #[test]
    fn test_progress_throttled_by_cadence() {
        let mut logger = ConsolePipelineLogger::new(10);
        for i in 1..=25 {
            logger.progress(&report(i));
        }
        assert_eq!(logger.lines_logged, 2);
        assert_eq!(logger.processed, 25);
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = ConsolePipelineLogger::new(10);
        logger.timing("segment", 2.0);
        logger.timing("segment", 4.0);
        logger.timing("write", 1.0);

        let segment = logger.timings_for("segment").unwrap();
        assert_eq!(segment.len(), 2);
        assert_relative_eq!(segment.iter().sum::<f64>() / 2.0, 3.0);
        assert_eq!(logger.timings_for("write").unwrap().len(), 1);
        assert!(logger.timings_for("select").is_none());
    }

    #[test]
    fn test_summary_lists_stages() {
        let mut logger = ConsolePipelineLogger::new(10);
        logger.progress(&report(10));
        logger.timing("segment", 2.0);
        logger.timing("composite", 1.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Pipeline summary (10 frames"));
        assert!(summary.contains("segment"));
        assert!(summary.contains("composite"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(ConsolePipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_default_cadence() {
        assert_eq!(ConsolePipelineLogger::default().log_cadence, 200);
    }
}
