use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, BresenhamLineIter};
use ndarray::{ArrayView3, ArrayViewMut3, Zip};

use crate::detection::domain::blob::Point;
use crate::shared::config::TrackerConfig;
use crate::shared::constants::{MARKER_RADIUS, TRAIL_COLOR};
use crate::shared::frame::Frame;
use crate::tracking::domain::track_state::TrailSegment;

/// Persistent trail canvas and the compositing of it onto live frames.
///
/// The canvas only ever gains ink from [`extend`](Self::extend); the one
/// way ink leaves is the optional multiplicative [`fade`](Self::fade).
pub struct TrailCompositor {
    canvas: RgbImage,
    line_thickness: u32,
    opacity: f64,
    fade_factor: Option<f64>,
}

impl TrailCompositor {
    pub fn new(width: u32, height: u32, config: &TrackerConfig) -> Self {
        Self {
            canvas: RgbImage::new(width, height),
            line_thickness: config.line_thickness.max(1),
            opacity: config.trail_opacity,
            fade_factor: config.fade_enabled.then_some(config.fade_factor),
        }
    }

    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    /// The canvas alone, as a frame for the image writer.
    pub fn canvas_frame(&self, index: usize) -> Frame {
        Frame::from_rgb_image(self.canvas.clone(), index)
    }

    /// Decays the whole canvas once; truncates toward zero. No-op when
    /// fading is disabled.
    pub fn fade(&mut self) {
        let Some(factor) = self.fade_factor else {
            return;
        };
        let mut view = canvas_view_mut(&mut self.canvas);
        view.mapv_inplace(|v| (v as f64 * factor) as u8);
    }

    /// Draws one trajectory segment onto the canvas.
    pub fn extend(&mut self, segment: TrailSegment) {
        let color = Rgb(TRAIL_COLOR);
        let from = (segment.from.x as f32, segment.from.y as f32);
        let to = (segment.to.x as f32, segment.to.y as f32);

        if self.line_thickness <= 1 {
            draw_line_segment_mut(&mut self.canvas, from, to, color);
            return;
        }

        let radius = (self.line_thickness / 2) as i32;
        for (x, y) in BresenhamLineIter::new(from, to) {
            draw_filled_circle_mut(&mut self.canvas, (x, y), radius, color);
        }
        for end in [segment.from, segment.to] {
            draw_filled_circle_mut(&mut self.canvas, (end.x, end.y), radius, color);
        }
    }

    /// `frame + canvas * opacity`, saturated per channel, plus a filled
    /// marker at `marker` when a candidate was accepted this frame.
    pub fn composite(&self, frame: &Frame, marker: Option<Point>) -> Frame {
        let blended = self.blend(frame);
        let Some(center) = marker else {
            return blended;
        };
        let index = blended.index();
        match blended.into_rgb_image() {
            Some(mut image) => {
                draw_filled_circle_mut(
                    &mut image,
                    (center.x, center.y),
                    MARKER_RADIUS,
                    Rgb(TRAIL_COLOR),
                );
                Frame::from_rgb_image(image, index)
            }
            None => Frame::black(self.canvas.width(), self.canvas.height(), index),
        }
    }

    /// Additive weighted blend of the canvas over `frame`.
    pub fn blend(&self, frame: &Frame) -> Frame {
        debug_assert_eq!(
            (frame.width(), frame.height(), frame.channels()),
            (self.canvas.width(), self.canvas.height(), 3),
            "frame must match the canvas"
        );
        let mut out = frame.clone();
        let opacity = self.opacity;
        Zip::from(out.as_ndarray_mut())
            .and(canvas_view(&self.canvas))
            .for_each(|o, &c| {
                *o = (*o as f64 + c as f64 * opacity).round().clamp(0.0, 255.0) as u8;
            });
        out
    }
}

fn canvas_view(canvas: &RgbImage) -> ArrayView3<'_, u8> {
    let shape = (canvas.height() as usize, canvas.width() as usize, 3);
    ArrayView3::from_shape(shape, canvas.as_raw()).expect("canvas buffer matches its dimensions")
}

fn canvas_view_mut(canvas: &mut RgbImage) -> ArrayViewMut3<'_, u8> {
    let shape = (canvas.height() as usize, canvas.width() as usize, 3);
    ArrayViewMut3::from_shape(shape, &mut **canvas).expect("canvas buffer matches its dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compositor(config: TrackerConfig) -> TrailCompositor {
        TrailCompositor::new(60, 40, &config)
    }

    fn seg(from: (i32, i32), to: (i32, i32)) -> TrailSegment {
        TrailSegment {
            from: Point::new(from.0, from.1),
            to: Point::new(to.0, to.1),
        }
    }

    fn ink(c: &TrailCompositor) -> u64 {
        c.canvas().as_raw().iter().map(|&v| v as u64).sum()
    }

    #[test]
    fn test_new_canvas_is_blank() {
        let c = compositor(TrackerConfig::default());
        assert_eq!(c.canvas().dimensions(), (60, 40));
        assert_eq!(ink(&c), 0);
    }

    #[test]
    fn test_extend_draws_along_segment() {
        let mut c = compositor(TrackerConfig::default());
        c.extend(seg((5, 20), (45, 20)));
        for x in [5, 20, 45] {
            assert_eq!(c.canvas().get_pixel(x, 20).0, TRAIL_COLOR);
        }
        assert_eq!(c.canvas().get_pixel(25, 5).0, [0, 0, 0]);
        assert_eq!(c.canvas().get_pixel(50, 20).0, [0, 0, 0]);
    }

    #[test]
    fn test_thin_line() {
        let mut c = compositor(TrackerConfig {
            line_thickness: 1,
            ..Default::default()
        });
        c.extend(seg((5, 10), (15, 10)));
        assert_eq!(c.canvas().get_pixel(10, 10).0, TRAIL_COLOR);
        assert_eq!(c.canvas().get_pixel(10, 11).0, [0, 0, 0]);
    }

    #[test]
    fn test_ink_is_monotonic_without_fade() {
        let mut c = compositor(TrackerConfig::default());
        c.extend(seg((5, 5), (30, 30)));
        let first = c.canvas().clone();
        for i in 0..20 {
            c.fade();
            c.extend(seg((30 + i, 30), (31 + i, 10)));
            for (before, after) in first.pixels().zip(c.canvas().pixels()) {
                for ch in 0..3 {
                    assert!(after.0[ch] >= before.0[ch]);
                }
            }
        }
    }

    #[test]
    fn test_fade_decays_geometrically() {
        let mut c = compositor(TrackerConfig {
            fade_enabled: true,
            fade_factor: 0.5,
            ..Default::default()
        });
        c.extend(seg((10, 10), (20, 10)));
        let mut expected = 255u8;
        for _ in 0..6 {
            c.fade();
            expected = (expected as f64 * 0.5) as u8;
            assert_eq!(c.canvas().get_pixel(15, 10).0, [0, 0, expected]);
        }
    }

    #[test]
    fn test_blend_full_opacity_adds_canvas() {
        let mut c = compositor(TrackerConfig::default());
        c.extend(seg((10, 10), (20, 10)));
        let frame = Frame::new(vec![100; 60 * 40 * 3], 60, 40, 3, 3);
        let out = c.blend(&frame);
        assert_eq!(out.rgb_at(15, 10), [100, 100, 255]);
        assert_eq!(out.rgb_at(40, 30), [100, 100, 100]);
        assert_eq!(out.index(), 3);
        // Input untouched
        assert_eq!(frame.rgb_at(15, 10), [100, 100, 100]);
    }

    #[test]
    fn test_blend_partial_opacity_rounds() {
        let mut c = compositor(TrackerConfig {
            trail_opacity: 0.5,
            ..Default::default()
        });
        c.extend(seg((10, 10), (20, 10)));
        let out = c.blend(&Frame::black(60, 40, 0));
        assert_eq!(out.rgb_at(15, 10), [0, 0, 128]);
    }

    #[test]
    fn test_composite_draws_marker_only_when_given() {
        let c = compositor(TrackerConfig::default());
        let frame = Frame::black(60, 40, 0);

        let plain = c.composite(&frame, None);
        assert_eq!(plain, frame);

        let marked = c.composite(&frame, Some(Point::new(30, 20)));
        assert_eq!(marked.rgb_at(30, 20), TRAIL_COLOR);
        assert_eq!(marked.rgb_at(33, 20), TRAIL_COLOR);
        assert_eq!(marked.rgb_at(36, 20), [0, 0, 0]);
    }

    #[test]
    fn test_canvas_frame_matches_canvas() {
        let mut c = compositor(TrackerConfig::default());
        c.extend(seg((1, 1), (9, 9)));
        let frame = c.canvas_frame(0);
        assert_eq!(frame.data(), c.canvas().as_raw().as_slice());
    }
}
