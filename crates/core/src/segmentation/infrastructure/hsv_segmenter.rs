use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, dilate, open};

use crate::segmentation::domain::color_segmenter::ColorSegmenter;
use crate::segmentation::domain::mask::{Mask, MASK_ON};
use crate::segmentation::infrastructure::gaussian::{gaussian_kernel_1d, separable_gaussian_blur};
use crate::segmentation::infrastructure::hsv::frame_to_hsv;
use crate::shared::config::TrackerConfig;
use crate::shared::constants::{HSV_BLUR_KERNEL, MORPH_RADIUS};
use crate::shared::frame::Frame;

/// Hue-band segmenter: HSV conversion, 5x5 Gaussian smoothing, in-range
/// threshold, then open, close and one extra dilation with a 5x5 square.
pub struct HsvSegmenter {
    hue_lo: u8,
    hue_hi: u8,
    sat_min: u8,
    val_min: u8,
    kernel: Vec<f32>,
}

impl HsvSegmenter {
    pub fn new(config: &TrackerConfig) -> Self {
        let (hue_lo, hue_hi) = config.hue_bounds();
        Self {
            hue_lo,
            hue_hi,
            sat_min: config.sat_min,
            val_min: config.val_min,
            kernel: gaussian_kernel_1d(HSV_BLUR_KERNEL),
        }
    }

    fn in_range(&self, h: u8, s: u8, v: u8) -> bool {
        (self.hue_lo..=self.hue_hi).contains(&h) && s >= self.sat_min && v >= self.val_min
    }

    fn threshold(&self, hsv: &[u8], width: u32, height: u32) -> GrayImage {
        let mut raw = Vec::with_capacity((width as usize) * (height as usize));
        for px in hsv.chunks_exact(3) {
            raw.push(if self.in_range(px[0], px[1], px[2]) {
                MASK_ON
            } else {
                0
            });
        }
        GrayImage::from_raw(width, height, raw).unwrap_or_else(|| GrayImage::new(width, height))
    }
}

impl ColorSegmenter for HsvSegmenter {
    fn segment(&self, frame: &Frame) -> Mask {
        let (width, height) = (frame.width(), frame.height());
        let mut hsv = frame_to_hsv(frame);
        let mut temp = Vec::new();
        separable_gaussian_blur(
            &mut hsv,
            width as usize,
            height as usize,
            3,
            &self.kernel,
            &mut temp,
        );

        let raw = self.threshold(&hsv, width, height);
        // Morphology on images smaller than the structuring element can
        // invent pixels; an empty threshold stays empty.
        if raw.pixels().all(|&Luma([v])| v == 0) {
            return Mask::empty(width, height);
        }
        let opened = open(&raw, Norm::LInf, MORPH_RADIUS);
        let closed = close(&opened, Norm::LInf, MORPH_RADIUS);
        let grown = dilate(&closed, Norm::LInf, MORPH_RADIUS);
        debug_assert!(grown.pixels().all(|&Luma([v])| v == 0 || v == MASK_ON));
        Mask::from_image(grown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::blob_selector::BlobSelector;
    use crate::detection::infrastructure::contour_blob_selector::ContourBlobSelector;
    use rstest::rstest;

    /// Pure color at hue 88, full saturation and value.
    const TARGET: [u8; 3] = [0, 255, 238];
    /// Saturated red, far outside the default hue band.
    const OFF_TARGET: [u8; 3] = [255, 0, 0];

    fn frame_with_rect(w: u32, h: u32, rect: (u32, u32, u32, u32), color: [u8; 3]) -> Frame {
        let (rx, ry, rw, rh) = rect;
        let mut frame = Frame::black(w, h, 0);
        let mut arr = frame.as_ndarray_mut();
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                for c in 0..3 {
                    arr[[y as usize, x as usize, c]] = color[c];
                }
            }
        }
        frame
    }

    fn segmenter() -> HsvSegmenter {
        HsvSegmenter::new(&TrackerConfig::default())
    }

    #[rstest]
    #[case(1, 1)]
    #[case(7, 3)]
    #[case(64, 48)]
    fn test_mask_dimensions_match_frame(#[case] w: u32, #[case] h: u32) {
        let mask = segmenter().segment(&Frame::black(w, h, 0));
        assert_eq!((mask.width(), mask.height()), (w, h));
        assert_eq!(mask.count_on(), 0);
    }

    #[test]
    fn test_single_pixel_black_frame_has_no_blob() {
        let mask = segmenter().segment(&Frame::black(1, 1, 0));
        assert!(!mask.is_on(0, 0));
        assert_eq!(ContourBlobSelector::new(0.0).select(&mask), None);
    }

    #[test]
    fn test_target_patch_is_detected() {
        let frame = frame_with_rect(80, 60, (20, 15, 30, 30), TARGET);
        let mask = segmenter().segment(&frame);
        assert!(mask.is_on(35, 30));
        assert!(!mask.is_on(2, 2));
        assert!(!mask.is_on(77, 57));
        // Final dilation grows the region slightly beyond the patch.
        assert!(mask.count_on() >= 30 * 30);
    }

    #[test]
    fn test_off_target_patch_is_ignored() {
        let frame = frame_with_rect(80, 60, (20, 15, 30, 30), OFF_TARGET);
        assert_eq!(segmenter().segment(&frame).count_on(), 0);
    }

    #[test]
    fn test_low_saturation_is_ignored() {
        // Hue in band, saturation ~40 < 120.
        let frame = frame_with_rect(80, 60, (20, 15, 30, 30), [200, 240, 238]);
        assert_eq!(segmenter().segment(&frame).count_on(), 0);
    }

    #[test]
    fn test_dark_pixels_are_ignored() {
        // Hue in band, full saturation, value 50 < 80.
        let frame = frame_with_rect(80, 60, (20, 15, 30, 30), [0, 50, 47]);
        assert_eq!(segmenter().segment(&frame).count_on(), 0);
    }

    #[test]
    fn test_speckle_is_removed() {
        let frame = frame_with_rect(40, 40, (20, 20, 2, 2), TARGET);
        assert_eq!(segmenter().segment(&frame).count_on(), 0);
    }

    #[test]
    fn test_small_hole_is_filled() {
        let mut frame = frame_with_rect(80, 60, (20, 15, 30, 30), TARGET);
        {
            let mut arr = frame.as_ndarray_mut();
            for c in 0..3 {
                arr[[30, 35, c]] = 0;
            }
        }
        let mask = segmenter().segment(&frame);
        assert!(mask.is_on(35, 30));
    }

    #[test]
    fn test_custom_band_selects_red() {
        let config = TrackerConfig {
            hue_target: 0,
            hue_tolerance: 5,
            ..Default::default()
        };
        let frame = frame_with_rect(80, 60, (20, 15, 30, 30), OFF_TARGET);
        let mask = HsvSegmenter::new(&config).segment(&frame);
        assert!(mask.is_on(35, 30));
    }
}
