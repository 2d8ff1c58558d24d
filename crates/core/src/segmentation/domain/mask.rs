use image::{GrayImage, Luma};

use crate::shared::frame::Frame;

pub const MASK_ON: u8 = 255;

/// Binary presence mask: each pixel is either 0 (off) or 255 (on).
///
/// Backed by a `GrayImage` so the morphology and contour routines can
/// consume it directly.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    /// Wraps a grayscale image, normalizing every nonzero pixel to on.
    pub fn from_image(mut image: GrayImage) -> Self {
        for p in image.pixels_mut() {
            if p.0[0] != 0 {
                p.0[0] = MASK_ON;
            }
        }
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_on(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        let value = if on { MASK_ON } else { 0 };
        self.image.put_pixel(x, y, Luma([value]));
    }

    pub fn count_on(&self) -> usize {
        self.image.as_raw().iter().filter(|&&v| v != 0).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    /// Single-channel frame for persisting the mask as a debug image.
    pub fn to_frame(&self, index: usize) -> Frame {
        Frame::from_gray_image(self.image.clone(), index)
    }
}
