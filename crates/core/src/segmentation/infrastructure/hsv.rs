//! RGB to HSV conversion in the 8-bit convention: hue is degrees / 2
//! (0-179), saturation and value are 0-255. Rounding follows the usual
//! fixed-point implementation (round half up, negative hue wrapped by 180).

use crate::shared::frame::Frame;

pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 {
        0
    } else {
        (diff * 255 * 2 + v) / (2 * v)
    };

    let h = if diff == 0 {
        0
    } else {
        let raw = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        // round(raw * 30 / diff), floor-based so negatives round toward +inf at .5
        let mut h = (raw * 60 + diff).div_euclid(2 * diff);
        if h < 0 {
            h += 180;
        }
        h % 180
    };

    [h as u8, s as u8, v as u8]
}

/// Converts a 3-channel RGB frame into a packed HSV buffer of the same layout.
pub fn frame_to_hsv(frame: &Frame) -> Vec<u8> {
    debug_assert_eq!(frame.channels(), 3, "HSV conversion expects RGB frames");
    let mut out = Vec::with_capacity(frame.data().len());
    for px in frame.data().chunks_exact(3) {
        out.extend_from_slice(&rgb_to_hsv(px[0], px[1], px[2]));
    }
    out
}
