pub const DEFAULT_INPUT: &str = "input.mp4";

pub const OUTPUT_VIDEO_NAME: &str = "tracked.mp4";
pub const OUTPUT_OVERLAY_NAME: &str = "tracked_final_overlay.png";
pub const OUTPUT_TRAIL_NAME: &str = "tracked_trail_only.png";
pub const DEBUG_DIR_NAME: &str = "debug_masks";

/// Largest hue value in the 8-bit HSV representation (degrees / 2).
pub const HUE_MAX: u8 = 179;

/// Side of the Gaussian kernel applied to the HSV image before thresholding.
pub const HSV_BLUR_KERNEL: usize = 5;

/// Half-width of the square structuring element (5x5) used for open/close/dilate.
pub const MORPH_RADIUS: u8 = 2;

/// Trail and marker color (RGB).
pub const TRAIL_COLOR: [u8; 3] = [0, 0, 255];

pub const MARKER_RADIUS: i32 = 4;
