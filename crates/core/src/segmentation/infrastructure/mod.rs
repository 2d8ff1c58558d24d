mod gaussian;
pub mod hsv;
pub mod hsv_segmenter;
