pub mod color_segmenter;
pub mod mask;
