use crate::segmentation::domain::mask::Mask;
use crate::shared::frame::Frame;

/// Domain interface for turning a frame into a target-color presence mask.
///
/// Implementations never fail: a frame with no target pixels yields an
/// all-off mask of the frame's dimensions.
pub trait ColorSegmenter: Send {
    fn segment(&self, frame: &Frame) -> Mask;
}
