use crate::detection::domain::blob::Blob;
use crate::segmentation::domain::mask::Mask;

/// Domain interface for picking the one candidate region of a mask.
///
/// Returns `None` when the mask holds no qualifying region; that is a
/// normal per-frame outcome, not an error.
pub trait BlobSelector: Send {
    fn select(&self, mask: &Mask) -> Option<Blob>;
}
