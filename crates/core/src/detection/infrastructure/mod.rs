pub mod contour_blob_selector;
mod math;
