pub mod blob;
pub mod blob_selector;
