pub mod detection;
pub mod pipeline;
pub mod rendering;
pub mod segmentation;
pub mod shared;
pub mod tracking;
pub mod video;
