pub mod artifact_sink;
pub mod error;
pub mod pipeline_logger;
pub mod track_color_use_case;
