use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of a tracking run. Each aborts the run; nothing is retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot open input video {path}: {source}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("cannot open output {path}: {source}")]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("failed writing {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error>,
    },
    #[error("failed decoding frame {index}: {source}")]
    FrameRead {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}
