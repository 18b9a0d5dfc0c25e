use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the prediction pipeline and its stages.
///
/// All variants propagate to the immediate caller; the pipeline performs no
/// retries and never falls back silently between locator or model variants.
/// Zero detected faces is an empty result, not an error.
#[derive(Error, Debug)]
pub enum PredictionError {
    /// The underlying face detector failed to run.
    #[error("face detection failed: {source}")]
    Detection {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A locator variant was invoked through an overload it does not
    /// implement.
    #[error("{operation} is not supported by the {variant} locator")]
    NotSupported {
        variant: &'static str,
        operation: &'static str,
    },

    /// Preprocessing configuration could not be read or parsed at
    /// construction time.
    #[error("cannot read preprocessing configuration {path}: {reason}")]
    Configuration { path: PathBuf, reason: String },

    /// A model could not be loaded or one of its named nodes could not be
    /// resolved. A runner keeps its previously configured model.
    #[error("cannot load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// A tensor shape contract was violated; signals an integration bug
    /// rather than a recoverable runtime condition.
    #[error("tensor shape mismatch: {reason}")]
    Shape { reason: String },

    /// An encoded image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The inference engine failed while executing a configured model.
    #[error("inference failed: {reason}")]
    Inference { reason: String },

    /// `run` was called on a runner that has no configured model.
    #[error("inference runner has no configured model")]
    NotConfigured,

    /// `run` was called from a thread the runner is not bound to.
    #[error(
        "inference runner is bound to a different thread; \
         call bind_execution_thread on this thread before running"
    )]
    ThreadAffinity,
}

impl From<ort::Error> for PredictionError {
    fn from(err: ort::Error) -> Self {
        PredictionError::Inference {
            reason: err.to_string(),
        }
    }
}
