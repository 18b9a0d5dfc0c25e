use ndarray::Array4;

use crate::error::PredictionError;
use crate::inference::domain::endpoint::ModelEndpoint;

/// An output tensor squeezed of its size-1 axes.
///
/// Inference engines collapse a batch axis of size 1, so a single-face and
/// a multi-face call produce structurally different outputs. Tagging the
/// squeeze result lets the conversion stage pattern-match instead of
/// inspecting tensor rank ad hoc.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelOutput {
    Scalar(f32),
    Batch(Vec<f32>),
}

impl ModelOutput {
    /// Squeeze a flattened output: exactly one element reads as a scalar,
    /// anything else as a per-item batch in input order.
    pub fn from_flat(values: Vec<f32>) -> Self {
        if values.len() == 1 {
            ModelOutput::Scalar(values[0])
        } else {
            ModelOutput::Batch(values)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ModelOutput::Scalar(_) => 1,
            ModelOutput::Batch(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capability interface for executing a configured network.
///
/// A runner starts unconfigured; [`configure`](InferenceRunner::configure)
/// loads the endpoint's model and binds the runner to the configuring
/// thread. Callers that execute on a different thread must invoke
/// [`bind_execution_thread`](InferenceRunner::bind_execution_thread) there
/// once before the first `run`; this is a required lifecycle step, not an
/// optimization. Serializing configure against run is the caller's
/// responsibility; the runner itself never locks.
pub trait InferenceRunner: Send {
    /// Load the endpoint's model, or do nothing if the model path is
    /// unchanged. On failure any previously configured model stays active.
    fn configure(&mut self, endpoint: ModelEndpoint) -> Result<(), PredictionError>;

    /// Bind subsequent `run` calls to the current thread.
    fn bind_execution_thread(&mut self);

    /// Execute one feed/fetch pair.
    fn run(
        &mut self,
        inputs: Array4<f32>,
        input_node: &str,
        output_node: &str,
    ) -> Result<ModelOutput, PredictionError>;

    /// Fetch two named outputs from a single forward pass.
    fn run_pair(
        &mut self,
        inputs: Array4<f32>,
        input_node: &str,
        output_nodes: (&str, &str),
    ) -> Result<(ModelOutput, ModelOutput), PredictionError>;
}
