use ndarray::Array4;

/// One normalization stage applied to the batched input tensor before
/// inference.
///
/// Stages are pure and stateless per call; a chain applies them strictly in
/// configured order, each consuming the previous stage's output. An empty
/// chain is the identity.
pub trait Preprocessor: Send {
    fn apply(&self, inputs: Array4<f32>) -> Array4<f32>;
}
