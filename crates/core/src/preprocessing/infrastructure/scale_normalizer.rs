use ndarray::Array4;

use crate::preprocessing::domain::preprocessor::Preprocessor;

/// Maximum channel value of 8-bit input, the usual [0, 1] rescale rate.
const RGB_RANGE: f32 = 255.0;

/// Divides every tensor element by a fixed rate.
pub struct ScaleNormalizer {
    rate: f32,
}

impl ScaleNormalizer {
    pub fn new(rate: f32) -> Self {
        debug_assert!(rate != 0.0, "scale rate must be non-zero");
        Self { rate }
    }

    /// Rescale 8-bit channel values into [0, 1].
    pub fn unit() -> Self {
        Self::new(RGB_RANGE)
    }
}

impl Preprocessor for ScaleNormalizer {
    fn apply(&self, inputs: Array4<f32>) -> Array4<f32> {
        inputs / self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_divides_every_element() {
        let tensor = Array4::from_elem((2, 1, 1, 3), 100.0);
        let out = ScaleNormalizer::new(4.0).apply(tensor);
        assert_relative_eq!(out[[0, 0, 0, 0]], 25.0);
        assert_relative_eq!(out[[1, 0, 0, 2]], 25.0);
    }

    #[test]
    fn test_unit_maps_255_to_one() {
        let tensor = Array4::from_elem((1, 1, 1, 3), 255.0);
        let out = ScaleNormalizer::unit().apply(tensor);
        assert_relative_eq!(out[[0, 0, 0, 0]], 1.0);
    }

    #[test]
    fn test_preserves_shape() {
        let tensor = Array4::<f32>::zeros((3, 4, 5, 3));
        let out = ScaleNormalizer::new(2.0).apply(tensor);
        assert_eq!(out.shape(), &[3, 4, 5, 3]);
    }
}
